//! Plan command implementation.

use super::output::format_plan;
use super::{load_tuning, CliError, OutputFormat};
use lantern::{plan_turn, ColonizerRegistry, World};
use std::path::Path;
use tracing::info;

/// Execute the plan command.
///
/// With `state`, committed founders are read from and written back to that
/// file so consecutive invocations behave like consecutive turns.
///
/// # Errors
///
/// Returns an error if an input file cannot be loaded or the state cannot
/// be saved.
pub(crate) fn execute(
    snapshot: &Path,
    tuning: Option<&Path>,
    state: Option<&Path>,
    format: OutputFormat,
) -> Result<(), CliError> {
    let world = World::load(snapshot)?;
    let tuning = load_tuning(tuning)?;
    let mut colonizers = match state {
        Some(path) => ColonizerRegistry::load_or_default(path)?,
        None => ColonizerRegistry::new(),
    };

    let plan = plan_turn(&world, &tuning, &mut colonizers);
    info!(
        turn = plan.turn,
        moves = plan.moves.len(),
        founders = colonizers.len(),
        "planned turn"
    );

    if let Some(path) = state {
        colonizers.save(path)?;
    }

    match format {
        OutputFormat::Text => {
            print!("{}", format_plan(&plan));
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&plan)?;
            println!("{json}");
        }
    }

    Ok(())
}
