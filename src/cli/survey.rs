//! Survey command implementation.

use super::output::{format_sites, JsonSite};
use super::{load_tuning, CliError, OutputFormat};
use lantern::survey::{top_k, SiteSurvey};
use lantern::{SiteRanking, World};
use std::path::Path;

/// Execute the survey command.
///
/// Ranks sites with the grid selected by the tuning's `site_ranking`. The
/// text format also prints the normalized grid.
///
/// # Errors
///
/// Returns an error if an input file cannot be loaded.
pub(crate) fn execute(
    snapshot: &Path,
    tuning: Option<&Path>,
    top: Option<usize>,
    format: OutputFormat,
) -> Result<(), CliError> {
    let world = World::load(snapshot)?;
    let tuning = load_tuning(tuning)?;
    let survey = SiteSurvey::new(&world, &tuning);

    let (grid, coords) = match tuning.site_ranking {
        SiteRanking::Placement => {
            let grid = survey.placement_grid();
            let k = top.unwrap_or(tuning.candidate_sites);
            let coords = top_k(&grid, k)
                .into_iter()
                .filter(|&site| grid.get(site) > 0.0)
                .collect::<Vec<_>>();
            (grid, coords)
        }
        SiteRanking::Clumps => {
            let coords = match top {
                Some(k) => {
                    let explore = tuning.explore_sites.min(k);
                    survey.growth_and_explore_sites(k - explore, explore)
                }
                None => survey.growth_and_explore_sites(tuning.growth_sites, tuning.explore_sites),
            };
            (survey.clump_grid(), coords)
        }
    };

    let sites: Vec<JsonSite> = coords
        .iter()
        .map(|&coord| JsonSite::new(coord, grid.get(coord)))
        .collect();

    match format {
        OutputFormat::Text => {
            print!("{}", format_sites(&sites));
            println!();
            print!("{}", grid.render());
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&sites)?;
            println!("{json}");
        }
    }

    Ok(())
}
