//! Map, cell and coordinate types.

use std::collections::VecDeque;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::world::CityId;

/// Identifier of a team.
pub type TeamId = u8;

/// A coordinate on the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Coord {
    /// X coordinate (column).
    pub x: u16,
    /// Y coordinate (row).
    pub y: u16,
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl Coord {
    /// Create a new coordinate.
    #[must_use]
    pub const fn new(x: u16, y: u16) -> Self {
        Self { x, y }
    }

    /// Get adjacent coordinates (up, down, left, right).
    ///
    /// Returns a fixed-size array and count to avoid heap allocation.
    /// The array contains valid coordinates in indices 0..count.
    #[must_use]
    #[inline]
    pub fn adjacent(&self, width: u16, height: u16) -> ([Coord; 4], u8) {
        let mut result = [Coord::new(0, 0); 4];
        let mut count = 0u8;

        if self.y > 0 {
            result[count as usize] = Coord::new(self.x, self.y - 1); // up
            count += 1;
        }
        if self.y + 1 < height {
            result[count as usize] = Coord::new(self.x, self.y + 1); // down
            count += 1;
        }
        if self.x > 0 {
            result[count as usize] = Coord::new(self.x - 1, self.y); // left
            count += 1;
        }
        if self.x + 1 < width {
            result[count as usize] = Coord::new(self.x + 1, self.y); // right
            count += 1;
        }

        (result, count)
    }

    /// Get diagonal coordinates, same layout as [`Coord::adjacent`].
    #[must_use]
    pub fn diagonal(&self, width: u16, height: u16) -> ([Coord; 4], u8) {
        let mut result = [Coord::new(0, 0); 4];
        let mut count = 0u8;

        for (dx, dy) in [(-1i32, -1i32), (1, -1), (1, 1), (-1, 1)] {
            let (Ok(x), Ok(y)) = (
                u16::try_from(i32::from(self.x) + dx),
                u16::try_from(i32::from(self.y) + dy),
            ) else {
                continue;
            };
            if x >= width || y >= height {
                continue;
            }
            result[count as usize] = Coord::new(x, y);
            count += 1;
        }

        (result, count)
    }

    /// Manhattan distance to another coordinate.
    #[must_use]
    pub const fn distance(&self, other: Coord) -> u32 {
        self.x.abs_diff(other.x) as u32 + self.y.abs_diff(other.y) as u32
    }

    /// The neighbor one step in `direction`, if it exists.
    #[must_use]
    pub fn step(&self, direction: Direction, width: u16, height: u16) -> Option<Coord> {
        match direction {
            Direction::North => self.y.checked_sub(1).map(|y| Coord::new(self.x, y)),
            Direction::South => (self.y + 1 < height).then(|| Coord::new(self.x, self.y + 1)),
            Direction::West => self.x.checked_sub(1).map(|x| Coord::new(x, self.y)),
            Direction::East => (self.x + 1 < width).then(|| Coord::new(self.x + 1, self.y)),
            Direction::Center => Some(*self),
        }
    }

    /// The single step that brings us closest to `target`.
    ///
    /// Checks north, east, south, west in that order and keeps the first
    /// direction that strictly shortens the Manhattan distance. Returns
    /// [`Direction::Center`] when already there.
    #[must_use]
    pub fn direction_to(&self, target: Coord) -> Direction {
        let mut best = Direction::Center;
        let mut best_distance = self.distance(target);

        for direction in Direction::CARDINAL {
            // Bounds do not matter here: the target itself is on the map.
            let Some(next) = self.step(direction, u16::MAX, u16::MAX) else {
                continue;
            };
            let distance = next.distance(target);
            if distance < best_distance {
                best = direction;
                best_distance = distance;
            }
        }

        best
    }
}

/// A one-step movement direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Towards y - 1.
    North,
    /// Towards x + 1.
    East,
    /// Towards y + 1.
    South,
    /// Towards x - 1.
    West,
    /// Stay in place.
    Center,
}

impl Direction {
    /// The four moving directions in tie-break order.
    pub const CARDINAL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// Short protocol letter.
    #[must_use]
    pub const fn letter(self) -> char {
        match self {
            Direction::North => 'n',
            Direction::East => 'e',
            Direction::South => 's',
            Direction::West => 'w',
            Direction::Center => 'c',
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

/// Resource tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    /// Low tier, always minable.
    Wood,
    /// Mid tier, needs research.
    Coal,
    /// High tier, needs more research.
    Uranium,
}

/// A resource deposit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resource {
    /// Tier of the deposit.
    pub kind: ResourceKind,
    /// Units left to mine.
    pub amount: u32,
}

/// A city tile sitting on a cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CityTile {
    /// Owning team.
    pub team: TeamId,
    /// Owning city.
    pub city: CityId,
}

/// Contents of a single map cell.
///
/// A cell never holds both a resource and a city tile.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Cell {
    /// Nothing here.
    #[default]
    Empty,
    /// A resource deposit.
    Resource(Resource),
    /// A city tile.
    CityTile(CityTile),
}

impl Cell {
    /// Get the resource on this cell, if any.
    #[must_use]
    pub const fn resource(&self) -> Option<&Resource> {
        match self {
            Cell::Resource(resource) => Some(resource),
            _ => None,
        }
    }

    /// Get the city tile on this cell, if any.
    #[must_use]
    pub const fn city_tile(&self) -> Option<&CityTile> {
        match self {
            Cell::CityTile(tile) => Some(tile),
            _ => None,
        }
    }

    /// Check if the cell holds a resource.
    #[must_use]
    pub const fn has_resource(&self) -> bool {
        matches!(self, Cell::Resource(_))
    }

    /// Check if the cell holds a city tile.
    #[must_use]
    pub const fn has_city_tile(&self) -> bool {
        matches!(self, Cell::CityTile(_))
    }

    /// Short label for error messages.
    pub(crate) const fn label(&self) -> &'static str {
        match self {
            Cell::Empty => "nothing",
            Cell::Resource(_) => "a resource",
            Cell::CityTile(_) => "a city tile",
        }
    }
}

/// The game map.
#[derive(Debug, Clone)]
pub struct Map {
    /// Width of the map in cells.
    width: u16,
    /// Height of the map in cells.
    height: u16,
    /// Cells stored in row-major order.
    cells: Vec<Cell>,
}

impl Map {
    /// Create a new map filled with empty cells.
    ///
    /// Returns `None` if width or height is zero.
    #[must_use]
    pub fn new(width: u16, height: u16) -> Option<Self> {
        if width == 0 || height == 0 {
            return None;
        }

        let size = usize::from(width) * usize::from(height);
        Some(Self {
            width,
            height,
            cells: vec![Cell::Empty; size],
        })
    }

    /// Get the width of the map.
    #[must_use]
    pub const fn width(&self) -> u16 {
        self.width
    }

    /// Get the height of the map.
    #[must_use]
    pub const fn height(&self) -> u16 {
        self.height
    }

    /// Number of cells.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Always false: a map has at least one cell.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Get the raw cells in row-major order.
    #[must_use]
    #[inline]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Check if a coordinate is within the map bounds.
    #[must_use]
    pub const fn in_bounds(&self, coord: Coord) -> bool {
        coord.x < self.width && coord.y < self.height
    }

    /// Row-major index of a coordinate.
    #[must_use]
    #[inline]
    pub fn index_of(&self, coord: Coord) -> Option<usize> {
        if self.in_bounds(coord) {
            Some(usize::from(coord.y) * usize::from(self.width) + usize::from(coord.x))
        } else {
            None
        }
    }

    /// Coordinate of a row-major index.
    #[must_use]
    #[inline]
    pub fn coord_of(&self, index: usize) -> Coord {
        let width = usize::from(self.width);
        Coord::new(
            u16::try_from(index % width).unwrap_or(u16::MAX),
            u16::try_from(index / width).unwrap_or(u16::MAX),
        )
    }

    /// Get a reference to the cell at the given coordinate.
    #[must_use]
    pub fn get(&self, coord: Coord) -> Option<&Cell> {
        self.index_of(coord).map(|idx| &self.cells[idx])
    }

    /// Set the cell at the given coordinate.
    ///
    /// Returns `false` if the coordinate is out of bounds.
    pub fn set(&mut self, coord: Coord, cell: Cell) -> bool {
        if let Some(idx) = self.index_of(coord) {
            self.cells[idx] = cell;
            true
        } else {
            false
        }
    }

    /// Adjacent coordinates of `coord` on this map.
    #[must_use]
    #[inline]
    pub fn adjacent(&self, coord: Coord) -> ([Coord; 4], u8) {
        coord.adjacent(self.width, self.height)
    }

    /// Iterate over all coordinates and cells.
    pub fn iter(&self) -> impl Iterator<Item = (Coord, &Cell)> {
        self.cells
            .iter()
            .enumerate()
            .map(|(idx, cell)| (self.coord_of(idx), cell))
    }

    /// Step distance from the nearest source to every cell, by row-major index.
    ///
    /// Breadth-first over cells accepted by `passable`; sources are always
    /// entered. Unreached cells hold `u32::MAX`.
    pub fn distance_field(
        &self,
        sources: impl IntoIterator<Item = Coord>,
        passable: impl Fn(Coord) -> bool,
    ) -> Vec<u32> {
        let mut distance = vec![u32::MAX; self.cells.len()];
        let mut queue = VecDeque::new();

        for source in sources {
            if let Some(idx) = self.index_of(source) {
                if distance[idx] != 0 {
                    distance[idx] = 0;
                    queue.push_back(source);
                }
            }
        }

        while let Some(current) = queue.pop_front() {
            let next_distance = distance[usize::from(current.y) * usize::from(self.width)
                + usize::from(current.x)]
                + 1;
            let (adjacent, count) = self.adjacent(current);
            for &next in &adjacent[..count as usize] {
                let idx = usize::from(next.y) * usize::from(self.width) + usize::from(next.x);
                if distance[idx] != u32::MAX || !passable(next) {
                    continue;
                }
                distance[idx] = next_distance;
                queue.push_back(next);
            }
        }

        distance
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coord_adjacent() {
        let coord = Coord::new(5, 5);
        let (adj, count) = coord.adjacent(10, 10);
        let adj_slice = &adj[..count as usize];
        assert_eq!(count, 4);
        assert!(adj_slice.contains(&Coord::new(5, 4))); // up
        assert!(adj_slice.contains(&Coord::new(5, 6))); // down
        assert!(adj_slice.contains(&Coord::new(4, 5))); // left
        assert!(adj_slice.contains(&Coord::new(6, 5))); // right
    }

    #[test]
    fn test_coord_adjacent_corner() {
        let coord = Coord::new(0, 0);
        let (adj, count) = coord.adjacent(10, 10);
        let adj_slice = &adj[..count as usize];
        assert_eq!(count, 2);
        assert!(adj_slice.contains(&Coord::new(0, 1))); // down
        assert!(adj_slice.contains(&Coord::new(1, 0))); // right
    }

    #[test]
    fn test_coord_diagonal_corner() {
        let (diag, count) = Coord::new(0, 0).diagonal(3, 3);
        assert_eq!(&diag[..count as usize], &[Coord::new(1, 1)]);
    }

    #[test]
    fn test_direction_to() {
        let origin = Coord::new(2, 2);
        assert_eq!(origin.direction_to(Coord::new(2, 0)), Direction::North);
        assert_eq!(origin.direction_to(Coord::new(4, 2)), Direction::East);
        assert_eq!(origin.direction_to(Coord::new(2, 3)), Direction::South);
        assert_eq!(origin.direction_to(Coord::new(0, 2)), Direction::West);
        assert_eq!(origin.direction_to(origin), Direction::Center);
        // Diagonal targets prefer the first improving direction
        assert_eq!(origin.direction_to(Coord::new(3, 1)), Direction::North);
        assert_eq!(origin.direction_to(Coord::new(3, 3)), Direction::East);
    }

    #[test]
    fn test_direction_from_edge() {
        assert_eq!(Coord::new(0, 0).direction_to(Coord::new(0, 1)), Direction::South);
        assert_eq!(Coord::new(0, 0).direction_to(Coord::new(1, 0)), Direction::East);
    }

    #[test]
    fn test_map_index_roundtrip() {
        let map = Map::new(7, 3).unwrap();
        let coord = Coord::new(4, 2);
        let idx = map.index_of(coord).unwrap();
        assert_eq!(idx, 18);
        assert_eq!(map.coord_of(idx), coord);
        assert!(map.index_of(Coord::new(7, 0)).is_none());
    }

    #[test]
    fn test_distance_field() {
        let map = Map::new(4, 3).unwrap();
        let wall = Coord::new(1, 1);
        let field = map.distance_field([Coord::new(0, 1)], |c| c != wall);

        assert_eq!(field[map.index_of(Coord::new(0, 1)).unwrap()], 0);
        assert_eq!(field[map.index_of(Coord::new(1, 0)).unwrap()], 2);
        assert_eq!(field[map.index_of(wall).unwrap()], u32::MAX);
        // Around the wall
        assert_eq!(field[map.index_of(Coord::new(2, 1)).unwrap()], 4);
    }

    #[test]
    fn test_coord_of_inverts_index_of() {
        let map = Map::new(5, 3).unwrap();
        for idx in 0..map.len() {
            assert_eq!(map.index_of(map.coord_of(idx)), Some(idx));
        }
        assert_eq!(map.coord_of(7), Coord::new(2, 1));
    }

    #[test]
    fn test_map_zero_size() {
        assert!(Map::new(0, 10).is_none());
        assert!(Map::new(10, 0).is_none());
    }

    #[test]
    fn test_cell_kinds() {
        let mut map = Map::new(3, 3).unwrap();
        let coord = Coord::new(1, 1);
        assert!(map.set(
            coord,
            Cell::Resource(Resource {
                kind: ResourceKind::Coal,
                amount: 10
            })
        ));
        let cell = map.get(coord).unwrap();
        assert!(cell.has_resource());
        assert!(!cell.has_city_tile());
        assert!(!map.set(Coord::new(3, 0), Cell::Empty));
    }
}
