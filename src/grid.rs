// grid.rs
use crate::country::CountryId;
use crate::troops::TroopId;
use serde::{Deserialize, Serialize};

pub const MAX_GRID_SIDE: usize = 1024;

pub const ORTHOGONAL: [(i32, i32); 4] = [(0, -1), (0, 1), (-1, 0), (1, 0)];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x.saturating_add(dx),
            y: self.y.saturating_add(dy),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    pub owner: Option<CountryId>,
    pub troops: Vec<TroopId>,
}

impl Cell {
    pub fn is_neutral(&self) -> bool {
        self.owner.is_none()
    }

    pub fn is_owned_by(&self, country: CountryId) -> bool {
        self.owner == Some(country)
    }

    pub fn troop_count(&self) -> usize {
        self.troops.len()
    }

    pub fn clear(&mut self) {
        self.owner = None;
        self.troops.clear();
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grid {
    width: i32,
    height: i32,
    cells: Vec<Cell>,
}

impl Grid {
    /// Sides are clamped to [`MAX_GRID_SIDE`].
    pub fn new(width: usize, height: usize) -> Self {
        let width = width.min(MAX_GRID_SIDE);
        let height = height.min(MAX_GRID_SIDE);
        Self {
            width: i32::try_from(width).unwrap_or(0),
            height: i32::try_from(height).unwrap_or(0),
            cells: vec![Cell::default(); width * height],
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn contains(&self, pos: Position) -> bool {
        (0..self.width).contains(&pos.x) && (0..self.height).contains(&pos.y)
    }

    fn index(&self, pos: Position) -> Option<usize> {
        if self.contains(pos) {
            Some((pos.y * self.width + pos.x) as usize)
        } else {
            None
        }
    }

    pub fn get(&self, pos: Position) -> Option<&Cell> {
        self.index(pos).map(|i| &self.cells[i])
    }

    pub fn get_mut(&mut self, pos: Position) -> Option<&mut Cell> {
        self.index(pos).map(move |i| &mut self.cells[i])
    }

    pub fn owner_at(&self, pos: Position) -> Option<CountryId> {
        self.get(pos).and_then(|cell| cell.owner)
    }

    pub fn troops_at(&self, pos: Position) -> usize {
        self.get(pos).map_or(0, Cell::troop_count)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Position, &Cell)> {
        let width = self.width;
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, cell)| (Position::new(i as i32 % width, i as i32 / width), cell))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Position, &mut Cell)> {
        let width = self.width;
        self.cells
            .iter_mut()
            .enumerate()
            .map(move |(i, cell)| (Position::new(i as i32 % width, i as i32 / width), cell))
    }

    pub fn neighbours(&self, pos: Position) -> impl Iterator<Item = (Position, &Cell)> {
        ORTHOGONAL.iter().filter_map(move |&(dx, dy)| {
            let next = pos.offset(dx, dy);
            self.get(next).map(|cell| (next, cell))
        })
    }

    pub fn owned_by(&self, country: CountryId) -> impl Iterator<Item = (Position, &Cell)> {
        self.iter().filter(move |(_, cell)| cell.is_owned_by(country))
    }

    pub fn count_owned_by(&self, country: CountryId) -> usize {
        self.owned_by(country).count()
    }

    pub fn reset(&mut self) {
        for cell in &mut self.cells {
            cell.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_reject_negative_and_overflowing_positions() {
        let grid = Grid::new(5, 3);
        assert!(grid.contains(Position::new(0, 0)));
        assert!(grid.contains(Position::new(4, 2)));
        assert!(!grid.contains(Position::new(-1, 0)));
        assert!(!grid.contains(Position::new(5, 0)));
        assert!(!grid.contains(Position::new(0, 3)));
        assert!(grid.get(Position::new(7, 7)).is_none());
    }

    #[test]
    fn offsets_saturate_at_the_coordinate_limits() {
        let edge = Position::new(i32::MAX, i32::MIN);
        assert_eq!(edge.offset(2, -2), edge);
        assert_eq!(Position::new(3, 4).offset(-2, 1), Position::new(1, 5));
    }

    #[test]
    fn oversized_sides_are_clamped() {
        let grid = Grid::new(MAX_GRID_SIDE + 5, 2);
        assert_eq!(grid.width(), MAX_GRID_SIDE as i32);
        assert_eq!(grid.iter().count(), MAX_GRID_SIDE * 2);
    }

    #[test]
    fn corner_has_two_neighbours() {
        let grid = Grid::new(4, 4);
        assert_eq!(grid.neighbours(Position::new(0, 0)).count(), 2);
        assert_eq!(grid.neighbours(Position::new(1, 0)).count(), 3);
        assert_eq!(grid.neighbours(Position::new(1, 1)).count(), 4);
    }

    #[test]
    fn iter_reports_row_major_positions() {
        let mut grid = Grid::new(3, 2);
        grid.get_mut(Position::new(2, 1)).unwrap().owner = Some(CountryId(1));
        let owned: Vec<Position> = grid.owned_by(CountryId(1)).map(|(p, _)| p).collect();
        assert_eq!(owned, vec![Position::new(2, 1)]);
        assert_eq!(grid.iter().count(), 6);
    }

    #[test]
    fn owned_cell_without_troops_is_not_neutral() {
        let mut cell = Cell::default();
        assert!(cell.is_neutral());
        cell.owner = Some(CountryId(0));
        assert!(!cell.is_neutral());
        assert_eq!(cell.troop_count(), 0);
        cell.clear();
        assert!(cell.is_neutral());
    }
}
