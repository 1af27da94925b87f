use crate::country::CountryId;
use crate::error::MoveError;
use crate::game::Game;
use crate::grid::Position;

pub const MOVE_OFFSETS: [(i32, i32); 8] = [
    (0, -1),
    (0, 1),
    (-1, 0),
    (1, 0),
    (0, -2),
    (0, 2),
    (-2, 0),
    (2, 0),
];

pub fn is_legal_step(from: Position, to: Position) -> bool {
    check_step(from, to).is_ok()
}

pub fn check_step(from: Position, to: Position) -> Result<(), MoveError> {
    let dx = i32::try_from(to.x.abs_diff(from.x)).unwrap_or(i32::MAX);
    let dy = i32::try_from(to.y.abs_diff(from.y)).unwrap_or(i32::MAX);
    match (dx, dy) {
        (1 | 2, 0) | (0, 1 | 2) => Ok(()),
        _ => Err(MoveError::IllegalStep { dx, dy }),
    }
}

impl Game {
    pub fn validate_move(
        &self,
        country: CountryId,
        from: Position,
        to: Position,
    ) -> Result<(), MoveError> {
        if self.is_game_over() {
            return Err(MoveError::GameOver);
        }
        if !self.grid.contains(from) {
            return Err(MoveError::OutOfBounds(from));
        }
        if !self.grid.contains(to) {
            return Err(MoveError::OutOfBounds(to));
        }
        if self.grid.owner_at(from) != Some(country) {
            return Err(MoveError::NotOwned(from));
        }
        if self.grid.troops_at(from) == 0 {
            return Err(MoveError::NoTroops(from));
        }
        check_step(from, to)
    }

    pub fn is_selectable(&self, pos: Position) -> bool {
        !self.is_game_over()
            && self.grid.owner_at(pos) == Some(self.player_id())
            && self.grid.troops_at(pos) > 0
    }

    pub fn move_targets(&self, from: Position) -> Vec<Position> {
        MOVE_OFFSETS
            .iter()
            .map(|&(dx, dy)| from.offset(dx, dy))
            .filter(|&to| self.grid.contains(to))
            .collect()
    }
}
