// ai.rs
use crate::country::CountryId;
use crate::game::{Game, MoveRecord};
use crate::grid::{Grid, Position};
use crate::movement::MOVE_OFFSETS;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedMove {
    pub from: Position,
    pub to: Position,
}

pub fn border_cells(grid: &Grid, country: CountryId) -> Vec<Position> {
    let occupied: Vec<Position> = grid
        .owned_by(country)
        .filter(|(_, cell)| cell.troop_count() > 0)
        .map(|(pos, _)| pos)
        .collect();

    let border: Vec<Position> = occupied
        .iter()
        .copied()
        .filter(|&pos| {
            grid.neighbours(pos)
                .any(|(_, neighbour)| !neighbour.is_owned_by(country))
        })
        .collect();

    if border.is_empty() {
        occupied
    } else {
        border
    }
}

/// Picks the first acceptable move in random order: any neutral cell, or an
/// enemy cell whose stack is no larger than the acting cell's own stack.
pub fn plan_move<R: Rng + ?Sized>(
    grid: &Grid,
    country: CountryId,
    rng: &mut R,
) -> Option<PlannedMove> {
    let mut candidates = border_cells(grid, country);
    candidates.shuffle(rng);

    for from in candidates {
        let local = grid.troops_at(from);
        let mut offsets = MOVE_OFFSETS;
        offsets.shuffle(rng);

        for (dx, dy) in offsets {
            let to = from.offset(dx, dy);
            let Some(target) = grid.get(to) else {
                continue;
            };
            match target.owner {
                None => return Some(PlannedMove { from, to }),
                Some(owner) if owner != country && local >= target.troop_count() => {
                    return Some(PlannedMove { from, to });
                }
                _ => {}
            }
        }
    }
    None
}

impl Game {
    pub fn plan_move_for(&mut self, country: CountryId) -> Option<PlannedMove> {
        plan_move(&self.grid, country, &mut self.rng)
    }

    pub(crate) fn run_ai_turn(&mut self, country: CountryId) -> Option<MoveRecord> {
        let planned = self.plan_move_for(country)?;
        Some(self.execute_move(country, planned.from, planned.to))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game_config::GameConfig;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const PLAYER: CountryId = CountryId(0);
    const RED: CountryId = CountryId(1);

    fn game() -> Game {
        let mut config = GameConfig::with_opponents(1);
        config.width = 6;
        config.height = 6;
        config.player.start = Some(Position::new(0, 0));
        config.opponents[0].start = Some(Position::new(5, 5));
        Game::with_rng(config, StdRng::seed_from_u64(21)).unwrap()
    }

    #[test]
    fn interior_cells_are_not_border() {
        let mut game = game();
        for y in 2..5 {
            for x in 2..5 {
                game.claim_cell(RED, Position::new(x, y), 1);
            }
        }
        let border = border_cells(game.grid(), RED);
        assert!(!border.contains(&Position::new(3, 3)));
        assert!(border.contains(&Position::new(4, 4)));
        assert!(border.contains(&Position::new(5, 5)));
    }

    #[test]
    fn fallback_uses_all_troop_cells() {
        let mut game = game();
        for y in 0..6 {
            for x in 0..6 {
                game.claim_cell(RED, Position::new(x, y), 0);
            }
        }
        game.claim_cell(RED, Position::new(3, 3), 2);
        assert_eq!(border_cells(game.grid(), RED), vec![Position::new(3, 3)]);
        // nothing to take, so Red passes
        assert!(plan_move(game.grid(), RED, &mut StdRng::seed_from_u64(1)).is_none());
    }

    #[test]
    fn never_attacks_a_bigger_stack() {
        let mut game = game();
        // Red's lone group at (5,5) is boxed in by big player stacks.
        for pos in [(4, 5), (3, 5), (5, 4), (5, 3)] {
            game.claim_cell(PLAYER, Position::new(pos.0, pos.1), 2);
        }
        for seed in 0..20 {
            assert!(plan_move(game.grid(), RED, &mut StdRng::seed_from_u64(seed)).is_none());
        }
    }

    #[test]
    fn attacks_equal_stack_and_takes_neutral_cells() {
        let mut game = game();
        game.claim_cell(PLAYER, Position::new(4, 5), 1);
        game.claim_cell(PLAYER, Position::new(3, 5), 1);
        game.claim_cell(PLAYER, Position::new(5, 4), 1);
        game.claim_cell(PLAYER, Position::new(5, 3), 1);
        for seed in 0..20 {
            let planned = plan_move(game.grid(), RED, &mut StdRng::seed_from_u64(seed)).unwrap();
            assert_eq!(planned.from, Position::new(5, 5));
            assert_eq!(game.owner_at(planned.to), Some(PLAYER));
        }

        let mut open = self::game();
        let planned = plan_move(open.grid(), RED, &mut StdRng::seed_from_u64(0)).unwrap();
        assert!(open.owner_at(planned.to).is_none());
        let record = open.run_ai_turn(RED).unwrap();
        assert_eq!(record.country, RED);
        assert_eq!(open.country(RED).unwrap().current_territory, 2);
    }

    #[test]
    fn moves_stay_on_the_axis() {
        let mut game = game();
        for seed in 0..50 {
            let planned = plan_move(game.grid(), PLAYER, &mut StdRng::seed_from_u64(seed)).unwrap();
            assert!(crate::movement::is_legal_step(planned.from, planned.to));
        }
        assert!(game.plan_move_for(PLAYER).is_some());
    }
}
