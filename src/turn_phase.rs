// turn_phase.rs
use crate::country::CountryId;
use crate::game::{Game, MoveRecord};
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub enum TurnPhase {
    Active,
    GameOver { winner: CountryId },
}

impl Game {
    pub(crate) fn end_turn<F>(&mut self, observer: &mut F) -> Vec<MoveRecord>
    where
        F: FnMut(&Game, &MoveRecord),
    {
        let mut ai_moves = Vec::new();
        for index in 0..self.countries.len() {
            let country = &self.countries[index];
            // A country beaten earlier in this round sits the rest of it out.
            if country.is_player || country.defeated {
                continue;
            }
            if let Some(record) = self.run_ai_turn(CountryId(index)) {
                observer(&*self, &record);
                ai_moves.push(record);
            }
        }

        self.turn += 1;
        self.check_win_conditions();
        ai_moves
    }

    pub fn check_win_conditions(&mut self) -> bool {
        if self.is_game_over() {
            return true;
        }

        let mut survivors = self.countries.iter().filter(|c| c.is_active());
        if let (Some(winner), None) = (survivors.next(), survivors.next()) {
            info!(winner = %winner.name, turn = self.turn, "game over");
            self.phase = TurnPhase::GameOver { winner: winner.id };
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MoveError;
    use crate::game_config::GameConfig;
    use crate::grid::Position;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn two_country_game() -> Game {
        let mut config = GameConfig::with_opponents(1);
        config.width = 10;
        config.height = 10;
        config.player.start = Some(Position::new(2, 2));
        config.opponents[0].start = Some(Position::new(2, 3));
        Game::with_rng(config, StdRng::seed_from_u64(3)).unwrap()
    }

    #[test]
    fn capturing_last_cell_ends_the_game() {
        let mut game = two_country_game();
        game.claim_cell(CountryId(0), Position::new(2, 2), 2);

        let outcome = game.attempt_player_move(Position::new(2, 2), Position::new(2, 3));
        assert!(outcome.accepted);
        assert!(outcome.ai_moves.is_empty());
        assert_eq!(game.phase(), &TurnPhase::GameOver { winner: CountryId(0) });
        assert_eq!(game.turn(), 1);

        let again = game.attempt_player_move(Position::new(2, 3), Position::new(2, 4));
        assert!(!again.accepted);
        assert_eq!(again.rejection, Some(MoveError::GameOver));
        assert_eq!(game.pass_turn(), Err(MoveError::GameOver));
    }

    #[test]
    fn pass_still_runs_ai_and_counts_turn() {
        let mut game = two_country_game();
        let moves = game.pass_turn().unwrap();
        assert_eq!(moves.len(), 1);
        assert_eq!(moves[0].country, CountryId(1));
        assert_eq!(game.turn(), 1);
    }

    #[test]
    fn restart_returns_to_active() {
        let mut game = two_country_game();
        game.claim_cell(CountryId(0), Position::new(2, 2), 2);
        game.attempt_player_move(Position::new(2, 2), Position::new(2, 3));
        assert!(game.is_game_over());

        game.restart().unwrap();
        assert_eq!(game.phase(), &TurnPhase::Active);
        assert_eq!(game.turn(), 0);
        for country in game.countries() {
            assert!(!country.defeated);
            assert_eq!(country.current_territory, 1);
            assert_eq!(country.total_territory_ever_owned, 1);
            assert_eq!(country.next_reward_threshold, 3);
            assert_eq!(game.troop_count(country.id), 1);
        }
        assert!(game.check_invariants().is_empty());
    }
}
