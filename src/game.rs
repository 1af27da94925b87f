use crate::country::{Country, CountryId};
use crate::error::{GameError, MoveError, Result};
use crate::game_config::GameConfig;
use crate::grid::{Cell, Grid, Position};
use crate::reward::Reward;
use crate::troops::{TroopArena, TroopId};
use crate::turn_phase::TurnPhase;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

pub const MAX_PLACEMENT_ATTEMPTS: u32 = 10_000;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GameState {
    pub turn: u32,
    pub phase: TurnPhase,
    pub winner: Option<CountryId>,
    pub width: i32,
    pub height: i32,
    /// Indexed as `cells[y][x]`.
    pub cells: Vec<Vec<CellState>>,
    pub countries: Vec<CountryState>,
    pub possible_actions: Vec<Action>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct CellState {
    pub owner: Option<CountryId>,
    pub troops: usize,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct CountryState {
    pub id: CountryId,
    pub name: String,
    pub color: [u8; 3],
    pub is_player: bool,
    pub current_territory: u32,
    pub total_territory_ever_owned: u32,
    pub next_reward_threshold: u32,
    pub troops: usize,
    pub defeated: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub enum Action {
    Move {
        from: Position,
        to: Position,
        kind: MoveKind,
    },
    Pass,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub enum MoveKind {
    Occupy,
    Merge,
    Attack { attackers: usize, defenders: usize },
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub enum MoveResult {
    Occupied,
    Merged,
    Conquered {
        defender: CountryId,
        attackers: usize,
        defenders: usize,
        survivors: usize,
        defender_defeated: bool,
    },
    Repelled {
        defender: CountryId,
        attackers: usize,
        defenders: usize,
        survivors: usize,
    },
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct MoveRecord {
    pub country: CountryId,
    pub from: Position,
    pub to: Position,
    pub result: MoveResult,
    pub rewards: Vec<Reward>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct MoveOutcome {
    pub accepted: bool,
    pub clear_selection: bool,
    pub rejection: Option<MoveError>,
    pub player_move: Option<MoveRecord>,
    pub ai_moves: Vec<MoveRecord>,
}

impl MoveOutcome {
    fn rejected(rejection: MoveError) -> Self {
        Self {
            accepted: false,
            clear_selection: true,
            rejection: Some(rejection),
            player_move: None,
            ai_moves: vec![],
        }
    }

    fn accepted(player_move: MoveRecord, ai_moves: Vec<MoveRecord>) -> Self {
        Self {
            accepted: true,
            clear_selection: true,
            rejection: None,
            player_move: Some(player_move),
            ai_moves,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Game {
    pub(crate) config: GameConfig,
    pub(crate) grid: Grid,
    pub(crate) troops: TroopArena,
    pub(crate) countries: Vec<Country>,
    pub(crate) turn: u32,
    pub(crate) phase: TurnPhase,
    pub(crate) rng: StdRng,
}

impl Game {
    pub fn new(config: GameConfig) -> Result<Self> {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Game::with_rng(config, rng)
    }

    pub fn with_rng(config: GameConfig, rng: StdRng) -> Result<Self> {
        config.validate()?;

        let mut game = Self {
            grid: Grid::new(config.width, config.height),
            troops: TroopArena::new(),
            countries: config.to_countries(),
            turn: 0,
            phase: TurnPhase::Active,
            rng,
            config,
        };
        game.place_countries()?;
        info!(
            countries = game.countries.len(),
            width = game.config.width,
            height = game.config.height,
            "game initialized"
        );
        Ok(game)
    }

    pub fn restart(&mut self) -> Result<()> {
        self.grid.reset();
        self.troops.clear();
        for country in &mut self.countries {
            country.reset(self.config.reward_step);
        }
        self.turn = 0;
        self.phase = TurnPhase::Active;
        self.place_countries()?;
        info!("game restarted");
        Ok(())
    }

    fn place_countries(&mut self) -> Result<()> {
        let starts: Vec<Option<Position>> =
            self.config.country_configs().map(|cfg| cfg.start).collect();
        let mut placed: Vec<Position> = starts.iter().flatten().copied().collect();

        for (index, start) in starts.into_iter().enumerate() {
            let pos = match start {
                Some(pos) => pos,
                None => {
                    let pos = self.sample_start(&placed, index)?;
                    placed.push(pos);
                    pos
                }
            };

            let id = CountryId(index);
            let troop = self.troops.spawn(id, pos);
            if let Some(cell) = self.grid.get_mut(pos) {
                cell.owner = Some(id);
                cell.troops = vec![troop];
            }
            let country = &mut self.countries[index];
            country.current_territory = 1;
            country.total_territory_ever_owned = 1;
            country.next_reward_threshold = self.config.reward_step;
            debug!(country = %country.name, x = pos.x, y = pos.y, "country placed");
        }
        Ok(())
    }

    fn sample_start(&mut self, placed: &[Position], index: usize) -> Result<Position> {
        let (min_x, max_x) = spawn_range(self.grid.width(), self.config.spawn_margin);
        let (min_y, max_y) = spawn_range(self.grid.height(), self.config.spawn_margin);
        let spacing = self.config.min_spacing;

        for _ in 0..MAX_PLACEMENT_ATTEMPTS {
            let candidate = Position::new(
                self.rng.gen_range(min_x..=max_x),
                self.rng.gen_range(min_y..=max_y),
            );
            let too_close = placed.iter().any(|p| {
                (p.x - candidate.x).abs() < spacing && (p.y - candidate.y).abs() < spacing
            });
            if !too_close && !placed.contains(&candidate) {
                return Ok(candidate);
            }
        }

        Err(GameError::PlacementFailed {
            country: self.countries[index].name.clone(),
            attempts: MAX_PLACEMENT_ATTEMPTS,
        })
    }

    /// Hands `pos` to `country` with `groups` fresh troop groups, taking it
    /// away from any previous owner. Meant for scripted scenarios; it does not
    /// issue rewards or run a turn.
    pub fn claim_cell(&mut self, country: CountryId, pos: Position, groups: usize) {
        let Some(cell) = self.grid.get_mut(pos) else {
            return;
        };
        let previous = cell.owner;
        let displaced = std::mem::take(&mut cell.troops);
        self.troops.remove_all(&displaced);

        let mut fresh = Vec::with_capacity(groups);
        for _ in 0..groups {
            fresh.push(self.troops.spawn(country, pos));
        }
        if let Some(cell) = self.grid.get_mut(pos) {
            cell.owner = Some(country);
            cell.troops = fresh;
        }

        match previous {
            Some(owner) if owner == country => {}
            Some(owner) => {
                self.countries[country.0].gain_territory();
                if self.countries[owner.0].lose_territory() {
                    self.defeat(owner);
                }
            }
            None => self.countries[country.0].gain_territory(),
        }
    }

    pub fn attempt_player_move(&mut self, from: Position, to: Position) -> MoveOutcome {
        self.attempt_player_move_observed(from, to, |_: &Game, _: &MoveRecord| {})
    }

    pub fn attempt_player_move_observed<F>(
        &mut self,
        from: Position,
        to: Position,
        mut observer: F,
    ) -> MoveOutcome
    where
        F: FnMut(&Game, &MoveRecord),
    {
        let player = self.player_id();
        if let Err(rejection) = self.validate_move(player, from, to) {
            debug!(%rejection, "player move rejected");
            return MoveOutcome::rejected(rejection);
        }

        let record = self.execute_move(player, from, to);
        observer(&*self, &record);
        let ai_moves = self.end_turn(&mut observer);
        MoveOutcome::accepted(record, ai_moves)
    }

    pub fn pass_turn(&mut self) -> std::result::Result<Vec<MoveRecord>, MoveError> {
        if self.is_game_over() {
            return Err(MoveError::GameOver);
        }
        Ok(self.end_turn(&mut |_: &Game, _: &MoveRecord| {}))
    }

    pub(crate) fn execute_move(
        &mut self,
        country: CountryId,
        from: Position,
        to: Position,
    ) -> MoveRecord {
        let moving: Vec<TroopId> = self
            .grid
            .get_mut(from)
            .map(|cell| std::mem::take(&mut cell.troops))
            .unwrap_or_default();
        for &id in &moving {
            self.troops.relocate(id, to);
        }

        let result = match self.grid.owner_at(to) {
            None => {
                if let Some(cell) = self.grid.get_mut(to) {
                    cell.owner = Some(country);
                    cell.troops = moving;
                }
                self.countries[country.0].gain_territory();
                MoveResult::Occupied
            }
            Some(owner) if owner == country => {
                if let Some(cell) = self.grid.get_mut(to) {
                    cell.troops.extend(moving);
                }
                MoveResult::Merged
            }
            Some(defender) => self.resolve_battle(country, defender, moving, to),
        };

        let rewards = match result {
            MoveResult::Occupied | MoveResult::Conquered { .. } => self.issue_rewards(country),
            _ => vec![],
        };

        debug!(
            country = %self.countries[country.0].name,
            from = ?(from.x, from.y),
            to = ?(to.x, to.y),
            ?result,
            "move executed"
        );
        self.debug_check_invariants();

        MoveRecord {
            country,
            from,
            to,
            result,
            rewards,
        }
    }

    fn debug_check_invariants(&self) {
        if cfg!(debug_assertions) {
            let violations = self.check_invariants();
            assert!(violations.is_empty(), "bookkeeping broken: {violations:?}");
        }
    }

    pub fn player_id(&self) -> CountryId {
        CountryId(0)
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn troops(&self) -> &TroopArena {
        &self.troops
    }

    pub fn cell(&self, pos: Position) -> Option<&Cell> {
        self.grid.get(pos)
    }

    pub fn owner_at(&self, pos: Position) -> Option<CountryId> {
        self.grid.owner_at(pos)
    }

    pub fn troops_at(&self, pos: Position) -> usize {
        self.grid.troops_at(pos)
    }

    pub fn countries(&self) -> &[Country] {
        &self.countries
    }

    pub fn country(&self, id: CountryId) -> Option<&Country> {
        self.countries.get(id.0)
    }

    pub fn troops_of(&self, country: CountryId) -> Vec<TroopId> {
        self.troops.owned_by(country).collect()
    }

    pub fn troop_count(&self, country: CountryId) -> usize {
        self.troops.count_owned_by(country)
    }

    pub fn turn(&self) -> u32 {
        self.turn
    }

    pub fn phase(&self) -> &TurnPhase {
        &self.phase
    }

    pub fn winner(&self) -> Option<CountryId> {
        match self.phase {
            TurnPhase::GameOver { winner } => Some(winner),
            TurnPhase::Active => None,
        }
    }

    pub fn is_game_over(&self) -> bool {
        self.winner().is_some()
    }

    pub fn get_game_state(&self) -> GameState {
        let cells = (0..self.grid.height())
            .map(|y| {
                (0..self.grid.width())
                    .map(|x| {
                        let pos = Position::new(x, y);
                        CellState {
                            owner: self.grid.owner_at(pos),
                            troops: self.grid.troops_at(pos),
                        }
                    })
                    .collect()
            })
            .collect();

        let countries = self
            .countries
            .iter()
            .map(|country| CountryState {
                id: country.id,
                name: country.name.clone(),
                color: country.color,
                is_player: country.is_player,
                current_territory: country.current_territory,
                total_territory_ever_owned: country.total_territory_ever_owned,
                next_reward_threshold: country.next_reward_threshold,
                troops: self.troop_count(country.id),
                defeated: country.defeated,
            })
            .collect();

        GameState {
            turn: self.turn,
            phase: self.phase.clone(),
            winner: self.winner(),
            width: self.grid.width(),
            height: self.grid.height(),
            cells,
            countries,
            possible_actions: self.get_possible_actions(),
        }
    }

    pub fn get_possible_actions(&self) -> Vec<Action> {
        if self.is_game_over() {
            return vec![];
        }

        let player = self.player_id();
        let mut actions = Vec::new();
        for (from, cell) in self.grid.owned_by(player) {
            if cell.troop_count() == 0 {
                continue;
            }
            for to in self.move_targets(from) {
                let Some(target) = self.grid.get(to) else {
                    continue;
                };
                let kind = match target.owner {
                    None => MoveKind::Occupy,
                    Some(owner) if owner == player => MoveKind::Merge,
                    Some(_) => MoveKind::Attack {
                        attackers: cell.troop_count(),
                        defenders: target.troop_count(),
                    },
                };
                actions.push(Action::Move { from, to, kind });
            }
        }
        actions.push(Action::Pass);
        actions
    }
}

fn spawn_range(size: i32, margin: i32) -> (i32, i32) {
    if margin >= 0 && size > 2 * margin {
        (margin, size - 1 - margin)
    } else {
        (0, size - 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game_config::CountryConfig;

    fn duel() -> Game {
        let mut config = GameConfig::with_opponents(1);
        config.width = 8;
        config.height = 8;
        config.player = CountryConfig::new("Player", [80, 255, 80]).starting_at(Position::new(1, 1));
        config.opponents[0].start = Some(Position::new(6, 6));
        Game::with_rng(config, StdRng::seed_from_u64(7)).unwrap()
    }

    #[test]
    fn spawn_range_respects_margin() {
        assert_eq!(spawn_range(25, 2), (2, 22));
        assert_eq!(spawn_range(4, 2), (0, 3));
        assert_eq!(spawn_range(5, 2), (2, 2));
    }

    #[test]
    fn fixed_starts_are_used() {
        let game = duel();
        assert_eq!(game.owner_at(Position::new(1, 1)), Some(CountryId(0)));
        assert_eq!(game.owner_at(Position::new(6, 6)), Some(CountryId(1)));
        assert_eq!(game.troops_at(Position::new(1, 1)), 1);
    }

    #[test]
    fn occupy_moves_whole_stack_and_counts_territory() {
        let mut game = duel();
        game.claim_cell(CountryId(0), Position::new(1, 1), 3);
        let outcome = game.attempt_player_move(Position::new(1, 1), Position::new(1, 3));

        assert!(outcome.accepted);
        assert!(outcome.clear_selection);
        assert_eq!(outcome.player_move.unwrap().result, MoveResult::Occupied);
        assert_eq!(game.troops_at(Position::new(1, 1)), 0);
        assert_eq!(game.owner_at(Position::new(1, 1)), Some(CountryId(0)));
        assert_eq!(game.troops_at(Position::new(1, 3)), 3);
        assert_eq!(game.turn(), 1);
        let player = game.country(CountryId(0)).unwrap();
        assert_eq!(player.current_territory, 2);
        assert_eq!(player.total_territory_ever_owned, 2);
    }

    #[test]
    fn merge_concatenates_without_territory_change() {
        let mut game = duel();
        game.claim_cell(CountryId(0), Position::new(2, 1), 2);
        let before = game.country(CountryId(0)).unwrap().clone();

        let outcome = game.attempt_player_move(Position::new(1, 1), Position::new(2, 1));
        assert_eq!(outcome.player_move.unwrap().result, MoveResult::Merged);
        assert_eq!(game.troops_at(Position::new(2, 1)), 3);
        let after = game.country(CountryId(0)).unwrap();
        assert_eq!(after.current_territory, before.current_territory);
        assert_eq!(after.total_territory_ever_owned, before.total_territory_ever_owned);
    }

    #[test]
    fn rejected_move_changes_nothing() {
        let mut game = duel();
        let snapshot = game.get_game_state();
        let outcome = game.attempt_player_move(Position::new(1, 1), Position::new(2, 2));

        assert!(!outcome.accepted);
        assert!(outcome.clear_selection);
        assert_eq!(outcome.rejection, Some(MoveError::IllegalStep { dx: 1, dy: 1 }));
        assert_eq!(game.turn(), 0);
        assert_eq!(game.get_game_state().cells, snapshot.cells);
    }

    #[test]
    fn out_of_bounds_and_foreign_origins_are_rejected() {
        let mut game = duel();
        let outcome = game.attempt_player_move(Position::new(1, 1), Position::new(-1, 1));
        assert_eq!(outcome.rejection, Some(MoveError::OutOfBounds(Position::new(-1, 1))));

        let outcome = game.attempt_player_move(Position::new(6, 6), Position::new(6, 5));
        assert_eq!(outcome.rejection, Some(MoveError::NotOwned(Position::new(6, 6))));

        game.claim_cell(CountryId(0), Position::new(3, 3), 0);
        let outcome = game.attempt_player_move(Position::new(3, 3), Position::new(3, 4));
        assert_eq!(outcome.rejection, Some(MoveError::NoTroops(Position::new(3, 3))));
    }

    #[test]
    fn possible_actions_forecast_battles() {
        let mut game = duel();
        game.claim_cell(CountryId(1), Position::new(1, 2), 4);
        let actions = game.get_possible_actions();

        assert!(actions.contains(&Action::Move {
            from: Position::new(1, 1),
            to: Position::new(1, 2),
            kind: MoveKind::Attack {
                attackers: 1,
                defenders: 4
            },
        }));
        assert!(actions.contains(&Action::Move {
            from: Position::new(1, 1),
            to: Position::new(3, 1),
            kind: MoveKind::Occupy,
        }));
        assert_eq!(actions.last(), Some(&Action::Pass));
    }

    #[test]
    fn snapshot_reports_counts() {
        let game = duel();
        let state = game.get_game_state();
        assert_eq!(state.cells.len(), 8);
        assert_eq!(state.cells[1][1].owner, Some(CountryId(0)));
        assert_eq!(state.cells[1][1].troops, 1);
        assert_eq!(state.countries[1].troops, 1);
        assert_eq!(state.phase, TurnPhase::Active);
        assert!(state.winner.is_none());
    }

    #[test]
    fn observer_sees_player_move_first() {
        let mut game = duel();
        let mut seen = Vec::new();
        game.attempt_player_move_observed(Position::new(1, 1), Position::new(2, 1), |_, record| {
            seen.push(record.country)
        });
        assert_eq!(seen.first(), Some(&CountryId(0)));
    }
}
