use crate::country::CountryId;
use crate::game::Game;
use crate::grid::{Grid, Position};
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Reward {
    Spawned(Position),
    Forfeited,
}

/// Cells of `country` with no orthogonal neighbour held by another country.
/// Neutral neighbours and the grid edge count as safe.
pub fn safe_cells(grid: &Grid, country: CountryId) -> Vec<Position> {
    grid.owned_by(country)
        .filter(|&(pos, _)| {
            grid.neighbours(pos)
                .all(|(_, neighbour)| neighbour.owner.map_or(true, |owner| owner == country))
        })
        .map(|(pos, _)| pos)
        .collect()
}

impl Game {
    pub(crate) fn issue_rewards(&mut self, country: CountryId) -> Vec<Reward> {
        let step = self.config.reward_step;
        let mut rewards = Vec::new();

        while self.countries[country.0].reward_due() {
            self.countries[country.0].next_reward_threshold += step;

            let safe = safe_cells(&self.grid, country);
            let reward = match safe.choose(&mut self.rng) {
                Some(&pos) => {
                    let id = self.troops.spawn(country, pos);
                    if let Some(cell) = self.grid.get_mut(pos) {
                        cell.troops.push(id);
                    }
                    Reward::Spawned(pos)
                }
                None => Reward::Forfeited,
            };

            debug!(
                country = %self.countries[country.0].name,
                next_threshold = self.countries[country.0].next_reward_threshold,
                ?reward,
                "reward issued"
            );
            rewards.push(reward);
        }
        rewards
    }
}
