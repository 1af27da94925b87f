// country.rs
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CountryId(pub usize);

impl fmt::Display for CountryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Country {
    pub id: CountryId,
    pub name: String,
    pub color: [u8; 3],
    pub is_player: bool,
    pub current_territory: u32,
    /// Never decremented; only drives reward thresholds.
    pub total_territory_ever_owned: u32,
    pub next_reward_threshold: u32,
    pub defeated: bool,
}

impl Country {
    pub fn new(id: CountryId, name: &str, color: [u8; 3], is_player: bool) -> Self {
        Self {
            id,
            name: name.to_string(),
            color,
            is_player,
            current_territory: 0,
            total_territory_ever_owned: 0,
            next_reward_threshold: 0,
            defeated: false,
        }
    }

    pub fn gain_territory(&mut self) {
        self.current_territory += 1;
        self.total_territory_ever_owned += 1;
    }

    pub fn lose_territory(&mut self) -> bool {
        self.current_territory = self.current_territory.saturating_sub(1);
        self.current_territory == 0
    }

    pub fn reward_due(&self) -> bool {
        self.total_territory_ever_owned >= self.next_reward_threshold
    }

    pub fn is_active(&self) -> bool {
        !self.defeated
    }

    pub fn reset(&mut self, reward_step: u32) {
        self.current_territory = 0;
        self.total_territory_ever_owned = 0;
        self.next_reward_threshold = reward_step;
        self.defeated = false;
    }
}
