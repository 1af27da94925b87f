use crate::country::{Country, CountryId};
use crate::error::{GameError, Result};
use crate::grid::{Position, MAX_GRID_SIDE};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

const SPARE_COLORS: [[u8; 3]; 7] = [
    [255, 80, 80],
    [80, 150, 255],
    [255, 255, 80],
    [200, 80, 255],
    [80, 255, 255],
    [255, 165, 0],
    [255, 105, 180],
];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GameConfig {
    pub width: usize,
    pub height: usize,
    pub player: CountryConfig,
    pub opponents: Vec<CountryConfig>,
    pub min_spacing: i32,
    pub spawn_margin: i32,
    /// Territory needed per reward, and the initial threshold.
    pub reward_step: u32,
    #[serde(default)]
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CountryConfig {
    pub name: String,
    pub color: [u8; 3],
    /// Fixed starting cell; sampled at random when absent.
    #[serde(default)]
    pub start: Option<Position>,
}

impl CountryConfig {
    pub fn new(name: &str, color: [u8; 3]) -> Self {
        Self {
            name: name.to_string(),
            color,
            start: None,
        }
    }

    pub fn starting_at(mut self, start: Position) -> Self {
        self.start = Some(start);
        self
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        let config_data = include_str!("config.json");
        serde_json::from_str(config_data).expect("Unable to parse embedded config")
    }
}

impl GameConfig {
    /// Default board with `num_opponents` AI countries. Names and colors come
    /// from the embedded config first, then are generated.
    pub fn with_opponents(num_opponents: usize) -> Self {
        let mut config = Self::default();
        config.opponents.truncate(num_opponents);
        for i in config.opponents.len()..num_opponents {
            let color = SPARE_COLORS[i % SPARE_COLORS.len()];
            config
                .opponents
                .push(CountryConfig::new(&format!("AI {}", i + 1), color));
        }
        config
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn country_count(&self) -> usize {
        1 + self.opponents.len()
    }

    pub fn country_configs(&self) -> impl Iterator<Item = &CountryConfig> {
        std::iter::once(&self.player).chain(self.opponents.iter())
    }

    pub fn to_countries(&self) -> Vec<Country> {
        self.country_configs()
            .enumerate()
            .map(|(i, cfg)| {
                let mut country = Country::new(CountryId(i), &cfg.name, cfg.color, i == 0);
                country.reset(self.reward_step);
                country
            })
            .collect()
    }

    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(GameError::InvalidConfig(format!(
                "grid must not be empty, got {}x{}",
                self.width, self.height
            )));
        }
        if self.width > MAX_GRID_SIDE || self.height > MAX_GRID_SIDE {
            return Err(GameError::InvalidConfig(format!(
                "grid sides are limited to {}, got {}x{}",
                MAX_GRID_SIDE, self.width, self.height
            )));
        }
        if self.opponents.is_empty() {
            return Err(GameError::InvalidConfig(
                "at least one opponent is required".to_string(),
            ));
        }
        if self.reward_step == 0 {
            return Err(GameError::InvalidConfig(
                "reward_step must be positive".to_string(),
            ));
        }
        let cells = self.width.checked_mul(self.height).unwrap_or(usize::MAX);
        if self.country_count() > cells {
            return Err(GameError::InvalidConfig(format!(
                "{} countries do not fit on a {}x{} grid",
                self.country_count(),
                self.width,
                self.height
            )));
        }

        let mut starts = HashSet::new();
        for cfg in self.country_configs() {
            if let Some(start) = cfg.start {
                let inside = (0..self.width as i32).contains(&start.x)
                    && (0..self.height as i32).contains(&start.y);
                if !inside {
                    return Err(GameError::InvalidConfig(format!(
                        "start of '{}' at ({}, {}) is outside the grid",
                        cfg.name, start.x, start.y
                    )));
                }
                if !starts.insert(start) {
                    return Err(GameError::InvalidConfig(format!(
                        "start of '{}' at ({}, {}) is already taken",
                        cfg.name, start.x, start.y
                    )));
                }
            }
        }
        Ok(())
    }

    pub fn load_from_file(filename: &str) -> Result<Self> {
        let data = std::fs::read_to_string(filename)?;
        let config: GameConfig = serde_json::from_str(&data)?;
        config.validate()?;
        Ok(config)
    }
}
