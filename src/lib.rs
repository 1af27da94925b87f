// lib.rs
pub mod ai;
pub mod battle;
pub mod country;
pub mod error;
pub mod game;
pub mod game_config;
pub mod grid;
pub mod invariants;
pub mod movement;
pub mod reward;
pub mod troops;
pub mod turn_phase;
