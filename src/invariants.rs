//! Bookkeeping checks between the grid, the troop arena and country counters.
//!
//! These never fire in a correct engine; a violation means a bug, not bad
//! input.

use crate::game::Game;
use crate::troops::TroopId;
use crate::turn_phase::TurnPhase;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invariant violation: {message}")]
pub struct InvariantViolation {
    pub message: String,
}

impl InvariantViolation {
    fn new(message: String) -> Self {
        Self { message }
    }
}

pub fn check_invariants(game: &Game) -> Vec<InvariantViolation> {
    let mut violations = Vec::new();
    let mut seen: HashMap<TroopId, usize> = HashMap::new();

    for (pos, cell) in game.grid.iter() {
        if cell.owner.is_none() && !cell.troops.is_empty() {
            violations.push(InvariantViolation::new(format!(
                "neutral cell ({}, {}) holds {} groups",
                pos.x,
                pos.y,
                cell.troops.len()
            )));
        }
        for &id in &cell.troops {
            *seen.entry(id).or_insert(0) += 1;
            match game.troops.get(id) {
                None => violations.push(InvariantViolation::new(format!(
                    "cell ({}, {}) lists unknown group {:?}",
                    pos.x, pos.y, id
                ))),
                Some(group) => {
                    if group.position != pos {
                        violations.push(InvariantViolation::new(format!(
                            "group {:?} sits in ({}, {}) but records ({}, {})",
                            id, pos.x, pos.y, group.position.x, group.position.y
                        )));
                    }
                    if cell.owner != Some(group.owner) {
                        violations.push(InvariantViolation::new(format!(
                            "group {:?} of {} sits in a cell owned by {:?}",
                            id, group.owner, cell.owner
                        )));
                    }
                }
            }
        }
    }

    for (id, _) in game.troops.iter() {
        let listed = seen.get(&id).copied().unwrap_or(0);
        if listed != 1 {
            violations.push(InvariantViolation::new(format!(
                "group {:?} is listed by {} cells",
                id, listed
            )));
        }
    }

    for country in &game.countries {
        let owned = game.grid.count_owned_by(country.id);
        if owned != country.current_territory as usize {
            violations.push(InvariantViolation::new(format!(
                "{} counts {} cells but owns {}",
                country.name, country.current_territory, owned
            )));
        }
        if country.defeated {
            let groups = game.troops.count_owned_by(country.id);
            if owned > 0 || groups > 0 {
                violations.push(InvariantViolation::new(format!(
                    "defeated {} still has {} cells and {} groups",
                    country.name, owned, groups
                )));
            }
        }
    }

    if let TurnPhase::GameOver { winner } = game.phase {
        if game.country(winner).map_or(true, |c| c.defeated) {
            violations.push(InvariantViolation::new(format!(
                "winner {} is not a live country",
                winner
            )));
        }
    }

    violations
}

impl Game {
    pub fn check_invariants(&self) -> Vec<InvariantViolation> {
        check_invariants(self)
    }
}
