use crate::country::CountryId;
use crate::game::{Game, MoveResult};
use crate::grid::Position;
use crate::troops::TroopId;
use rand::seq::SliceRandom;
use tracing::{debug, info};

impl Game {
    /// Settles an attack of the `moving` stack on the cell `at` held by
    /// `defender`. Only group counts matter: with `x = attackers - defenders`
    /// the attacker takes the cell with `x` groups when `x >= 0`, otherwise
    /// the defender keeps `-x` groups.
    pub(crate) fn resolve_battle(
        &mut self,
        attacker: CountryId,
        defender: CountryId,
        moving: Vec<TroopId>,
        at: Position,
    ) -> MoveResult {
        let defending: Vec<TroopId> = self
            .grid
            .get(at)
            .map(|cell| cell.troops.clone())
            .unwrap_or_default();
        let attackers = moving.len();
        let defenders = defending.len();

        if attackers >= defenders {
            let survivors = attackers - defenders;
            let (kept, fallen) = moving.split_at(survivors);
            self.troops.remove_all(fallen);
            self.troops.remove_all(&defending);
            if let Some(cell) = self.grid.get_mut(at) {
                cell.owner = Some(attacker);
                cell.troops = kept.to_vec();
            }

            self.countries[attacker.0].gain_territory();
            let defender_defeated = self.countries[defender.0].lose_territory();
            if defender_defeated {
                self.defeat(defender);
            }

            debug!(attackers, defenders, survivors, x = at.x, y = at.y, "cell conquered");
            MoveResult::Conquered {
                defender,
                attackers,
                defenders,
                survivors,
                defender_defeated,
            }
        } else {
            let survivors = defenders - attackers;
            self.troops.remove_all(&moving);

            let kept: Vec<TroopId> = defending
                .choose_multiple(&mut self.rng, survivors)
                .copied()
                .collect();
            let fallen: Vec<TroopId> = defending
                .iter()
                .copied()
                .filter(|id| !kept.contains(id))
                .collect();
            self.troops.remove_all(&fallen);
            if let Some(cell) = self.grid.get_mut(at) {
                cell.troops.retain(|id| kept.contains(id));
            }

            debug!(attackers, defenders, survivors, x = at.x, y = at.y, "attack repelled");
            MoveResult::Repelled {
                defender,
                attackers,
                defenders,
                survivors,
            }
        }
    }

    pub(crate) fn defeat(&mut self, country: CountryId) {
        let purged = self.troops.purge_owner(country);
        for (_, cell) in self.grid.iter_mut() {
            if cell.is_owned_by(country) {
                cell.clear();
            } else if !purged.is_empty() {
                cell.troops.retain(|id| !purged.contains(id));
            }
        }

        let defeated = &mut self.countries[country.0];
        defeated.defeated = true;
        defeated.current_territory = 0;
        info!(country = %defeated.name, groups = purged.len(), "country defeated");
    }
}
