// troops.rs
use crate::country::CountryId;
use crate::grid::Position;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TroopId(pub u64);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TroopGroup {
    pub position: Position,
    pub owner: CountryId,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TroopArena {
    groups: BTreeMap<TroopId, TroopGroup>,
    next_id: u64,
}

impl TroopArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn(&mut self, owner: CountryId, position: Position) -> TroopId {
        let id = TroopId(self.next_id);
        self.next_id += 1;
        self.groups.insert(id, TroopGroup { position, owner });
        id
    }

    pub fn get(&self, id: TroopId) -> Option<&TroopGroup> {
        self.groups.get(&id)
    }

    pub fn relocate(&mut self, id: TroopId, position: Position) {
        if let Some(group) = self.groups.get_mut(&id) {
            group.position = position;
        }
    }

    pub fn remove(&mut self, id: TroopId) -> Option<TroopGroup> {
        self.groups.remove(&id)
    }

    pub fn remove_all(&mut self, ids: &[TroopId]) {
        for id in ids {
            self.groups.remove(id);
        }
    }

    pub fn purge_owner(&mut self, country: CountryId) -> Vec<TroopId> {
        let ids: Vec<TroopId> = self.owned_by(country).collect();
        self.remove_all(&ids);
        ids
    }

    pub fn owned_by(&self, country: CountryId) -> impl Iterator<Item = TroopId> + '_ {
        self.groups
            .iter()
            .filter(move |(_, group)| group.owner == country)
            .map(|(&id, _)| id)
    }

    pub fn count_owned_by(&self, country: CountryId) -> usize {
        self.owned_by(country).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = (TroopId, &TroopGroup)> {
        self.groups.iter().map(|(&id, group)| (id, group))
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn clear(&mut self) {
        self.groups.clear();
    }
}
