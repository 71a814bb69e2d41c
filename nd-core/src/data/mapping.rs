//! Raymarine <-> Navico group mappings
//!
//! A mapping pairs one Raymarine display group with one Navico display group.
//! Each group may appear in at most one mapping, otherwise a sync target would
//! be ambiguous; duplicates are rejected when the table is built.

use std::collections::HashSet;

use crate::data::registry::{DisplayGroup, NavicoGroup, RaymarineGroup, Vendor};
use crate::error::{DisplayError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GroupMapping {
    pub raymarine: RaymarineGroup,
    pub navico: NavicoGroup,
}

impl GroupMapping {
    pub fn new(raymarine: RaymarineGroup, navico: NavicoGroup) -> Self {
        Self { raymarine, navico }
    }
}

/// Immutable lookup table of group mappings, in settings order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MappingTable {
    entries: Vec<GroupMapping>,
}

impl MappingTable {
    pub fn new(entries: Vec<GroupMapping>) -> Result<Self> {
        let mut raymarine_seen = HashSet::new();
        let mut navico_seen = HashSet::new();

        for mapping in &entries {
            if !raymarine_seen.insert(mapping.raymarine) {
                return Err(DisplayError::DuplicateMapping {
                    vendor: Vendor::Raymarine.to_string(),
                    key: mapping.raymarine.key().to_string(),
                });
            }
            if !navico_seen.insert(mapping.navico) {
                return Err(DisplayError::DuplicateMapping {
                    vendor: Vendor::Navico.to_string(),
                    key: mapping.navico.key().to_string(),
                });
            }
        }

        Ok(Self { entries })
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[GroupMapping] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn navico_for(&self, group: RaymarineGroup) -> Option<NavicoGroup> {
        self.entries
            .iter()
            .find(|m| m.raymarine == group)
            .map(|m| m.navico)
    }

    pub fn raymarine_for(&self, group: NavicoGroup) -> Option<RaymarineGroup> {
        self.entries
            .iter()
            .find(|m| m.navico == group)
            .map(|m| m.raymarine)
    }

    /// The group of the other vendor paired with `group`, if any
    pub fn partner(&self, group: DisplayGroup) -> Option<DisplayGroup> {
        match group {
            DisplayGroup::Raymarine(g) => self.navico_for(g).map(DisplayGroup::Navico),
            DisplayGroup::Navico(g) => self.raymarine_for(g).map(DisplayGroup::Raymarine),
        }
    }
}
