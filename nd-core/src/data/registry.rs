//! Display Group Registry
//!
//! Static catalogs of the display groups and palettes each vendor knows about,
//! plus the per-group enable flags loaded from settings. Everything here is a
//! pure lookup; unknown keys are errors, never silently defaulted.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{DisplayError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Vendor {
    Raymarine,
    Navico,
}

impl Vendor {
    pub const ALL: [Vendor; 2] = [Vendor::Raymarine, Vendor::Navico];

    /// Path segment used for this vendor in the data model
    pub fn namespace(self) -> &'static str {
        match self {
            Vendor::Raymarine => "raymarine",
            Vendor::Navico => "navico",
        }
    }

    pub fn from_namespace(ns: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|v| v.namespace() == ns)
    }

    /// The other vendor family
    pub fn other(self) -> Self {
        match self {
            Vendor::Raymarine => Vendor::Navico,
            Vendor::Navico => Vendor::Raymarine,
        }
    }
}

impl fmt::Display for Vendor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.namespace())
    }
}

// ============================================================================
// Raymarine catalogs
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RaymarineGroup {
    None,
    Helm1,
    Helm2,
    Cockpit,
    Flybridge,
    Mast,
    Group1,
    Group2,
    Group3,
    Group4,
    Group5,
}

impl RaymarineGroup {
    pub const ALL: [RaymarineGroup; 11] = [
        RaymarineGroup::None,
        RaymarineGroup::Helm1,
        RaymarineGroup::Helm2,
        RaymarineGroup::Cockpit,
        RaymarineGroup::Flybridge,
        RaymarineGroup::Mast,
        RaymarineGroup::Group1,
        RaymarineGroup::Group2,
        RaymarineGroup::Group3,
        RaymarineGroup::Group4,
        RaymarineGroup::Group5,
    ];

    pub fn key(self) -> &'static str {
        match self {
            RaymarineGroup::None => "none",
            RaymarineGroup::Helm1 => "helm1",
            RaymarineGroup::Helm2 => "helm2",
            RaymarineGroup::Cockpit => "cockpit",
            RaymarineGroup::Flybridge => "flybridge",
            RaymarineGroup::Mast => "mast",
            RaymarineGroup::Group1 => "group1",
            RaymarineGroup::Group2 => "group2",
            RaymarineGroup::Group3 => "group3",
            RaymarineGroup::Group4 => "group4",
            RaymarineGroup::Group5 => "group5",
        }
    }

    /// Human-readable name; also the enumerant name the bus transport expects
    pub fn display_name(self) -> &'static str {
        match self {
            RaymarineGroup::None => "None",
            RaymarineGroup::Helm1 => "Helm 1",
            RaymarineGroup::Helm2 => "Helm 2",
            RaymarineGroup::Cockpit => "Cockpit",
            RaymarineGroup::Flybridge => "Flybridge",
            RaymarineGroup::Mast => "Mast",
            RaymarineGroup::Group1 => "Group 1",
            RaymarineGroup::Group2 => "Group 2",
            RaymarineGroup::Group3 => "Group 3",
            RaymarineGroup::Group4 => "Group 4",
            RaymarineGroup::Group5 => "Group 5",
        }
    }

    pub fn from_key(key: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|g| g.key() == key)
            .ok_or_else(|| DisplayError::unknown_group(Vendor::Raymarine.namespace(), key))
    }
}

/// Raymarine display palettes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RaymarineColor {
    Day1,
    Day2,
    RedBlack,
    Inverse,
}

impl RaymarineColor {
    pub const ALL: [RaymarineColor; 4] = [
        RaymarineColor::Day1,
        RaymarineColor::Day2,
        RaymarineColor::RedBlack,
        RaymarineColor::Inverse,
    ];

    pub fn key(self) -> &'static str {
        match self {
            RaymarineColor::Day1 => "day1",
            RaymarineColor::Day2 => "day2",
            RaymarineColor::RedBlack => "red/black",
            RaymarineColor::Inverse => "inverse",
        }
    }

    /// Human-readable name; also the protocol enumerant
    pub fn display_name(self) -> &'static str {
        match self {
            RaymarineColor::Day1 => "Day 1",
            RaymarineColor::Day2 => "Day 2",
            RaymarineColor::RedBlack => "Red/Black",
            RaymarineColor::Inverse => "Inverse",
        }
    }

    pub fn from_key(key: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|c| c.key() == key)
            .ok_or_else(|| DisplayError::unknown_color(Vendor::Raymarine.namespace(), key))
    }
}

// ============================================================================
// Navico catalogs
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NavicoGroup {
    Default,
    Group1,
    Group2,
    Group3,
    Group4,
    Group5,
    Group6,
}

impl NavicoGroup {
    pub const ALL: [NavicoGroup; 7] = [
        NavicoGroup::Default,
        NavicoGroup::Group1,
        NavicoGroup::Group2,
        NavicoGroup::Group3,
        NavicoGroup::Group4,
        NavicoGroup::Group5,
        NavicoGroup::Group6,
    ];

    pub fn key(self) -> &'static str {
        match self {
            NavicoGroup::Default => "default",
            NavicoGroup::Group1 => "group1",
            NavicoGroup::Group2 => "group2",
            NavicoGroup::Group3 => "group3",
            NavicoGroup::Group4 => "group4",
            NavicoGroup::Group5 => "group5",
            NavicoGroup::Group6 => "group6",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            NavicoGroup::Default => "Default",
            NavicoGroup::Group1 => "Group 1",
            NavicoGroup::Group2 => "Group 2",
            NavicoGroup::Group3 => "Group 3",
            NavicoGroup::Group4 => "Group 4",
            NavicoGroup::Group5 => "Group 5",
            NavicoGroup::Group6 => "Group 6",
        }
    }

    pub fn from_key(key: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|g| g.key() == key)
            .ok_or_else(|| DisplayError::unknown_group(Vendor::Navico.namespace(), key))
    }
}

/// Navico night-mode colors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NightColor {
    Red,
    Green,
    Blue,
    White,
    Magenta,
}

impl NightColor {
    pub const ALL: [NightColor; 5] = [
        NightColor::Red,
        NightColor::Green,
        NightColor::Blue,
        NightColor::White,
        NightColor::Magenta,
    ];

    pub fn key(self) -> &'static str {
        match self {
            NightColor::Red => "red",
            NightColor::Green => "green",
            NightColor::Blue => "blue",
            NightColor::White => "white",
            NightColor::Magenta => "magenta",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            NightColor::Red => "Red",
            NightColor::Green => "Green",
            NightColor::Blue => "Blue",
            NightColor::White => "White",
            NightColor::Magenta => "Magenta",
        }
    }

    /// Simnet "Night mode color" enumerant
    pub fn protocol_value(self) -> u8 {
        match self {
            NightColor::Red => 0,
            NightColor::Green => 1,
            NightColor::Blue => 2,
            NightColor::White => 3,
            NightColor::Magenta => 4,
        }
    }

    pub fn from_key(key: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|c| c.key() == key)
            .ok_or_else(|| DisplayError::unknown_color(Vendor::Navico.namespace(), key))
    }
}

// ============================================================================
// Vendor-scoped group identity
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DisplayGroup {
    Raymarine(RaymarineGroup),
    Navico(NavicoGroup),
}

impl DisplayGroup {
    pub fn vendor(self) -> Vendor {
        match self {
            DisplayGroup::Raymarine(_) => Vendor::Raymarine,
            DisplayGroup::Navico(_) => Vendor::Navico,
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            DisplayGroup::Raymarine(g) => g.key(),
            DisplayGroup::Navico(g) => g.key(),
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            DisplayGroup::Raymarine(g) => g.display_name(),
            DisplayGroup::Navico(g) => g.display_name(),
        }
    }

    pub fn parse(vendor: Vendor, key: &str) -> Result<Self> {
        match vendor {
            Vendor::Raymarine => RaymarineGroup::from_key(key).map(DisplayGroup::Raymarine),
            Vendor::Navico => NavicoGroup::from_key(key).map(DisplayGroup::Navico),
        }
    }

    /// Every group the vendor's protocol defines, in catalog order
    pub fn all(vendor: Vendor) -> Vec<DisplayGroup> {
        match vendor {
            Vendor::Raymarine => RaymarineGroup::ALL.into_iter().map(DisplayGroup::Raymarine).collect(),
            Vendor::Navico => NavicoGroup::ALL.into_iter().map(DisplayGroup::Navico).collect(),
        }
    }
}

impl fmt::Display for DisplayGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.vendor(), self.key())
    }
}

// ============================================================================
// Registry
// ============================================================================

/// Group catalogs plus the enable flags from settings.
///
/// Built once at startup and never mutated afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisplayRegistry {
    disabled: BTreeSet<DisplayGroup>,
}

impl DisplayRegistry {
    /// Registry with every group enabled
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_disabled(groups: impl IntoIterator<Item = DisplayGroup>) -> Self {
        Self {
            disabled: groups.into_iter().collect(),
        }
    }

    /// Resolve a symbolic group key for a vendor
    pub fn lookup(&self, vendor: Vendor, key: &str) -> Result<DisplayGroup> {
        DisplayGroup::parse(vendor, key)
    }

    pub fn is_enabled(&self, group: DisplayGroup) -> bool {
        !self.disabled.contains(&group)
    }

    pub fn require_enabled(&self, group: DisplayGroup) -> Result<()> {
        if self.is_enabled(group) {
            Ok(())
        } else {
            Err(DisplayError::DisabledGroup {
                vendor: group.vendor().to_string(),
                key: group.key().to_string(),
            })
        }
    }

    pub fn enabled_groups(&self, vendor: Vendor) -> Vec<DisplayGroup> {
        DisplayGroup::all(vendor)
            .into_iter()
            .filter(|g| self.is_enabled(*g))
            .collect()
    }

    /// (key, display name) pairs for configuration UIs
    pub fn catalog(vendor: Vendor) -> Vec<(&'static str, &'static str)> {
        DisplayGroup::all(vendor)
            .into_iter()
            .map(|g| (g.key(), g.display_name()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_known_groups() {
        let registry = DisplayRegistry::new();
        assert_eq!(
            registry.lookup(Vendor::Raymarine, "helm1").unwrap(),
            DisplayGroup::Raymarine(RaymarineGroup::Helm1)
        );
        assert_eq!(
            registry.lookup(Vendor::Navico, "default").unwrap(),
            DisplayGroup::Navico(NavicoGroup::Default)
        );
    }

    #[test]
    fn test_lookup_unknown_group_is_error() {
        let registry = DisplayRegistry::new();
        let err = registry.lookup(Vendor::Navico, "helm1").unwrap_err();
        assert!(matches!(err, DisplayError::UnknownGroup { .. }));
        assert!(registry.lookup(Vendor::Raymarine, "group6").is_err());
    }

    #[test]
    fn test_disabled_groups() {
        let mast = DisplayGroup::Raymarine(RaymarineGroup::Mast);
        let registry = DisplayRegistry::with_disabled([mast]);
        assert!(!registry.is_enabled(mast));
        assert!(registry.require_enabled(mast).is_err());
        assert_eq!(registry.enabled_groups(Vendor::Raymarine).len(), 10);
        assert_eq!(registry.enabled_groups(Vendor::Navico).len(), 7);
    }

    #[test]
    fn test_catalog_keys_round_trip() {
        for (key, name) in DisplayRegistry::catalog(Vendor::Raymarine) {
            let group = DisplayGroup::parse(Vendor::Raymarine, key).unwrap();
            assert_eq!(group.display_name(), name);
        }
        assert_eq!(DisplayRegistry::catalog(Vendor::Navico)[0], ("default", "Default"));
    }

    #[test]
    fn test_color_catalogs() {
        assert_eq!(RaymarineColor::from_key("red/black").unwrap(), RaymarineColor::RedBlack);
        assert_eq!(RaymarineColor::RedBlack.display_name(), "Red/Black");
        assert!(RaymarineColor::from_key("red").is_err());
        assert_eq!(NightColor::from_key("magenta").unwrap().protocol_value(), 4);
        assert_eq!(NightColor::Blue.protocol_value(), 2);
    }
}
