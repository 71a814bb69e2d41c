//! Control point identity and values
//!
//! A control point is a (display group, property) pair. Paths are built from
//! the structured identity and parsed exactly once, where a host message
//! enters the bridge.

use std::fmt;

use serde_json::Value;

use crate::constants::paths::DISPLAYS_ROOT;
use crate::data::registry::{DisplayGroup, NightColor, RaymarineColor, Vendor};
use crate::error::{DisplayError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Property {
    Brightness,
    /// Raymarine palette
    Color,
    NightModeState,
    /// Navico night-mode color
    NightModeColor,
}

impl Property {
    pub const ALL: [Property; 4] = [
        Property::Brightness,
        Property::Color,
        Property::NightModeState,
        Property::NightModeColor,
    ];

    /// Trailing path segment(s) for this property
    pub fn suffix(self) -> &'static str {
        match self {
            Property::Brightness => "brightness",
            Property::Color => "color",
            Property::NightModeState => "nightMode.state",
            Property::NightModeColor => "nightModeColor",
        }
    }

    pub fn from_suffix(suffix: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.suffix() == suffix)
    }

    pub fn applies_to(self, vendor: Vendor) -> bool {
        match self {
            Property::Brightness | Property::NightModeState => true,
            Property::Color => vendor == Vendor::Raymarine,
            Property::NightModeColor => vendor == Vendor::Navico,
        }
    }

    /// Properties exposed for every group of a vendor, in announcement order
    pub fn for_vendor(vendor: Vendor) -> Vec<Property> {
        Self::ALL
            .into_iter()
            .filter(|p| p.applies_to(vendor))
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PointId {
    pub group: DisplayGroup,
    pub property: Property,
}

impl PointId {
    pub fn new(group: DisplayGroup, property: Property) -> Result<Self> {
        if !property.applies_to(group.vendor()) {
            return Err(DisplayError::UnknownPoint(format!(
                "{}.{}",
                group,
                property.suffix()
            )));
        }
        Ok(Self { group, property })
    }

    /// Full data-model path, e.g. `electrical.displays.raymarine.helm1.brightness`
    pub fn path(&self) -> String {
        format!(
            "{}.{}.{}.{}",
            DISPLAYS_ROOT,
            self.group.vendor().namespace(),
            self.group.key(),
            self.property.suffix()
        )
    }

    /// Parse a data-model path into a control point identity
    pub fn parse(path: &str) -> Result<Self> {
        let unknown = || DisplayError::UnknownPoint(path.to_string());

        let rest = path
            .strip_prefix(DISPLAYS_ROOT)
            .and_then(|r| r.strip_prefix('.'))
            .ok_or_else(unknown)?;

        let (namespace, rest) = rest.split_once('.').ok_or_else(unknown)?;
        let vendor = Vendor::from_namespace(namespace).ok_or_else(unknown)?;

        let (group_key, suffix) = rest.split_once('.').ok_or_else(unknown)?;
        let group = DisplayGroup::parse(vendor, group_key)?;
        let property = Property::from_suffix(suffix).ok_or_else(unknown)?;

        Self::new(group, property)
    }

    /// Path of the `nightMode` parent node, which carries its own descriptor
    pub fn night_mode_parent_path(group: DisplayGroup) -> String {
        format!(
            "{}.{}.{}.nightMode",
            DISPLAYS_ROOT,
            group.vendor().namespace(),
            group.key()
        )
    }
}

impl fmt::Display for PointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// A validated control point value
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointValue {
    Ratio(f64),
    Color(RaymarineColor),
    NightColor(NightColor),
    Flag(bool),
}

impl PointValue {
    /// Validate a raw host value against the point's domain
    pub fn from_json(point: &PointId, value: &Value) -> Result<Self> {
        let invalid = |reason: String| DisplayError::invalid_value(point.path(), reason);

        match point.property {
            Property::Brightness => nd_protocol::parse_ratio(value)
                .map(PointValue::Ratio)
                .map_err(invalid),
            Property::NightModeState => nd_protocol::parse_flag(value)
                .map(PointValue::Flag)
                .map_err(invalid),
            Property::Color => {
                let key = nd_protocol::parse_key(value).map_err(invalid)?;
                RaymarineColor::from_key(key)
                    .map(PointValue::Color)
                    .map_err(|e| invalid(e.to_string()))
            }
            Property::NightModeColor => {
                let key = nd_protocol::parse_key(value).map_err(invalid)?;
                NightColor::from_key(key)
                    .map(PointValue::NightColor)
                    .map_err(|e| invalid(e.to_string()))
            }
        }
    }

    /// Host representation; night-mode flags are published as 0/1
    pub fn to_json(&self) -> Value {
        match self {
            PointValue::Ratio(r) => Value::from(*r),
            PointValue::Color(c) => Value::from(c.key()),
            PointValue::NightColor(c) => Value::from(c.key()),
            PointValue::Flag(on) => Value::from(u8::from(*on)),
        }
    }
}
