//! Control-point exposer
//!
//! Declares the writable points of every enabled display group, builds their
//! descriptors, and turns a write intent into actions.

use std::collections::BTreeMap;

use serde_json::Value;
use tracing::{debug, info};

use nd_protocol::{Meta, PathMeta, PossibleValue};

use crate::actions::DisplayActions;
use crate::data::point::{PointId, PointValue, Property};
use crate::data::registry::{DisplayGroup, NightColor, RaymarineColor, Vendor};
use crate::data::settings::BridgeConfig;
use crate::error::{DisplayError, Result};
use crate::host::Host;

/// A declared control point with its initial value and descriptors
#[derive(Debug, Clone, PartialEq)]
pub struct ControlPointSpec {
    pub id: PointId,
    pub default: PointValue,
    pub meta: Meta,
    /// Descriptor for the `nightMode` parent node of night-mode points
    pub parent_meta: Option<PathMeta>,
}

/// Result of an accepted write
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WriteOutcome {
    pub point: PointId,
    pub value: PointValue,
    /// Partner point that received the mirrored change
    pub mirrored: Option<PointId>,
}

fn possible_values<'a>(items: impl Iterator<Item = (&'a str, &'a str)>) -> (Vec<PossibleValue>, Vec<String>) {
    items
        .map(|(key, title)| {
            (
                PossibleValue {
                    title: title.to_string(),
                    value: key.to_string(),
                },
                key.to_string(),
            )
        })
        .unzip()
}

/// Descriptor announced for a control point
pub fn describe(point: &PointId) -> Meta {
    let group = point.group.display_name();
    match point.property {
        Property::Brightness => Meta {
            display_name: Some(format!("{} Brightness", group)),
            units: Some("ratio".into()),
            range: Some([0.0, 1.0]),
            ..Default::default()
        },
        Property::Color => {
            let (possible, keys) =
                possible_values(RaymarineColor::ALL.iter().map(|c| (c.key(), c.display_name())));
            Meta {
                display_name: Some(format!("{} Color", group)),
                possible_values: Some(possible),
                enum_values: Some(keys),
                ..Default::default()
            }
        }
        Property::NightModeState => Meta {
            display_name: Some(format!("{} Night Mode", group)),
            units: Some("bool".into()),
            ..Default::default()
        },
        Property::NightModeColor => {
            let (possible, keys) =
                possible_values(NightColor::ALL.iter().map(|c| (c.key(), c.display_name())));
            Meta {
                display_name: Some(format!("{} Night Color", group)),
                possible_values: Some(possible),
                enum_values: Some(keys),
                ..Default::default()
            }
        }
    }
}

fn default_value(property: Property, config: &BridgeConfig) -> PointValue {
    match property {
        Property::Brightness => PointValue::Ratio(0.0),
        Property::Color => PointValue::Color(config.day_color),
        Property::NightModeState => PointValue::Flag(false),
        Property::NightModeColor => PointValue::NightColor(NightColor::Red),
    }
}

fn spec_for(group: DisplayGroup, property: Property, config: &BridgeConfig) -> Result<ControlPointSpec> {
    let id = PointId::new(group, property)?;
    let parent_meta = (property == Property::NightModeState).then(|| PathMeta {
        path: PointId::night_mode_parent_path(group),
        value: Meta {
            display_name: Some(format!("{} Night Mode", group.display_name())),
            ..Default::default()
        },
    });

    Ok(ControlPointSpec {
        id,
        default: default_value(property, config),
        meta: describe(&id),
        parent_meta,
    })
}

/// Every control point of every enabled group, Raymarine first
pub fn declare_points(config: &BridgeConfig) -> Result<Vec<ControlPointSpec>> {
    let mut specs = Vec::new();
    for vendor in Vendor::ALL {
        for group in config.registry.enabled_groups(vendor) {
            for property in Property::for_vendor(vendor) {
                specs.push(spec_for(group, property, config)?);
            }
        }
    }
    Ok(specs)
}

/// The set of registered control points
#[derive(Debug, Clone, Default)]
pub struct ControlPoints {
    points: BTreeMap<PointId, ControlPointSpec>,
}

impl ControlPoints {
    pub fn new(config: &BridgeConfig) -> Result<Self> {
        let points: BTreeMap<_, _> = declare_points(config)?
            .into_iter()
            .map(|spec| (spec.id, spec))
            .collect();
        info!(count = points.len(), "Declared control points");
        Ok(Self { points })
    }

    pub fn specs(&self) -> Vec<ControlPointSpec> {
        self.points.values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn contains(&self, point: &PointId) -> bool {
        self.points.contains_key(point)
    }

    /// Resolve a path to a registered point
    pub fn resolve(&self, path: &str, config: &BridgeConfig) -> Result<PointId> {
        let point = PointId::parse(path)?;
        if self.contains(&point) {
            return Ok(point);
        }
        config.registry.require_enabled(point.group)?;
        Err(DisplayError::UnknownPoint(path.to_string()))
    }

    /// Validate and apply a write, then mirror it to the partner group.
    ///
    /// Nothing is emitted or published unless validation succeeds.
    pub fn handle_write<H: Host + ?Sized>(
        &self,
        actions: &mut DisplayActions<'_, H>,
        path: &str,
        value: &Value,
    ) -> Result<WriteOutcome> {
        let point = self.resolve(path, actions.config)?;
        let value = PointValue::from_json(&point, value)?;

        actions.apply(point, value)?;
        let mirrored = actions.mirror(point, value)?;
        debug!(point = %point, ?value, mirrored = ?mirrored.map(|p| p.path()), "Write applied");

        Ok(WriteOutcome {
            point,
            value,
            mirrored,
        })
    }
}
