//! Vendor command encoder
//!
//! Pure translation from a semantic display setting to the structured NMEA 2000
//! command the bus transport consumes. Nothing is cached; every call derives
//! the payload from its inputs.

use nd_protocol::{N2kCommand, RaymarineCommand, SimnetKey, SimnetValue};

use crate::constants::night_mode;
use crate::data::point::{PointId, PointValue};
use crate::data::registry::{DisplayGroup, NavicoGroup, NightColor, RaymarineColor, RaymarineGroup};
use crate::data::settings::BridgeConfig;
use crate::error::{DisplayError, Result};

/// Brightness ratios travel as percentages; the product is kept unrounded.
fn percent(ratio: f64) -> f64 {
    ratio * 100.0
}

// ============================================================================
// Raymarine (PGN 126720)
// ============================================================================

pub fn raymarine_brightness(group: RaymarineGroup, ratio: f64) -> N2kCommand {
    let mut fields = N2kCommand::raymarine(group.display_name(), RaymarineCommand::Brightness);
    fields.brightness = Some(percent(ratio));
    fields.into()
}

pub fn raymarine_color(group: RaymarineGroup, color: RaymarineColor) -> N2kCommand {
    let mut fields = N2kCommand::raymarine(group.display_name(), RaymarineCommand::Color);
    fields.color = Some(color.display_name().to_string());
    fields.into()
}

// ============================================================================
// Navico (Simnet PGN 130845)
// ============================================================================

pub fn navico_brightness(group: NavicoGroup, ratio: f64) -> N2kCommand {
    N2kCommand::simnet(
        group.display_name(),
        SimnetKey::BacklightLevel,
        SimnetValue::Level(percent(ratio)),
    )
}

pub fn navico_night_mode(group: NavicoGroup, on: bool) -> N2kCommand {
    let code = if on { night_mode::ON } else { night_mode::OFF };
    N2kCommand::simnet(group.display_name(), SimnetKey::NightMode, SimnetValue::Code(code))
}

/// Night-mode color is a bus-wide setting: the command always addresses the
/// Default group, whichever group requested it.
pub fn navico_night_color(color: NightColor) -> N2kCommand {
    N2kCommand::simnet(
        NavicoGroup::Default.display_name(),
        SimnetKey::NightModeColor,
        SimnetValue::Code(color.protocol_value()),
    )
}

/// Command emitted for a validated write to a control point.
///
/// Raymarine night mode has no command of its own; it is applied as the
/// configured day or night palette.
pub fn encode(point: &PointId, value: &PointValue, config: &BridgeConfig) -> Result<N2kCommand> {
    let command = match (point.group, value) {
        (DisplayGroup::Raymarine(group), PointValue::Ratio(ratio)) => {
            raymarine_brightness(group, *ratio)
        }
        (DisplayGroup::Raymarine(group), PointValue::Color(color)) => raymarine_color(group, *color),
        (DisplayGroup::Raymarine(group), PointValue::Flag(on)) => {
            raymarine_color(group, config.color_for_night_mode(*on))
        }
        (DisplayGroup::Navico(group), PointValue::Ratio(ratio)) => navico_brightness(group, *ratio),
        (DisplayGroup::Navico(group), PointValue::Flag(on)) => navico_night_mode(group, *on),
        (DisplayGroup::Navico(_), PointValue::NightColor(color)) => navico_night_color(*color),
        _ => {
            return Err(DisplayError::invalid_value(
                point.path(),
                "value does not belong to this control point",
            ))
        }
    };
    Ok(command)
}
