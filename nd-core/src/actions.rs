//! Display actions
//!
//! Applying a value to a control point means one bus command plus the
//! matching self-sourced publish. Mirroring across vendors is a second,
//! explicit application on the partner point and never recurses.

use tracing::debug;

use nd_protocol::NMEA2000_JSON_OUT;

use crate::data::point::{PointId, PointValue, Property};
use crate::data::registry::DisplayGroup;
use crate::data::settings::BridgeConfig;
use crate::encoder;
use crate::error::Result;
use crate::host::Host;
use crate::publisher::StatePublisher;

/// Borrowed view over everything an action touches
pub struct DisplayActions<'a, H: Host + ?Sized> {
    pub host: &'a mut H,
    pub publisher: &'a mut StatePublisher,
    pub config: &'a BridgeConfig,
}

impl<'a, H: Host + ?Sized> DisplayActions<'a, H> {
    pub fn new(host: &'a mut H, publisher: &'a mut StatePublisher, config: &'a BridgeConfig) -> Self {
        Self { host, publisher, config }
    }

    /// Emit the command for `value` and publish the resulting state.
    ///
    /// Raymarine color and night mode are two views of one palette, so
    /// writing either publishes both.
    pub fn apply(&mut self, point: PointId, value: PointValue) -> Result<()> {
        let command = encoder::encode(&point, &value, self.config)?;
        debug!(point = %point, ?value, "Applying display setting");
        self.host.emit(NMEA2000_JSON_OUT, command);

        let mut updates = vec![(point, value)];
        if let DisplayGroup::Raymarine(_) = point.group {
            match value {
                PointValue::Color(color) => updates.push((
                    PointId::new(point.group, Property::NightModeState)?,
                    PointValue::Flag(self.config.is_night_color(color)),
                )),
                PointValue::Flag(on) => updates.push((
                    PointId::new(point.group, Property::Color)?,
                    PointValue::Color(self.config.color_for_night_mode(on)),
                )),
                _ => {}
            }
        }

        self.publisher.publish(&mut *self.host, &updates);
        Ok(())
    }

    /// Apply the partner-side equivalent of a change, if the group is mapped
    pub fn mirror(&mut self, point: PointId, value: PointValue) -> Result<Option<PointId>> {
        match mirrored(self.config, point, value)? {
            Some((target, translated)) => {
                debug!(from = %point, to = %target, ?translated, "Mirroring to partner group");
                self.apply(target, translated)?;
                Ok(Some(target))
            }
            None => Ok(None),
        }
    }
}

/// Partner point and value for a change on `point`.
///
/// Brightness and night mode carry over unchanged. A Raymarine color carries
/// over as the night mode it implies. The Navico night-mode color has no
/// Raymarine counterpart.
pub fn mirrored(
    config: &BridgeConfig,
    point: PointId,
    value: PointValue,
) -> Result<Option<(PointId, PointValue)>> {
    let Some(partner) = config.mappings.partner(point.group) else {
        return Ok(None);
    };

    let translated = match (point.property, value) {
        (Property::Brightness, PointValue::Ratio(_)) => (Property::Brightness, value),
        (Property::NightModeState, PointValue::Flag(_)) => (Property::NightModeState, value),
        (Property::Color, PointValue::Color(color)) => (
            Property::NightModeState,
            PointValue::Flag(config.is_night_color(color)),
        ),
        _ => return Ok(None),
    };

    Ok(Some((PointId::new(partner, translated.0)?, translated.1)))
}
