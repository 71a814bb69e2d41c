use serde_json::Value;
use tracing::{debug, warn};

use crate::actions::{mirrored, DisplayActions};
use crate::data::point::{PointId, PointValue, Property};
use crate::host::Host;

/// One value observed on a subscription
#[derive(Debug, Clone, PartialEq)]
pub struct StateChange<'a> {
    pub path: &'a str,
    pub value: &'a Value,
    pub source: Option<&'a str>,
}

/// What the engine did with an observed change
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SyncOutcome {
    /// Published by the bridge itself; never re-processed
    SelfEcho,
    /// Not a control point of an enabled group
    NotObserved,
    /// Valid change on a group without a partner
    Unmapped,
    /// Raymarine night state recomputed from a color, without a partner
    Derived,
    /// Applied to the partner point
    Mirrored(PointId),
    /// Partner point already holds the translated value; nothing emitted
    InSync(PointId),
    /// Mapped group, but the property has no counterpart
    Ignored,
    /// Value outside the point's domain
    Invalid,
    /// Valid change whose partner command could not be built
    MirrorFailed,
}

/// Stateless dispatcher; all state lives in the publisher and the config
#[derive(Debug, Clone)]
pub struct SyncEngine {
    own_source: String,
}

impl SyncEngine {
    pub fn new(own_source: impl Into<String>) -> Self {
        Self {
            own_source: own_source.into(),
        }
    }

    pub fn process<H: Host + ?Sized>(
        &self,
        actions: &mut DisplayActions<'_, H>,
        change: StateChange<'_>,
    ) -> SyncOutcome {
        if change.source == Some(self.own_source.as_str()) {
            return SyncOutcome::SelfEcho;
        }

        let point = match PointId::parse(change.path) {
            Ok(point) if actions.config.registry.is_enabled(point.group) => point,
            _ => return SyncOutcome::NotObserved,
        };

        let value = match PointValue::from_json(&point, change.value) {
            Ok(value) => value,
            Err(e) => {
                debug!(error = %e, source = ?change.source, "Ignoring invalid display update");
                return SyncOutcome::Invalid;
            }
        };
        actions.publisher.observe(point, value);

        let mut derived = false;
        if let (Property::Color, PointValue::Color(color)) = (point.property, value) {
            let night = actions.config.is_night_color(color);
            debug!(point = %point, color = color.key(), night, "Derived night mode from color");
            if let Ok(state) = PointId::new(point.group, Property::NightModeState) {
                actions
                    .publisher
                    .publish(&mut *actions.host, &[(state, PointValue::Flag(night))]);
                derived = true;
            }
        }

        let target = match mirrored(actions.config, point, value) {
            Ok(target) => target,
            Err(e) => {
                warn!(error = %e, point = %point, "Mirror failed");
                return SyncOutcome::MirrorFailed;
            }
        };

        match target {
            // Displays confirm commanded state on the bus; stop there
            Some((target, translated)) if actions.publisher.current(&target) == Some(translated) => {
                debug!(from = %point, to = %target, source = ?change.source, "Partner already in sync");
                SyncOutcome::InSync(target)
            }
            Some((target, translated)) => match actions.apply(target, translated) {
                Ok(()) => {
                    debug!(from = %point, to = %target, source = ?change.source, "Synced display update");
                    SyncOutcome::Mirrored(target)
                }
                Err(e) => {
                    warn!(error = %e, point = %point, "Mirror failed");
                    SyncOutcome::MirrorFailed
                }
            },
            None if derived => SyncOutcome::Derived,
            None if actions.config.mappings.partner(point.group).is_some() => SyncOutcome::Ignored,
            None => SyncOutcome::Unmapped,
        }
    }
}
