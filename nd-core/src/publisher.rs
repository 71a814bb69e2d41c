//! State publisher
//!
//! Pushes canonical control point values into the host data model, always
//! under the bridge's own source id, and keeps the last known value of every
//! point for reads.

use std::collections::HashMap;

use tracing::trace;

use nd_protocol::{PathMeta, PathValue};

use crate::control::ControlPointSpec;
use crate::data::point::{PointId, PointValue};
use crate::host::Host;

#[derive(Debug, Clone)]
pub struct StatePublisher {
    source: String,
    values: HashMap<PointId, PointValue>,
}

impl StatePublisher {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            values: HashMap::new(),
        }
    }

    /// Source id stamped on every published update
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Publish a batch of values in one update; fire-and-forget
    pub fn publish<H: Host + ?Sized>(&mut self, host: &mut H, updates: &[(PointId, PointValue)]) {
        if updates.is_empty() {
            return;
        }

        let values = updates
            .iter()
            .map(|(point, value)| {
                trace!(point = %point, ?value, "Publishing");
                self.values.insert(*point, *value);
                PathValue::new(point.path(), value.to_json())
            })
            .collect();

        host.publish(&self.source, values);
    }

    /// Announce initial values and descriptors for declared control points
    pub fn announce<H: Host + ?Sized>(&mut self, host: &mut H, specs: &[ControlPointSpec]) {
        let initial: Vec<_> = specs.iter().map(|s| (s.id, s.default)).collect();
        self.publish(host, &initial);

        let meta = specs
            .iter()
            .flat_map(|spec| {
                let own = PathMeta {
                    path: spec.id.path(),
                    value: spec.meta.clone(),
                };
                std::iter::once(own).chain(spec.parent_meta.clone())
            })
            .collect();
        host.publish_meta(&self.source, meta);
    }

    /// Record a value observed from another source without republishing it
    pub fn observe(&mut self, point: PointId, value: PointValue) {
        self.values.insert(point, value);
    }

    /// Last known value of a point
    pub fn current(&self, point: &PointId) -> Option<PointValue> {
        self.values.get(point).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::point::Property;
    use crate::data::registry::{DisplayGroup, RaymarineGroup};
    use crate::host::MemoryHost;
    use serde_json::json;

    #[test]
    fn test_publish_tags_source_and_caches() {
        let mut host = MemoryHost::new();
        let mut publisher = StatePublisher::new("me");
        let point = PointId::new(DisplayGroup::Raymarine(RaymarineGroup::Mast), Property::NightModeState).unwrap();

        publisher.publish(&mut host, &[(point, PointValue::Flag(true))]);

        let published = host.published();
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].0, "me");
        assert_eq!(published[0].1.value, json!(1));
        assert_eq!(publisher.current(&point), Some(PointValue::Flag(true)));
    }

    #[test]
    fn test_empty_batch_publishes_nothing() {
        let mut host = MemoryHost::new();
        StatePublisher::new("me").publish(&mut host, &[]);
        assert!(host.events().is_empty());
    }

    #[test]
    fn test_observe_does_not_publish() {
        let host = MemoryHost::new();
        let mut publisher = StatePublisher::new("me");
        let point = PointId::new(DisplayGroup::Raymarine(RaymarineGroup::Mast), Property::Brightness).unwrap();

        publisher.observe(point, PointValue::Ratio(0.7));
        assert_eq!(publisher.current(&point), Some(PointValue::Ratio(0.7)));
        assert!(host.published().is_empty());
    }
}
