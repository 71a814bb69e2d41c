//! Bridge lifecycle
//!
//! [`DisplayBridge`] owns the host handle, the resolved configuration and all
//! runtime state. Every event is handled to completion before the next one,
//! so no locking is involved.

use serde_json::Value;
use tracing::{debug, info, warn};

use nd_protocol::{Delta, PutResult, SubscribeCommand, SELF_CONTEXT};

use crate::actions::DisplayActions;
use crate::constants::{paths::DISPLAYS_ROOT, plugin, timing};
use crate::control::{ControlPoints, WriteOutcome};
use crate::data::point::PointId;
use crate::data::registry::Vendor;
use crate::data::settings::BridgeConfig;
use crate::engine::{StateChange, SyncEngine, SyncOutcome};
use crate::error::{DisplayError, Result};
use crate::host::{Host, Teardown};
use crate::publisher::StatePublisher;

pub struct DisplayBridge<H: Host> {
    host: H,
    config: BridgeConfig,
    points: ControlPoints,
    publisher: StatePublisher,
    engine: SyncEngine,
    teardowns: Vec<Teardown>,
    running: bool,
}

impl<H: Host> DisplayBridge<H> {
    pub fn new(host: H, config: BridgeConfig) -> Result<Self> {
        let points = ControlPoints::new(&config)?;
        Ok(Self {
            host,
            config,
            points,
            publisher: StatePublisher::new(plugin::ID),
            engine: SyncEngine::new(plugin::ID),
            teardowns: Vec::new(),
            running: false,
        })
    }

    /// Register write handlers, announce initial state and subscribe.
    ///
    /// Raymarine state is always watched so night mode can be derived from
    /// color; Navico state only matters when something is mapped.
    pub fn start(&mut self) {
        if self.running {
            warn!("Bridge already started");
            return;
        }

        let specs = self.points.specs();
        for spec in &specs {
            self.host.register_put_handler(SELF_CONTEXT, &spec.id.path());
        }
        self.publisher.announce(&mut self.host, &specs);

        let mut vendors = vec![Vendor::Raymarine];
        if !self.config.mappings.is_empty() {
            vendors.push(Vendor::Navico);
        }

        for vendor in vendors {
            let command = SubscribeCommand::new(
                SELF_CONTEXT,
                format!("{}.{}.*", DISPLAYS_ROOT, vendor.namespace()),
                timing::SUBSCRIPTION_PERIOD_MS,
            );
            debug!(?command, "Subscribing");
            match self.host.subscribe(command) {
                Ok(teardown) => self.teardowns.push(teardown),
                Err(e) => self.report_subscription_error(&e),
            }
        }

        self.running = true;
        info!(
            points = specs.len(),
            mappings = self.config.mappings.len(),
            subscriptions = self.teardowns.len(),
            "Display bridge started"
        );
    }

    /// Release every subscription exactly once
    pub fn stop(&mut self) {
        let teardowns = std::mem::take(&mut self.teardowns);
        let released = teardowns.len();
        for teardown in teardowns {
            teardown();
        }
        if self.running {
            info!(released, "Display bridge stopped");
        }
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Handle a write intent from the host; always answers synchronously
    pub fn handle_put(&mut self, context: &str, path: &str, value: &Value) -> PutResult {
        match self.write(context, path, value) {
            Ok(outcome) => {
                debug!(point = %outcome.point, mirrored = outcome.mirrored.is_some(), "Put completed");
                PutResult::completed()
            }
            Err(e) if e.is_rejection() => {
                warn!(path, error = %e, "Put rejected");
                PutResult::rejected(e.to_string())
            }
            Err(e) => {
                warn!(path, error = %e, "Put failed");
                PutResult::failed(e.to_string())
            }
        }
    }

    fn write(&mut self, context: &str, path: &str, value: &Value) -> Result<WriteOutcome> {
        if !self.running {
            return Err(DisplayError::NotRunning);
        }
        if context != SELF_CONTEXT {
            return Err(DisplayError::UnknownPoint(format!("{}.{}", context, path)));
        }
        let mut actions = DisplayActions::new(&mut self.host, &mut self.publisher, &self.config);
        self.points.handle_write(&mut actions, path, value)
    }

    /// Feed a delta delivered by a subscription through the sync engine
    pub fn handle_delta(&mut self, delta: &Delta) -> Vec<SyncOutcome> {
        if !self.running {
            return Vec::new();
        }

        let mut outcomes = Vec::new();
        for update in &delta.updates {
            for pv in &update.values {
                let mut actions =
                    DisplayActions::new(&mut self.host, &mut self.publisher, &self.config);
                let outcome = self.engine.process(
                    &mut actions,
                    StateChange {
                        path: &pv.path,
                        value: &pv.value,
                        source: update.source.as_deref(),
                    },
                );
                outcomes.push(outcome);
            }
        }
        outcomes
    }

    /// Terminal subscription failure: reported once, never retried
    pub fn on_subscription_error(&mut self, message: &str) {
        self.report_subscription_error(&DisplayError::Subscription(message.to_string()));
    }

    fn report_subscription_error(&mut self, error: &DisplayError) {
        warn!(%error, "Subscription error");
        self.host.set_plugin_error(&error.to_string());
    }

    /// Last known value of a control point
    pub fn read(&self, path: &str) -> Option<Value> {
        let point = PointId::parse(path).ok()?;
        self.publisher.current(&point).map(|v| v.to_json())
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    pub fn points(&self) -> &ControlPoints {
        &self.points
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }
}

impl<H: Host> Drop for DisplayBridge<H> {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::mapping::{GroupMapping, MappingTable};
    use crate::data::registry::{NavicoGroup, RaymarineGroup};
    use crate::host::{MemoryHost, MockHost};
    use serde_json::json;

    fn mapped_config() -> BridgeConfig {
        BridgeConfig {
            mappings: MappingTable::new(vec![GroupMapping::new(
                RaymarineGroup::Helm1,
                NavicoGroup::Group2,
            )])
            .unwrap(),
            ..Default::default()
        }
    }

    #[test]
    fn test_start_subscribes_per_mapping_state() {
        let mut bridge = DisplayBridge::new(MemoryHost::new(), BridgeConfig::default()).unwrap();
        bridge.start();
        assert_eq!(bridge.host().active_subscriptions(), 1);
        assert!(bridge.host().is_subscribed("electrical.displays.raymarine.helm1.color"));
        assert!(!bridge.host().is_subscribed("electrical.displays.navico.group2.brightness"));

        let mut bridge = DisplayBridge::new(MemoryHost::new(), mapped_config()).unwrap();
        bridge.start();
        assert_eq!(bridge.host().active_subscriptions(), 2);
    }

    #[test]
    fn test_start_announces_defaults() {
        let mut bridge = DisplayBridge::new(MemoryHost::new(), BridgeConfig::default()).unwrap();
        bridge.start();
        assert!(bridge.host().is_registered("electrical.displays.navico.default.nightModeColor"));
        assert_eq!(
            bridge.read("electrical.displays.raymarine.helm1.color"),
            Some(json!("day1"))
        );
        assert_eq!(
            bridge.read("electrical.displays.navico.group3.nightModeColor"),
            Some(json!("red"))
        );
    }

    #[test]
    fn test_stop_runs_teardowns_once() {
        let mut bridge = DisplayBridge::new(MemoryHost::new(), mapped_config()).unwrap();
        bridge.start();
        bridge.stop();
        bridge.stop();
        assert_eq!(bridge.host().teardown_count(), 2);
        assert!(!bridge.is_running());
    }

    #[test]
    fn test_put_rejections() {
        let mut bridge = DisplayBridge::new(MemoryHost::new(), mapped_config()).unwrap();
        bridge.start();
        bridge.host_mut().drain_events();

        let result = bridge.handle_put(SELF_CONTEXT, "electrical.displays.raymarine.helm9.brightness", &json!(0.5));
        assert_eq!(result.status_code, 400);

        let result = bridge.handle_put("vessels.other", "electrical.displays.raymarine.helm1.brightness", &json!(0.5));
        assert_eq!(result.status_code, 400);
        assert!(bridge.host().events().is_empty());
    }

    #[test]
    fn test_put_refused_when_not_running() {
        let path = "electrical.displays.raymarine.helm1.brightness";

        let mut bridge = DisplayBridge::new(MemoryHost::new(), mapped_config()).unwrap();
        let result = bridge.handle_put(SELF_CONTEXT, path, &json!(0.5));
        assert_eq!(result.status_code, 500);
        assert!(bridge.host().events().is_empty());

        bridge.start();
        bridge.stop();
        bridge.host_mut().drain_events();
        let result = bridge.handle_put(SELF_CONTEXT, path, &json!(0.5));
        assert_eq!(result.status_code, 500);
        assert!(bridge.host().commands().is_empty());
        assert_eq!(bridge.read(path), Some(json!(0.0)));
    }

    #[test]
    fn test_subscription_failure_reported_to_error_sink() {
        let mut host = MockHost::new();
        host.expect_register_put_handler().returning(|_, _| ());
        host.expect_publish().returning(|_, _| ());
        host.expect_publish_meta().returning(|_, _| ());
        host.expect_subscribe()
            .times(1)
            .returning(|_| Err(DisplayError::Subscription("no subscription manager".into())));
        host.expect_set_plugin_error()
            .withf(|message| message.to_string() == "Subscription failed: no subscription manager")
            .times(1)
            .returning(|_| ());
        host.expect_emit().never();

        let mut bridge = DisplayBridge::new(host, BridgeConfig::default()).unwrap();
        bridge.start();
        assert!(bridge.is_running());
    }
}
