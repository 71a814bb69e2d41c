//! Host seam
//!
//! Everything the bridge needs from its host: write-handler registration,
//! publishing into the data model, bus command emission, subscriptions and a
//! plugin error sink. [`MemoryHost`] is an in-process implementation that
//! records every interaction in order; the daemon drains it as its outbox.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use serde::Serialize;

use nd_protocol::{
    Delta, N2kCommand, PathMeta, PathValue, SubscribeCommand, Update, SELF_CONTEXT,
};

use crate::error::Result;

/// Releases one subscription. Invoked at most once, on stop.
pub type Teardown = Box<dyn FnOnce() + Send>;

#[cfg_attr(test, mockall::automock)]
pub trait Host {
    /// Declare a writable path; writes to it are routed to the bridge
    fn register_put_handler(&mut self, context: &str, path: &str);

    /// Publish values into the data model under `source`
    fn publish(&mut self, source: &str, values: Vec<PathValue>);

    /// Publish one-time descriptors under `source`
    fn publish_meta(&mut self, source: &str, meta: Vec<PathMeta>);

    /// Hand a command to the bus transport
    fn emit(&mut self, event: &str, command: N2kCommand);

    fn subscribe(&mut self, command: SubscribeCommand) -> Result<Teardown>;

    fn set_plugin_error(&mut self, message: &str);
}

// ============================================================================
// In-memory host
// ============================================================================

/// One recorded host interaction
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum HostEvent {
    RegisterPut { context: String, path: String },
    Delta(Delta),
    Meta(Delta),
    Emit { event: String, command: N2kCommand },
    Subscribe(SubscribeCommand),
    PluginError { message: String },
}

#[derive(Debug)]
struct MemorySubscription {
    command: SubscribeCommand,
    active: Arc<AtomicBool>,
}

#[derive(Debug, Default)]
pub struct MemoryHost {
    events: Vec<HostEvent>,
    registered: Vec<String>,
    subscriptions: Vec<MemorySubscription>,
    teardowns: Arc<AtomicUsize>,
    errors: Vec<String>,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[HostEvent] {
        &self.events
    }

    /// Take every event recorded since the last drain
    pub fn drain_events(&mut self) -> Vec<HostEvent> {
        std::mem::take(&mut self.events)
    }

    /// Commands emitted for the bus, in order
    pub fn commands(&self) -> Vec<&N2kCommand> {
        self.events
            .iter()
            .filter_map(|e| match e {
                HostEvent::Emit { command, .. } => Some(command),
                _ => None,
            })
            .collect()
    }

    /// Published values with their source, in order
    pub fn published(&self) -> Vec<(&str, &PathValue)> {
        self.events
            .iter()
            .filter_map(|e| match e {
                HostEvent::Delta(delta) => Some(delta),
                _ => None,
            })
            .flat_map(|delta| delta.updates.iter())
            .flat_map(|update| {
                let source = update.source.as_deref().unwrap_or_default();
                update.values.iter().map(move |v| (source, v))
            })
            .collect()
    }

    /// Last value published for a path, if any
    pub fn last_published(&self, path: &str) -> Option<&serde_json::Value> {
        self.published()
            .into_iter()
            .rev()
            .find(|(_, v)| v.path == path)
            .map(|(_, v)| &v.value)
    }

    /// Every path a put handler was registered for
    pub fn registered_paths(&self) -> &[String] {
        &self.registered
    }

    pub fn is_registered(&self, path: &str) -> bool {
        self.registered.iter().any(|p| p == path)
    }

    /// Whether an active subscription covers `path`
    pub fn is_subscribed(&self, path: &str) -> bool {
        self.subscriptions
            .iter()
            .any(|s| s.active.load(Ordering::SeqCst) && s.command.matches(path))
    }

    pub fn active_subscriptions(&self) -> usize {
        self.subscriptions
            .iter()
            .filter(|s| s.active.load(Ordering::SeqCst))
            .count()
    }

    /// Number of teardown handles invoked so far
    pub fn teardown_count(&self) -> usize {
        self.teardowns.load(Ordering::SeqCst)
    }

    pub fn plugin_errors(&self) -> &[String] {
        &self.errors
    }

    fn delta(source: &str, values: Vec<PathValue>, meta: Vec<PathMeta>) -> Delta {
        Delta {
            context: Some(SELF_CONTEXT.to_string()),
            updates: vec![Update {
                source: Some(source.to_string()),
                values,
                meta,
            }],
        }
    }
}

impl Host for MemoryHost {
    fn register_put_handler(&mut self, context: &str, path: &str) {
        self.registered.push(path.to_string());
        self.events.push(HostEvent::RegisterPut {
            context: context.to_string(),
            path: path.to_string(),
        });
    }

    fn publish(&mut self, source: &str, values: Vec<PathValue>) {
        self.events
            .push(HostEvent::Delta(Self::delta(source, values, Vec::new())));
    }

    fn publish_meta(&mut self, source: &str, meta: Vec<PathMeta>) {
        self.events
            .push(HostEvent::Meta(Self::delta(source, Vec::new(), meta)));
    }

    fn emit(&mut self, event: &str, command: N2kCommand) {
        self.events.push(HostEvent::Emit {
            event: event.to_string(),
            command,
        });
    }

    fn subscribe(&mut self, command: SubscribeCommand) -> Result<Teardown> {
        let active = Arc::new(AtomicBool::new(true));
        self.events.push(HostEvent::Subscribe(command.clone()));
        self.subscriptions.push(MemorySubscription {
            command,
            active: Arc::clone(&active),
        });

        let teardowns = Arc::clone(&self.teardowns);
        Ok(Box::new(move || {
            if active.swap(false, Ordering::SeqCst) {
                teardowns.fetch_add(1, Ordering::SeqCst);
            }
        }))
    }

    fn set_plugin_error(&mut self, message: &str) {
        self.errors.push(message.to_string());
        self.events.push(HostEvent::PluginError {
            message: message.to_string(),
        });
    }
}
