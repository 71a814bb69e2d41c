//! N2K Displays Core Library
//!
//! Keeps Raymarine and Navico display groups on an NMEA 2000 bus in step.
//!
//! # Features
//!
//! - **Control Points**: brightness, palette and night mode of every display group,
//!   exposed as writable data-model paths
//! - **Command Encoding**: exact Seatalk-NG (PGN 126720) and Simnet (PGN 130845) payloads
//! - **Group Sync**: mirrors changes between user-paired groups without feedback loops
//! - **Night Mode Inference**: Raymarine night state derived from the active palette
//!
//! # Module Structure
//!
//! - `data/` - Catalogs, control point identity, mappings, settings
//! - `engine/` - Sync engine
//! - `bridge` - Lifecycle and event entry points
//!
//! # Example
//!
//! ```no_run
//! use nd_core::{load_settings, DisplayBridge, MemoryHost};
//!
//! let config = load_settings(None).unwrap().resolve().unwrap();
//! let mut bridge = DisplayBridge::new(MemoryHost::new(), config).unwrap();
//! bridge.start();
//! ```

// Grouped modules
pub mod data;
pub mod engine;

// Standalone modules
pub mod actions;
pub mod bridge;
pub mod constants;
pub mod control;
pub mod encoder;
pub mod error;
pub mod host;
pub mod publisher;

// Re-export primary types from data/
pub use data::{
    DisplayGroup, DisplayRegistry, GroupMapping, MappingTable, NavicoGroup, NightColor, PointId,
    PointValue, Property, RaymarineColor, RaymarineGroup, Vendor,
};

// Re-export settings from data/
pub use data::{
    get_settings_path, load_settings, settings_schema, BridgeConfig, BridgeSettings,
    GroupMappingEntry,
};

// Re-export error types
pub use error::{DisplayError, Result};

// Re-export runtime types
pub use actions::{mirrored, DisplayActions};
pub use bridge::DisplayBridge;
pub use control::{declare_points, describe, ControlPointSpec, ControlPoints, WriteOutcome};
pub use engine::{StateChange, SyncEngine, SyncOutcome};
pub use host::{Host, HostEvent, MemoryHost, Teardown};
pub use publisher::StatePublisher;
