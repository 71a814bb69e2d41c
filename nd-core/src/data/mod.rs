//! Data types, configuration, and catalogs
//!
//! Contains the display catalogs, control point identities, group mappings and
//! settings management.

pub mod mapping;
pub mod point;
pub mod registry;
pub mod settings;

pub use mapping::{GroupMapping, MappingTable};
pub use point::{PointId, PointValue, Property};
pub use registry::{
    DisplayGroup, DisplayRegistry, NavicoGroup, NightColor, RaymarineColor, RaymarineGroup, Vendor,
};
pub use settings::{
    get_settings_path, load_settings, settings_schema, BridgeConfig, BridgeSettings,
    GroupMappingEntry,
};
