//! Bridge settings
//!
//! Settings are loaded once at startup from a JSON file whose keys match the
//! plugin options of the host (camelCase), then resolved into an immutable
//! [`BridgeConfig`] that every component borrows.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::constants::{defaults, limits, paths};
use crate::data::mapping::{GroupMapping, MappingTable};
use crate::data::registry::{
    DisplayGroup, DisplayRegistry, NavicoGroup, RaymarineColor, RaymarineGroup, Vendor,
};
use crate::error::{DisplayError, Result};

/// One user-declared Raymarine/Navico pairing, as written in settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupMappingEntry {
    pub raymarine_group: String,
    pub simrad_group: String,
}

/// Raw settings as stored on disk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BridgeSettings {
    #[serde(default = "default_night_color")]
    pub raymarine_night_color: String,

    #[serde(default = "default_day_color")]
    pub raymarine_day_color: String,

    #[serde(default)]
    pub group_mappings: Vec<GroupMappingEntry>,

    /// Per-group enable flags; a group missing from the map is enabled
    #[serde(default)]
    pub raymarine_groups: BTreeMap<String, bool>,

    #[serde(default)]
    pub navico_groups: BTreeMap<String, bool>,
}

fn default_night_color() -> String { defaults::NIGHT_COLOR.to_string() }
fn default_day_color() -> String { defaults::DAY_COLOR.to_string() }

impl Default for BridgeSettings {
    fn default() -> Self {
        Self {
            raymarine_night_color: default_night_color(),
            raymarine_day_color: default_day_color(),
            group_mappings: Vec::new(),
            raymarine_groups: BTreeMap::new(),
            navico_groups: BTreeMap::new(),
        }
    }
}

/// Validated, immutable configuration shared by every component
#[derive(Debug, Clone, PartialEq)]
pub struct BridgeConfig {
    pub day_color: RaymarineColor,
    pub night_color: RaymarineColor,
    pub registry: DisplayRegistry,
    pub mappings: MappingTable,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            day_color: RaymarineColor::Day1,
            night_color: RaymarineColor::RedBlack,
            registry: DisplayRegistry::new(),
            mappings: MappingTable::empty(),
        }
    }
}

impl BridgeConfig {
    /// Night mode derived from a Raymarine palette: on exactly when it is the night color
    pub fn is_night_color(&self, color: RaymarineColor) -> bool {
        color == self.night_color
    }

    /// Palette applied to a Raymarine group when night mode is switched
    pub fn color_for_night_mode(&self, on: bool) -> RaymarineColor {
        if on {
            self.night_color
        } else {
            self.day_color
        }
    }
}

impl BridgeSettings {
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Load settings from a file, enforcing the size limit
    pub fn load(path: &Path) -> Result<Self> {
        let meta = fs::metadata(path).map_err(|e| DisplayError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        if meta.len() > limits::MAX_SETTINGS_FILE_SIZE {
            return Err(DisplayError::FileTooLarge {
                path: path.to_path_buf(),
                size: meta.len(),
                max_size: limits::MAX_SETTINGS_FILE_SIZE,
            });
        }

        let content = fs::read_to_string(path).map_err(|e| DisplayError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;

        let settings = Self::from_json(&content)?;
        info!(
            path = %path.display(),
            mappings = settings.group_mappings.len(),
            "Loaded settings"
        );
        Ok(settings)
    }

    /// Resolve and validate into the runtime configuration
    pub fn resolve(&self) -> Result<BridgeConfig> {
        let night_color = RaymarineColor::from_key(&self.raymarine_night_color)?;
        let day_color = RaymarineColor::from_key(&self.raymarine_day_color)?;
        if night_color == day_color {
            return Err(DisplayError::config(format!(
                "raymarineDayColor and raymarineNightColor are both '{}'",
                night_color.key()
            )));
        }

        let mut disabled = Vec::new();
        for (vendor, flags) in [
            (Vendor::Raymarine, &self.raymarine_groups),
            (Vendor::Navico, &self.navico_groups),
        ] {
            for (key, enabled) in flags {
                let group = DisplayGroup::parse(vendor, key)?;
                if !enabled {
                    debug!(group = %group, "Display group disabled");
                    disabled.push(group);
                }
            }
        }
        let registry = DisplayRegistry::with_disabled(disabled);

        if self.group_mappings.len() > limits::MAX_MAPPINGS {
            return Err(DisplayError::config(format!(
                "too many group mappings ({} > {})",
                self.group_mappings.len(),
                limits::MAX_MAPPINGS
            )));
        }

        let mut entries = Vec::with_capacity(self.group_mappings.len());
        for entry in &self.group_mappings {
            let mapping = GroupMapping::new(
                RaymarineGroup::from_key(&entry.raymarine_group)?,
                NavicoGroup::from_key(&entry.simrad_group)?,
            );
            registry.require_enabled(DisplayGroup::Raymarine(mapping.raymarine))?;
            registry.require_enabled(DisplayGroup::Navico(mapping.navico))?;
            entries.push(mapping);
        }

        Ok(BridgeConfig {
            day_color,
            night_color,
            registry,
            mappings: MappingTable::new(entries)?,
        })
    }
}

/// Load settings from an explicit path, or from the default location.
///
/// A missing file at the default location yields default settings; a missing
/// explicit path is an error.
pub fn load_settings(path: Option<&Path>) -> Result<BridgeSettings> {
    if let Some(path) = path {
        return BridgeSettings::load(path);
    }

    match get_settings_path() {
        Some(path) if path.exists() => BridgeSettings::load(&path),
        Some(path) => {
            debug!(path = %path.display(), "No settings file, using defaults");
            Ok(BridgeSettings::default())
        }
        None => Ok(BridgeSettings::default()),
    }
}

pub fn get_settings_path() -> Option<PathBuf> {
    paths::default_settings_path()
}

/// JSON schema describing the settings, for configuration UIs
pub fn settings_schema() -> Value {
    let color_keys: Vec<&str> = RaymarineColor::ALL.iter().map(|c| c.key()).collect();
    let color_names: Vec<&str> = RaymarineColor::ALL.iter().map(|c| c.display_name()).collect();

    let group_enum = |vendor: Vendor| {
        let catalog = DisplayRegistry::catalog(vendor);
        let keys: Vec<&str> = catalog.iter().map(|(k, _)| *k).collect();
        let names: Vec<&str> = catalog.iter().map(|(_, n)| *n).collect();
        (keys, names)
    };
    let (raymarine_keys, raymarine_names) = group_enum(Vendor::Raymarine);
    let (navico_keys, navico_names) = group_enum(Vendor::Navico);

    json!({
        "type": "object",
        "required": ["raymarineDayColor", "raymarineNightColor"],
        "properties": {
            "raymarineNightColor": {
                "type": "string",
                "title": "Raymarine Night Color",
                "enum": color_keys,
                "enumNames": color_names,
                "default": defaults::NIGHT_COLOR
            },
            "raymarineDayColor": {
                "type": "string",
                "title": "Raymarine Day Color",
                "enum": color_keys,
                "enumNames": color_names,
                "default": defaults::DAY_COLOR
            },
            "groupMappings": {
                "title": "Display Group Mappings",
                "description": "If you setup a mapping, the display settings will be kept in sync between your Raymarine and Navico devices in those groups",
                "type": "array",
                "items": {
                    "type": "object",
                    "required": ["raymarineGroup", "simradGroup"],
                    "properties": {
                        "raymarineGroup": {
                            "type": "string",
                            "title": "Raymarine Group",
                            "enum": raymarine_keys,
                            "enumNames": raymarine_names
                        },
                        "simradGroup": {
                            "type": "string",
                            "title": "Navico Group",
                            "enum": navico_keys,
                            "enumNames": navico_names
                        }
                    }
                }
            },
            "raymarineGroups": {
                "type": "object",
                "title": "Enabled Raymarine Groups",
                "additionalProperties": { "type": "boolean" }
            },
            "navicoGroups": {
                "type": "object",
                "title": "Enabled Navico Groups",
                "additionalProperties": { "type": "boolean" }
            }
        }
    })
}
