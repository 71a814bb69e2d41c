//! Constants and configuration values for N2K Displays
//!
//! Centralizes plugin identity, data-model paths, and configuration defaults.

/// Plugin identity as seen by the host
pub mod plugin {
    /// Source identifier stamped on every update the bridge publishes.
    /// Updates carrying this source are our own echoes and are never re-synced.
    pub const ID: &str = "signalk-n2k-displays";

    pub const NAME: &str = "NMEA 2000 Display Control";

    pub const DESCRIPTION: &str =
        "Signal K Plugin that controls and syncs display devices from Raymarine and Navico devices";
}

/// Data-model paths
pub mod paths {
    /// Root of every display control point
    pub const DISPLAYS_ROOT: &str = "electrical.displays";

    /// Settings directory name under the user config directory
    pub const SETTINGS_DIR: &str = "n2k-displays";

    /// Settings file name
    pub const SETTINGS_FILE: &str = "settings.json";

    /// Default settings path: $XDG_CONFIG_HOME/n2k-displays/settings.json
    pub fn default_settings_path() -> Option<std::path::PathBuf> {
        let base = if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
            Some(std::path::PathBuf::from(xdg))
        } else if let Ok(home) = std::env::var("HOME") {
            Some(std::path::PathBuf::from(home).join(".config"))
        } else {
            dirs::config_dir()
        };

        base.map(|p| p.join(SETTINGS_DIR).join(SETTINGS_FILE))
    }
}

/// Subscription timing
pub mod timing {
    /// Period requested for display-state subscriptions
    pub const SUBSCRIPTION_PERIOD_MS: u64 = 1000;
}

/// Configuration defaults and limits
pub mod defaults {
    /// Raymarine palette treated as night mode when none is configured
    pub const NIGHT_COLOR: &str = "red/black";

    /// Raymarine palette applied when night mode is switched off
    pub const DAY_COLOR: &str = "day1";

    /// Initial value announced for every Navico night-mode color point
    pub const NIGHT_MODE_COLOR: &str = "red";
}

pub mod limits {
    /// Maximum number of group mappings accepted from settings
    pub const MAX_MAPPINGS: usize = 64;

    /// Maximum settings file size (64KB)
    pub const MAX_SETTINGS_FILE_SIZE: u64 = 64 * 1024;
}

/// Simnet "Night mode" parameter encoding
pub mod night_mode {
    pub const ON: u8 = 4;
    pub const OFF: u8 = 2;
}
