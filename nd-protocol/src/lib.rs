use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Host event that carries outbound NMEA 2000 commands in canboat JSON form
pub const NMEA2000_JSON_OUT: &str = "nmea2000JsonOut";

/// Data-model context for the local vessel
pub const SELF_CONTEXT: &str = "vessels.self";

/// NMEA 2000 global (broadcast) destination address
pub const BROADCAST_ADDRESS: u8 = 255;

/// Raymarine proprietary PGN used for display brightness and color
pub const RAYMARINE_PGN: u32 = 126720;
pub const RAYMARINE_PRIORITY: u8 = 7;
const RAYMARINE_PROPRIETARY_ID: &str = "0x0c8c";

/// Simnet parameter-set PGN used by Navico displays
pub const SIMNET_PGN: u32 = 130845;
pub const SIMNET_PRIORITY: u8 = 3;

const INDUSTRY_CODE: &str = "Marine Industry";

/// Maximum size of a single host message line (64KB)
pub const MAX_MESSAGE_SIZE: usize = 64 * 1024;

// ============================================================================
// NMEA 2000 commands
// ============================================================================

/// A structured NMEA 2000 command as consumed by the host's bus transport
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct N2kCommand {
    pub prio: u8,
    pub pgn: u32,
    pub dst: u8,
    pub fields: CommandFields,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CommandFields {
    Raymarine(RaymarineFields),
    Simnet(SimnetFields),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RaymarineCommand {
    Brightness,
    Color,
}

/// Field set of the Raymarine display control message (PGN 126720)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RaymarineFields {
    #[serde(rename = "Manufacturer Code")]
    pub manufacturer_code: String,
    #[serde(rename = "Industry Code")]
    pub industry_code: String,
    #[serde(rename = "Proprietary ID")]
    pub proprietary_id: String,
    #[serde(rename = "Group")]
    pub group: String,
    #[serde(rename = "Unknown 1")]
    pub unknown_1: u8,
    #[serde(rename = "Command")]
    pub command: RaymarineCommand,
    #[serde(rename = "Brightness", default, skip_serializing_if = "Option::is_none")]
    pub brightness: Option<f64>,
    #[serde(rename = "Color", default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(rename = "Unknown 2")]
    pub unknown_2: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SimnetKey {
    #[serde(rename = "Backlight level")]
    BacklightLevel,
    #[serde(rename = "Night mode")]
    NightMode,
    #[serde(rename = "Night mode color")]
    NightModeColor,
}

/// Simnet parameter values are either enumerants or a backlight level
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SimnetValue {
    Code(u8),
    Level(f64),
}

/// Field set of the Simnet display parameter message (PGN 130845)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimnetFields {
    #[serde(rename = "Manufacturer Code")]
    pub manufacturer_code: String,
    #[serde(rename = "Industry Code")]
    pub industry_code: String,
    #[serde(rename = "Display Group")]
    pub display_group: String,
    #[serde(rename = "Key")]
    pub key: SimnetKey,
    #[serde(rename = "Spare")]
    pub spare: u8,
    #[serde(rename = "MinLength")]
    pub min_length: u8,
    #[serde(rename = "Value")]
    pub value: SimnetValue,
}

impl N2kCommand {
    /// Raymarine display command addressed to a display group (canboat group name)
    pub fn raymarine(group: &str, command: RaymarineCommand) -> RaymarineFields {
        RaymarineFields {
            manufacturer_code: "Raymarine".into(),
            industry_code: INDUSTRY_CODE.into(),
            proprietary_id: RAYMARINE_PROPRIETARY_ID.into(),
            group: group.into(),
            unknown_1: 1,
            command,
            brightness: None,
            color: None,
            unknown_2: 0,
        }
    }

    /// Simnet display parameter command addressed to a display group
    pub fn simnet(display_group: &str, key: SimnetKey, value: SimnetValue) -> Self {
        Self {
            prio: SIMNET_PRIORITY,
            pgn: SIMNET_PGN,
            dst: BROADCAST_ADDRESS,
            fields: CommandFields::Simnet(SimnetFields {
                manufacturer_code: "Simrad".into(),
                industry_code: INDUSTRY_CODE.into(),
                display_group: display_group.into(),
                key,
                spare: 0,
                min_length: 1,
                value,
            }),
        }
    }
}

impl From<RaymarineFields> for N2kCommand {
    fn from(fields: RaymarineFields) -> Self {
        Self {
            prio: RAYMARINE_PRIORITY,
            pgn: RAYMARINE_PGN,
            dst: BROADCAST_ADDRESS,
            fields: CommandFields::Raymarine(fields),
        }
    }
}

// ============================================================================
// Host data model (delta / meta / put)
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathValue {
    pub path: String,
    pub value: Value,
}

impl PathValue {
    pub fn new(path: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            path: path.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PossibleValue {
    pub title: String,
    pub value: String,
}

/// Metadata descriptor announced once for each control point
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub units: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<[f64; 2]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub possible_values: Option<Vec<PossibleValue>>,
    #[serde(rename = "enum", default, skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathMeta {
    pub path: String,
    pub value: Meta,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Update {
    #[serde(rename = "$source", default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default)]
    pub values: Vec<PathValue>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub meta: Vec<PathMeta>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Delta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    #[serde(default)]
    pub updates: Vec<Update>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PutState {
    Completed,
}

/// Synchronous answer to a put request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PutResult {
    pub state: PutState,
    pub status_code: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl PutResult {
    pub fn completed() -> Self {
        Self {
            state: PutState::Completed,
            status_code: 200,
            message: None,
        }
    }

    pub fn rejected(msg: impl Into<String>) -> Self {
        Self {
            state: PutState::Completed,
            status_code: 400,
            message: Some(msg.into()),
        }
    }

    pub fn failed(msg: impl Into<String>) -> Self {
        Self {
            state: PutState::Completed,
            status_code: 500,
            message: Some(msg.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status_code == 200
    }
}

// ============================================================================
// Subscriptions
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionSpec {
    pub path: String,
    pub period: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubscribeCommand {
    pub context: String,
    pub subscribe: Vec<SubscriptionSpec>,
}

impl SubscribeCommand {
    pub fn new(context: impl Into<String>, path: impl Into<String>, period: u64) -> Self {
        Self {
            context: context.into(),
            subscribe: vec![SubscriptionSpec {
                path: path.into(),
                period,
            }],
        }
    }

    /// Whether any of the subscribed patterns covers `path`
    pub fn matches(&self, path: &str) -> bool {
        self.subscribe.iter().any(|spec| path_matches(&spec.path, path))
    }
}

/// Match a dotted path against a pattern where `*` covers one or more trailing segments
/// when it is last, or exactly one segment otherwise.
pub fn path_matches(pattern: &str, path: &str) -> bool {
    let mut pattern_parts = pattern.split('.').peekable();
    let mut path_parts = path.split('.');

    while let Some(p) = pattern_parts.next() {
        let is_last = pattern_parts.peek().is_none();
        match path_parts.next() {
            None => return false,
            Some(_) if p == "*" && is_last => return true,
            Some(_) if p == "*" => continue,
            Some(segment) if segment == p => continue,
            Some(_) => return false,
        }
    }

    path_parts.next().is_none()
}

// ============================================================================
// Value validation
// ============================================================================

/// Parse a ratio (0.0-1.0) from a host value
pub fn parse_ratio(value: &Value) -> Result<f64, String> {
    let ratio = value
        .as_f64()
        .ok_or_else(|| format!("Expected a number, got {}", value))?;
    validate_ratio(ratio)?;
    Ok(ratio)
}

pub fn validate_ratio(ratio: f64) -> Result<(), String> {
    if !ratio.is_finite() {
        return Err("Ratio must be a finite number".into());
    }
    if !(0.0..=1.0).contains(&ratio) {
        return Err(format!("Ratio {} out of range (0-1)", ratio));
    }
    Ok(())
}

/// Parse a night-mode flag; the data model uses 0/1 but booleans are accepted too
pub fn parse_flag(value: &Value) -> Result<bool, String> {
    match value {
        Value::Bool(b) => Ok(*b),
        Value::Number(n) => match n.as_f64() {
            Some(v) if v == 0.0 => Ok(false),
            Some(v) if v == 1.0 => Ok(true),
            _ => Err(format!("Flag must be 0 or 1, got {}", n)),
        },
        other => Err(format!("Expected 0/1 or a boolean, got {}", other)),
    }
}

/// Parse an enumeration key from a host value
pub fn parse_key(value: &Value) -> Result<&str, String> {
    value
        .as_str()
        .ok_or_else(|| format!("Expected a string key, got {}", value))
}

pub fn validate_message_size(size: usize) -> Result<(), String> {
    if size > MAX_MESSAGE_SIZE {
        return Err(format!(
            "Message too large: {} > {} bytes",
            size, MAX_MESSAGE_SIZE
        ));
    }
    Ok(())
}
