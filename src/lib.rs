/*
 * This file is part of N2K Displays.
 *
 * Copyright (C) 2025 N2K Displays contributors
 *
 * N2K Displays is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * N2K Displays is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with N2K Displays. If not, see <https://www.gnu.org/licenses/>.
 */

//! N2K Displays - Raymarine/Navico display control over NMEA 2000
//!
//! Exposes the brightness, palette and night mode of every display group as
//! writable data-model points and keeps user-paired groups of the two vendor
//! families in sync.

pub mod cli;

pub use nd_core::*;
pub use nd_protocol as protocol;

use serde_json::Value;

use nd_protocol::N2kCommand;

/// Command a write of `value` to `path` would put on the bus.
///
/// Runs the same validation as a live write, so a rejected value yields the
/// same error a host would see.
pub fn encode_write(config: &BridgeConfig, path: &str, value: &Value) -> Result<N2kCommand> {
    let point = PointId::parse(path)?;
    config.registry.require_enabled(point.group)?;
    let value = PointValue::from_json(&point, value)?;
    encoder::encode(&point, &value, config)
}

/// Interpret a command-line value: JSON when it parses, a bare string otherwise
pub fn parse_value_arg(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}
