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

//! Command Line Interface
//!
//! Offline tooling around the bridge: inspect the settings schema, validate a
//! settings file, list control points and preview bus commands.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::debug;

use crate::{declare_points, encode_write, load_settings, parse_value_arg, settings_schema, BridgeConfig, Vendor};

#[derive(Parser)]
#[command(name = "n2k-displays")]
#[command(version)]
#[command(about = "N2K Displays - Raymarine/Navico display control over NMEA 2000")]
#[command(long_about = "N2K Displays - Raymarine/Navico display control over NMEA 2000

Offline companion to the n2k-displaysd bridge daemon.

EXAMPLES:
    n2k-displays schema                         Print the settings JSON schema
    n2k-displays check                          Validate the default settings file
    n2k-displays points ./settings.json         List control points
    n2k-displays encode electrical.displays.navico.group1.nightMode.state 1

ENVIRONMENT VARIABLES:
    RUST_LOG=debug         Enable debug logging

FILES:
    ~/.config/n2k-displays/settings.json      Bridge settings")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the settings JSON schema
    Schema,

    /// Validate a settings file and show the resolved mappings
    Check {
        /// Settings file (default location when omitted)
        config: Option<PathBuf>,
    },

    /// List every control point with its descriptor
    Points {
        /// Settings file (default location when omitted)
        config: Option<PathBuf>,
    },

    /// Show the bus command a write would emit
    Encode {
        /// Control point path
        path: String,
        /// Value to write (JSON, or a bare key such as red/black)
        value: String,
        /// Settings file providing day/night colors and enabled groups
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

// ============================================================================
// CLI Execution
// ============================================================================

pub fn run_cli(cli: &Cli) -> anyhow::Result<()> {
    let output = render(&cli.command)?;
    print!("{}", output);
    Ok(())
}

/// Output of a command, without printing it
pub fn render(cmd: &Commands) -> anyhow::Result<String> {
    match cmd {
        Commands::Schema => Ok(format!("{}\n", serde_json::to_string_pretty(&settings_schema())?)),
        Commands::Check { config } => cmd_check(&resolve_config(config.as_deref())?),
        Commands::Points { config } => cmd_points(&resolve_config(config.as_deref())?),
        Commands::Encode {
            path,
            value,
            config,
        } => {
            let config = resolve_config(config.as_deref())?;
            let command = encode_write(&config, path, &parse_value_arg(value))?;
            Ok(format!("{}\n", serde_json::to_string_pretty(&command)?))
        }
    }
}

fn resolve_config(path: Option<&Path>) -> anyhow::Result<BridgeConfig> {
    debug!(?path, "Resolving settings");
    let settings = load_settings(path).context("Failed to load settings")?;
    settings.resolve().context("Invalid settings")
}

// ============================================================================
// Check Command
// ============================================================================

fn cmd_check(config: &BridgeConfig) -> anyhow::Result<String> {
    let mut out = String::new();
    writeln!(out, "Settings OK")?;
    writeln!(out, "  Day color:   {}", config.day_color.key())?;
    writeln!(out, "  Night color: {}", config.night_color.key())?;

    for vendor in Vendor::ALL {
        writeln!(
            out,
            "  {} groups enabled: {}",
            vendor,
            config.registry.enabled_groups(vendor).len()
        )?;
    }

    writeln!(out, "Group Mappings ({}):", config.mappings.len())?;
    for mapping in config.mappings.entries() {
        writeln!(
            out,
            "  raymarine.{} <-> navico.{}",
            mapping.raymarine.key(),
            mapping.navico.key()
        )?;
    }
    Ok(out)
}

// ============================================================================
// Points Command
// ============================================================================

fn cmd_points(config: &BridgeConfig) -> anyhow::Result<String> {
    let specs = declare_points(config)?;
    let mut out = String::new();
    writeln!(out, "Control Points ({}):", specs.len())?;
    for spec in &specs {
        writeln!(
            out,
            "  {} = {} {}",
            spec.id.path(),
            spec.default.to_json(),
            serde_json::to_string(&spec.meta)?
        )?;
    }
    Ok(out)
}
