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

use clap::Parser;

use n2k_displays::cli;

fn main() {
    let cli_args = cli::Cli::parse();

    // Initialize tracing only if RUST_LOG is set (for debugging)
    if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::fmt::init();
    }

    if let Err(e) = cli::run_cli(&cli_args) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
