/* -------------------------------------------------------------------------- *\
 *                |   █████╗ ██╗   ██╗██████╗  █████╗ ███████╗ |              *
 *                |  ██╔══██╗██║   ██║██╔══██╗██╔══██╗██╔════╝ |              *
 *                |  ███████║██║   ██║██████╔╝███████║█████╗   |              *
 *                |  ██╔══██║██║   ██║██╔══██╗██╔══██║██╔══╝   |              *
 *                |  ██║  ██║╚██████╔╝██║  ██║██║  ██║███████╗ |              *
 *                |  ╚═╝  ╚═╝ ╚═════╝ ╚═╝  ╚═╝╚═╝  ╚═╝╚══════╝ |              *
 *                +--------------------------------------------+              *
 *                                                                            *
 *                         Distributed Systems Runtime                        *
 * -------------------------------------------------------------------------- *
 * Copyright 2022 - 2024, the aurae contributors                              *
 * SPDX-License-Identifier: Apache-2.0                                        *
\* -------------------------------------------------------------------------- */

#![warn(clippy::unwrap_used)]

use clap::Parser;
use client::GateConfig;
use tracing::{error, info, trace};

const EXIT_OKAY: i32 = 0;
const EXIT_ERROR: i32 = 1;

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct ZettagatedOptions {
    /// Path to a TOML config file. Falls back to the standard search
    /// paths when omitted.
    #[clap(short, long, value_parser)]
    config: Option<String>,

    #[clap(short, long)]
    verbose: bool,
}

async fn daemon() -> i32 {
    let options = ZettagatedOptions::parse();

    if let Err(e) = zettagated::logging::init(options.verbose) {
        eprintln!("failed to initialize logging: {e:?}");
        return EXIT_ERROR;
    }

    trace!("**Logging: Verbose Mode**");
    info!("Starting zettagated...");

    let config = match &options.config {
        Some(path) => GateConfig::parse_from_toml_file(path),
        None => GateConfig::try_default(),
    };
    let config = match config {
        Ok(config) => config,
        Err(e) => {
            error!("{e:?}");
            return EXIT_ERROR;
        }
    };

    if let Err(e) = zettagated::run(config).await {
        error!("{e:?}");
        return EXIT_ERROR;
    }

    EXIT_OKAY
}

#[tokio::main]
async fn main() {
    let exit_code = daemon();
    std::process::exit(exit_code.await);
}
