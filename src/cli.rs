// Copyright 2026 Mikael Lund
//
// Licensed under the Apache license, version 2.0 (the "license");
// you may not use this file except in compliance with the license.
// You may obtain a copy of the license at
//
//     http://www.apache.org/licenses/license-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the license is distributed on an "as is" basis,
// without warranties or conditions of any kind, either express or implied.
// See the license for the specific language governing permissions and
// limitations under the license.

use crate::analysis;
use anyhow::Result;
use clap::{Parser, Subcommand};
use pretty_env_logger::env_logger::DEFAULT_FILTER_ENV;
use std::path::PathBuf;

#[derive(Debug, Subcommand)]
enum Commands {
    /// Analyze thermodynamic states saved in a store file
    #[clap(arg_required_else_help = true)]
    Analyze {
        /// Store file in YAML format
        #[clap(long, short = 's')]
        store: PathBuf,
    },
}

#[derive(Parser)]
#[clap(version, about, long_about = None)]
struct Args {
    #[clap(subcommand)]
    pub command: Commands,

    /// Verbose output. See more with e.g. RUST_LOG=Trace
    #[clap(long, short = 'v', action)]
    pub verbose: bool,
}

pub fn do_main() -> Result<()> {
    let args = Args::parse();
    if std::env::var(DEFAULT_FILTER_ENV).is_err() {
        std::env::set_var(
            DEFAULT_FILTER_ENV,
            if args.verbose { "Debug" } else { "Info" },
        );
    }
    pretty_env_logger::init();

    match args.command {
        Commands::Analyze { store } => {
            let report = analysis::analyze(&store, args.verbose)?;
            log::info!(
                "{} execution context(s) suffice for the stored states",
                report.context_count()
            );
        }
    }
    Ok(())
}
