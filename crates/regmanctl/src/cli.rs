/*
 *  Copyright 2025 Registry Regulations Team
 *
 *  Licensed under the Apache License, Version 2.0 (the "License");
 *  you may not use this file except in compliance with the License.
 *  You may obtain a copy of the License at
 *
 *      http://www.apache.org/licenses/LICENSE-2.0
 *
 *  Unless required by applicable law or agreed to in writing, software
 *  distributed under the License is distributed on an "AS IS" BASIS,
 *  WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 *  See the License for the specific language governing permissions and
 *  limitations under the License.
 */

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "regmanctl",
    version,
    about = "Host for the registry-regulation version-context runtime",
    long_about = "Loads portal configuration, keeps version contexts warm and reports on configuration"
)]
pub struct Cli {
    /// Configuration file (searched in the default locations when omitted)
    #[arg(short, long, global = true, env = "REGMAN_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the runtime and preload version contexts until interrupted
    Serve {
        /// Version candidates to preload after startup
        #[arg(long = "candidate", value_name = "NUMBER")]
        candidates: Vec<String>,

        /// Override the retry delay between failed preload attempts
        #[arg(long, value_name = "MILLIS")]
        retry_delay_ms: Option<u64>,
    },

    /// Print the effective configuration as TOML
    CheckConfig,
}
