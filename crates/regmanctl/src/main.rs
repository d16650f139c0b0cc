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

use anyhow::{Context, Result};
use clap::Parser;
use regman::config::LoggingConfig;
use regman::{init_logging, ConfigLoader};
use tracing::info;

mod cli;
mod commands;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logging depends on configuration; its source is reported after init.
    let loader = ConfigLoader::new();
    let config_path = loader.locate(cli.config.as_deref());
    let config = loader
        .load_or_default(cli.config.as_deref())
        .context("Failed to load configuration")?;

    let logging = if cli.verbose {
        LoggingConfig {
            level: "debug".to_string(),
            ..config.logging.clone()
        }
    } else {
        config.logging.clone()
    };
    init_logging(Some(&logging));

    match &config_path {
        Some(path) => info!("Loaded configuration from {}", path.display()),
        None => info!("No configuration file found, using defaults"),
    }

    match cli.command {
        Commands::Serve {
            candidates,
            retry_delay_ms,
        } => commands::serve::run(config, candidates, retry_delay_ms).await?,
        Commands::CheckConfig => commands::check_config::run(&config)?,
    }

    Ok(())
}
