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
use regman::config::Validate;
use regman::PortalConfig;

/// Validates `config` and prints it with defaults filled in.
pub fn run(config: &PortalConfig) -> Result<()> {
    config.validate().context("Configuration is invalid")?;
    let rendered =
        toml::to_string_pretty(config).context("Failed to render configuration as TOML")?;
    println!("{}", rendered);
    Ok(())
}
