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
use regman::{PortalConfig, PortalRuntime};
use tracing::info;

/// Runs the version-context runtime until Ctrl-C.
pub async fn run(
    mut config: PortalConfig,
    candidates: Vec<String>,
    retry_delay_ms: Option<u64>,
) -> Result<()> {
    if let Some(delay) = retry_delay_ms {
        config.context.retry_delay_ms = delay;
    }

    let runtime =
        PortalRuntime::from_config(&config).context("Failed to assemble version-context runtime")?;

    runtime.start();
    for candidate in candidates {
        runtime.version_candidate_created(candidate);
    }

    info!("regmanctl is running, press Ctrl-C to stop");
    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for shutdown signal")?;

    info!(
        "Shutting down, cached versions: {:?}",
        runtime.manager().cached_versions()
    );
    runtime.shutdown();
    Ok(())
}
