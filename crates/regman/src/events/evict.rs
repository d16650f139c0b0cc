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

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, warn};

use super::{EventListener, PortalEvent, PreloadTracker};
use crate::context::VersionContextComponentManager;
use crate::version::VersionId;

/// Releases the components of merged or abandoned version candidates.
///
/// The master version is never evicted.
pub struct VersionContextEvictor {
    manager: Arc<VersionContextComponentManager>,
    tracker: Arc<PreloadTracker>,
    master_version: VersionId,
}

impl VersionContextEvictor {
    pub fn new(
        manager: Arc<VersionContextComponentManager>,
        tracker: Arc<PreloadTracker>,
        master_version: VersionId,
    ) -> Self {
        Self {
            manager,
            tracker,
            master_version,
        }
    }

    /// Evicts `version`; returns the number of components dropped.
    pub fn evict(&self, version: &VersionId) -> usize {
        if *version == self.master_version {
            warn!("Refusing to evict the master version context");
            return 0;
        }
        self.tracker.reset(version);
        let removed = self.manager.evict_version(version);
        info!(
            "Version candidate '{}' closed, released {} component(s)",
            version, removed
        );
        removed
    }
}

#[async_trait]
impl EventListener for VersionContextEvictor {
    fn name(&self) -> &str {
        "version-context-evictor"
    }

    fn accepts(&self, event: &PortalEvent) -> bool {
        matches!(event, PortalEvent::VersionCandidateClosed { .. })
    }

    async fn on_event(&self, event: PortalEvent) {
        if let PortalEvent::VersionCandidateClosed {
            version_candidate_number,
        } = event
        {
            self.evict(&VersionId::new(version_candidate_number));
        }
    }
}
