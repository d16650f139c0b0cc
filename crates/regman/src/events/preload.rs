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

//! Eager construction of version contexts.
//!
//! Each version moves through `Uninitialized -> Initializing -> Ready`. While
//! initializing, a failed attempt is logged and retried after a fixed delay,
//! with no attempt limit: nobody waits on the result, and later requests for
//! the version need its context. Resetting a version (see
//! [`VersionContextEvictor`](super::VersionContextEvictor)) stops its retry
//! loop after the current attempt. Every run holds a [`PreloadTicket`], so a
//! loop from before a reset can never update a later run of the same version.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::{EventListener, PortalEvent};
use crate::context::{ComponentType, VersionContextComponentManager};
use crate::error::ComponentError;
use crate::version::VersionId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PreloadState {
    Uninitialized,
    Initializing,
    Ready,
}

/// Preload progress of one version.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreloadStatus {
    pub state: PreloadState,
    /// Run this status belongs to.
    pub generation: u64,
    /// Attempts made so far, successful one included.
    pub attempts: u32,
    pub last_error: Option<String>,
    pub started_at: DateTime<Utc>,
    pub ready_at: Option<DateTime<Utc>>,
}

/// Handle on one preload run of a version, issued by [`PreloadTracker::begin`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreloadTicket {
    version: VersionId,
    generation: u64,
}

impl PreloadTicket {
    pub fn version(&self) -> &VersionId {
        &self.version
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[derive(Debug, Default)]
struct TrackerState {
    statuses: HashMap<VersionId, PreloadStatus>,
    next_generation: u64,
}

/// Shared record of per-version preload state.
#[derive(Debug, Default)]
pub struct PreloadTracker {
    inner: RwLock<TrackerState>,
}

impl PreloadTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self, version: &VersionId) -> PreloadState {
        self.inner
            .read()
            .statuses
            .get(version)
            .map_or(PreloadState::Uninitialized, |s| s.state)
    }

    pub fn status(&self, version: &VersionId) -> Option<PreloadStatus> {
        self.inner.read().statuses.get(version).cloned()
    }

    /// Versions currently in `state`, sorted.
    pub fn versions_in(&self, state: PreloadState) -> Vec<VersionId> {
        let mut versions: Vec<VersionId> = self
            .inner
            .read()
            .statuses
            .iter()
            .filter(|(_, status)| status.state == state)
            .map(|(version, _)| version.clone())
            .collect();
        versions.sort();
        versions
    }

    /// Moves `version` from `Uninitialized` to `Initializing` and returns
    /// the ticket of the new run.
    ///
    /// Returns `None` when the version is already initializing or ready.
    pub fn begin(&self, version: &VersionId) -> Option<PreloadTicket> {
        let mut inner = self.inner.write();
        if inner.statuses.contains_key(version) {
            return None;
        }
        inner.next_generation += 1;
        let generation = inner.next_generation;
        inner.statuses.insert(
            version.clone(),
            PreloadStatus {
                state: PreloadState::Initializing,
                generation,
                attempts: 0,
                last_error: None,
                started_at: Utc::now(),
                ready_at: None,
            },
        );
        Some(PreloadTicket {
            version: version.clone(),
            generation,
        })
    }

    /// Records a failed attempt. Returns `false` if the run behind `ticket`
    /// was reset in the meantime.
    pub fn record_failure(&self, ticket: &PreloadTicket, error: String) -> bool {
        self.update(ticket, |status| {
            status.attempts += 1;
            status.last_error = Some(error);
        })
    }

    /// Records the successful attempt. Returns `false` if the run behind
    /// `ticket` was reset in the meantime.
    pub fn mark_ready(&self, ticket: &PreloadTicket) -> bool {
        self.update(ticket, |status| {
            status.attempts += 1;
            status.state = PreloadState::Ready;
            status.ready_at = Some(Utc::now());
        })
    }

    fn update(&self, ticket: &PreloadTicket, apply: impl FnOnce(&mut PreloadStatus)) -> bool {
        let mut inner = self.inner.write();
        match inner.statuses.get_mut(&ticket.version) {
            Some(status)
                if status.generation == ticket.generation
                    && status.state == PreloadState::Initializing =>
            {
                apply(status);
                true
            }
            _ => false,
        }
    }

    /// Forgets `version`, returning it to `Uninitialized`.
    pub fn reset(&self, version: &VersionId) -> Option<PreloadStatus> {
        self.inner.write().statuses.remove(version)
    }
}

/// Listener that builds every registered component for new versions.
pub struct VersionContextPreloader {
    manager: Arc<VersionContextComponentManager>,
    tracker: Arc<PreloadTracker>,
    component_types: Vec<ComponentType>,
    master_version: VersionId,
    retry_delay: Duration,
    preload_on_startup: bool,
}

impl VersionContextPreloader {
    /// Preloads all component types registered with `manager`.
    pub fn new(
        manager: Arc<VersionContextComponentManager>,
        tracker: Arc<PreloadTracker>,
        master_version: VersionId,
        retry_delay: Duration,
    ) -> Self {
        let component_types = manager.registered_types();
        Self {
            manager,
            tracker,
            component_types,
            master_version,
            retry_delay,
            preload_on_startup: true,
        }
    }

    /// Restricts preloading to `component_types`, in the given order.
    pub fn with_component_types(mut self, component_types: Vec<ComponentType>) -> Self {
        self.component_types = component_types;
        self
    }

    /// Whether `ApplicationStarted` preloads the master version.
    pub fn with_startup_preload(mut self, enabled: bool) -> Self {
        self.preload_on_startup = enabled;
        self
    }

    pub fn tracker(&self) -> &Arc<PreloadTracker> {
        &self.tracker
    }

    pub fn retry_delay(&self) -> Duration {
        self.retry_delay
    }

    /// Builds the context of `version`, retrying until it is ready.
    ///
    /// Returns the number of attempts made by this call: `0` if the version
    /// was already initializing or ready.
    pub async fn preload(&self, version: &VersionId) -> u32 {
        let ticket = match self.tracker.begin(version) {
            Some(ticket) => ticket,
            None => {
                debug!(
                    "Context for version '{}' is already {:?}, skipping preload",
                    version,
                    self.tracker.state(version)
                );
                return 0;
            }
        };

        info!("Initializing context for version '{}'", version);
        let mut attempt = 0u32;
        loop {
            attempt += 1;
            match self.try_preload(version).await {
                Ok(()) => {
                    if self.tracker.mark_ready(&ticket) {
                        info!(
                            "Context for version '{}' is ready after {} attempt(s)",
                            version, attempt
                        );
                    } else {
                        info!("Context for version '{}' was reset during preload", version);
                    }
                    return attempt;
                }
                Err(e) => {
                    if !self.tracker.record_failure(&ticket, e.to_string()) {
                        info!(
                            "Preload of version '{}' cancelled after {} attempt(s)",
                            version, attempt
                        );
                        return attempt;
                    }
                    warn!(
                        "Failed to initialize context for version '{}' (attempt {}): {}. Retrying in {:?}",
                        version, attempt, e, self.retry_delay
                    );
                    tokio::time::sleep(self.retry_delay).await;
                }
            }
        }
    }

    async fn try_preload(&self, version: &VersionId) -> Result<(), ComponentError> {
        for component_type in &self.component_types {
            self.manager
                .get_component_by_type(version, *component_type)
                .await?;
        }
        Ok(())
    }
}

#[async_trait]
impl EventListener for VersionContextPreloader {
    fn name(&self) -> &str {
        "version-context-preloader"
    }

    fn accepts(&self, event: &PortalEvent) -> bool {
        match event {
            PortalEvent::ApplicationStarted => self.preload_on_startup,
            PortalEvent::VersionCandidateCreated { .. } => true,
            PortalEvent::VersionCandidateClosed { .. } => false,
        }
    }

    async fn on_event(&self, event: PortalEvent) {
        let version = match event {
            PortalEvent::ApplicationStarted => self.master_version.clone(),
            PortalEvent::VersionCandidateCreated {
                version_candidate_number,
            } => VersionId::new(version_candidate_number),
            PortalEvent::VersionCandidateClosed { .. } => return,
        };
        self.preload(&version).await;
    }
}
