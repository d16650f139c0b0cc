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

//! # Domain Events
//!
//! Portal events are published fire-and-forget: the [`EventPublisher`] spawns
//! one task per interested [`EventListener`] and returns immediately. The
//! listeners shipped here keep version contexts warm:
//!
//! - [`VersionContextPreloader`] builds every registered component for the
//!   master version at startup and for each new version candidate, retrying
//!   failed attempts until they succeed.
//! - [`VersionContextEvictor`] drops the components of a closed candidate.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub mod evict;
pub mod preload;
pub mod publisher;

pub use evict::VersionContextEvictor;
pub use preload::{
    PreloadState, PreloadStatus, PreloadTicket, PreloadTracker, VersionContextPreloader,
};
pub use publisher::EventPublisher;

/// Events that drive version-context lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PortalEvent {
    /// The application finished booting.
    ApplicationStarted,
    /// A new version candidate was created.
    VersionCandidateCreated { version_candidate_number: String },
    /// A version candidate was merged or abandoned.
    VersionCandidateClosed { version_candidate_number: String },
}

impl PortalEvent {
    pub fn version_candidate_created(number: impl Into<String>) -> Self {
        PortalEvent::VersionCandidateCreated {
            version_candidate_number: number.into(),
        }
    }

    pub fn version_candidate_closed(number: impl Into<String>) -> Self {
        PortalEvent::VersionCandidateClosed {
            version_candidate_number: number.into(),
        }
    }

    /// Returns the string representation of the event type.
    pub fn as_str(&self) -> &'static str {
        match self {
            PortalEvent::ApplicationStarted => "application_started",
            PortalEvent::VersionCandidateCreated { .. } => "version_candidate_created",
            PortalEvent::VersionCandidateClosed { .. } => "version_candidate_closed",
        }
    }
}

/// Reacts to published [`PortalEvent`]s.
///
/// `on_event` runs on its own spawned task; implementations handle their own
/// failures since nothing waits on the result.
#[async_trait]
pub trait EventListener: Send + Sync {
    fn name(&self) -> &str;

    /// Whether this listener wants `event` at all.
    fn accepts(&self, event: &PortalEvent) -> bool;

    async fn on_event(&self, event: PortalEvent);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_names() {
        assert_eq!(PortalEvent::ApplicationStarted.as_str(), "application_started");
        assert_eq!(
            PortalEvent::version_candidate_created("196").as_str(),
            "version_candidate_created"
        );
        assert_eq!(
            PortalEvent::version_candidate_closed("196"),
            PortalEvent::VersionCandidateClosed {
                version_candidate_number: "196".to_string()
            }
        );
    }
}
