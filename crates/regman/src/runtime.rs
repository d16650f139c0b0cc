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

//! Assembly of the version-context runtime from configuration.

use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::info;

use crate::components::{GitContextFactory, RegistryDataSourceFactory};
use crate::config::{PortalConfig, Validate};
use crate::context::{ComponentFactoryRegistry, VersionContextComponentManager};
use crate::error::RuntimeError;
use crate::events::{
    EventPublisher, PortalEvent, PreloadTracker, VersionContextEvictor, VersionContextPreloader,
};
use crate::version::VersionId;

/// The component manager wired to its factories and event listeners.
///
/// # Example
///
/// ```rust,ignore
/// let runtime = PortalRuntime::from_config(&config)?;
/// runtime.start();
/// runtime.version_candidate_created("196");
///
/// let ds = runtime
///     .manager()
///     .get_component::<RegistryDataSource>(&VersionId::new("196"))
///     .await?;
/// ```
pub struct PortalRuntime {
    master_version: VersionId,
    manager: Arc<VersionContextComponentManager>,
    data_sources: Arc<RegistryDataSourceFactory>,
    git_contexts: Arc<GitContextFactory>,
    tracker: Arc<PreloadTracker>,
    publisher: EventPublisher,
}

impl PortalRuntime {
    /// Builds the runtime, spawning listeners on the caller's runtime.
    pub fn from_config(config: &PortalConfig) -> Result<Self, RuntimeError> {
        Self::build(config, None)
    }

    /// Builds the runtime, spawning listeners on `handle`.
    pub fn with_runtime(config: &PortalConfig, handle: Handle) -> Result<Self, RuntimeError> {
        Self::build(config, Some(handle))
    }

    fn build(config: &PortalConfig, handle: Option<Handle>) -> Result<Self, RuntimeError> {
        config.validate().map_err(crate::config::ConfigError::from)?;

        let master_version = config.master_version();
        let data_sources = Arc::new(RegistryDataSourceFactory::new(
            &config.database,
            master_version.clone(),
        ));
        let git_contexts = Arc::new(GitContextFactory::new(&config.git, master_version.clone()));

        let registry = ComponentFactoryRegistry::builder()
            .register(data_sources.clone())
            .register(git_contexts.clone())
            .build()?;
        let manager = Arc::new(VersionContextComponentManager::new(registry));
        let tracker = Arc::new(PreloadTracker::new());

        let preloader = VersionContextPreloader::new(
            manager.clone(),
            tracker.clone(),
            master_version.clone(),
            config.context.retry_delay(),
        )
        .with_startup_preload(config.context.preload_on_startup);
        let evictor =
            VersionContextEvictor::new(manager.clone(), tracker.clone(), master_version.clone());

        let publisher = match handle {
            Some(handle) => EventPublisher::with_runtime(handle),
            None => EventPublisher::new(),
        }
        .with_listener(Arc::new(preloader))
        .with_listener(Arc::new(evictor));

        info!(
            "Version-context runtime assembled (master '{}', {} component types, retry delay {:?})",
            master_version,
            manager.factories().len(),
            config.context.retry_delay()
        );

        Ok(Self {
            master_version,
            manager,
            data_sources,
            git_contexts,
            tracker,
            publisher,
        })
    }

    /// Publishes `ApplicationStarted`.
    pub fn start(&self) -> Vec<JoinHandle<()>> {
        self.publisher.publish(PortalEvent::ApplicationStarted)
    }

    pub fn version_candidate_created(&self, number: impl Into<String>) -> Vec<JoinHandle<()>> {
        self.publisher
            .publish(PortalEvent::version_candidate_created(number))
    }

    pub fn version_candidate_closed(&self, number: impl Into<String>) -> Vec<JoinHandle<()>> {
        self.publisher
            .publish(PortalEvent::version_candidate_closed(number))
    }

    pub fn master_version(&self) -> &VersionId {
        &self.master_version
    }

    pub fn manager(&self) -> &Arc<VersionContextComponentManager> {
        &self.manager
    }

    /// Factory handle used to invalidate a version's data source.
    pub fn data_sources(&self) -> &Arc<RegistryDataSourceFactory> {
        &self.data_sources
    }

    pub fn git_contexts(&self) -> &Arc<GitContextFactory> {
        &self.git_contexts
    }

    pub fn tracker(&self) -> &Arc<PreloadTracker> {
        &self.tracker
    }

    pub fn publisher(&self) -> &EventPublisher {
        &self.publisher
    }

    /// Stops event delivery and aborts pending preloads.
    pub fn shutdown(&self) {
        self.publisher.shutdown();
        info!(
            "Version-context runtime stopped with {} cached component(s)",
            self.manager.cached_count()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{GitContext, RegistryDataSource};
    use crate::context::ComponentType;
    use tempfile::TempDir;

    fn config(root: &TempDir) -> PortalConfig {
        let mut config = PortalConfig::default();
        config.git.repositories_root = root.path().to_path_buf();
        config
    }

    #[tokio::test]
    async fn test_runtime_registers_components_and_listeners() {
        let root = TempDir::new().unwrap();
        let runtime = PortalRuntime::from_config(&config(&root)).unwrap();

        assert_eq!(runtime.master_version(), &VersionId::master());
        assert_eq!(runtime.publisher().listener_count(), 2);
        let types = runtime.manager().registered_types();
        assert!(types.contains(&ComponentType::of::<RegistryDataSource>()));
        assert!(types.contains(&ComponentType::of::<GitContext>()));
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut config = PortalConfig::default();
        config.database.pool_size = 0;
        assert!(matches!(
            PortalRuntime::from_config(&config),
            Err(RuntimeError::Config(_))
        ));
    }
}
