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

//! # Regman
//!
//! Version-scoped component management for the registry-regulation portal.
//!
//! Every version of the registry (the master version and each open version
//! candidate) gets its own set of components: a connection pool to the
//! version's database and a git working context. Regman creates these on
//! first use, caches them per version, and warms them up ahead of time when
//! versions appear.
//!
//! ## Key Concepts
//!
//! - [`VersionComponentFactory`]: builds one component type for a version
//!   and decides when a cached instance is stale.
//! - [`VersionContextComponentManager`]: get-or-create cache keyed by
//!   version and component type. Concurrent callers for the same key share a
//!   single construction.
//! - [`EventPublisher`](events::EventPublisher): fire-and-forget delivery of
//!   [`PortalEvent`](events::PortalEvent)s to listeners on their own tasks.
//! - [`VersionContextPreloader`](events::VersionContextPreloader): builds
//!   contexts on startup and for new candidates, retrying failures after a
//!   fixed delay until they succeed.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use regman::{init_logging, ConfigLoader, PortalRuntime, RegistryDataSource, VersionId};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConfigLoader::new().load_or_default(None)?;
//!     init_logging(Some(&config.logging));
//!
//!     let runtime = PortalRuntime::from_config(&config)?;
//!     runtime.start();
//!     runtime.version_candidate_created("196");
//!
//!     let ds = runtime
//!         .manager()
//!         .get_component::<RegistryDataSource>(&VersionId::new("196"))
//!         .await?;
//!     assert!(ds.connection_url().ends_with("registry_dev_196"));
//!     Ok(())
//! }
//! ```

pub mod components;
pub mod config;
pub mod context;
pub mod error;
pub mod events;
pub mod logging;
pub mod runtime;
pub mod version;

pub use components::{GitContext, GitContextFactory, RegistryDataSource, RegistryDataSourceFactory};
pub use config::{ConfigLoader, PortalConfig};
pub use context::{
    ComponentFactoryRegistry, ComponentType, VersionComponentFactory,
    VersionContextComponentManager,
};
pub use error::{ComponentError, RuntimeError};
pub use events::{EventListener, EventPublisher, PortalEvent};
pub use logging::init_logging;
pub use runtime::PortalRuntime;
pub use version::VersionId;
