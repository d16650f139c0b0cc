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

//! # Version Context
//!
//! Version-scoped components (data sources, git working contexts) are built on
//! demand by a [`VersionComponentFactory`] and cached by the
//! [`VersionContextComponentManager`] under a [`ComponentKey`]: the pair of a
//! [`VersionId`] and a [`ComponentType`].
//!
//! ```rust,ignore
//! let registry = ComponentFactoryRegistry::builder()
//!     .register(Arc::new(data_source_factory))
//!     .register(Arc::new(git_context_factory))
//!     .build()?;
//! let manager = VersionContextComponentManager::new(registry);
//!
//! let data_source = manager
//!     .get_component::<RegistryDataSource>(&VersionId::new("196"))
//!     .await?;
//! ```

use std::any::{Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::version::VersionId;

pub mod factory;
pub mod manager;

pub use factory::{
    ComponentFactoryRegistry, ComponentFactoryRegistryBuilder, SharedComponent,
    VersionComponentFactory,
};
pub use manager::VersionContextComponentManager;

/// Type descriptor for a version-scoped component.
///
/// Equality and hashing use only the [`TypeId`]; the name is kept for
/// diagnostics.
#[derive(Clone, Copy)]
pub struct ComponentType {
    id: TypeId,
    name: &'static str,
}

impl ComponentType {
    /// Descriptor for component type `T`.
    pub fn of<T: Any>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// Fully qualified type name of the component.
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for ComponentType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ComponentType {}

impl Hash for ComponentType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ComponentType({})", self.name)
    }
}

impl fmt::Display for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Cache slot address: one component type for one version.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ComponentKey {
    pub version: VersionId,
    pub component_type: ComponentType,
}

impl ComponentKey {
    pub fn new(version: VersionId, component_type: ComponentType) -> Self {
        Self {
            version,
            component_type,
        }
    }
}

impl fmt::Display for ComponentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.component_type, self.version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    struct DataSource;
    struct GitContext;

    #[test]
    fn test_component_type_identity() {
        assert_eq!(ComponentType::of::<DataSource>(), ComponentType::of::<DataSource>());
        assert_ne!(ComponentType::of::<DataSource>(), ComponentType::of::<GitContext>());
        assert!(ComponentType::of::<DataSource>().name().ends_with("DataSource"));
    }

    #[test]
    fn test_component_key_distinguishes_versions() {
        let mut keys = HashSet::new();
        keys.insert(ComponentKey::new(
            VersionId::new("1"),
            ComponentType::of::<DataSource>(),
        ));
        keys.insert(ComponentKey::new(
            VersionId::new("2"),
            ComponentType::of::<DataSource>(),
        ));
        keys.insert(ComponentKey::new(
            VersionId::new("1"),
            ComponentType::of::<DataSource>(),
        ));
        assert_eq!(keys.len(), 2);
    }
}
