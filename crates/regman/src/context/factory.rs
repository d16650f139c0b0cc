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

//! Component factories and the registry that maps component types to them.
//!
//! The registry is assembled explicitly at startup through
//! [`ComponentFactoryRegistry::builder`] and is immutable afterwards.

use async_trait::async_trait;
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use super::ComponentType;
use crate::error::ComponentError;
use crate::version::VersionId;

/// A constructed component as stored by the manager.
pub type SharedComponent = Arc<dyn Any + Send + Sync>;

/// Capability for building one version-scoped component type.
///
/// # Example
///
/// ```rust,ignore
/// struct SchemaNameFactory;
///
/// #[async_trait]
/// impl VersionComponentFactory for SchemaNameFactory {
///     type Component = String;
///
///     async fn create_component(&self, version: &VersionId) -> Result<String, ComponentError> {
///         Ok(format!("registry_dev_{}", version))
///     }
/// }
/// ```
#[async_trait]
pub trait VersionComponentFactory: Send + Sync + 'static {
    /// The component this factory produces.
    type Component: Send + Sync + 'static;

    /// Type key under which the produced components are cached.
    fn component_type(&self) -> ComponentType {
        ComponentType::of::<Self::Component>()
    }

    /// Builds the component for `version`.
    async fn create_component(
        &self,
        version: &VersionId,
    ) -> Result<Self::Component, ComponentError>;

    /// Whether a cached component for `version` is stale and must be rebuilt.
    fn should_be_recreated(&self, _version: &VersionId) -> bool {
        false
    }
}

/// Object-safe view over a [`VersionComponentFactory`].
#[async_trait]
pub(crate) trait ErasedFactory: Send + Sync {
    fn component_type(&self) -> ComponentType;

    async fn create(&self, version: &VersionId) -> Result<SharedComponent, ComponentError>;

    fn should_be_recreated(&self, version: &VersionId) -> bool;
}

struct FactoryAdapter<F> {
    factory: Arc<F>,
}

#[async_trait]
impl<F: VersionComponentFactory> ErasedFactory for FactoryAdapter<F> {
    fn component_type(&self) -> ComponentType {
        self.factory.component_type()
    }

    async fn create(&self, version: &VersionId) -> Result<SharedComponent, ComponentError> {
        let component = self.factory.create_component(version).await?;
        Ok(Arc::new(component))
    }

    fn should_be_recreated(&self, version: &VersionId) -> bool {
        self.factory.should_be_recreated(version)
    }
}

/// Immutable mapping from component type to its factory.
#[derive(Clone, Default)]
pub struct ComponentFactoryRegistry {
    factories: Arc<HashMap<ComponentType, Arc<dyn ErasedFactory>>>,
}

impl ComponentFactoryRegistry {
    pub fn builder() -> ComponentFactoryRegistryBuilder {
        ComponentFactoryRegistryBuilder::default()
    }

    pub(crate) fn get(&self, component_type: &ComponentType) -> Option<Arc<dyn ErasedFactory>> {
        self.factories.get(component_type).cloned()
    }

    pub fn contains(&self, component_type: &ComponentType) -> bool {
        self.factories.contains_key(component_type)
    }

    /// All registered component types, in no particular order.
    pub fn component_types(&self) -> Vec<ComponentType> {
        self.factories.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

impl fmt::Debug for ComponentFactoryRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set()
            .entries(self.factories.keys().map(|t| t.name()))
            .finish()
    }
}

/// Collects factories before freezing them into a [`ComponentFactoryRegistry`].
#[derive(Default)]
pub struct ComponentFactoryRegistryBuilder {
    factories: HashMap<ComponentType, Arc<dyn ErasedFactory>>,
    duplicates: Vec<&'static str>,
}

impl ComponentFactoryRegistryBuilder {
    /// Registers a factory under its component type.
    pub fn register<F: VersionComponentFactory>(mut self, factory: Arc<F>) -> Self {
        let adapter = FactoryAdapter { factory };
        let component_type = adapter.component_type();
        if self.factories.contains_key(&component_type) {
            self.duplicates.push(component_type.name());
        } else {
            tracing::debug!("Registered component factory: {}", component_type);
            self.factories.insert(component_type, Arc::new(adapter));
        }
        self
    }

    /// Freezes the registry.
    ///
    /// Fails with [`ComponentError::DuplicateFactory`] if any component type
    /// was registered more than once.
    pub fn build(self) -> Result<ComponentFactoryRegistry, ComponentError> {
        if let Some(&type_name) = self.duplicates.first() {
            return Err(ComponentError::DuplicateFactory { type_name });
        }
        Ok(ComponentFactoryRegistry {
            factories: Arc::new(self.factories),
        })
    }
}
