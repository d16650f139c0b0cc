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

//! Get-or-create cache of version-scoped components.
//!
//! Reads of a present, non-stale component only take the cache read lock.
//! Construction is serialized per [`ComponentKey`] through an async mutex
//! slot, so two callers asking for the same component for the same version
//! converge on one factory invocation while unrelated keys proceed in
//! parallel.
//!
//! Each version carries an eviction epoch. A construction that started before
//! [`evict_version`](VersionContextComponentManager::evict_version) still
//! hands its component to the caller but does not cache it.

use parking_lot::{Mutex, RwLock};
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tokio::sync::Mutex as AsyncMutex;
use tracing::{debug, info};

use super::factory::{ComponentFactoryRegistry, SharedComponent};
use super::{ComponentKey, ComponentType};
use crate::error::ComponentError;
use crate::version::VersionId;

/// Owner of every version-scoped component in the process.
///
/// Components live until they are evicted with
/// [`evict_version`](Self::evict_version) or the manager is dropped.
pub struct VersionContextComponentManager {
    factories: ComponentFactoryRegistry,
    components: RwLock<HashMap<ComponentKey, SharedComponent>>,
    creation_slots: Mutex<HashMap<ComponentKey, Arc<AsyncMutex<()>>>>,
    /// Bumped by every eviction of the version, under the `components`
    /// write lock.
    epochs: Mutex<HashMap<VersionId, u64>>,
}

impl VersionContextComponentManager {
    pub fn new(factories: ComponentFactoryRegistry) -> Self {
        Self {
            factories,
            components: RwLock::new(HashMap::new()),
            creation_slots: Mutex::new(HashMap::new()),
            epochs: Mutex::new(HashMap::new()),
        }
    }

    pub fn factories(&self) -> &ComponentFactoryRegistry {
        &self.factories
    }

    /// Returns the component of type `T` for `version`, creating it if needed.
    ///
    /// # Errors
    ///
    /// * [`ComponentError::UnknownComponentType`] if no factory produces `T`
    /// * whatever the factory returned if construction failed
    pub async fn get_component<T>(&self, version: &VersionId) -> Result<Arc<T>, ComponentError>
    where
        T: Any + Send + Sync,
    {
        let component = self
            .get_component_by_type(version, ComponentType::of::<T>())
            .await?;
        component
            .downcast::<T>()
            .map_err(|_| ComponentError::TypeMismatch {
                type_name: std::any::type_name::<T>(),
            })
    }

    /// Type-erased form of [`get_component`](Self::get_component).
    pub async fn get_component_by_type(
        &self,
        version: &VersionId,
        component_type: ComponentType,
    ) -> Result<SharedComponent, ComponentError> {
        let factory =
            self.factories
                .get(&component_type)
                .ok_or(ComponentError::UnknownComponentType {
                    type_name: component_type.name(),
                })?;
        let key = ComponentKey::new(version.clone(), component_type);

        let observed = self.components.read().get(&key).cloned();
        if let Some(component) = &observed {
            if !factory.should_be_recreated(version) {
                return Ok(component.clone());
            }
            debug!("Cached {} is stale, recreating", key);
        }

        let slot = self.creation_slot(&key);
        let _guard = slot.lock().await;

        // Another caller may have installed a fresh component while we waited.
        let current = self.components.read().get(&key).cloned();
        if let Some(current) = current {
            let replaced = match &observed {
                Some(previous) => !Arc::ptr_eq(previous, &current),
                None => true,
            };
            if replaced {
                return Ok(current);
            }
        }

        let epoch = self.epoch(version);
        info!("Creating {} for version '{}'", component_type, version);
        let component = factory.create(version).await?;

        let mut components = self.components.write();
        if self.epoch(version) == epoch {
            components.insert(key, component.clone());
        } else {
            info!(
                "Version '{}' was evicted while creating {}, not caching it",
                version, component_type
            );
        }
        Ok(component)
    }

    /// Drops every cached component belonging to `version`.
    ///
    /// Constructions already running for `version` finish for their callers
    /// but are not cached. Creation slots they hold are kept. Returns the number of components removed.
    pub fn evict_version(&self, version: &VersionId) -> usize {
        let removed = {
            let mut components = self.components.write();
            *self.epochs.lock().entry(version.clone()).or_insert(0) += 1;
            let before = components.len();
            components.retain(|key, _| &key.version != version);
            before - components.len()
        };

        self.creation_slots
            .lock()
            .retain(|key, slot| &key.version != version || Arc::strong_count(slot) > 1);

        if removed > 0 {
            info!(
                "Evicted {} component(s) for version '{}'",
                removed, version
            );
        }
        removed
    }

    pub fn is_cached(&self, version: &VersionId, component_type: ComponentType) -> bool {
        self.components
            .read()
            .contains_key(&ComponentKey::new(version.clone(), component_type))
    }

    /// Versions that currently have at least one cached component, sorted.
    pub fn cached_versions(&self) -> Vec<VersionId> {
        let mut versions: Vec<VersionId> = self
            .components
            .read()
            .keys()
            .map(|key| key.version.clone())
            .collect();
        versions.sort();
        versions.dedup();
        versions
    }

    /// Component types the manager can build, sorted by name.
    pub fn registered_types(&self) -> Vec<ComponentType> {
        let mut types = self.factories.component_types();
        types.sort_by_key(|t| t.name());
        types
    }

    pub fn cached_count(&self) -> usize {
        self.components.read().len()
    }

    fn epoch(&self, version: &VersionId) -> u64 {
        self.epochs.lock().get(version).copied().unwrap_or(0)
    }

    fn creation_slot(&self, key: &ComponentKey) -> Arc<AsyncMutex<()>> {
        self.creation_slots
            .lock()
            .entry(key.clone())
            .or_insert_with(|| Arc::new(AsyncMutex::new(())))
            .clone()
    }
}

impl fmt::Debug for VersionContextComponentManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VersionContextComponentManager")
            .field("factories", &self.factories)
            .field("cached", &self.cached_count())
            .finish()
    }
}
