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

use regman::context::ComponentFactoryRegistry;
use regman::{ComponentError, ComponentType, VersionContextComponentManager, VersionId};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Barrier;

use crate::fixtures::{init_test_logging, SlowFactory, Workspace};

fn manager_with(factory: Arc<SlowFactory>) -> Arc<VersionContextComponentManager> {
    let registry = ComponentFactoryRegistry::builder()
        .register(factory)
        .build()
        .unwrap();
    Arc::new(VersionContextComponentManager::new(registry))
}

async fn fetch_concurrently(
    manager: &Arc<VersionContextComponentManager>,
    version: &VersionId,
    callers: usize,
) -> Vec<Arc<Workspace>> {
    let barrier = Arc::new(Barrier::new(callers));
    let mut tasks = Vec::with_capacity(callers);
    for _ in 0..callers {
        let manager = manager.clone();
        let version = version.clone();
        let barrier = barrier.clone();
        tasks.push(tokio::spawn(async move {
            barrier.wait().await;
            manager.get_component::<Workspace>(&version).await
        }));
    }

    let mut components = Vec::with_capacity(callers);
    for task in tasks {
        components.push(task.await.unwrap().unwrap());
    }
    components
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_callers_share_one_construction() {
    init_test_logging();
    let factory = SlowFactory::new(Duration::from_millis(50));
    let manager = manager_with(factory.clone());
    let version = VersionId::new("196");

    let components = fetch_concurrently(&manager, &version, 16).await;

    assert_eq!(factory.created(), 1);
    assert!(components.iter().all(|c| Arc::ptr_eq(c, &components[0])));
    assert_eq!(components[0].version, version);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_stale_component_is_rebuilt_exactly_once() {
    init_test_logging();
    let factory = SlowFactory::new(Duration::from_millis(30));
    let manager = manager_with(factory.clone());
    let version = VersionId::new("12");

    let original = manager.get_component::<Workspace>(&version).await.unwrap();
    factory
        .stale
        .store(true, std::sync::atomic::Ordering::SeqCst);

    let rebuilt = fetch_concurrently(&manager, &version, 8).await;

    assert_eq!(factory.created(), 2);
    assert!(rebuilt.iter().all(|c| Arc::ptr_eq(c, &rebuilt[0])));
    assert!(!Arc::ptr_eq(&original, &rebuilt[0]));
    assert_eq!(rebuilt[0].serial, 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_versions_do_not_share_components() {
    let factory = SlowFactory::new(Duration::from_millis(10));
    let manager = manager_with(factory.clone());

    let master = fetch_concurrently(&manager, &VersionId::master(), 4).await;
    let candidate = fetch_concurrently(&manager, &VersionId::new("7"), 4).await;

    assert_eq!(factory.created(), 2);
    assert!(!Arc::ptr_eq(&master[0], &candidate[0]));
    assert_eq!(
        manager.cached_versions(),
        vec![VersionId::new("7"), VersionId::master()]
    );
}

#[tokio::test]
async fn test_unregistered_type_is_rejected() {
    let manager = manager_with(SlowFactory::new(Duration::ZERO));

    for version in [VersionId::master(), VersionId::new("196")] {
        let result = manager.get_component::<u64>(&version).await;

        match result {
            Err(ComponentError::UnknownComponentType { type_name }) => {
                assert_eq!(type_name, "u64");
            }
            other => panic!(
                "expected UnknownComponentType for '{}', got {:?}",
                version,
                other.map(|_| ())
            ),
        }
    }
    assert_eq!(manager.cached_count(), 0);
}

#[tokio::test]
async fn test_eviction_during_construction_is_not_cached() {
    init_test_logging();
    let factory = SlowFactory::new(Duration::from_millis(100));
    let manager = manager_with(factory.clone());
    let version = VersionId::new("196");

    let pending = {
        let manager = manager.clone();
        let version = version.clone();
        tokio::spawn(async move { manager.get_component::<Workspace>(&version).await })
    };

    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(manager.evict_version(&version), 0);

    // The caller still gets its instance, but the closed version stays empty.
    let component = pending.await.unwrap().unwrap();
    assert_eq!(component.version, version);
    assert!(!manager.is_cached(&version, ComponentType::of::<Workspace>()));
    assert!(manager.cached_versions().is_empty());

    // A later request builds a fresh instance and caches it again.
    let fresh = manager.get_component::<Workspace>(&version).await.unwrap();
    assert!(!Arc::ptr_eq(&component, &fresh));
    assert!(manager.is_cached(&version, ComponentType::of::<Workspace>()));
    assert_eq!(factory.created(), 2);
}
