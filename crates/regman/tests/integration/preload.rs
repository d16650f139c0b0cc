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
use regman::events::{
    EventPublisher, PortalEvent, PreloadState, PreloadTracker, VersionContextEvictor,
    VersionContextPreloader,
};
use regman::{VersionContextComponentManager, VersionId};
use std::sync::Arc;
use std::time::Duration;

use crate::fixtures::{init_test_logging, Connection, FlakyFactory};

struct Harness {
    manager: Arc<VersionContextComponentManager>,
    tracker: Arc<PreloadTracker>,
    publisher: EventPublisher,
}

fn harness(factory: Arc<FlakyFactory>, retry_delay: Duration) -> Harness {
    let registry = ComponentFactoryRegistry::builder()
        .register(factory)
        .build()
        .unwrap();
    let manager = Arc::new(VersionContextComponentManager::new(registry));
    let tracker = Arc::new(PreloadTracker::new());
    let preloader = VersionContextPreloader::new(
        manager.clone(),
        tracker.clone(),
        VersionId::master(),
        retry_delay,
    );
    let evictor =
        VersionContextEvictor::new(manager.clone(), tracker.clone(), VersionId::master());
    let publisher = EventPublisher::new()
        .with_listener(Arc::new(preloader))
        .with_listener(Arc::new(evictor));
    Harness {
        manager,
        tracker,
        publisher,
    }
}

#[tokio::test]
async fn test_candidate_preload_retries_with_fixed_delay() {
    init_test_logging();
    let retry_delay = Duration::from_millis(25);
    let factory = FlakyFactory::failing(2);
    let harness = harness(factory.clone(), retry_delay);
    let version = VersionId::new("196");

    let handles = harness
        .publisher
        .publish(PortalEvent::version_candidate_created("196"));
    assert_eq!(handles.len(), 1);
    for handle in handles {
        handle.await.unwrap();
    }

    assert_eq!(factory.attempt_count(), 3);
    assert!(factory.min_gap().unwrap() >= retry_delay);

    let status = harness.tracker.status(&version).unwrap();
    assert_eq!(status.state, PreloadState::Ready);
    assert_eq!(status.attempts, 3);
    assert!(harness
        .manager
        .is_cached(&version, regman::ComponentType::of::<Connection>()));
}

#[tokio::test]
async fn test_application_started_preloads_master() {
    let harness = harness(FlakyFactory::failing(0), Duration::from_millis(1));

    for handle in harness.publisher.publish(PortalEvent::ApplicationStarted) {
        handle.await.unwrap();
    }

    assert_eq!(
        harness.tracker.state(&VersionId::master()),
        PreloadState::Ready
    );
    assert_eq!(harness.manager.cached_versions(), vec![VersionId::master()]);
}

#[tokio::test]
async fn test_closed_candidate_is_released() {
    let harness = harness(FlakyFactory::failing(0), Duration::from_millis(1));

    for handle in harness
        .publisher
        .publish(PortalEvent::version_candidate_created("42"))
    {
        handle.await.unwrap();
    }
    assert_eq!(harness.manager.cached_versions(), vec![VersionId::new("42")]);

    for handle in harness
        .publisher
        .publish(PortalEvent::version_candidate_closed("42"))
    {
        handle.await.unwrap();
    }
    assert!(harness.manager.cached_versions().is_empty());
    assert_eq!(
        harness.tracker.state(&VersionId::new("42")),
        PreloadState::Uninitialized
    );
}

#[tokio::test]
async fn test_shutdown_cancels_endless_retry() {
    let factory = FlakyFactory::failing(u32::MAX);
    let harness = harness(factory.clone(), Duration::from_millis(10));

    let handles = harness
        .publisher
        .publish(PortalEvent::version_candidate_created("9"));
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(
        harness.tracker.state(&VersionId::new("9")),
        PreloadState::Initializing
    );

    harness.publisher.shutdown();
    for handle in handles {
        assert!(handle.await.unwrap_err().is_cancelled());
    }

    let attempts = factory.attempt_count();
    tokio::time::sleep(Duration::from_millis(30)).await;
    assert_eq!(factory.attempt_count(), attempts);
    assert!(attempts >= 2);
}
