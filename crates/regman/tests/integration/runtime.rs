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

use regman::events::PreloadState;
use regman::{GitContext, PortalConfig, PortalRuntime, RegistryDataSource, VersionId};
use tempfile::TempDir;

use crate::fixtures::init_test_logging;

fn config(root: &TempDir) -> PortalConfig {
    let mut config = PortalConfig::default();
    config.git.repositories_root = root.path().to_path_buf();
    config.context.retry_delay_ms = 10;
    config
}

#[tokio::test]
async fn test_startup_preloads_master_context() {
    init_test_logging();
    let root = TempDir::new().unwrap();
    let runtime = PortalRuntime::from_config(&config(&root)).unwrap();

    for handle in runtime.start() {
        handle.await.unwrap();
    }

    let master = VersionId::master();
    assert_eq!(runtime.tracker().state(&master), PreloadState::Ready);

    let git = runtime
        .manager()
        .get_component::<GitContext>(&master)
        .await
        .unwrap();
    assert!(git.work_dir().is_dir());
    assert_eq!(git.ref_name(), "refs/heads/master");

    let ds = runtime
        .manager()
        .get_component::<RegistryDataSource>(&master)
        .await
        .unwrap();
    assert!(ds.connection_url().ends_with("registry"));
}

#[tokio::test]
async fn test_startup_preload_can_be_disabled() {
    let root = TempDir::new().unwrap();
    let mut config = config(&root);
    config.context.preload_on_startup = false;
    let runtime = PortalRuntime::from_config(&config).unwrap();

    assert!(runtime.start().is_empty());
    assert!(runtime.manager().cached_versions().is_empty());
}

#[tokio::test]
async fn test_candidate_lifecycle() {
    let root = TempDir::new().unwrap();
    let runtime = PortalRuntime::from_config(&config(&root)).unwrap();
    let candidate = VersionId::new("196");

    for handle in runtime.version_candidate_created("196") {
        handle.await.unwrap();
    }
    assert_eq!(runtime.tracker().state(&candidate), PreloadState::Ready);
    assert_eq!(runtime.manager().cached_versions(), vec![candidate.clone()]);

    let git = runtime
        .manager()
        .get_component::<GitContext>(&candidate)
        .await
        .unwrap();
    assert_eq!(git.ref_name(), "refs/changes/96/196");

    for handle in runtime.version_candidate_closed("196") {
        handle.await.unwrap();
    }
    assert!(runtime.manager().cached_versions().is_empty());
    assert_eq!(
        runtime.tracker().state(&candidate),
        PreloadState::Uninitialized
    );

    runtime.shutdown();
    assert!(runtime.version_candidate_created("197").is_empty());
}
