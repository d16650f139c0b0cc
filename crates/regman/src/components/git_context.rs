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

//! Per-version git working contexts.
//!
//! A [`GitContext`] pins the working directory and the ref a version's
//! regulation files are read from. Numeric version candidates map to Gerrit
//! change refs (`refs/changes/96/196`), the master version to its branch.

use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};
use tracing::info;

use crate::config::GitConfig;
use crate::context::VersionComponentFactory;
use crate::error::ComponentError;
use crate::version::VersionId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitContext {
    version: VersionId,
    ref_name: String,
    work_dir: PathBuf,
}

impl GitContext {
    pub fn version(&self) -> &VersionId {
        &self.version
    }

    /// Ref to check out for this version.
    pub fn ref_name(&self) -> &str {
        &self.ref_name
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    /// Resolves a repository-relative path inside the working directory.
    ///
    /// Returns `None` for absolute paths or paths escaping the working
    /// directory through `..`.
    pub fn resolve(&self, relative: impl AsRef<Path>) -> Option<PathBuf> {
        let relative = relative.as_ref();
        let escapes = relative.components().any(|c| {
            matches!(
                c,
                Component::ParentDir | Component::RootDir | Component::Prefix(_)
            )
        });
        if escapes {
            return None;
        }
        Some(self.work_dir.join(relative))
    }
}

/// Builds [`GitContext`]s under the configured repositories root.
#[derive(Debug)]
pub struct GitContextFactory {
    repositories_root: PathBuf,
    repository_name: String,
    master_version: VersionId,
}

impl GitContextFactory {
    pub fn new(config: &GitConfig, master_version: VersionId) -> Self {
        Self {
            repositories_root: config.repositories_root.clone(),
            repository_name: config.repository_name.clone(),
            master_version,
        }
    }

    /// Working directory for `version`.
    pub fn work_dir(&self, version: &VersionId) -> PathBuf {
        self.repositories_root
            .join(&self.repository_name)
            .join(version.as_str())
    }

    /// Ref to check out for `version`.
    pub fn ref_name(&self, version: &VersionId) -> String {
        if *version == self.master_version {
            return format!("refs/heads/{}", version);
        }
        match version.candidate_number() {
            Some(number) => format!("refs/changes/{:02}/{}", number % 100, number),
            None => format!("refs/heads/{}", version),
        }
    }

    fn check_version(&self, version: &VersionId) -> Result<(), ComponentError> {
        let id = version.as_str();
        let is_single_segment = !id.is_empty()
            && id != "."
            && id != ".."
            && !id.contains(['/', '\\']);
        if is_single_segment {
            Ok(())
        } else {
            Err(ComponentError::creation_failed(
                "git context",
                id,
                "version identifier is not a valid directory name",
            ))
        }
    }
}

#[async_trait]
impl VersionComponentFactory for GitContextFactory {
    type Component = GitContext;

    async fn create_component(&self, version: &VersionId) -> Result<GitContext, ComponentError> {
        self.check_version(version)?;

        let work_dir = self.work_dir(version);
        tokio::fs::create_dir_all(&work_dir).await?;

        let context = GitContext {
            version: version.clone(),
            ref_name: self.ref_name(version),
            work_dir,
        };
        info!(
            "Git context for version '{}' ready at {} ({})",
            version,
            context.work_dir.display(),
            context.ref_name
        );
        Ok(context)
    }

    /// A context whose working directory was removed must be rebuilt.
    fn should_be_recreated(&self, version: &VersionId) -> bool {
        !self.work_dir(version).is_dir()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn factory(root: &Path) -> GitContextFactory {
        let config = GitConfig {
            repositories_root: root.to_path_buf(),
            repository_name: "registry-regulations".to_string(),
        };
        GitContextFactory::new(&config, VersionId::master())
    }

    #[test]
    fn test_ref_names() {
        let temp = TempDir::new().unwrap();
        let factory = factory(temp.path());

        assert_eq!(factory.ref_name(&VersionId::master()), "refs/heads/master");
        assert_eq!(
            factory.ref_name(&VersionId::new("196")),
            "refs/changes/96/196"
        );
        assert_eq!(factory.ref_name(&VersionId::new("7")), "refs/changes/07/7");
        assert_eq!(
            factory.ref_name(&VersionId::new("feature")),
            "refs/heads/feature"
        );
    }

    #[tokio::test]
    async fn test_create_component_makes_work_dir() {
        let temp = TempDir::new().unwrap();
        let factory = factory(temp.path());
        let version = VersionId::new("196");

        assert!(factory.should_be_recreated(&version));
        let context = factory.create_component(&version).await.unwrap();

        assert!(context.work_dir().is_dir());
        assert!(context
            .work_dir()
            .ends_with(Path::new("registry-regulations").join("196")));
        assert!(!factory.should_be_recreated(&version));

        std::fs::remove_dir_all(context.work_dir()).unwrap();
        assert!(factory.should_be_recreated(&version));
    }

    #[tokio::test]
    async fn test_rejects_path_like_versions() {
        let temp = TempDir::new().unwrap();
        let factory = factory(temp.path());

        for bad in ["", "..", "../etc", "a/b"] {
            let result = factory.create_component(&VersionId::new(bad)).await;
            assert!(
                matches!(result, Err(ComponentError::CreationFailed { .. })),
                "expected rejection for {:?}",
                bad
            );
        }
    }

    #[tokio::test]
    async fn test_resolve_stays_inside_work_dir() {
        let temp = TempDir::new().unwrap();
        let context = factory(temp.path())
            .create_component(&VersionId::master())
            .await
            .unwrap();

        assert_eq!(
            context.resolve("bpmn/process.bpmn"),
            Some(context.work_dir().join("bpmn/process.bpmn"))
        );
        assert_eq!(context.resolve("../other"), None);
        assert_eq!(context.resolve("/etc/passwd"), None);
    }
}
