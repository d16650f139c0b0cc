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

//! Version identifiers.
//!
//! A [`VersionId`] names either the master branch or a numbered version
//! candidate (a Gerrit change). No format is enforced here; callers decide
//! what a valid identifier looks like.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Name of the master version used when configuration does not override it.
pub const DEFAULT_MASTER_VERSION: &str = "master";

/// Identifier of a master branch or version candidate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VersionId(String);

impl VersionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The default master version, `"master"`.
    pub fn master() -> Self {
        Self::new(DEFAULT_MASTER_VERSION)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the change number when this identifier is purely numeric.
    pub fn candidate_number(&self) -> Option<u64> {
        if self.0.is_empty() || !self.0.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
        self.0.parse().ok()
    }
}

impl fmt::Display for VersionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for VersionId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for VersionId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl AsRef<str> for VersionId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
