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

use url::Url;

use super::{types::*, ValidationError};
use crate::components::{validate_schema_name, VERSION_PLACEHOLDER};

const LOG_LEVELS: &[&str] = &["error", "warn", "info", "debug", "trace"];

pub trait Validate {
    fn validate(&self) -> Result<(), ValidationError>;
}

impl Validate for PortalConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = Vec::new();

        if self.master_version.is_empty() || self.master_version.contains('/') {
            errors.push(ValidationError::InvalidMasterVersion {
                version: self.master_version.clone(),
            });
        }
        if let Err(e) = self.database.validate() {
            errors.push(e);
        }
        if let Err(e) = self.git.validate() {
            errors.push(e);
        }
        if let Err(e) = self.context.validate() {
            errors.push(e);
        }
        if let Err(e) = self.logging.validate() {
            errors.push(e);
        }

        match errors.len() {
            0 => Ok(()),
            1 => Err(errors.remove(0)),
            _ => Err(ValidationError::Multiple { errors }),
        }
    }
}

impl Validate for DatabaseConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        let url_ok = Url::parse(&self.url)
            .map(|url| matches!(url.scheme(), "postgres" | "postgresql"))
            .unwrap_or(false);
        if !url_ok {
            return Err(ValidationError::InvalidDatabaseUrl {
                url: self.url.clone(),
            });
        }

        if self.pool_size == 0 || self.pool_size > 100 {
            return Err(ValidationError::InvalidPoolSize {
                size: self.pool_size,
            });
        }

        if !self.candidate_database_template.contains(VERSION_PLACEHOLDER) {
            return Err(ValidationError::InvalidTemplate {
                template: self.candidate_database_template.clone(),
            });
        }

        // A sample candidate must resolve to a valid name as well
        let sample = self
            .candidate_database_template
            .replace(VERSION_PLACEHOLDER, "1");
        for name in [self.master_database.as_str(), sample.as_str()] {
            validate_schema_name(name).map_err(|e| ValidationError::InvalidDatabaseName {
                message: e.to_string(),
            })?;
        }

        Ok(())
    }
}

impl Validate for GitConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.repositories_root.as_os_str().is_empty() {
            return Err(ValidationError::InvalidPath {
                path: "repositories_root must not be empty".to_string(),
            });
        }
        if self.repository_name.is_empty() || self.repository_name.contains(['/', '\\']) {
            return Err(ValidationError::InvalidPath {
                path: format!("invalid repository name: '{}'", self.repository_name),
            });
        }
        Ok(())
    }
}

impl Validate for ContextConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.retry_delay_ms == 0 {
            return Err(ValidationError::InvalidRetryDelay {
                delay_ms: self.retry_delay_ms,
            });
        }
        Ok(())
    }
}

impl Validate for LoggingConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        if !LOG_LEVELS.contains(&self.level.to_lowercase().as_str()) {
            return Err(ValidationError::InvalidLogLevel {
                level: self.level.clone(),
            });
        }
        Ok(())
    }
}
