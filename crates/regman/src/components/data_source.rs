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

//! Per-version registry data sources.
//!
//! Every version has its own PostgreSQL database. The master version uses the
//! configured master database (`registry` by default); a version candidate
//! uses the candidate template with `{version}` substituted
//! (`registry_dev_{version}` by default). Each data source wraps an
//! async `deadpool-diesel` pool that connects lazily on first checkout.

use async_trait::async_trait;
use deadpool_diesel::postgres::{Manager as PgManager, Pool as PgPool, Runtime as PgRuntime};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::fmt;
use tracing::info;
use url::Url;

use super::schema::validate_schema_name;
use crate::config::DatabaseConfig;
use crate::context::VersionComponentFactory;
use crate::error::ComponentError;
use crate::version::VersionId;

/// Placeholder replaced by the version identifier in the candidate template.
pub const VERSION_PLACEHOLDER: &str = "{version}";

/// Connection pool bound to one version's database.
pub struct RegistryDataSource {
    version: VersionId,
    database_name: String,
    connection_url: String,
    pool: PgPool,
}

impl RegistryDataSource {
    pub fn version(&self) -> &VersionId {
        &self.version
    }

    pub fn database_name(&self) -> &str {
        &self.database_name
    }

    /// Full connection URL, credentials included.
    pub fn connection_url(&self) -> &str {
        &self.connection_url
    }

    /// Connection URL with the password masked, suitable for logs.
    pub fn redacted_url(&self) -> String {
        redact(&self.connection_url)
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Checks out a connection from the pool.
    pub async fn get_connection(
        &self,
    ) -> Result<deadpool::managed::Object<PgManager>, ComponentError> {
        self.pool
            .get()
            .await
            .map_err(|e| ComponentError::Pool(e.to_string()))
    }

    /// Runs `SELECT 1` against the version's database.
    pub async fn check_connection(&self) -> Result<(), ComponentError> {
        use diesel::RunQueryDsl;

        let conn = self.get_connection().await?;
        conn.interact(|conn| diesel::sql_query("SELECT 1").execute(conn))
            .await
            .map_err(|e| ComponentError::Pool(format!("Connection check failed: {}", e)))?
            .map_err(|e| ComponentError::Pool(format!("Connection check failed: {}", e)))?;
        Ok(())
    }

    /// Closes the pool. Outstanding connections are dropped when returned.
    pub fn close(&self) {
        self.pool.close();
    }

    pub fn is_closed(&self) -> bool {
        self.pool.is_closed()
    }
}

impl fmt::Debug for RegistryDataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistryDataSource")
            .field("version", &self.version)
            .field("database_name", &self.database_name)
            .field("connection_url", &self.redacted_url())
            .finish()
    }
}

/// Builds [`RegistryDataSource`]s from the database configuration.
pub struct RegistryDataSourceFactory {
    base_url: String,
    pool_size: u32,
    master_version: VersionId,
    master_database: String,
    candidate_template: String,
    invalidated: Mutex<HashSet<VersionId>>,
}

impl RegistryDataSourceFactory {
    pub fn new(config: &DatabaseConfig, master_version: VersionId) -> Self {
        Self {
            base_url: config.url.clone(),
            pool_size: config.pool_size,
            master_version,
            master_database: config.master_database.clone(),
            candidate_template: config.candidate_database_template.clone(),
            invalidated: Mutex::new(HashSet::new()),
        }
    }

    /// Resolves and validates the database name for `version`.
    pub fn database_name(&self, version: &VersionId) -> Result<String, ComponentError> {
        let name = if *version == self.master_version {
            self.master_database.clone()
        } else {
            self.candidate_template
                .replace(VERSION_PLACEHOLDER, version.as_str())
        };
        validate_schema_name(&name)?;
        Ok(name)
    }

    /// Connection URL for `version`: the base URL with its path replaced by
    /// the version's database name.
    pub fn connection_url(&self, version: &VersionId) -> Result<String, ComponentError> {
        let database_name = self.database_name(version)?;
        let mut url = Url::parse(&self.base_url).map_err(|e| {
            ComponentError::creation_failed(
                "registry data source",
                version.as_str(),
                format!("invalid database URL: {}", e),
            )
        })?;
        url.set_path(&database_name);
        Ok(url.to_string())
    }

    /// Marks the data source of `version` stale; the next lookup rebuilds it.
    pub fn invalidate(&self, version: &VersionId) {
        self.invalidated.lock().insert(version.clone());
    }
}

#[async_trait]
impl VersionComponentFactory for RegistryDataSourceFactory {
    type Component = RegistryDataSource;

    async fn create_component(
        &self,
        version: &VersionId,
    ) -> Result<RegistryDataSource, ComponentError> {
        let database_name = self.database_name(version)?;
        let connection_url = self.connection_url(version)?;

        let manager = PgManager::new(connection_url.clone(), PgRuntime::Tokio1);
        let pool = PgPool::builder(manager)
            .max_size(self.pool_size as usize)
            .build()
            .map_err(|e| ComponentError::Pool(e.to_string()))?;

        self.invalidated.lock().remove(version);

        let data_source = RegistryDataSource {
            version: version.clone(),
            database_name,
            connection_url,
            pool,
        };
        info!(
            "Registry data source for version '{}' initialized: {}",
            version,
            data_source.redacted_url()
        );
        Ok(data_source)
    }

    fn should_be_recreated(&self, version: &VersionId) -> bool {
        self.invalidated.lock().contains(version)
    }
}

fn redact(connection_url: &str) -> String {
    match Url::parse(connection_url) {
        Ok(mut url) if url.password().is_some() => {
            let _ = url.set_password(Some("***"));
            url.to_string()
        }
        Ok(url) => url.to_string(),
        Err(_) => "<invalid url>".to_string(),
    }
}
