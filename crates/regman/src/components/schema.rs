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

//! PostgreSQL identifier checks for per-version database names.
//!
//! Version identifiers flow into database names, so the resolved name is
//! validated before it reaches a connection URL.

use thiserror::Error;

/// Maximum length for PostgreSQL identifiers (NAMEDATALEN - 1).
const MAX_SCHEMA_NAME_LENGTH: usize = 63;

/// Reserved PostgreSQL names that cannot be used.
const RESERVED_SCHEMA_NAMES: &[&str] = &[
    "public",
    "pg_catalog",
    "information_schema",
    "pg_temp",
    "postgres",
    "template0",
    "template1",
];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchemaError {
    #[error("Schema name length invalid: '{name}' (must be 1-{max} characters)")]
    InvalidLength { name: String, max: usize },

    #[error("Schema name must start with a letter or underscore: '{0}'")]
    InvalidStart(String),

    #[error(
        "Schema name contains invalid characters (only alphanumeric and underscore allowed): '{0}'"
    )]
    InvalidCharacters(String),

    #[error("Schema name is reserved: '{0}'")]
    ReservedName(String),
}

/// Validates a PostgreSQL database or schema name.
///
/// - Length must be between 1 and 63 characters
/// - Must start with a letter (a-z, A-Z) or underscore
/// - Subsequent characters must be alphanumeric or underscore
/// - Cannot be a reserved PostgreSQL name
///
/// ```
/// use regman::components::validate_schema_name;
///
/// assert!(validate_schema_name("registry_dev_196").is_ok());
/// assert!(validate_schema_name("registry").is_ok());
/// assert!(validate_schema_name("public").is_err());
/// assert!(validate_schema_name("196_registry").is_err());
/// assert!(validate_schema_name("registry-dev").is_err());
/// ```
pub fn validate_schema_name(name: &str) -> Result<&str, SchemaError> {
    if name.is_empty() || name.len() > MAX_SCHEMA_NAME_LENGTH {
        return Err(SchemaError::InvalidLength {
            name: name.to_string(),
            max: MAX_SCHEMA_NAME_LENGTH,
        });
    }

    let starts_ok = name
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
    if !starts_ok {
        return Err(SchemaError::InvalidStart(name.to_string()));
    }

    if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(SchemaError::InvalidCharacters(name.to_string()));
    }

    let lower_name = name.to_lowercase();
    if RESERVED_SCHEMA_NAMES.contains(&lower_name.as_str()) {
        return Err(SchemaError::ReservedName(name.to_string()));
    }

    Ok(name)
}
