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

//! Error types for version-scoped component management.
//!
//! [`ComponentError`] is shared by the component manager and every factory.
//! The manager never wraps what a factory returns, so a caller of
//! `get_component` sees exactly the error the factory produced.

use thiserror::Error;

use crate::components::SchemaError;
use crate::config::ConfigError;

/// Errors raised while resolving or constructing a version-scoped component.
#[derive(Debug, Error)]
pub enum ComponentError {
    /// No factory is registered for the requested component type.
    #[error("No factory registered for component type '{type_name}'")]
    UnknownComponentType { type_name: &'static str },

    /// Two factories were registered for the same component type.
    #[error("A factory for component type '{type_name}' is already registered")]
    DuplicateFactory { type_name: &'static str },

    /// A cached value could not be downcast to the requested type.
    #[error("Cached component does not match requested type '{type_name}'")]
    TypeMismatch { type_name: &'static str },

    /// A factory failed to construct its component.
    #[error("Failed to create {component} for version '{version}': {message}")]
    CreationFailed {
        component: &'static str,
        version: String,
        message: String,
    },

    /// The resolved database name is not a safe PostgreSQL identifier.
    #[error("Invalid schema name: {0}")]
    InvalidSchema(#[from] SchemaError),

    /// Connection pool construction or checkout failed.
    #[error("Connection pool error: {0}")]
    Pool(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ComponentError {
    /// Shorthand for [`ComponentError::CreationFailed`].
    pub fn creation_failed(
        component: &'static str,
        version: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        ComponentError::CreationFailed {
            component,
            version: version.into(),
            message: message.into(),
        }
    }
}

/// Errors raised while assembling the version-context runtime.
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Component registry error: {0}")]
    Component(#[from] ComponentError),

    #[error("Runtime is not available: {0}")]
    NoRuntime(String),
}
