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

//! Concrete version-scoped components and their factories.

pub mod data_source;
pub mod git_context;
pub mod schema;

pub use data_source::{RegistryDataSource, RegistryDataSourceFactory, VERSION_PLACEHOLDER};
pub use git_context::{GitContext, GitContextFactory};
pub use schema::{validate_schema_name, SchemaError};
