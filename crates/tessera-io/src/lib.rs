// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! # Tessera IO
//!
//! Asset services built on `tessera-core`: the [`AssetDatabase`] that maps
//! paths and GUIDs to importers, the importers that lazily turn documents on
//! disk into object graphs, sidecar metadata, project scanning and the
//! database configuration.

#![warn(missing_docs)]

pub mod config;
mod database;
mod error;
pub mod importer;
pub mod meta;
pub mod scan;

pub use config::{ConfigError, DatabaseConfig, DefaultObjectConfig};
pub use database::AssetDatabase;
pub use error::{AssetError, ImportError, NotFound};
pub use importer::{ImportState, Importer};
pub use meta::{AssetMeta, MetaError};
pub use scan::{scan_project, ScanReport};
