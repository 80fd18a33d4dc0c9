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

//! Database configuration, read from `Tessera.toml`.

use std::{
    collections::BTreeMap,
    fs, io,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use tessera_core::{LocalFileId, TypeTag};
use thiserror::Error;

/// Name of the configuration file looked up at the project root.
pub const CONFIG_FILE_NAME: &str = "Tessera.toml";

/// The object synthesised for files of one extension without reading them.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct DefaultObjectConfig {
    /// Type of the synthesised main object.
    pub type_tag: TypeTag,
    /// File id the object is published under.
    pub file_id: LocalFileId,
}

/// Represents the structure of the `Tessera.toml` file.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Directory asset paths are relative to.
    pub project_root: PathBuf,
    /// Directories, relative to the project root, scanned for assets.
    pub source_directories: Vec<PathBuf>,
    /// Extensions decoded as native documents.
    pub native_extensions: Vec<String>,
    /// Extensions whose main object is synthesised, keyed by extension.
    pub default_objects: BTreeMap<String, DefaultObjectConfig>,
    /// Skip blocks of unregistered types instead of failing the import.
    pub skip_unknown_types: bool,
}

impl Default for DatabaseConfig {
    /// Provides the configuration used when `Tessera.toml` is not found.
    ///
    /// Assets live under `Assets/` of the current directory; the usual
    /// native document extensions are decoded, and `.mat` files produce a
    /// default material at file id `2100000`.
    fn default() -> Self {
        let native_extensions = [
            "asset",
            "prefab",
            "unity",
            "controller",
            "anim",
            "physicMaterial",
            "mask",
            "overrideController",
        ]
        .iter()
        .map(|ext| ext.to_string())
        .collect();

        let mut default_objects = BTreeMap::new();
        default_objects.insert(
            "mat".to_string(),
            DefaultObjectConfig {
                type_tag: TypeTag(21),
                file_id: LocalFileId(2_100_000),
            },
        );

        Self {
            project_root: PathBuf::from("."),
            source_directories: vec![PathBuf::from("Assets")],
            native_extensions,
            default_objects,
            skip_unknown_types: false,
        }
    }
}

/// Errors raised while loading the configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file exists but could not be read.
    #[error("failed to read '{path}': {source}")]
    Io {
        /// The configuration file.
        path: PathBuf,
        /// The underlying failure.
        #[source]
        source: io::Error,
    },

    /// The file is not valid TOML or does not match the schema.
    #[error("failed to parse '{path}': {source}")]
    Parse {
        /// The configuration file.
        path: PathBuf,
        /// The parser failure.
        #[source]
        source: toml::de::Error,
    },
}

impl DatabaseConfig {
    /// A default configuration rooted at `root`.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            project_root: root.into(),
            ..Self::default()
        }
    }

    /// Loads the configuration file at `path`.
    ///
    /// A missing file yields the defaults rooted at the file's directory. A
    /// relative `project_root` is resolved against that directory too.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let base = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                log::info!(
                    "No '{}' found. Using default configuration.",
                    path.display()
                );
                return Ok(Self::with_root(base));
            }
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        let mut config: Self = toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        if config.project_root.is_relative() {
            config.project_root = base.join(&config.project_root);
        }
        log::debug!("Loaded configuration from '{}'", path.display());
        Ok(config)
    }

    /// Loads `Tessera.toml` from a project directory.
    pub fn load_from_project(root: &Path) -> Result<Self, ConfigError> {
        Self::load(&root.join(CONFIG_FILE_NAME))
    }

    /// Returns `true` if files with this extension are native documents.
    pub fn is_native(&self, extension: &str) -> bool {
        self.native_extensions
            .iter()
            .any(|candidate| candidate.eq_ignore_ascii_case(extension))
    }

    /// The default object configured for an extension.
    pub fn default_object(&self, extension: &str) -> Option<DefaultObjectConfig> {
        self.default_objects
            .iter()
            .find(|(candidate, _)| candidate.eq_ignore_ascii_case(extension))
            .map(|(_, config)| *config)
    }
}
