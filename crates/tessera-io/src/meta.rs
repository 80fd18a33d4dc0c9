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

//! `.meta` sidecar files: the GUID of an asset and its importer settings.

use std::{
    fs, io,
    path::{Path, PathBuf},
    time::{SystemTime, UNIX_EPOCH},
};

use tessera_core::{
    serialization::{emit_node, parse_node, Node, SyntaxError},
    Guid, InvalidGuid, LocalFileId,
};
use thiserror::Error;

/// Extension of sidecar files.
pub const META_EXTENSION: &str = "meta";

/// Errors raised while reading a sidecar.
#[derive(Debug, Error)]
pub enum MetaError {
    /// The sidecar could not be read.
    #[error("failed to read '{path}': {source}")]
    Io {
        /// The sidecar file.
        path: PathBuf,
        /// The underlying failure.
        #[source]
        source: io::Error,
    },

    /// The sidecar is not well formed.
    #[error("syntax error: {0}")]
    Syntax(#[from] SyntaxError),

    /// The sidecar has no `guid` entry.
    #[error("missing 'guid' entry")]
    MissingGuid,

    /// The `guid` entry is not a GUID.
    #[error(transparent)]
    InvalidGuid(#[from] InvalidGuid),

    /// An importer setting has the wrong form.
    #[error("invalid value '{value}' for '{key}'")]
    InvalidValue {
        /// The setting.
        key: &'static str,
        /// Its text.
        value: String,
    },
}

/// The contents of a sidecar file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetMeta {
    /// GUID of the asset.
    pub guid: Guid,
    /// Creation time in seconds since the Unix epoch.
    pub time_created: u64,
    /// Name of the importer settings map, e.g. `NativeFormatImporter`.
    pub importer: String,
    /// Declared main object; null selects the first decoded object.
    pub main_object_file_id: LocalFileId,
}

impl AssetMeta {
    /// Sidecar data for a freshly created native document.
    pub fn new(guid: Guid) -> Self {
        let time_created = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_secs())
            .unwrap_or_default();
        Self {
            guid,
            time_created,
            importer: "NativeFormatImporter".to_string(),
            main_object_file_id: LocalFileId::NULL,
        }
    }

    /// Parses sidecar text.
    ///
    /// Only `guid` is required. Importer settings are taken from the first
    /// top-level map whose key ends in `Importer`.
    pub fn parse(text: &str) -> Result<Self, MetaError> {
        let root = parse_node(text)?;

        let guid = root
            .get("guid")
            .and_then(Node::as_scalar)
            .filter(|text| !text.is_empty())
            .ok_or(MetaError::MissingGuid)?
            .parse::<Guid>()?;

        let time_created = match root.get("timeCreated").and_then(Node::as_scalar) {
            Some(text) if !text.is_empty() => {
                text.parse().map_err(|_| MetaError::InvalidValue {
                    key: "timeCreated",
                    value: text.to_string(),
                })?
            }
            _ => 0,
        };

        let importer = root.as_map().and_then(|entries| {
            entries
                .iter()
                .find(|(key, value)| key.ends_with("Importer") && value.as_map().is_some())
        });

        let (importer, main_object_file_id) = match importer {
            Some((name, settings)) => {
                let main = match settings.get("mainObjectFileID").and_then(Node::as_scalar) {
                    Some(text) => LocalFileId(text.parse().map_err(|_| MetaError::InvalidValue {
                        key: "mainObjectFileID",
                        value: text.to_string(),
                    })?),
                    None => LocalFileId::NULL,
                };
                (name.clone(), main)
            }
            None => ("DefaultImporter".to_string(), LocalFileId::NULL),
        };

        Ok(Self {
            guid,
            time_created,
            importer,
            main_object_file_id,
        })
    }

    /// Reads the sidecar of `asset_file`.
    pub fn read(asset_file: &Path) -> Result<Self, MetaError> {
        let path = Self::sidecar_path(asset_file);
        let text = fs::read_to_string(&path).map_err(|source| MetaError::Io { path, source })?;
        Self::parse(&text)
    }

    /// Renders the sidecar text.
    pub fn to_text(&self) -> String {
        let settings = Node::Map(vec![
            (
                "mainObjectFileID".to_string(),
                Node::scalar(self.main_object_file_id),
            ),
            ("externalObjects".to_string(), Node::Map(Vec::new())),
        ]);
        emit_node(&Node::Map(vec![
            ("fileFormatVersion".to_string(), Node::scalar(2)),
            ("guid".to_string(), Node::scalar(self.guid)),
            ("timeCreated".to_string(), Node::scalar(self.time_created)),
            (self.importer.clone(), settings),
        ]))
    }

    /// Writes the sidecar next to `asset_file`.
    pub fn write(&self, asset_file: &Path) -> io::Result<()> {
        fs::write(Self::sidecar_path(asset_file), self.to_text())
    }

    /// The sidecar path of an asset file: the file name plus `.meta`.
    pub fn sidecar_path(asset_file: &Path) -> PathBuf {
        let mut name = asset_file.as_os_str().to_owned();
        name.push(".");
        name.push(META_EXTENSION);
        PathBuf::from(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEXTURE_META: &str = "fileFormatVersion: 2
guid: 9fc0d4010bbf28b4594072e72b8655ab
timeCreated: 1497250592
licenseType: Free
TextureImporter:
  fileIDToRecycleName: {}
  serializedVersion: 4
  mipmaps:
    mipMapMode: 0
    enableMipMap: 1
  userData: 
  assetBundleName: 
";

    #[test]
    fn test_parse_reads_guid_and_importer() {
        let meta = AssetMeta::parse(TEXTURE_META).unwrap();
        assert_eq!(
            meta.guid,
            "9fc0d4010bbf28b4594072e72b8655ab".parse().unwrap()
        );
        assert_eq!(meta.time_created, 1497250592);
        assert_eq!(meta.importer, "TextureImporter");
        assert!(meta.main_object_file_id.is_null());
    }

    #[test]
    fn test_parse_reads_declared_main_object() {
        let meta = AssetMeta::parse(
            "fileFormatVersion: 2
guid: 3b8a1e5d0c4f4e2a9d7b6c5a4f3e2d1c
NativeFormatImporter:
  mainObjectFileID: 11400000
",
        )
        .unwrap();
        assert_eq!(meta.main_object_file_id, LocalFileId(11_400_000));
        assert_eq!(meta.time_created, 0);
    }

    #[test]
    fn test_parse_rejects_missing_or_bad_guid() {
        assert!(matches!(
            AssetMeta::parse("fileFormatVersion: 2\n"),
            Err(MetaError::MissingGuid)
        ));
        assert!(matches!(
            AssetMeta::parse("guid: not-a-guid\n"),
            Err(MetaError::InvalidGuid(_))
        ));
    }

    #[test]
    fn test_written_sidecar_reads_back() {
        let mut meta = AssetMeta::new(Guid::from_path_v5("Assets/Player.prefab"));
        meta.main_object_file_id = LocalFileId(100_100_000);

        let text = meta.to_text();
        assert!(text.starts_with("fileFormatVersion: 2\nguid: "));
        assert!(text.contains("NativeFormatImporter:\n  mainObjectFileID: 100100000\n"));
        assert_eq!(AssetMeta::parse(&text).unwrap(), meta);
    }

    #[test]
    fn test_sidecar_path_appends_extension() {
        assert_eq!(
            AssetMeta::sidecar_path(Path::new("Assets/Player.prefab")),
            PathBuf::from("Assets/Player.prefab.meta")
        );
    }
}
