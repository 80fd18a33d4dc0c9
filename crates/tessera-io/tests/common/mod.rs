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

//! Shared fixtures: an on-disk project with a few documents.

#![allow(dead_code)]

use std::{fs, path::Path};

use anyhow::Result;
use tempfile::TempDir;
use tessera_core::{Guid, LocalFileId};
use tessera_io::{scan_project, AssetDatabase, AssetMeta, DatabaseConfig};

pub const PLAYER: &str = "Assets/Player.prefab";
pub const ROCK: &str = "Assets/Rock.asset";

pub fn guid_of(path: &str) -> Guid {
    Guid::from_path_v5(path)
}

/// A prefab with a transform and a mesh filter pointing at the rock mesh.
pub fn player_document() -> String {
    format!(
        "%YAML 1.1
%TAG !u! tag:unity3d.com,2011:
--- !u!1 &100000
GameObject:
  m_Component:
  - component: {{fileID: 400000}}
  - component: {{fileID: 3300000}}
  m_Layer: 0
  m_Name: Hero
  m_IsActive: 1
--- !u!4 &400000
Transform:
  m_GameObject: {{fileID: 100000}}
  m_LocalRotation: {{x: 0, y: 0, z: 0, w: 1}}
  m_LocalPosition: {{x: 1, y: 2, z: 3}}
  m_LocalScale: {{x: 1, y: 1, z: 1}}
  m_Children: []
  m_Father: {{fileID: 0}}
  m_RootOrder: 0
--- !u!33 &3300000
MeshFilter:
  m_GameObject: {{fileID: 100000}}
  m_Mesh: {{fileID: 5, guid: {rock}, type: 2}}
",
        rock = guid_of(ROCK)
    )
}

pub const ROCK_DOCUMENT: &str = "%YAML 1.1
%TAG !u! tag:unity3d.com,2011:
--- !u!43 &5
Mesh:
  m_Name: Rock
  m_Vertices:
  - {x: 0, y: 0, z: 0}
  - {x: 1, y: 0, z: 0}
  - {x: 0, y: 1, z: 0}
  m_Indices: [0, 1, 2]
";

pub struct Project {
    dir: TempDir,
}

impl Project {
    pub fn new() -> Result<Self> {
        Ok(Self {
            dir: tempfile::tempdir()?,
        })
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Writes a file below the project root.
    pub fn write(&self, path: &str, text: &str) -> Result<()> {
        let full = self.root().join(path);
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(full, text)?;
        Ok(())
    }

    /// Writes an asset with a sidecar whose GUID derives from its path.
    pub fn write_asset(&self, path: &str, main_object: i64, text: &str) -> Result<Guid> {
        self.write(path, text)?;
        let mut meta = AssetMeta::new(guid_of(path));
        meta.main_object_file_id = LocalFileId(main_object);
        meta.write(&self.root().join(path))?;
        Ok(meta.guid)
    }

    /// The player prefab and the rock mesh it references.
    pub fn with_player(self) -> Result<Self> {
        self.write_asset(PLAYER, 0, &player_document())?;
        self.write_asset(ROCK, 0, ROCK_DOCUMENT)?;
        Ok(self)
    }

    pub fn config(&self) -> DatabaseConfig {
        DatabaseConfig::with_root(self.root())
    }

    /// A database over the project with every sidecar registered.
    pub fn database(&self) -> AssetDatabase {
        let db = AssetDatabase::new(self.config());
        scan_project(&db);
        db
    }

    pub fn read(&self, path: &str) -> Result<String> {
        Ok(fs::read_to_string(self.root().join(path))?)
    }
}
