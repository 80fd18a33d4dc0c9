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

//! The pluggable part of an importer: how a file becomes objects.

use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use tessera_core::{
    serialization::{Allocation, DocumentError, DocumentReader, ReadOptions, ReferenceResolver},
    AssetPath, Guid, LocalFileId, ObjectHandle, TypeRegistry,
};

use super::Importer;
use crate::{AssetDatabase, ImportError};

/// What a successful import produced.
#[derive(Debug, Default)]
pub struct ImportedAsset {
    /// The designated primary object, if the strategy has one.
    pub main_asset: Option<ObjectHandle>,
    /// Every object the importer now owns, by local file id.
    pub objects: BTreeMap<LocalFileId, ObjectHandle>,
}

/// Materialises the object graph of one kind of file.
///
/// Strategies are chosen by file extension when an importer is created. They
/// hold no per-asset state; everything about the asset being imported is
/// reached through the [`ImportContext`].
pub trait ImportStrategy: Send + Sync {
    /// A short name for logs, e.g. `NativeFormatImporter`.
    fn name(&self) -> &'static str;

    /// Whether the import reads the asset file. Strategies that do not are
    /// never considered stale.
    fn reads_file(&self) -> bool {
        true
    }

    /// Decodes the asset.
    fn import(&self, cx: &ImportContext<'_>) -> Result<ImportedAsset, ImportError>;

    /// Writes the given objects back to the asset file, first root first.
    fn save(&self, cx: &ImportContext<'_>, roots: &[ObjectHandle]) -> Result<(), ImportError> {
        let _ = roots;
        Err(ImportError::ReadOnly(cx.path().clone()))
    }
}

/// Everything a strategy may use while importing or saving one asset.
///
/// The asset's location is captured when the context is created, so a move
/// registered mid-import does not affect it.
pub struct ImportContext<'a> {
    importer: &'a Importer,
    database: &'a AssetDatabase,
    path: AssetPath,
    full_path: PathBuf,
    main_object_file_id: LocalFileId,
    previous: BTreeMap<LocalFileId, ObjectHandle>,
}

impl<'a> ImportContext<'a> {
    pub(crate) fn new(
        importer: &'a Importer,
        database: &'a AssetDatabase,
        previous: BTreeMap<LocalFileId, ObjectHandle>,
    ) -> Self {
        Self {
            importer,
            database,
            path: importer.path(),
            full_path: importer.full_path(),
            main_object_file_id: importer.main_object_file_id(),
            previous,
        }
    }

    /// Project-relative path of the asset.
    pub fn path(&self) -> &AssetPath {
        &self.path
    }

    /// Absolute path of the asset file.
    pub fn full_path(&self) -> &Path {
        &self.full_path
    }

    /// GUID of the asset.
    pub fn guid(&self) -> Guid {
        self.importer.guid()
    }

    /// Main object declared by the sidecar; null selects the first object.
    pub fn main_object_file_id(&self) -> LocalFileId {
        self.main_object_file_id
    }

    /// The object factory.
    pub fn types(&self) -> &'a TypeRegistry {
        self.database.types()
    }

    /// Resolves references into other documents, importing them on demand.
    pub fn resolver(&self) -> &'a dyn ReferenceResolver {
        self.database
    }

    /// The objects owned before this import, for instance reuse.
    pub fn previous(&self) -> &BTreeMap<LocalFileId, ObjectHandle> {
        &self.previous
    }

    /// A document reader configured for this asset.
    pub fn document_reader(&self) -> DocumentReader<'a> {
        DocumentReader::new(self.types(), self.path().as_str())
            .with_guid(self.guid())
            .with_options(ReadOptions {
                skip_unknown_types: self.database.config().skip_unknown_types,
            })
    }

    /// Reads the asset file as text.
    pub fn read_to_string(&self) -> Result<String, ImportError> {
        fs::read_to_string(self.full_path()).map_err(|err| ImportError::io(self.full_path(), err))
    }

    /// Makes allocated objects visible to lookups before they are populated.
    ///
    /// A document referencing back into the one being imported finds these
    /// objects instead of starting a second import.
    pub fn publish(&self, allocation: &Allocation) {
        self.importer.publish(self.database, allocation);
    }

    /// Wraps a decode failure with the asset's path.
    pub fn document_error(&self, source: impl Into<DocumentError>) -> ImportError {
        ImportError::Document {
            path: self.path().clone(),
            source: source.into(),
        }
    }
}
