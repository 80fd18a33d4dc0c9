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

//! Error types of the asset database and its importers.

use std::{io, path::PathBuf, sync::Arc};

use tessera_core::{
    serialization::{DocumentError, WriteError},
    AssetPath, Guid, InstanceId, LocalFileId, UnknownTypeTag,
};
use thiserror::Error;

/// A lookup found nothing. Always recoverable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NotFound {
    /// No GUID is registered for the path.
    #[error("no GUID registered for '{0}'")]
    Path(AssetPath),

    /// No path is registered for the GUID.
    #[error("no path registered for GUID {0}")]
    Guid(Guid),

    /// The document has no object at the file id.
    #[error("no object with file id {file_id} in document {guid}")]
    Object {
        /// The document searched.
        guid: Guid,
        /// The missing id.
        file_id: LocalFileId,
    },
}

/// A document could not be turned into a usable asset.
///
/// Import failures are cached by their importer and handed out again on
/// every later request, hence `Clone`.
#[derive(Debug, Clone, Error)]
pub enum ImportError {
    /// The document file could not be read or written.
    #[error("'{path}': {source}")]
    Io {
        /// Absolute path of the file.
        path: PathBuf,
        /// The underlying failure.
        #[source]
        source: Arc<io::Error>,
    },

    /// The document could not be decoded.
    #[error("{path}: {source}")]
    Document {
        /// The asset being imported.
        path: AssetPath,
        /// The decode failure.
        #[source]
        source: DocumentError,
    },

    /// The document decoded to nothing.
    #[error("{0}: document contains no objects")]
    Empty(AssetPath),

    /// The object declared as main object does not exist.
    #[error("{path}: main object {file_id} not found in document")]
    MissingMainObject {
        /// The asset being imported.
        path: AssetPath,
        /// The declared id.
        file_id: LocalFileId,
    },

    /// The import succeeded but designated no main asset.
    #[error("{0}: asset has no main object")]
    NoMainAsset(AssetPath),

    /// No import strategy handles the path's extension.
    #[error("{0}: no importer handles this kind of file")]
    Unsupported(AssetPath),

    /// The strategy cannot write documents back.
    #[error("{0}: asset is read-only")]
    ReadOnly(AssetPath),

    /// A synthesised object's type is not registered.
    #[error("{path}: {source}")]
    UnknownType {
        /// The asset being imported.
        path: AssetPath,
        /// The factory failure.
        #[source]
        source: UnknownTypeTag,
    },

    /// The in-memory graph could not be encoded.
    #[error("{path}: {source}")]
    Write {
        /// The asset being saved.
        path: AssetPath,
        /// The encode failure.
        #[source]
        source: WriteError,
    },
}

impl ImportError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        ImportError::Io {
            path: path.into(),
            source: Arc::new(source),
        }
    }
}

/// Errors surfaced by [`AssetDatabase`](crate::AssetDatabase) operations.
#[derive(Debug, Error)]
pub enum AssetError {
    /// A path, GUID or object is unknown.
    #[error(transparent)]
    NotFound(#[from] NotFound),

    /// The owning document could not be imported.
    #[error(transparent)]
    Import(#[from] ImportError),

    /// The path already names an asset.
    #[error("'{0}' is already registered")]
    AlreadyRegistered(AssetPath),

    /// The object already belongs to a document.
    #[error("object {instance_id} already belongs to document {guid}")]
    AlreadyOwned {
        /// The object passed in.
        instance_id: InstanceId,
        /// Its current document.
        guid: Guid,
    },

    /// A file could not be written.
    #[error("failed to write '{path}': {source}")]
    Io {
        /// Absolute path of the file.
        path: PathBuf,
        /// The underlying failure.
        #[source]
        source: io::Error,
    },
}
