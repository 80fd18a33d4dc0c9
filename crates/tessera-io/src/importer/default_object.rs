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

use std::collections::BTreeMap;

use tessera_core::{LocalFileId, TypeTag};

use super::{ImportContext, ImportStrategy, ImportedAsset};
use crate::ImportError;

/// Synthesises a default object of a fixed type without reading the file.
///
/// The object is named after the file and published at a fixed file id so
/// references written by the editor (`{fileID: 2100000, guid: …}` for
/// materials) still resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DefaultObject {
    type_tag: TypeTag,
    file_id: LocalFileId,
}

impl DefaultObject {
    /// A strategy producing an object of `type_tag` at `file_id`.
    pub fn new(type_tag: TypeTag, file_id: LocalFileId) -> Self {
        Self { type_tag, file_id }
    }
}

impl ImportStrategy for DefaultObject {
    fn name(&self) -> &'static str {
        "DefaultObjectImporter"
    }

    fn reads_file(&self) -> bool {
        false
    }

    fn import(&self, cx: &ImportContext<'_>) -> Result<ImportedAsset, ImportError> {
        let handle = match cx.previous().get(&self.file_id) {
            Some(existing) if existing.type_tag() == self.type_tag => existing.clone(),
            _ => cx
                .types()
                .create(self.type_tag)
                .map_err(|source| ImportError::UnknownType {
                    path: cx.path().clone(),
                    source,
                })?,
        };

        {
            let mut object = handle.write();
            let header = object.header_mut();
            header.guid = Some(cx.guid());
            header.file_id = self.file_id;
            object.set_name(cx.path().file_stem());
        }

        Ok(ImportedAsset {
            main_asset: Some(handle.clone()),
            objects: BTreeMap::from([(self.file_id, handle)]),
        })
    }
}
