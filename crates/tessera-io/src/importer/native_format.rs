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

use std::fs;

use tessera_core::{
    serialization::{Allocation, Document, DocumentWriter},
    ObjectHandle,
};
use tessera_data::objects::Prefab;

use super::{ImportContext, ImportStrategy, ImportedAsset};
use crate::ImportError;

/// Decodes and writes the native text document format.
#[derive(Debug, Default, Clone, Copy)]
pub struct NativeFormat;

impl ImportStrategy for NativeFormat {
    fn name(&self) -> &'static str {
        "NativeFormatImporter"
    }

    fn import(&self, cx: &ImportContext<'_>) -> Result<ImportedAsset, ImportError> {
        let text = cx.read_to_string()?;
        let document = Document::parse(&text).map_err(|err| cx.document_error(err))?;

        let reader = cx.document_reader();
        let allocation = reader
            .allocate(&document, cx.previous())
            .map_err(|err| cx.document_error(err))?;
        if allocation.is_empty() {
            return Err(ImportError::Empty(cx.path().clone()));
        }

        cx.publish(&allocation);
        reader
            .populate(&document, &allocation, cx.resolver())
            .map_err(|err| cx.document_error(err))?;

        let main_asset = select_main(cx, &allocation)?;
        main_asset.write().set_name(cx.path().file_stem());
        if let Some(mut prefab) = main_asset.downcast_mut::<Prefab>() {
            prefab.objects = allocation
                .iter()
                .map(|(file_id, handle)| (file_id, handle.downgrade()))
                .collect();
        }

        Ok(ImportedAsset {
            main_asset: Some(main_asset),
            objects: allocation.into_objects(),
        })
    }

    fn save(&self, cx: &ImportContext<'_>, roots: &[ObjectHandle]) -> Result<(), ImportError> {
        let written = DocumentWriter::new(cx.types())
            .with_guid(cx.guid())
            .write(roots)
            .map_err(|source| ImportError::Write {
                path: cx.path().clone(),
                source,
            })?;
        fs::write(cx.full_path(), written.to_text())
            .map_err(|err| ImportError::io(cx.full_path(), err))
    }
}

/// A null declared id selects the first decoded object (version 2 sidecars).
fn select_main(
    cx: &ImportContext<'_>,
    allocation: &Allocation,
) -> Result<ObjectHandle, ImportError> {
    let declared = cx.main_object_file_id();
    if declared.is_null() {
        return allocation
            .first()
            .map(|(_, handle)| handle.clone())
            .ok_or_else(|| ImportError::Empty(cx.path().clone()));
    }
    allocation
        .get(declared)
        .cloned()
        .ok_or_else(|| ImportError::MissingMainObject {
            path: cx.path().clone(),
            file_id: declared,
        })
}
