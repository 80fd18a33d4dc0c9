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

use tessera_core::{LocalFileId, ObjectHandle};
use tessera_data::builtin::BuiltinSet;

use super::{ImportContext, ImportStrategy, ImportedAsset};
use crate::ImportError;

/// Serves a fixed set of pre-built objects. There is no main asset.
#[derive(Debug)]
pub struct Resources {
    objects: Vec<(LocalFileId, ObjectHandle)>,
}

impl Resources {
    /// Serves `objects` at their file ids.
    pub fn new(objects: Vec<(LocalFileId, ObjectHandle)>) -> Self {
        Self { objects }
    }
}

impl From<BuiltinSet> for Resources {
    fn from(set: BuiltinSet) -> Self {
        Self::new(set.objects)
    }
}

impl ImportStrategy for Resources {
    fn name(&self) -> &'static str {
        "BuiltinResources"
    }

    fn reads_file(&self) -> bool {
        false
    }

    fn import(&self, _cx: &ImportContext<'_>) -> Result<ImportedAsset, ImportError> {
        Ok(ImportedAsset {
            main_asset: None,
            objects: self.objects.iter().cloned().collect(),
        })
    }
}
