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

use tessera_core::{
    serialization::{MapReader, MapWriter, ParseError},
    LocalFileId, Object, ObjectHandle, ObjectHeader, ObjectPtr, ObjectType, TypeTag,
};

/// Marks the root of a reusable game object hierarchy.
#[derive(Debug, Default)]
pub struct Prefab {
    header: ObjectHeader,
    /// The prefab this one was instantiated from, if any.
    pub parent_prefab: ObjectPtr,
    /// The top game object of the hierarchy.
    pub root_game_object: ObjectPtr,
    /// `true` for the asset itself, `false` for scene instances.
    pub is_prefab_parent: bool,
    /// Every object of the prefab's document by file id. Filled by the
    /// importer, never written.
    pub objects: BTreeMap<LocalFileId, ObjectPtr>,
}

impl Prefab {
    /// The object of this prefab's document at `file_id`, if still alive.
    pub fn object(&self, file_id: LocalFileId) -> Option<ObjectHandle> {
        self.objects.get(&file_id).and_then(ObjectPtr::get)
    }
}

impl ObjectType for Prefab {
    const TYPE_TAG: TypeTag = TypeTag(1001);
    const TYPE_NAME: &'static str = "Prefab";
}

impl Object for Prefab {
    object_identity!();

    fn serialize(&self, out: &mut MapWriter<'_>) {
        out.write("m_ParentPrefab", &self.parent_prefab)
            .write("m_RootGameObject", &self.root_game_object)
            .write("m_IsPrefabParent", &self.is_prefab_parent);
    }

    fn deserialize(&mut self, input: &mut MapReader<'_, '_>) -> Result<(), ParseError> {
        input.read("m_ParentPrefab", &mut self.parent_prefab)?;
        input.read("m_RootGameObject", &mut self.root_game_object)?;
        input.read("m_IsPrefabParent", &mut self.is_prefab_parent)?;
        Ok(())
    }
}
