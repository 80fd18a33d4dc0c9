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

//! Built-in resources that documents reference without a file on disk.
//!
//! Two well-known GUIDs name the built-in resource sets. Their objects live at
//! fixed local file ids, so a document can point at, say, the built-in cube
//! with `{fileID: 10202, guid: 0000000000000000e000000000000000, type: 2}`.

use tessera_core::{Guid, LocalFileId, ObjectHandle};

use crate::objects::{Material, Mesh};

/// The built-in mesh set.
pub const DEFAULT_RESOURCES_GUID: Guid = Guid::from_u128(0x0000_0000_0000_0000_e000_0000_0000_0000);

/// The built-in material set.
pub const BUILTIN_EXTRA_GUID: Guid = Guid::from_u128(0x0000_0000_0000_0000_f000_0000_0000_0000);

/// Path under which [`DEFAULT_RESOURCES_GUID`] is registered.
pub const DEFAULT_RESOURCES_PATH: &str = "Library/unity default resources";

/// Path under which [`BUILTIN_EXTRA_GUID`] is registered.
pub const BUILTIN_EXTRA_PATH: &str = "Resources/unity_builtin_extra";

/// File ids of the built-in meshes.
pub const BUILTIN_MESHES: [(i64, &str); 7] = [
    (10202, "Cube"),
    (10206, "Cylinder"),
    (10207, "Sphere"),
    (10208, "Capsule"),
    (10209, "Plane"),
    (10210, "Quad"),
    (10250, "SkyboxSphere"),
];

/// File id of the default material.
pub const DEFAULT_MATERIAL_FILE_ID: LocalFileId = LocalFileId(10303);

/// File id of the default skybox material.
pub const DEFAULT_SKYBOX_FILE_ID: LocalFileId = LocalFileId(10304);

/// A built-in resource set: its GUID, registered path and objects.
pub struct BuiltinSet {
    /// GUID of the set.
    pub guid: Guid,
    /// Path under which the set is registered.
    pub path: &'static str,
    /// Objects by local file id, headers already stamped.
    pub objects: Vec<(LocalFileId, ObjectHandle)>,
}

fn stamp(guid: Guid, file_id: LocalFileId, handle: ObjectHandle) -> (LocalFileId, ObjectHandle) {
    {
        let mut object = handle.write();
        let header = object.header_mut();
        header.guid = Some(guid);
        header.file_id = file_id;
    }
    (file_id, handle)
}

/// Creates the built-in meshes.
pub fn default_resources() -> BuiltinSet {
    let objects = BUILTIN_MESHES
        .iter()
        .map(|&(file_id, name)| {
            stamp(
                DEFAULT_RESOURCES_GUID,
                LocalFileId(file_id),
                ObjectHandle::new(Mesh::new(name)),
            )
        })
        .collect();
    BuiltinSet {
        guid: DEFAULT_RESOURCES_GUID,
        path: DEFAULT_RESOURCES_PATH,
        objects,
    }
}

/// Creates the built-in materials.
pub fn builtin_extra() -> BuiltinSet {
    let skybox = Material::new("Default-Skybox", "Skybox/Procedural");
    let objects = vec![
        stamp(
            BUILTIN_EXTRA_GUID,
            DEFAULT_MATERIAL_FILE_ID,
            ObjectHandle::new(Material::default_material()),
        ),
        stamp(
            BUILTIN_EXTRA_GUID,
            DEFAULT_SKYBOX_FILE_ID,
            ObjectHandle::new(skybox),
        ),
    ];
    BuiltinSet {
        guid: BUILTIN_EXTRA_GUID,
        path: BUILTIN_EXTRA_PATH,
        objects,
    }
}

/// Every built-in resource set.
pub fn builtin_sets() -> Vec<BuiltinSet> {
    vec![default_resources(), builtin_extra()]
}
