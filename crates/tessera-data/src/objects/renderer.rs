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

use tessera_core::{
    serialization::{MapReader, MapWriter, ParseError},
    Object, ObjectHandle, ObjectHeader, ObjectPtr, ObjectType, TypeTag,
};

/// Selects the mesh a game object draws.
#[derive(Debug, Default)]
pub struct MeshFilter {
    header: ObjectHeader,
    /// The owning game object.
    pub game_object: ObjectPtr,
    /// The shared mesh, usually in another document.
    pub mesh: ObjectPtr,
}

impl MeshFilter {
    /// Creates a filter owned by `game_object` drawing `mesh`.
    pub fn new(game_object: &ObjectHandle, mesh: Option<&ObjectHandle>) -> Self {
        Self {
            header: ObjectHeader::new(),
            game_object: game_object.downgrade(),
            mesh: ObjectPtr::from(mesh),
        }
    }
}

impl ObjectType for MeshFilter {
    const TYPE_TAG: TypeTag = TypeTag(33);
    const TYPE_NAME: &'static str = "MeshFilter";
}

impl Object for MeshFilter {
    object_identity!();

    fn serialize(&self, out: &mut MapWriter<'_>) {
        out.write("m_GameObject", &self.game_object)
            .write("m_Mesh", &self.mesh);
    }

    fn deserialize(&mut self, input: &mut MapReader<'_, '_>) -> Result<(), ParseError> {
        input.read("m_GameObject", &mut self.game_object)?;
        input.read("m_Mesh", &mut self.mesh)?;
        Ok(())
    }
}

/// Draws the filter's mesh with a list of materials.
#[derive(Debug)]
pub struct MeshRenderer {
    header: ObjectHeader,
    /// The owning game object.
    pub game_object: ObjectPtr,
    /// Whether the renderer draws.
    pub enabled: bool,
    /// Shadow casting mode (0 off, 1 on).
    pub cast_shadows: u32,
    /// Whether the surface receives shadows.
    pub receive_shadows: bool,
    /// One material per submesh.
    pub materials: Vec<ObjectPtr>,
}

impl MeshRenderer {
    /// Creates an enabled renderer owned by `game_object`.
    pub fn new(game_object: &ObjectHandle) -> Self {
        Self {
            game_object: game_object.downgrade(),
            ..Self::default()
        }
    }
}

impl Default for MeshRenderer {
    fn default() -> Self {
        Self {
            header: ObjectHeader::new(),
            game_object: ObjectPtr::null(),
            enabled: true,
            cast_shadows: 1,
            receive_shadows: true,
            materials: Vec::new(),
        }
    }
}

impl ObjectType for MeshRenderer {
    const TYPE_TAG: TypeTag = TypeTag(23);
    const TYPE_NAME: &'static str = "MeshRenderer";
}

impl Object for MeshRenderer {
    object_identity!();

    fn serialize(&self, out: &mut MapWriter<'_>) {
        out.write("m_GameObject", &self.game_object)
            .write("m_Enabled", &self.enabled)
            .write("m_CastShadows", &self.cast_shadows)
            .write("m_ReceiveShadows", &self.receive_shadows)
            .write("m_Materials", &self.materials);
    }

    fn deserialize(&mut self, input: &mut MapReader<'_, '_>) -> Result<(), ParseError> {
        input.read("m_GameObject", &mut self.game_object)?;
        input.read("m_Enabled", &mut self.enabled)?;
        input.read("m_CastShadows", &mut self.cast_shadows)?;
        input.read("m_ReceiveShadows", &mut self.receive_shadows)?;
        input.read("m_Materials", &mut self.materials)?;
        Ok(())
    }
}
