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
    Object, ObjectHeader, ObjectType, TypeTag,
};

use crate::math::Vector3;

/// Triangle geometry.
#[derive(Debug, Default)]
pub struct Mesh {
    header: ObjectHeader,
    /// Display name.
    pub name: String,
    /// Vertex positions.
    pub vertices: Vec<Vector3>,
    /// Triangle list indices into `vertices`.
    pub indices: Vec<u32>,
}

impl Mesh {
    /// Creates an empty, named mesh.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

impl ObjectType for Mesh {
    const TYPE_TAG: TypeTag = TypeTag(43);
    const TYPE_NAME: &'static str = "Mesh";
}

impl Object for Mesh {
    object_identity!();

    fn name(&self) -> &str {
        &self.name
    }

    fn set_name(&mut self, name: &str) {
        self.name = name.to_string();
    }

    fn serialize(&self, out: &mut MapWriter<'_>) {
        out.write("m_Name", &self.name)
            .write("m_Vertices", &self.vertices)
            .write("m_Indices", &self.indices);
    }

    fn deserialize(&mut self, input: &mut MapReader<'_, '_>) -> Result<(), ParseError> {
        input.read("m_Name", &mut self.name)?;
        input.read("m_Vertices", &mut self.vertices)?;
        input.read("m_Indices", &mut self.indices)?;
        Ok(())
    }
}
