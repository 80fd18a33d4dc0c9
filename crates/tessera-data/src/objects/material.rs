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
    Object, ObjectHeader, ObjectType, TypeTag,
};

use crate::math::Color;

/// Surface description: a shader name plus its property values.
#[derive(Debug, Default)]
pub struct Material {
    header: ObjectHeader,
    /// Display name.
    pub name: String,
    /// Name of the shader the properties are meant for.
    pub shader: String,
    /// Space separated shader keywords.
    pub shader_keywords: String,
    /// Scalar shader properties.
    pub floats: BTreeMap<String, f32>,
    /// Color shader properties.
    pub colors: BTreeMap<String, Color>,
}

impl Material {
    /// Creates an empty material for `shader`.
    pub fn new(name: impl Into<String>, shader: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            shader: shader.into(),
            ..Self::default()
        }
    }

    /// The canonical default material: a white standard surface.
    pub fn default_material() -> Self {
        let mut material = Self::new("Default-Material", "Standard");
        material.colors.insert("_Color".to_string(), Color::WHITE);
        material.floats.insert("_Glossiness".to_string(), 0.5);
        material.floats.insert("_Metallic".to_string(), 0.0);
        material
    }
}

impl ObjectType for Material {
    const TYPE_TAG: TypeTag = TypeTag(21);
    const TYPE_NAME: &'static str = "Material";
}

impl Object for Material {
    object_identity!();

    fn name(&self) -> &str {
        &self.name
    }

    fn set_name(&mut self, name: &str) {
        self.name = name.to_string();
    }

    fn serialize(&self, out: &mut MapWriter<'_>) {
        out.write("m_Name", &self.name)
            .write("m_Shader", &self.shader)
            .write("m_ShaderKeywords", &self.shader_keywords)
            .write("m_Floats", &self.floats)
            .write("m_Colors", &self.colors);
    }

    fn deserialize(&mut self, input: &mut MapReader<'_, '_>) -> Result<(), ParseError> {
        input.read("m_Name", &mut self.name)?;
        input.read("m_Shader", &mut self.shader)?;
        input.read("m_ShaderKeywords", &mut self.shader_keywords)?;
        input.read("m_Floats", &mut self.floats)?;
        input.read("m_Colors", &mut self.colors)?;
        Ok(())
    }
}
