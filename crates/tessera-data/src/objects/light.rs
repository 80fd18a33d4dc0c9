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
    Object, ObjectHeader, ObjectPtr, ObjectType, TypeTag,
};

use crate::math::Color;

/// Light shapes, stored as their integer value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightType {
    /// A cone.
    Spot = 0,
    /// Parallel rays.
    Directional = 1,
    /// Omnidirectional.
    Point = 2,
}

/// A light source component.
#[derive(Debug)]
pub struct Light {
    header: ObjectHeader,
    /// The owning game object.
    pub game_object: ObjectPtr,
    /// Whether the light contributes.
    pub enabled: bool,
    /// Raw [`LightType`] value.
    pub light_type: u32,
    /// Emitted color.
    pub color: Color,
    /// Brightness multiplier.
    pub intensity: f32,
    /// Reach of spot and point lights.
    pub range: f32,
    /// Cone angle of spot lights, in degrees.
    pub spot_angle: f32,
}

impl Light {
    /// The light shape, `None` for values written by a newer format.
    pub fn kind(&self) -> Option<LightType> {
        match self.light_type {
            0 => Some(LightType::Spot),
            1 => Some(LightType::Directional),
            2 => Some(LightType::Point),
            _ => None,
        }
    }
}

impl Default for Light {
    fn default() -> Self {
        Self {
            header: ObjectHeader::new(),
            game_object: ObjectPtr::null(),
            enabled: true,
            light_type: LightType::Directional as u32,
            color: Color::WHITE,
            intensity: 1.0,
            range: 10.0,
            spot_angle: 30.0,
        }
    }
}

impl ObjectType for Light {
    const TYPE_TAG: TypeTag = TypeTag(108);
    const TYPE_NAME: &'static str = "Light";
}

impl Object for Light {
    object_identity!();

    fn serialize(&self, out: &mut MapWriter<'_>) {
        out.write("m_GameObject", &self.game_object)
            .write("m_Enabled", &self.enabled)
            .write("m_Type", &self.light_type)
            .write("m_Color", &self.color)
            .write("m_Intensity", &self.intensity)
            .write("m_Range", &self.range)
            .write("m_SpotAngle", &self.spot_angle);
    }

    fn deserialize(&mut self, input: &mut MapReader<'_, '_>) -> Result<(), ParseError> {
        input.read("m_GameObject", &mut self.game_object)?;
        input.read("m_Enabled", &mut self.enabled)?;
        input.read("m_Type", &mut self.light_type)?;
        input.read("m_Color", &mut self.color)?;
        input.read("m_Intensity", &mut self.intensity)?;
        input.read("m_Range", &mut self.range)?;
        input.read("m_SpotAngle", &mut self.spot_angle)?;
        Ok(())
    }
}
