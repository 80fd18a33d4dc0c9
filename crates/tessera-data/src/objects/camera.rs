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

/// A viewpoint component.
#[derive(Debug)]
pub struct Camera {
    header: ObjectHeader,
    /// The owning game object.
    pub game_object: ObjectPtr,
    /// Whether the camera renders.
    pub enabled: bool,
    /// How the background is cleared (1 skybox, 2 solid color, 3 depth, 4 nothing).
    pub clear_flags: u32,
    /// Solid background color.
    pub background_color: Color,
    /// Near clipping distance.
    pub near_clip_plane: f32,
    /// Far clipping distance.
    pub far_clip_plane: f32,
    /// Vertical field of view in degrees.
    pub field_of_view: f32,
    /// Orthographic instead of perspective projection.
    pub orthographic: bool,
    /// Half height of the orthographic view volume.
    pub orthographic_size: f32,
    /// Rendering order among cameras.
    pub depth: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            header: ObjectHeader::new(),
            game_object: ObjectPtr::null(),
            enabled: true,
            clear_flags: 1,
            background_color: Color::new(0.192, 0.302, 0.475, 0.0),
            near_clip_plane: 0.3,
            far_clip_plane: 1000.0,
            field_of_view: 60.0,
            orthographic: false,
            orthographic_size: 5.0,
            depth: 0.0,
        }
    }
}

impl ObjectType for Camera {
    const TYPE_TAG: TypeTag = TypeTag(20);
    const TYPE_NAME: &'static str = "Camera";
}

impl Object for Camera {
    object_identity!();

    fn serialize(&self, out: &mut MapWriter<'_>) {
        out.write("m_GameObject", &self.game_object)
            .write("m_Enabled", &self.enabled)
            .write("m_ClearFlags", &self.clear_flags)
            .write("m_BackGroundColor", &self.background_color)
            .write("near clip plane", &self.near_clip_plane)
            .write("far clip plane", &self.far_clip_plane)
            .write("field of view", &self.field_of_view)
            .write("orthographic", &self.orthographic)
            .write("orthographic size", &self.orthographic_size)
            .write("m_Depth", &self.depth);
    }

    fn deserialize(&mut self, input: &mut MapReader<'_, '_>) -> Result<(), ParseError> {
        input.read("m_GameObject", &mut self.game_object)?;
        input.read("m_Enabled", &mut self.enabled)?;
        input.read("m_ClearFlags", &mut self.clear_flags)?;
        input.read("m_BackGroundColor", &mut self.background_color)?;
        input.read("near clip plane", &mut self.near_clip_plane)?;
        input.read("far clip plane", &mut self.far_clip_plane)?;
        input.read("field of view", &mut self.field_of_view)?;
        input.read("orthographic", &mut self.orthographic)?;
        input.read("orthographic size", &mut self.orthographic_size)?;
        input.read("m_Depth", &mut self.depth)?;
        Ok(())
    }
}
