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

use crate::math::{Quaternion, Vector3};

/// Position, rotation and scale of a game object, plus its place in the
/// hierarchy.
///
/// Both directions of the hierarchy (`father` and `children`) are
/// non-owning pointers.
#[derive(Debug)]
pub struct Transform {
    header: ObjectHeader,
    /// The owning game object.
    pub game_object: ObjectPtr,
    /// Rotation relative to the parent.
    pub local_rotation: Quaternion,
    /// Position relative to the parent.
    pub local_position: Vector3,
    /// Scale relative to the parent.
    pub local_scale: Vector3,
    /// Child transforms in order.
    pub children: Vec<ObjectPtr>,
    /// Parent transform, null for roots.
    pub father: ObjectPtr,
    /// Index among the parent's children.
    pub root_order: i32,
}

impl Transform {
    /// Creates an identity transform owned by `game_object`.
    pub fn new(game_object: &ObjectHandle) -> Self {
        Self {
            game_object: game_object.downgrade(),
            ..Self::default()
        }
    }

    /// Makes `child` the last child of `parent`.
    ///
    /// Both handles must hold transforms; other objects are left untouched.
    pub fn attach(parent: &ObjectHandle, child: &ObjectHandle) {
        let order = match parent.downcast_mut::<Transform>() {
            Some(mut transform) => {
                transform.children.push(child.downgrade());
                transform.children.len() as i32 - 1
            }
            None => return,
        };
        if let Some(mut transform) = child.downcast_mut::<Transform>() {
            transform.father = parent.downgrade();
            transform.root_order = order;
        }
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            header: ObjectHeader::new(),
            game_object: ObjectPtr::null(),
            local_rotation: Quaternion::IDENTITY,
            local_position: Vector3::ZERO,
            local_scale: Vector3::ONE,
            children: Vec::new(),
            father: ObjectPtr::null(),
            root_order: 0,
        }
    }
}

impl ObjectType for Transform {
    const TYPE_TAG: TypeTag = TypeTag(4);
    const TYPE_NAME: &'static str = "Transform";
}

impl Object for Transform {
    object_identity!();

    fn serialize(&self, out: &mut MapWriter<'_>) {
        out.write("m_GameObject", &self.game_object)
            .write("m_LocalRotation", &self.local_rotation)
            .write("m_LocalPosition", &self.local_position)
            .write("m_LocalScale", &self.local_scale)
            .write("m_Children", &self.children)
            .write("m_Father", &self.father)
            .write("m_RootOrder", &self.root_order);
    }

    fn deserialize(&mut self, input: &mut MapReader<'_, '_>) -> Result<(), ParseError> {
        input.read("m_GameObject", &mut self.game_object)?;
        input.read("m_LocalRotation", &mut self.local_rotation)?;
        input.read("m_LocalPosition", &mut self.local_position)?;
        input.read("m_LocalScale", &mut self.local_scale)?;
        input.read("m_Children", &mut self.children)?;
        input.read("m_Father", &mut self.father)?;
        input.read("m_RootOrder", &mut self.root_order)?;
        Ok(())
    }
}
