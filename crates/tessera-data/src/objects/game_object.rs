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
    impl_field_struct,
    serialization::{MapReader, MapWriter, ParseError},
    Object, ObjectHandle, ObjectHeader, ObjectPtr, ObjectType, TypeTag,
};

/// One entry of a game object's component list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComponentRef {
    /// The attached component.
    pub component: ObjectPtr,
}

impl_field_struct!(ComponentRef {
    component => "component",
});

/// A named container of components.
#[derive(Debug)]
pub struct GameObject {
    header: ObjectHeader,
    /// Display name.
    pub name: String,
    /// Whether the object takes part in the scene.
    pub is_active: bool,
    /// Layer index.
    pub layer: i32,
    /// Attached components in order.
    pub components: Vec<ComponentRef>,
}

impl GameObject {
    /// Creates an active game object without components.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Appends a component to the component list.
    pub fn add_component(&mut self, component: &ObjectHandle) {
        self.components.push(ComponentRef {
            component: component.downgrade(),
        });
    }

    /// The components that are still alive.
    pub fn components(&self) -> impl Iterator<Item = ObjectHandle> + '_ {
        self.components.iter().filter_map(|entry| entry.component.get())
    }

    /// The first component of type `T`.
    pub fn component<T: Object>(&self) -> Option<ObjectHandle> {
        self.components()
            .find(|component| component.downcast_ref::<T>().is_some())
    }
}

impl Default for GameObject {
    fn default() -> Self {
        Self {
            header: ObjectHeader::new(),
            name: String::new(),
            is_active: true,
            layer: 0,
            components: Vec::new(),
        }
    }
}

impl ObjectType for GameObject {
    const TYPE_TAG: TypeTag = TypeTag(1);
    const TYPE_NAME: &'static str = "GameObject";
}

impl Object for GameObject {
    object_identity!();

    fn name(&self) -> &str {
        &self.name
    }

    fn set_name(&mut self, name: &str) {
        self.name = name.to_string();
    }

    fn serialize(&self, out: &mut MapWriter<'_>) {
        out.write("m_Component", &self.components)
            .write("m_Layer", &self.layer)
            .write("m_Name", &self.name)
            .write("m_IsActive", &self.is_active);
    }

    fn deserialize(&mut self, input: &mut MapReader<'_, '_>) -> Result<(), ParseError> {
        input.read("m_Component", &mut self.components)?;
        input.read("m_Layer", &mut self.layer)?;
        input.read("m_Name", &mut self.name)?;
        input.read("m_IsActive", &mut self.is_active)?;
        Ok(())
    }
}
