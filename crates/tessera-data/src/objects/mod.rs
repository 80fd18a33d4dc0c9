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

//! The concrete object variants.
//!
//! Type tags and field keys follow the editor's class ids and serialized
//! property names so that documents written by it can be read directly.

/// Implements the identity accessors of [`tessera_core::Object`] for a
/// struct holding its header in a `header` field.
macro_rules! object_identity {
    () => {
        fn type_tag(&self) -> tessera_core::TypeTag {
            <Self as tessera_core::ObjectType>::TYPE_TAG
        }

        fn header(&self) -> &tessera_core::ObjectHeader {
            &self.header
        }

        fn header_mut(&mut self) -> &mut tessera_core::ObjectHeader {
            &mut self.header
        }
    };
}

mod camera;
mod game_object;
mod light;
mod material;
mod mesh;
mod prefab;
mod renderer;
mod transform;

pub use camera::*;
pub use game_object::*;
pub use light::*;
pub use material::*;
pub use mesh::*;
pub use prefab::*;
pub use renderer::*;
pub use transform::*;
