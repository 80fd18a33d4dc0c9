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

//! # Tessera Data
//!
//! The concrete object variants (game objects, components, materials,
//! meshes, prefabs), the plain value types their fields use, and the
//! built-in resource sets.

#![warn(missing_docs)]

pub mod builtin;
pub mod math;
pub mod objects;

use tessera_core::TypeRegistry;

use objects::{
    Camera, GameObject, Light, Material, Mesh, MeshFilter, MeshRenderer, Prefab, Transform,
};

/// Registers every built-in object variant with the factory.
pub fn register_types(types: &mut TypeRegistry) {
    types
        .register::<GameObject>()
        .register::<Transform>()
        .register::<Camera>()
        .register::<Material>()
        .register::<MeshRenderer>()
        .register::<MeshFilter>()
        .register::<Mesh>()
        .register::<Light>()
        .register::<Prefab>();
    log::debug!("Registered {} built-in object types", types.len());
}

/// A factory with every built-in variant registered.
pub fn default_types() -> TypeRegistry {
    let mut types = TypeRegistry::new();
    register_types(&mut types);
    types
}
