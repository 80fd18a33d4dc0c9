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

//! # Tessera Core
//!
//! Foundational crate containing the object identity model, the type registry
//! that reconstructs polymorphic objects from their type tags, and the text
//! document codec used to persist object graphs.
//!
//! This crate knows nothing about files on disk or about asset databases. It
//! only defines how objects are identified, created, and converted to and from
//! documents. Higher-level crates build importers and registries on top of it.

#![warn(missing_docs)]

pub mod object;
pub mod serialization;

pub use object::{
    AssetPath, Guid, InstanceId, InvalidGuid, LocalFileId, Object, ObjectHandle, ObjectHeader,
    ObjectPtr, ObjectRef, ObjectType, TypeRegistry, TypeTag, UnknownTypeTag,
};
