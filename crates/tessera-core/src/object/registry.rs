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

use std::collections::HashMap;
use thiserror::Error;

use super::{Object, ObjectHandle, TypeTag};

/// A concrete object variant that can be constructed empty by the factory.
pub trait ObjectType: Object + Default {
    /// The discriminator written in document block headers.
    const TYPE_TAG: TypeTag;
    /// The root key under which the variant's fields are written.
    const TYPE_NAME: &'static str;
}

/// Returned when no factory is registered for a type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("no object type is registered for type tag {0}")]
pub struct UnknownTypeTag(pub TypeTag);

#[derive(Clone, Copy)]
struct TypeInfo {
    name: &'static str,
    create: fn() -> ObjectHandle,
}

fn create_empty<T: ObjectType>() -> ObjectHandle {
    ObjectHandle::new(T::default())
}

/// The object factory: a table from type tag to constructor and type name.
///
/// The table is filled once at startup by calling [`TypeRegistry::register`]
/// for each variant, then shared read-only (typically behind an `Arc`).
#[derive(Default, Clone)]
pub struct TypeRegistry {
    by_tag: HashMap<TypeTag, TypeInfo>,
    by_name: HashMap<&'static str, TypeTag>,
}

impl TypeRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a variant under its tag and name.
    ///
    /// Registering a tag twice replaces the previous entry.
    pub fn register<T: ObjectType>(&mut self) -> &mut Self {
        let info = TypeInfo {
            name: T::TYPE_NAME,
            create: create_empty::<T>,
        };
        if let Some(previous) = self.by_tag.insert(T::TYPE_TAG, info) {
            log::warn!(
                "Type tag {} was registered as '{}', now replaced by '{}'",
                T::TYPE_TAG,
                previous.name,
                T::TYPE_NAME
            );
            self.by_name.remove(previous.name);
        }
        self.by_name.insert(T::TYPE_NAME, T::TYPE_TAG);
        log::debug!("Registered object type '{}' ({})", T::TYPE_NAME, T::TYPE_TAG);
        self
    }

    /// Constructs an empty instance of the variant registered for `tag`.
    pub fn create(&self, tag: TypeTag) -> Result<ObjectHandle, UnknownTypeTag> {
        self.by_tag
            .get(&tag)
            .map(|info| (info.create)())
            .ok_or(UnknownTypeTag(tag))
    }

    /// The name registered for `tag`.
    pub fn name_of(&self, tag: TypeTag) -> Option<&'static str> {
        self.by_tag.get(&tag).map(|info| info.name)
    }

    /// The tag registered under `name`.
    pub fn tag_of(&self, name: &str) -> Option<TypeTag> {
        self.by_name.get(name).copied()
    }

    /// Returns `true` if a variant is registered for `tag`.
    pub fn contains(&self, tag: TypeTag) -> bool {
        self.by_tag.contains_key(&tag)
    }

    /// Number of registered variants.
    pub fn len(&self) -> usize {
        self.by_tag.len()
    }

    /// Returns `true` if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.by_tag.is_empty()
    }
}
