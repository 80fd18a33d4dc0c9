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

//! The object identity model.
//!
//! Every serializable entity implements [`Object`]: it carries a [`TypeTag`], a
//! process-local [`InstanceId`], and an optional persistent address made of a
//! [`Guid`] and a [`LocalFileId`].
//!
//! Live objects are shared through [`ObjectHandle`], a reference-counted,
//! lockable cell. Fields that point at other objects store an [`ObjectPtr`],
//! which never keeps its target alive. Strong ownership therefore flows in one
//! direction only (from whoever holds the handles, usually an importer) and
//! object graphs with cycles or back links cannot leak.

mod id;
mod registry;

pub use id::*;
pub use registry::*;

use parking_lot::{
    MappedRwLockReadGuard, MappedRwLockWriteGuard, RwLock, RwLockReadGuard, RwLockWriteGuard,
};
use std::{
    any::Any,
    fmt,
    sync::{Arc, Weak},
};

use crate::serialization::{MapReader, MapWriter, ParseError};

/// Helper trait to allow downcasting `dyn Object` trait objects to their concrete types.
pub trait AsAny {
    /// Returns a reference to the inner value as `&dyn Any`.
    fn as_any(&self) -> &dyn Any;
    /// Returns a mutable reference to the inner value as `&mut dyn Any`.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Identity data embedded in every object.
///
/// Not `Clone`: a copy would duplicate the instance id.
#[derive(Debug)]
pub struct ObjectHeader {
    instance_id: InstanceId,
    /// The document this object was read from or written to, if any.
    pub guid: Option<Guid>,
    /// The object's id inside that document. Null until the object is
    /// persisted or decoded.
    pub file_id: LocalFileId,
}

impl ObjectHeader {
    /// Creates a header with a fresh instance id and no persistent address.
    pub fn new() -> Self {
        Self {
            instance_id: InstanceId::next(),
            guid: None,
            file_id: LocalFileId::NULL,
        }
    }

    /// The process-local id drawn when the object was constructed.
    pub fn instance_id(&self) -> InstanceId {
        self.instance_id
    }

    /// The persistent address of the object, if it has one.
    pub fn object_ref(&self) -> Option<ObjectRef> {
        match self.guid {
            Some(guid) if !self.file_id.is_null() => Some(ObjectRef::external(guid, self.file_id)),
            _ => None,
        }
    }
}

impl Default for ObjectHeader {
    fn default() -> Self {
        Self::new()
    }
}

/// The contract every serializable entity satisfies.
///
/// Implementors describe their fields through [`Object::serialize`] and
/// [`Object::deserialize`]; the document codec drives both through this
/// trait's vtable, so no central dispatch on the type tag is needed.
pub trait Object: AsAny + Send + Sync + 'static {
    /// The discriminator registered for this variant.
    fn type_tag(&self) -> TypeTag;

    /// Identity data of this object.
    fn header(&self) -> &ObjectHeader;

    /// Mutable identity data of this object.
    fn header_mut(&mut self) -> &mut ObjectHeader;

    /// The display name, for variants that have one.
    fn name(&self) -> &str {
        ""
    }

    /// Renames the object. Variants without a name ignore this.
    fn set_name(&mut self, _name: &str) {}

    /// Writes every field of the object.
    fn serialize(&self, out: &mut MapWriter<'_>);

    /// Populates the object's fields from a decoded field map.
    ///
    /// Missing keys leave the current value in place. A structural mismatch
    /// returns a [`ParseError`]; the object may then be partially populated.
    fn deserialize(&mut self, input: &mut MapReader<'_, '_>) -> Result<(), ParseError>;
}

struct ObjectCell<T: ?Sized> {
    instance_id: InstanceId,
    type_tag: TypeTag,
    object: RwLock<T>,
}

/// A shared read guard over a live object.
pub type ObjectReadGuard<'a> = RwLockReadGuard<'a, dyn Object>;

/// An exclusive write guard over a live object.
pub type ObjectWriteGuard<'a> = RwLockWriteGuard<'a, dyn Object>;

/// A strong, shared handle to a live object.
///
/// Cloning the handle is cheap and yields another handle to the same
/// instance. The object is dropped when the last handle goes away.
#[derive(Clone)]
pub struct ObjectHandle(Arc<ObjectCell<dyn Object>>);

impl ObjectHandle {
    /// Moves an object into a new shared cell.
    pub fn new<T: Object>(object: T) -> Self {
        let cell: Arc<ObjectCell<dyn Object>> = Arc::new(ObjectCell {
            instance_id: object.header().instance_id(),
            type_tag: object.type_tag(),
            object: RwLock::new(object),
        });
        Self(cell)
    }

    /// The object's instance id. Does not lock.
    pub fn instance_id(&self) -> InstanceId {
        self.0.instance_id
    }

    /// The object's type tag. Does not lock.
    pub fn type_tag(&self) -> TypeTag {
        self.0.type_tag
    }

    /// Locks the object for reading.
    pub fn read(&self) -> ObjectReadGuard<'_> {
        self.0.object.read()
    }

    /// Locks the object for writing.
    pub fn write(&self) -> ObjectWriteGuard<'_> {
        self.0.object.write()
    }

    /// Read lock that does not queue behind waiting writers, so a thread that
    /// already holds a read guard on this object can take it again.
    pub(crate) fn read_recursive(&self) -> ObjectReadGuard<'_> {
        self.0.object.read_recursive()
    }

    /// Locks the object for reading as its concrete type.
    ///
    /// Returns `None` when the object is not a `T`.
    pub fn downcast_ref<T: Object>(&self) -> Option<MappedRwLockReadGuard<'_, T>> {
        RwLockReadGuard::try_map(self.read(), |object| object.as_any().downcast_ref::<T>()).ok()
    }

    /// Locks the object for writing as its concrete type.
    ///
    /// Returns `None` when the object is not a `T`.
    pub fn downcast_mut<T: Object>(&self) -> Option<MappedRwLockWriteGuard<'_, T>> {
        RwLockWriteGuard::try_map(self.write(), |object| {
            object.as_any_mut().downcast_mut::<T>()
        })
        .ok()
    }

    /// Returns `true` if both handles designate the same instance.
    pub fn ptr_eq(&self, other: &ObjectHandle) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Creates a non-owning pointer to this object.
    pub fn downgrade(&self) -> ObjectPtr {
        ObjectPtr(Some(Arc::downgrade(&self.0)))
    }

    /// Number of strong handles currently alive.
    pub fn strong_count(&self) -> usize {
        Arc::strong_count(&self.0)
    }
}

impl PartialEq for ObjectHandle {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for ObjectHandle {}

impl fmt::Debug for ObjectHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectHandle")
            .field("instance_id", &self.instance_id())
            .field("type_tag", &self.type_tag())
            .finish()
    }
}

/// A non-owning reference to an object, as stored in object fields.
///
/// A pointer never keeps its target alive. Once every [`ObjectHandle`] to the
/// target is gone (for example after the asset database is torn down) the
/// pointer resolves to `None`.
#[derive(Clone, Default)]
pub struct ObjectPtr(Option<Weak<ObjectCell<dyn Object>>>);

impl ObjectPtr {
    /// The null pointer.
    pub fn null() -> Self {
        Self(None)
    }

    /// Upgrades to a strong handle if the target is still alive.
    pub fn get(&self) -> Option<ObjectHandle> {
        self.0.as_ref().and_then(Weak::upgrade).map(ObjectHandle)
    }

    /// Returns `true` if the pointer is null or its target has been released.
    pub fn is_null(&self) -> bool {
        self.get().is_none()
    }

    /// Returns `true` if the pointer designates `handle`.
    pub fn points_to(&self, handle: &ObjectHandle) -> bool {
        self.get().is_some_and(|target| target.ptr_eq(handle))
    }
}

impl From<&ObjectHandle> for ObjectPtr {
    fn from(handle: &ObjectHandle) -> Self {
        handle.downgrade()
    }
}

impl From<Option<&ObjectHandle>> for ObjectPtr {
    fn from(handle: Option<&ObjectHandle>) -> Self {
        handle.map(ObjectHandle::downgrade).unwrap_or_default()
    }
}

impl PartialEq for ObjectPtr {
    fn eq(&self, other: &Self) -> bool {
        match (self.get(), other.get()) {
            (Some(a), Some(b)) => a.ptr_eq(&b),
            (None, None) => true,
            _ => false,
        }
    }
}

impl fmt::Debug for ObjectPtr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.get() {
            Some(target) => write!(f, "ObjectPtr({})", target.instance_id()),
            None => f.write_str("ObjectPtr(null)"),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::serialization::{MapReader, MapWriter, ParseError};

    /// Minimal object used across the crate's unit tests.
    #[derive(Debug, Default)]
    pub(crate) struct Probe {
        pub header: ObjectHeader,
        pub name: String,
        pub value: i32,
        pub enabled: bool,
        pub next: ObjectPtr,
        pub items: Vec<ObjectPtr>,
    }

    impl Object for Probe {
        fn type_tag(&self) -> TypeTag {
            Self::TYPE_TAG
        }
        fn header(&self) -> &ObjectHeader {
            &self.header
        }
        fn header_mut(&mut self) -> &mut ObjectHeader {
            &mut self.header
        }
        fn name(&self) -> &str {
            &self.name
        }
        fn set_name(&mut self, name: &str) {
            self.name = name.to_string();
        }
        fn serialize(&self, out: &mut MapWriter<'_>) {
            out.write("m_Name", &self.name);
            out.write("m_Value", &self.value);
            out.write("m_Enabled", &self.enabled);
            out.write("m_Next", &self.next);
            out.write("m_Items", &self.items);
        }
        fn deserialize(&mut self, input: &mut MapReader<'_, '_>) -> Result<(), ParseError> {
            input.read("m_Name", &mut self.name)?;
            input.read("m_Value", &mut self.value)?;
            input.read("m_Enabled", &mut self.enabled)?;
            input.read("m_Next", &mut self.next)?;
            input.read("m_Items", &mut self.items)?;
            Ok(())
        }
    }

    impl ObjectType for Probe {
        const TYPE_TAG: TypeTag = TypeTag(7);
        const TYPE_NAME: &'static str = "Probe";
    }

    #[test]
    fn test_handle_exposes_identity_without_locking() {
        let handle = ObjectHandle::new(Probe::default());
        let _guard = handle.write();
        assert_eq!(handle.type_tag(), TypeTag(7));
        assert!(handle.instance_id().get() > 0);
    }

    #[test]
    fn test_downcast_to_concrete_type() {
        let handle = ObjectHandle::new(Probe::default());
        handle.downcast_mut::<Probe>().unwrap().value = 42;
        assert_eq!(handle.downcast_ref::<Probe>().unwrap().value, 42);
    }

    #[test]
    fn test_pointer_does_not_keep_target_alive() {
        let handle = ObjectHandle::new(Probe::default());
        let ptr = handle.downgrade();
        assert!(ptr.points_to(&handle));

        drop(handle);
        assert!(ptr.is_null());
        assert_eq!(ptr, ObjectPtr::null());
    }

    #[test]
    fn test_object_ref_requires_both_parts() {
        let mut header = ObjectHeader::new();
        assert_eq!(header.object_ref(), None);

        let guid = Guid::from_path_v5("Assets/a.asset");
        header.guid = Some(guid);
        header.file_id = LocalFileId(5);
        assert_eq!(
            header.object_ref(),
            Some(ObjectRef::external(guid, LocalFileId(5)))
        );
    }
}
