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

//! Conversion between typed field values and [`Node`] trees.

use std::{
    collections::BTreeMap,
    ops::{Deref, DerefMut},
};

use super::{Node, ParseError};
use crate::object::{Guid, LocalFileId, ObjectHandle, ObjectPtr, ObjectRef};

/// Turns live object references into persistent ones while a document is
/// being written.
pub trait ReferenceEncoder {
    /// Returns the address under which `target` will be reachable from the
    /// document being written. `None` encodes as the null reference.
    fn encode(&mut self, target: Option<ObjectHandle>) -> ObjectRef;
}

/// Turns persistent references back into live objects while a document is
/// being read.
pub trait ReferenceResolver {
    /// Looks up the object at `reference`. Never called with a null reference.
    fn resolve(&self, reference: ObjectRef) -> Option<ObjectHandle>;
}

/// A value that can be stored in an object field.
pub trait Field: Sized {
    /// Encodes the value.
    fn to_node(&self, refs: &mut dyn ReferenceEncoder) -> Node;

    /// Decodes a value, reporting shape mismatches through `cx`.
    fn from_node(node: &Node, cx: &mut ReadContext<'_>) -> Result<Self, ParseError>;
}

/// Collects the fields of one map while writing.
pub struct MapWriter<'w> {
    entries: Vec<(String, Node)>,
    refs: &'w mut dyn ReferenceEncoder,
}

impl<'w> MapWriter<'w> {
    /// Creates an empty map writer.
    pub fn new(refs: &'w mut dyn ReferenceEncoder) -> Self {
        Self {
            entries: Vec::new(),
            refs,
        }
    }

    /// Encodes `value` under `key`.
    pub fn write<T: Field>(&mut self, key: &str, value: &T) -> &mut Self {
        let node = value.to_node(&mut *self.refs);
        self.entries.push((key.to_string(), node));
        self
    }

    /// Stores an already encoded node under `key`.
    pub fn write_node(&mut self, key: &str, node: Node) -> &mut Self {
        self.entries.push((key.to_string(), node));
        self
    }

    /// The encoder used for object references.
    pub fn refs(&mut self) -> &mut dyn ReferenceEncoder {
        &mut *self.refs
    }

    /// Returns the collected entries in insertion order.
    pub fn finish(self) -> Vec<(String, Node)> {
        self.entries
    }

    /// Returns the collected entries as a map node.
    pub fn into_node(self) -> Node {
        Node::Map(self.entries)
    }
}

/// State shared by every field decoded from one block.
pub struct ReadContext<'a> {
    document: &'a str,
    file_id: LocalFileId,
    path: Vec<String>,
    refs: &'a dyn ReferenceResolver,
}

impl<'a> ReadContext<'a> {
    /// Creates a context for the block `file_id` of `document`.
    pub fn new(document: &'a str, file_id: LocalFileId, refs: &'a dyn ReferenceResolver) -> Self {
        Self {
            document,
            file_id,
            path: Vec::new(),
            refs,
        }
    }

    /// Descends into a map key (`"m_Name"`) or sequence index (`"[2]"`).
    ///
    /// The returned scope restores the path when dropped, on success and
    /// error paths alike.
    pub fn enter(&mut self, segment: impl Into<String>) -> Scope<'_, 'a> {
        self.path.push(segment.into());
        Scope { cx: self }
    }

    /// The current field path, e.g. `m_Component[1].component`.
    pub fn path(&self) -> String {
        let mut out = String::new();
        for segment in &self.path {
            if !out.is_empty() && !segment.starts_with('[') {
                out.push('.');
            }
            out.push_str(segment);
        }
        out
    }

    /// The name of the document being read.
    pub fn document(&self) -> &str {
        self.document
    }

    /// The block whose fields are being read.
    pub fn file_id(&self) -> LocalFileId {
        self.file_id
    }

    /// Builds an error located at the current field.
    pub fn error(&self, message: impl Into<String>) -> ParseError {
        ParseError {
            document: self.document.to_string(),
            file_id: self.file_id,
            path: self.path(),
            message: message.into(),
        }
    }

    /// Builds a shape mismatch error located at the current field.
    pub fn mismatch(&self, expected: &str, found: &Node) -> ParseError {
        self.error(format!("expected a {expected}, found a {}", found.kind()))
    }

    /// Resolves a non-null reference.
    pub fn resolve(&self, reference: ObjectRef) -> Option<ObjectHandle> {
        self.refs.resolve(reference)
    }

    /// The text of a scalar node.
    pub fn expect_scalar<'n>(&self, node: &'n Node) -> Result<&'n str, ParseError> {
        node.as_scalar().ok_or_else(|| self.mismatch("scalar", node))
    }

    /// The entries of a map node. A key written without a value counts as
    /// an empty map.
    pub fn expect_map<'n>(&self, node: &'n Node) -> Result<&'n [(String, Node)], ParseError> {
        match node {
            Node::Map(entries) => Ok(entries),
            Node::Scalar(text) if text.is_empty() => Ok(&[]),
            other => Err(self.mismatch("map", other)),
        }
    }

    /// The items of a sequence node. A key written without a value counts
    /// as an empty sequence.
    pub fn expect_sequence<'n>(&self, node: &'n Node) -> Result<&'n [Node], ParseError> {
        match node {
            Node::Sequence(items) => Ok(items),
            Node::Scalar(text) if text.is_empty() => Ok(&[]),
            other => Err(self.mismatch("sequence", other)),
        }
    }
}

/// A nested position in the field tree; pops itself off the path on drop.
pub struct Scope<'s, 'a> {
    cx: &'s mut ReadContext<'a>,
}

impl<'a> Deref for Scope<'_, 'a> {
    type Target = ReadContext<'a>;

    fn deref(&self) -> &Self::Target {
        &*self.cx
    }
}

impl<'a> DerefMut for Scope<'_, 'a> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut *self.cx
    }
}

impl Drop for Scope<'_, '_> {
    fn drop(&mut self) {
        self.cx.path.pop();
    }
}

/// Reads the fields of one map.
pub struct MapReader<'r, 'a> {
    entries: &'r [(String, Node)],
    cx: &'r mut ReadContext<'a>,
}

impl<'r, 'a> MapReader<'r, 'a> {
    /// Creates a reader over decoded map entries.
    pub fn new(entries: &'r [(String, Node)], cx: &'r mut ReadContext<'a>) -> Self {
        Self { entries, cx }
    }

    /// The raw node stored under `key`.
    pub fn get(&self, key: &str) -> Option<&'r Node> {
        self.entries
            .iter()
            .find(|(candidate, _)| candidate == key)
            .map(|(_, node)| node)
    }

    /// Returns `true` if `key` is present.
    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Decodes `key` into `slot`.
    ///
    /// A missing key is logged and leaves `slot` untouched.
    pub fn read<T: Field>(&mut self, key: &str, slot: &mut T) -> Result<(), ParseError> {
        match self.get(key) {
            Some(node) => {
                let mut scope = self.cx.enter(key);
                *slot = T::from_node(node, &mut scope)?;
            }
            None => {
                let scope = self.cx.enter(key);
                log::warn!(
                    "{} (object {}): missing key '{}', keeping its default",
                    scope.document(),
                    scope.file_id(),
                    scope.path()
                );
            }
        }
        Ok(())
    }

    /// The context shared with nested readers.
    pub fn context(&mut self) -> &mut ReadContext<'a> {
        &mut *self.cx
    }
}

// --- Scalars ---

impl Field for bool {
    fn to_node(&self, _refs: &mut dyn ReferenceEncoder) -> Node {
        Node::scalar(u8::from(*self))
    }

    fn from_node(node: &Node, cx: &mut ReadContext<'_>) -> Result<Self, ParseError> {
        let text = cx.expect_scalar(node)?;
        text.trim()
            .parse::<i64>()
            .map(|value| value == 1)
            .map_err(|_| cx.error(format!("'{text}' is not a boolean (0 or 1)")))
    }
}

macro_rules! impl_integer_field {
    ($($ty:ty),*) => {
        $(
            impl Field for $ty {
                fn to_node(&self, _refs: &mut dyn ReferenceEncoder) -> Node {
                    Node::scalar(self)
                }

                fn from_node(node: &Node, cx: &mut ReadContext<'_>) -> Result<Self, ParseError> {
                    let text = cx.expect_scalar(node)?.trim();
                    if let Ok(value) = text.parse::<$ty>() {
                        return Ok(value);
                    }
                    text.parse::<f64>()
                        .ok()
                        .filter(|value| value.is_finite())
                        .and_then(|value| <$ty>::try_from(value.round() as i128).ok())
                        .ok_or_else(|| {
                            cx.error(format!("'{text}' is not a valid {}", stringify!($ty)))
                        })
                }
            }
        )*
    };
}

impl_integer_field!(i8, i16, i32, i64, u8, u16, u32, u64, usize);

macro_rules! impl_float_field {
    ($($ty:ty),*) => {
        $(
            impl Field for $ty {
                fn to_node(&self, _refs: &mut dyn ReferenceEncoder) -> Node {
                    Node::scalar(self)
                }

                fn from_node(node: &Node, cx: &mut ReadContext<'_>) -> Result<Self, ParseError> {
                    let text = cx.expect_scalar(node)?.trim();
                    text.parse::<$ty>().map_err(|_| {
                        cx.error(format!("'{text}' is not a valid {}", stringify!($ty)))
                    })
                }
            }
        )*
    };
}

impl_float_field!(f32, f64);

impl Field for String {
    fn to_node(&self, _refs: &mut dyn ReferenceEncoder) -> Node {
        Node::Scalar(self.clone())
    }

    fn from_node(node: &Node, cx: &mut ReadContext<'_>) -> Result<Self, ParseError> {
        match node {
            Node::Scalar(text) => Ok(text.clone()),
            other => {
                log::warn!(
                    "{} (object {}): field '{}' holds a {} where text was expected, using an empty string",
                    cx.document(),
                    cx.file_id(),
                    cx.path(),
                    other.kind()
                );
                Ok(String::new())
            }
        }
    }
}

impl Field for Guid {
    fn to_node(&self, _refs: &mut dyn ReferenceEncoder) -> Node {
        Node::scalar(self)
    }

    fn from_node(node: &Node, cx: &mut ReadContext<'_>) -> Result<Self, ParseError> {
        let text = cx.expect_scalar(node)?;
        Guid::parse(text).map_err(|err| cx.error(err.to_string()))
    }
}

// --- Collections ---

impl<T: Field> Field for Vec<T> {
    fn to_node(&self, refs: &mut dyn ReferenceEncoder) -> Node {
        Node::Sequence(self.iter().map(|item| item.to_node(&mut *refs)).collect())
    }

    fn from_node(node: &Node, cx: &mut ReadContext<'_>) -> Result<Self, ParseError> {
        let items = cx.expect_sequence(node)?;
        items
            .iter()
            .enumerate()
            .map(|(index, item)| {
                let mut scope = cx.enter(format!("[{index}]"));
                T::from_node(item, &mut scope)
            })
            .collect()
    }
}

impl<T: Field> Field for BTreeMap<String, T> {
    fn to_node(&self, refs: &mut dyn ReferenceEncoder) -> Node {
        Node::Map(
            self.iter()
                .map(|(key, value)| (key.clone(), value.to_node(&mut *refs)))
                .collect(),
        )
    }

    fn from_node(node: &Node, cx: &mut ReadContext<'_>) -> Result<Self, ParseError> {
        let entries = cx.expect_map(node)?;
        entries
            .iter()
            .map(|(key, value)| {
                let mut scope = cx.enter(key.as_str());
                T::from_node(value, &mut scope).map(|value| (key.clone(), value))
            })
            .collect()
    }
}

// --- References ---

/// Encodes a persistent reference as `{fileID: N}` or
/// `{fileID: N, guid: G, type: 2}`.
pub fn reference_node(reference: ObjectRef) -> Node {
    let mut entries = vec![("fileID".to_string(), Node::scalar(reference.file_id))];
    if let Some(guid) = reference.guid.filter(|_| !reference.is_null()) {
        entries.push(("guid".to_string(), Node::scalar(guid)));
        entries.push(("type".to_string(), Node::scalar(2)));
    }
    Node::Map(entries)
}

/// Decodes a reference map. Any form with `fileID: 0` is the null reference.
pub fn parse_reference(node: &Node, cx: &mut ReadContext<'_>) -> Result<ObjectRef, ParseError> {
    let entries = match node {
        Node::Map(entries) => entries,
        other => return Err(cx.mismatch("reference map", other)),
    };
    let lookup = |key: &str| {
        entries
            .iter()
            .find(|(candidate, _)| candidate == key)
            .map(|(_, value)| value)
    };

    let file_id = match lookup("fileID") {
        Some(value) => {
            let mut scope = cx.enter("fileID");
            LocalFileId(i64::from_node(value, &mut scope)?)
        }
        None => return Err(cx.error("reference has no fileID")),
    };
    if file_id.is_null() {
        return Ok(ObjectRef::NULL);
    }
    match lookup("guid") {
        Some(value) => {
            let mut scope = cx.enter("guid");
            let guid = Guid::from_node(value, &mut scope)?;
            Ok(ObjectRef::external(guid, file_id))
        }
        None => Ok(ObjectRef::local(file_id)),
    }
}

impl Field for ObjectPtr {
    fn to_node(&self, refs: &mut dyn ReferenceEncoder) -> Node {
        reference_node(refs.encode(self.get()))
    }

    fn from_node(node: &Node, cx: &mut ReadContext<'_>) -> Result<Self, ParseError> {
        let reference = parse_reference(node, cx)?;
        if reference.is_null() {
            return Ok(ObjectPtr::null());
        }
        match cx.resolve(reference) {
            Some(target) => Ok(target.downgrade()),
            None => {
                log::warn!(
                    "{} (object {}): field '{}' references {} which could not be resolved, leaving it null",
                    cx.document(),
                    cx.file_id(),
                    cx.path(),
                    reference
                );
                Ok(ObjectPtr::null())
            }
        }
    }
}

/// Implements [`Field`] for a plain struct by listing its fields and keys.
///
/// The struct must implement `Default`; keys missing from the document keep
/// their default value.
///
/// ```ignore
/// impl_field_struct!(Vector3 { x => "x", y => "y", z => "z" });
/// ```
#[macro_export]
macro_rules! impl_field_struct {
    ($ty:ty { $($field:ident => $key:literal),* $(,)? }) => {
        impl $crate::serialization::Field for $ty {
            fn to_node(
                &self,
                refs: &mut dyn $crate::serialization::ReferenceEncoder,
            ) -> $crate::serialization::Node {
                let mut out = $crate::serialization::MapWriter::new(refs);
                $( out.write($key, &self.$field); )*
                out.into_node()
            }

            fn from_node(
                node: &$crate::serialization::Node,
                cx: &mut $crate::serialization::ReadContext<'_>,
            ) -> ::core::result::Result<Self, $crate::serialization::ParseError> {
                let entries = cx.expect_map(node)?;
                let mut value = <$ty as ::core::default::Default>::default();
                let mut input = $crate::serialization::MapReader::new(entries, cx);
                $( input.read($key, &mut value.$field)?; )*
                Ok(value)
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Detached;

    impl ReferenceEncoder for Detached {
        fn encode(&mut self, _target: Option<ObjectHandle>) -> ObjectRef {
            ObjectRef::NULL
        }
    }

    impl ReferenceResolver for Detached {
        fn resolve(&self, _reference: ObjectRef) -> Option<ObjectHandle> {
            None
        }
    }

    #[derive(Debug, Default, PartialEq)]
    struct Slot {
        component: i32,
    }

    crate::impl_field_struct!(Slot { component => "component" });

    #[derive(Debug, Default, PartialEq)]
    struct Holder {
        name: String,
        slots: Vec<Slot>,
        weights: BTreeMap<String, f32>,
    }

    crate::impl_field_struct!(Holder {
        name => "m_Name",
        slots => "m_Component",
        weights => "m_Floats",
    });

    fn scalar(text: &str) -> Node {
        Node::scalar(text)
    }

    fn decode<T: Field>(node: &Node) -> Result<T, ParseError> {
        let resolver = Detached;
        let mut cx = ReadContext::new("Assets/test.asset", LocalFileId(1), &resolver);
        T::from_node(node, &mut cx)
    }

    #[test]
    fn test_booleans_are_integers() {
        assert_eq!(true.to_node(&mut Detached), scalar("1"));
        assert!(decode::<bool>(&scalar("1")).unwrap());
        assert!(!decode::<bool>(&scalar("0")).unwrap());
        assert!(!decode::<bool>(&scalar("2")).unwrap());
        assert!(decode::<bool>(&scalar("yes")).is_err());
    }

    #[test]
    fn test_integers_round_from_decimal_text() {
        assert_eq!(decode::<i32>(&scalar("42")).unwrap(), 42);
        assert_eq!(decode::<i32>(&scalar("2.6")).unwrap(), 3);
        assert_eq!(decode::<i64>(&scalar("-1e3")).unwrap(), -1000);
        assert!(decode::<u8>(&scalar("300")).is_err());
        assert!(decode::<u32>(&scalar("abc")).is_err());
    }

    #[test]
    fn test_string_degrades_to_empty() {
        let node = Node::Sequence(vec![scalar("a")]);
        assert_eq!(decode::<String>(&node).unwrap(), "");
    }

    #[test]
    fn test_mismatch_reports_field_path() {
        let node = Node::Map(vec![
            ("m_Name".to_string(), scalar("holder")),
            (
                "m_Component".to_string(),
                Node::Sequence(vec![
                    Node::Map(vec![("component".to_string(), scalar("1"))]),
                    Node::Map(vec![(
                        "component".to_string(),
                        Node::Sequence(Vec::new()),
                    )]),
                ]),
            ),
        ]);
        let err = decode::<Holder>(&node).unwrap_err();
        assert_eq!(err.path, "m_Component[1].component");
        assert_eq!(err.document, "Assets/test.asset");
        assert_eq!(err.file_id, LocalFileId(1));
    }

    #[test]
    fn test_path_is_restored_after_error() {
        let resolver = Detached;
        let mut cx = ReadContext::new("doc", LocalFileId(1), &resolver);
        {
            let mut scope = cx.enter("m_Value");
            assert!(i32::from_node(&Node::Map(Vec::new()), &mut scope).is_err());
            assert_eq!(scope.path(), "m_Value");
        }
        assert_eq!(cx.path(), "");
    }

    #[test]
    fn test_missing_keys_keep_defaults() {
        let node = Node::Map(vec![("m_Name".to_string(), scalar("only name"))]);
        let holder = decode::<Holder>(&node).unwrap();
        assert_eq!(holder.name, "only name");
        assert!(holder.slots.is_empty());
        assert!(holder.weights.is_empty());
    }

    #[test]
    fn test_struct_fields_encode_in_declaration_order() {
        let mut holder = Holder {
            name: "h".to_string(),
            ..Default::default()
        };
        holder.weights.insert("_Glossiness".to_string(), 0.5);
        let node = holder.to_node(&mut Detached);
        let keys: Vec<_> = node
            .as_map()
            .unwrap()
            .iter()
            .map(|(key, _)| key.as_str())
            .collect();
        assert_eq!(keys, ["m_Name", "m_Component", "m_Floats"]);
        assert_eq!(decode::<Holder>(&node).unwrap(), holder);
    }

    #[test]
    fn test_reference_forms() {
        let guid = Guid::parse("0000000000000000e000000000000000").unwrap();
        assert_eq!(
            reference_node(ObjectRef::NULL),
            Node::Map(vec![("fileID".to_string(), scalar("0"))])
        );
        let external = reference_node(ObjectRef::external(guid, LocalFileId(10202)));
        assert_eq!(external.get("guid"), Some(&scalar("0000000000000000e000000000000000")));
        assert_eq!(external.get("type"), Some(&scalar("2")));

        let resolver = Detached;
        let mut cx = ReadContext::new("doc", LocalFileId(1), &resolver);
        assert_eq!(
            parse_reference(&external, &mut cx).unwrap(),
            ObjectRef::external(guid, LocalFileId(10202))
        );
        assert!(parse_reference(&scalar("0"), &mut cx).is_err());
    }

    #[test]
    fn test_null_and_unresolved_pointers_read_as_null() {
        let null = reference_node(ObjectRef::NULL);
        assert!(decode::<ObjectPtr>(&null).unwrap().is_null());

        let dangling = reference_node(ObjectRef::local(LocalFileId(99)));
        assert!(decode::<ObjectPtr>(&dangling).unwrap().is_null());
    }
}
