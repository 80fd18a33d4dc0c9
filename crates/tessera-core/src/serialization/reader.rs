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

use std::collections::BTreeMap;

use super::{Document, DocumentError, MapReader, ReadContext, ReferenceResolver};
use crate::object::{Guid, LocalFileId, ObjectHandle, ObjectRef, TypeRegistry};

/// Knobs for decoding a document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReadOptions {
    /// Skip blocks whose type tag is not registered instead of failing the
    /// whole document. References to skipped blocks read as null.
    pub skip_unknown_types: bool,
}

/// The objects created for one document, keyed by local file id.
#[derive(Debug, Default, Clone)]
pub struct Allocation {
    objects: BTreeMap<LocalFileId, ObjectHandle>,
    order: Vec<LocalFileId>,
}

impl Allocation {
    /// The object allocated for `file_id`.
    pub fn get(&self, file_id: LocalFileId) -> Option<&ObjectHandle> {
        self.objects.get(&file_id)
    }

    /// The object of the first block in document order.
    pub fn first(&self) -> Option<(LocalFileId, &ObjectHandle)> {
        let file_id = *self.order.first()?;
        self.objects.get(&file_id).map(|handle| (file_id, handle))
    }

    /// All objects in document order.
    pub fn iter(&self) -> impl Iterator<Item = (LocalFileId, &ObjectHandle)> + '_ {
        self.order
            .iter()
            .filter_map(|file_id| self.objects.get(file_id).map(|handle| (*file_id, handle)))
    }

    /// Number of allocated objects.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Returns `true` if no block produced an object.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Consumes the allocation, returning the file id map.
    pub fn into_objects(self) -> BTreeMap<LocalFileId, ObjectHandle> {
        self.objects
    }
}

/// A resolver that knows no other documents.
#[derive(Debug, Default, Clone, Copy)]
pub struct Detached;

impl ReferenceResolver for Detached {
    fn resolve(&self, _reference: ObjectRef) -> Option<ObjectHandle> {
        None
    }
}

/// Resolves references into the document being read from its allocation,
/// and everything else through the external resolver.
struct LocalResolver<'r> {
    guid: Option<Guid>,
    allocation: &'r Allocation,
    external: &'r dyn ReferenceResolver,
}

impl ReferenceResolver for LocalResolver<'_> {
    fn resolve(&self, reference: ObjectRef) -> Option<ObjectHandle> {
        match reference.guid {
            None => self.allocation.get(reference.file_id).cloned(),
            Some(guid) if Some(guid) == self.guid => {
                self.allocation.get(reference.file_id).cloned()
            }
            Some(_) => self.external.resolve(reference),
        }
    }
}

/// Two-pass decoder turning a [`Document`] into live objects.
///
/// The allocation pass creates every object before any field is read, so
/// forward references and references from other documents that are being
/// read at the same time can be resolved during the population pass.
pub struct DocumentReader<'t> {
    types: &'t TypeRegistry,
    name: String,
    guid: Option<Guid>,
    options: ReadOptions,
}

impl<'t> DocumentReader<'t> {
    /// Creates a reader. `name` identifies the document in errors and logs.
    pub fn new(types: &'t TypeRegistry, name: impl Into<String>) -> Self {
        Self {
            types,
            name: name.into(),
            guid: None,
            options: ReadOptions::default(),
        }
    }

    /// Stamps every decoded object with the document's GUID.
    pub fn with_guid(mut self, guid: Guid) -> Self {
        self.guid = Some(guid);
        self
    }

    /// Sets the decoding options.
    pub fn with_options(mut self, options: ReadOptions) -> Self {
        self.options = options;
        self
    }

    /// Allocation pass: creates one empty object per block.
    ///
    /// When `previous` holds an object of the same type at a block's file id
    /// that instance is reused, so handles taken before a re-import stay
    /// valid.
    pub fn allocate(
        &self,
        document: &Document,
        previous: &BTreeMap<LocalFileId, ObjectHandle>,
    ) -> Result<Allocation, DocumentError> {
        let mut allocation = Allocation::default();

        for block in &document.blocks {
            if block.file_id.is_null() {
                return Err(DocumentError::NullFileId { line: block.line });
            }
            if allocation.objects.contains_key(&block.file_id) {
                return Err(DocumentError::DuplicateFileId {
                    file_id: block.file_id,
                    line: block.line,
                });
            }

            let reused = previous
                .get(&block.file_id)
                .filter(|existing| existing.type_tag() == block.type_tag);
            let handle = match reused {
                Some(existing) => existing.clone(),
                None => match self.types.create(block.type_tag) {
                    Ok(handle) => handle,
                    Err(err) if self.options.skip_unknown_types => {
                        log::warn!(
                            "{}: skipping block {} ({}): {}",
                            self.name,
                            block.file_id,
                            block.type_name,
                            err
                        );
                        continue;
                    }
                    Err(source) => {
                        return Err(DocumentError::UnknownType {
                            file_id: block.file_id,
                            source,
                        })
                    }
                },
            };

            if let Some(expected) = self.types.name_of(block.type_tag) {
                if expected != block.type_name {
                    log::warn!(
                        "{}: block {} is tagged {} ({}) but named '{}'",
                        self.name,
                        block.file_id,
                        block.type_tag,
                        expected,
                        block.type_name
                    );
                }
            }

            {
                let mut object = handle.write();
                let header = object.header_mut();
                header.file_id = block.file_id;
                header.guid = self.guid;
            }
            allocation.objects.insert(block.file_id, handle);
            allocation.order.push(block.file_id);
        }

        Ok(allocation)
    }

    /// Population pass: decodes every block's fields into its object.
    pub fn populate(
        &self,
        document: &Document,
        allocation: &Allocation,
        external: &dyn ReferenceResolver,
    ) -> Result<(), DocumentError> {
        let resolver = LocalResolver {
            guid: self.guid,
            allocation,
            external,
        };
        for block in &document.blocks {
            let Some(handle) = allocation.get(block.file_id) else {
                continue;
            };
            let mut cx = ReadContext::new(&self.name, block.file_id, &resolver);
            let mut input = MapReader::new(&block.fields, &mut cx);
            handle.write().deserialize(&mut input)?;
        }
        Ok(())
    }

    /// Parses `text` and runs both passes with fresh objects.
    pub fn read(
        &self,
        text: &str,
        external: &dyn ReferenceResolver,
    ) -> Result<Allocation, DocumentError> {
        let document = Document::parse(text)?;
        let allocation = self.allocate(&document, &BTreeMap::new())?;
        self.populate(&document, &allocation, external)?;
        log::debug!("{}: decoded {} objects", self.name, allocation.len());
        Ok(allocation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::{tests::Probe, ObjectType, TypeTag};

    fn registry() -> TypeRegistry {
        let mut types = TypeRegistry::new();
        types.register::<Probe>();
        types
    }

    const FORWARD: &str = "--- !u!7 &1
Probe:
  m_Name: first
  m_Value: 10
  m_Enabled: 1
  m_Next: {fileID: 2}
  m_Items:
  - {fileID: 2}
  - {fileID: 0}
--- !u!7 &2
Probe:
  m_Name: second
  m_Value: 20
  m_Enabled: 0
  m_Next: {fileID: 1}
  m_Items: []
";

    #[test]
    fn test_forward_references_resolve() {
        let types = registry();
        let allocation = DocumentReader::new(&types, "forward").read(FORWARD, &Detached).unwrap();

        let (first_id, first) = allocation.first().unwrap();
        assert_eq!(first_id, LocalFileId(1));
        let second = allocation.get(LocalFileId(2)).unwrap();

        let probe = first.downcast_ref::<Probe>().unwrap();
        assert_eq!(probe.name, "first");
        assert_eq!(probe.value, 10);
        assert!(probe.enabled);
        assert!(probe.next.points_to(second));
        assert!(probe.items[0].points_to(second));
        assert!(probe.items[1].is_null());
        drop(probe);

        assert!(second.downcast_ref::<Probe>().unwrap().next.points_to(first));
    }

    #[test]
    fn test_headers_carry_document_identity() {
        let types = registry();
        let guid = Guid::from_path_v5("Assets/forward.asset");
        let allocation = DocumentReader::new(&types, "forward")
            .with_guid(guid)
            .read(FORWARD, &Detached)
            .unwrap();
        let (_, second) = allocation.iter().nth(1).unwrap();
        let object = second.read();
        assert_eq!(object.header().file_id, LocalFileId(2));
        assert_eq!(object.header().guid, Some(guid));
    }

    #[test]
    fn test_unknown_type_fails_or_is_skipped() {
        let types = registry();
        let text = "--- !u!99 &5\nMystery: {}\n--- !u!7 &1\nProbe:\n  m_Next: {fileID: 5}\n";

        let err = DocumentReader::new(&types, "mystery").read(text, &Detached).unwrap_err();
        assert!(matches!(
            err,
            DocumentError::UnknownType { file_id: LocalFileId(5), .. }
        ));

        let allocation = DocumentReader::new(&types, "mystery")
            .with_options(ReadOptions {
                skip_unknown_types: true,
            })
            .read(text, &Detached)
            .unwrap();
        assert_eq!(allocation.len(), 1);
        let (_, probe) = allocation.first().unwrap();
        assert!(probe.downcast_ref::<Probe>().unwrap().next.is_null());
    }

    #[test]
    fn test_duplicate_and_null_ids_are_rejected() {
        let types = registry();
        let duplicate = "--- !u!7 &1\nProbe: {}\n--- !u!7 &1\nProbe: {}\n";
        assert_eq!(
            DocumentReader::new(&types, "dup").read(duplicate, &Detached).unwrap_err(),
            DocumentError::DuplicateFileId {
                file_id: LocalFileId(1),
                line: 3
            }
        );

        let null = "--- !u!7 &0\nProbe: {}\n";
        assert_eq!(
            DocumentReader::new(&types, "null").read(null, &Detached).unwrap_err(),
            DocumentError::NullFileId { line: 1 }
        );
    }

    #[test]
    fn test_parse_error_fails_the_document() {
        let types = registry();
        let text = "--- !u!7 &1\nProbe:\n  m_Items:\n    bad: map\n";
        let err = DocumentReader::new(&types, "bad").read(text, &Detached).unwrap_err();
        match err {
            DocumentError::Parse(err) => {
                assert_eq!(err.path, "m_Items");
                assert_eq!(err.document, "bad");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_allocation_reuses_matching_instances() {
        let types = registry();
        let reader = DocumentReader::new(&types, "forward");
        let document = Document::parse(FORWARD).unwrap();

        let first = reader.allocate(&document, &BTreeMap::new()).unwrap();
        let previous = first.clone().into_objects();
        let second = reader.allocate(&document, &previous).unwrap();

        assert!(first.get(LocalFileId(1)).unwrap().ptr_eq(second.get(LocalFileId(1)).unwrap()));
        assert_eq!(
            second.get(LocalFileId(2)).unwrap().type_tag(),
            <Probe as ObjectType>::TYPE_TAG
        );
        assert_eq!(Probe::TYPE_TAG, TypeTag(7));
    }

    #[test]
    fn test_external_references_use_the_external_resolver() {
        struct One(ObjectHandle);
        impl ReferenceResolver for One {
            fn resolve(&self, reference: ObjectRef) -> Option<ObjectHandle> {
                (reference.file_id == LocalFileId(5)).then(|| self.0.clone())
            }
        }

        let types = registry();
        let target = ObjectHandle::new(Probe::default());
        let text = "--- !u!7 &1\nProbe:\n  m_Next: {fileID: 5, guid: 0000000000000000e000000000000000, type: 2}\n";
        let allocation = DocumentReader::new(&types, "external")
            .read(text, &One(target.clone()))
            .unwrap();
        let (_, probe) = allocation.first().unwrap();
        assert!(probe.downcast_ref::<Probe>().unwrap().next.points_to(&target));
    }
}
