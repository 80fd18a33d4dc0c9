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

use std::collections::{HashMap, HashSet, VecDeque};

use super::{Block, Document, MapWriter, ReferenceEncoder, WriteError};
use crate::object::{
    Guid, InstanceId, LocalFileId, ObjectHandle, ObjectRef, TypeRegistry, UnknownTypeTag,
};

/// The result of writing an object graph.
#[derive(Debug)]
pub struct WrittenDocument {
    /// The encoded blocks.
    pub document: Document,
    /// Every emitted object with the file id it was written under, in
    /// document order.
    pub objects: Vec<(LocalFileId, ObjectHandle)>,
}

impl WrittenDocument {
    /// Renders the document text.
    pub fn to_text(&self) -> String {
        self.document.to_text()
    }
}

/// Encodes an object graph as a [`Document`].
///
/// Starting from the roots, the writer follows every object reference
/// breadth-first. Each distinct object is emitted exactly once, however many
/// fields point at it; objects that already belong to another document are
/// written as cross-document references instead.
pub struct DocumentWriter<'t> {
    types: &'t TypeRegistry,
    guid: Option<Guid>,
    pending: VecDeque<ObjectHandle>,
    visited: HashMap<InstanceId, LocalFileId>,
    used: HashSet<LocalFileId>,
}

impl<'t> DocumentWriter<'t> {
    /// Creates a writer for a document without a GUID.
    pub fn new(types: &'t TypeRegistry) -> Self {
        Self {
            types,
            guid: None,
            pending: VecDeque::new(),
            visited: HashMap::new(),
            used: HashSet::new(),
        }
    }

    /// Sets the GUID of the document being written.
    ///
    /// Objects stamped with this GUID are part of the document; objects
    /// stamped with any other GUID are referenced, not emitted.
    pub fn with_guid(mut self, guid: Guid) -> Self {
        self.guid = Some(guid);
        self
    }

    /// Writes the graph reachable from `roots`. The first root becomes the
    /// first block.
    ///
    /// After writing, every emitted object's header carries its file id and
    /// the document's GUID.
    pub fn write(mut self, roots: &[ObjectHandle]) -> Result<WrittenDocument, WriteError> {
        for root in roots {
            self.enqueue(root.clone());
        }

        let mut blocks = Vec::new();
        let mut objects = Vec::new();
        while let Some(handle) = self.pending.pop_front() {
            let file_id = self.visited[&handle.instance_id()];
            let type_tag = handle.type_tag();
            let type_name = self
                .types
                .name_of(type_tag)
                .ok_or(UnknownTypeTag(type_tag))?;

            {
                let mut object = handle.write();
                let header = object.header_mut();
                header.file_id = file_id;
                if self.guid.is_some() {
                    header.guid = self.guid;
                }
            }

            let fields = {
                let object = handle.read();
                let mut out = MapWriter::new(&mut self);
                object.serialize(&mut out);
                out.finish()
            };
            blocks.push(Block::new(type_tag, file_id, type_name, fields));
            objects.push((file_id, handle));
        }

        log::debug!("Wrote {} objects", objects.len());
        Ok(WrittenDocument {
            document: Document { blocks },
            objects,
        })
    }

    /// Schedules an object for emission and returns its file id.
    fn enqueue(&mut self, handle: ObjectHandle) -> LocalFileId {
        if let Some(file_id) = self.visited.get(&handle.instance_id()) {
            return *file_id;
        }
        let current = handle.read_recursive().header().file_id;
        let file_id = if !current.is_null() && !self.used.contains(&current) {
            current
        } else {
            LocalFileId::first_free(handle.type_tag(), |candidate| {
                self.used.contains(&candidate)
            })
        };
        self.used.insert(file_id);
        self.visited.insert(handle.instance_id(), file_id);
        self.pending.push_back(handle);
        file_id
    }
}

impl ReferenceEncoder for DocumentWriter<'_> {
    fn encode(&mut self, target: Option<ObjectHandle>) -> ObjectRef {
        let Some(target) = target else {
            return ObjectRef::NULL;
        };
        if let Some(file_id) = self.visited.get(&target.instance_id()) {
            return ObjectRef::local(*file_id);
        }

        let (guid, file_id) = {
            let object = target.read_recursive();
            (object.header().guid, object.header().file_id)
        };
        match guid {
            Some(guid) if Some(guid) != self.guid => {
                if file_id.is_null() {
                    log::warn!(
                        "Object {} belongs to document {} but has no file id; writing a null reference",
                        target.instance_id(),
                        guid
                    );
                    return ObjectRef::NULL;
                }
                ObjectRef::external(guid, file_id)
            }
            _ => ObjectRef::local(self.enqueue(target)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::{tests::Probe, ObjectPtr, TypeTag};
    use crate::serialization::{Detached, DocumentReader, Node};
    use std::collections::BTreeMap;

    fn registry() -> TypeRegistry {
        let mut types = TypeRegistry::new();
        types.register::<Probe>();
        types
    }

    fn probe(name: &str, value: i32) -> ObjectHandle {
        ObjectHandle::new(Probe {
            name: name.to_string(),
            value,
            ..Default::default()
        })
    }

    fn link(from: &ObjectHandle, to: &ObjectHandle) {
        from.downcast_mut::<Probe>().unwrap().next = to.downgrade();
    }

    #[test]
    fn test_shared_targets_are_emitted_once() {
        let types = registry();
        let root = probe("root", 1);
        let shared = probe("shared", 2);
        link(&root, &shared);
        root.downcast_mut::<Probe>().unwrap().items = vec![shared.downgrade(), shared.downgrade()];

        let written = DocumentWriter::new(&types).write(&[root.clone()]).unwrap();
        assert_eq!(written.objects.len(), 2);
        assert!(written.objects[0].1.ptr_eq(&root));

        let ids: HashSet<_> = written.objects.iter().map(|(id, _)| *id).collect();
        assert_eq!(ids.len(), 2);
        assert!(ids.contains(&LocalFileId(700000)));
        assert!(ids.contains(&LocalFileId(700001)));
    }

    #[test]
    fn test_existing_file_ids_are_kept() {
        let types = registry();
        let root = probe("root", 1);
        root.write().header_mut().file_id = LocalFileId(42);

        let written = DocumentWriter::new(&types).write(&[root.clone()]).unwrap();
        assert_eq!(written.objects[0].0, LocalFileId(42));
        assert!(written.to_text().contains("--- !u!7 &42\n"));
    }

    #[test]
    fn test_null_reference_is_explicit() {
        let types = registry();
        let root = probe("alone", 0);
        let text = DocumentWriter::new(&types).write(&[root]).unwrap().to_text();
        assert!(text.contains("  m_Next: {fileID: 0}\n"));
        assert!(text.contains("  m_Items: []\n"));
    }

    #[test]
    fn test_reference_lists_are_written_as_flow_maps() {
        let types = registry();
        let root = probe("root", 1);
        let target = probe("target", 2);
        root.downcast_mut::<Probe>().unwrap().items = vec![ObjectPtr::null(), target.downgrade()];

        let text = DocumentWriter::new(&types)
            .write(&[root.clone(), target.clone()])
            .unwrap()
            .to_text();

        assert!(text.contains("  m_Items:\n  - {fileID: 0}\n  - {fileID: 700001}\n"));
        let document = Document::parse(&text).unwrap();
        let items = document.blocks[0].fields.iter().find(|(key, _)| key == "m_Items");
        assert_eq!(
            items.and_then(|(_, node)| node.as_sequence()).map(<[Node]>::len),
            Some(2)
        );
    }

    #[test]
    fn test_round_trip_preserves_graph() {
        let types = registry();
        let guid = Guid::from_path_v5("Assets/graph.asset");
        let a = probe("a", 1);
        let b = probe("b", -2);
        let c = probe("c: with colon", 3);
        link(&a, &b);
        link(&b, &a);
        link(&c, &c);
        {
            let mut a = a.downcast_mut::<Probe>().unwrap();
            a.enabled = true;
            a.items = vec![c.downgrade(), ObjectPtr::null(), b.downgrade()];
        }

        let written = DocumentWriter::new(&types)
            .with_guid(guid)
            .write(&[a.clone()])
            .unwrap();
        assert_eq!(a.read().header().guid, Some(guid));
        let text = written.to_text();

        let allocation = DocumentReader::new(&types, "graph")
            .with_guid(guid)
            .read(&text, &Detached)
            .unwrap();
        assert_eq!(allocation.len(), 3);

        let by_name: BTreeMap<String, (LocalFileId, ObjectHandle)> = allocation
            .iter()
            .map(|(id, handle)| {
                let name = handle.read().name().to_string();
                (name, (id, handle.clone()))
            })
            .collect();
        for (file_id, original) in &written.objects {
            let name = original.read().name().to_string();
            let (read_id, read) = &by_name[&name];
            assert_eq!(read_id, file_id);
            assert_eq!(read.type_tag(), TypeTag(7));
        }

        let (ra, rb, rc) = (&by_name["a"].1, &by_name["b"].1, &by_name["c: with colon"].1);
        let pa = ra.downcast_ref::<Probe>().unwrap();
        assert!(pa.enabled);
        assert_eq!(pa.value, 1);
        assert!(pa.next.points_to(rb));
        assert!(pa.items[0].points_to(rc));
        assert!(pa.items[1].is_null());
        assert!(pa.items[2].points_to(rb));
        assert_eq!(rb.downcast_ref::<Probe>().unwrap().value, -2);
        assert!(rb.downcast_ref::<Probe>().unwrap().next.points_to(ra));
        assert!(rc.downcast_ref::<Probe>().unwrap().next.points_to(rc));
    }

    #[test]
    fn test_objects_of_other_documents_are_referenced() {
        let types = registry();
        let elsewhere = Guid::from_path_v5("Assets/other.asset");
        let foreign = probe("foreign", 0);
        {
            let mut object = foreign.write();
            object.header_mut().guid = Some(elsewhere);
            object.header_mut().file_id = LocalFileId(5);
        }
        let root = probe("root", 0);
        link(&root, &foreign);

        let written = DocumentWriter::new(&types)
            .with_guid(Guid::from_path_v5("Assets/this.asset"))
            .write(&[root])
            .unwrap();
        assert_eq!(written.objects.len(), 1);
        assert!(written
            .to_text()
            .contains(&format!("m_Next: {{fileID: 5, guid: {elsewhere}, type: 2}}")));
    }

    #[test]
    fn test_unregistered_type_cannot_be_written() {
        let types = TypeRegistry::new();
        let err = DocumentWriter::new(&types).write(&[probe("x", 0)]).unwrap_err();
        assert_eq!(err, WriteError::UnknownType(UnknownTypeTag(TypeTag(7))));
    }
}
