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

/// A node of a decoded field tree.
///
/// Maps keep their keys in document order so that a written document reads
/// back with the same layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// A literal value, kept as text until a field interprets it.
    Scalar(String),
    /// An ordered list of nodes.
    Sequence(Vec<Node>),
    /// Key/value pairs in document order.
    Map(Vec<(String, Node)>),
}

impl Node {
    /// Builds a scalar node from anything printable.
    pub fn scalar(value: impl ToString) -> Self {
        Node::Scalar(value.to_string())
    }

    /// The text of a scalar node.
    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            Node::Scalar(text) => Some(text),
            _ => None,
        }
    }

    /// The items of a sequence node.
    pub fn as_sequence(&self) -> Option<&[Node]> {
        match self {
            Node::Sequence(items) => Some(items),
            _ => None,
        }
    }

    /// The entries of a map node.
    pub fn as_map(&self) -> Option<&[(String, Node)]> {
        match self {
            Node::Map(entries) => Some(entries),
            _ => None,
        }
    }

    /// Looks up a key in a map node.
    pub fn get(&self, key: &str) -> Option<&Node> {
        self.as_map()?
            .iter()
            .find(|(candidate, _)| candidate == key)
            .map(|(_, value)| value)
    }

    /// A short description of the node's shape, for error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Node::Scalar(_) => "scalar",
            Node::Sequence(_) => "sequence",
            Node::Map(_) => "map",
        }
    }

    /// Returns `true` for the empty scalar, the empty sequence and the empty map.
    pub fn is_empty(&self) -> bool {
        match self {
            Node::Scalar(text) => text.is_empty(),
            Node::Sequence(items) => items.is_empty(),
            Node::Map(entries) => entries.is_empty(),
        }
    }
}
