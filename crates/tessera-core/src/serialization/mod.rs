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

//! The document codec.
//!
//! - [`text`] parses and emits the textual document format.
//! - [`Field`] converts typed values to and from [`Node`] trees.
//! - [`DocumentReader`] turns a document into live objects in two passes.
//! - [`DocumentWriter`] turns an object graph into a document.

mod error;
mod field;
mod node;
mod reader;
pub mod text;
mod writer;

pub use error::*;
pub use field::*;
pub use node::Node;
pub use reader::*;
pub use text::{emit_node, parse_node, Block, Document, PREAMBLE};
pub use writer::*;
