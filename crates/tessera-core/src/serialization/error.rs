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

use thiserror::Error;

use crate::object::{LocalFileId, UnknownTypeTag};

/// The document text is not well formed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}: {message}")]
pub struct SyntaxError {
    /// 1-based line number where the problem was detected.
    pub line: usize,
    /// What went wrong.
    pub message: String,
}

impl SyntaxError {
    pub(crate) fn new(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
        }
    }
}

/// A node did not have the shape or content a field expected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{document}, object {file_id}, field '{path}': {message}")]
pub struct ParseError {
    /// Name of the document being read.
    pub document: String,
    /// Block whose fields were being populated.
    pub file_id: LocalFileId,
    /// Dotted path of the offending field, e.g. `m_Component[1].component`.
    pub path: String,
    /// What went wrong.
    pub message: String,
}

/// Errors raised while decoding a document into objects.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DocumentError {
    /// The text could not be parsed.
    #[error("syntax error: {0}")]
    Syntax(#[from] SyntaxError),

    /// A block declares the reserved null file id.
    #[error("line {line}: block declares the null file id")]
    NullFileId {
        /// Line of the block header.
        line: usize,
    },

    /// Two blocks declare the same file id.
    #[error("line {line}: file id {file_id} is declared twice")]
    DuplicateFileId {
        /// The repeated id.
        file_id: LocalFileId,
        /// Line of the second block header.
        line: usize,
    },

    /// The factory has no variant for a block's type tag.
    #[error("block {file_id}: {source}")]
    UnknownType {
        /// The block that could not be allocated.
        file_id: LocalFileId,
        /// The factory failure.
        source: UnknownTypeTag,
    },

    /// A field could not be populated.
    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// Errors raised while encoding objects into a document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WriteError {
    /// An object's type tag has no registered name to write as its root key.
    #[error(transparent)]
    UnknownType(#[from] UnknownTypeTag),
}
