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

use serde::{Deserialize, Serialize};
use std::{
    fmt,
    path::{Path, PathBuf},
    str::FromStr,
    sync::atomic::{AtomicU64, Ordering},
};
use thiserror::Error;
use uuid::Uuid;

/// An integer discriminator identifying a concrete object variant.
///
/// Every tag maps to exactly one factory function in the [`TypeRegistry`](super::TypeRegistry).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TypeTag(pub u32);

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

static NEXT_INSTANCE_ID: AtomicU64 = AtomicU64::new(1);

/// A process-local identifier assigned to every object when it is constructed.
///
/// Instance ids are never persisted and never reused within the lifetime of a
/// process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct InstanceId(u64);

impl InstanceId {
    /// Draws the next unused instance id.
    pub fn next() -> Self {
        Self(NEXT_INSTANCE_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns the raw value.
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifies one object inside one document.
///
/// Local file ids are only unique within the document that declares them.
/// The value `0` is reserved and means "null reference".
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct LocalFileId(pub i64);

impl LocalFileId {
    /// The reserved null id.
    pub const NULL: Self = Self(0);

    /// Returns `true` for the reserved null id.
    pub fn is_null(self) -> bool {
        self.0 == 0
    }

    /// Returns the raw value.
    pub fn get(self) -> i64 {
        self.0
    }

    /// Picks the first id of the form `tag * 100000 + n` for which `is_taken`
    /// returns `false`.
    ///
    /// This mirrors the way the editor numbers the objects of a freshly saved
    /// document: a material gets `2100000`, the second one `2100001`, and so on.
    pub fn first_free(tag: TypeTag, mut is_taken: impl FnMut(LocalFileId) -> bool) -> Self {
        let base = i64::from(tag.0) * 100_000;
        (0..)
            .map(|n| LocalFileId(base + n))
            .find(|candidate| !candidate.is_null() && !is_taken(*candidate))
            .unwrap_or(LocalFileId::NULL)
    }
}

impl fmt::Display for LocalFileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Returned when a string is not a valid GUID.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid GUID '{0}'")]
pub struct InvalidGuid(pub String);

/// A stable identifier for one on-disk document.
///
/// GUIDs are assigned by the sidecar metadata before the object system ever
/// sees a document, and they stay the same across sessions, renames, and
/// moves. They are rendered as 32 lowercase hexadecimal digits, the form used
/// in sidecar files and cross-document references.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Guid(Uuid);

impl Guid {
    /// Creates a new, random (version 4) GUID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a deterministic (version 5) GUID from a path-like string.
    pub fn from_path_v5(path: &str) -> Self {
        Self(Uuid::new_v5(&Uuid::NAMESPACE_URL, path.as_bytes()))
    }

    /// Builds a GUID from its 128-bit value.
    pub const fn from_u128(value: u128) -> Self {
        Self(Uuid::from_u128(value))
    }

    /// Parses a GUID from its textual form.
    pub fn parse(text: &str) -> Result<Self, InvalidGuid> {
        Uuid::try_parse(text.trim())
            .map(Self)
            .map_err(|_| InvalidGuid(text.to_string()))
    }
}

impl Default for Guid {
    /// Creates a new, random (version 4) GUID.
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

impl FromStr for Guid {
    type Err = InvalidGuid;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// A project-relative asset path such as `Assets/Materials/Floor.mat`.
///
/// Paths are normalised on construction: backslashes become forward slashes,
/// a leading `./` and trailing separators are removed. Two spellings of the
/// same file therefore compare equal.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AssetPath(String);

impl AssetPath {
    /// Creates a normalised asset path.
    pub fn new(path: impl AsRef<str>) -> Self {
        let mut normalized = path.as_ref().trim().replace('\\', "/");
        while let Some(rest) = normalized.strip_prefix("./") {
            normalized = rest.to_string();
        }
        while normalized.len() > 1 && normalized.ends_with('/') {
            normalized.pop();
        }
        Self(normalized)
    }

    /// Builds an asset path from a filesystem path relative to the project root.
    pub fn from_relative(path: &Path) -> Self {
        Self::new(path.to_string_lossy())
    }

    /// Returns the path as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The last component of the path.
    pub fn file_name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }

    /// The file name without its extension.
    pub fn file_stem(&self) -> &str {
        let name = self.file_name();
        match name.rfind('.') {
            Some(0) | None => name,
            Some(dot) => &name[..dot],
        }
    }

    /// The extension without the leading dot, if any.
    pub fn extension(&self) -> Option<&str> {
        let name = self.file_name();
        match name.rfind('.') {
            Some(0) | None => None,
            Some(dot) => Some(&name[dot + 1..]),
        }
    }

    /// Resolves this path against a project root directory.
    pub fn to_path(&self, root: &Path) -> PathBuf {
        root.join(&self.0)
    }
}

impl fmt::Display for AssetPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for AssetPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for AssetPath {
    fn from(path: &str) -> Self {
        Self::new(path)
    }
}

impl From<String> for AssetPath {
    fn from(path: String) -> Self {
        Self::new(path)
    }
}

impl From<&AssetPath> for AssetPath {
    fn from(path: &AssetPath) -> Self {
        path.clone()
    }
}

/// The persistent address of an object: a local file id, plus the GUID of
/// the document that holds it when that document is not the current one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectRef {
    /// The object's id inside its document. Null means "no object".
    pub file_id: LocalFileId,
    /// The document holding the object. `None` means the current document.
    pub guid: Option<Guid>,
}

impl ObjectRef {
    /// The null reference.
    pub const NULL: Self = Self {
        file_id: LocalFileId::NULL,
        guid: None,
    };

    /// A reference to an object in the current document.
    pub fn local(file_id: LocalFileId) -> Self {
        Self {
            file_id,
            guid: None,
        }
    }

    /// A reference to an object in another document.
    pub fn external(guid: Guid, file_id: LocalFileId) -> Self {
        Self {
            file_id,
            guid: Some(guid),
        }
    }

    /// Returns `true` when this reference designates no object.
    pub fn is_null(&self) -> bool {
        self.file_id.is_null()
    }
}

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.guid {
            Some(guid) => write!(f, "{{fileID: {}, guid: {}}}", self.file_id, guid),
            None => write!(f, "{{fileID: {}}}", self.file_id),
        }
    }
}
