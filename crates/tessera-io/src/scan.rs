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

//! Discovers assets on disk and registers their sidecar GUIDs.

use std::{ffi::OsStr, io};

use tessera_core::AssetPath;
use walkdir::{DirEntry, WalkDir};

use crate::{meta::META_EXTENSION, AssetDatabase, AssetMeta, MetaError};

/// What a scan found.
#[derive(Debug, Default)]
pub struct ScanReport {
    /// Paths registered from their sidecar, in walk order.
    pub registered: Vec<AssetPath>,
    /// Paths without a sidecar. They stay unregistered.
    pub missing_meta: Vec<AssetPath>,
    /// Paths whose sidecar could not be read.
    pub invalid_meta: Vec<(AssetPath, MetaError)>,
}

impl ScanReport {
    /// Returns `true` if every discovered path was registered.
    pub fn is_clean(&self) -> bool {
        self.missing_meta.is_empty() && self.invalid_meta.is_empty()
    }
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .is_some_and(|name| name.starts_with('.'))
}

fn is_sidecar(entry: &DirEntry) -> bool {
    entry.path().extension() == Some(OsStr::new(META_EXTENSION))
}

/// Walks every configured source directory and registers each file and
/// directory below it that has a sidecar.
///
/// Hidden entries and sidecars themselves are skipped. Paths are registered
/// relative to the project root.
pub fn scan_project(db: &AssetDatabase) -> ScanReport {
    let root = &db.config().project_root;
    let mut report = ScanReport::default();

    for directory in &db.config().source_directories {
        let base = root.join(directory);
        if !base.exists() {
            log::warn!("Source directory '{}' does not exist", base.display());
            continue;
        }

        let walker = WalkDir::new(&base)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| entry.depth() == 0 || !is_hidden(entry));
        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    log::warn!("Skipping unreadable entry: {}", err);
                    continue;
                }
            };
            if entry.depth() == 0 || is_sidecar(&entry) {
                continue;
            }
            let Ok(relative) = entry.path().strip_prefix(root) else {
                continue;
            };
            let path = AssetPath::from_relative(relative);

            match AssetMeta::read(entry.path()) {
                Ok(meta) => {
                    db.register_meta(&path, &meta);
                    report.registered.push(path);
                }
                Err(MetaError::Io { source, .. }) if source.kind() == io::ErrorKind::NotFound => {
                    log::warn!(".meta not found for '{}'", path);
                    report.missing_meta.push(path);
                }
                Err(err) => {
                    log::warn!("Invalid .meta for '{}': {}", path, err);
                    report.invalid_meta.push((path, err));
                }
            }
        }
    }

    log::info!(
        "Scanned project: {} registered, {} without sidecar, {} invalid",
        report.registered.len(),
        report.missing_meta.len(),
        report.invalid_meta.len()
    );
    report
}
