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

//! Importers: one per asset, owning the objects decoded from it.
//!
//! An [`Importer`] runs its [`ImportStrategy`] at most once and caches the
//! outcome, successful or not. Imports are claimed through a small state
//! machine and serialised by the database-wide import lock, so concurrent
//! callers never decode the same document twice nor observe a half-built
//! object map, while a document that references itself through another one
//! (X → Y → X) re-enters its own import instead of deadlocking.

mod default_object;
mod native_format;
mod resources;
mod strategy;

pub use default_object::DefaultObject;
pub use native_format::NativeFormat;
pub use resources::Resources;
pub use strategy::{ImportContext, ImportStrategy, ImportedAsset};

use std::{
    collections::BTreeMap,
    fmt, fs,
    path::{Path, PathBuf},
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    time::SystemTime,
};

use parking_lot::{Mutex, RwLock};
use tessera_core::{serialization::Allocation, AssetPath, Guid, LocalFileId, ObjectHandle};

use crate::{AssetDatabase, AssetError, ImportError, NotFound};

/// Where an importer is in its lifecycle.
#[derive(Debug, Clone, Default)]
pub enum ImportState {
    /// Nothing imported yet, or a reimport was requested.
    #[default]
    Idle,
    /// A decode is running on the thread holding the import lock.
    Importing,
    /// The objects are available.
    Imported,
    /// The last decode failed; the error is reported until a reimport.
    Failed(ImportError),
}

struct Location {
    path: AssetPath,
    full_path: PathBuf,
    main_object_file_id: LocalFileId,
}

#[derive(Default)]
struct Contents {
    main_asset: Option<ObjectHandle>,
    objects: BTreeMap<LocalFileId, ObjectHandle>,
    modified: Option<SystemTime>,
}

/// Owns the object graph decoded from one asset.
pub struct Importer {
    guid: Guid,
    location: RwLock<Location>,
    strategy: Option<Arc<dyn ImportStrategy>>,
    state: Mutex<ImportState>,
    contents: RwLock<Contents>,
    import_count: AtomicUsize,
}

impl Importer {
    pub(crate) fn new(
        guid: Guid,
        path: AssetPath,
        full_path: PathBuf,
        main_object_file_id: LocalFileId,
        strategy: Option<Arc<dyn ImportStrategy>>,
    ) -> Self {
        Self {
            guid,
            location: RwLock::new(Location {
                path,
                full_path,
                main_object_file_id,
            }),
            strategy,
            state: Mutex::new(ImportState::Idle),
            contents: RwLock::new(Contents::default()),
            import_count: AtomicUsize::new(0),
        }
    }

    /// GUID of the asset.
    pub fn guid(&self) -> Guid {
        self.guid
    }

    /// Project-relative path of the asset.
    pub fn path(&self) -> AssetPath {
        self.location.read().path.clone()
    }

    /// Absolute path of the asset file.
    pub fn full_path(&self) -> PathBuf {
        self.location.read().full_path.clone()
    }

    /// Main object declared by the sidecar.
    pub fn main_object_file_id(&self) -> LocalFileId {
        self.location.read().main_object_file_id
    }

    /// Name of the strategy, if the file kind is supported.
    pub fn strategy_name(&self) -> Option<&'static str> {
        self.strategy.as_ref().map(|strategy| strategy.name())
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ImportState {
        self.state.lock().clone()
    }

    /// How many times the decode routine ran.
    pub fn import_count(&self) -> usize {
        self.import_count.load(Ordering::Acquire)
    }

    /// Imports the asset unless that already happened.
    ///
    /// Repeated calls return the cached outcome without decoding again.
    pub fn import(&self, db: &AssetDatabase) -> Result<(), ImportError> {
        if let Some(outcome) = settled(&self.state.lock()) {
            return outcome;
        }

        let _import = db.lock_imports();
        {
            let mut state = self.state.lock();
            match &*state {
                ImportState::Idle => *state = ImportState::Importing,
                // Re-entered through a reference cycle; the allocated objects
                // are already published.
                ImportState::Importing => return Ok(()),
                other => return settled(other).unwrap_or(Ok(())),
            }
        }

        let claim = Claim {
            state: &self.state,
            settled: false,
        };
        let outcome = self.run_import(db);
        claim.settle(&outcome);
        outcome
    }

    /// The designated primary object, importing first if needed.
    pub fn main_asset(&self, db: &AssetDatabase) -> Result<ObjectHandle, ImportError> {
        self.import(db)?;
        self.contents
            .read()
            .main_asset
            .clone()
            .ok_or_else(|| ImportError::NoMainAsset(self.path()))
    }

    /// The object at `file_id`, importing first if needed.
    pub fn object_by_file_id(
        &self,
        db: &AssetDatabase,
        file_id: LocalFileId,
    ) -> Result<ObjectHandle, AssetError> {
        self.import(db)?;
        self.contents
            .read()
            .objects
            .get(&file_id)
            .cloned()
            .ok_or(AssetError::NotFound(NotFound::Object {
                guid: self.guid,
                file_id,
            }))
    }

    /// A snapshot of the owned objects in file id order. Does not import.
    pub fn objects(&self) -> Vec<(LocalFileId, ObjectHandle)> {
        self.contents
            .read()
            .objects
            .iter()
            .map(|(file_id, handle)| (*file_id, handle.clone()))
            .collect()
    }

    /// Returns `true` if `handle` is this importer's main asset.
    pub fn is_main(&self, handle: &ObjectHandle) -> bool {
        self.contents
            .read()
            .main_asset
            .as_ref()
            .is_some_and(|main| main.ptr_eq(handle))
    }

    /// Returns `true` if the file changed on disk since it was imported.
    pub fn is_stale(&self) -> bool {
        if !self.strategy.as_ref().is_some_and(|s| s.reads_file()) {
            return false;
        }
        if !matches!(
            *self.state.lock(),
            ImportState::Imported | ImportState::Failed(_)
        ) {
            return false;
        }
        modified_time(&self.full_path()) != self.contents.read().modified
    }

    /// Hands a new object to this importer so the next save writes it.
    ///
    /// The object receives a fresh local file id and this asset's GUID.
    pub fn adopt(
        &self,
        db: &AssetDatabase,
        handle: &ObjectHandle,
    ) -> Result<LocalFileId, AssetError> {
        self.import(db)?;
        if let Some(owner) = db.guid_of_instance(handle.instance_id()) {
            if owner == self.guid {
                if let Some((file_id, _)) = self
                    .objects()
                    .into_iter()
                    .find(|(_, owned)| owned.ptr_eq(handle))
                {
                    return Ok(file_id);
                }
            }
            return Err(AssetError::AlreadyOwned {
                instance_id: handle.instance_id(),
                guid: owner,
            });
        }

        let file_id = {
            let mut contents = self.contents.write();
            let file_id = LocalFileId::first_free(handle.type_tag(), |candidate| {
                contents.objects.contains_key(&candidate)
            });
            contents.objects.insert(file_id, handle.clone());
            file_id
        };
        {
            let mut object = handle.write();
            let header = object.header_mut();
            header.guid = Some(self.guid);
            header.file_id = file_id;
        }
        db.track_instances(self.guid, std::iter::once(handle));
        log::debug!(
            "'{}' adopted object {} as {}",
            self.path(),
            handle.instance_id(),
            file_id
        );
        Ok(file_id)
    }

    /// Writes the in-memory graph back to the file, then imports it again.
    ///
    /// Objects whose file id and type survive the round trip keep their
    /// identity, so handles taken before the save remain valid.
    pub fn save_and_reimport(&self, db: &AssetDatabase) -> Result<(), ImportError> {
        let strategy = self
            .strategy
            .clone()
            .ok_or_else(|| ImportError::Unsupported(self.path()))?;
        self.import(db)?;

        let _import = db.lock_imports();
        let roots = {
            let contents = self.contents.read();
            let mut roots: Vec<ObjectHandle> = contents.main_asset.iter().cloned().collect();
            let is_main = |handle: &ObjectHandle| {
                contents
                    .main_asset
                    .as_ref()
                    .is_some_and(|main| main.ptr_eq(handle))
            };
            roots.extend(
                contents
                    .objects
                    .values()
                    .filter(|handle| !is_main(*handle))
                    .cloned(),
            );
            roots
        };
        strategy.save(&ImportContext::new(self, db, BTreeMap::new()), &roots)?;
        log::debug!("Saved '{}' ({} roots)", self.path(), roots.len());
        self.reimport(db)
    }

    /// Discards the cached outcome and imports again.
    pub fn reimport(&self, db: &AssetDatabase) -> Result<(), ImportError> {
        let _import = db.lock_imports();
        {
            let mut state = self.state.lock();
            if matches!(*state, ImportState::Importing) {
                return Ok(());
            }
            *state = ImportState::Idle;
        }
        self.import(db)
    }

    /// Installs objects that were just written for this asset.
    pub(crate) fn install(
        &self,
        db: &AssetDatabase,
        main_asset: ObjectHandle,
        objects: Vec<(LocalFileId, ObjectHandle)>,
    ) {
        let _import = db.lock_imports();
        db.track_instances(self.guid, objects.iter().map(|(_, handle)| handle));
        *self.contents.write() = Contents {
            main_asset: Some(main_asset),
            objects: objects.into_iter().collect(),
            modified: modified_time(&self.full_path()),
        };
        *self.state.lock() = ImportState::Imported;
    }

    /// Records allocated objects as owned while their fields are populated.
    pub(crate) fn publish(&self, db: &AssetDatabase, allocation: &Allocation) {
        let mut contents = self.contents.write();
        contents.objects = allocation
            .iter()
            .map(|(file_id, handle)| (file_id, handle.clone()))
            .collect();
        db.track_instances(self.guid, contents.objects.values());
    }

    /// Drops every owned object and forgets the import.
    pub(crate) fn release(&self) {
        *self.contents.write() = Contents::default();
        *self.state.lock() = ImportState::Idle;
    }

    /// Points the importer at the asset's new location after a move.
    ///
    /// Owned objects stay as they are. A cached failure is dropped, since it
    /// may have come from the old location.
    pub(crate) fn relocate(&self, db: &AssetDatabase, path: AssetPath, full_path: PathBuf) {
        let _import = db.lock_imports();
        {
            let mut location = self.location.write();
            if location.path == path && location.full_path == full_path {
                return;
            }
            log::debug!("'{}' moved to '{}'", location.path, path);
            location.path = path;
            location.full_path = full_path;
        }
        self.forget_failure();
    }

    /// Records a new declared main object. An imported asset selects its
    /// main object again on next use.
    pub(crate) fn redeclare_main_object(&self, db: &AssetDatabase, file_id: LocalFileId) {
        let _import = db.lock_imports();
        {
            let mut location = self.location.write();
            if location.main_object_file_id == file_id {
                return;
            }
            location.main_object_file_id = file_id;
        }
        let mut state = self.state.lock();
        if matches!(*state, ImportState::Imported | ImportState::Failed(_)) {
            *state = ImportState::Idle;
        }
    }

    fn forget_failure(&self) {
        let mut state = self.state.lock();
        if matches!(*state, ImportState::Failed(_)) {
            *state = ImportState::Idle;
        }
    }

    fn run_import(&self, db: &AssetDatabase) -> Result<(), ImportError> {
        let Some(strategy) = self.strategy.clone() else {
            return Err(ImportError::Unsupported(self.path()));
        };

        let previous = {
            let mut contents = self.contents.write();
            contents.main_asset = None;
            std::mem::take(&mut contents.objects)
        };
        let cx = ImportContext::new(self, db, previous);
        let modified = if strategy.reads_file() {
            modified_time(cx.full_path())
        } else {
            None
        };
        let outcome = strategy.import(&cx);
        self.import_count.fetch_add(1, Ordering::AcqRel);

        let retained: Vec<_> = match &outcome {
            Ok(asset) => asset
                .objects
                .values()
                .map(|handle| handle.instance_id())
                .collect(),
            Err(_) => Vec::new(),
        };
        db.untrack_instances(
            self.guid,
            cx.previous()
                .values()
                .map(|handle| handle.instance_id())
                .filter(|id| !retained.contains(id)),
        );

        match outcome {
            Ok(asset) => {
                db.track_instances(self.guid, asset.objects.values());
                let count = asset.objects.len();
                *self.contents.write() = Contents {
                    main_asset: asset.main_asset,
                    objects: asset.objects,
                    modified,
                };
                log::debug!(
                    "Imported '{}' with {} ({} objects)",
                    cx.path(),
                    strategy.name(),
                    count
                );
                Ok(())
            }
            Err(err) => {
                let partial = std::mem::take(&mut self.contents.write().objects);
                db.untrack_instances(
                    self.guid,
                    partial.values().map(|handle| handle.instance_id()),
                );
                log::warn!("Failed to import '{}': {}", cx.path(), err);
                Err(err)
            }
        }
    }
}

impl fmt::Debug for Importer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Importer")
            .field("guid", &self.guid)
            .field("path", &self.location.read().path)
            .field("strategy", &self.strategy_name())
            .field("state", &*self.state.lock())
            .finish_non_exhaustive()
    }
}

fn settled(state: &ImportState) -> Option<Result<(), ImportError>> {
    match state {
        ImportState::Imported => Some(Ok(())),
        ImportState::Failed(err) => Some(Err(err.clone())),
        ImportState::Idle | ImportState::Importing => None,
    }
}

fn modified_time(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).and_then(|meta| meta.modified()).ok()
}

/// An import in progress. Dropping it unsettled (the decode unwound) puts
/// the importer back to idle so a later call can retry.
struct Claim<'a> {
    state: &'a Mutex<ImportState>,
    settled: bool,
}

impl Claim<'_> {
    fn settle(mut self, outcome: &Result<(), ImportError>) {
        *self.state.lock() = match outcome {
            Ok(()) => ImportState::Imported,
            Err(err) => ImportState::Failed(err.clone()),
        };
        self.settled = true;
    }
}

impl Drop for Claim<'_> {
    fn drop(&mut self) {
        if !self.settled {
            *self.state.lock() = ImportState::Idle;
        }
    }
}
