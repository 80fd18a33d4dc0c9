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

//! The asset database: path and GUID bookkeeping plus importer ownership.

use std::{collections::HashMap, fs, sync::Arc};

use parking_lot::{ReentrantMutex, ReentrantMutexGuard, RwLock};
use tessera_core::{
    serialization::{DocumentWriter, ReferenceResolver},
    AssetPath, Guid, InstanceId, LocalFileId, ObjectHandle, ObjectRef, TypeRegistry,
};
use tessera_data::builtin;

use crate::{
    importer::{DefaultObject, ImportStrategy, Importer, NativeFormat, Resources},
    AssetError, AssetMeta, DatabaseConfig, ImportError, NotFound,
};

#[derive(Default)]
struct PathTable {
    guid_by_path: HashMap<AssetPath, Guid>,
    path_by_guid: HashMap<Guid, AssetPath>,
    main_object_by_guid: HashMap<Guid, LocalFileId>,
}

/// Maps paths and GUIDs to importers and resolves persistent references to
/// live objects, importing documents on demand.
///
/// One database is created per project and passed by reference to whatever
/// needs to load assets. Importers are created lazily, the first time their
/// GUID or path is resolved, and live until [`teardown`](Self::teardown).
pub struct AssetDatabase {
    config: DatabaseConfig,
    types: TypeRegistry,
    strategies: HashMap<String, Arc<dyn ImportStrategy>>,
    paths: RwLock<PathTable>,
    importers: RwLock<HashMap<Guid, Arc<Importer>>>,
    instances: RwLock<HashMap<InstanceId, Guid>>,
    import_lock: ReentrantMutex<()>,
}

impl AssetDatabase {
    /// Creates a database with the built-in object types.
    pub fn new(config: DatabaseConfig) -> Self {
        Self::with_types(config, tessera_data::default_types())
    }

    /// Creates a database with a custom object factory.
    ///
    /// Strategies are set up from the configuration and the built-in
    /// resource sets are registered.
    pub fn with_types(config: DatabaseConfig, types: TypeRegistry) -> Self {
        let mut strategies: HashMap<String, Arc<dyn ImportStrategy>> = HashMap::new();
        let native: Arc<dyn ImportStrategy> = Arc::new(NativeFormat);
        for extension in &config.native_extensions {
            strategies.insert(extension.to_ascii_lowercase(), native.clone());
        }
        for (extension, default) in &config.default_objects {
            strategies.insert(
                extension.to_ascii_lowercase(),
                Arc::new(DefaultObject::new(default.type_tag, default.file_id)),
            );
        }

        let db = Self {
            config,
            types,
            strategies,
            paths: RwLock::new(PathTable::default()),
            importers: RwLock::new(HashMap::new()),
            instances: RwLock::new(HashMap::new()),
            import_lock: ReentrantMutex::new(()),
        };
        db.register_builtins();
        db
    }

    fn register_builtins(&self) {
        for set in builtin::builtin_sets() {
            let path = AssetPath::new(set.path);
            let guid = set.guid;
            self.register_path_guid(path.clone(), guid);
            let importer = Importer::new(
                guid,
                path.clone(),
                path.to_path(&self.config.project_root),
                LocalFileId::NULL,
                Some(Arc::new(Resources::from(set))),
            );
            self.importers.write().insert(guid, Arc::new(importer));
        }
        log::debug!("Registered built-in resources");
    }

    /// The configuration the database was created with.
    pub fn config(&self) -> &DatabaseConfig {
        &self.config
    }

    /// The object factory.
    pub fn types(&self) -> &TypeRegistry {
        &self.types
    }

    /// Routes files with `extension` to `strategy`. Importers that already
    /// exist keep their strategy.
    pub fn register_strategy(&mut self, extension: &str, strategy: Arc<dyn ImportStrategy>) {
        log::debug!("Extension '{}' handled by {}", extension, strategy.name());
        self.strategies.insert(extension.to_ascii_lowercase(), strategy);
    }

    // --- Paths and GUIDs ---

    /// Registers a path/GUID pair, replacing any earlier pairing of either.
    ///
    /// If the GUID already has an importer, it follows the asset to its new
    /// path and keeps the objects it owns.
    pub fn register_path_guid(&self, path: impl Into<AssetPath>, guid: Guid) {
        let path = path.into();
        {
            let mut paths = self.paths.write();
            if let Some(old_guid) = paths.guid_by_path.remove(&path) {
                paths.path_by_guid.remove(&old_guid);
            }
            if let Some(old_path) = paths.path_by_guid.remove(&guid) {
                paths.guid_by_path.remove(&old_path);
            }
            log::debug!("Registered '{}' as {}", path, guid);
            paths.guid_by_path.insert(path.clone(), guid);
            paths.path_by_guid.insert(guid, path.clone());
        }

        let importer = self.importers.read().get(&guid).cloned();
        if let Some(importer) = importer {
            let full_path = path.to_path(&self.config.project_root);
            importer.relocate(self, path, full_path);
        }
    }

    /// Registers a path with its sidecar data.
    pub fn register_meta(&self, path: impl Into<AssetPath>, meta: &AssetMeta) {
        self.register_path_guid(path, meta.guid);
        {
            let mut paths = self.paths.write();
            if meta.main_object_file_id.is_null() {
                paths.main_object_by_guid.remove(&meta.guid);
            } else {
                paths
                    .main_object_by_guid
                    .insert(meta.guid, meta.main_object_file_id);
            }
        }

        let importer = self.importers.read().get(&meta.guid).cloned();
        if let Some(importer) = importer {
            importer.redeclare_main_object(self, meta.main_object_file_id);
        }
    }

    /// The GUID registered for a path.
    pub fn guid_of_path(&self, path: impl Into<AssetPath>) -> Result<Guid, NotFound> {
        let path = path.into();
        self.paths
            .read()
            .guid_by_path
            .get(&path)
            .copied()
            .ok_or(NotFound::Path(path))
    }

    /// The path registered for a GUID.
    pub fn path_of_guid(&self, guid: Guid) -> Result<AssetPath, NotFound> {
        self.paths
            .read()
            .path_by_guid
            .get(&guid)
            .cloned()
            .ok_or(NotFound::Guid(guid))
    }

    /// Every registered pair, sorted by path.
    pub fn registered_paths(&self) -> Vec<(AssetPath, Guid)> {
        let mut pairs: Vec<_> = self
            .paths
            .read()
            .guid_by_path
            .iter()
            .map(|(path, guid)| (path.clone(), *guid))
            .collect();
        pairs.sort();
        pairs
    }

    // --- Importers ---

    /// The importer of a GUID, created on first request.
    pub fn importer_for_guid(&self, guid: Guid) -> Result<Arc<Importer>, NotFound> {
        if let Some(importer) = self.importers.read().get(&guid) {
            return Ok(importer.clone());
        }

        let path = self.path_of_guid(guid)?;
        let main_object_file_id = self
            .paths
            .read()
            .main_object_by_guid
            .get(&guid)
            .copied()
            .unwrap_or_default();
        let strategy = path
            .extension()
            .and_then(|extension| self.strategies.get(&extension.to_ascii_lowercase()))
            .cloned();
        if strategy.is_none() {
            log::debug!("No import strategy for '{}'", path);
        }

        let importer = Arc::new(Importer::new(
            guid,
            path.clone(),
            path.to_path(&self.config.project_root),
            main_object_file_id,
            strategy,
        ));
        Ok(self
            .importers
            .write()
            .entry(guid)
            .or_insert(importer)
            .clone())
    }

    /// The importer of a path, created on first request.
    pub fn importer_at_path(
        &self,
        path: impl Into<AssetPath>,
    ) -> Result<Arc<Importer>, NotFound> {
        let guid = self.guid_of_path(path)?;
        self.importer_for_guid(guid)
    }

    /// Every importer created so far.
    pub fn importers(&self) -> Vec<Arc<Importer>> {
        self.importers.read().values().cloned().collect()
    }

    // --- Loading ---

    /// Imports the asset at `path` if needed and returns its main object.
    pub fn load_main_asset(
        &self,
        path: impl Into<AssetPath>,
    ) -> Result<ObjectHandle, AssetError> {
        let importer = self.importer_at_path(path)?;
        Ok(importer.main_asset(self)?)
    }

    /// Finds the object at `(guid, file_id)`, importing its document on
    /// demand.
    ///
    /// A null file id is the null reference and yields `Ok(None)` without any
    /// lookup.
    pub fn resolve_reference(
        &self,
        guid: Guid,
        file_id: LocalFileId,
    ) -> Result<Option<ObjectHandle>, AssetError> {
        if file_id.is_null() {
            return Ok(None);
        }
        let importer = self.importer_for_guid(guid).inspect_err(|_| {
            log::warn!("Importer not found for GUID {}", guid);
        })?;
        importer
            .object_by_file_id(self, file_id)
            .map(Some)
            .inspect_err(|err| {
                log::warn!(
                    "Object {} of '{}' not found: {}",
                    file_id,
                    importer.path(),
                    err
                );
            })
    }

    /// Writes the importer's graph at `path` back to disk and reimports it.
    pub fn save_and_reimport(&self, path: impl Into<AssetPath>) -> Result<(), AssetError> {
        let importer = self.importer_at_path(path)?;
        Ok(importer.save_and_reimport(self)?)
    }

    /// Reimports every asset whose file changed since its last import.
    ///
    /// Returns the path and outcome of each reimport.
    pub fn refresh(&self) -> Vec<(AssetPath, Result<(), ImportError>)> {
        let stale: Vec<_> = self
            .importers()
            .into_iter()
            .filter(|importer| importer.is_stale())
            .collect();
        stale
            .into_iter()
            .map(|importer| {
                let outcome = importer.reimport(self);
                match &outcome {
                    Ok(()) => log::info!("Reimported '{}'", importer.path()),
                    Err(err) => log::warn!("Reimport of '{}' failed: {}", importer.path(), err),
                }
                (importer.path(), outcome)
            })
            .collect()
    }

    // --- Ownership ---

    /// The GUID of the document owning an object.
    pub fn guid_of_instance(&self, instance_id: InstanceId) -> Option<Guid> {
        self.instances.read().get(&instance_id).copied()
    }

    /// The path of the document owning an object.
    pub fn asset_path_of(&self, handle: &ObjectHandle) -> Option<AssetPath> {
        let guid = self.guid_of_instance(handle.instance_id())?;
        self.path_of_guid(guid).ok()
    }

    /// Returns `true` if the object is the main asset of its document.
    pub fn is_main_asset(&self, handle: &ObjectHandle) -> bool {
        let Some(guid) = self.guid_of_instance(handle.instance_id()) else {
            return false;
        };
        let importer = self.importers.read().get(&guid).cloned();
        importer.is_some_and(|importer| importer.is_main(handle))
    }

    /// Saves a new object graph as an asset at `path`.
    ///
    /// The graph is written under a fresh GUID together with its sidecar,
    /// the pair is registered and the written objects become owned by the
    /// new importer, with `object` as its main asset.
    pub fn create_asset(
        &self,
        object: &ObjectHandle,
        path: impl Into<AssetPath>,
    ) -> Result<Guid, AssetError> {
        let path = path.into();
        if self.guid_of_path(&path).is_ok() {
            return Err(AssetError::AlreadyRegistered(path));
        }
        if let Some(guid) = self.guid_of_instance(object.instance_id()) {
            return Err(AssetError::AlreadyOwned {
                instance_id: object.instance_id(),
                guid,
            });
        }

        let guid = Guid::new();
        let written = DocumentWriter::new(&self.types)
            .with_guid(guid)
            .write(std::slice::from_ref(object))
            .map_err(|source| ImportError::Write {
                path: path.clone(),
                source,
            })?;

        let full_path = path.to_path(&self.config.project_root);
        let write_error = |source: std::io::Error| AssetError::Io {
            path: full_path.clone(),
            source,
        };
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).map_err(write_error)?;
        }
        fs::write(&full_path, written.to_text()).map_err(write_error)?;

        let mut meta = AssetMeta::new(guid);
        if let Some((file_id, _)) = written.objects.first() {
            meta.main_object_file_id = *file_id;
        }
        meta.write(&full_path).map_err(write_error)?;
        self.register_meta(&path, &meta);

        let importer = self.importer_for_guid(guid)?;
        importer.install(self, object.clone(), written.objects);
        log::info!("Created asset '{}' ({})", path, guid);
        Ok(guid)
    }

    /// Releases every importer and clears all maps.
    ///
    /// Objects stay alive only while a caller still holds a handle to them;
    /// every [`ObjectPtr`](tessera_core::ObjectPtr) whose target was released
    /// reads as null afterwards. Exclusive access guarantees no import is in
    /// flight.
    pub fn teardown(&mut self) {
        let importers = std::mem::take(self.importers.get_mut());
        for importer in importers.values() {
            importer.release();
        }
        self.instances.get_mut().clear();
        *self.paths.get_mut() = PathTable::default();
        log::info!(
            "Asset database torn down ({} importers released)",
            importers.len()
        );
    }

    // --- Crate internals ---

    pub(crate) fn lock_imports(&self) -> ReentrantMutexGuard<'_, ()> {
        self.import_lock.lock()
    }

    pub(crate) fn track_instances<'h>(
        &self,
        guid: Guid,
        handles: impl IntoIterator<Item = &'h ObjectHandle>,
    ) {
        let mut instances = self.instances.write();
        for handle in handles {
            instances.insert(handle.instance_id(), guid);
        }
    }

    pub(crate) fn untrack_instances(
        &self,
        guid: Guid,
        instance_ids: impl IntoIterator<Item = InstanceId>,
    ) {
        let mut instances = self.instances.write();
        for instance_id in instance_ids {
            if instances.get(&instance_id) == Some(&guid) {
                instances.remove(&instance_id);
            }
        }
    }
}

impl ReferenceResolver for AssetDatabase {
    fn resolve(&self, reference: ObjectRef) -> Option<ObjectHandle> {
        let guid = reference.guid?;
        self.resolve_reference(guid, reference.file_id)
            .ok()
            .flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_data::{
        builtin::{BUILTIN_EXTRA_GUID, DEFAULT_MATERIAL_FILE_ID, DEFAULT_RESOURCES_GUID},
        objects::{Material, Mesh},
    };

    #[test]
    fn test_register_path_guid_keeps_bijection() {
        let db = AssetDatabase::new(DatabaseConfig::default());
        let g1 = Guid::from_path_v5("g1");
        let g2 = Guid::from_path_v5("g2");

        db.register_path_guid("Assets/a.png", g1);
        assert_eq!(db.guid_of_path("Assets/a.png"), Ok(g1));
        assert_eq!(db.path_of_guid(g1), Ok(AssetPath::new("Assets/a.png")));
        assert_eq!(
            db.guid_of_path("Assets/missing.png"),
            Err(NotFound::Path(AssetPath::new("Assets/missing.png")))
        );

        // Same path, new GUID: the old GUID loses its path.
        db.register_path_guid("Assets/a.png", g2);
        assert_eq!(db.guid_of_path("Assets/a.png"), Ok(g2));
        assert_eq!(db.path_of_guid(g1), Err(NotFound::Guid(g1)));

        // Same GUID, new path: the old path loses its GUID.
        db.register_path_guid("Assets/b.png", g2);
        assert!(db.guid_of_path("Assets/a.png").is_err());
        assert_eq!(db.path_of_guid(g2), Ok(AssetPath::new("Assets/b.png")));
    }

    #[test]
    fn test_paths_are_normalised_on_registration() {
        let db = AssetDatabase::new(DatabaseConfig::default());
        let guid = Guid::from_path_v5("tex");
        db.register_path_guid("Assets\\Textures\\", guid);
        assert_eq!(db.guid_of_path("Assets/Textures"), Ok(guid));
    }

    #[test]
    fn test_builtin_resources_resolve() {
        let db = AssetDatabase::new(DatabaseConfig::default());

        let cube = db
            .resolve_reference(DEFAULT_RESOURCES_GUID, LocalFileId(10202))
            .unwrap()
            .unwrap();
        assert_eq!(cube.downcast_ref::<Mesh>().unwrap().name, "Cube");
        assert_eq!(
            db.guid_of_instance(cube.instance_id()),
            Some(DEFAULT_RESOURCES_GUID)
        );
        assert!(!db.is_main_asset(&cube));

        let material = db
            .resolve_reference(BUILTIN_EXTRA_GUID, DEFAULT_MATERIAL_FILE_ID)
            .unwrap()
            .unwrap();
        assert_eq!(
            material.downcast_ref::<Material>().unwrap().name,
            "Default-Material"
        );

        let importer = db.importer_for_guid(BUILTIN_EXTRA_GUID).unwrap();
        assert!(matches!(
            importer.main_asset(&db),
            Err(ImportError::NoMainAsset(_))
        ));
    }

    #[test]
    fn test_null_file_id_never_looks_up() {
        let db = AssetDatabase::new(DatabaseConfig::default());
        let unknown = Guid::from_path_v5("nowhere");
        assert!(matches!(
            db.resolve_reference(unknown, LocalFileId::NULL),
            Ok(None)
        ));
        assert!(matches!(
            db.resolve_reference(unknown, LocalFileId(1)),
            Err(AssetError::NotFound(NotFound::Guid(_)))
        ));
    }

    #[test]
    fn test_missing_object_is_not_found() {
        let db = AssetDatabase::new(DatabaseConfig::default());
        assert!(matches!(
            db.resolve_reference(DEFAULT_RESOURCES_GUID, LocalFileId(99)),
            Err(AssetError::NotFound(NotFound::Object { .. }))
        ));
    }
}
