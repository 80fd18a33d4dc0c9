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

mod common;

use std::{
    fs::{self, File},
    time::{Duration, SystemTime},
};

use anyhow::Result;
use common::{guid_of, Project, PLAYER, ROCK};
use tessera_core::{serialization::DocumentError, LocalFileId, ObjectHandle};
use tessera_data::{
    builtin::DEFAULT_RESOURCES_GUID,
    math::{Color, Vector3},
    objects::{GameObject, Material, Mesh, MeshFilter, Prefab, Transform},
};
use tessera_io::{
    scan_project, AssetDatabase, AssetError, AssetMeta, DatabaseConfig, ImportError, ImportState,
    NotFound,
};

fn component<T: tessera_core::Object>(game_object: &ObjectHandle) -> ObjectHandle {
    game_object
        .downcast_ref::<GameObject>()
        .unwrap()
        .component::<T>()
        .unwrap()
}

#[test]
fn test_scan_registers_sidecars_and_reports_missing_ones() -> Result<()> {
    // --- 1. ARRANGE ---
    let project = Project::new()?.with_player()?;
    project.write("Assets/a.png", "not really a png")?;
    project.write("Assets/.hidden.asset", "ignored")?;

    // --- 2. ACT ---
    let db = AssetDatabase::new(project.config());
    let report = scan_project(&db);

    // --- 3. ASSERT ---
    assert_eq!(report.registered.len(), 2);
    assert_eq!(report.missing_meta.len(), 1);
    assert_eq!(report.missing_meta[0].as_str(), "Assets/a.png");
    assert_eq!(db.guid_of_path(PLAYER)?, guid_of(PLAYER));
    assert_eq!(db.path_of_guid(guid_of(ROCK))?.as_str(), ROCK);
    assert_eq!(
        db.guid_of_path("Assets/a.png"),
        Err(NotFound::Path("Assets/a.png".into()))
    );
    Ok(())
}

#[test]
fn test_registered_pairs_are_a_bijection() -> Result<()> {
    let project = Project::new()?.with_player()?;
    let db = project.database();

    for (path, guid) in db.registered_paths() {
        assert_eq!(db.path_of_guid(guid)?, path);
        assert_eq!(db.guid_of_path(&path)?, guid);
    }
    Ok(())
}

#[test]
fn test_main_asset_defaults_to_first_object() -> Result<()> {
    let project = Project::new()?;
    project.write_asset(
        "Assets/Pair.asset",
        0,
        "--- !u!43 &7\nMesh:\n  m_Name: first\n--- !u!43 &9\nMesh:\n  m_Name: second\n",
    )?;
    let db = project.database();

    let main = db.load_main_asset("Assets/Pair.asset")?;

    assert_eq!(main.read().header().file_id, LocalFileId(7));
    // The main asset takes the file's name.
    assert_eq!(main.read().name(), "Pair");
    Ok(())
}

#[test]
fn test_declared_main_object_is_honoured() -> Result<()> {
    let project = Project::new()?;
    project.write_asset(
        "Assets/Pair.asset",
        9,
        "--- !u!43 &7\nMesh:\n  m_Name: first\n--- !u!43 &9\nMesh:\n  m_Name: second\n",
    )?;
    project.write_asset(
        "Assets/Broken.asset",
        11,
        "--- !u!43 &7\nMesh:\n  m_Name: only\n",
    )?;
    let db = project.database();

    let main = db.load_main_asset("Assets/Pair.asset")?;
    assert_eq!(main.read().header().file_id, LocalFileId(9));

    assert!(matches!(
        db.load_main_asset("Assets/Broken.asset"),
        Err(AssetError::Import(ImportError::MissingMainObject { .. }))
    ));
    Ok(())
}

#[test]
fn test_main_asset_is_memoized() -> Result<()> {
    let project = Project::new()?.with_player()?;
    let db = project.database();
    let importer = db.importer_at_path(ROCK)?;

    let first = importer.main_asset(&db)?;
    let second = importer.main_asset(&db)?;
    let by_id = importer.object_by_file_id(&db, LocalFileId(5))?;

    assert!(first.ptr_eq(&second));
    assert!(first.ptr_eq(&by_id));
    assert_eq!(importer.import_count(), 1);
    assert!(db.is_main_asset(&first));
    assert_eq!(db.asset_path_of(&first).unwrap().as_str(), ROCK);
    Ok(())
}

#[test]
fn test_moved_asset_keeps_its_importer_and_objects() -> Result<()> {
    // --- 1. ARRANGE ---
    let project = Project::new()?.with_player()?;
    let db = project.database();
    let rock = db.load_main_asset(ROCK)?;

    // --- 2. ACT ---
    let root = project.root();
    fs::rename(root.join(ROCK), root.join("Assets/Moved.asset"))?;
    fs::rename(
        root.join("Assets/Rock.asset.meta"),
        root.join("Assets/Moved.asset.meta"),
    )?;
    scan_project(&db);

    // --- 3. ASSERT ---
    let importer = db.importer_at_path("Assets/Moved.asset")?;
    assert_eq!(importer.guid(), guid_of(ROCK));
    assert_eq!(importer.path().as_str(), "Assets/Moved.asset");
    assert_eq!(importer.full_path(), root.join("Assets/Moved.asset"));
    assert!(db.guid_of_path(ROCK).is_err());
    assert_eq!(db.asset_path_of(&rock).unwrap().as_str(), "Assets/Moved.asset");

    importer.reimport(&db)?;
    let moved = db.load_main_asset("Assets/Moved.asset")?;
    assert!(moved.ptr_eq(&rock));
    assert_eq!(moved.read().name(), "Moved");
    assert_eq!(importer.import_count(), 2);
    Ok(())
}

#[test]
fn test_redeclared_main_object_is_selected_again() -> Result<()> {
    let project = Project::new()?;
    let path = "Assets/Pair.asset";
    let text = "--- !u!43 &7\nMesh:\n  m_Name: first\n--- !u!43 &9\nMesh:\n  m_Name: second\n";
    project.write_asset(path, 0, text)?;
    let db = project.database();
    let importer = db.importer_at_path(path)?;
    let second = importer.object_by_file_id(&db, LocalFileId(9))?;
    assert_eq!(db.load_main_asset(path)?.read().header().file_id, LocalFileId(7));

    project.write_asset(path, 9, text)?;
    scan_project(&db);

    let main = db.load_main_asset(path)?;
    assert!(main.ptr_eq(&second));
    assert_eq!(importer.main_object_file_id(), LocalFileId(9));
    assert!(db.is_main_asset(&second));
    Ok(())
}

#[test]
fn test_prefab_main_object_indexes_its_document() -> Result<()> {
    let project = Project::new()?;
    project.write_asset(
        "Assets/Crate.prefab",
        0,
        "--- !u!1001 &100100000
Prefab:
  m_ParentPrefab: {fileID: 0}
  m_RootGameObject: {fileID: 100000}
  m_IsPrefabParent: 1
--- !u!1 &100000
GameObject:
  m_Name: Crate
  m_Component: []
",
    )?;
    let db = project.database();
    let importer = db.importer_at_path("Assets/Crate.prefab")?;

    let main = importer.main_asset(&db)?;
    let prefab = main.downcast_ref::<Prefab>().unwrap();

    assert_eq!(prefab.objects.len(), 2);
    let root = importer.object_by_file_id(&db, LocalFileId(100000))?;
    assert!(prefab.object(LocalFileId(100000)).unwrap().ptr_eq(&root));
    assert!(prefab.root_game_object.points_to(&root));
    assert!(prefab.object(LocalFileId(42)).is_none());
    Ok(())
}

#[test]
fn test_cross_document_reference_is_the_same_instance() -> Result<()> {
    // --- 1. ARRANGE ---
    let project = Project::new()?.with_player()?;
    let db = project.database();

    // --- 2. ACT ---
    let player = db.load_main_asset(PLAYER)?;
    let filter = component::<MeshFilter>(&player);
    let mesh = filter.downcast_ref::<MeshFilter>().unwrap().mesh.get().unwrap();

    // --- 3. ASSERT ---
    let direct = db
        .importer_for_guid(guid_of(ROCK))?
        .object_by_file_id(&db, LocalFileId(5))?;
    let resolved = db.resolve_reference(guid_of(ROCK), LocalFileId(5))?.unwrap();
    assert!(mesh.ptr_eq(&direct));
    assert!(mesh.ptr_eq(&resolved));
    assert_eq!(mesh.downcast_ref::<Mesh>().unwrap().indices, vec![0, 1, 2]);

    let transform = component::<Transform>(&player);
    let transform = transform.downcast_ref::<Transform>().unwrap();
    assert_eq!(transform.local_position, Vector3::new(1.0, 2.0, 3.0));
    assert!(transform.game_object.points_to(&player));
    assert!(transform.father.is_null());

    assert_eq!(db.guid_of_instance(player.instance_id()), Some(guid_of(PLAYER)));
    Ok(())
}

#[test]
fn test_reference_cycle_between_documents() -> Result<()> {
    let project = Project::new()?;
    let ship = guid_of("Assets/Ship.prefab");
    let hull = guid_of("Assets/Hull.prefab");
    project.write_asset(
        "Assets/Ship.prefab",
        0,
        &format!(
            "--- !u!1 &1\nGameObject:\n  m_Component:\n  - component: {{fileID: 4, guid: {hull}, type: 2}}\n  m_Name: Ship\n"
        ),
    )?;
    project.write_asset(
        "Assets/Hull.prefab",
        0,
        &format!("--- !u!4 &4\nTransform:\n  m_GameObject: {{fileID: 1, guid: {ship}, type: 2}}\n"),
    )?;
    let db = project.database();

    let ship_object = db.load_main_asset("Assets/Ship.prefab")?;
    let hull_transform = component::<Transform>(&ship_object);

    assert!(hull_transform
        .downcast_ref::<Transform>()
        .unwrap()
        .game_object
        .points_to(&ship_object));
    assert!(hull_transform.ptr_eq(&db.load_main_asset("Assets/Hull.prefab")?));
    assert_eq!(db.importer_for_guid(ship)?.import_count(), 1);
    assert_eq!(db.importer_for_guid(hull)?.import_count(), 1);
    Ok(())
}

#[test]
fn test_builtin_mesh_reference_resolves() -> Result<()> {
    let project = Project::new()?;
    project.write_asset(
        "Assets/Box.prefab",
        0,
        &format!(
            "--- !u!33 &3300000\nMeshFilter:\n  m_GameObject: {{fileID: 0}}\n  m_Mesh: {{fileID: 10202, guid: {DEFAULT_RESOURCES_GUID}, type: 2}}\n"
        ),
    )?;
    let db = project.database();

    let filter = db.load_main_asset("Assets/Box.prefab")?;
    let filter = filter.downcast_ref::<MeshFilter>().unwrap();

    assert!(filter.game_object.is_null());
    let cube = filter.mesh.get().unwrap();
    assert_eq!(cube.downcast_ref::<Mesh>().unwrap().name, "Cube");
    Ok(())
}

#[test]
fn test_unresolvable_reference_reads_as_null() -> Result<()> {
    let project = Project::new()?;
    let missing = guid_of("Assets/Gone.asset");
    project.write_asset(
        "Assets/Box.prefab",
        0,
        &format!("--- !u!33 &1\nMeshFilter:\n  m_Mesh: {{fileID: 5, guid: {missing}, type: 2}}\n"),
    )?;
    let db = project.database();

    let filter = db.load_main_asset("Assets/Box.prefab")?;
    assert!(filter.downcast_ref::<MeshFilter>().unwrap().mesh.is_null());
    Ok(())
}

#[test]
fn test_save_and_reimport_keeps_identity_and_values() -> Result<()> {
    // --- 1. ARRANGE ---
    let project = Project::new()?.with_player()?;
    let db = project.database();
    let player = db.load_main_asset(PLAYER)?;
    let transform = component::<Transform>(&player);
    transform.downcast_mut::<Transform>().unwrap().local_position = Vector3::new(-4.0, 0.5, 8.0);
    player.downcast_mut::<GameObject>().unwrap().layer = 3;

    // --- 2. ACT ---
    db.save_and_reimport(PLAYER)?;

    // --- 3. ASSERT ---
    let text = project.read(PLAYER)?;
    assert!(text.starts_with("%YAML 1.1\n%TAG !u! tag:unity3d.com,2011:\n--- !u!1 &100000\n"));
    assert!(text.contains("  m_LocalPosition: {x: -4, y: 0.5, z: 8}\n"));
    assert!(text.contains(&format!(
        "  m_Mesh: {{fileID: 5, guid: {}, type: 2}}\n",
        guid_of(ROCK)
    )));

    let importer = db.importer_at_path(PLAYER)?;
    assert_eq!(importer.import_count(), 2);
    let reloaded = importer.main_asset(&db)?;
    assert!(reloaded.ptr_eq(&player));
    assert!(component::<Transform>(&reloaded).ptr_eq(&transform));
    assert_eq!(
        transform.downcast_ref::<Transform>().unwrap().local_position,
        Vector3::new(-4.0, 0.5, 8.0)
    );
    assert_eq!(reloaded.downcast_ref::<GameObject>().unwrap().layer, 3);
    Ok(())
}

#[test]
fn test_adopted_object_is_saved() -> Result<()> {
    let project = Project::new()?.with_player()?;
    let db = project.database();
    let importer = db.importer_at_path(ROCK)?;

    let pebble = ObjectHandle::new(Mesh::new("Pebble"));
    let file_id = importer.adopt(&db, &pebble)?;
    importer.save_and_reimport(&db)?;

    assert_eq!(file_id, LocalFileId(4_300_000));
    assert!(project.read(ROCK)?.contains("--- !u!43 &4300000\nMesh:\n  m_Name: Pebble\n"));
    assert!(importer.object_by_file_id(&db, file_id)?.ptr_eq(&pebble));
    assert_eq!(db.guid_of_instance(pebble.instance_id()), Some(guid_of(ROCK)));
    Ok(())
}

#[test]
fn test_create_asset_writes_document_and_sidecar() -> Result<()> {
    // --- 1. ARRANGE ---
    let project = Project::new()?;
    let db = AssetDatabase::new(project.config());
    let mut material = Material::new("Crimson", "Standard");
    material
        .colors
        .insert("_Color".to_string(), Color::new(0.8, 0.1, 0.1, 1.0));
    let material = ObjectHandle::new(material);

    // --- 2. ACT ---
    let guid = db.create_asset(&material, "Assets/Materials/Red.asset")?;

    // --- 3. ASSERT ---
    assert_eq!(db.guid_of_path("Assets/Materials/Red.asset")?, guid);
    assert!(db.is_main_asset(&material));
    assert_eq!(material.read().header().guid, Some(guid));
    assert!(matches!(
        db.create_asset(&material, "Assets/Materials/Other.asset"),
        Err(AssetError::AlreadyOwned { .. })
    ));

    let meta = AssetMeta::read(&project.root().join("Assets/Materials/Red.asset"))?;
    assert_eq!(meta.guid, guid);
    assert_eq!(meta.main_object_file_id, LocalFileId(2_100_000));

    // A fresh database over the same project finds it through the sidecar.
    let reopened = project.database();
    let loaded = reopened.load_main_asset("Assets/Materials/Red.asset")?;
    let loaded = loaded.downcast_ref::<Material>().unwrap();
    assert_eq!(loaded.name, "Red");
    assert_eq!(loaded.shader, "Standard");
    assert_eq!(loaded.colors["_Color"], Color::new(0.8, 0.1, 0.1, 1.0));
    Ok(())
}

#[test]
fn test_mat_files_synthesise_a_default_material() -> Result<()> {
    let project = Project::new()?;
    let guid = project.write_asset("Assets/Red.mat", 0, "binary garbage \u{1}\u{2}")?;
    let db = project.database();

    let material = db.load_main_asset("Assets/Red.mat")?;

    assert_eq!(material.read().header().file_id, LocalFileId(2_100_000));
    assert_eq!(material.downcast_ref::<Material>().unwrap().name, "Red");
    let resolved = db.resolve_reference(guid, LocalFileId(2_100_000))?.unwrap();
    assert!(resolved.ptr_eq(&material));
    assert!(matches!(
        db.save_and_reimport("Assets/Red.mat"),
        Err(AssetError::Import(ImportError::ReadOnly(_)))
    ));
    Ok(())
}

#[test]
fn test_failed_import_is_cached_until_reimport() -> Result<()> {
    // --- 1. ARRANGE ---
    let project = Project::new()?;
    project.write_asset(
        "Assets/Bad.prefab",
        0,
        "--- !u!1 &1\nGameObject:\n  m_Layer: [1, 2]\n  m_Name: Bad\n",
    )?;
    let db = project.database();
    let importer = db.importer_at_path("Assets/Bad.prefab")?;

    // --- 2. ACT ---
    let first = importer.main_asset(&db);
    let second = importer.main_asset(&db);

    // --- 3. ASSERT ---
    match first {
        Err(ImportError::Document {
            source: DocumentError::Parse(err),
            ..
        }) => {
            assert_eq!(err.path, "m_Layer");
            assert_eq!(err.document, "Assets/Bad.prefab");
        }
        other => panic!("expected a parse failure, got {other:?}"),
    }
    assert!(second.is_err());
    assert_eq!(importer.import_count(), 1);
    assert!(matches!(importer.state(), ImportState::Failed(_)));
    assert!(importer.objects().is_empty());

    project.write(
        "Assets/Bad.prefab",
        "--- !u!1 &1\nGameObject:\n  m_Layer: 2\n  m_Name: Bad\n",
    )?;
    importer.reimport(&db)?;
    let main = importer.main_asset(&db)?;
    assert_eq!(main.downcast_ref::<GameObject>().unwrap().layer, 2);
    assert_eq!(importer.import_count(), 2);
    Ok(())
}

#[test]
fn test_unknown_type_fails_unless_skipped() -> Result<()> {
    let project = Project::new()?;
    let text = "--- !u!999 &1\nMystery:\n  value: 1\n--- !u!43 &2\nMesh:\n  m_Name: kept\n";
    project.write_asset("Assets/Odd.asset", 0, text)?;

    let strict = project.database();
    assert!(matches!(
        strict.load_main_asset("Assets/Odd.asset"),
        Err(AssetError::Import(ImportError::Document {
            source: DocumentError::UnknownType { .. },
            ..
        }))
    ));

    let lenient = AssetDatabase::new(DatabaseConfig {
        skip_unknown_types: true,
        ..project.config()
    });
    scan_project(&lenient);
    let main = lenient.load_main_asset("Assets/Odd.asset")?;
    assert_eq!(main.read().header().file_id, LocalFileId(2));
    Ok(())
}

#[test]
fn test_empty_document_is_an_import_error() -> Result<()> {
    let project = Project::new()?;
    project.write_asset("Assets/Empty.asset", 0, "%YAML 1.1\n")?;
    let db = project.database();

    assert!(matches!(
        db.load_main_asset("Assets/Empty.asset"),
        Err(AssetError::Import(ImportError::Empty(_)))
    ));
    Ok(())
}

#[test]
fn test_refresh_reimports_changed_files() -> Result<()> {
    let project = Project::new()?.with_player()?;
    let db = project.database();
    let rock = db.load_main_asset(ROCK)?;
    db.load_main_asset(PLAYER)?;
    assert!(db.refresh().is_empty());

    project.write(ROCK, &common::ROCK_DOCUMENT.replace("[0, 1, 2]", "[2, 1, 0]"))?;
    File::options()
        .write(true)
        .open(project.root().join(ROCK))?
        .set_modified(SystemTime::now() + Duration::from_secs(60))?;

    let refreshed = db.refresh();
    assert_eq!(refreshed.len(), 1);
    assert_eq!(refreshed[0].0.as_str(), ROCK);
    assert!(refreshed[0].1.is_ok());
    assert_eq!(rock.downcast_ref::<Mesh>().unwrap().indices, vec![2, 1, 0]);
    Ok(())
}

#[test]
fn test_teardown_releases_objects() -> Result<()> {
    // --- 1. ARRANGE ---
    let project = Project::new()?.with_player()?;
    let mut db = project.database();
    let player = db.load_main_asset(PLAYER)?;
    let transform_ptr = component::<Transform>(&player).downgrade();
    assert!(!transform_ptr.is_null());

    // --- 2. ACT ---
    db.teardown();

    // --- 3. ASSERT ---
    // The caller's handle keeps the game object alive; everything it only
    // pointed at is gone.
    assert!(transform_ptr.is_null());
    assert_eq!(
        player.downcast_ref::<GameObject>().unwrap().components().count(),
        0
    );
    assert!(db.importers().is_empty());
    assert!(db.guid_of_path(PLAYER).is_err());
    assert!(db.guid_of_instance(player.instance_id()).is_none());
    assert!(matches!(
        db.resolve_reference(DEFAULT_RESOURCES_GUID, LocalFileId(10202)),
        Err(AssetError::NotFound(NotFound::Guid(_)))
    ));
    Ok(())
}
