// tests/persistence.rs
use map_polygon_editor::engine_lib::{MemoryStorage, PolygonId, PolygonPatch, PolygonStore, Storage};
use map_polygon_editor::{EditorConfig, RingDefect, StoreError, Vertex};

fn triangle() -> Vec<Vertex> {
    vec![Vertex::new(0.0, 0.0), Vertex::new(6.0, 0.0), Vertex::new(0.0, 2.0)]
}

#[test]
fn collection_survives_a_reload() {
    let config = EditorConfig::default();
    let mut store = PolygonStore::new(MemoryStorage::new(), &config);
    let first = store.add(triangle(), "Field").unwrap();
    let second = store.add(triangle(), "Pond").unwrap();
    store.update(second.id(), PolygonPatch::rename("Big pond")).unwrap();
    store.select(Some(first.id())).unwrap();

    let raw = store.storage().get(&config.polygons_key).unwrap().to_owned();
    let reloaded = PolygonStore::load(
        MemoryStorage::new().with_entry(&config.polygons_key, &raw),
        &config,
    );

    assert_eq!(reloaded.list(), store.list());
    assert_eq!(reloaded.list()[1].name, "Big pond");
    assert_eq!(reloaded.list()[0].created_at(), first.created_at());
    // Selection is session state only.
    assert!(reloaded.selected().is_none());
    assert_eq!(reloaded.next_default_name(), "Polygon 3");
}

#[test]
fn stored_records_use_camel_case_keys() {
    let config = EditorConfig::default();
    let mut store = PolygonStore::new(MemoryStorage::new(), &config);
    store.add(triangle(), "Field").unwrap();

    let raw = store.storage().get(&config.polygons_key).unwrap();
    let value: serde_json::Value = serde_json::from_str(raw).unwrap();
    let record = &value[0];
    assert!(record["id"].is_string());
    assert_eq!(record["name"], "Field");
    assert!(record["createdAt"].is_string());
    assert_eq!(record["points"][1]["x"], 6.0);
}

#[test]
fn malformed_data_falls_back_to_empty() {
    let config = EditorConfig::default();
    for raw in ["not json", "{\"id\": 1}", "[{\"id\":\"a\",\"name\":\"x\",\"points\":[]}]"] {
        let store = PolygonStore::load(
            MemoryStorage::new().with_entry(&config.polygons_key, raw),
            &config,
        );
        assert!(store.is_empty(), "{raw} should not load");
        assert!(!store.is_dirty());
    }
}

#[test]
fn failed_write_keeps_memory_and_retries() {
    let config = EditorConfig::default();
    let mut store = PolygonStore::new(MemoryStorage::new(), &config);
    store.storage_mut().set_failing(true);

    let err = store.add(triangle(), "Field").unwrap_err();
    assert!(err.is_persistence());
    assert_eq!(store.len(), 1);
    assert!(store.is_dirty());

    store.storage_mut().set_failing(false);
    store.flush().unwrap();
    assert!(!store.is_dirty());
    assert!(store.storage().get(&config.polygons_key).is_some());
}

#[cfg(not(target_arch = "wasm32"))]
#[test]
fn file_storage_round_trip() {
    use map_polygon_editor::engine_lib::storage::FileStorage;

    let dir = std::env::temp_dir().join(format!("map-polygon-editor-it-{}", uuid::Uuid::new_v4()));
    let config = EditorConfig::default();

    let mut store = PolygonStore::new(FileStorage::open(&dir).unwrap(), &config);
    let polygon = store.add(triangle(), "Field").unwrap();
    assert!(store.storage().read_all(&config.polygons_key).unwrap().is_some());

    let reloaded = PolygonStore::load(FileStorage::open(&dir).unwrap(), &config);
    assert_eq!(reloaded.get(polygon.id()), Some(&polygon));

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn non_finite_ring_is_refused_and_reload_keeps_everything() {
    let config = EditorConfig::default();
    let mut store = PolygonStore::new(MemoryStorage::new(), &config);
    store.add(triangle(), "Field").unwrap();

    let bad = vec![Vertex::new(0.0, 0.0), Vertex::new(f64::INFINITY, 0.0), Vertex::new(0.0, 1.0)];
    let err = store.add(bad, "Bad").unwrap_err();
    assert!(matches!(err, StoreError::InvalidGeometry(RingDefect::NonFinite(1))));

    let raw = store.storage().get(&config.polygons_key).unwrap().to_owned();
    let reloaded = PolygonStore::load(
        MemoryStorage::new().with_entry(&config.polygons_key, &raw),
        &config,
    );
    assert_eq!(reloaded.list(), store.list());
}

#[test]
fn duplicate_ids_discard_the_payload() {
    let config = EditorConfig::default();
    let raw = r#"[
        {"id":"dup","points":[{"x":0,"y":0},{"x":1,"y":0},{"x":0,"y":1}],"name":"a","createdAt":"2024-01-01T00:00:00Z"},
        {"id":"dup","points":[{"x":0,"y":0},{"x":2,"y":0},{"x":0,"y":2}],"name":"b","createdAt":"2024-01-02T00:00:00Z"}
    ]"#;
    let store = PolygonStore::load(
        MemoryStorage::new().with_entry(&config.polygons_key, raw),
        &config,
    );
    assert!(store.is_empty());
    assert!(store.get(&PolygonId::from("dup")).is_none());
}
