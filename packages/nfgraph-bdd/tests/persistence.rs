//! Graph file round trips

mod common;

use common::*;
use nfgraph_bdd::features::bdd::infrastructure::GRAPH_FILE_VERSION;
use nfgraph_bdd::{Bdd, BddError};
use pretty_assertions::assert_eq;
use tempfile::tempdir;

#[test]
fn test_file_roundtrip() {
    let bdd = build(&forward_or_drop());
    let dir = tempdir().unwrap();
    let path = dir.path().join("nf.bdd.json");

    bdd.serialize(&path).unwrap();
    let loaded = Bdd::deserialize(&path).unwrap();

    assert_eq!(loaded, bdd);
    assert_eq!(loaded.get_id(), bdd.get_id());
    assert_eq!(loaded.to_string(), bdd.to_string());
}

#[test]
fn test_loaded_graph_keeps_allocating() {
    let bdd = build(&forward_or_drop());
    let mut loaded = Bdd::from_json(&bdd.to_json().unwrap()).unwrap();

    let next = loaded.new_id();
    assert_eq!(next, bdd.get_id());
    assert!(loaded.get_node_by_id(next).is_none());
}

#[test]
fn test_newer_file_version_rejected() {
    let bdd = build(&forward_or_drop());
    let mut value: serde_json::Value = serde_json::from_str(&bdd.to_json().unwrap()).unwrap();
    value["version"] = serde_json::json!(GRAPH_FILE_VERSION + 1);

    let dir = tempdir().unwrap();
    let path = dir.path().join("future.json");
    std::fs::write(&path, value.to_string()).unwrap();

    match Bdd::deserialize(&path) {
        Err(BddError::UnsupportedVersion { found, expected }) => {
            assert_eq!(found, GRAPH_FILE_VERSION + 1);
            assert_eq!(expected, GRAPH_FILE_VERSION);
        }
        other => panic!("expected version error, got {:?}", other),
    }
}

#[test]
fn test_corrupted_links_rejected() {
    let bdd = build(&forward_or_drop());
    let mut value: serde_json::Value = serde_json::from_str(&bdd.to_json().unwrap()).unwrap();
    // Detach a non-root node from its parent
    let nodes = value["nodes"].as_array_mut().unwrap();
    let child = nodes.iter_mut().find(|n| !n["prev"].is_null()).unwrap();
    child["prev"] = serde_json::Value::Null;

    let err = Bdd::from_json(&value.to_string()).unwrap_err();
    assert!(matches!(err, BddError::Invariant(_)));
}

#[test]
fn test_missing_file() {
    let dir = tempdir().unwrap();
    let err = Bdd::deserialize(dir.path().join("absent.json")).unwrap_err();
    assert!(matches!(err, BddError::Io(_)));
}
