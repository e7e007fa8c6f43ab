//! Tree building and bulk operations over an in-memory store

mod common;

use common::{Call, MemoryStore};
use safe::cli::secrets::{import_secrets, set_secret};
use safe::vault::{SecretStore, TreeBuilder, TreeOp, TreeOps};

fn app_store() -> MemoryStore {
    MemoryStore::with_secrets(&[
        ("secret/app/db", &[("password", "hunter2")]),
        ("secret/app/api/key", &[("value", "abc")]),
        ("secret/app/api/cert", &[("pem", "---")]),
        ("secret/other", &[("x", "1")]),
    ])
}

#[tokio::test]
async fn paths_are_preorder_and_complete() {
    let store = app_store();
    let tree = TreeBuilder::new(&store).tree("secret/app").await.unwrap();

    let paths: Vec<String> = tree.paths("/").collect();
    assert_eq!(paths, vec!["secret/app/api/cert", "secret/app/api/key", "secret/app/db"]);
    assert_eq!(tree.leaf_count(), paths.len());
    assert!(paths.iter().all(|p| p.starts_with("secret/app/")));
}

#[tokio::test]
async fn missing_root_is_not_found() {
    let store = app_store();
    let err = TreeBuilder::new(&store).tree("secret/nope").await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn delete_tree_issues_one_delete_per_leaf_plus_root() {
    let store = app_store();
    let leaves: Vec<String> =
        TreeBuilder::new(&store).tree("secret/app").await.unwrap().paths("/").collect();

    let deleted = TreeOps::new(&store).delete_tree("secret/app").await.unwrap();

    assert_eq!(deleted, leaves.len() + 1);
    let mut expected = leaves.clone();
    expected.push("secret/app".to_string());
    assert_eq!(store.deletes(), expected);
    assert_eq!(store.paths(), vec!["secret/other"]);
}

#[tokio::test]
async fn delete_tree_on_a_leaf_deletes_it() {
    let store = app_store();
    let deleted = TreeOps::new(&store).delete_tree("secret/other").await.unwrap();

    assert_eq!(deleted, 2);
    assert_eq!(store.deletes(), vec!["secret/other", "secret/other"]);
    assert!(store.get("secret/other").is_none());
}

#[tokio::test]
async fn delete_tree_stops_at_first_failure_without_rollback() {
    let store = app_store();
    store.fail_delete("secret/app/api/key");

    let err = TreeOps::new(&store).delete_tree("secret/app").await.unwrap_err();
    assert_eq!(err.to_string(), "API 500 Internal Server Error");

    assert_eq!(store.deletes(), vec!["secret/app/api/cert", "secret/app/api/key"]);
    assert!(store.get("secret/app/api/cert").is_none());
    assert!(store.get("secret/app/api/key").is_some());
    assert!(store.get("secret/app/db").is_some());
}

#[tokio::test]
async fn copy_tree_maps_every_leaf_onto_the_new_root() {
    let store = app_store();
    let applied =
        TreeOps::new(&store).move_copy_tree("secret/app", "backup/app", TreeOp::Copy).await.unwrap();

    assert_eq!(applied, 3);
    assert_eq!(
        store.writes(),
        vec!["backup/app/api/cert", "backup/app/api/key", "backup/app/db"]
    );
    assert_eq!(store.get("backup/app/db").unwrap().get("password"), Some("hunter2"));
    assert!(store.get("secret/app/db").is_some());
}

#[tokio::test]
async fn move_tree_includes_root_secret_when_present() {
    let store = MemoryStore::with_secrets(&[
        ("secret/svc", &[("url", "https://svc")]),
        ("secret/svc/token", &[("value", "t")]),
    ]);

    let applied =
        TreeOps::new(&store).move_copy_tree("secret/svc", "archive/svc", TreeOp::Move).await.unwrap();

    assert_eq!(applied, 2);
    assert_eq!(store.paths(), vec!["archive/svc", "archive/svc/token"]);
    assert_eq!(store.get("archive/svc").unwrap().get("url"), Some("https://svc"));
}

#[tokio::test]
async fn destination_replaces_only_the_first_occurrence() {
    let store = MemoryStore::with_secrets(&[("team/x/team", &[("k", "v")])]);

    TreeOps::new(&store).move_copy_tree("team", "crew", TreeOp::Copy).await.unwrap();

    assert!(store.get("crew/x/team").is_some());
    // Reading the namespace root itself is absent, so no extra operation
    assert_eq!(store.writes(), vec!["crew/x/team"]);
}

#[tokio::test]
async fn failed_delete_after_copy_leaves_secret_at_both_paths() {
    let store = MemoryStore::with_secrets(&[("x", &[("k", "v")])]);
    store.fail_delete("x");

    let ops = TreeOps::new(&store);
    let err = ops.move_secret("x", "y").await.unwrap_err();
    assert!(!err.is_not_found());

    assert_eq!(store.read("x").await.unwrap().get("k"), Some("v"));
    assert_eq!(store.read("y").await.unwrap().get("k"), Some("v"));
}

#[tokio::test]
async fn move_tree_aborts_on_first_failed_write() {
    let store = app_store();
    store.fail_write("moved/app/api/key");

    let err = TreeOps::new(&store)
        .move_copy_tree("secret/app", "moved/app", TreeOp::Move)
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "API 500 Internal Server Error");

    // cert moved, key attempted, db untouched
    assert!(store.get("moved/app/api/cert").is_some());
    assert!(store.get("secret/app/api/cert").is_none());
    assert!(store.get("secret/app/api/key").is_some());
    assert!(store.get("secret/app/db").is_some());
    assert!(!store.calls().contains(&Call::Read("secret/app/db".to_string())));
}

#[tokio::test]
async fn copy_of_missing_secret_is_not_found() {
    let store = MemoryStore::new();
    let err = TreeOps::new(&store).copy("nope", "dst").await.unwrap_err();
    assert!(err.is_not_found());
    assert!(store.writes().is_empty());
}

#[tokio::test]
async fn export_then_import_restores_secrets() {
    let source = app_store();
    let data = TreeOps::new(&source).export(&["secret/app".to_string()]).await.unwrap();
    assert_eq!(data.len(), 3);

    let document = serde_json::to_string(&data).unwrap();
    let target = MemoryStore::new();
    let written = import_secrets(&target, &document).await.unwrap();

    assert_eq!(written, 3);
    assert_eq!(target.get("secret/app/api/key").unwrap().get("value"), Some("abc"));
}

#[tokio::test]
async fn import_rejects_invalid_documents() {
    let target = MemoryStore::new();
    assert!(import_secrets(&target, "not json").await.is_err());
    assert!(target.writes().is_empty());
}

#[tokio::test]
async fn set_merges_into_existing_secret() {
    let store = MemoryStore::with_secrets(&[("secret/db", &[("user", "admin")])]);

    set_secret(&store, "secret/db", &["password=s3cret".to_string()], true).await.unwrap();

    let secret = store.get("secret/db").unwrap();
    assert_eq!(secret.get("user"), Some("admin"));
    assert_eq!(secret.get("password"), Some("s3cret"));
}

#[tokio::test]
async fn set_creates_missing_secret() {
    let store = MemoryStore::new();
    set_secret(&store, "secret/new", &["a=1".to_string(), "b=2".to_string()], false)
        .await
        .unwrap();
    assert_eq!(store.get("secret/new").unwrap().len(), 2);
}
