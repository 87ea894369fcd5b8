//! Driver behaviour against the in-memory gateway
//!
//! Covers the end-to-end tenant workflow plus the failure modes of the
//! compound operations: partial moves, folder copies, truncated listings.

use futures::future::join_all;
use shardfs_storage::mock::{GatewayOp, MockGateway};
use shardfs_storage::{Entry, EntryKind, ErrorKind, StorageDriver, StorageError, Tenant};
use std::collections::HashSet;
use std::sync::Arc;

const TENANT_ROOT: &str = "/base/AB/12/CD/AB12CD34EF5678/app1";

fn setup() -> (StorageDriver<MockGateway>, MockGateway, Tenant) {
    let gateway = MockGateway::new();
    let driver = StorageDriver::with_base_path(Arc::new(gateway.clone()), "/base");
    let tenant = Tenant::new("AB12CD34EF5678", "app1").unwrap();
    (driver, gateway, tenant)
}

fn names(entries: &[Entry]) -> Vec<&str> {
    entries.iter().map(|e| e.name.as_str()).collect()
}

#[tokio::test]
async fn test_tenant_workflow() {
    let (driver, gateway, tenant) = setup();

    let folder = driver.create_directory(&tenant, "docs").await.unwrap();
    assert_eq!(folder, Entry::folder("docs"));
    assert!(gateway.is_directory(&format!("{TENANT_ROOT}/docs")).await);

    let written = driver.put_bytes(&tenant, "docs/a.txt", "hello").await.unwrap();
    assert_eq!(written, Entry::file("docs/a.txt").with_size(5));

    let listing = driver.list_directory(&tenant, "docs").await.unwrap();
    assert_eq!(listing, vec![Entry::file("a.txt").with_size(5)]);

    driver.copy_object(&tenant, "docs/a.txt", "docs/b.txt").await.unwrap();
    driver.move_object(&tenant, "docs/a.txt", "archive/a.txt").await.unwrap();

    let listing = driver.list_directory(&tenant, "docs").await.unwrap();
    assert_eq!(names(&listing), vec!["b.txt"]);
    assert_eq!(
        driver.get_bytes(&tenant, "archive/a.txt").await.unwrap().unwrap(),
        "hello"
    );
    assert!(driver.get_object(&tenant, "docs/a.txt").await.unwrap().is_none());

    let deleted = driver.delete_object(&tenant, "docs/b.txt").await.unwrap();
    assert_eq!(deleted, Entry::file("docs/b.txt").with_size(5));
    assert!(driver.list_directory(&tenant, "docs").await.unwrap().is_empty());

    let root = driver.list_directory(&tenant, "/").await.unwrap();
    let mut root_names = names(&root);
    root_names.sort_unstable();
    assert_eq!(root_names, vec!["archive", "docs"]);
    assert!(root.iter().all(Entry::is_folder));
}

#[tokio::test]
async fn test_put_then_list_notes() {
    let (driver, gateway, tenant) = setup();

    let mut writer = driver.put_object(&tenant, "notes/todo.txt").await.unwrap();
    writer.write("buy milk".into()).await.unwrap();
    writer.close().await.unwrap();

    assert_eq!(
        gateway
            .object("/base/AB/12/CD/AB12CD34EF5678/app1/notes/todo.txt")
            .await
            .unwrap(),
        "buy milk"
    );

    let listing = driver.list_directory(&tenant, "notes").await.unwrap();
    assert_eq!(listing.len(), 1);
    assert_eq!(listing[0].name, "todo.txt");
    assert_eq!(listing[0].kind, EntryKind::File);
}

#[tokio::test]
async fn test_dot_shard_account_never_reaches_backend() {
    let err = Tenant::new("..AB12", "app1").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::PathRejected);

    let (driver, gateway, tenant) = setup();
    driver.put_bytes(&tenant, "f.txt", "x").await.unwrap();
    for (_, path) in gateway.calls().await {
        assert!(!path.split('/').any(|s| s == ".."), "{path}");
    }
}

#[tokio::test]
async fn test_missing_tenant_root_lists_empty() {
    let (driver, gateway, tenant) = setup();

    for root in ["", "/", ".", "a/.."] {
        assert!(driver.list_directory(&tenant, root).await.unwrap().is_empty());
    }
    assert!(gateway.is_empty().await);
}

#[tokio::test]
async fn test_missing_folder_is_not_found() {
    let (driver, _gateway, tenant) = setup();
    driver.create_directory(&tenant, "docs").await.unwrap();

    let err = driver.list_directory(&tenant, "photos").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn test_listing_a_file_fails() {
    let (driver, _gateway, tenant) = setup();
    driver.put_bytes(&tenant, "notes.txt", "x").await.unwrap();

    let err = driver.list_directory(&tenant, "notes.txt").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Backend);
    assert_eq!(err.backend_code(), Some("NotADirectory"));
}

#[tokio::test]
async fn test_listing_failure_discards_partial_results() {
    let (driver, gateway, tenant) = setup();
    for name in ["a", "b", "c"] {
        driver.put_bytes(&tenant, &format!("docs/{name}"), name).await.unwrap();
    }
    gateway
        .fail_list_after(&format!("{TENANT_ROOT}/docs"), 2, "InternalError")
        .await;

    let err = driver.list_directory(&tenant, "docs").await.unwrap_err();
    assert_eq!(err.backend_code(), Some("InternalError"));
}

#[tokio::test]
async fn test_root_listing_failure_after_entries_is_an_error() {
    let (driver, gateway, tenant) = setup();
    driver.create_directory(&tenant, "docs").await.unwrap();
    gateway.fail_list_after(TENANT_ROOT, 1, "InternalError").await;

    let err = driver.list_directory(&tenant, "/").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Backend);
}

#[tokio::test]
async fn test_create_directory_is_idempotent() {
    let (driver, gateway, tenant) = setup();

    let first = driver.create_directory(&tenant, "a/b/c").await.unwrap();
    let nodes = gateway.len().await;
    let second = driver.create_directory(&tenant, "a/b/c/").await.unwrap();

    assert_eq!(first.kind, EntryKind::Folder);
    assert_eq!(second.kind, EntryKind::Folder);
    assert_eq!(gateway.len().await, nodes);
}

#[tokio::test]
async fn test_create_directory_over_file_fails() {
    let (driver, _gateway, tenant) = setup();
    driver.put_bytes(&tenant, "a", "x").await.unwrap();

    let err = driver.create_directory(&tenant, "a/b").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Backend);
}

#[tokio::test]
async fn test_put_overwrites_existing_object() {
    let (driver, _gateway, tenant) = setup();
    driver.put_bytes(&tenant, "f.txt", "first").await.unwrap();
    driver.put_bytes(&tenant, "f.txt", "second").await.unwrap();

    assert_eq!(driver.get_bytes(&tenant, "f.txt").await.unwrap().unwrap(), "second");
}

#[tokio::test]
async fn test_put_is_visible_only_after_close() {
    let (driver, gateway, tenant) = setup();
    let mut writer = driver.put_object(&tenant, "pending.txt").await.unwrap();
    writer.write("partial".into()).await.unwrap();

    assert!(gateway.object(&format!("{TENANT_ROOT}/pending.txt")).await.is_none());
    writer.close().await.unwrap();
    assert!(gateway.object(&format!("{TENANT_ROOT}/pending.txt")).await.is_some());
}

#[tokio::test]
async fn test_get_missing_object_is_none() {
    let (driver, gateway, tenant) = setup();
    assert!(driver.get_object(&tenant, "nope").await.unwrap().is_none());
    assert_eq!(gateway.calls().await.len(), 1);
}

#[tokio::test]
async fn test_get_object_backend_failure_is_an_error() {
    let (driver, gateway, tenant) = setup();
    gateway
        .fail_on(GatewayOp::OpenRead, &format!("{TENANT_ROOT}/f"), "ServiceUnavailable")
        .await;

    let err = driver.get_object(&tenant, "f").await.err().unwrap();
    assert_eq!(err.backend_code(), Some("ServiceUnavailable"));
}

#[tokio::test]
async fn test_move_unlink_failure_is_partial() {
    let (driver, gateway, tenant) = setup();
    driver.put_bytes(&tenant, "src.txt", "data").await.unwrap();
    let source = format!("{TENANT_ROOT}/src.txt");
    let dest = format!("{TENANT_ROOT}/moved/dst.txt");
    gateway.fail_on(GatewayOp::Unlink, &source, "InternalError").await;

    let err = driver.move_object(&tenant, "src.txt", "moved/dst.txt").await.unwrap_err();
    assert!(err.is_partial());
    assert_eq!(err.kind(), ErrorKind::PartialCompoundFailure);
    match &err {
        StorageError::PartialMove {
            source_path,
            dest_path,
            cause,
        } => {
            assert_eq!(source_path, &source);
            assert_eq!(dest_path, &dest);
            assert_eq!(cause.backend_code(), Some("InternalError"));
        }
        other => panic!("unexpected error: {other:?}"),
    }

    assert!(gateway.exists(&source).await);
    assert!(gateway.exists(&dest).await);
}

#[tokio::test]
async fn test_move_link_failure_leaves_no_destination() {
    let (driver, gateway, tenant) = setup();
    driver.put_bytes(&tenant, "src.txt", "data").await.unwrap();
    let source = format!("{TENANT_ROOT}/src.txt");
    gateway.fail_on(GatewayOp::Link, &source, "InternalError").await;

    let err = driver.move_object(&tenant, "src.txt", "dst.txt").await.unwrap_err();
    assert!(!err.is_partial());
    assert_eq!(err.kind(), ErrorKind::Backend);
    assert!(gateway.exists(&source).await);
    assert!(!gateway.exists(&format!("{TENANT_ROOT}/dst.txt")).await);
}

#[tokio::test]
async fn test_move_missing_source_is_not_found() {
    let (driver, gateway, tenant) = setup();
    let err = driver.move_object(&tenant, "ghost", "dst").await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::NotFound);
    let ops: Vec<GatewayOp> = gateway.calls().await.into_iter().map(|(op, _)| op).collect();
    assert_eq!(ops, vec![GatewayOp::EnsurePath, GatewayOp::Link]);
}

#[tokio::test]
async fn test_copy_folder_fails_without_destination() {
    let (driver, gateway, tenant) = setup();
    driver.put_bytes(&tenant, "album/1.jpg", "jpg").await.unwrap();

    let err = driver.copy_object(&tenant, "album", "album-copy").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Backend);
    assert!(!gateway.exists(&format!("{TENANT_ROOT}/album-copy")).await);
}

#[tokio::test]
async fn test_copy_keeps_source() {
    let (driver, _gateway, tenant) = setup();
    driver.put_bytes(&tenant, "a.txt", "abc").await.unwrap();

    let copied = driver.copy_object(&tenant, "a.txt", "deep/er/b.txt").await.unwrap();
    assert_eq!(copied, Entry::file("deep/er/b.txt"));
    assert_eq!(driver.get_bytes(&tenant, "a.txt").await.unwrap().unwrap(), "abc");
    assert_eq!(driver.get_bytes(&tenant, "deep/er/b.txt").await.unwrap().unwrap(), "abc");
}

#[tokio::test]
async fn test_delete_reports_folder_kind() {
    let (driver, _gateway, tenant) = setup();
    driver.create_directory(&tenant, "empty").await.unwrap();

    let deleted = driver.delete_object(&tenant, "empty").await.unwrap();
    assert_eq!(deleted, Entry::folder("empty"));
}

#[tokio::test]
async fn test_delete_non_empty_folder_follows_backend() {
    let (driver, _gateway, tenant) = setup();
    driver.put_bytes(&tenant, "full/x", "x").await.unwrap();

    let err = driver.delete_object(&tenant, "full").await.unwrap_err();
    assert_eq!(err.backend_code(), Some("DirectoryNotEmpty"));
}

#[tokio::test]
async fn test_delete_missing_is_not_found() {
    let (driver, gateway, tenant) = setup();
    let err = driver.delete_object(&tenant, "missing").await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::NotFound);
    let ops: Vec<GatewayOp> = gateway.calls().await.into_iter().map(|(op, _)| op).collect();
    assert_eq!(ops, vec![GatewayOp::Stat]);
}

#[tokio::test]
async fn test_traversal_stays_inside_tenant() {
    let (driver, gateway, tenant) = setup();
    driver.put_bytes(&tenant, "../../../../escape.txt", "x").await.unwrap();

    assert!(gateway.exists(&format!("{TENANT_ROOT}/escape.txt")).await);
    assert!(!gateway.exists("/base/escape.txt").await);
    assert!(!gateway.exists("/escape.txt").await);
}

#[tokio::test]
async fn test_tenants_are_isolated() {
    let (driver, _gateway, tenant) = setup();
    let other_app = Tenant::new("AB12CD34EF5678", "app2").unwrap();
    let other_account = Tenant::new("ZZ99YY88", "app1").unwrap();

    driver.put_bytes(&tenant, "secret.txt", "mine").await.unwrap();

    assert!(driver.get_object(&other_app, "secret.txt").await.unwrap().is_none());
    assert!(driver.get_object(&other_account, "../app1/secret.txt").await.unwrap().is_none());
    assert!(driver.list_directory(&other_app, "/").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_multipart_sessions_are_distinct() {
    let (driver, gateway, tenant) = setup();

    let sessions = join_all((0..16).map(|_| driver.start_multipart_upload(&tenant))).await;
    let sessions: Vec<_> = sessions.into_iter().map(Result::unwrap).collect();

    let paths: HashSet<&str> = sessions.iter().map(|s| s.object_path.as_str()).collect();
    let ids: HashSet<&str> = sessions.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(paths.len(), 16);
    assert_eq!(ids.len(), 16);
    assert!(paths.iter().all(|p| p.starts_with("/base/.uploads/")));

    let owners = gateway.uploads().await;
    assert_eq!(owners.len(), 16);
    assert!(owners.iter().all(|(_, owner)| owner == &tenant));
}
