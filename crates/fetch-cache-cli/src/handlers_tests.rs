use crate::commands::QueryArgs;
use crate::config::OutputFormat;
use crate::handlers;
use fetch_cache::{CacheStorage, Response, StorageConfig};

fn storage() -> (tempfile::TempDir, CacheStorage) {
    let tmp = tempfile::tempdir().unwrap();
    let storage = CacheStorage::new(StorageConfig::new(tmp.path().join("caches")));
    (tmp, storage)
}

#[tokio::test]
async fn test_keys_and_match_handlers() {
    let (_tmp, storage) = storage();
    let cache = storage.open("pages").await.unwrap();
    cache
        .put(
            "http://example.com/?page=2",
            Response::new("<h1>two</h1>").with_header("Content-Type", "text/html"),
        )
        .await
        .unwrap();

    let query = QueryArgs {
        ignore_search: true,
        ..QueryArgs::default()
    };
    let urls = handlers::list_keys(
        &storage,
        "pages",
        Some("http://example.com/"),
        &query,
        OutputFormat::Table,
    )
    .await
    .unwrap();
    assert_eq!(urls, vec!["http://example.com/?page=2".to_string()]);

    let output = handlers::match_url(
        &storage,
        "http://example.com/?page=2",
        None,
        &QueryArgs::default(),
        OutputFormat::Json,
    )
    .await
    .unwrap()
    .expect("match");
    assert_eq!(output.status, 200);
    assert_eq!(output.body, "<h1>two</h1>");
    assert_eq!(
        output.headers,
        vec![("content-type".to_string(), "text/html".to_string())]
    );
}

#[tokio::test]
async fn test_match_with_head_method() {
    let (_tmp, storage) = storage();
    let cache = storage.open("pages").await.unwrap();
    cache.put("http://example.com/", Response::empty()).await.unwrap();

    let head = QueryArgs {
        method: "HEAD".to_string(),
        ..QueryArgs::default()
    };
    let miss = handlers::match_url(
        &storage,
        "http://example.com/",
        Some("pages"),
        &head,
        OutputFormat::Table,
    )
    .await
    .unwrap();
    assert!(miss.is_none());

    let head_ignored = QueryArgs {
        ignore_method: true,
        ..head
    };
    let hit = handlers::match_url(
        &storage,
        "http://example.com/",
        Some("pages"),
        &head_ignored,
        OutputFormat::Table,
    )
    .await
    .unwrap();
    assert!(hit.is_some());
}

#[tokio::test]
async fn test_remove_and_delete_handlers() {
    let (_tmp, storage) = storage();
    let cache = storage.open("v1").await.unwrap();
    cache.put("http://example.com/", Response::empty()).await.unwrap();

    assert!(
        handlers::remove_entry(&storage, "v1", "http://example.com/", &QueryArgs::default())
            .await
            .unwrap()
    );
    assert!(
        !handlers::remove_entry(&storage, "v1", "http://example.com/", &QueryArgs::default())
            .await
            .unwrap()
    );

    assert!(handlers::has_cache(&storage, "v1").await.unwrap());
    assert!(handlers::delete_cache(&storage, "v1").await.unwrap());
    assert!(!handlers::has_cache(&storage, "v1").await.unwrap());
    assert!(!handlers::delete_cache(&storage, "v1").await.unwrap());
}
