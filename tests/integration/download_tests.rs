//! Page retries, image normalization and chapter enumeration against a mock gateway

use crate::common::*;
use mdex_archiver::cache::CacheStore;
use mdex_archiver::download::MAX_PAGE_ATTEMPTS;
use mdex_archiver::metadata::Catalog;
use mdex_archiver::{ArchiverError, Pipeline};
use serde_json::json;
use std::collections::HashSet;
use std::io::Read;
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Mounts a one-chapter series whose page hosting lists `files`, without mounting images
async fn mount_chapter_without_images(server: &MockServer, files: &[&str]) {
    mount_series(server, "ExampleManga", None).await;
    mount_chapter(
        server,
        chapter_json(CHAPTER_ID, "350", Some("0"), Some("New Phone")),
    )
    .await;
    mount_page_hosting(server, CHAPTER_ID, files).await;
}

#[tokio::test]
async fn test_page_retries_are_bounded() {
    let mock_server = MockServer::start().await;
    mount_chapter_without_images(&mock_server, &["p1.png"]).await;

    Mock::given(method("GET"))
        .and(path(format!("/data/{}/p1.png", HASH)))
        .respond_with(ResponseTemplate::new(500))
        .expect(MAX_PAGE_ATTEMPTS as u64)
        .mount(&mock_server)
        .await;

    let root = TempDir::new().unwrap();
    let result = Pipeline::new(test_config(&mock_server, root.path()))
        .unwrap()
        .run(&[format!("chapter:{}", CHAPTER_ID)])
        .await;

    match result {
        Err(ArchiverError::ImageAcquisition { page, attempts, .. }) => {
            assert_eq!(page, 1);
            assert_eq!(attempts, MAX_PAGE_ATTEMPTS);
        }
        other => panic!("Expected ImageAcquisition, got {:?}", other),
    }

    // Nothing left behind: no staging directory, no archive, no cache entry
    let series_dir = root.path().join("downloads/ExampleManga");
    assert!(!series_dir.join("350 New Phone").exists());
    assert!(!series_dir.join("350 New Phone.cbz").exists());
    let cache = CacheStore::new(cache_path(root.path()));
    assert!(!cache.contains(SERIES_ID, CHAPTER_ID).unwrap());
}

#[tokio::test]
async fn test_failed_page_cleans_up_earlier_pages() {
    let mock_server = MockServer::start().await;
    mount_chapter_without_images(&mock_server, &["p1.png", "p2.png"]).await;
    mount_image(&mock_server, "p1.png", png_page(40, 60)).await;

    Mock::given(method("GET"))
        .and(path(format!("/data/{}/p2.png", HASH)))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let root = TempDir::new().unwrap();
    let result = Pipeline::new(test_config(&mock_server, root.path()))
        .unwrap()
        .run(&[format!("chapter:{}", CHAPTER_ID)])
        .await;

    assert!(matches!(
        result,
        Err(ArchiverError::ImageAcquisition { page: 2, .. })
    ));
    assert!(!root
        .path()
        .join("downloads/ExampleManga/350 New Phone")
        .exists());
}

#[tokio::test]
async fn test_page_succeeds_after_transient_failures() {
    let mock_server = MockServer::start().await;
    mount_chapter_without_images(&mock_server, &["p1.png"]).await;

    // Two server errors, then a body that is not an image, then the real page
    Mock::given(method("GET"))
        .and(path(format!("/data/{}/p1.png", HASH)))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(2)
        .expect(2)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/data/{}/p1.png", HASH)))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>busy</html>"))
        .up_to_n_times(1)
        .expect(1)
        .mount(&mock_server)
        .await;
    mount_image(&mock_server, "p1.png", png_page(40, 60)).await;

    let root = TempDir::new().unwrap();
    let report = Pipeline::new(test_config(&mock_server, root.path()))
        .unwrap()
        .run(&[format!("chapter:{}", CHAPTER_ID)])
        .await
        .expect("Page should succeed on the fourth attempt");

    assert_eq!(report.archives.len(), 1);
    assert_eq!(
        archive_entries(&report.archives[0]),
        vec!["001.jpg", "ComicInfo.xml"]
    );
}

#[tokio::test]
async fn test_tall_pages_are_downscaled() {
    let mock_server = MockServer::start().await;
    mount_chapter_without_images(&mock_server, &["tall.png", "small.png"]).await;
    mount_image(&mock_server, "tall.png", png_page(100, 4800)).await;
    mount_image(&mock_server, "small.png", png_page(30, 50)).await;

    let root = TempDir::new().unwrap();
    let report = Pipeline::new(test_config(&mock_server, root.path()))
        .unwrap()
        .run(&[format!("chapter:{}", CHAPTER_ID)])
        .await
        .unwrap();

    let file = std::fs::File::open(&report.archives[0]).unwrap();
    let mut archive = zip::ZipArchive::new(file).unwrap();

    let mut dimensions = Vec::new();
    for name in ["001.jpg", "002.jpg"] {
        let mut bytes = Vec::new();
        archive
            .by_name(name)
            .unwrap()
            .read_to_end(&mut bytes)
            .unwrap();
        assert_eq!(
            image::guess_format(&bytes).unwrap(),
            image::ImageFormat::Jpeg
        );
        let page = image::load_from_memory(&bytes).unwrap();
        dimensions.push((page.width(), page.height()));
    }

    assert_eq!(dimensions, vec![(50, 2400), (30, 50)]);
}

#[tokio::test]
async fn test_feed_entry_points_agree() {
    let mock_server = MockServer::start().await;
    let root = TempDir::new().unwrap();

    // The excluded entry carries a chapter number that does not parse
    let entries = vec![
        chapter_json(CHAPTER_ID, "extra", Some("1"), Some("Start")),
        chapter_json(OTHER_CHAPTER_ID, "1.5", Some("1"), None),
        chapter_json(THIRD_CHAPTER_ID, "2", None, Some("Later")),
    ];
    mount_feed(&mock_server, entries.clone()).await;
    for entry in entries {
        mount_chapter(&mock_server, entry).await;
    }

    let config = test_config(&mock_server, root.path());
    let catalog = Catalog::from_config(&config.gateway).unwrap();

    let excluded: HashSet<String> = [CHAPTER_ID.to_string()].into_iter().collect();

    let ids = catalog.list_chapter_ids(SERIES_ID, &excluded).await.unwrap();
    let by_id = catalog.resolve_chapters(&ids).await.unwrap();
    let listing = catalog.list_chapters(SERIES_ID, &excluded).await.unwrap();

    assert_eq!(by_id, listing.chapters);
    assert_eq!(listing.excluded, 1);
    assert_eq!(listing.chapters.len(), 2);
    assert_eq!(listing.chapters[0].id, OTHER_CHAPTER_ID);
    assert_eq!(listing.chapters[0].title, "Chapter 1.5");
    assert_eq!(listing.chapters[1].volume, None);
}

#[tokio::test]
async fn test_feed_is_paginated() {
    let mock_server = MockServer::start().await;
    let root = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path(format!("/manga/{}/feed", SERIES_ID)))
        .and(query_param("offset", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": "ok",
            "data": [
                chapter_json(CHAPTER_ID, "1", None, Some("Start")),
                chapter_json(OTHER_CHAPTER_ID, "2", None, Some("Next")),
            ],
            "limit": 100,
            "offset": 0,
            "total": 3
        })))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/manga/{}/feed", SERIES_ID)))
        .and(query_param("offset", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": "ok",
            "data": [chapter_json(THIRD_CHAPTER_ID, "3", None, Some("Last"))],
            "limit": 100,
            "offset": 2,
            "total": 3
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = test_config(&mock_server, root.path());
    let catalog = Catalog::from_config(&config.gateway).unwrap();

    let listing = catalog
        .list_chapters(SERIES_ID, &HashSet::new())
        .await
        .unwrap();
    let ids: Vec<&str> = listing.chapters.iter().map(|c| c.id.as_str()).collect();

    assert_eq!(ids, vec![CHAPTER_ID, OTHER_CHAPTER_ID, THIRD_CHAPTER_ID]);
    assert_eq!(listing.excluded, 0);
}

#[tokio::test]
async fn test_feed_stops_on_empty_page() {
    let mock_server = MockServer::start().await;
    let root = TempDir::new().unwrap();

    // The reported total overstates what the feed actually returns
    Mock::given(method("GET"))
        .and(path(format!("/manga/{}/feed", SERIES_ID)))
        .and(query_param("offset", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": "ok",
            "data": [chapter_json(CHAPTER_ID, "1", None, Some("Start"))],
            "limit": 100,
            "offset": 0,
            "total": 5
        })))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/manga/{}/feed", SERIES_ID)))
        .and(query_param("offset", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": "ok",
            "data": [],
            "limit": 100,
            "offset": 1,
            "total": 5
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = test_config(&mock_server, root.path());
    let catalog = Catalog::from_config(&config.gateway).unwrap();

    let ids = catalog
        .list_chapter_ids(SERIES_ID, &HashSet::new())
        .await
        .unwrap();
    assert_eq!(ids, vec![CHAPTER_ID.to_string()]);
}

#[tokio::test]
async fn test_feed_skips_external_chapters() {
    let mock_server = MockServer::start().await;
    let root = TempDir::new().unwrap();

    let mut external = chapter_json(OTHER_CHAPTER_ID, "2", None, Some("Elsewhere"));
    external["attributes"]["externalUrl"] = json!("https://example.com/read/2");
    mount_feed(
        &mock_server,
        vec![chapter_json(CHAPTER_ID, "1", None, Some("Start")), external],
    )
    .await;

    let config = test_config(&mock_server, root.path());
    let catalog = Catalog::from_config(&config.gateway).unwrap();

    let ids = catalog
        .list_chapter_ids(SERIES_ID, &HashSet::new())
        .await
        .unwrap();
    assert_eq!(ids, vec![CHAPTER_ID.to_string()]);
}
