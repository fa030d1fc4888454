//! End-to-end runs of the pipeline against a mock gateway

use crate::common::*;
use mdex_archiver::cache::CacheStore;
use mdex_archiver::{ArchiverError, Pipeline};
use serde_json::json;
use std::io::Read;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_series_run_archives_chapter() {
    let mock_server = MockServer::start().await;
    mount_single_chapter_series(&mock_server).await;
    let root = TempDir::new().unwrap();

    let pipeline = Pipeline::new(test_config(&mock_server, root.path())).unwrap();
    let report = pipeline
        .run(&[format!("title:{}", SERIES_ID)])
        .await
        .expect("Run should succeed");

    let archive = root.path().join("downloads/ExampleManga/350 New Phone.cbz");
    assert_eq!(report.archives, vec![archive.clone()]);
    assert!(archive.is_file());
    assert_eq!(
        archive_entries(&archive),
        vec!["001.jpg", "002.jpg", "ComicInfo.xml"]
    );

    // Staging directory is gone
    assert!(!root.path().join("downloads/ExampleManga/350 New Phone").exists());

    // Descriptor carries the chapter id and number
    let file = std::fs::File::open(&archive).unwrap();
    let mut zip = zip::ZipArchive::new(file).unwrap();
    let mut xml = String::new();
    zip.by_name("ComicInfo.xml")
        .unwrap()
        .read_to_string(&mut xml)
        .unwrap();
    assert!(xml.contains("<Series>ExampleManga</Series>"));
    assert!(xml.contains("<Number>350</Number>"));
    assert!(xml.contains(CHAPTER_ID));

    let cache = CacheStore::new(cache_path(root.path()));
    assert!(cache.contains(SERIES_ID, CHAPTER_ID).unwrap());
}

#[tokio::test]
async fn test_second_run_skips_cached_chapters() {
    let mock_server = MockServer::start().await;
    mount_series(&mock_server, "ExampleManga", None).await;
    mount_feed(
        &mock_server,
        vec![chapter_json(CHAPTER_ID, "350", Some("0"), Some("New Phone"))],
    )
    .await;
    mount_image(&mock_server, "p1.png", png_page(40, 60)).await;

    // Page hosting is only consulted by the first run
    Mock::given(method("GET"))
        .and(path(format!("/at-home/server/{}", CHAPTER_ID)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": "ok",
            "baseUrl": mock_server.uri(),
            "chapter": {"hash": HASH, "data": ["p1.png"], "dataSaver": ["p1.png"]}
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let root = TempDir::new().unwrap();
    let inputs = vec![format!("https://mangadex.org/title/{}/examplemanga", SERIES_ID)];

    let first = Pipeline::new(test_config(&mock_server, root.path()))
        .unwrap()
        .run(&inputs)
        .await
        .unwrap();
    assert_eq!(first.archives.len(), 1);

    let cache_before = std::fs::read_to_string(cache_path(root.path())).unwrap();

    let second = Pipeline::new(test_config(&mock_server, root.path()))
        .unwrap()
        .run(&inputs)
        .await
        .unwrap();
    assert!(second.archives.is_empty());
    assert_eq!(second.skipped, 1);

    let cache_after = std::fs::read_to_string(cache_path(root.path())).unwrap();
    assert_eq!(cache_before, cache_after);
}

#[tokio::test]
async fn test_skipped_counts_only_feed_entries() {
    let mock_server = MockServer::start().await;
    mount_series(&mock_server, "ExampleManga", None).await;
    mount_feed(
        &mock_server,
        vec![chapter_json(CHAPTER_ID, "350", Some("0"), Some("New Phone"))],
    )
    .await;
    let root = TempDir::new().unwrap();

    // The second cached chapter has since left the feed
    let cache = CacheStore::new(cache_path(root.path()));
    cache.record(SERIES_ID, CHAPTER_ID).unwrap();
    cache.record(SERIES_ID, OTHER_CHAPTER_ID).unwrap();

    let report = Pipeline::new(test_config(&mock_server, root.path()))
        .unwrap()
        .run(&[SERIES_ID.to_string()])
        .await
        .unwrap();

    assert!(report.archives.is_empty());
    assert_eq!(report.skipped, 1);
    assert_eq!(report.chapters_seen(), 1);
}

#[tokio::test]
async fn test_cached_chapter_input_skips_metadata_lookup() {
    let mock_server = MockServer::start().await;
    let root = TempDir::new().unwrap();

    CacheStore::new(cache_path(root.path()))
        .record(SERIES_ID, CHAPTER_ID)
        .unwrap();

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&mock_server)
        .await;

    let report = Pipeline::new(test_config(&mock_server, root.path()))
        .unwrap()
        .run(&[format!("chapter:{}", CHAPTER_ID)])
        .await
        .unwrap();

    assert_eq!(report.skipped, 1);
    assert!(report.archives.is_empty());
}

#[tokio::test]
async fn test_override_mode_leaves_cache_untouched() {
    let mock_server = MockServer::start().await;
    mount_single_chapter_series(&mock_server).await;
    let root = TempDir::new().unwrap();

    let mut config = test_config(&mock_server, root.path());
    config.features.override_cache = true;

    let report = Pipeline::new(config)
        .unwrap()
        .run(&[SERIES_ID.to_string()])
        .await
        .unwrap();

    assert_eq!(report.archives.len(), 1);
    assert!(report.archives[0].is_file());
    assert!(!cache_path(root.path()).exists());
}

#[tokio::test]
async fn test_override_mode_downloads_cached_chapters_again() {
    let mock_server = MockServer::start().await;
    mount_single_chapter_series(&mock_server).await;
    let root = TempDir::new().unwrap();

    let cache = CacheStore::new(cache_path(root.path()));
    cache.record(SERIES_ID, CHAPTER_ID).unwrap();
    let cache_before = std::fs::read_to_string(cache.path()).unwrap();

    let mut config = test_config(&mock_server, root.path());
    config.features.override_cache = true;

    let report = Pipeline::new(config)
        .unwrap()
        .run(&[format!("chapter:{}", CHAPTER_ID)])
        .await
        .unwrap();

    assert_eq!(report.archives.len(), 1);
    assert_eq!(report.skipped, 0);
    assert_eq!(std::fs::read_to_string(cache.path()).unwrap(), cache_before);
}

#[tokio::test]
async fn test_chapter_without_pages_is_skipped() {
    let mock_server = MockServer::start().await;
    mount_series(&mock_server, "ExampleManga", None).await;
    mount_chapter(
        &mock_server,
        chapter_json(CHAPTER_ID, "1", None, Some("Start")),
    )
    .await;
    mount_page_hosting(&mock_server, CHAPTER_ID, &[]).await;
    let root = TempDir::new().unwrap();

    let report = Pipeline::new(test_config(&mock_server, root.path()))
        .unwrap()
        .run(&[format!("chapter:{}", CHAPTER_ID)])
        .await
        .unwrap();

    assert_eq!(report.empty, 1);
    assert!(report.archives.is_empty());
    assert!(!root.path().join("downloads/ExampleManga").exists());

    let cache = CacheStore::new(cache_path(root.path()));
    assert!(!cache.contains(SERIES_ID, CHAPTER_ID).unwrap());
}

#[tokio::test]
async fn test_volume_cover_from_first_chapter_of_volume() {
    let mock_server = MockServer::start().await;
    mount_series(&mock_server, "ExampleManga", None).await;
    mount_feed(
        &mock_server,
        vec![
            chapter_json(CHAPTER_ID, "1", Some("1"), Some("Start")),
            chapter_json(OTHER_CHAPTER_ID, "2", Some("1"), Some("Next")),
        ],
    )
    .await;
    mount_page_hosting(&mock_server, CHAPTER_ID, &["p1.png"]).await;
    mount_page_hosting(&mock_server, OTHER_CHAPTER_ID, &["p1.png"]).await;
    mount_image(&mock_server, "p1.png", png_page(40, 60)).await;
    let root = TempDir::new().unwrap();

    let mut config = test_config(&mock_server, root.path());
    config.features.chapter_cover = true;

    let report = Pipeline::new(config)
        .unwrap()
        .run(&[SERIES_ID.to_string()])
        .await
        .unwrap();

    let series_dir = root.path().join("downloads/ExampleManga");
    assert_eq!(report.archives.len(), 2);
    assert_eq!(report.volume_covers, vec![series_dir.join("001 Start.jpg")]);
    assert!(series_dir.join("001 Start.jpg").is_file());
    assert!(!series_dir.join("002 Next.jpg").exists());
}

#[tokio::test]
async fn test_series_cover_download() {
    let mock_server = MockServer::start().await;
    mount_single_chapter_series_with_cover(&mock_server, "cover.png").await;

    Mock::given(method("GET"))
        .and(path(format!("/covers/{}/cover.png", SERIES_ID)))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(png_page(10, 15)))
        .mount(&mock_server)
        .await;
    let root = TempDir::new().unwrap();

    let mut config = test_config(&mock_server, root.path());
    config.features.download_cover = true;

    let report = Pipeline::new(config)
        .unwrap()
        .run(&[SERIES_ID.to_string()])
        .await
        .unwrap();

    let cover = root.path().join("downloads/ExampleManga/cover.png");
    assert_eq!(report.series_covers, vec![cover.clone()]);
    assert!(cover.is_file());
}

#[tokio::test]
async fn test_series_cover_failure_is_not_fatal() {
    let mock_server = MockServer::start().await;
    mount_single_chapter_series_with_cover(&mock_server, "missing.jpg").await;
    let root = TempDir::new().unwrap();

    let mut config = test_config(&mock_server, root.path());
    config.features.download_cover = true;

    let report = Pipeline::new(config)
        .unwrap()
        .run(&[SERIES_ID.to_string()])
        .await
        .unwrap();

    assert!(report.series_covers.is_empty());
    assert_eq!(report.archives.len(), 1);
}

#[tokio::test]
async fn test_unknown_series_fails_with_remote_lookup() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/manga/{}", SERIES_ID)))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "result": "error",
            "errors": [{"status": 404, "title": "Not found", "detail": "Manga could not be found"}]
        })))
        .mount(&mock_server)
        .await;
    let root = TempDir::new().unwrap();

    let result = Pipeline::new(test_config(&mock_server, root.path()))
        .unwrap()
        .run(&[SERIES_ID.to_string()])
        .await;

    assert!(matches!(result, Err(ArchiverError::RemoteLookup { .. })));
}

#[tokio::test]
async fn test_error_result_envelope() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/chapter/{}", CHAPTER_ID)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": "error",
            "errors": [{"title": "Forbidden", "detail": "Chapter is not available"}]
        })))
        .mount(&mock_server)
        .await;
    let root = TempDir::new().unwrap();

    let result = Pipeline::new(test_config(&mock_server, root.path()))
        .unwrap()
        .run(&[format!("chapter:{}", CHAPTER_ID)])
        .await;

    match result {
        Err(ArchiverError::RemoteResult { message, .. }) => {
            assert!(message.contains("Chapter is not available"))
        }
        other => panic!("Expected RemoteResult, got {:?}", other),
    }
}

#[tokio::test]
async fn test_unrecognized_input_fails_resolution() {
    let mock_server = MockServer::start().await;
    let root = TempDir::new().unwrap();

    let result = Pipeline::new(test_config(&mock_server, root.path()))
        .unwrap()
        .run(&["https://example.com/title/not-a-series".to_string()])
        .await;

    assert!(matches!(result, Err(ArchiverError::Resolution { .. })));
}

async fn mount_single_chapter_series_with_cover(server: &MockServer, cover_file: &str) {
    mount_series(server, "ExampleManga", Some(cover_file)).await;
    mount_feed(
        server,
        vec![chapter_json(CHAPTER_ID, "350", Some("0"), Some("New Phone"))],
    )
    .await;
    mount_page_hosting(server, CHAPTER_ID, &["p1.png"]).await;
    mount_image(server, "p1.png", png_page(40, 60)).await;
}
