use std::io::Read;
use std::sync::Arc;

use serde_json::json;
use wiremock::matchers::{header, method, path, path_regex, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

use remotepath_gcs::{Error, GcsClient, GcsConfig, GcsPath, ObjectAccessError};

fn gcs_path(uri: &str, s: &str) -> GcsPath {
    let client = GcsClient::from_config(&GcsConfig::default().with_endpoint(uri)).unwrap();
    GcsPath::parse(s, Arc::new(client)).unwrap()
}

fn listing(names: &[&str], next_page_token: Option<&str>) -> serde_json::Value {
    let items: Vec<_> = names.iter().map(|name| json!({ "name": name })).collect();
    match next_page_token {
        Some(token) => json!({ "kind": "storage#objects", "items": items, "nextPageToken": token }),
        None => json!({ "kind": "storage#objects", "items": items }),
    }
}

#[tokio::test]
async fn test_glob_filters_listing() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/storage/v1/b/bucket/o"))
        .and(query_param("prefix", "dir"))
        .respond_with(ResponseTemplate::new(200).set_body_json(listing(
            &["dir/a.tif", "dir/b.json", "dir/sub/c.tif"],
            None,
        )))
        .expect(1)
        .mount(&server)
        .await;

    let uri = server.uri();

    let result = tokio::task::spawn_blocking(move || {
        let dir = gcs_path(&uri, "gs://bucket/dir");
        dir.glob("*.tif")
            .unwrap()
            .map(|p| p.unwrap().to_string())
            .collect::<Vec<_>>()
    })
    .await
    .unwrap();

    assert_eq!(result, ["gs://bucket/dir/a.tif", "gs://bucket/dir/sub/c.tif"]);
}

#[tokio::test]
async fn test_glob_follows_page_tokens() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/storage/v1/b/bucket/o"))
        .and(query_param_is_missing("pageToken"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(listing(&["dir/1.tif"], Some("page-2"))),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/storage/v1/b/bucket/o"))
        .and(query_param("pageToken", "page-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(listing(&["dir/2.tif"], None)))
        .expect(1)
        .mount(&server)
        .await;

    let uri = server.uri();

    let result = tokio::task::spawn_blocking(move || {
        let dir = gcs_path(&uri, "gs://bucket/dir");
        dir.glob("*")
            .unwrap()
            .map(|p| p.unwrap().key())
            .collect::<Vec<_>>()
    })
    .await
    .unwrap();

    assert_eq!(result, ["dir/1.tif", "dir/2.tif"]);
}

#[tokio::test]
async fn test_glob_stops_when_consumer_stops() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/storage/v1/b/bucket/o"))
        .and(query_param_is_missing("pageToken"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(listing(&["dir/1.tif"], Some("page-2"))),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/storage/v1/b/bucket/o"))
        .and(query_param("pageToken", "page-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(listing(&["dir/2.tif"], None)))
        .expect(0)
        .mount(&server)
        .await;

    let uri = server.uri();

    let first = tokio::task::spawn_blocking(move || {
        let dir = gcs_path(&uri, "gs://bucket/dir");
        let mut glob = dir.glob("*.tif").unwrap();
        glob.next().unwrap().unwrap().key()
    })
    .await
    .unwrap();

    assert_eq!(first, "dir/1.tif");
}

#[tokio::test]
async fn test_glob_sends_page_size() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/storage/v1/b/bucket/o"))
        .and(query_param("maxResults", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(listing(&[], None)))
        .expect(1)
        .mount(&server)
        .await;

    let uri = server.uri();

    let count = tokio::task::spawn_blocking(move || {
        let config = GcsConfig::default().with_endpoint(uri).with_page_size(2);
        let client = GcsClient::from_config(&config).unwrap();
        let root = GcsPath::parse("gs://bucket", Arc::new(client)).unwrap();
        root.glob("*").unwrap().count()
    })
    .await
    .unwrap();

    assert_eq!(count, 0);
}

#[tokio::test]
async fn test_glob_listing_failure_surfaces() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/storage/v1/b/bucket/o"))
        .respond_with(ResponseTemplate::new(403).set_body_string("Forbidden"))
        .mount(&server)
        .await;

    let uri = server.uri();

    let results = tokio::task::spawn_blocking(move || {
        let dir = gcs_path(&uri, "gs://bucket/dir");
        dir.glob("*").unwrap().collect::<Vec<_>>()
    })
    .await
    .unwrap();

    assert_eq!(results.len(), 1);
    match &results[0] {
        Err(Error::ObjectAccess(ObjectAccessError::Status {
            status, message, ..
        })) => {
            assert_eq!(*status, 403);
            assert_eq!(message, "Forbidden");
        }
        other => panic!("expected a 403, got {:?}", other),
    }
}

#[tokio::test]
async fn test_glob_malformed_listing_is_access_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/storage/v1/b/bucket/o"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
        .mount(&server)
        .await;

    let uri = server.uri();

    let result = tokio::task::spawn_blocking(move || {
        let dir = gcs_path(&uri, "gs://bucket/dir");
        dir.glob("*").unwrap().next().unwrap()
    })
    .await
    .unwrap();

    assert!(matches!(
        result,
        Err(Error::ObjectAccess(ObjectAccessError::Decode(_)))
    ));
}

#[tokio::test]
async fn test_open_downloads_media() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path_regex(r"^/download/storage/v1/b/bucket/o/dir(%2F|/)a\.tif$"))
        .and(query_param("alt", "media"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"II*\0tiff".to_vec()))
        .expect(1)
        .mount(&server)
        .await;

    let uri = server.uri();

    let body = tokio::task::spawn_blocking(move || {
        let file = gcs_path(&uri, "gs://bucket/dir/a.tif");
        let mut reader = file.open().unwrap();
        let mut body = Vec::new();
        reader.read_to_end(&mut body).unwrap();
        body
    })
    .await
    .unwrap();

    assert_eq!(body, b"II*\0tiff");
}

#[tokio::test]
async fn test_open_missing_object_is_access_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path_regex(r"^/download/storage/v1/b/bucket/o/"))
        .respond_with(ResponseTemplate::new(404).set_body_string("No such object: bucket/nope"))
        .mount(&server)
        .await;

    let uri = server.uri();

    let err = tokio::task::spawn_blocking(move || {
        gcs_path(&uri, "gs://bucket/nope").open().err().unwrap()
    })
    .await
    .unwrap();

    assert!(err.is_not_found());
    assert!(err.to_string().contains("No such object"));
}

#[tokio::test]
async fn test_default_headers_are_sent() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path_regex(r"^/download/storage/v1/b/bucket/o/"))
        .and(header("Authorization", "Bearer token123"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .expect(1)
        .mount(&server)
        .await;

    let uri = server.uri();

    let body = tokio::task::spawn_blocking(move || {
        let config = GcsConfig::default()
            .with_endpoint(uri)
            .with_default_header("Authorization", "Bearer token123");
        let client = GcsClient::from_config(&config).unwrap();
        let file = GcsPath::parse("gs://bucket/secret.txt", Arc::new(client)).unwrap();

        let mut body = String::new();
        file.open().unwrap().read_to_string(&mut body).unwrap();
        body
    })
    .await
    .unwrap();

    assert_eq!(body, "ok");
}

#[test]
fn test_open_connection_refused_is_access_error() {
    // bind then drop a listener so nothing answers on the port
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let uri = format!("http://127.0.0.1:{}", port);

    let err = gcs_path(&uri, "gs://bucket/a.tif").open().err().unwrap();

    assert!(matches!(
        err,
        Error::ObjectAccess(ObjectAccessError::Transport(_))
    ));
}
