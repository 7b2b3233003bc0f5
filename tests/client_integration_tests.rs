use std::sync::Arc;
use std::time::Duration;

use comicdex::catalog::{
    CatalogApi, DEFAULT_TIMEOUT, DataError, FixedClock, ItemRef, MarvelClient, RequestSigner,
    SectionType,
};
use serde_json::json;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path, query_param},
};

// ============================================================================
// Helper Functions
// ============================================================================

/// md5("1" + "abcd" + "1234")
const SIGNED_HASH: &str = "ffd275c5130566a2916217b101f26150";

fn client(server: &MockServer) -> MarvelClient {
    client_with_timeout(&server.uri(), DEFAULT_TIMEOUT)
}

fn client_with_timeout(base_url: &str, timeout: Duration) -> MarvelClient {
    let signer = RequestSigner::with_clock("1234", "abcd", Arc::new(FixedClock(1)));
    MarvelClient::new(signer, Some(base_url.to_string()), timeout).unwrap()
}

fn comic_body(id: i64, title: &str) -> serde_json::Value {
    json!({
        "code": 200,
        "status": "Ok",
        "data": {
            "offset": 0, "limit": 20, "total": 1, "count": 1,
            "results": [{
                "id": id,
                "title": title,
                "thumbnail": { "path": format!("http://i.annihil.us/{id}"), "extension": "jpg" }
            }]
        }
    })
}

fn comic_ref(server: &MockServer, id: i64) -> ItemRef {
    ItemRef::new(
        format!("Comic {id}"),
        format!("{}/v1/public/comics/{id}", server.uri()),
    )
}

// ============================================================================
// Signing and Decoding
// ============================================================================

#[tokio::test]
async fn test_characters_request_carries_signature_and_paging_params() {
    let server = MockServer::start().await;
    let body = json!({
        "code": 200,
        "status": "Ok",
        "data": {
            "offset": 40, "limit": 20, "total": 42, "count": 2,
            "results": [
                {
                    "id": 1011334,
                    "name": "3-D Man",
                    "description": "",
                    "thumbnail": { "path": "http://i.annihil.us/u/prod/marvel/i/mg/c/e0/535fecbbb9784", "extension": "jpg" },
                    "comics": {
                        "available": 2,
                        "collectionURI": "http://gateway.marvel.com/v1/public/characters/1011334/comics",
                        "items": [
                            { "resourceURI": "http://gateway.marvel.com/v1/public/comics/21366", "name": "Avengers: The Initiative (2007) #14" },
                            { "resourceURI": "http://gateway.marvel.com/v1/public/comics/24571", "name": "Avengers: The Initiative (2007) #14 (SPOTLIGHT VARIANT)" }
                        ],
                        "returned": 2
                    },
                    "stories": {
                        "available": 1,
                        "items": [
                            { "resourceURI": "http://gateway.marvel.com/v1/public/stories/19947", "name": "Cover #19947", "type": "cover" }
                        ]
                    },
                    "urls": [ { "type": "detail", "url": "http://marvel.com/characters/74/3-d_man" } ]
                },
                { "id": 1017100, "name": "A-Bomb (HAS)" }
            ]
        }
    });

    Mock::given(method("GET"))
        .and(path("/v1/public/characters"))
        .and(query_param("limit", "20"))
        .and(query_param("offset", "40"))
        .and(query_param("ts", "1"))
        .and(query_param("apikey", "1234"))
        .and(query_param("hash", SIGNED_HASH))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(1)
        .mount(&server)
        .await;

    let batch = client(&server).characters(40, 20).await.unwrap();

    assert_eq!(batch.total, 42);
    assert_eq!(batch.offset, 40);
    assert_eq!(batch.characters.len(), 2);

    let man = &batch.characters[0];
    assert_eq!(man.name, "3-D Man");
    assert_eq!(man.section_items(SectionType::Comics).len(), 2);
    assert_eq!(man.section_items(SectionType::Stories).len(), 1);
    assert!(man.section_items(SectionType::Series).is_empty());
    assert_eq!(man.related_links[0].kind, "detail");
    assert_eq!(
        man.thumbnail.url().as_deref(),
        Some("http://i.annihil.us/u/prod/marvel/i/mg/c/e0/535fecbbb9784.jpg")
    );
    // Missing lists decode as empty.
    assert!(batch.characters[1].section_items(SectionType::Comics).is_empty());
}

#[tokio::test]
async fn test_section_item_fetches_resource_uri_as_is() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/public/comics/21366"))
        .and(query_param("hash", SIGNED_HASH))
        .respond_with(ResponseTemplate::new(200).set_body_json(comic_body(21366, "Avengers #14")))
        .expect(1)
        .mount(&server)
        .await;

    let item = client(&server)
        .section_item(&comic_ref(&server, 21366))
        .await
        .unwrap();

    assert_eq!(item.id, 21366);
    assert_eq!(item.name, "Avengers #14");
    assert_eq!(item.image_url.as_deref(), Some("http://i.annihil.us/21366.jpg"));
}

#[tokio::test]
async fn test_relative_resource_uri_is_resolved_against_base() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/public/series/3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(comic_body(3, "Series 3")))
        .expect(1)
        .mount(&server)
        .await;

    let item = client(&server)
        .section_item(&ItemRef::new("Series 3", "/v1/public/series/3"))
        .await
        .unwrap();
    assert_eq!(item.name, "Series 3");
}

#[tokio::test]
async fn test_item_without_thumbnail_has_no_image() {
    let server = MockServer::start().await;
    let body = json!({ "data": { "results": [ { "id": 5, "title": "Story 5" } ] } });
    Mock::given(method("GET"))
        .and(path("/v1/public/comics/5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&server)
        .await;

    let item = client(&server).section_item(&comic_ref(&server, 5)).await.unwrap();
    assert_eq!(item.image_url, None);
}

// ============================================================================
// Error Mapping
// ============================================================================

#[tokio::test]
async fn test_429_maps_to_too_many_requests_with_retry_after() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/public/characters"))
        .respond_with(
            ResponseTemplate::new(429)
                .insert_header("Retry-After", "30")
                .set_body_string(r#"{"code":"RequestThrottled","message":"You have exceeded your rate limit."}"#),
        )
        .expect(1)
        .mount(&server)
        .await;

    let err = client(&server).characters(0, 20).await.unwrap_err();
    assert_eq!(err, DataError::TooManyRequests { retry_after: Some(30) });
}

#[tokio::test]
async fn test_5xx_maps_to_server_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/public/comics/1"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = client(&server).section_item(&comic_ref(&server, 1)).await.unwrap_err();
    assert_eq!(err, DataError::ServerError(503));
}

#[tokio::test]
async fn test_other_status_maps_to_unknown() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/public/comics/1"))
        .respond_with(ResponseTemplate::new(404).set_body_string("not found"))
        .mount(&server)
        .await;

    let err = client(&server).section_item(&comic_ref(&server, 1)).await.unwrap_err();
    assert_eq!(err, DataError::Unknown);
}

#[tokio::test]
async fn test_malformed_body_maps_to_serialization() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/public/characters"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{ not json"))
        .mount(&server)
        .await;

    let err = client(&server).characters(0, 20).await.unwrap_err();
    assert_eq!(err, DataError::Serialization);
}

#[tokio::test]
async fn test_empty_single_item_envelope_maps_to_serialization() {
    let server = MockServer::start().await;
    let body = json!({ "code": 200, "data": { "results": [] } });
    Mock::given(method("GET"))
        .and(path("/v1/public/comics/9"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&server)
        .await;

    let err = client(&server).section_item(&comic_ref(&server, 9)).await.unwrap_err();
    assert_eq!(err, DataError::Serialization);
}

#[tokio::test]
async fn test_slow_response_maps_to_request_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/public/characters"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "data": { "results": [] } }))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let err = client_with_timeout(&server.uri(), Duration::from_millis(200))
        .characters(0, 20)
        .await
        .unwrap_err();
    assert_eq!(err, DataError::RequestTimeout);
}

#[tokio::test]
async fn test_unreachable_host_maps_to_no_internet() {
    // Nothing listens on port 1.
    let err = client_with_timeout("http://127.0.0.1:1", Duration::from_secs(5))
        .characters(0, 20)
        .await
        .unwrap_err();
    assert_eq!(err, DataError::NoInternet);
}
