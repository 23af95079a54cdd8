//! Integration tests for lazy pagination.
//!
//! These tests verify that listings fetch pages strictly on demand, stop on
//! the right page for both the key-cursor and offset schemes, and can be
//! resumed from a cursor.

use albert::resources::{Tag, User};
use albert::rest::{Cursor, ListQuery, OrderBy};
use albert::{AccessToken, Albert, AlbertConfig, BaseUrl, ResourceError};
use futures::StreamExt;
use serde_json::{json, Value};
use tokio_test::{assert_err, assert_ok};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn create_albert(server: &MockServer) -> Albert {
    let config = AlbertConfig::builder()
        .base_url(BaseUrl::new(server.uri()).unwrap())
        .token(AccessToken::new("test-token").unwrap())
        .build()
        .unwrap();
    Albert::new(config).unwrap()
}

fn tags(range: std::ops::RangeInclusive<u32>) -> Vec<Value> {
    range
        .map(|n| json!({"albertId": format!("TAG{n}"), "name": format!("tag-{n}")}))
        .collect()
}

fn users(range: std::ops::RangeInclusive<u32>) -> Vec<Value> {
    range
        .map(|n| json!({"albertId": format!("USR{n}"), "name": format!("user-{n}")}))
        .collect()
}

/// Serves 7 tags in pages of 3: TAG1-3 (lastKey k3), TAG4-6 (lastKey k6), TAG7
async fn mount_tag_pages(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api/v3/tags"))
        .and(query_param("startKey", "k6"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"Items": tags(7..=7)})))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v3/tags"))
        .and(query_param("startKey", "k3"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"Items": tags(4..=6), "lastKey": "k6"})),
        )
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v3/tags"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"Items": tags(1..=3), "lastKey": "k3"})),
        )
        .mount(server)
        .await;
}

/// Serves 5 users in pages of 2 from the offset-paged search endpoint
async fn mount_user_pages(server: &MockServer) {
    for (offset, range) in [(0, 1..=2), (2, 3..=4), (4, 5..=5)] {
        Mock::given(method("GET"))
            .and(path("/api/v3/users/search"))
            .and(query_param("offset", offset.to_string()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "Items": users(range),
                "offset": offset,
                "total": 5
            })))
            .mount(server)
            .await;
    }
}

async fn request_count(server: &MockServer) -> usize {
    server.received_requests().await.map_or(0, |r| r.len())
}

// === Key Cursor Tests ===

/// Test 1: Full iteration yields every item once, in order, with ceil(N/P) requests
#[tokio::test]
async fn test_key_pagination_yields_all_items_in_order() {
    let server = MockServer::start().await;
    mount_tag_pages(&server).await;
    let albert = create_albert(&server);

    let items = albert
        .tags()
        .list(ListQuery::new().limit(3))
        .unwrap()
        .collect_all()
        .await
        .unwrap();

    let ids: Vec<_> = items.iter().filter_map(|t| t.id.clone()).collect();
    assert_eq!(
        ids,
        vec!["TAG1", "TAG2", "TAG3", "TAG4", "TAG5", "TAG6", "TAG7"]
    );
    assert_eq!(request_count(&server).await, 3);
}

/// Test 2: Stopping early issues only the requests the consumed items need
#[tokio::test]
async fn test_key_pagination_stops_early() {
    let server = MockServer::start().await;
    mount_tag_pages(&server).await;
    let albert = create_albert(&server);

    let mut pages = albert.tags().list(ListQuery::new().limit(3)).unwrap();
    for _ in 0..4 {
        assert_ok!(pages.next().await);
    }
    drop(pages);

    assert_eq!(request_count(&server).await, 2);
}

/// Test 3: No request is made before the first item is pulled
#[tokio::test]
async fn test_listing_is_lazy() {
    let server = MockServer::start().await;
    mount_tag_pages(&server).await;
    let albert = create_albert(&server);

    let pages = albert.tags().list(ListQuery::new().limit(3)).unwrap();
    assert_eq!(pages.cursor(), None);
    assert_eq!(request_count(&server).await, 0);
}

/// Test 4: The stream form yields the same items and respects `take`
#[tokio::test]
async fn test_stream_take_limits_requests() {
    let server = MockServer::start().await;
    mount_tag_pages(&server).await;
    let albert = create_albert(&server);

    let stream = albert
        .tags()
        .list(ListQuery::new().limit(3))
        .unwrap()
        .into_stream();
    let taken: Vec<Result<Tag, ResourceError>> = stream.take(2).collect().await;

    assert_eq!(taken.len(), 2);
    assert_eq!(taken[1].as_ref().unwrap().name, "tag-2");
    assert_eq!(request_count(&server).await, 1);
}

/// Test 5: A saved cursor resumes the listing at the next page
#[tokio::test]
async fn test_resume_from_key_cursor() {
    let server = MockServer::start().await;
    mount_tag_pages(&server).await;
    let albert = create_albert(&server);

    let mut first = albert.tags().list(ListQuery::new().limit(3)).unwrap();
    let page = first.next_page().await.unwrap().unwrap();
    assert_eq!(page.items.len(), 3);
    assert_eq!(page.next, Some(Cursor::Key("k3".to_string())));

    let resumed = albert
        .tags()
        .list(ListQuery::new().limit(3).cursor(page.next.unwrap()))
        .unwrap()
        .collect_all()
        .await
        .unwrap();
    assert_eq!(resumed.first().map(|t| t.name.as_str()), Some("tag-4"));
    assert_eq!(resumed.len(), 4);
}

/// Test 6: Query options are serialized onto every page request
#[tokio::test]
async fn test_query_parameters_reach_the_server() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v3/tags"))
        .and(query_param("limit", "10"))
        .and(query_param("orderBy", "desc"))
        .and(query_param("name", "solvent"))
        .and(query_param("exactMatch", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"Items": []})))
        .expect(1)
        .mount(&server)
        .await;
    let albert = create_albert(&server);

    let items = albert
        .tags()
        .list(
            ListQuery::new()
                .limit(10)
                .order(OrderBy::Descending)
                .name("solvent")
                .exact_match(true),
        )
        .unwrap()
        .collect_all()
        .await
        .unwrap();
    assert!(items.is_empty());
}

// === Offset Tests ===

/// Test 7: Offset listings advance by the number of items received and stop at total
#[tokio::test]
async fn test_offset_pagination_yields_all_items() {
    let server = MockServer::start().await;
    mount_user_pages(&server).await;
    let albert = create_albert(&server);

    let mut pages = albert.users().list(ListQuery::new().limit(2)).unwrap();
    let mut names = Vec::new();
    while let Some(user) = pages.next().await.unwrap() {
        names.push(user.name);
    }

    assert_eq!(names, vec!["user-1", "user-2", "user-3", "user-4", "user-5"]);
    assert_eq!(pages.total(), Some(5));
    assert_eq!(request_count(&server).await, 3);
}

/// Test 8: Stopping after the first page leaves the rest unfetched
#[tokio::test]
async fn test_offset_pagination_stops_early() {
    let server = MockServer::start().await;
    mount_user_pages(&server).await;
    let albert = create_albert(&server);

    let mut pages = albert.users().list(ListQuery::new().limit(2)).unwrap();
    let first: Option<User> = pages.next().await.unwrap();
    assert_eq!(first.unwrap().name, "user-1");
    assert_eq!(pages.cursor(), Some(Cursor::Offset(2)));

    assert_eq!(request_count(&server).await, 1);
}

/// Test 9: Pages shorter than the limit still continue while a lastKey is returned
#[tokio::test]
async fn test_key_pagination_follows_last_key_past_short_pages() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v3/tags"))
        .and(query_param("startKey", "k2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"Items": tags(3..=3)})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v3/tags"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"Items": tags(1..=2), "lastKey": "k2"})),
        )
        .mount(&server)
        .await;
    let albert = create_albert(&server);

    let items = albert
        .tags()
        .list(ListQuery::new().limit(3))
        .unwrap()
        .collect_all()
        .await
        .unwrap();

    assert_eq!(items.len(), 3);
    assert_eq!(request_count(&server).await, 2);
}

/// Test 10: Offset listings trust total over the page length
#[tokio::test]
async fn test_offset_pagination_continues_until_total() {
    let server = MockServer::start().await;
    for (offset, range) in [(0, 1..=2), (2, 3..=3)] {
        Mock::given(method("GET"))
            .and(path("/api/v3/users/search"))
            .and(query_param("offset", offset.to_string()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "Items": users(range),
                "offset": offset,
                "total": 3
            })))
            .mount(&server)
            .await;
    }
    let albert = create_albert(&server);

    let items = albert
        .users()
        .list(ListQuery::new().limit(3))
        .unwrap()
        .collect_all()
        .await
        .unwrap();

    assert_eq!(items.len(), 3);
    assert_eq!(request_count(&server).await, 2);
}

/// Test 11: Without a total, a short offset page is the last one
#[tokio::test]
async fn test_offset_pagination_without_total_stops_on_short_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v3/users/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"Items": users(1..=2)})))
        .expect(1)
        .mount(&server)
        .await;
    let albert = create_albert(&server);

    let items = albert
        .users()
        .list(ListQuery::new().limit(3))
        .unwrap()
        .collect_all()
        .await
        .unwrap();
    assert_eq!(items.len(), 2);
}

// === Error Tests ===

/// Test 12: An unsupported filter is rejected before any request
#[tokio::test]
async fn test_unknown_filter_makes_no_request() {
    let server = MockServer::start().await;
    let albert = create_albert(&server);

    let result = albert
        .inventory()
        .list(ListQuery::new().filter("colour", "red"));
    let error = assert_err!(result);

    assert!(matches!(
        error,
        ResourceError::InvalidQuery { resource: "Inventory", ref key, .. } if key == "colour"
    ));
    assert_eq!(request_count(&server).await, 0);
}

/// Test 13: A malformed item fails the page with a validation error
#[tokio::test]
async fn test_malformed_item_fails_the_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v3/tags"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Items": [{"albertId": "TAG1", "name": "ok"}, {"albertId": "TAG2"}]
        })))
        .mount(&server)
        .await;
    let albert = create_albert(&server);

    let mut pages = albert.tags().list(ListQuery::new()).unwrap();
    let error = assert_err!(pages.next().await);

    match error {
        ResourceError::Validation(e) => assert_eq!(e.fields(), vec!["name"]),
        other => panic!("expected validation error, got {other:?}"),
    }
}

/// Test 14: A cursor from the other paging scheme is rejected before any request
#[tokio::test]
async fn test_mismatched_cursor_makes_no_request() {
    let server = MockServer::start().await;
    let albert = create_albert(&server);

    let result = albert
        .tags()
        .list(ListQuery::new().cursor(Cursor::Offset(10)));
    let error = assert_err!(result);

    assert!(matches!(
        error,
        ResourceError::InvalidQuery { resource: "Tag", ref key, .. } if key == "cursor"
    ));
    assert_eq!(request_count(&server).await, 0);
}
