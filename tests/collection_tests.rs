//! Integration tests for the generic resource collection.
//!
//! These tests drive create/get/update/delete through the `Albert` facade
//! against a mock server and verify request shapes, error mapping, delete
//! tombstones and change tracking.

use std::time::Duration;

use albert::resources::{Company, Inventory, InventoryCategory, Project, Tag, User};
use albert::rest::{
    AlbertResource, Collection, TrackedResource, NAME_SCAN_PAGES, NAME_SCAN_PAGE_SIZE,
};
use albert::{AccessToken, Albert, AlbertConfig, BaseUrl, ResourceError, RetryPolicy};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio_test::{assert_err, assert_ok};
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn create_albert(server: &MockServer) -> Albert {
    let config = AlbertConfig::builder()
        .base_url(BaseUrl::new(server.uri()).unwrap())
        .token(AccessToken::new("test-token").unwrap())
        .retry_policy(RetryPolicy::no_retries())
        .timeout(Duration::from_millis(500))
        .build()
        .unwrap();
    Albert::new(config).unwrap()
}

async fn request_count(server: &MockServer) -> usize {
    server.received_requests().await.map_or(0, |r| r.len())
}

fn respond(body: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(body)
}

// === Create / Get ===

/// Test 1: create then get_by_id returns an equal model
#[tokio::test]
async fn test_create_then_get_returns_equal_model() {
    let server = MockServer::start().await;
    let saved = json!({"albertId": "TAG1", "name": "solvent", "status": "active"});
    Mock::given(method("POST"))
        .and(path("/api/v3/tags"))
        .and(body_json(json!({"name": "solvent"})))
        .respond_with(respond(saved.clone()))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v3/tags/TAG1"))
        .respond_with(respond(saved))
        .mount(&server)
        .await;
    let albert = create_albert(&server);

    let created = albert.tags().create(&Tag::new("solvent")).await.unwrap();
    let fetched = albert.tags().get_by_id("TAG1").await.unwrap();

    assert_eq!(created.id.as_deref(), Some("TAG1"));
    assert_eq!(created, fetched);
}

/// Test 2: A model that already has an id is rejected locally
#[tokio::test]
async fn test_create_with_id_makes_no_request() {
    let server = MockServer::start().await;
    let albert = create_albert(&server);

    let error = assert_err!(albert.tags().create(&Tag::new("x").with_id("TAG1")).await);

    match error {
        ResourceError::Validation(e) => assert_eq!(e.fields(), vec!["albertId"]),
        other => panic!("expected validation error, got {other:?}"),
    }
    assert_eq!(request_count(&server).await, 0);
}

/// Test 3: Local validation failures never reach the server
#[tokio::test]
async fn test_invalid_model_is_not_sent() {
    let server = MockServer::start().await;
    let albert = create_albert(&server);

    let formula = Inventory::new("Blend", InventoryCategory::Formulas);
    let error = assert_err!(albert.inventory().create(&formula).await);

    assert!(matches!(error, ResourceError::Validation(_)));
    assert_eq!(request_count(&server).await, 0);
}

/// Test 4: Ids without the resource prefix are normalised
#[tokio::test]
async fn test_get_by_id_adds_prefix() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v3/projects/PRO123"))
        .respond_with(respond(json!({
            "projectId": "PRO123",
            "description": "Coatings",
            "category": "Research"
        })))
        .expect(1)
        .mount(&server)
        .await;
    let albert = create_albert(&server);

    let project: Project = albert.projects().get_by_id("123").await.unwrap();
    assert_eq!(project.id.as_deref(), Some("PRO123"));
}

/// Test 5: A 404 becomes NotFound with the resource and id
#[tokio::test]
async fn test_get_missing_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"title": "Not Found"})))
        .mount(&server)
        .await;
    let albert = create_albert(&server);

    let error = assert_err!(albert.companies().get_by_id("COM9").await);
    assert!(matches!(
        error,
        ResourceError::NotFound { resource: "Company", ref id } if id == "COM9"
    ));
}

/// Test 6: A duplicate create surfaces as a conflict
#[tokio::test]
async fn test_create_conflict() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(409).set_body_json(json!({"message": "Tag already exists"})),
        )
        .mount(&server)
        .await;
    let albert = create_albert(&server);

    let error = assert_err!(albert.tags().create(&Tag::new("dup")).await);
    match error {
        ResourceError::Conflict {
            status, message, ..
        } => {
            assert_eq!(status, Some(409));
            assert_eq!(message, "Tag already exists");
        }
        other => panic!("expected conflict, got {other:?}"),
    }
}

/// Test 7: A create that times out after sending is ambiguous
#[tokio::test]
async fn test_create_timeout_is_ambiguous() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(respond(json!({"albertId": "TAG1", "name": "slow"})).set_delay(Duration::from_secs(3)))
        .mount(&server)
        .await;
    let albert = create_albert(&server);

    let error = assert_err!(albert.tags().create(&Tag::new("slow")).await);
    assert!(matches!(
        error,
        ResourceError::AmbiguousOutcome { resource: "Tag", ref method, .. } if method == "POST"
    ));
    assert_eq!(request_count(&server).await, 1);
}

/// Test 8: A client without credentials fails with an auth configuration error
#[tokio::test]
async fn test_missing_credentials() {
    let server = MockServer::start().await;
    let config = AlbertConfig::builder()
        .base_url(BaseUrl::new(server.uri()).unwrap())
        .build()
        .unwrap();
    let albert = Albert::new(config).unwrap();

    let error = assert_err!(albert.tags().get_by_id("TAG1").await);
    assert!(matches!(error, ResourceError::AuthConfiguration(_)));
    assert_eq!(request_count(&server).await, 0);
}

/// Test 9: get_by_name returns only an exact name match
#[tokio::test]
async fn test_get_by_name_picks_exact_match() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v3/tags"))
        .and(query_param("name", "solvent"))
        .and(query_param("exactMatch", "true"))
        .respond_with(respond(json!({"Items": [
            {"albertId": "TAG1", "name": "Solvent"},
            {"albertId": "TAG2", "name": "solvent"}
        ]})))
        .mount(&server)
        .await;
    let albert = create_albert(&server);

    let found = albert.tags().get_by_name("solvent").await.unwrap().unwrap();
    assert_eq!(found.id.as_deref(), Some("TAG2"));
}

/// Test 10: get_by_name on an offset-paged resource scans a bounded number of pages
#[tokio::test]
async fn test_get_by_name_scan_is_bounded() {
    let server = MockServer::start().await;
    let page: Vec<_> = (0..NAME_SCAN_PAGE_SIZE)
        .map(|n| json!({"albertId": format!("USR{n}"), "name": format!("Ada {n}")}))
        .collect();
    Mock::given(method("GET"))
        .and(path("/api/v3/users/search"))
        .and(query_param("text", "Ada"))
        .respond_with(respond(json!({"Items": page, "total": 10_000})))
        .mount(&server)
        .await;
    let albert = create_albert(&server);

    let found = albert.users().get_by_name("Ada").await.unwrap();
    assert!(found.is_none());
    assert_eq!(request_count(&server).await, NAME_SCAN_PAGES);
}

// === Update ===

/// Test 11: update with an id unknown to the server fails with NotFound
#[tokio::test]
async fn test_update_unknown_id_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v3/companies/COM404"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    let albert = create_albert(&server);

    let company = Company::new("Ghost").with_id("COM404");
    let error = assert_err!(albert.companies().update(&company).await);

    assert!(matches!(error, ResourceError::NotFound { resource: "Company", .. }));
    assert_eq!(request_count(&server).await, 1);
}

/// Test 12: update sends only the changed attributes and returns the server state
#[tokio::test]
async fn test_update_patches_changed_fields() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v3/companies/COM1"))
        .respond_with(respond(json!({"albertId": "COM1", "name": "Acme"})))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/api/v3/companies/COM1"))
        .and(body_json(json!({"data": [{
            "operation": "update",
            "attribute": "name",
            "oldValue": "Acme",
            "newValue": "Acme Corp"
        }]})))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v3/companies/COM1"))
        .respond_with(respond(json!({"albertId": "COM1", "name": "Acme Corp"})))
        .mount(&server)
        .await;
    let albert = create_albert(&server);

    let updated = albert
        .companies()
        .update(&Company::new("Acme Corp").with_id("COM1"))
        .await
        .unwrap();

    assert_eq!(updated.name, "Acme Corp");
    assert_eq!(request_count(&server).await, 3);
}

/// Test 13: An update with nothing to change sends no PATCH
#[tokio::test]
async fn test_update_without_changes_sends_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v3/companies/COM1"))
        .respond_with(respond(json!({"albertId": "COM1", "name": "Acme"})))
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&server)
        .await;
    let albert = create_albert(&server);

    let result = albert
        .companies()
        .update(&Company::new("Acme").with_id("COM1"))
        .await
        .unwrap();
    assert_eq!(result.name, "Acme");
}

/// Test 14: Inventory sends one PATCH per operation
#[tokio::test]
async fn test_inventory_update_splits_operations() {
    let server = MockServer::start().await;
    let current = json!({
        "albertId": "INV1",
        "name": "Resin",
        "category": "RawMaterials",
        "unitCategory": "mass"
    });
    Mock::given(method("GET"))
        .and(path("/api/v3/inventories/INV1"))
        .respond_with(respond(current.clone()))
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(body_json(json!({"data": [
            {"operation": "update", "attribute": "name", "oldValue": "Resin", "newValue": "Resin B"}
        ]})))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(body_json(json!({"data": [
            {"operation": "add", "attribute": "description", "newValue": "Clear grade"}
        ]})))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    let albert = create_albert(&server);

    let mut item = Inventory::from_wire(current).unwrap();
    item.name = "Resin B".to_string();
    item.description = Some("Clear grade".to_string());
    assert_ok!(albert.inventory().update(&item).await);
}

/// Test 15: Users are updated with a full PUT
#[tokio::test]
async fn test_user_update_replaces_document() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v3/users/USR1"))
        .respond_with(respond(json!({"albertId": "USR1", "name": "Ada"})))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/v3/users/USR1"))
        .and(body_json(json!({
            "albertId": "USR1",
            "name": "Ada Lovelace",
            "email": "ada@example.com",
            "userClass": "standard"
        })))
        .respond_with(respond(json!({
            "albertId": "USR1",
            "name": "Ada Lovelace",
            "email": "ada@example.com",
            "userClass": "standard"
        })))
        .expect(1)
        .mount(&server)
        .await;
    let albert = create_albert(&server);

    let mut user = User::new("Ada Lovelace", "ada@example.com");
    user.id = Some("USR1".to_string());
    let saved = albert.users().update(&user).await.unwrap();
    assert_eq!(saved, user);
}

// === Tracked Updates ===

/// Test 16: An unchanged tracked resource issues no request
#[tokio::test]
async fn test_update_tracked_unchanged_sends_nothing() {
    let server = MockServer::start().await;
    let albert = create_albert(&server);

    let mut tracked = TrackedResource::from_existing(Tag::new("solvent").with_id("TAG1"));
    let result = albert.tags().update_tracked(&mut tracked).await.unwrap();

    assert_eq!(result.name, "solvent");
    assert_eq!(request_count(&server).await, 0);
}

/// Test 17: A changed tracked resource is patched without a pre-fetch and reset
#[tokio::test]
async fn test_update_tracked_patches_and_resets() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/api/v3/tags/TAG1"))
        .and(body_json(json!({"data": [{
            "operation": "update",
            "attribute": "name",
            "oldValue": "solvent",
            "newValue": "solvents"
        }]})))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v3/tags/TAG1"))
        .respond_with(respond(json!({"albertId": "TAG1", "name": "solvents"})))
        .expect(1)
        .mount(&server)
        .await;
    let albert = create_albert(&server);

    let mut tracked = TrackedResource::from_existing(Tag::new("solvent").with_id("TAG1"));
    tracked.name = "solvents".to_string();
    albert.tags().update_tracked(&mut tracked).await.unwrap();

    assert!(!tracked.is_dirty());
    assert_eq!(tracked.original().map(|t| t.name.as_str()), Some("solvents"));
}

// === Delete ===

/// Test 18: Deleted ids become stale for later update and delete calls
#[tokio::test]
async fn test_deleted_ids_are_stale() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/v3/companies/COM1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    let albert = create_albert(&server);

    albert.companies().delete("COM1").await.unwrap();
    assert!(albert.companies().is_deleted("1"));

    let error = assert_err!(
        albert
            .companies()
            .update(&Company::new("Acme").with_id("COM1"))
            .await
    );
    assert!(matches!(error, ResourceError::StaleResource { resource: "Company", .. }));

    let error = assert_err!(albert.companies().delete("COM1").await);
    assert!(matches!(error, ResourceError::StaleResource { .. }));
    assert_eq!(request_count(&server).await, 1);
}

/// Test 19: Deleting a missing company is an error
#[tokio::test]
async fn test_delete_missing_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    let albert = create_albert(&server);

    let error = assert_err!(albert.companies().delete("COM2").await);
    assert!(matches!(error, ResourceError::NotFound { .. }));
    assert!(!albert.companies().is_deleted("COM2"));
}

/// Test 20: Tag deletes are idempotent
#[tokio::test]
async fn test_tag_delete_is_idempotent() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/v3/tags/TAG5"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;
    let albert = create_albert(&server);

    assert_ok!(albert.tags().delete("TAG5").await);
    assert_ok!(albert.tags().delete("TAG5").await);
}

/// Test 21: Collections handed out by the facade share their tombstones
#[tokio::test]
async fn test_tombstones_persist_across_accessor_calls() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;
    let albert = create_albert(&server);

    albert.locations().delete("LOC1").await.unwrap();
    let clone = albert.locations().clone();
    assert!(clone.is_deleted("LOC1"));
}

/// Test 22: A delete that times out after sending is ambiguous and not retried
#[tokio::test]
async fn test_delete_timeout_is_ambiguous() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/v3/companies/COM1"))
        .respond_with(ResponseTemplate::new(204).set_delay(Duration::from_secs(3)))
        .mount(&server)
        .await;
    let albert = create_albert(&server);

    let error = assert_err!(albert.companies().delete("COM1").await);
    assert!(matches!(
        error,
        ResourceError::AmbiguousOutcome { resource: "Company", ref method, .. } if method == "DELETE"
    ));
    assert!(!albert.companies().is_deleted("COM1"));
    assert_eq!(request_count(&server).await, 1);
}

// === Optimistic Concurrency ===

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Notebook {
    #[serde(rename = "albertId", default, skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    revision: Option<String>,
}

impl AlbertResource for Notebook {
    const NAME: &'static str = "Notebook";
    const PATH: &'static str = "/api/v3/notebooks";
    const ID_PREFIX: &'static str = "NTB";
    const REQUIRED_FIELDS: &'static [&'static str] = &["name"];
    const READ_ONLY_FIELDS: &'static [&'static str] = &["revision"];
    const PATCHABLE: &'static [&'static str] = &["name"];
    const REVISION_FIELD: Option<&'static str> = Some("revision");

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }
}

/// Test 23: A stale revision is rejected before any write
#[tokio::test]
async fn test_revision_mismatch_is_a_conflict() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v3/notebooks/NTB1"))
        .respond_with(respond(json!({"albertId": "NTB1", "name": "Log", "revision": "r2"})))
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&server)
        .await;
    let albert = create_albert(&server);
    let notebooks: Collection<Notebook> = Collection::new(albert.http());

    let stale = Notebook {
        id: Some("NTB1".to_string()),
        name: "Log book".to_string(),
        revision: Some("r1".to_string()),
    };
    let error = assert_err!(notebooks.update(&stale).await);

    match error {
        ResourceError::Conflict { status, message, .. } => {
            assert_eq!(status, None);
            assert!(message.contains("r1"));
        }
        other => panic!("expected conflict, got {other:?}"),
    }
}

/// Test 24: A matching revision goes through
#[tokio::test]
async fn test_matching_revision_is_patched() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v3/notebooks/NTB1"))
        .respond_with(respond(json!({"albertId": "NTB1", "name": "Log", "revision": "r1"})))
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    let albert = create_albert(&server);
    let notebooks = Collection::<Notebook>::new(albert.http());

    let fresh = Notebook {
        id: Some("NTB1".to_string()),
        name: "Log book".to_string(),
        revision: Some("r1".to_string()),
    };
    assert_ok!(notebooks.update(&fresh).await);
}
