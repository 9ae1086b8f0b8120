#![allow(clippy::unwrap_used)]
// Integration tests for `ResourceService` against a wiremock SCM API.

use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use uuid::Uuid;
use wiremock::matchers::{bearer_token, body_partial_json, method, path, query_param};
use wiremock::{Match, Mock, MockServer, Request, ResponseTemplate};

use scm_core::model::{Address, AddressCreate, AddressFilter, AddressType, AddressValue};
use scm_core::{
    ClientConfig, Container, ContainerFields, CoreError, Credentials, ErrorKind, ListQuery, Scm,
};

const TOKEN_PATH: &str = "/am/oauth2/access_token";
const ADDRESSES: &str = "/config/objects/v1/addresses";

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, Scm) {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "tok",
            "token_type": "Bearer",
            "expires_in": 899
        })))
        .mount(&server)
        .await;

    let config = ClientConfig::new(Credentials::new("svc", "secret", "1234567890"))
        .api_url(server.uri())
        .token_url(format!("{}{TOKEN_PATH}", server.uri()));
    (server, Scm::new(config).unwrap())
}

fn uuid(i: usize) -> String {
    format!("00000000-0000-4000-8000-{i:012}")
}

fn address(i: usize, name: &str, folder: &str) -> Value {
    json!({
        "id": uuid(i),
        "name": name,
        "ip_netmask": format!("10.0.{}.{}/32", i / 256 % 256, i % 256),
        "folder": folder
    })
}

fn page(data: Vec<Value>, total: usize, limit: u32, offset: usize) -> Value {
    json!({ "data": data, "total": total, "limit": limit, "offset": offset })
}

fn names(records: &[Address]) -> Vec<&str> {
    records.iter().map(|a| a.name.as_str()).collect()
}

/// Matches a JSON body that has no top-level `id` key.
struct BodyWithoutId;

impl Match for BodyWithoutId {
    fn matches(&self, request: &Request) -> bool {
        serde_json::from_slice::<Value>(&request.body)
            .ok()
            .and_then(|v| v.as_object().map(|o| !o.contains_key("id")))
            .unwrap_or(false)
    }
}

// ── Create / get / update / delete ──────────────────────────────────

#[tokio::test]
async fn test_create_posts_payload_with_container() {
    let (server, scm) = setup().await;

    Mock::given(method("POST"))
        .and(path(ADDRESSES))
        .and(bearer_token("tok"))
        .and(body_partial_json(json!({
            "name": "internal_network",
            "ip_netmask": "192.168.1.0/24",
            "folder": "Texas"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": "123e4567-e89b-12d3-a456-426655440000",
            "name": "internal_network",
            "ip_netmask": "192.168.1.0/24",
            "folder": "Texas"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let payload = AddressCreate::new(
        "internal_network",
        AddressValue::IpNetmask("192.168.1.0/24".into()),
        Container::folder("Texas"),
    );
    let created = scm.address.create(&payload).await.unwrap();

    assert_eq!(
        created.id,
        Uuid::parse_str("123e4567-e89b-12d3-a456-426655440000").unwrap()
    );
    assert_eq!(created.container.folder.as_deref(), Some("Texas"));
}

#[tokio::test]
async fn test_create_with_two_containers_sends_nothing() {
    let (server, scm) = setup().await;

    Mock::given(method("POST"))
        .and(path(ADDRESSES))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let mut payload = AddressCreate::new(
        "internal_network",
        AddressValue::Fqdn("example.com".into()),
        Container::folder("Texas"),
    );
    payload.container = ContainerFields {
        folder: Some("Texas".into()),
        snippet: Some("Baseline".into()),
        device: None,
    };

    let err = scm.address.create(&payload).await.unwrap_err();
    assert!(matches!(err, CoreError::InvalidContainer { provided: 2 }));
    assert_eq!(err.code(), "missing_or_conflicting_container");
}

#[tokio::test]
async fn test_get_missing_object_names_the_entity() {
    let (server, scm) = setup().await;
    let id = Uuid::parse_str(&uuid(7)).unwrap();

    Mock::given(method("GET"))
        .and(path(format!("{ADDRESSES}/{id}")))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "_errors": [{ "code": "E005", "message": "Object Not Present" }],
            "_request_id": "req-1"
        })))
        .mount(&server)
        .await;

    let err = scm.address.get(&id).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(err.code(), "E005");
    assert!(err.to_string().contains(&id.to_string()));
}

#[tokio::test]
async fn test_update_puts_to_id_path_without_id_in_body() {
    let (server, scm) = setup().await;
    let current: Address = serde_json::from_value(address(3, "web", "Texas")).unwrap();

    Mock::given(method("PUT"))
        .and(path(format!("{ADDRESSES}/{}", current.id)))
        .and(BodyWithoutId)
        .and(body_partial_json(json!({ "name": "web", "description": "frontend" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": uuid(3),
            "name": "web",
            "description": "frontend",
            "ip_netmask": "10.0.0.3/32",
            "folder": "Texas"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut changed = current.clone();
    changed.description = Some("frontend".into());
    let updated = scm.address.update(&changed).await.unwrap();

    assert_eq!(updated.id, current.id);
    assert_eq!(updated.description.as_deref(), Some("frontend"));
}

#[tokio::test]
async fn test_delete_of_referenced_object_is_a_conflict() {
    let (server, scm) = setup().await;
    let id = Uuid::parse_str(&uuid(9)).unwrap();

    Mock::given(method("DELETE"))
        .and(path(format!("{ADDRESSES}/{id}")))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "_errors": [{
                "code": "E009",
                "message": "Reference Not Zero",
                "details": { "errorType": "Reference Not Zero", "message": ["in use by rule allow-web"] }
            }],
            "_request_id": "req-2"
        })))
        .mount(&server)
        .await;

    let err = scm.address.delete(&id).await.unwrap_err();
    assert!(matches!(err, CoreError::ReferenceNotZero { status: 409, .. }));
    assert_eq!(err.kind(), ErrorKind::Conflict);
    assert_eq!(err.code(), "E009");
    assert!(err.details().is_some());
}

// ── list() ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_list_paginates_12000_records_in_three_requests() {
    let (server, scm) = setup().await;
    let all: Vec<Value> = (0..12_000)
        .map(|i| address(i, &format!("addr-{i}"), "Texas"))
        .collect();

    for (offset, end) in [(0, 5000), (5000, 10_000), (10_000, 12_000)] {
        Mock::given(method("GET"))
            .and(path(ADDRESSES))
            .and(query_param("folder", "Texas"))
            .and(query_param("limit", "5000"))
            .and(query_param("offset", offset.to_string()))
            .respond_with(ResponseTemplate::new(200).set_body_json(page(
                all[offset..end].to_vec(),
                12_000,
                5000,
                offset,
            )))
            .expect(1)
            .mount(&server)
            .await;
    }

    let query = ListQuery::new(Container::folder("Texas")).max_limit(5000);
    let records = scm.address.list(&query).await.unwrap();

    assert_eq!(records.len(), 12_000);
    assert_eq!(records[0].name, "addr-0");
    assert_eq!(records[11_999].name, "addr-11999");
}

#[tokio::test]
async fn test_list_clamps_oversized_limit() {
    let (server, scm) = setup().await;

    Mock::given(method("GET"))
        .and(path(ADDRESSES))
        .and(query_param("limit", "5000"))
        .and(query_param("offset", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(
            vec![address(1, "a", "Texas")],
            1,
            5000,
            0,
        )))
        .expect(1)
        .mount(&server)
        .await;

    let query = ListQuery::new(Container::folder("Texas")).max_limit(10_000);
    let records = scm.address.list(&query).await.unwrap();
    assert_eq!(names(&records), ["a"]);
}

#[tokio::test]
async fn test_list_uses_resource_default_limit() {
    let (server, scm) = setup().await;

    Mock::given(method("GET"))
        .and(path(ADDRESSES))
        .and(query_param("limit", "2500"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(Vec::new(), 0, 2500, 0)))
        .expect(1)
        .mount(&server)
        .await;

    let query = ListQuery::<AddressFilter>::new(Container::folder("Texas"));
    assert!(scm.address.list(&query).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_list_rejects_zero_limit_without_request() {
    let (server, scm) = setup().await;

    Mock::given(method("GET"))
        .and(path(ADDRESSES))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let query = ListQuery::<AddressFilter>::new(Container::folder("Texas")).max_limit(0);
    let err = scm.address.list(&query).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
}

#[tokio::test]
async fn test_list_applies_exact_match_exclusions_and_filters_in_order() {
    let (server, scm) = setup().await;

    let mut fqdn = address(4, "site", "Texas");
    fqdn.as_object_mut().unwrap().remove("ip_netmask");
    fqdn["fqdn"] = json!("example.com");

    let data = vec![
        address(1, "local", "Texas"),
        address(2, "shared", "Shared"),
        address(3, "global", "All"),
        fqdn,
    ];
    Mock::given(method("GET"))
        .and(path(ADDRESSES))
        .and(query_param("folder", "Texas"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(data, 4, 2500, 0)))
        .mount(&server)
        .await;

    let exact = ListQuery::<AddressFilter>::new(Container::folder("Texas")).exact_match(true);
    assert_eq!(names(&scm.address.list(&exact).await.unwrap()), ["local", "site"]);

    let excluded = ListQuery::<AddressFilter>::new(Container::folder("Texas"))
        .exclude_folders(["All", "Shared"]);
    assert_eq!(names(&scm.address.list(&excluded).await.unwrap()), ["local", "site"]);

    let fqdn_only = ListQuery::new(Container::folder("Texas")).filter(AddressFilter {
        types: Some(vec![AddressType::Fqdn]),
        ..AddressFilter::default()
    });
    assert_eq!(names(&scm.address.list(&fqdn_only).await.unwrap()), ["site"]);

    let nothing = ListQuery::new(Container::folder("Texas")).filter(AddressFilter {
        tags: Some(Vec::new()),
        ..AddressFilter::default()
    });
    assert!(scm.address.list(&nothing).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_list_fails_whole_call_on_page_error() {
    let (server, scm) = setup().await;

    Mock::given(method("GET"))
        .and(path(ADDRESSES))
        .and(query_param("offset", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(
            (0..2).map(|i| address(i, &format!("a{i}"), "Texas")).collect(),
            4,
            2,
            0,
        )))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(ADDRESSES))
        .and(query_param("offset", "2"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let query = ListQuery::<AddressFilter>::new(Container::folder("Texas")).max_limit(2);
    let err = scm.address.list(&query).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Server);
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_list_rejects_malformed_listing() {
    let (server, scm) = setup().await;

    Mock::given(method("GET"))
        .and(path(ADDRESSES))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "items": [] })))
        .mount(&server)
        .await;

    let query = ListQuery::<AddressFilter>::new(Container::folder("Texas"));
    let err = scm.address.list(&query).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ResponseShape);
}

// ── fetch() ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_fetch_returns_single_exact_match() {
    let (server, scm) = setup().await;

    Mock::given(method("GET"))
        .and(path(ADDRESSES))
        .and(query_param("name", "web"))
        .and(query_param("folder", "Texas"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(
            vec![address(1, "web", "Shared"), address(2, "web", "Texas")],
            2,
            200,
            0,
        )))
        .mount(&server)
        .await;

    let found = scm
        .address
        .fetch("web", &Container::folder("Texas"))
        .await
        .unwrap();
    assert_eq!(found.id, Uuid::parse_str(&uuid(2)).unwrap());
}

#[tokio::test]
async fn test_fetch_accepts_bare_object_response() {
    let (server, scm) = setup().await;

    Mock::given(method("GET"))
        .and(path(ADDRESSES))
        .and(query_param("name", "web"))
        .respond_with(ResponseTemplate::new(200).set_body_json(address(5, "web", "Texas")))
        .mount(&server)
        .await;

    let found = scm
        .address
        .fetch("web", &Container::folder("Texas"))
        .await
        .unwrap();
    assert_eq!(found.name, "web");
}

#[tokio::test]
async fn test_fetch_inherited_only_is_not_found() {
    let (server, scm) = setup().await;

    Mock::given(method("GET"))
        .and(path(ADDRESSES))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(
            vec![address(1, "web", "Shared")],
            1,
            200,
            0,
        )))
        .mount(&server)
        .await;

    let err = scm
        .address
        .fetch("web", &Container::folder("Texas"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn test_fetch_duplicate_names_are_ambiguous() {
    let (server, scm) = setup().await;

    Mock::given(method("GET"))
        .and(path(ADDRESSES))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(
            vec![address(1, "web", "Texas"), address(2, "web", "Texas")],
            2,
            200,
            0,
        )))
        .mount(&server)
        .await;

    let err = scm
        .address
        .fetch("web", &Container::folder("Texas"))
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Ambiguous { count: 2, .. }));
}

#[tokio::test]
async fn test_fetch_empty_name_sends_nothing() {
    let (server, scm) = setup().await;

    Mock::given(method("GET"))
        .and(path(ADDRESSES))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = scm
        .address
        .fetch("", &Container::folder("Texas"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
}
