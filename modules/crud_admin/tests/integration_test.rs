use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use admin_db::{ConnectOpts, DbHandle};
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::util::ServiceExt; // for `oneshot`
use tracing_test::traced_test;

use crud_admin::contract::model::FieldValue;
use crud_admin::domain::error::DomainError;
use crud_admin::domain::service::Service;
use crud_admin::domain::validator::FIELD_REQUIRED;
use crud_admin::{CrudAdmin, CrudAdminConfig};

async fn admin() -> (DbHandle, CrudAdmin) {
    let db = DbHandle::connect("sqlite::memory:", ConnectOpts::default())
        .await
        .unwrap();
    let admin = CrudAdmin::new(db.sea(), CrudAdminConfig::default()).unwrap();
    admin.init_schema().await.unwrap();
    (db, admin)
}

fn fields(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn alice() -> HashMap<String, String> {
    fields(&[("name", "Alice"), ("dob", "2000-01-01")])
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Option<String>, Value) {
    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, content_type, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_form(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_owned()))
        .unwrap()
}

fn redirect_to(url: &str) -> Value {
    json!([{ "type": "FireEvent", "event": { "type": "go-to", "url": url } }])
}

// ---- service level ----

#[tokio::test]
async fn created_user_is_listed_with_first_id() {
    let (_db, admin) = admin().await;
    let svc: Arc<Service> = admin.service();

    svc.create("user", &alice()).await.unwrap();

    let all = svc.list("user").await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].id, 1);
    assert_eq!(
        serde_json::to_value(&all[0]).unwrap(),
        json!({ "id": 1, "name": "Alice", "dob": "2000-01-01" })
    );
}

#[tokio::test]
async fn created_record_reads_back_equal() {
    let (_db, admin) = admin().await;
    let svc = admin.service();

    let submitted = fields(&[
        ("dob", "1990-05-17"),
        ("name", "Soup"),
        ("task", "Cook soup"),
        ("date_create", "2024-03-01"),
        ("who_cook", "Bob"),
        ("who_comp", "Carol"),
        ("result", "on"),
    ]);
    let created = svc.create("task", &submitted).await.unwrap();
    let loaded = svc.get("task", created.id).await.unwrap();

    assert_eq!(created, loaded);
    assert_eq!(loaded.get("who_cook"), Some(&FieldValue::Text("Bob".into())));
    assert_eq!(loaded.get("result"), Some(&FieldValue::Boolean(true)));
}

#[tokio::test]
async fn task_without_cook_is_rejected_and_not_stored() {
    let (_db, admin) = admin().await;
    let svc = admin.service();

    let submitted = fields(&[
        ("dob", "1990-05-17"),
        ("name", "Soup"),
        ("task", "Cook soup"),
        ("date_create", "2024-03-01"),
        ("who_comp", "Carol"),
    ]);
    let err = svc.create("task", &submitted).await.unwrap_err();
    assert_eq!(err, DomainError::validation("who_cook", FIELD_REQUIRED));
    assert!(svc.list("task").await.unwrap().is_empty());
}

#[tokio::test]
async fn deleting_missing_task_succeeds_and_changes_nothing() {
    let (_db, admin) = admin().await;
    let svc = admin.service();

    svc.delete("task", 999).await.unwrap();
    assert!(svc.list("task").await.unwrap().is_empty());
}

#[tokio::test]
async fn delete_removes_only_the_target() {
    let (_db, admin) = admin().await;
    let svc = admin.service();

    let a = svc.create("user", &alice()).await.unwrap();
    let b = svc
        .create("user", &fields(&[("name", "Bob"), ("dob", "1985-02-03")]))
        .await
        .unwrap();

    svc.delete("user", a.id).await.unwrap();

    let remaining = svc.list("user").await.unwrap();
    assert_eq!(remaining, vec![b]);
    assert!(matches!(
        svc.get("user", a.id).await,
        Err(DomainError::NotFound { .. })
    ));
}

#[tokio::test]
async fn entity_kinds_do_not_share_ids() {
    let (_db, admin) = admin().await;
    let svc = admin.service();

    svc.create("user", &alice()).await.unwrap();
    assert!(matches!(
        svc.get("task", 1).await,
        Err(DomainError::NotFound { .. })
    ));
}

#[tokio::test]
async fn init_schema_twice_keeps_rows() {
    let (_db, admin) = admin().await;
    admin.service().create("user", &alice()).await.unwrap();

    admin.init_schema().await.unwrap();
    assert_eq!(admin.service().list("user").await.unwrap().len(), 1);
}

#[tokio::test]
async fn invalid_entity_configuration_is_rejected() {
    let db = DbHandle::connect("sqlite::memory:", ConnectOpts::default())
        .await
        .unwrap();
    let config = CrudAdminConfig {
        entities: vec![],
        ..Default::default()
    };
    assert!(CrudAdmin::new(db.sea(), config).is_err());
}

// ---- HTTP level ----

#[tokio::test]
async fn root_lists_default_entity() {
    let (_db, admin) = admin().await;
    admin.service().create("user", &alice()).await.unwrap();
    let app = admin.router(Duration::from_secs(5));

    let (status, _, body) = send(&app, get("/api/")).await;
    assert_eq!(status, StatusCode::OK);

    let page = &body[0];
    assert_eq!(page["type"], "Page");
    assert_eq!(page["components"][0]["text"], "Users");
    let table = page["components"]
        .as_array()
        .unwrap()
        .iter()
        .find(|c| c["type"] == "Table")
        .unwrap();
    assert_eq!(table["data"].as_array().unwrap().len(), 1);
    assert_eq!(table["data"][0]["name"], "Alice");
    assert_eq!(table["columns"][0]["onClick"]["url"], "/user/{id}/");
}

#[tokio::test]
async fn list_page_is_stable_across_calls() {
    let (_db, admin) = admin().await;
    admin.service().create("user", &alice()).await.unwrap();
    let app = admin.router(Duration::from_secs(5));

    let (_, _, first) = send(&app, get("/api/user/")).await;
    let (_, _, second) = send(&app, get("/api/user/")).await;
    assert_eq!(first, second);
}

#[tokio::test]
async fn add_form_mirrors_shape() {
    let (_db, admin) = admin().await;
    let app = admin.router(Duration::from_secs(5));

    let (status, _, body) = send(&app, get("/api/task/add/")).await;
    assert_eq!(status, StatusCode::OK);

    let form = body[0]["components"]
        .as_array()
        .unwrap()
        .iter()
        .find(|c| c["type"] == "ModelForm")
        .unwrap()
        .clone();
    assert_eq!(form["submitUrl"], "/api/task/add/");
    let names: Vec<&str> = form["formFields"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["name"].as_str().unwrap())
        .collect();
    assert_eq!(
        names,
        ["dob", "name", "task", "date_create", "who_cook", "who_comp", "result"]
    );
}

#[tokio::test]
async fn post_add_redirects_and_persists() {
    let (_db, admin) = admin().await;
    let app = admin.router(Duration::from_secs(5));

    let (status, _, body) = send(&app, post_form("/api/user/add/", "name=Alice&dob=2000-01-01")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, redirect_to("/user/"));

    let (status, _, body) = send(&app, get("/api/user/1/")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["components"][0]["text"], "Alice");
    let details = &body[0]["components"][2];
    assert_eq!(details["type"], "Details");
    assert_eq!(details["data"], json!({ "id": 1, "name": "Alice", "dob": "2000-01-01" }));
}

#[tokio::test]
async fn post_add_with_missing_field_is_unprocessable() {
    let (_db, admin) = admin().await;
    let app = admin.router(Duration::from_secs(5));

    let (status, content_type, body) =
        send(&app, post_form("/api/user/add/", "name=Alice")).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(content_type.as_deref(), Some("application/problem+json"));
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert_eq!(body["errors"][0]["pointer"], "/dob");
    assert!(admin.service().list("user").await.unwrap().is_empty());
}

#[tokio::test]
async fn post_add_with_bad_date_is_unprocessable() {
    let (_db, admin) = admin().await;
    let app = admin.router(Duration::from_secs(5));

    let (status, _, body) =
        send(&app, post_form("/api/user/add/", "name=Alice&dob=yesterday")).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["errors"][0]["pointer"], "/dob");
}

#[tokio::test]
async fn json_submission_is_accepted() {
    let (_db, admin) = admin().await;
    let app = admin.router(Duration::from_secs(5));

    let req = Request::builder()
        .method(Method::POST)
        .uri("/api/user/add/")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"name":"Alice","dob":"2000-01-01"}"#))
        .unwrap();
    let (status, _, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, redirect_to("/user/"));
    assert_eq!(admin.service().list("user").await.unwrap().len(), 1);
}

#[tokio::test]
async fn missing_record_is_not_found() {
    let (_db, admin) = admin().await;
    let app = admin.router(Duration::from_secs(5));

    let (status, content_type, body) = send(&app, get("/api/user/42/")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(content_type.as_deref(), Some("application/problem+json"));
    assert_eq!(body["code"], "NOT_FOUND");
    assert_eq!(body["instance"], "/api/user/42/");
}

#[tokio::test]
async fn non_numeric_id_is_not_found() {
    let (_db, admin) = admin().await;
    let app = admin.router(Duration::from_secs(5));

    let (status, _, body) = send(&app, get("/api/user/abc/")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn unknown_entity_is_not_found() {
    let (_db, admin) = admin().await;
    let app = admin.router(Duration::from_secs(5));

    let (status, _, body) = send(&app, get("/api/widget/")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "UNKNOWN_ENTITY");

    let (status, _, _) = send(&app, post_form("/api/widget/add/", "name=x")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_confirm_page_posts_to_delete() {
    let (_db, admin) = admin().await;
    let app = admin.router(Duration::from_secs(5));

    let (status, _, body) = send(&app, get("/api/task/7/delete/")).await;
    assert_eq!(status, StatusCode::OK);
    let form = &body[0]["components"][2];
    assert_eq!(form["type"], "ModelForm");
    assert_eq!(form["submitUrl"], "/api/task/7/delete/");
    assert_eq!(form["formFields"][0]["name"], "confirm");
}

#[tokio::test]
async fn post_delete_redirects_even_when_missing() {
    let (_db, admin) = admin().await;
    admin.service().create("user", &alice()).await.unwrap();
    let app = admin.router(Duration::from_secs(5));

    let (status, _, body) = send(&app, post_form("/api/user/1/delete/", "confirm=true")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, redirect_to("/user/"));
    assert!(admin.service().list("user").await.unwrap().is_empty());

    let (status, _, body) = send(&app, post_form("/api/task/999/delete/", "")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, redirect_to("/task/"));
}

#[tokio::test]
async fn other_paths_get_the_html_shell() {
    let (_db, admin) = admin().await;
    let app = admin.router(Duration::from_secs(5));

    let response = app.clone().oneshot(get("/user/1/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_owned();
    assert!(content_type.starts_with("text/html"));
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let html = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(html.contains("<title>FastUI Admin</title>"));
    assert!(html.contains("fastui:APIRootUrl"));
}

#[tokio::test]
async fn unmatched_api_path_is_a_problem_not_the_shell() {
    let (_db, admin) = admin().await;
    let app = admin.router(Duration::from_secs(5));

    let (status, content_type, body) = send(&app, get("/api/user/1/edit/")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(content_type.as_deref(), Some("application/problem+json"));
    assert_eq!(body["instance"], "/api/user/1/edit/");
}

#[tokio::test]
async fn health_endpoint_reports_healthy() {
    let (_db, admin) = admin().await;
    let app = admin.router(Duration::from_secs(5));

    let (status, _, body) = send(&app, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn request_id_is_generated_and_echoed_into_problems() {
    let (_db, admin) = admin().await;
    let app = admin.router(Duration::from_secs(5));

    let response = app.clone().oneshot(get("/api/")).await.unwrap();
    let generated = response
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok());
    assert!(generated.is_some_and(|id| !id.is_empty()));

    let req = Request::builder()
        .uri("/api/user/5/")
        .header("x-request-id", "rid-777")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(
        response
            .headers()
            .get("x-request-id")
            .and_then(|v| v.to_str().ok()),
        Some("rid-777")
    );
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["request_id"], "rid-777");
}

#[tokio::test]
#[traced_test]
async fn rejected_form_is_logged() {
    let (_db, admin) = admin().await;
    let app = admin.router(Duration::from_secs(5));

    let (status, _, _) = send(&app, post_form("/api/user/add/", "dob=2000-01-01")).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(logs_contain("form rejected"));
}

#[tokio::test]
async fn unknown_entity_wins_over_a_malformed_body() {
    let (_db, admin) = admin().await;
    let app = admin.router(Duration::from_secs(5));

    let req = Request::builder()
        .method(Method::POST)
        .uri("/api/widget/add/")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{bad"))
        .unwrap();
    let (status, _, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "UNKNOWN_ENTITY");
}

#[tokio::test]
async fn malformed_body_problem_carries_instance_and_request_id() {
    let (_db, admin) = admin().await;
    let app = admin.router(Duration::from_secs(5));

    let req = Request::builder()
        .method(Method::POST)
        .uri("/api/user/add/")
        .header(header::CONTENT_TYPE, "application/json")
        .header("x-request-id", "rid-bad-body")
        .body(Body::from("{bad"))
        .unwrap();
    let (status, content_type, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(content_type.as_deref(), Some("application/problem+json"));
    assert_eq!(body["instance"], "/api/user/add/");
    assert_eq!(body["request_id"], "rid-bad-body");
    assert!(admin.service().list("user").await.unwrap().is_empty());
}

#[tokio::test]
async fn api_path_without_trailing_slash_redirects() {
    let (_db, admin) = admin().await;
    let app = admin.router(Duration::from_secs(5));

    let response = app.clone().oneshot(get("/api/user/1?x=1")).await.unwrap();
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(
        response
            .headers()
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok()),
        Some("/api/user/1/?x=1")
    );

    let response = app.clone().oneshot(get("/api/task")).await.unwrap();
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(
        response
            .headers()
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok()),
        Some("/api/task/")
    );
}

#[tokio::test]
async fn zero_timeout_disables_the_timeout_layer() {
    let (_db, admin) = admin().await;
    admin.service().create("user", &alice()).await.unwrap();
    let app = admin.router(Duration::ZERO);

    let (status, _, body) = send(&app, get("/api/user/1/")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["components"][0]["text"], "Alice");
}
