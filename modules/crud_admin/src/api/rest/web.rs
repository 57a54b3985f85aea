use std::sync::Arc;

use axum::{
    http::{Method, Uri},
    response::{Html, IntoResponse, Json, Redirect, Response},
    Extension,
};
use serde_json::{json, Value};

use crate::api::rest::handlers::AdminState;
use crate::api::rest::problem::not_found;
use crate::api::rest::request_id::RequestCtx;
use crate::ui::prebuilt_html;

pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

fn is_api_path(path: &str) -> bool {
    path == "/api" || path.starts_with("/api/")
}

/// Slash-terminated form of an API path that only lacks its trailing `/`.
/// Returns `None` when adding the slash would still not hit a route.
fn slashed_api_path(path: &str) -> Option<String> {
    if path.ends_with('/') {
        return None;
    }
    let rest = path.strip_prefix("/api")?;
    let segments: Vec<&str> = rest.split('/').skip(1).collect();
    if segments.iter().any(|s| s.is_empty()) {
        return None;
    }
    let routable = match segments.as_slice() {
        [] | [_] | [_, _] => true,
        [_, _, last] => *last == "delete",
        _ => false,
    };
    routable.then(|| format!("{path}/"))
}

/// Fallback: the HTML shell for any browser route. The client then asks
/// `/api{path}` for the page. API paths missing only their trailing slash
/// are redirected; other unmatched API paths get a 404 problem.
pub async fn ui_shell(
    Extension(state): Extension<Arc<AdminState>>,
    ctx: RequestCtx,
    method: Method,
    uri: Uri,
) -> Response {
    if let Some(mut target) = slashed_api_path(&ctx.path) {
        if let Some(query) = uri.query() {
            target.push('?');
            target.push_str(query);
        }
        return Redirect::temporary(&target).into_response();
    }
    if is_api_path(&ctx.path) || (method != Method::GET && method != Method::HEAD) {
        let resp = not_found(format!("No route for {} {}", method, ctx.path));
        return ctx.fill(resp).into_response();
    }
    Html(prebuilt_html(&state.title)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_prefix_detection() {
        assert!(is_api_path("/api"));
        assert!(is_api_path("/api/nope/"));
        assert!(!is_api_path("/apiary"));
        assert!(!is_api_path("/user/1/"));
    }

    #[test]
    fn missing_trailing_slash_is_redirectable() {
        assert_eq!(slashed_api_path("/api").as_deref(), Some("/api/"));
        assert_eq!(slashed_api_path("/api/user").as_deref(), Some("/api/user/"));
        assert_eq!(slashed_api_path("/api/user/1").as_deref(), Some("/api/user/1/"));
        assert_eq!(
            slashed_api_path("/api/task/3/delete").as_deref(),
            Some("/api/task/3/delete/")
        );
        assert_eq!(slashed_api_path("/api/user/1/"), None);
        assert_eq!(slashed_api_path("/api/user/1/edit"), None);
        assert_eq!(slashed_api_path("/api//x"), None);
        assert_eq!(slashed_api_path("/apiary"), None);
        assert_eq!(slashed_api_path("/user/1"), None);
    }

    #[tokio::test]
    async fn health_reports_healthy() {
        let Json(body) = health_check().await;
        assert_eq!(body["status"], "healthy");
        assert!(body["timestamp"].as_str().is_some());
    }
}
