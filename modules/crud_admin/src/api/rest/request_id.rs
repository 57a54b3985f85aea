use axum::extract::FromRequestParts;
use axum::http::{request::Parts, HeaderName, Request};
use axum::{body::Body, middleware::Next, response::Response};
use std::convert::Infallible;
use tower_http::request_id::{MakeRequestId, RequestId};

use crate::api::rest::error::domain_error_to_problem;
use crate::api::rest::problem::ProblemResponse;
use crate::domain::error::DomainError;

#[derive(Clone, Debug)]
pub struct XRequestId(pub String);

pub fn header() -> HeaderName {
    HeaderName::from_static("x-request-id")
}

#[derive(Clone, Default)]
pub struct MakeReqId;

impl MakeRequestId for MakeReqId {
    fn make_request_id<B>(&mut self, _req: &Request<B>) -> Option<RequestId> {
        let id = nanoid::nanoid!();
        Some(RequestId::new(id.parse().ok()?))
    }
}

/// Middleware that stores request_id in Request.extensions and records it in the current span
pub async fn push_req_id_to_extensions(mut req: Request<Body>, next: Next) -> Response {
    let rid = req
        .headers()
        .get(header())
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned)
        .unwrap_or_else(|| "n/a".to_string());

    req.extensions_mut().insert(XRequestId(rid.clone()));
    tracing::Span::current().record("request_id", tracing::field::display(&rid));

    next.run(req).await
}

/// Trace layer whose span carries method, path and request id.
#[allow(clippy::type_complexity)]
pub fn create_trace_layer() -> tower_http::trace::TraceLayer<
    tower_http::classify::SharedClassifier<tower_http::classify::ServerErrorsAsFailures>,
    impl Fn(&Request<Body>) -> tracing::Span + Clone,
> {
    use tower_http::trace::TraceLayer;

    TraceLayer::new_for_http().make_span_with(|req: &Request<Body>| {
        let rid = req
            .headers()
            .get(header())
            .and_then(|v| v.to_str().ok())
            .unwrap_or("n/a");
        tracing::info_span!(
            "http_request",
            method = %req.method(),
            uri = %req.uri().path(),
            module = "crud_admin",
            request_id = %rid,
        )
    })
}

/// Per-request context used to fill `instance` and `request_id` of problems.
#[derive(Clone, Debug)]
pub struct RequestCtx {
    pub path: String,
    pub request_id: Option<String>,
}

impl RequestCtx {
    pub fn problem(&self, e: &DomainError) -> ProblemResponse {
        domain_error_to_problem(e, &self.path, self.request_id.clone())
    }

    /// Stamp a problem built outside a handler (e.g. an extractor rejection).
    pub fn fill(&self, mut resp: ProblemResponse) -> ProblemResponse {
        resp.0 = resp
            .0
            .with_instance(&self.path)
            .with_request_id(self.request_id.clone());
        resp
    }
}

impl<S> FromRequestParts<S> for RequestCtx
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let request_id = parts
            .extensions
            .get::<XRequestId>()
            .map(|r| r.0.clone())
            .or_else(|| {
                parts
                    .headers
                    .get(header())
                    .and_then(|v| v.to_str().ok())
                    .map(str::to_owned)
            });
        Ok(Self {
            path: parts.uri.path().to_string(),
            request_id,
        })
    }
}
