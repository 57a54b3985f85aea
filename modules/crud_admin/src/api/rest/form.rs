use axum::extract::{FromRequest, Multipart, Request};
use axum::http::header::CONTENT_TYPE;
use axum::{Form, Json};
use std::collections::HashMap;

use crate::api::rest::problem::{bad_request, ProblemResponse};
use crate::domain::validator::RawFields;

/// Untyped form submission.
///
/// Accepts `multipart/form-data` (what the FastUI client sends),
/// `application/x-www-form-urlencoded` and flat JSON objects. A body without a
/// recognized content type yields an empty field set.
#[derive(Debug, Clone, Default)]
pub struct RawForm(pub RawFields);

fn json_scalar(v: serde_json::Value) -> Option<String> {
    match v {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) => Some(s),
        serde_json::Value::Bool(b) => Some(b.to_string()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        other => Some(other.to_string()),
    }
}

impl<S> FromRequest<S> for RawForm
where
    S: Send + Sync,
{
    type Rejection = ProblemResponse;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_ascii_lowercase();

        if content_type.starts_with("multipart/form-data") {
            let mut multipart = Multipart::from_request(req, state)
                .await
                .map_err(|e| bad_request(format!("invalid multipart body: {e}")))?;
            let mut fields = RawFields::new();
            while let Some(field) = multipart
                .next_field()
                .await
                .map_err(|e| bad_request(format!("invalid multipart field: {e}")))?
            {
                let Some(name) = field.name().map(str::to_owned) else {
                    continue;
                };
                let value = field
                    .text()
                    .await
                    .map_err(|e| bad_request(format!("invalid value for '{name}': {e}")))?;
                fields.insert(name, value);
            }
            Ok(Self(fields))
        } else if content_type.starts_with("application/x-www-form-urlencoded") {
            let Form(fields) = Form::<HashMap<String, String>>::from_request(req, state)
                .await
                .map_err(|e| bad_request(e.body_text()))?;
            Ok(Self(fields))
        } else if content_type.starts_with("application/json") {
            let Json(map) =
                Json::<serde_json::Map<String, serde_json::Value>>::from_request(req, state)
                    .await
                    .map_err(|e| bad_request(e.body_text()))?;
            Ok(Self(
                map.into_iter()
                    .filter_map(|(k, v)| json_scalar(v).map(|s| (k, s)))
                    .collect(),
            ))
        } else {
            Ok(Self::default())
        }
    }
}
