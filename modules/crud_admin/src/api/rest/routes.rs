use axum::{routing::get, Extension, Router};
use std::sync::Arc;

use crate::api::rest::handlers::{self, AdminState};
use crate::api::rest::web;

/// Register the admin pages, the health probe and the UI shell fallback.
///
/// Page routes answer with FastUI JSON; write routes answer with a redirect
/// signal. Anything unmatched outside `/api/` gets the HTML shell.
pub fn register_routes(router: Router, state: Arc<AdminState>) -> Router {
    router
        .route("/api/", get(handlers::list_default))
        .route("/api/{entity}/", get(handlers::list))
        .route(
            "/api/{entity}/add/",
            get(handlers::add_form).post(handlers::create),
        )
        .route("/api/{entity}/{id}/", get(handlers::detail))
        .route(
            "/api/{entity}/{id}/delete/",
            get(handlers::delete_confirm).post(handlers::delete),
        )
        .route("/health", get(web::health_check))
        .fallback(web::ui_shell)
        .layer(Extension(state))
}
