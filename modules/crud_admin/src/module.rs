use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::{middleware::from_fn, Router};
use sea_orm::DatabaseConnection;
use tower_http::{
    cors::CorsLayer,
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
};
use tracing::{debug, info};

use crate::api::rest::handlers::AdminState;
use crate::api::rest::{request_id, routes};
use crate::config::CrudAdminConfig;
use crate::domain::service::Service;
use crate::domain::shape::EntityRegistry;
use crate::infra::storage::SeaOrmRecordStore;

/// The admin module: entity registry, store, page composer and HTTP surface.
pub struct CrudAdmin {
    state: Arc<AdminState>,
    config: CrudAdminConfig,
}

impl CrudAdmin {
    /// Check the configured shapes and wire the store on top of `conn`.
    pub fn new(conn: DatabaseConnection, config: CrudAdminConfig) -> anyhow::Result<Self> {
        let registry = EntityRegistry::new(config.entities.clone())
            .context("invalid entity configuration")?;
        let slugs: Vec<&str> = registry.shapes().iter().map(|s| s.slug.as_str()).collect();
        info!("crud_admin serving entities: {}", slugs.join(", "));

        let store = Arc::new(SeaOrmRecordStore::new(conn));
        let service = Arc::new(Service::new(store, Arc::new(registry)));
        let state = Arc::new(AdminState::new(service, config.title.clone()));
        Ok(Self { state, config })
    }

    /// Create missing tables. Safe to call on every start.
    pub async fn init_schema(&self) -> anyhow::Result<()> {
        self.state
            .service
            .init_schema()
            .await
            .context("failed to initialize admin tables")
    }

    pub fn service(&self) -> Arc<Service> {
        self.state.service.clone()
    }

    pub fn config(&self) -> &CrudAdminConfig {
        &self.config
    }

    /// Build the full HTTP router with its middleware stack.
    pub fn router(&self, timeout: Duration) -> Router {
        debug!("Building crud_admin router");
        let mut router = routes::register_routes(Router::new(), self.state.clone());

        // Layers wrap what was added before them, so they are listed innermost first.
        // Resulting order (outermost to innermost):
        // SetRequestId -> PropagateRequestId -> Trace -> push_req_id_to_extensions -> Timeout -> CORS -> BodyLimit
        router = router.layer(RequestBodyLimitLayer::new(self.config.body_limit_bytes));

        if self.config.cors_enabled {
            router = router.layer(CorsLayer::permissive());
        }

        if !timeout.is_zero() {
            router = router.layer(TimeoutLayer::new(timeout));
        }

        router = router.layer(from_fn(request_id::push_req_id_to_extensions));

        router = router.layer(request_id::create_trace_layer());

        let x_request_id = request_id::header();
        router = router.layer(PropagateRequestIdLayer::new(x_request_id.clone()));
        router = router.layer(SetRequestIdLayer::new(x_request_id, request_id::MakeReqId));

        router
    }
}
