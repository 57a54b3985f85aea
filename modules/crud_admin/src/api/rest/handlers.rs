use std::sync::Arc;

use axum::{extract::Path, response::Json, Extension};
use tracing::info;

use crate::api::rest::form::RawForm;
use crate::api::rest::problem::ProblemResponse;
use crate::api::rest::request_id::RequestCtx;
use crate::contract::model::RecordId;
use crate::domain::error::DomainError;
use crate::domain::service::Service;
use crate::domain::shape::ShapeDescriptor;
use crate::ui::{PageComposer, PageDescription, View};

/// Shared, immutable state behind every admin route.
pub struct AdminState {
    pub service: Arc<Service>,
    pub composer: PageComposer,
    /// Title of the HTML shell page.
    pub title: String,
}

impl AdminState {
    pub fn new(service: Arc<Service>, title: impl Into<String>) -> Self {
        let composer = PageComposer::new(service.registry());
        Self {
            service,
            composer,
            title: title.into(),
        }
    }
}

type PageResult = Result<Json<PageDescription>, ProblemResponse>;

fn parse_id(shape: &ShapeDescriptor, raw: &str) -> Result<RecordId, DomainError> {
    raw.parse::<RecordId>()
        .map_err(|_| DomainError::not_found(&shape.title, raw))
}

async fn render_list(state: &AdminState, entity: &str, ctx: &RequestCtx) -> PageResult {
    let shape = state.service.shape(entity).map_err(|e| ctx.problem(&e))?;
    let records = state
        .service
        .list(entity)
        .await
        .map_err(|e| ctx.problem(&e))?;
    Ok(Json(state.composer.compose(shape, View::List(&records))))
}

/// `GET /api/`: list of the default entity
pub async fn list_default(
    Extension(state): Extension<Arc<AdminState>>,
    ctx: RequestCtx,
) -> PageResult {
    let slug = state.service.registry().default_shape().slug.clone();
    render_list(&state, &slug, &ctx).await
}

/// `GET /api/{entity}/`
pub async fn list(
    Extension(state): Extension<Arc<AdminState>>,
    ctx: RequestCtx,
    Path(entity): Path<String>,
) -> PageResult {
    render_list(&state, &entity, &ctx).await
}

/// `GET /api/{entity}/add/`: the add form; no store access
pub async fn add_form(
    Extension(state): Extension<Arc<AdminState>>,
    ctx: RequestCtx,
    Path(entity): Path<String>,
) -> PageResult {
    let shape = state.service.shape(&entity).map_err(|e| ctx.problem(&e))?;
    Ok(Json(state.composer.compose(shape, View::AddForm)))
}

/// `POST /api/{entity}/add/`: validate, insert, redirect to the list.
/// An unknown entity is reported before the body is looked at.
pub async fn create(
    Extension(state): Extension<Arc<AdminState>>,
    ctx: RequestCtx,
    Path(entity): Path<String>,
    form: Result<RawForm, ProblemResponse>,
) -> PageResult {
    let shape = state.service.shape(&entity).map_err(|e| ctx.problem(&e))?;
    let RawForm(fields) = form.map_err(|p| ctx.fill(p))?;
    info!("Creating {} from {} submitted fields", entity, fields.len());

    state
        .service
        .create(&entity, &fields)
        .await
        .map_err(|e| ctx.problem(&e))?;
    Ok(Json(PageComposer::redirect_to_list(shape)))
}

/// `GET /api/{entity}/{id}/`
pub async fn detail(
    Extension(state): Extension<Arc<AdminState>>,
    ctx: RequestCtx,
    Path((entity, id)): Path<(String, String)>,
) -> PageResult {
    let shape = state.service.shape(&entity).map_err(|e| ctx.problem(&e))?;
    let id = parse_id(shape, &id).map_err(|e| ctx.problem(&e))?;
    let record = state
        .service
        .get(&entity, id)
        .await
        .map_err(|e| ctx.problem(&e))?;
    Ok(Json(state.composer.compose(shape, View::Detail(&record))))
}

/// `GET /api/{entity}/{id}/delete/`: standalone confirmation form
pub async fn delete_confirm(
    Extension(state): Extension<Arc<AdminState>>,
    ctx: RequestCtx,
    Path((entity, id)): Path<(String, String)>,
) -> PageResult {
    let shape = state.service.shape(&entity).map_err(|e| ctx.problem(&e))?;
    let id = parse_id(shape, &id).map_err(|e| ctx.problem(&e))?;
    Ok(Json(state.composer.compose(shape, View::DeleteConfirm(id))))
}

/// `POST /api/{entity}/{id}/delete/`: delete and redirect.
/// The confirmation body is not inspected; a missing row still redirects.
pub async fn delete(
    Extension(state): Extension<Arc<AdminState>>,
    ctx: RequestCtx,
    Path((entity, id)): Path<(String, String)>,
) -> PageResult {
    info!("Deleting {} {}", entity, id);

    let shape = state.service.shape(&entity).map_err(|e| ctx.problem(&e))?;
    let id = parse_id(shape, &id).map_err(|e| ctx.problem(&e))?;
    state
        .service
        .delete(&entity, id)
        .await
        .map_err(|e| ctx.problem(&e))?;
    Ok(Json(PageComposer::redirect_to_list(shape)))
}
