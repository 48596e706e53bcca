use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;
use tracing::error;

use super::actor::{Actor, Role};
use super::domain::{ApplicationId, PostingDraft, PostingId, PostingPatch, ReviewDecision};
use super::repository::RegistryStore;
use super::service::{InternshipRegistry, RegistryError};
use super::views::PostingQuery;

type SharedRegistry<S> = Arc<InternshipRegistry<S>>;

/// Router builder exposing the registry operations over HTTP.
pub fn registry_router<S>(registry: SharedRegistry<S>) -> Router
where
    S: RegistryStore + ?Sized + 'static,
{
    Router::new()
        .route(
            "/api/v1/postings",
            post(create_posting_handler::<S>).get(list_postings_handler::<S>),
        )
        .route(
            "/api/v1/postings/:posting_id",
            get(posting_handler::<S>).patch(update_posting_handler::<S>),
        )
        .route(
            "/api/v1/postings/:posting_id/applications",
            post(submit_handler::<S>).get(posting_applications_handler::<S>),
        )
        .route("/api/v1/applications", get(my_applications_handler::<S>))
        .route(
            "/api/v1/applications/:application_id/review",
            post(review_handler::<S>),
        )
        .route("/api/v1/dashboard", get(dashboard_handler::<S>))
        .with_state(registry)
}

#[derive(Debug, Deserialize)]
pub(crate) struct ReviewRequest {
    pub(crate) decision: ReviewDecision,
}

pub(crate) fn error_response(err: RegistryError) -> Response {
    let status = match &err {
        RegistryError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        RegistryError::NotFound { .. } => StatusCode::NOT_FOUND,
        RegistryError::Authorization => StatusCode::FORBIDDEN,
        RegistryError::Duplicate | RegistryError::Closed | RegistryError::State { .. } => {
            StatusCode::CONFLICT
        }
        RegistryError::Store(source) => {
            error!(error = %source, "registry storage failure");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    let payload = json!({
        "error": err.to_string(),
        "kind": err.kind(),
    });
    (status, axum::Json(payload)).into_response()
}

fn respond<T: serde::Serialize>(status: StatusCode, result: Result<T, RegistryError>) -> Response {
    match result {
        Ok(body) => (status, axum::Json(body)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn create_posting_handler<S>(
    State(registry): State<SharedRegistry<S>>,
    actor: Actor,
    axum::Json(draft): axum::Json<PostingDraft>,
) -> Response
where
    S: RegistryStore + ?Sized + 'static,
{
    if let Err(rejection) = actor.require(Role::Coordinator) {
        return rejection.into_response();
    }
    respond(
        StatusCode::CREATED,
        registry.create_posting(&actor.user_id, draft),
    )
}

pub(crate) async fn list_postings_handler<S>(
    State(registry): State<SharedRegistry<S>>,
    Query(query): Query<PostingQuery>,
) -> Response
where
    S: RegistryStore + ?Sized + 'static,
{
    respond(StatusCode::OK, registry.list_postings(&query))
}

pub(crate) async fn posting_handler<S>(
    State(registry): State<SharedRegistry<S>>,
    Path(posting_id): Path<String>,
) -> Response
where
    S: RegistryStore + ?Sized + 'static,
{
    respond(StatusCode::OK, registry.get_posting(&PostingId(posting_id)))
}

pub(crate) async fn update_posting_handler<S>(
    State(registry): State<SharedRegistry<S>>,
    actor: Actor,
    Path(posting_id): Path<String>,
    axum::Json(patch): axum::Json<PostingPatch>,
) -> Response
where
    S: RegistryStore + ?Sized + 'static,
{
    if let Err(rejection) = actor.require(Role::Coordinator) {
        return rejection.into_response();
    }
    respond(
        StatusCode::OK,
        registry.update_posting(&actor.user_id, &PostingId(posting_id), patch),
    )
}

pub(crate) async fn submit_handler<S>(
    State(registry): State<SharedRegistry<S>>,
    actor: Actor,
    Path(posting_id): Path<String>,
) -> Response
where
    S: RegistryStore + ?Sized + 'static,
{
    if let Err(rejection) = actor.require(Role::Student) {
        return rejection.into_response();
    }
    respond(
        StatusCode::CREATED,
        registry.submit_application(&actor.user_id, &PostingId(posting_id)),
    )
}

pub(crate) async fn posting_applications_handler<S>(
    State(registry): State<SharedRegistry<S>>,
    actor: Actor,
    Path(posting_id): Path<String>,
) -> Response
where
    S: RegistryStore + ?Sized + 'static,
{
    if let Err(rejection) = actor.require(Role::Coordinator) {
        return rejection.into_response();
    }
    respond(
        StatusCode::OK,
        registry.applications_for_posting(&actor.user_id, &PostingId(posting_id)),
    )
}

pub(crate) async fn my_applications_handler<S>(
    State(registry): State<SharedRegistry<S>>,
    actor: Actor,
) -> Response
where
    S: RegistryStore + ?Sized + 'static,
{
    let applications = match actor.role {
        Role::Student => registry.applications_for_student(&actor.user_id),
        Role::Coordinator => registry.applications_for_coordinator(&actor.user_id),
    };
    respond(StatusCode::OK, applications)
}

pub(crate) async fn review_handler<S>(
    State(registry): State<SharedRegistry<S>>,
    actor: Actor,
    Path(application_id): Path<String>,
    axum::Json(request): axum::Json<ReviewRequest>,
) -> Response
where
    S: RegistryStore + ?Sized + 'static,
{
    if let Err(rejection) = actor.require(Role::Coordinator) {
        return rejection.into_response();
    }
    respond(
        StatusCode::OK,
        registry.review_application(
            &actor.user_id,
            &ApplicationId(application_id),
            request.decision,
        ),
    )
}

pub(crate) async fn dashboard_handler<S>(
    State(registry): State<SharedRegistry<S>>,
    actor: Actor,
) -> Response
where
    S: RegistryStore + ?Sized + 'static,
{
    match actor.role {
        Role::Student => respond(StatusCode::OK, registry.student_dashboard(&actor.user_id)),
        Role::Coordinator => respond(
            StatusCode::OK,
            registry.coordinator_dashboard(&actor.user_id),
        ),
    }
}
