//! Route table
//!
//! The authors resource is mounted twice, at `/authors` and `/api/authors`.
//! Update answers both PUT and PATCH.

use axum::{
    body::Bytes,
    extract::{rejection::QueryRejection, Path, Query, State},
    routing::get,
    Router,
};

use crate::handlers::{
    ApiError, AuthorHandler, AuthorListResponse, AuthorResponse, ListQuery, MessageResponse,
};
use crate::health::{health, readiness};
use crate::models::{Author, AuthorWithBooks};
use crate::repository::AuthorStore;
use crate::state::AppState;

/// Build the application router over any author store
pub fn router<S: AuthorStore + 'static>(state: AppState<S>) -> Router {
    Router::new()
        .merge(author_routes::<S>())
        .nest("/api", author_routes::<S>())
        .route("/health", get(health::<S>))
        .route("/ready", get(readiness::<S>))
        .with_state(state)
}

fn author_routes<S: AuthorStore + 'static>() -> Router<AppState<S>> {
    Router::new()
        .route("/authors", get(list_authors::<S>).post(create_author::<S>))
        .route(
            "/authors/{id}",
            get(show_author::<S>)
                .put(update_author::<S>)
                .patch(update_author::<S>)
                .delete(destroy_author::<S>),
        )
}

async fn list_authors<S: AuthorStore + 'static>(
    State(state): State<AppState<S>>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<AuthorListResponse<AuthorWithBooks>, ApiError> {
    let Query(query) = query.map_err(|e| ApiError::bad_request(e.body_text()))?;
    AuthorHandler::new(state.store()).list(query).await
}

async fn create_author<S: AuthorStore + 'static>(
    State(state): State<AppState<S>>,
    body: Bytes,
) -> Result<AuthorResponse<Author>, ApiError> {
    AuthorHandler::new(state.store()).create(&body).await
}

async fn show_author<S: AuthorStore + 'static>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
) -> Result<AuthorResponse<AuthorWithBooks>, ApiError> {
    AuthorHandler::new(state.store()).show(&id).await
}

async fn update_author<S: AuthorStore + 'static>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<AuthorResponse<AuthorWithBooks>, ApiError> {
    AuthorHandler::new(state.store()).update(&id, &body).await
}

async fn destroy_author<S: AuthorStore + 'static>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
) -> Result<MessageResponse, ApiError> {
    AuthorHandler::new(state.store()).destroy(&id).await
}
