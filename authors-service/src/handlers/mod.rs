//! HTTP-facing handlers for the authors resource
//!
//! Builds on the [`crate::repository`] traits to provide HTTP-aware error
//! handling and response envelopes.
//!
//! # Features
//!
//! - **Resource handler**: [`AuthorHandler`] with list, create, show, update
//!   and destroy over any [`crate::repository::AuthorStore`]
//! - **Envelopes**: [`AuthorResponse`], [`AuthorListResponse`] and
//!   [`MessageResponse`], all written through [`json_response`]
//! - **Paging**: [`ListQuery`] and [`PaginationMeta`]
//! - **Errors**: [`ApiError`] with HTTP status mapping
//!
//! # Integration with Axum
//!
//! The response types implement `IntoResponse`, so they can be returned
//! directly from axum handlers:
//!
//! ```rust,ignore
//! async fn show_author<S: AuthorStore + 'static>(
//!     State(state): State<AppState<S>>,
//!     Path(id): Path<String>,
//! ) -> Result<AuthorResponse<AuthorWithBooks>, ApiError> {
//!     AuthorHandler::new(state.store()).show(&id).await
//! }
//! ```

mod authors;
mod error;
mod payload;
mod query;
mod response;

pub use authors::{create_rules, update_rules, AuthorHandler, DELETED_MESSAGE};
pub use error::{ApiError, ApiErrorKind, ApiOperation, NO_RESULTS_MESSAGE};
pub use payload::parse_payload;
pub use query::{ListQuery, DEFAULT_PER_PAGE, MAX_PER_PAGE};
pub use response::{
    json_response, AuthorListResponse, AuthorResponse, MessageResponse, PaginationMeta,
};
