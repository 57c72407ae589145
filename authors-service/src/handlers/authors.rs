//! The authors resource: list, create, show, update and destroy
//!
//! Every operation returns either a success envelope or an [`ApiError`];
//! the HTTP wiring lives in [`crate::routes`].

use super::error::{ApiError, ApiOperation};
use super::payload::parse_payload;
use super::query::ListQuery;
use super::response::{AuthorListResponse, AuthorResponse, MessageResponse, PaginationMeta};
use crate::models::{Author, AuthorChanges, AuthorId, AuthorWithBooks, NewAuthor};
use crate::repository::{AuthorStore, RepositoryError, RepositoryErrorKind};
use crate::validation::{validate, FieldErrors, Rule, RuleSet, ValidatedPayload};

/// Message returned after a successful delete
pub const DELETED_MESSAGE: &str = "Autor removido com sucesso.";

const ENTITY: &str = "Author";

/// Rules for `POST /authors`
pub fn create_rules() -> RuleSet {
    RuleSet::new()
        .field(
            "name",
            [Rule::Required, Rule::String, Rule::Max(255), Rule::unique("authors")],
        )
        .field("date_of_birth", [Rule::Required, Rule::Date])
}

/// Rules for `PUT`/`PATCH /authors/{id}`; absent fields are left alone
///
/// The uniqueness check does not exclude the record being updated, so
/// resubmitting an author's own name is rejected.
pub fn update_rules() -> RuleSet {
    RuleSet::new()
        .field(
            "name",
            [
                Rule::Sometimes,
                Rule::Required,
                Rule::String,
                Rule::Max(255),
                Rule::unique("authors"),
            ],
        )
        .field(
            "date_of_birth",
            [Rule::Sometimes, Rule::Required, Rule::Date],
        )
}

/// Handler for the authors collection over any [`AuthorStore`]
#[derive(Debug)]
pub struct AuthorHandler<'a, S> {
    store: &'a S,
}

impl<'a, S: AuthorStore> AuthorHandler<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Every author with its books, or one page of them when `query` is paged
    ///
    /// An empty result is reported as not found.
    pub async fn list(
        &self,
        query: ListQuery,
    ) -> Result<AuthorListResponse<AuthorWithBooks>, ApiError> {
        if !query.is_paged() {
            let authors = self.store.find_all_with_relations().await?;
            if authors.is_empty() {
                return Err(ApiError::no_results());
            }
            tracing::debug!(count = authors.len(), "Listed authors");
            return Ok(AuthorListResponse::new(authors));
        }

        let page = self.store.paginate(query.pagination()).await?;
        if page.is_empty() {
            return Err(ApiError::no_results());
        }

        let meta = PaginationMeta::new(query.page_number(), query.items_per_page(), page.total);
        tracing::debug!(
            page = meta.page,
            per_page = meta.per_page,
            total = meta.total,
            "Listed page of authors"
        );
        Ok(AuthorListResponse::paged(page.items, meta))
    }

    /// Validate and store a new author; the response carries no books
    pub async fn create(&self, body: &[u8]) -> Result<AuthorResponse<Author>, ApiError> {
        let payload = parse_payload(body)?;
        let validated = validate(&payload, &create_rules(), self.store).await?;

        let data = NewAuthor {
            name: required_str(&validated, "name")?,
            date_of_birth: validated
                .date("date_of_birth")
                .ok_or_else(|| missing_after_validation("date_of_birth"))?,
        };

        let author = self
            .store
            .create(data)
            .await
            .map_err(|e| duplicate_name_as_field_error(e, ApiOperation::Create))?;

        tracing::info!(author_id = author.id, operation = "create", "Author created");
        Ok(AuthorResponse::created(author))
    }

    /// One author with its books
    pub async fn show(&self, id: &str) -> Result<AuthorResponse<AuthorWithBooks>, ApiError> {
        let id = parse_id(id)?;
        let author = self
            .store
            .find_by_id_with_relations(id)
            .await?
            .ok_or_else(|| ApiError::not_found(ENTITY, id.to_string()))?;
        Ok(AuthorResponse::new(author))
    }

    /// Apply the fields present in the body to an existing author
    ///
    /// Existence is checked before the body is looked at, so a missing id
    /// wins over an invalid payload.
    pub async fn update(
        &self,
        id: &str,
        body: &[u8],
    ) -> Result<AuthorResponse<AuthorWithBooks>, ApiError> {
        let id = parse_id(id).map_err(|e| e.with_operation(ApiOperation::Update))?;
        if self.store.find_by_id(id).await?.is_none() {
            return Err(
                ApiError::not_found(ENTITY, id.to_string()).with_operation(ApiOperation::Update)
            );
        }

        let payload =
            parse_payload(body).map_err(|e| e.with_operation(ApiOperation::Update))?;
        let validated = validate(&payload, &update_rules(), self.store)
            .await
            .map_err(|e| ApiError::from(e).with_operation(ApiOperation::Update))?;

        let changes = AuthorChanges {
            name: validated.str("name").map(str::to_string),
            date_of_birth: validated.date("date_of_birth"),
        };
        if changes.has_updates() {
            self.store
                .update_fields(id, changes)
                .await
                .map_err(|e| duplicate_name_as_field_error(e, ApiOperation::Update))?;
            tracing::info!(author_id = id, operation = "update", "Author updated");
        }

        let author = self
            .store
            .find_by_id_with_relations(id)
            .await?
            .ok_or_else(|| {
                ApiError::not_found(ENTITY, id.to_string()).with_operation(ApiOperation::Update)
            })?;
        Ok(AuthorResponse::new(author))
    }

    /// Delete an author and its books
    pub async fn destroy(&self, id: &str) -> Result<MessageResponse, ApiError> {
        let not_found = |id: &str| {
            ApiError::not_found(ENTITY, id).with_operation(ApiOperation::Delete)
        };

        let id = parse_id(id).map_err(|_| not_found(id))?;
        if !self.store.delete(id).await? {
            return Err(not_found(&id.to_string()));
        }

        tracing::info!(author_id = id, operation = "delete", "Author deleted");
        Ok(MessageResponse::new(DELETED_MESSAGE))
    }
}

/// Author ids are positive integers; anything else cannot name a record
fn parse_id(raw: &str) -> Result<AuthorId, ApiError> {
    raw.parse::<AuthorId>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| ApiError::not_found(ENTITY, raw))
}

fn required_str(validated: &ValidatedPayload, field: &str) -> Result<String, ApiError> {
    validated
        .str(field)
        .map(str::to_string)
        .ok_or_else(|| missing_after_validation(field))
}

fn missing_after_validation(field: &str) -> ApiError {
    ApiError::internal(format!("validated payload lacks `{}`", field))
}

/// A duplicate that slipped past the `unique` rule is still a field error
fn duplicate_name_as_field_error(err: RepositoryError, operation: ApiOperation) -> ApiError {
    if err.kind == RepositoryErrorKind::AlreadyExists {
        let mut errors = FieldErrors::new();
        errors.add("name", "The name has already been taken.");
        return ApiError::validation_failed(errors).with_operation(operation);
    }
    ApiError::from(err).with_operation(operation)
}
