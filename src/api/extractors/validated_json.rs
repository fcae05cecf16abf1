//! Validated JSON extractor - Combines deserialization with validation.

use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::errors::{AppError, FieldError};

/// Validated JSON extractor that automatically validates requests.
///
/// Unparseable bodies are rejected with `400`, well-formed bodies of the
/// wrong shape or with rule violations with `422`.
///
/// # Example
///
/// ```rust,ignore
/// use serde::Deserialize;
/// use validator::Validate;
/// use rust_auth_starter::api::extractors::ValidatedJson;
///
/// #[derive(Deserialize, Validate)]
/// struct LoginRequest {
///     #[validate(email)]
///     email: String,
///     #[validate(length(min = 6))]
///     password: String,
/// }
///
/// async fn login(ValidatedJson(payload): ValidatedJson<LoginRequest>) {
///     // payload is already validated
/// }
/// ```
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(map_rejection)?;

        value
            .validate()
            .map_err(|e| AppError::Validation(collect_field_errors(&e)))?;

        Ok(ValidatedJson(value))
    }
}

fn map_rejection(rejection: JsonRejection) -> AppError {
    match rejection {
        JsonRejection::JsonDataError(e) => AppError::validation("body", e.body_text()),
        other => AppError::BadRequest(other.body_text()),
    }
}

/// Flatten validator output into one entry per failed rule, ordered by field.
fn collect_field_errors(errors: &validator::ValidationErrors) -> Vec<FieldError> {
    let mut fields: Vec<FieldError> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| {
                let message = e
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("{} is invalid", field));
                FieldError::new(field.to_string(), message)
            })
        })
        .collect();

    fields.sort_by(|a, b| a.field.cmp(&b.field));
    fields
}
