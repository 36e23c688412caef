use std::borrow::Cow;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use derive_more::From;
use jsonschema::error::ValidationErrorKind;
use serde::Serialize;

use crate::store::StoreError;

/// API error
#[derive(Debug, From)]
pub enum ApiError {
    /// Internal server error
    ///
    /// This error is returned when an internal server error occurs.
    InternalServerError(InternalServerError),
    /// Body error
    ///
    /// This error is returned when the body is not as expected.
    Body(BodyError),
    /// Path error
    ///
    /// This error is returned when the path is not as expected.
    Path(PathError),
    /// Validation error
    ///
    /// This error is returned when the body does not match the expected schema.
    Validation(ValidationError),
    /// Book not found error
    ///
    /// This error is returned when no book matches the requested isbn.
    BookNotFound(BookNotFoundError),
    /// Not found error
    ///
    /// This error is returned when the requested resource is not found.
    NotFound(NotFoundError),
    /// Method not allowed
    ///
    /// This error is returned when the method is not allowed.
    MethodNotAllowed(MethodNotAllowedError),
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InternalServerError(err) => err.status_code(),
            ApiError::Body(err) => err.status_code(),
            ApiError::Path(err) => err.status_code(),
            ApiError::Validation(err) => err.status_code(),
            ApiError::BookNotFound(err) => err.status_code(),
            ApiError::NotFound(err) => err.status_code(),
            ApiError::MethodNotAllowed(err) => err.status_code(),
        }
    }

    fn into_message(self) -> ErrorMessage {
        match self {
            ApiError::InternalServerError(err) => err.into_message(),
            ApiError::Body(err) => err.into_message(),
            ApiError::Path(err) => err.into_message(),
            ApiError::Validation(err) => err.into_message(),
            ApiError::BookNotFound(err) => err.into_message(),
            ApiError::NotFound(err) => err.into_message(),
            ApiError::MethodNotAllowed(err) => err.into_message(),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ApiError::InternalServerError(InternalServerError::from_generic_error(err))
    }
}

/// The error message of an [`ApiErrorResponse`].
///
/// A single string, except for validation failures where every violated
/// constraint is listed as one string.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ErrorMessage {
    Single(Cow<'static, str>),
    Violations(Vec<String>),
}

#[derive(Debug, Serialize)]
struct ApiErrorBody {
    message: ErrorMessage,
    status: u16,
}

#[derive(Debug, Serialize)]
struct ApiErrorResponse {
    error: ApiErrorBody,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status_code = self.status_code();

        let response = ApiErrorResponse {
            error: ApiErrorBody {
                message: self.into_message(),
                status: status_code.as_u16(),
            },
        };

        (status_code, Json(response)).into_response()
    }
}

#[derive(Debug)]
pub struct InternalServerError;

impl InternalServerError {
    pub fn from_generic_error<E: Into<anyhow::Error>>(err: E) -> Self {
        let err: anyhow::Error = err.into();
        let err = format!("{err:#}");
        tracing::error!(%err, "Internal server error");

        InternalServerError
    }

    fn status_code(&self) -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }

    fn into_message(self) -> ErrorMessage {
        ErrorMessage::Single(Cow::Borrowed("An internal server error has occurred"))
    }
}

#[derive(Debug)]
pub struct BodyError {
    body_error_reason: String,
}

impl BodyError {
    pub fn new(body_error_reason: String) -> Self {
        BodyError { body_error_reason }
    }

    fn status_code(&self) -> StatusCode {
        StatusCode::BAD_REQUEST
    }

    fn into_message(self) -> ErrorMessage {
        ErrorMessage::Single(Cow::Owned(self.body_error_reason))
    }
}

#[derive(Debug)]
pub struct PathError {
    path_error_reason: String,
}

impl PathError {
    pub fn new(path_error_reason: String) -> Self {
        PathError { path_error_reason }
    }

    fn status_code(&self) -> StatusCode {
        StatusCode::BAD_REQUEST
    }

    fn into_message(self) -> ErrorMessage {
        ErrorMessage::Single(Cow::Owned(self.path_error_reason))
    }
}

#[derive(Debug)]
pub struct ValidationError {
    violations: Vec<String>,
}

impl ValidationError {
    /// Collects schema violations into one error, `None` if there are none.
    pub fn from_schema_errors<'a, I>(errors: I) -> Option<Self>
    where
        I: Iterator<Item = jsonschema::ValidationError<'a>>,
    {
        let violations: Vec<String> = errors.map(|err| Self::violation(&err)).collect();

        match violations.is_empty() {
            true => None,
            false => Some(ValidationError { violations }),
        }
    }

    pub fn violations(&self) -> &[String] {
        &self.violations
    }

    fn violation(err: &jsonschema::ValidationError) -> String {
        let path = err.instance_path().to_string().replace('/', ".");

        match &err.kind() {
            ValidationErrorKind::Required { property } => {
                format!("instance{path} requires property {property}")
            }
            _ => format!("instance{path} {err}"),
        }
    }

    fn status_code(&self) -> StatusCode {
        StatusCode::BAD_REQUEST
    }

    fn into_message(self) -> ErrorMessage {
        ErrorMessage::Violations(self.violations)
    }
}

#[derive(Debug)]
pub struct BookNotFoundError {
    isbn: String,
}

impl BookNotFoundError {
    pub fn new(isbn: impl Into<String>) -> Self {
        BookNotFoundError { isbn: isbn.into() }
    }

    fn status_code(&self) -> StatusCode {
        StatusCode::NOT_FOUND
    }

    fn into_message(self) -> ErrorMessage {
        // The unbalanced quote is kept on purpose, existing clients match
        // this exact string.
        ErrorMessage::Single(Cow::Owned(format!(
            "There is no book with an isbn '{}",
            self.isbn
        )))
    }
}

#[derive(Debug)]
pub struct NotFoundError;

impl NotFoundError {
    pub fn new() -> Self {
        NotFoundError
    }

    fn status_code(&self) -> StatusCode {
        StatusCode::NOT_FOUND
    }

    fn into_message(self) -> ErrorMessage {
        ErrorMessage::Single(Cow::Borrowed("Not Found"))
    }
}

#[derive(Debug)]
pub struct MethodNotAllowedError;

impl MethodNotAllowedError {
    pub fn new() -> Self {
        MethodNotAllowedError
    }

    fn status_code(&self) -> StatusCode {
        StatusCode::METHOD_NOT_ALLOWED
    }

    fn into_message(self) -> ErrorMessage {
        ErrorMessage::Single(Cow::Borrowed("Method Not Allowed"))
    }
}
