use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{
    error::{ApiError, BookNotFoundError},
    extractor::path::ApiPath,
    state::ApiState,
    store::Lookup,
};

use super::BookPath;

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct DeleteBookResponse {
    pub message: String,
}

impl IntoResponse for DeleteBookResponse {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

pub async fn delete_book(
    State(state): State<ApiState>,
    ApiPath(path): ApiPath<BookPath>,
) -> Result<DeleteBookResponse, ApiError> {
    match state.store().delete_by_isbn(&path.isbn).await? {
        Lookup::Found(()) => Ok(DeleteBookResponse {
            message: "Book deleted".to_string(),
        }),
        Lookup::NotFound => Err(BookNotFoundError::new(path.isbn).into()),
    }
}
