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
    extractor::{json::ApiJson, path::ApiPath},
    state::ApiState,
    store::{Book, Lookup},
};

use super::{BookEnvelope, BookPath};

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct UpdateBookResponse {
    pub book: Book,
}

impl IntoResponse for UpdateBookResponse {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// Replaces every field of the book stored under the path isbn with the
/// payload, keyed by the old isbn.
pub async fn update_book(
    State(state): State<ApiState>,
    ApiPath(path): ApiPath<BookPath>,
    ApiJson(payload): ApiJson<BookEnvelope>,
) -> Result<UpdateBookResponse, ApiError> {
    match state.store().replace(&path.isbn, &payload.book).await? {
        Lookup::Found(book) => Ok(UpdateBookResponse { book }),
        Lookup::NotFound => Err(BookNotFoundError::new(path.isbn).into()),
    }
}
