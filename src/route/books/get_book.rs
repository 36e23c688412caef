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
    store::{Book, Lookup},
};

use super::BookPath;

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct GetBookResponse {
    pub book: Book,
}

impl IntoResponse for GetBookResponse {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

pub async fn get_book(
    State(state): State<ApiState>,
    ApiPath(path): ApiPath<BookPath>,
) -> Result<GetBookResponse, ApiError> {
    match state.store().find_by_isbn(&path.isbn).await? {
        Lookup::Found(book) => Ok(GetBookResponse { book }),
        Lookup::NotFound => Err(BookNotFoundError::new(path.isbn).into()),
    }
}
