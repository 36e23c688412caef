use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{error::ApiError, extractor::json::ApiJson, state::ApiState, store::Book};

use super::BookEnvelope;

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct CreateBookResponse {
    pub book: Book,
}

impl IntoResponse for CreateBookResponse {
    fn into_response(self) -> Response {
        (StatusCode::CREATED, Json(self)).into_response()
    }
}

pub async fn create_book(
    State(state): State<ApiState>,
    ApiJson(payload): ApiJson<BookEnvelope>,
) -> Result<CreateBookResponse, ApiError> {
    let book = state.store().create(&payload.book).await?;

    Ok(CreateBookResponse { book })
}
