use crate::error::{ApiError, NotFoundError};

pub async fn not_found() -> ApiError {
    ApiError::NotFound(NotFoundError::new())
}
