use axum::{
    async_trait,
    extract::{FromRequest, Json as AxumJson, Request},
};
use schemars::{schema_for, JsonSchema};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt::Debug;

use crate::error::{ApiError, BodyError, InternalServerError, ValidationError};

/// A Wrapper around [`axum::extract::Json`] that rejects with an [`ApiError`].
///
/// Extracts the request body as JSON consuming the request, validates it
/// against the JSON schema of `T` collecting every violation, and only then
/// deserializes it into `T`.
pub struct ApiJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned + JsonSchema + Debug + Send,
    S: Send + Sync,
{
    type Rejection = ApiError;

    #[tracing::instrument(name = "json_extractor", skip_all)]
    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let value = match AxumJson::<Value>::from_request(req, state).await {
            Ok(json) => json.0,
            Err(json_rejection) => {
                tracing::warn!(rejection=?json_rejection, "Rejection");

                return Err(BodyError::new(json_rejection.body_text()).into());
            }
        };

        let schema =
            serde_json::to_value(schema_for!(T)).map_err(InternalServerError::from_generic_error)?;
        let validator =
            jsonschema::validator_for(&schema).map_err(InternalServerError::from_generic_error)?;

        if let Some(err) = ValidationError::from_schema_errors(validator.iter_errors(&value)) {
            tracing::warn!(violations=?err.violations(), "Validation errors");

            return Err(err.into());
        }

        let json = serde_json::from_value::<T>(value).map_err(|err| {
            tracing::warn!(%err, "Deserialization failed after validation");

            BodyError::new(err.to_string())
        })?;

        tracing::trace!(json=?json, "Extracted");

        Ok(ApiJson(json))
    }
}
