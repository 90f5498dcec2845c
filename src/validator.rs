use anyhow::anyhow;
use axum::{
    Json,
    extract::{FromRequest, Request, rejection::JsonRejection},
};
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationErrors};

use crate::utils::errors::AppError;

/// JSON body extractor that runs the DTO's `validator` constraints after
/// deserialization. Body problems are 400s; constraint violations are
/// 422s, with one comma-joined message per failed field.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedJson<T>(pub T);

fn map_rejection(rejection: JsonRejection) -> AppError {
    match rejection {
        JsonRejection::MissingJsonContentType(_) => {
            AppError::bad_request(anyhow!("Missing 'Content-Type: application/json' header"))
        }
        JsonRejection::JsonDataError(err) => {
            // Serde's message already names the offending field
            // ("missing field `title`", "invalid type: ...").
            AppError::bad_request(anyhow!("{}", err.body_text()))
        }
        JsonRejection::JsonSyntaxError(_) => {
            AppError::bad_request(anyhow!("Request body is not valid JSON"))
        }
        _ => AppError::bad_request(anyhow!("Invalid request body")),
    }
}

fn map_validation_errors(errors: &ValidationErrors) -> AppError {
    let message = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |error| match &error.message {
                Some(msg) => msg.to_string(),
                None => format!("{} is invalid", field),
            })
        })
        .collect::<Vec<_>>()
        .join(", ");

    AppError::unprocessable(anyhow!("{}", message))
}

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(map_rejection)?;

        value.validate().map_err(|e| map_validation_errors(&e))?;

        Ok(ValidatedJson(value))
    }
}
