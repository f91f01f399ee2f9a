use axum::{
    Json,
    extract::rejection::QueryRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{Value, json};

/// One rejected input, shaped like a framework validation entry:
/// `{"loc": ["query", "border"], "msg": "...", "input": 51}`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FieldViolation {
    pub loc: Vec<String>,
    pub msg: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input: Option<Value>,
}

impl FieldViolation {
    pub fn query(field: &str, msg: impl Into<String>, input: Option<Value>) -> Self {
        Self {
            loc: vec!["query".to_string(), field.to_string()],
            msg: msg.into(),
            input,
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    #[error("request validation failed")]
    Validation(Vec<FieldViolation>),
    #[error("{0}")]
    Generation(String),
}

impl ApiError {
    pub fn generation(err: impl std::fmt::Display) -> Self {
        ApiError::Generation(err.to_string())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Generation(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::Validation(vec![FieldViolation {
            loc: vec!["query".to_string()],
            msg: rejection.body_text(),
            input: None,
        }])
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            ApiError::Validation(violations) => {
                tracing::warn!(?violations, "rejected create request");
                json!({ "detail": violations })
            }
            ApiError::Generation(message) => {
                tracing::error!(%message, "qr code generation failed");
                json!({ "detail": message })
            }
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_maps_to_unprocessable_entity() {
        let err = ApiError::Validation(vec![FieldViolation::query(
            "border",
            "Input should be less than or equal to 50",
            Some(json!(51)),
        )]);
        assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn generation_displays_its_message() {
        let err = ApiError::generation("boom");
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_string(), "boom");
    }

    #[test]
    fn violation_serializes_location_and_input() {
        let violation = FieldViolation::query("box_size", "too small", Some(json!(5)));
        let value = serde_json::to_value(&violation).unwrap();
        assert_eq!(value["loc"], json!(["query", "box_size"]));
        assert_eq!(value["input"], json!(5));

        let without_input = FieldViolation::query("data", "missing", None);
        let value = serde_json::to_value(&without_input).unwrap();
        assert!(value.get("input").is_none());
    }
}
