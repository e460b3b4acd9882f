//! Error types and axum `IntoResponse` implementation.

use axum::{
  Json,
  http::{HeaderValue, StatusCode, header},
  response::{IntoResponse, Response},
};
use quad_functions::Rejection;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("unauthorized")]
  Unauthorized,
  #[error("signup rejected: {0}")]
  Rejected(#[from] Rejection),
}

impl IntoResponse for Error {
  fn into_response(self) -> Response {
    match self {
      Error::Unauthorized => {
        let mut res = (
          StatusCode::UNAUTHORIZED,
          Json(json!({ "error": { "status": "UNAUTHENTICATED", "message": "unauthorized" } })),
        )
          .into_response();
        res.headers_mut().insert(
          header::WWW_AUTHENTICATE,
          HeaderValue::from_static("Bearer realm=\"quad\""),
        );
        res
      }
      Error::Rejected(rejection) => (
        StatusCode::FORBIDDEN,
        Json(json!({
          "error": {
            "status":  "PERMISSION_DENIED",
            "code":    rejection.code,
            "message": rejection.message,
          }
        })),
      )
        .into_response(),
    }
  }
}
