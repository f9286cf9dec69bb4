use std::fmt::Debug;

use axum::{
    Json,
    response::{IntoResponse, Response},
};
use http::StatusCode;
use serde::Serialize;
use tracing::error;
use utoipa::IntoResponses;

pub struct JsonResponse<T: Serialize, E: Serialize>(Result<T, E>);

impl<T: Serialize, E: Serialize + IntoResponse> JsonResponse<T, E> {
    pub fn new_error(error: E) -> Self {
        Self(Err(error))
    }

    pub fn new_ok(value: T) -> Self {
        Self(Ok(value))
    }
}

impl<T: Serialize, E: Serialize + IntoResponse> IntoResponses for JsonResponse<T, E> {
    fn responses() -> std::collections::BTreeMap<
        String,
        utoipa::openapi::RefOr<utoipa::openapi::response::Response>,
    > {
        std::collections::BTreeMap::new()
    }
}

impl<T: Serialize, E: Serialize + IntoResponse + Debug> IntoResponse for JsonResponse<T, E> {
    fn into_response(self) -> Response {
        match self.0 {
            Ok(value) => (StatusCode::OK, Json(value)).into_response(),
            Err(error) => {
                error!("Error: {:?}", error);

                error.into_response()
            }
        }
    }
}

impl<T: Serialize, E: Serialize + IntoResponse> From<Result<T, E>> for JsonResponse<T, E> {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => JsonResponse::new_ok(value),
            Err(error) => JsonResponse::new_error(error),
        }
    }
}

/// Like [`JsonResponse`] but answers `201 Created` on the success path.
pub struct CreatedResponse<T: Serialize, E: Serialize>(Result<T, E>);

impl<T: Serialize, E: Serialize + IntoResponse> CreatedResponse<T, E> {
    pub fn new_error(error: E) -> Self {
        Self(Err(error))
    }

    pub fn new_ok(value: T) -> Self {
        Self(Ok(value))
    }
}

impl<T: Serialize, E: Serialize + IntoResponse> IntoResponses for CreatedResponse<T, E> {
    fn responses() -> std::collections::BTreeMap<
        String,
        utoipa::openapi::RefOr<utoipa::openapi::response::Response>,
    > {
        std::collections::BTreeMap::new()
    }
}

impl<T: Serialize, E: Serialize + IntoResponse + Debug> IntoResponse for CreatedResponse<T, E> {
    fn into_response(self) -> Response {
        match self.0 {
            Ok(value) => (StatusCode::CREATED, Json(value)).into_response(),
            Err(error) => {
                error!("Error: {:?}", error);

                error.into_response()
            }
        }
    }
}

impl<T: Serialize, E: Serialize + IntoResponse> From<Result<T, E>> for CreatedResponse<T, E> {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => CreatedResponse::new_ok(value),
            Err(error) => CreatedResponse::new_error(error),
        }
    }
}
