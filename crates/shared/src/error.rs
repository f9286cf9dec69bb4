use axum::{
    Json,
    response::{IntoResponse, Response},
};
use http::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::{IntoResponses, PartialSchema, ToSchema};

#[derive(Error, Debug, Serialize)]
pub enum CommonError {
    #[error("could not find resource")]
    NotFound {
        msg: String,
        lookup_id: String,
        #[serde(skip)]
        #[source]
        source: Option<anyhow::Error>,
    },
    #[error("invalid request")]
    InvalidRequest {
        msg: String,
        #[serde(skip)]
        #[source]
        source: Option<anyhow::Error>,
    },
    #[error("invalid response")]
    InvalidResponse {
        msg: String,
        #[serde(skip)]
        #[source]
        source: Option<anyhow::Error>,
    },
    #[error("repository error")]
    Repository {
        msg: String,
        #[serde(skip)]
        #[source]
        source: Option<anyhow::Error>,
    },
    #[error("unknown error")]
    Unknown(
        #[serde(skip)]
        #[from]
        anyhow::Error,
    ),
    #[error("sqlite database error")]
    SqliteError {
        #[serde(skip)]
        #[from]
        #[source]
        source: libsql::Error,
    },
    #[error("io error")]
    IoError {
        #[serde(skip)]
        #[from]
        #[source]
        source: std::io::Error,
    },
    #[error("serde json error")]
    SerdeSerializationError {
        #[serde(skip)]
        #[from]
        #[source]
        source: serde_json::Error,
    },
    #[error("url parse error")]
    UrlParseError {
        #[serde(skip)]
        #[from]
        #[source]
        source: url::ParseError,
    },
    #[error("axum error")]
    AxumError {
        #[serde(skip)]
        #[from]
        #[source]
        source: axum::Error,
    },
    #[error("address parse error")]
    AddrParseError {
        #[serde(skip)]
        #[from]
        #[source]
        source: std::net::AddrParseError,
    },
    #[error("http client error")]
    ReqwestError {
        #[serde(skip)]
        #[from]
        #[source]
        source: reqwest::Error,
    },
}

impl ToSchema for CommonError {
    fn name() -> std::borrow::Cow<'static, str> {
        std::borrow::Cow::Borrowed("Error")
    }

    fn schemas(
        _schemas: &mut Vec<(
            String,
            utoipa::openapi::RefOr<utoipa::openapi::schema::Schema>,
        )>,
    ) {
        // nothing by default
    }
}

impl PartialSchema for CommonError {
    fn schema() -> utoipa::openapi::RefOr<utoipa::openapi::schema::Schema> {
        utoipa::openapi::ObjectBuilder::new()
            .property(
                "message",
                utoipa::openapi::ObjectBuilder::new()
                    .schema_type(utoipa::openapi::schema::Type::String),
            )
            .required("message")
            .into()
    }
}

impl IntoResponses for CommonError {
    fn responses() -> std::collections::BTreeMap<
        String,
        utoipa::openapi::RefOr<utoipa::openapi::response::Response>,
    > {
        let mut responses = std::collections::BTreeMap::new();

        let error_content = utoipa::openapi::ContentBuilder::new()
            .schema(Some(CommonError::schema()))
            .build();

        // Invalid Request - 400
        responses.insert(
            "400".to_string(),
            utoipa::openapi::ResponseBuilder::new()
                .description("Invalid request")
                .content("application/json", error_content.clone())
                .into(),
        );

        // Not Found Error - 404
        responses.insert(
            "404".to_string(),
            utoipa::openapi::ResponseBuilder::new()
                .description("Resource not found")
                .content("application/json", error_content.clone())
                .into(),
        );

        // Server Error - 500
        responses.insert(
            "500".to_string(),
            utoipa::openapi::ResponseBuilder::new()
                .description("Server error")
                .content("application/json", error_content)
                .into(),
        );

        responses
    }
}

impl IntoResponse for CommonError {
    fn into_response(self) -> Response {
        let status = match self {
            CommonError::NotFound { .. } => StatusCode::NOT_FOUND,
            CommonError::InvalidRequest { .. } => StatusCode::BAD_REQUEST,
            CommonError::InvalidResponse { .. }
            | CommonError::Unknown(_)
            | CommonError::Repository { .. }
            | CommonError::SqliteError { .. }
            | CommonError::IoError { .. }
            | CommonError::SerdeSerializationError { .. }
            | CommonError::UrlParseError { .. }
            | CommonError::AxumError { .. }
            | CommonError::AddrParseError { .. }
            | CommonError::ReqwestError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };

        // Only the explicitly user-facing variants carry their message into
        // the body; everything else collapses to its generic display string
        // so store-internal detail stays in the log.
        let message = match &self {
            CommonError::NotFound { msg, .. } | CommonError::InvalidRequest { msg, .. } => {
                msg.clone()
            }
            other => other.to_string(),
        };

        (status, Json(ErrorResponse { message })).into_response()
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub message: String,
}
