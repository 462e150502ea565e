use crate::{
    entry::ValidationError,
    render,
    response::{Html, IntoResponse},
    store::StoreError,
    volume::VolumeError,
    Response,
};
use http::{
    header::{HeaderValue, ALLOW},
    StatusCode,
};
use tracing::error;

/// Why a request could not be served
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// No route matches the path
    #[error("no route for {0}")]
    NotFound(String),
    /// The path exists but not for this method
    #[error("method not allowed, expected one of {allow}")]
    MethodNotAllowed {
        /// value for the `allow` header
        allow: &'static str,
    },
    /// The form body could not be decoded
    #[error("invalid form body: {0}")]
    Form(#[from] serde_urlencoded::de::Error),
    /// The form decoded but its contents were refused
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// The entry store failed
    #[error(transparent)]
    Store(#[from] StoreError),
    /// The volume marker failed
    #[error(transparent)]
    Volume(#[from] VolumeError),
    /// A response body could not be serialized
    #[error("failed to encode response: {0}")]
    Json(#[from] serde_json::Error),
}

impl AppError {
    /// Status code reported to the client
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::MethodNotAllowed { .. } => StatusCode::METHOD_NOT_ALLOWED,
            AppError::Form(_) | AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Store(_) | AppError::Volume(_) | AppError::Json(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        // internals stay in the log, visitors get a generic message
        let detail = if status.is_server_error() {
            error!(error = %self, "request failed");
            "Something went wrong on our side. Please try again later.".to_string()
        } else {
            self.to_string()
        };
        let mut response = (status, Html(render::error_page(status, &detail))).into_response();
        if let AppError::MethodNotAllowed { allow } = self {
            response
                .headers_mut()
                .insert(ALLOW, HeaderValue::from_static(allow));
        }
        response
    }
}
