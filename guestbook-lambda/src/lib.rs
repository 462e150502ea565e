//! Runs the [guestbook](guestbook) application on AWS Lambda.
//!
//! The function can sit behind an API Gateway REST API, an HTTP API or an
//! Application Load Balancer. Every invocation goes through the same steps:
//!
//! 1. [`event::normalize_event`] reshapes the incoming event into the REST API
//!    (v1) proxy layout, filling defaults instead of failing on gaps
//! 2. [`request::into_request`] turns that into an `http::Request`
//! 3. [`guestbook::App::handle`] serves it
//! 4. [`response::LambdaResponse::from_response`] encodes the response in the
//!    shape the calling gateway expects
//!
//! [`GuestbookHandler`] wires these together for the Lambda runtime.

pub use crate::handler::{dispatch, GuestbookHandler};
pub use lamedh_runtime as lambda;

pub mod event;
mod handler;
pub mod request;
pub mod response;

/// Errors raised while adapting a gateway event into a request
#[derive(Debug, thiserror::Error)]
pub enum AdapterError {
    /// The event isn't JSON of the expected types
    #[error("malformed gateway event: {0}")]
    Event(#[from] serde_json::Error),
    /// `httpMethod` is not a valid HTTP method
    #[error("invalid http method {0:?}")]
    Method(String),
    /// Path, host and query don't form a valid URI
    #[error("invalid request uri {url:?}: {source}")]
    Uri {
        /// the assembled url
        url: String,
        /// parse failure
        #[source]
        source: http::uri::InvalidUri,
    },
    /// Query parameters could not be encoded
    #[error("failed to encode query string: {0}")]
    Query(#[from] serde_urlencoded::ser::Error),
    /// `isBase64Encoded` is set but the body isn't base64
    #[error("invalid base64 body: {0}")]
    Base64(#[from] base64::DecodeError),
}
