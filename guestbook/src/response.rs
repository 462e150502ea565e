//! Response types

use bytes::Bytes;
use http::{
    header::{HeaderValue, CONTENT_TYPE, LOCATION},
    StatusCode,
};

use crate::Response;

const TEXT_PLAIN: &str = "text/plain; charset=utf-8";
const TEXT_HTML: &str = "text/html; charset=utf-8";
const APPLICATION_JSON: &str = "application/json";

/// A conversion of self into a [`Response`] for various types.
///
/// Implementations for `http::Response<B> where B: Into<Bytes>`, `String`,
/// `&'static str`, `serde_json::Value`, [`Html`], [`Redirect`] and
/// `(StatusCode, T)` are provided.
pub trait IntoResponse {
    /// Return a translation of `self` into a `Response`
    fn into_response(self) -> Response;
}

impl<B> IntoResponse for http::Response<B>
where
    B: Into<Bytes>,
{
    fn into_response(self) -> Response {
        let (parts, body) = self.into_parts();
        Response::from_parts(parts, body.into())
    }
}

impl IntoResponse for String {
    fn into_response(self) -> Response {
        with_content_type(Bytes::from(self), TEXT_PLAIN)
    }
}

impl IntoResponse for &'static str {
    fn into_response(self) -> Response {
        with_content_type(Bytes::from_static(self.as_bytes()), TEXT_PLAIN)
    }
}

impl IntoResponse for serde_json::Value {
    fn into_response(self) -> Response {
        with_content_type(Bytes::from(self.to_string()), APPLICATION_JSON)
    }
}

/// An HTML document
#[derive(Debug, Clone)]
pub struct Html<T>(pub T);

impl<T> IntoResponse for Html<T>
where
    T: Into<String>,
{
    fn into_response(self) -> Response {
        with_content_type(Bytes::from(self.0.into()), TEXT_HTML)
    }
}

/// A `303 See Other` pointing at one of the application's own routes
#[derive(Debug, Clone, Copy)]
pub struct Redirect(pub &'static str);

impl IntoResponse for Redirect {
    fn into_response(self) -> Response {
        let mut response = Response::new(Bytes::new());
        *response.status_mut() = StatusCode::SEE_OTHER;
        response
            .headers_mut()
            .insert(LOCATION, HeaderValue::from_static(self.0));
        response
    }
}

impl<T> IntoResponse for (StatusCode, T)
where
    T: IntoResponse,
{
    fn into_response(self) -> Response {
        let (status, inner) = self;
        let mut response = inner.into_response();
        *response.status_mut() = status;
        response
    }
}

fn with_content_type(body: Bytes, content_type: &'static str) -> Response {
    let mut response = Response::new(body);
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
    response
}

#[cfg(test)]
mod tests {
    use super::{Html, IntoResponse, Redirect};
    use http::{
        header::{CONTENT_TYPE, LOCATION},
        Response, StatusCode,
    };
    use serde_json::json;

    fn content_type(response: &crate::Response) -> Option<&str> {
        response
            .headers()
            .get(CONTENT_TYPE)
            .map(|h| h.to_str().expect("invalid header"))
    }

    #[test]
    fn json_into_response() {
        let response = json!({ "hello": "guestbook" }).into_response();
        assert_eq!(response.body().as_ref(), br#"{"hello":"guestbook"}"#);
        assert_eq!(content_type(&response), Some("application/json"));
    }

    #[test]
    fn text_into_response() {
        let response = "text".into_response();
        assert_eq!(response.body().as_ref(), b"text");
        assert_eq!(content_type(&response), Some("text/plain; charset=utf-8"));
    }

    #[test]
    fn html_into_response() {
        let response = Html("<p>hi</p>").into_response();
        assert_eq!(content_type(&response), Some("text/html; charset=utf-8"));
    }

    #[test]
    fn http_response_keeps_parts() {
        let response = Response::builder()
            .status(StatusCode::ACCEPTED)
            .header("x-custom", "1")
            .body("body")
            .expect("failed to create response")
            .into_response();
        assert_eq!(response.status(), StatusCode::ACCEPTED);
        assert_eq!(response.headers()["x-custom"], "1");
        assert_eq!(response.body().as_ref(), b"body");
    }

    #[test]
    fn redirect_is_see_other() {
        let response = Redirect("/").into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[LOCATION], "/");
        assert!(response.body().is_empty());
    }

    #[test]
    fn status_tuple_overrides_status() {
        let response = (StatusCode::SERVICE_UNAVAILABLE, "unavailable").into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(response.body().as_ref(), b"unavailable");
    }
}
