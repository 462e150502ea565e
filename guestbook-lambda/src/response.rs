//! Response types

use aws_lambda_events::encodings::Body;
use aws_lambda_events::event::alb::AlbTargetGroupResponse;
use aws_lambda_events::event::apigw::{ApiGatewayProxyResponse, ApiGatewayV2httpResponse};
use bytes::Bytes;
use http::{
    header::{CONTENT_TYPE, SET_COOKIE},
    HeaderMap,
};
use serde::Serialize;

use crate::event::RequestOrigin;

const TEXT_CONTENT_TYPES: &[&str] = &["text/", "application/json", "application/x-www-form-urlencoded"];

/// Representation of Lambda response
#[doc(hidden)]
#[derive(Serialize, Debug)]
#[serde(untagged)]
pub enum LambdaResponse {
    ApiGatewayV2(ApiGatewayV2httpResponse),
    ApiGatewayV1(ApiGatewayProxyResponse),
    Alb(AlbTargetGroupResponse),
}

/// tranformation from http type to internal type
impl LambdaResponse {
    /// Builds the response shape `request_origin` expects
    pub fn from_response(request_origin: &RequestOrigin, value: guestbook::Response) -> Self {
        let (parts, bytes) = value.into_parts();
        let (is_base64_encoded, body) = encode_body(&parts.headers, bytes);

        let mut headers = parts.headers;
        let status_code = parts.status.as_u16();

        match request_origin {
            RequestOrigin::ApiGatewayV2 => {
                // ApiGatewayV2 expects the set-cookies headers to be in the "cookies" attribute,
                // so remove them from the headers.
                let cookies = headers
                    .get_all(SET_COOKIE)
                    .iter()
                    .filter_map(|v| v.to_str().ok())
                    .map(str::to_string)
                    .collect();
                headers.remove(SET_COOKIE);

                LambdaResponse::ApiGatewayV2(ApiGatewayV2httpResponse {
                    body,
                    status_code: status_code as i64,
                    is_base64_encoded: Some(is_base64_encoded),
                    cookies,
                    headers: headers.clone(),
                    multi_value_headers: headers,
                })
            }
            RequestOrigin::ApiGatewayV1 => LambdaResponse::ApiGatewayV1(ApiGatewayProxyResponse {
                body,
                status_code: status_code as i64,
                is_base64_encoded: Some(is_base64_encoded),
                headers: headers.clone(),
                multi_value_headers: headers,
            }),
            RequestOrigin::Alb => LambdaResponse::Alb(AlbTargetGroupResponse {
                body,
                status_code: status_code as i64,
                is_base64_encoded,
                headers: headers.clone(),
                multi_value_headers: headers,
                status_description: Some(format!(
                    "{} {}",
                    status_code,
                    parts.status.canonical_reason().unwrap_or_default()
                )),
            }),
        }
    }
}

/// Text content types with UTF-8 bodies travel as plain strings, everything
/// else as base64. Empty bodies are left out.
fn encode_body(headers: &HeaderMap, bytes: Bytes) -> (bool, Option<Body>) {
    if bytes.is_empty() {
        return (false, None);
    }
    let is_text = headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map_or(false, |content_type| {
            TEXT_CONTENT_TYPES
                .iter()
                .any(|prefix| content_type.starts_with(prefix))
        });
    if is_text {
        if let Ok(text) = String::from_utf8(bytes.to_vec()) {
            return (false, Some(Body::Text(text)));
        }
    }
    (true, Some(Body::Binary(bytes.to_vec())))
}
