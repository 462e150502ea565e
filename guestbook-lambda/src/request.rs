//! Proxy event to `http::Request` adaptation
//!
//! Events are first brought into the v1 proxy layout by
//! [`normalize_event`](crate::event::normalize_event), so only one shape has
//! to be turned into a request here.

use crate::{
    event::{normalize_event, EventShape, RequestOrigin},
    AdapterError,
};
use bytes::Bytes;
use guestbook::Request;
use http::{
    header::{HeaderName, HeaderValue, COOKIE, HOST},
    HeaderMap, Method, Uri,
};
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, CONTROLS};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::{collections::BTreeMap, io::Read};
use tracing::debug;

/// Typed view of a normalized (v1 layout) proxy event
#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProxyRequest {
    /// request method, any case
    #[serde(default = "default_method")]
    pub http_method: String,
    /// request path, not url-encoded
    #[serde(default = "default_path")]
    pub path: String,
    /// single-valued headers
    #[serde(default, deserialize_with = "nullable")]
    pub headers: BTreeMap<String, String>,
    /// multi-valued headers, preferred over `headers` for the same name
    #[serde(default, deserialize_with = "nullable")]
    pub multi_value_headers: BTreeMap<String, Vec<String>>,
    /// request body, base64 encoded when `is_base64_encoded`
    #[serde(default)]
    pub body: Option<String>,
    /// whether `body` is base64 encoded
    #[serde(default, deserialize_with = "nullable")]
    pub is_base64_encoded: bool,
    /// single-valued query string parameters
    #[serde(default, deserialize_with = "nullable")]
    pub query_string_parameters: BTreeMap<String, String>,
    /// multi-valued query string parameters, preferred when present
    #[serde(default, deserialize_with = "nullable")]
    pub multi_value_query_string_parameters: BTreeMap<String, Vec<String>>,
    /// HTTP API (payload v2) cookies, sent outside of `headers`
    #[serde(default, deserialize_with = "nullable")]
    pub cookies: Vec<String>,
}

// characters a decoded path may contain that can't appear in a URI path;
// `%` is left alone so already encoded paths survive
const PATH: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'[')
    .add(b'\\')
    .add(b']')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

impl ProxyRequest {
    /// Normalizes a gateway event and reads it as a proxy request
    pub fn from_event(event: Value) -> Result<Self, AdapterError> {
        let origin = EventShape::detect(&event).request_origin();
        let mut request: ProxyRequest = serde_json::from_value(normalize_event(event))?;
        if origin == RequestOrigin::Alb {
            request.decode_query_parameters();
        }
        Ok(request)
    }

    // ALB forwards query parameters exactly as they appeared in the url
    fn decode_query_parameters(&mut self) {
        self.query_string_parameters = std::mem::take(&mut self.query_string_parameters)
            .into_iter()
            .map(|(key, value)| (form_decode(&key), form_decode(&value)))
            .collect();
        self.multi_value_query_string_parameters =
            std::mem::take(&mut self.multi_value_query_string_parameters)
                .into_iter()
                .map(|(key, values)| {
                    let values = values.iter().map(|value| form_decode(value)).collect();
                    (form_decode(&key), values)
                })
                .collect();
    }
}

fn form_decode(raw: &str) -> String {
    percent_decode_str(&raw.replace('+', " "))
        .decode_utf8_lossy()
        .into_owned()
}

fn default_method() -> String {
    "GET".to_string()
}

fn default_path() -> String {
    "/".to_string()
}

// `null` and absent both mean "empty"
fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Converts a proxy event into the application's request type
pub fn into_request(event: ProxyRequest) -> Result<Request, AdapterError> {
    let method = Method::from_bytes(event.http_method.to_ascii_uppercase().as_bytes())
        .map_err(|_| AdapterError::Method(event.http_method.clone()))?;

    // multi-valued headers are a super set of single valued ones when a
    // gateway sends both
    let mut headers = HeaderMap::new();
    for (name, values) in &event.multi_value_headers {
        if let Some(name) = header_name(name) {
            for value in values {
                if let Some(value) = header_value(&name, value) {
                    headers.append(&name, value);
                }
            }
        }
    }
    for (name, value) in &event.headers {
        if let Some(name) = header_name(name) {
            if !headers.contains_key(&name) {
                if let Some(value) = header_value(&name, value) {
                    headers.insert(name, value);
                }
            }
        }
    }
    if !event.cookies.is_empty() {
        if let Some(value) = header_value(&COOKIE, &event.cookies.join("; ")) {
            headers.append(COOKIE, value);
        }
    }

    let uri = {
        let scheme = headers
            .get(x_forwarded_proto())
            .and_then(|s| s.to_str().ok())
            .unwrap_or("https");
        let host = headers
            .get(HOST)
            .and_then(|s| s.to_str().ok())
            .unwrap_or("localhost");
        let path = utf8_percent_encode(&event.path, PATH);
        let mut url = format!("{}://{}{}", scheme, host, path);
        let query = query_string(&event)?;
        if !query.is_empty() {
            url.push('?');
            url.push_str(&query);
        }
        url.parse::<Uri>()
            .map_err(|source| AdapterError::Uri { url, source })?
    };

    let body = match event.body {
        None => Bytes::new(),
        Some(body) if event.is_base64_encoded => Bytes::from(base64::decode(&body)?),
        Some(body) => Bytes::from(body),
    };

    let mut request = Request::new(body);
    *request.method_mut() = method;
    *request.uri_mut() = uri;
    *request.headers_mut() = headers;
    Ok(request)
}

// multi valued query string parameters are always a super
// set of singly valued query string parameters,
// when present, multi-valued query string parameters are preferred
fn query_string(event: &ProxyRequest) -> Result<String, AdapterError> {
    let pairs: Vec<(&str, &str)> = if event.multi_value_query_string_parameters.is_empty() {
        event
            .query_string_parameters
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
            .collect()
    } else {
        event
            .multi_value_query_string_parameters
            .iter()
            .flat_map(|(key, values)| values.iter().map(move |value| (key.as_str(), value.as_str())))
            .collect()
    };
    Ok(serde_urlencoded::to_string(pairs)?)
}

fn header_name(name: &str) -> Option<HeaderName> {
    match HeaderName::from_bytes(name.as_bytes()) {
        Ok(name) => Some(name),
        Err(_) => {
            debug!(header = name, "skipping invalid header name");
            None
        }
    }
}

fn header_value(name: &HeaderName, value: &str) -> Option<HeaderValue> {
    match HeaderValue::from_str(value) {
        Ok(value) => Some(value),
        Err(_) => {
            debug!(header = %name, "skipping invalid header value");
            None
        }
    }
}

fn x_forwarded_proto() -> HeaderName {
    HeaderName::from_static("x-forwarded-proto")
}

/// Normalizes a gateway event value and converts it into a request
pub fn from_value(event: Value) -> Result<Request, AdapterError> {
    into_request(ProxyRequest::from_event(event)?)
}

/// Deserializes a `Request` from a `Read` impl providing JSON events.
///
/// # Example
///
/// ```rust,no_run
/// use guestbook_lambda::request::from_reader;
/// use std::fs::File;
/// use std::error::Error;
///
/// fn main() -> Result<(), Box<dyn Error>> {
///     let request = from_reader(
///         File::open("path/to/request.json")?
///     )?;
///     Ok(println!("{:#?}", request))
/// }
/// ```
pub fn from_reader<R>(rdr: R) -> Result<Request, AdapterError>
where
    R: Read,
{
    from_value(serde_json::from_reader(rdr)?)
}

/// Deserializes a `Request` from a string of JSON text.
///
/// # Example
///
/// ```rust,no_run
/// use guestbook_lambda::request::from_str;
/// use std::error::Error;
///
/// fn main() -> Result<(), Box<dyn Error>> {
///     let request = from_str(
///         r#"{ ...raw json here... }"#
///     )?;
///     Ok(println!("{:#?}", request))
/// }
/// ```
pub fn from_str(s: &str) -> Result<Request, AdapterError> {
    from_value(serde_json::from_str(s)?)
}
