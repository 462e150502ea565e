//! Gateway event normalization
//!
//! Lambda functions behind API Gateway REST APIs, HTTP APIs and Application
//! Load Balancers receive differently shaped events. [`normalize_event`]
//! reshapes any of them into the REST API (v1) proxy event layout, which is
//! the only layout the rest of this crate reads.
//!
//! Normalization never fails. Missing or malformed fields are filled with
//! defaults so a best-effort request still reaches the application.

use serde_json::{Map, Value};

const DEFAULT_METHOD: &str = "GET";
const DEFAULT_PATH: &str = "/";
const DEFAULT_STAGE: &str = "prod";

/// Which gateway markers an event carries under `requestContext`.
///
/// The two flags are detected independently, so a malformed event can carry
/// both.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EventShape {
    /// `requestContext.http` is present (HTTP API, payload v2)
    pub http_api: bool,
    /// `requestContext.elb` is present (Application Load Balancer)
    pub alb: bool,
}

impl EventShape {
    /// Inspects `event` without modifying it
    pub fn detect(event: &Value) -> Self {
        match event.as_object() {
            Some(map) => Self::detect_map(map),
            None => EventShape::default(),
        }
    }

    fn detect_map(event: &Map<String, Value>) -> Self {
        let context = event.get("requestContext").and_then(Value::as_object);
        let has = |key: &str| context.map_or(false, |context| context.contains_key(key));
        EventShape {
            http_api: has("http"),
            alb: has("elb"),
        }
    }

    /// The response flavor to answer with. HTTP API wins over ALB when an
    /// event carries both markers.
    pub fn request_origin(&self) -> RequestOrigin {
        if self.http_api {
            RequestOrigin::ApiGatewayV2
        } else if self.alb {
            RequestOrigin::Alb
        } else {
            RequestOrigin::ApiGatewayV1
        }
    }
}

/// Represents the origin from which the lambda was requested from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestOrigin {
    /// API Gateway proxy request origin
    ApiGatewayV1,
    /// API Gateway v2 request origin
    ApiGatewayV2,
    /// ALB request origin
    Alb,
}

/// Reshapes a gateway event into the v1 proxy event layout.
///
/// The result always has `httpMethod`, `path` (starting with `/`), `headers`,
/// `body`, `isBase64Encoded`, `requestContext`, `queryStringParameters`,
/// `multiValueQueryStringParameters`, `pathParameters` and `stageVariables`.
/// Defaults only fill absent fields, and fields this function doesn't know
/// about pass through untouched. Normalizing a normalized event is a no-op.
pub fn normalize_event(event: Value) -> Value {
    let mut event = match event {
        Value::Object(map) => map,
        _ => Map::new(),
    };
    let shape = EventShape::detect_map(&event);

    set_default(&mut event, "httpMethod", Value::from(DEFAULT_METHOD));
    set_default(&mut event, "path", Value::from(DEFAULT_PATH));
    set_default(&mut event, "headers", Value::Object(Map::new()));
    set_default(&mut event, "body", Value::Null);
    set_default(&mut event, "isBase64Encoded", Value::Bool(false));
    if !event.get("requestContext").map_or(false, Value::is_object) {
        let mut context = Map::new();
        context.insert("stage".into(), Value::from(DEFAULT_STAGE));
        event.insert("requestContext".into(), Value::Object(context));
    }
    set_default(&mut event, "queryStringParameters", Value::Null);
    set_default(&mut event, "multiValueQueryStringParameters", Value::Null);
    set_default(&mut event, "pathParameters", Value::Null);
    set_default(&mut event, "stageVariables", Value::Null);

    if shape.http_api {
        apply_http_api(&mut event);
    }
    // ALB events already carry the v1 fields; the defaults above cover gaps.

    let path = match event.get("path") {
        Some(Value::String(path)) if path.starts_with('/') => None,
        Some(Value::String(path)) => Some(format!("/{}", path)),
        _ => Some(DEFAULT_PATH.to_string()),
    };
    if let Some(path) = path {
        event.insert("path".into(), Value::String(path));
    }

    Value::Object(event)
}

fn apply_http_api(event: &mut Map<String, Value>) {
    let method = event
        .get("requestContext")
        .and_then(|context| context.get("http"))
        .and_then(|http| http.get("method"))
        .and_then(Value::as_str)
        .map(str::to_string);
    // a null or mistyped method keeps whatever httpMethod already holds
    if let Some(method) = method {
        event.insert("httpMethod".into(), Value::String(method));
    }

    if let Some(raw_path) = event.get("rawPath").cloned() {
        event.insert("path".into(), raw_path);
    }

    if !event.get("headers").map_or(false, is_truthy) {
        event.insert("headers".into(), Value::Object(Map::new()));
    }

    if let Some(flag) = event.get("isBase64Encoded").map(is_truthy) {
        event.insert("isBase64Encoded".into(), Value::Bool(flag));
    }

    let query = match event.get("rawQueryString") {
        Some(Value::String(raw)) if !raw.is_empty() => Some(parse_query(raw)),
        _ => None,
    };
    if let Some(params) = query {
        let params = if params.is_empty() {
            Value::Null
        } else {
            Value::Object(params)
        };
        event.insert("queryStringParameters".into(), params);
    }
}

fn set_default(event: &mut Map<String, Value>, key: &str, value: Value) {
    event.entry(key).or_insert(value);
}

/// Decodes `a=1&b=&c` into a flat map, keeping blank values; the last of
/// repeated keys wins.
fn parse_query(raw: &str) -> Map<String, Value> {
    serde_urlencoded::from_str::<Vec<(String, String)>>(raw)
        .unwrap_or_default()
        .into_iter()
        .map(|(key, value)| (key, Value::String(value)))
        .collect()
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().map_or(true, |n| n != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn defaults() -> Value {
        json!({
            "httpMethod": "GET",
            "path": "/",
            "headers": {},
            "body": null,
            "isBase64Encoded": false,
            "requestContext": { "stage": "prod" },
            "queryStringParameters": null,
            "multiValueQueryStringParameters": null,
            "pathParameters": null,
            "stageVariables": null
        })
    }

    #[test]
    fn empty_and_non_object_events_get_defaults() {
        assert_eq!(normalize_event(json!({})), defaults());
        assert_eq!(normalize_event(Value::Null), defaults());
        assert_eq!(normalize_event(json!("GET /")), defaults());
        assert_eq!(normalize_event(json!([1, 2, 3])), defaults());
    }

    #[test]
    fn missing_request_context_defaults_stage() {
        let event = normalize_event(json!({ "httpMethod": "POST", "path": "/submit" }));
        assert_eq!(event["requestContext"], json!({ "stage": "prod" }));
    }

    #[test]
    fn existing_request_context_is_kept() {
        let context = json!({ "stage": "dev", "requestId": "abc" });
        let event = normalize_event(json!({ "requestContext": context.clone() }));
        assert_eq!(event["requestContext"], context);
    }

    #[test]
    fn missing_path_defaults_to_root() {
        assert_eq!(normalize_event(json!({ "httpMethod": "GET" }))["path"], "/");
    }

    #[test]
    fn relative_path_gets_leading_slash() {
        assert_eq!(normalize_event(json!({ "path": "foo/bar" }))["path"], "/foo/bar");
        assert_eq!(normalize_event(json!({ "path": "" }))["path"], "/");
    }

    #[test]
    fn non_string_path_becomes_root() {
        assert_eq!(normalize_event(json!({ "path": null }))["path"], "/");
        assert_eq!(normalize_event(json!({ "path": 42 }))["path"], "/");
    }

    #[test]
    fn present_values_are_not_overwritten() {
        let event = normalize_event(json!({
            "httpMethod": "DELETE",
            "headers": null,
            "body": "payload",
            "isBase64Encoded": true,
            "queryStringParameters": { "q": "1" },
            "stageVariables": { "env": "test" }
        }));
        assert_eq!(event["httpMethod"], "DELETE");
        assert_eq!(event["headers"], Value::Null);
        assert_eq!(event["body"], "payload");
        assert_eq!(event["isBase64Encoded"], true);
        assert_eq!(event["queryStringParameters"], json!({ "q": "1" }));
        assert_eq!(event["stageVariables"], json!({ "env": "test" }));
    }

    #[test]
    fn unknown_fields_pass_through() {
        let event = normalize_event(json!({
            "resource": "/{proxy+}",
            "multiValueHeaders": { "accept": ["text/html"] },
            "custom": { "nested": [1, 2] }
        }));
        assert_eq!(event["resource"], "/{proxy+}");
        assert_eq!(event["multiValueHeaders"], json!({ "accept": ["text/html"] }));
        assert_eq!(event["custom"], json!({ "nested": [1, 2] }));
    }

    #[test]
    fn http_api_method_and_raw_path() {
        let event = normalize_event(json!({
            "requestContext": { "http": { "method": "POST" } },
            "rawPath": "/submit"
        }));
        assert_eq!(event["httpMethod"], "POST");
        assert_eq!(event["path"], "/submit");
    }

    #[test]
    fn http_api_without_method_or_raw_path_keeps_defaults() {
        let event = normalize_event(json!({
            "requestContext": { "http": {} },
            "httpMethod": "PUT"
        }));
        assert_eq!(event["httpMethod"], "PUT");
        assert_eq!(event["path"], "/");
    }

    #[test]
    fn http_api_null_method_keeps_default() {
        let event = normalize_event(json!({
            "requestContext": { "http": { "method": null } },
            "rawPath": "/entries"
        }));
        assert_eq!(event["httpMethod"], "GET");

        let event = normalize_event(json!({
            "requestContext": { "http": { "method": 7 } },
            "httpMethod": "POST"
        }));
        assert_eq!(event["httpMethod"], "POST");
    }

    #[test]
    fn http_api_query_string_keeps_blank_values() {
        let event = normalize_event(json!({
            "requestContext": { "http": { "method": "GET" } },
            "rawQueryString": "a=1&b=&c=2"
        }));
        assert_eq!(
            event["queryStringParameters"],
            json!({ "a": "1", "b": "", "c": "2" })
        );
    }

    #[test]
    fn http_api_query_string_decodes_and_last_value_wins() {
        let event = normalize_event(json!({
            "requestContext": { "http": {} },
            "rawQueryString": "name=Ada+Lovelace&x=1&x=2&flag&msg=caf%C3%A9"
        }));
        assert_eq!(
            event["queryStringParameters"],
            json!({ "name": "Ada Lovelace", "x": "2", "flag": "", "msg": "café" })
        );
    }

    #[test]
    fn http_api_empty_query_string_is_null() {
        let event = normalize_event(json!({
            "requestContext": { "http": { "method": "GET" } },
            "rawQueryString": ""
        }));
        assert_eq!(event["queryStringParameters"], Value::Null);

        let event = normalize_event(json!({
            "requestContext": { "http": {} },
            "rawQueryString": "&&"
        }));
        assert_eq!(event["queryStringParameters"], Value::Null);
    }

    #[test]
    fn http_api_headers_and_base64_flag_are_coerced() {
        let event = normalize_event(json!({
            "requestContext": { "http": {} },
            "headers": null,
            "isBase64Encoded": "yes",
            "body": "bmFtZT1BZGE="
        }));
        assert_eq!(event["headers"], json!({}));
        assert_eq!(event["isBase64Encoded"], true);
        assert_eq!(event["body"], "bmFtZT1BZGE=");

        let event = normalize_event(json!({
            "requestContext": { "http": {} },
            "isBase64Encoded": 0
        }));
        assert_eq!(event["isBase64Encoded"], false);
    }

    #[test]
    fn alb_event_fields_are_preserved() {
        let input = json!({
            "requestContext": { "elb": { "targetGroupArn": "arn:aws:elasticloadbalancing:region:123456789012:targetgroup/tg/abc" } },
            "httpMethod": "POST",
            "path": "/submit",
            "headers": { "content-type": "application/x-www-form-urlencoded" },
            "body": "name=Ada&message=hi",
            "isBase64Encoded": false
        });
        let event = normalize_event(input.clone());
        for field in ["httpMethod", "path", "headers", "body", "isBase64Encoded", "requestContext"] {
            assert_eq!(event[field], input[field], "{} changed", field);
        }
        for field in [
            "queryStringParameters",
            "multiValueQueryStringParameters",
            "pathParameters",
            "stageVariables",
        ] {
            assert!(event.get(field).is_some(), "{} missing", field);
        }
    }

    #[test]
    fn both_markers_still_apply_http_api_rules() {
        let event = normalize_event(json!({
            "requestContext": { "http": { "method": "PATCH" }, "elb": {} },
            "httpMethod": "GET",
            "rawPath": "/entries"
        }));
        assert_eq!(event["httpMethod"], "PATCH");
        assert_eq!(event["path"], "/entries");
    }

    #[test]
    fn shape_detection() {
        let v2 = json!({ "requestContext": { "http": {} } });
        let alb = json!({ "requestContext": { "elb": {} } });
        let both = json!({ "requestContext": { "http": {}, "elb": {} } });
        let v1 = json!({ "requestContext": { "stage": "prod" } });

        assert_eq!(EventShape::detect(&v2).request_origin(), RequestOrigin::ApiGatewayV2);
        assert_eq!(EventShape::detect(&alb).request_origin(), RequestOrigin::Alb);
        assert_eq!(
            EventShape::detect(&both),
            EventShape {
                http_api: true,
                alb: true
            }
        );
        assert_eq!(EventShape::detect(&both).request_origin(), RequestOrigin::ApiGatewayV2);
        assert_eq!(EventShape::detect(&v1).request_origin(), RequestOrigin::ApiGatewayV1);
        assert_eq!(EventShape::detect(&json!(null)), EventShape::default());
    }

    #[test]
    fn normalization_is_idempotent() {
        let events = vec![
            json!({}),
            json!(null),
            json!({ "path": "relative", "custom": true }),
            json!({
                "requestContext": { "http": { "method": "POST" }, "stage": "$default" },
                "rawPath": "/submit",
                "rawQueryString": "a=1&b=",
                "headers": { "host": "example.com" },
                "body": "e30=",
                "isBase64Encoded": 1
            }),
            json!({
                "requestContext": { "elb": {} },
                "httpMethod": "GET",
                "path": "/entries"
            }),
        ];
        for event in events {
            let once = normalize_event(event);
            assert_eq!(normalize_event(once.clone()), once);
        }
    }
}
