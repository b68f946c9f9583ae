//! Adapting a [`Handler`] to `http` request/response types.
//!
//! The adapter is a pure translation layer: it extracts the logical input
//! parts from the platform request, runs the pipeline, and maps the result
//! back. Errors are returned to the caller untouched so the surrounding
//! platform can route them through its native error channel; the adapter
//! never formats an error body itself.

use crate::envelope::ResponseEnvelope;
use crate::params::PathParams;
use bytes::Bytes;
use http::header::CONTENT_TYPE;
use http::{HeaderMap, HeaderName, HeaderValue, Request, Response, StatusCode};
use micro_handler::{Context, Handler, PipelineError};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::warn;

/// Extraction failures raised while translating the platform request.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("invalid request body: {reason}")]
    InvalidBody { reason: String },

    #[error("invalid query string: {reason}")]
    InvalidQuery { reason: String },
}

impl ExtractError {
    pub fn invalid_body<S: ToString>(reason: S) -> Self {
        Self::InvalidBody { reason: reason.to_string() }
    }

    pub fn invalid_query<S: ToString>(reason: S) -> Self {
        Self::InvalidQuery { reason: reason.to_string() }
    }
}

/// Wraps a [`Handler`] into an `http`-native callback.
///
/// For a multi-part handler the request is split into the four logical
/// parts (`body`/`query`/`params`/`headers`); otherwise the decoded body
/// alone is the input. Path parameters are read from a [`PathParams`]
/// planted in the request extensions by the surrounding router.
#[derive(Debug, Clone)]
pub struct HttpAdapter {
    handler: Handler,
}

impl HttpAdapter {
    pub fn new(handler: Handler) -> Self {
        Self { handler }
    }

    /// Translates the request, runs the pipeline, and maps the result.
    ///
    /// A result matching the `{status, body, headers?}` envelope shape
    /// controls the response; any other result is sent as the whole JSON
    /// body with status 200.
    pub async fn call(&self, req: Request<Bytes>) -> Result<Response<Bytes>, PipelineError> {
        let (parts, body) = req.into_parts();

        let input = if self.handler.expects_multi_input() {
            let mut map = Map::new();
            map.insert("body".to_string(), decode_body(&parts.headers, &body)?);
            map.insert("query".to_string(), decode_query(parts.uri.query())?);
            map.insert(
                "params".to_string(),
                parts.extensions.get::<PathParams>().map(PathParams::to_value).unwrap_or_else(|| Value::Object(Map::new())),
            );
            map.insert("headers".to_string(), headers_value(&parts.headers));
            Value::Object(map)
        } else {
            decode_body(&parts.headers, &body)?
        };

        let mut ctx = Context::new();
        ctx.insert("method", parts.method.as_str());
        ctx.insert("path", parts.uri.path());

        let result = self.handler.execute_with(input, ctx).await?;

        Ok(into_response(result))
    }
}

impl From<Handler> for HttpAdapter {
    fn from(handler: Handler) -> Self {
        Self::new(handler)
    }
}

enum BodyKind {
    Json,
    Form,
    Text,
}

fn content_kind(headers: &HeaderMap) -> BodyKind {
    let Some(mime) = headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse::<mime::Mime>().ok())
    else {
        // no (or unparseable) content type: JSON is the lingua franca here
        return BodyKind::Json;
    };

    if mime.type_() == mime::APPLICATION && mime.subtype() == mime::JSON {
        BodyKind::Json
    } else if mime.type_() == mime::APPLICATION && mime.subtype() == mime::WWW_FORM_URLENCODED {
        BodyKind::Form
    } else {
        BodyKind::Text
    }
}

fn decode_body(headers: &HeaderMap, body: &Bytes) -> Result<Value, PipelineError> {
    if body.is_empty() {
        return Ok(Value::Null);
    }

    match content_kind(headers) {
        BodyKind::Json => {
            serde_json::from_slice(body).map_err(|err| PipelineError::other(ExtractError::invalid_body(err)))
        }
        BodyKind::Form => {
            let pairs: Vec<(String, String)> = serde_urlencoded::from_bytes(body)
                .map_err(|err| PipelineError::other(ExtractError::invalid_body(err)))?;
            Ok(Value::Object(pairs.into_iter().map(|(name, value)| (name, Value::String(value))).collect()))
        }
        BodyKind::Text => match std::str::from_utf8(body) {
            Ok(text) => Ok(Value::String(text.to_string())),
            Err(err) => Err(PipelineError::other(ExtractError::invalid_body(err))),
        },
    }
}

fn decode_query(query: Option<&str>) -> Result<Value, PipelineError> {
    let Some(query) = query else {
        return Ok(Value::Object(Map::new()));
    };
    let pairs: std::collections::HashMap<String, String> =
        serde_qs::from_str(query).map_err(|err| PipelineError::other(ExtractError::invalid_query(err)))?;
    Ok(Value::Object(pairs.into_iter().map(|(name, value)| (name, Value::String(value))).collect()))
}

fn headers_value(headers: &HeaderMap) -> Value {
    let mut map = Map::new();
    for (name, value) in headers {
        let text = String::from_utf8_lossy(value.as_bytes()).into_owned();
        map.insert(name.as_str().to_string(), Value::String(text));
    }
    Value::Object(map)
}

fn into_response(result: Value) -> Response<Bytes> {
    match ResponseEnvelope::from_value(&result) {
        Some(envelope) => {
            let mut builder = Response::builder()
                .status(envelope.status)
                .header(CONTENT_TYPE, mime::APPLICATION_JSON.as_ref());
            for (name, value) in &envelope.headers {
                match (HeaderName::try_from(name.as_str()), HeaderValue::try_from(value.as_str())) {
                    (Ok(name), Ok(value)) => builder = builder.header(name, value),
                    _ => warn!(header = name.as_str(), "skipping invalid response header"),
                }
            }
            builder.body(Bytes::from(envelope.body.to_string())).unwrap()
        }
        None => Response::builder()
            .status(StatusCode::OK)
            .header(CONTENT_TYPE, mime::APPLICATION_JSON.as_ref())
            .body(Bytes::from(result.to_string()))
            .unwrap(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use micro_handler::handler_fn;
    use serde_json::json;

    fn echo_handler() -> Handler {
        async fn echo(input: Value, _ctx: Context) -> Result<Value, PipelineError> {
            Ok(input)
        }
        Handler::new().handle(handler_fn(echo))
    }

    fn json_request(uri: &str, body: Value) -> Request<Bytes> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(CONTENT_TYPE, "application/json")
            .body(Bytes::from(body.to_string()))
            .unwrap()
    }

    fn parse_body(response: &Response<Bytes>) -> Value {
        serde_json::from_slice(response.body()).unwrap()
    }

    #[tokio::test]
    async fn envelope_results_control_the_response() {
        async fn created(_input: Value, _ctx: Context) -> Result<Value, PipelineError> {
            Ok(json!({"status": 201, "body": {"id": 1}, "headers": {"X-Id": "1"}}))
        }

        let adapter = HttpAdapter::new(Handler::new().handle(handler_fn(created)));
        let response = adapter.call(json_request("/things", json!({}))).await.unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(response.headers().get("X-Id").unwrap(), "1");
        assert_eq!(parse_body(&response), json!({"id": 1}));
    }

    #[tokio::test]
    async fn plain_results_become_the_whole_body() {
        async fn plain(_input: Value, _ctx: Context) -> Result<Value, PipelineError> {
            Ok(json!({"id": 1}))
        }

        let adapter = HttpAdapter::new(Handler::new().handle(handler_fn(plain)));
        let response = adapter.call(json_request("/things", json!({}))).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(parse_body(&response), json!({"id": 1}));
    }

    #[tokio::test]
    async fn multi_part_handlers_get_the_request_split_into_parts() {
        let handler = echo_handler().input(json!({
            "body": {"type": "object", "required": ["name"], "properties": {"name": {"type": "string"}}},
            "query": {"page": "required|string"},
            "params": {"id": "required|string"}
        }));
        let adapter = HttpAdapter::new(handler);

        let mut params = PathParams::new();
        params.insert("id", "7");

        let request = Request::builder()
            .method("POST")
            .uri("/users/7?page=2")
            .header(CONTENT_TYPE, "application/json")
            .extension(params)
            .body(Bytes::from(json!({"name": "ada"}).to_string()))
            .unwrap();

        let response = adapter.call(request).await.unwrap();

        // only schema-declared parts survive validation
        assert_eq!(
            parse_body(&response),
            json!({
                "body": {"name": "ada"},
                "query": {"page": "2"},
                "params": {"id": "7"}
            })
        );
    }

    #[tokio::test]
    async fn single_input_handlers_get_the_decoded_body() {
        let adapter = HttpAdapter::new(echo_handler());
        let response = adapter.call(json_request("/echo?ignored=1", json!({"n": 5}))).await.unwrap();

        assert_eq!(parse_body(&response), json!({"n": 5}));
    }

    #[tokio::test]
    async fn form_bodies_decode_to_objects() {
        let adapter = HttpAdapter::new(echo_handler());

        let request = Request::builder()
            .method("POST")
            .uri("/form")
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Bytes::from("name=ada&zip=10117"))
            .unwrap();

        let response = adapter.call(request).await.unwrap();
        assert_eq!(parse_body(&response), json!({"name": "ada", "zip": "10117"}));
    }

    #[tokio::test]
    async fn empty_bodies_are_null_input() {
        let adapter = HttpAdapter::new(echo_handler());

        let request = Request::builder().method("GET").uri("/ping").body(Bytes::new()).unwrap();
        let response = adapter.call(request).await.unwrap();

        assert_eq!(parse_body(&response), Value::Null);
    }

    #[tokio::test]
    async fn headers_part_carries_the_request_headers() {
        let handler = echo_handler().input(json!({"headers": {"x-tenant": "required|string"}}));
        let adapter = HttpAdapter::new(handler);

        let request = Request::builder()
            .method("GET")
            .uri("/tenants")
            .header("x-tenant", "acme")
            .body(Bytes::new())
            .unwrap();

        let response = adapter.call(request).await.unwrap();
        assert_eq!(parse_body(&response), json!({"headers": {"x-tenant": "acme"}}));
    }

    #[tokio::test]
    async fn pipeline_errors_pass_to_the_caller_untouched() {
        // no handle() stage attached
        let adapter = HttpAdapter::new(Handler::new());

        let err = adapter.call(json_request("/none", json!({}))).await.unwrap_err();
        assert!(matches!(err, PipelineError::MissingHandler));
    }

    #[tokio::test]
    async fn malformed_json_bodies_are_extraction_errors() {
        let adapter = HttpAdapter::new(echo_handler());

        let request = Request::builder()
            .method("POST")
            .uri("/broken")
            .header(CONTENT_TYPE, "application/json")
            .body(Bytes::from("{not json"))
            .unwrap();

        let err = adapter.call(request).await.unwrap_err();
        assert!(matches!(err, PipelineError::Other(_)));
    }
}
