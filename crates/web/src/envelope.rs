//! Recognition of the response envelope shape.
//!
//! A handler may return `{status, body, headers?}` to take control of the
//! platform response; anything else is sent as the whole response body with
//! the default success status.

use http::StatusCode;
use serde_json::Value;

/// A structurally recognized `{status: number, body: any, headers?: map}`
/// handler result.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseEnvelope {
    pub status: StatusCode,
    pub body: Value,
    pub headers: Vec<(String, String)>,
}

impl ResponseEnvelope {
    /// Returns the envelope iff `value` matches the recognized shape: an
    /// object with a numeric, valid `status` and a `body` key; `headers`,
    /// when present, must be an object. Anything else is "not an
    /// envelope", never an error.
    pub fn from_value(value: &Value) -> Option<Self> {
        let map = value.as_object()?;

        let status = map.get("status")?.as_u64()?;
        let status = StatusCode::from_u16(u16::try_from(status).ok()?).ok()?;

        let body = map.get("body")?.clone();

        let headers = match map.get("headers") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Object(entries)) => entries
                .iter()
                .map(|(name, value)| (name.clone(), header_text(value)))
                .collect(),
            Some(_) => return None,
        };

        Some(Self { status, body, headers })
    }
}

/// Header values are usually strings; anything else is rendered as its
/// JSON text.
fn header_text(value: &Value) -> String {
    match value.as_str() {
        Some(s) => s.to_string(),
        None => value.to_string(),
    }
}
