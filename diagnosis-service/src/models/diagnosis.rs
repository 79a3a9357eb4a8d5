//! Inbound diagnosis request.
//!
//! Every field is optional and untyped: browsers send numbers for the year
//! and mileage, strings for everything else, and frequently omit fields.
//! Nothing is rejected. Absent fields render as [`MISSING_FIELD`] and an
//! explicit `null` renders as [`NULL_FIELD`], so the two stay distinguishable
//! in the prompt.

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::borrow::Cow;

/// Token substituted for fields absent from the request body.
pub const MISSING_FIELD: &str = "undefined";

/// Token substituted for fields explicitly sent as `null`.
pub const NULL_FIELD: &str = "null";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DiagnosisRequest {
    #[serde(rename = "REG", default, deserialize_with = "present")]
    pub registration: Option<Value>,
    #[serde(rename = "MAKE", default, deserialize_with = "present")]
    pub make: Option<Value>,
    #[serde(rename = "MODEL", default, deserialize_with = "present")]
    pub model: Option<Value>,
    #[serde(rename = "YEAR", default, deserialize_with = "present")]
    pub year: Option<Value>,
    #[serde(rename = "FUEL", default, deserialize_with = "present")]
    pub fuel_type: Option<Value>,
    #[serde(rename = "TRANSMISSION", default, deserialize_with = "present")]
    pub transmission: Option<Value>,
    #[serde(rename = "MILEAGE", default, deserialize_with = "present")]
    pub mileage: Option<Value>,
    #[serde(rename = "SYMPTOM", default, deserialize_with = "present")]
    pub symptom_or_fault_code: Option<Value>,
    #[serde(rename = "RECENT_WORK", default, deserialize_with = "present")]
    pub recent_work: Option<Value>,
}

impl DiagnosisRequest {
    /// Parse a request body.
    ///
    /// Non-JSON content types, empty bodies and JSON values other than objects
    /// all yield an empty request. Only syntactically broken JSON is an error.
    pub fn from_body(content_type: Option<&str>, body: &[u8]) -> Result<Self, serde_json::Error> {
        if !content_type.is_some_and(is_json_content_type) {
            return Ok(Self::default());
        }
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }

        match serde_json::from_slice::<Value>(body)? {
            value @ Value::Object(_) => serde_json::from_value(value),
            _ => Ok(Self::default()),
        }
    }
}

/// Keep an explicit `null` as `Some(Value::Null)`; only absence maps to `None`.
fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

fn is_json_content_type(content_type: &str) -> bool {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    mime == "application/json" || mime.ends_with("+json")
}

/// Render one request field for interpolation into the prompt.
pub fn render_field(value: Option<&Value>) -> Cow<'_, str> {
    match value {
        None => Cow::Borrowed(MISSING_FIELD),
        Some(Value::Null) => Cow::Borrowed(NULL_FIELD),
        Some(Value::String(s)) => Cow::Borrowed(s.as_str()),
        Some(other) => Cow::Owned(other.to_string()),
    }
}
