use crate::error::Result;
use crate::negotiation::{MediaType, OutputFormatter};
use serde_json::Value;

/// JSON output via serde_json
pub struct JsonFormatter {
    media_types: [&'static str; 3],
}

impl Default for JsonFormatter {
    fn default() -> Self {
        Self {
            media_types: [
                MediaType::ApplicationJson.into(),
                MediaType::TextJson.into(),
                MediaType::ProblemJson.into(),
            ],
        }
    }
}

impl OutputFormatter for JsonFormatter {
    fn media_types(&self) -> &[&'static str] {
        &self.media_types
    }

    fn format(&self, value: &Value) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(value)?)
    }
}

/// `text/plain` output.
///
/// Strings are written as-is, objects contribute their `message` field and
/// anything else falls back to its JSON text.
pub struct PlainTextFormatter {
    media_types: [&'static str; 1],
}

impl Default for PlainTextFormatter {
    fn default() -> Self {
        Self {
            media_types: [MediaType::TextPlain.into()],
        }
    }
}

impl OutputFormatter for PlainTextFormatter {
    fn media_types(&self) -> &[&'static str] {
        &self.media_types
    }

    fn format(&self, value: &Value) -> Result<Vec<u8>> {
        let text = match value {
            Value::String(text) => text.clone(),
            Value::Object(fields) => match fields.get("message") {
                Some(Value::String(message)) => message.clone(),
                _ => value.to_string(),
            },
            other => other.to_string(),
        };
        Ok(text.into_bytes())
    }
}
