use serde_json::{Map, Value};
use tracing::{debug, trace};

/// Strip markdown fences from a model response, leaving what should be the JSON text.
///
/// Handles providers that double-escape quotes inside fenced output (`\"` becomes `"`),
/// a leading ```` ```json ```` or bare ```` ``` ```` fence and a trailing ```` ``` ```` fence.
pub fn strip_json_fences(content: &str) -> String {
    let unescaped = content.trim().replace("\\\"", "\"");
    let mut text = unescaped.as_str();

    if let Some(rest) = text.strip_prefix("```json") {
        text = rest;
    } else if let Some(rest) = text.strip_prefix("```") {
        text = rest;
    }
    if let Some(rest) = text.strip_suffix("```") {
        text = rest;
    }

    text.trim().to_string()
}

/// Best-effort recovery of a JSON object embedded in a model response.
///
/// Returns `None` when the text is not a JSON object once fences are stripped. Arrays and
/// scalars at the top level also yield `None`. This never fails: the raw text stays usable.
///
/// ```
/// use image_analyzer::extract_structured_data;
///
/// let text = "```json\n{\"description\": \"A cat\"}\n```";
/// let data = extract_structured_data(text).unwrap();
/// assert_eq!(data["description"], "A cat");
///
/// assert!(extract_structured_data("Just a cat on a sofa.").is_none());
/// ```
pub fn extract_structured_data(content: &str) -> Option<Map<String, Value>> {
    let json_content = strip_json_fences(content);
    trace!(json = %json_content, "Attempting to parse response as JSON");

    match serde_json::from_str::<Value>(&json_content) {
        Ok(Value::Object(map)) => {
            debug!(fields = map.len(), "Recovered structured data from response");
            Some(map)
        }
        Ok(other) => {
            debug!(kind = json_kind(&other), "Response JSON is not an object");
            None
        }
        Err(e) => {
            debug!(error = %e, "Response text is not JSON");
            None
        }
    }
}

/// The `error.message` string of a provider error envelope, if the body carries one.
pub fn provider_error_message(body: &Value) -> Option<&str> {
    body.get("error")
        .and_then(|error| error.get("message"))
        .and_then(Value::as_str)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
