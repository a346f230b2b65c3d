use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Prompt used by [`AnalysisConfiguration::default`].
pub const DEFAULT_PROMPT: &str = "Describe this image in detail.";

/// Temperature used by [`AnalysisConfiguration::default`].
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

const THUMBNAIL_PROMPT: &str = r#"Caption this thumbnail image. Respond with a single JSON object and nothing else, using exactly these fields:
{
  "caption": "one short sentence describing the image",
  "subject": "the main subject in a few words",
  "tags": ["3 to 8 lowercase keywords"]
}"#;

const DETAILED_PROMPT: &str = r#"Analyze this image exhaustively. Respond with a single JSON object and nothing else, using exactly these fields:
{
  "description": "a thorough multi-sentence description of the whole image",
  "subjects": ["every notable person, animal or object"],
  "colors": ["the dominant colors"],
  "composition": "framing, perspective and arrangement of elements",
  "lighting": "light sources, direction and quality",
  "mood": "the overall atmosphere",
  "text_content": "any visible text transcribed verbatim, or an empty string",
  "tags": ["descriptive lowercase keywords"]
}"#;

/// Map a temperature into `[0.0, 1.0]`, treating NaN as 0.
pub(crate) fn clamp_temperature(temp: f32) -> f32 {
    if temp.is_nan() { 0.0 } else { temp.clamp(0.0, 1.0) }
}

/// Prompt and generation parameters for one analysis.
///
/// `max_tokens` is always at least 1 and `temperature` stays within `[0, 1]`. The setters
/// clamp out-of-range values, and the request builder clamps again for configurations built
/// as struct literals or deserialized. `additional_parameters` are merged into the top level
/// of the provider request (for example `safetySettings` or `systemInstruction`).
///
/// # Examples
///
/// ```
/// use image_analyzer::AnalysisConfiguration;
/// use serde_json::json;
///
/// let config = AnalysisConfiguration::new("List every animal in this picture.")
///     .max_tokens(512)
///     .temperature(0.2)
///     .additional_parameter("safetySettings", json!([]));
///
/// assert_eq!(config.max_tokens, Some(512));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfiguration {
    pub prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_parameters: Option<Map<String, Value>>,
}

impl Default for AnalysisConfiguration {
    fn default() -> Self {
        Self {
            prompt: DEFAULT_PROMPT.to_string(),
            max_tokens: None,
            temperature: Some(DEFAULT_TEMPERATURE),
            additional_parameters: None,
        }
    }
}

impl AnalysisConfiguration {
    /// A configuration with only a prompt: no temperature, no token cap.
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            max_tokens: None,
            temperature: None,
            additional_parameters: None,
        }
    }

    /// Short structured captions for thumbnail-sized images.
    pub fn thumbnail() -> Self {
        Self::new(THUMBNAIL_PROMPT).max_tokens(300).temperature(0.4)
    }

    /// Exhaustive descriptive analysis with a larger field set.
    pub fn detailed() -> Self {
        Self::new(DETAILED_PROMPT).max_tokens(2048).temperature(0.7)
    }

    /// Replace the instruction sent alongside the image
    pub fn prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    /// Set the output token limit
    pub fn max_tokens(mut self, max: u32) -> Self {
        // Ensure max_tokens is at least 1 to avoid API errors
        self.max_tokens = Some(max.max(1));
        self
    }

    /// Set the temperature (0.0 to 1.0, lower = more deterministic)
    pub fn temperature(mut self, temp: f32) -> Self {
        self.temperature = Some(clamp_temperature(temp));
        self
    }

    /// Leave the temperature to the provider's default
    pub fn without_temperature(mut self) -> Self {
        self.temperature = None;
        self
    }

    /// Add one provider-specific field to the request body
    pub fn additional_parameter(mut self, key: impl Into<String>, value: Value) -> Self {
        self.additional_parameters
            .get_or_insert_with(Map::new)
            .insert(key.into(), value);
        self
    }

    /// Replace all provider-specific request fields
    pub fn additional_parameters(mut self, parameters: Map<String, Value>) -> Self {
        self.additional_parameters = Some(parameters);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_configuration() {
        let config = AnalysisConfiguration::default();
        assert_eq!(config.prompt, DEFAULT_PROMPT);
        assert_eq!(config.temperature, Some(0.7));
        assert_eq!(config.max_tokens, None);
        assert_eq!(config.additional_parameters, None);
    }

    #[test]
    fn test_setters_clamp() {
        let config = AnalysisConfiguration::new("x").max_tokens(0).temperature(1.5);
        assert_eq!(config.max_tokens, Some(1));
        assert_eq!(config.temperature, Some(1.0));

        let config = AnalysisConfiguration::new("x").temperature(-0.3);
        assert_eq!(config.temperature, Some(0.0));

        let config = AnalysisConfiguration::new("x").temperature(f32::NAN);
        assert_eq!(config.temperature, Some(0.0));
    }

    #[test]
    fn test_additional_parameters_accumulate() {
        let config = AnalysisConfiguration::new("x")
            .additional_parameter("a", json!(1))
            .additional_parameter("b", json!({"nested": [true]}));
        let params = config.additional_parameters.expect("parameters should be set");
        assert_eq!(params.len(), 2);
        assert_eq!(params["b"], json!({"nested": [true]}));
    }

    #[test]
    fn test_presets_differ_in_budget() {
        let thumbnail = AnalysisConfiguration::thumbnail();
        let detailed = AnalysisConfiguration::detailed();
        assert!(thumbnail.max_tokens < detailed.max_tokens);
        assert!(thumbnail.prompt.contains("\"caption\""));
        assert!(detailed.prompt.contains("\"composition\""));
    }
}
