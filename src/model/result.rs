use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::backend::TokenUsage;
use crate::error::{AnalysisError, Result};

/// Facts about a completed analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisMetadata {
    /// MIME type sent with the image
    pub mime_type: String,
    /// Byte length of the image data sent to the provider
    pub image_size_bytes: usize,
    /// Name of the analyzer that produced the result
    pub analyzer_name: String,
    /// When the metadata was assembled
    pub timestamp_utc: DateTime<Utc>,
    /// Wall-clock seconds from the start of `analyze` to result assembly
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processing_time_seconds: Option<f64>,
    /// Provider model id, when the analyzer knows it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Token counts, when the provider reports them
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<TokenUsage>,
}

impl AnalysisMetadata {
    /// Stamp the metadata with the current UTC time.
    pub fn new(
        mime_type: impl Into<String>,
        image_size_bytes: usize,
        analyzer_name: impl Into<String>,
        processing_time_seconds: Option<f64>,
    ) -> Self {
        Self {
            mime_type: mime_type.into(),
            image_size_bytes,
            analyzer_name: analyzer_name.into(),
            timestamp_utc: Utc::now(),
            processing_time_seconds: processing_time_seconds.map(|s| s.max(0.0)),
            model: None,
            usage: None,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_usage(mut self, usage: Option<TokenUsage>) -> Self {
        self.usage = usage;
        self
    }
}

/// The description returned by the provider, plus any JSON object recovered from it.
///
/// # Examples
///
/// ```no_run
/// use image_analyzer::{AnalysisConfiguration, AnalyzerExt, GeminiAnalyzer};
/// use serde::Deserialize;
///
/// #[derive(Deserialize)]
/// struct Caption {
///     caption: String,
///     tags: Vec<String>,
/// }
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let analyzer = GeminiAnalyzer::from_env()?;
/// let result = analyzer
///     .analyze_file("thumb.jpg", &AnalysisConfiguration::thumbnail())
///     .await?;
///
/// println!("Raw: {}", result.raw_response);
/// if result.has_structured_data() {
///     let caption: Caption = result.parse_as()?;
///     println!("{} {:?}", caption.caption, caption.tags);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub raw_response: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parsed_data: Option<Map<String, Value>>,
    pub metadata: AnalysisMetadata,
}

impl AnalysisResult {
    pub fn has_structured_data(&self) -> bool {
        self.parsed_data.is_some()
    }

    /// Look up a top-level field of the structured data.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.parsed_data.as_ref().and_then(|data| data.get(name))
    }

    /// Deserialize the structured data into a caller-defined type.
    pub fn parse_as<T: DeserializeOwned>(&self) -> Result<T> {
        let data = self.parsed_data.as_ref().ok_or_else(|| {
            AnalysisError::ParsingError("response contained no structured data".to_string())
        })?;
        serde_json::from_value(Value::Object(data.clone()))
            .map_err(|e| AnalysisError::ParsingError(format!("structured data mismatch: {}", e)))
    }
}
