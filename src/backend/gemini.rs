use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, instrument, trace};

use crate::backend::media::{ImageInput, LoadedImage, load_image};
use crate::backend::transport::{HttpRequest, Transport};
use crate::backend::usage::TokenUsage;
use crate::backend::utils::{extract_structured_data, provider_error_message};
use crate::backend::ImageAnalyzer;
use crate::error::{AnalysisError, Result};
use crate::model::config::clamp_temperature;
use crate::model::{AnalysisConfiguration, AnalysisMetadata, AnalysisResult};

/// Default base URL of the Gemini API.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

const ANALYZER_NAME: &str = "Gemini";

/// Gemini models that accept image input
///
/// For the latest available models and their identifiers, check the
/// [Google AI Models Documentation](https://ai.google.dev/models).
///
/// # Using Custom Models
///
/// ```rust
/// use image_analyzer::GeminiModel;
/// use std::str::FromStr;
///
/// let model = GeminiModel::Custom("gemini-custom".to_string());
/// let model = GeminiModel::from_str("gemini-custom").unwrap();
/// let model = GeminiModel::from_string("gemini-2.5-flash");
/// assert_eq!(model, GeminiModel::Gemini25Flash);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Model {
    /// Gemini 2.5 Pro (production Pro model)
    Gemini25Pro,
    /// Gemini 2.5 Flash (production Flash model, best price/performance)
    Gemini25Flash,
    /// Gemini 2.5 Flash Lite (smaller, faster variant)
    Gemini25FlashLite,
    /// Gemini 2.0 Flash (stable 2.0 Flash model)
    #[default]
    Gemini20Flash,
    /// Gemini 2.0 Flash Lite (smaller 2.0 Flash variant)
    Gemini20FlashLite,
    /// Gemini 1.5 Pro
    Gemini15Pro,
    /// Gemini 1.5 Flash
    Gemini15Flash,
    /// Custom model name (for new models or Gemini-compatible endpoints)
    Custom(String),
}

impl Model {
    pub fn as_str(&self) -> &str {
        match self {
            Model::Gemini25Pro => "gemini-2.5-pro",
            Model::Gemini25Flash => "gemini-2.5-flash",
            Model::Gemini25FlashLite => "gemini-2.5-flash-lite",
            Model::Gemini20Flash => "gemini-2.0-flash",
            Model::Gemini20FlashLite => "gemini-2.0-flash-lite",
            Model::Gemini15Pro => "gemini-1.5-pro",
            Model::Gemini15Flash => "gemini-1.5-flash",
            Model::Custom(name) => name,
        }
    }

    /// Create a model from a string. This is a convenience method that always succeeds.
    ///
    /// If the string matches a known model variant, it returns that variant.
    /// Otherwise, it returns `Custom(name)`.
    pub fn from_string(name: impl Into<String>) -> Self {
        let name = name.into();
        match name.as_str() {
            "gemini-2.5-pro" => Model::Gemini25Pro,
            "gemini-2.5-flash" => Model::Gemini25Flash,
            "gemini-2.5-flash-lite" => Model::Gemini25FlashLite,
            "gemini-2.0-flash" => Model::Gemini20Flash,
            "gemini-2.0-flash-lite" => Model::Gemini20FlashLite,
            "gemini-1.5-pro" => Model::Gemini15Pro,
            "gemini-1.5-flash" => Model::Gemini15Flash,
            _ => Model::Custom(name),
        }
    }
}

impl FromStr for Model {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Model::from_string(s))
    }
}

impl From<&str> for Model {
    fn from(s: &str) -> Self {
        Model::from_string(s)
    }
}

impl From<String> for Model {
    fn from(s: String) -> Self {
        Model::from_string(s)
    }
}

/// Configuration for the Gemini analyzer
#[derive(Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: Model,
    /// Custom base URL for Gemini-compatible APIs
    /// Defaults to "https://generativelanguage.googleapis.com/v1beta" if not set
    pub base_url: Option<String>,
}

impl std::fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// Image analyzer backed by the Gemini `generateContent` endpoint.
///
/// The analyzer holds no per-call state: one instance can serve any number of concurrent
/// [`analyze`](ImageAnalyzer::analyze) calls.
///
/// # Examples
///
/// ```no_run
/// use image_analyzer::{AnalysisConfiguration, AnalyzerExt, GeminiAnalyzer, GeminiModel};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let analyzer = GeminiAnalyzer::new("your-gemini-api-key")?.model(GeminiModel::Gemini25Flash);
/// let result = analyzer
///     .analyze_file("sunset.jpg", &AnalysisConfiguration::default())
///     .await?;
/// println!("{}", result.raw_response);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct GeminiAnalyzer {
    config: GeminiConfig,
    transport: Arc<dyn Transport>,
}

impl std::fmt::Debug for GeminiAnalyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiAnalyzer")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

// Gemini API request and response structures
#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig", skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
    #[serde(flatten)]
    additional: Map<String, Value>,
}

#[derive(Debug, Serialize)]
struct Content {
    role: &'static str,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part {
    Text { text: String },
    InlineData { inline_data: InlineData },
}

#[derive(Debug, Serialize)]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    usage_metadata: Option<UsageMetadata>,
    #[serde(default)]
    model_version: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u64,
    #[serde(default)]
    candidates_token_count: u64,
}

impl GenerateContentResponse {
    fn from_json(body: &Value) -> Result<Self> {
        Self::deserialize(body).map_err(|e| {
            error!(error = %e, "Gemini response does not match the expected envelope");
            AnalysisError::ParsingError(format!("unexpected response shape: {}", e))
        })
    }

    /// Text of the first part of the first candidate.
    fn text(&self) -> Result<String> {
        let candidate = self.candidates.first().ok_or_else(|| {
            error!("Gemini API returned empty candidates array");
            AnalysisError::ParsingError("no candidates in response".to_string())
        })?;
        trace!(finish_reason = ?candidate.finish_reason, "Completion finish reason");

        match candidate
            .content
            .as_ref()
            .and_then(|content| content.parts.first())
            .and_then(|part| part.text.as_deref())
        {
            Some(text) if !text.is_empty() => Ok(text.to_string()),
            _ => {
                error!(finish_reason = ?candidate.finish_reason, "No text content in Gemini response");
                Err(AnalysisError::ParsingError(
                    "no text content in first candidate".to_string(),
                ))
            }
        }
    }

    fn usage(&self, fallback_model: &str) -> Option<TokenUsage> {
        self.usage_metadata.as_ref().map(|usage| {
            TokenUsage::new(
                self.model_version.as_deref().unwrap_or(fallback_model),
                usage.prompt_token_count,
                usage.candidates_token_count,
            )
        })
    }
}

/// Extract the analysis text from a Gemini `generateContent` response body.
///
/// The text is read from `candidates[0].content.parts[0].text`. Any other shape, or an
/// empty text, is a [`AnalysisError::ParsingError`].
///
/// ```
/// use image_analyzer::extract_text;
/// use serde_json::json;
///
/// let body = json!({"candidates": [{"content": {"parts": [{"text": "A red kite"}]}}]});
/// assert_eq!(extract_text(&body).unwrap(), "A red kite");
/// assert!(extract_text(&json!({"candidates": []})).is_err());
/// ```
pub fn extract_text(body: &Value) -> Result<String> {
    GenerateContentResponse::from_json(body)?.text()
}

impl GeminiAnalyzer {
    /// Create an analyzer that talks to Gemini over `reqwest`.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use image_analyzer::GeminiAnalyzer;
    /// # fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let analyzer = GeminiAnalyzer::new("your-gemini-api-key")?;
    /// # Ok(())
    /// # }
    /// ```
    #[cfg(feature = "reqwest-transport")]
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_transport(api_key, crate::backend::ReqwestTransport::new())
    }

    /// Create an analyzer by reading the API key from the `GEMINI_API_KEY` environment variable.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::AuthError`] if `GEMINI_API_KEY` is not set.
    #[cfg(feature = "reqwest-transport")]
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("GEMINI_API_KEY").map_err(|_| {
            AnalysisError::AuthError("GEMINI_API_KEY environment variable is not set".to_string())
        })?;
        Self::new(api_key)
    }

    /// Create an analyzer that sends every request through `transport`.
    #[instrument(name = "gemini_analyzer_new", skip(api_key, transport))]
    pub fn with_transport(
        api_key: impl Into<String>,
        transport: impl Transport + 'static,
    ) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(AnalysisError::AuthError(
                "API key cannot be empty".to_string(),
            ));
        }

        let config = GeminiConfig {
            api_key,
            model: Model::default(),
            base_url: None,
        };

        info!(model = %config.model.as_str(), "Created Gemini analyzer");

        Ok(Self {
            config,
            transport: Arc::new(transport),
        })
    }

    /// Set the model to use
    #[instrument(skip(self, model))]
    pub fn model(mut self, model: impl Into<Model>) -> Self {
        let model = model.into();
        debug!(
            previous_model = ?self.config.model,
            new_model = ?model,
            "Setting Gemini model"
        );
        self.config.model = model;
        self
    }

    /// Set a custom base URL for Gemini-compatible APIs.
    ///
    /// # Arguments
    ///
    /// * `base_url` - Base URL without trailing slash (e.g., "http://localhost:1234/v1beta")
    #[instrument(skip(self, base_url))]
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        let base_url_str = base_url.into();
        debug!(
            previous_base_url = ?self.config.base_url,
            new_base_url = %base_url_str,
            "Setting custom base URL"
        );
        self.config.base_url = Some(base_url_str);
        self
    }

    /// Replace the transport.
    pub fn transport(mut self, transport: impl Transport + 'static) -> Self {
        self.transport = Arc::new(transport);
        self
    }

    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }

    /// The `generateContent` URL, without the credential.
    pub fn endpoint(&self) -> String {
        let base_url = self
            .config
            .base_url
            .as_deref()
            .unwrap_or(DEFAULT_BASE_URL)
            .trim_end_matches('/');
        format!(
            "{}/models/{}:generateContent",
            base_url,
            self.config.model.as_str()
        )
    }

    fn build_request(image: &LoadedImage, config: &AnalysisConfiguration) -> GenerateContentRequest {
        let generation_config = if config.temperature.is_some() || config.max_tokens.is_some() {
            Some(GenerationConfig {
                temperature: config.temperature.map(clamp_temperature),
                max_output_tokens: config.max_tokens.map(|max| max.max(1)),
            })
        } else {
            None
        };

        let additional = config
            .additional_parameters
            .iter()
            .flatten()
            .filter(|(key, _)| key.as_str() != "contents" && key.as_str() != "generationConfig")
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        GenerateContentRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![
                    Part::Text {
                        text: config.prompt.clone(),
                    },
                    Part::InlineData {
                        inline_data: InlineData {
                            mime_type: image.mime_type.clone(),
                            data: image.to_base64(),
                        },
                    },
                ],
            }],
            generation_config,
            additional,
        }
    }

    async fn send_request(&self, request: &GenerateContentRequest) -> Result<(u16, Vec<u8>)> {
        let body = serde_json::to_vec(request).map_err(AnalysisError::unknown)?;
        let endpoint = self.endpoint();
        debug!(url = %endpoint, body_len = body.len(), "Sending request to Gemini API");

        let url = url::Url::parse_with_params(&endpoint, &[("key", self.config.api_key.as_str())])
            .map_err(|e| {
                error!(error = %e, url = %endpoint, "Invalid Gemini endpoint URL");
                AnalysisError::unknown(e)
            })?;

        let http_request =
            HttpRequest::post(url.as_str(), body).header("Content-Type", "application/json");

        let response = self.transport.send(http_request).await.map_err(|e| {
            error!(error = %e, "HTTP request to Gemini failed");
            AnalysisError::NetworkError(e)
        })?;

        if !response.is_success() {
            let message = serde_json::from_slice::<Value>(&response.body)
                .ok()
                .and_then(|body| provider_error_message(&body).map(str::to_string))
                .unwrap_or_else(|| {
                    debug!(body = %response.text(), "Error response carried no error message");
                    "Unknown API error".to_string()
                });
            error!(
                status = response.status,
                error = %message,
                "Gemini API returned error response"
            );
            return Err(AnalysisError::api(response.status, message));
        }

        Ok((response.status, response.body))
    }
}

#[async_trait]
impl ImageAnalyzer for GeminiAnalyzer {
    fn name(&self) -> &str {
        ANALYZER_NAME
    }

    #[instrument(
        name = "gemini_analyze",
        skip(self, input, config),
        fields(
            model = %self.config.model.as_str(),
            prompt_len = config.prompt.len()
        )
    )]
    async fn analyze(
        &self,
        input: ImageInput,
        config: &AnalysisConfiguration,
    ) -> Result<AnalysisResult> {
        let started = Instant::now();
        info!("Analyzing image with Gemini");

        let image = load_image(input, self.transport.as_ref()).await?;
        if image.is_empty() {
            error!("Refusing to analyze an empty image");
            return Err(AnalysisError::InvalidImageData);
        }
        debug!(bytes = image.len(), mime_type = %image.mime_type, "Loaded image");

        let request = Self::build_request(&image, config);
        let (status, body) = self.send_request(&request).await?;

        let body: Value = serde_json::from_slice(&body).map_err(|e| {
            error!(error = %e, status, "Failed to parse JSON response from Gemini API");
            AnalysisError::ParsingError(format!("invalid JSON in response: {}", e))
        })?;

        // A 2xx body can still carry an error envelope; it is reported as status 200.
        if let Some(message) = provider_error_message(&body) {
            error!(status, error = %message, "Gemini API embedded an error in a success response");
            return Err(AnalysisError::api(200, message));
        }

        let completion = GenerateContentResponse::from_json(&body)?;
        let raw_response = completion.text()?;
        debug!(content_len = raw_response.len(), "Extracted text from response");

        let parsed_data = extract_structured_data(&raw_response);

        let elapsed = started.elapsed().as_secs_f64();
        let metadata = AnalysisMetadata::new(
            image.mime_type,
            image.data.len(),
            self.name(),
            Some(elapsed),
        )
        .with_model(self.config.model.as_str())
        .with_usage(completion.usage(self.config.model.as_str()));

        info!(
            elapsed_secs = elapsed,
            structured = parsed_data.is_some(),
            "Image analysis complete"
        );

        Ok(AnalysisResult {
            raw_response,
            parsed_data,
            metadata,
        })
    }
}
