use serde::{Deserialize, Serialize};

/// Token usage reported by the provider for one analysis.
///
/// # Example
///
/// ```no_run
/// use image_analyzer::{AnalyzerExt, GeminiAnalyzer};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let analyzer = GeminiAnalyzer::from_env()?;
/// let result = analyzer.analyze_file("cat.png", &Default::default()).await?;
///
/// if let Some(usage) = &result.metadata.usage {
///     println!("Model: {}", usage.model);
///     println!("Input tokens: {}", usage.input_tokens);
///     println!("Output tokens: {}", usage.output_tokens);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    /// The model used for this request
    pub model: String,
    /// Number of tokens in the prompt, image included
    pub input_tokens: u64,
    /// Number of tokens in the generated text
    pub output_tokens: u64,
}

impl TokenUsage {
    /// Create a new TokenUsage instance
    pub fn new(model: impl Into<String>, input_tokens: u64, output_tokens: u64) -> Self {
        Self {
            model: model.into(),
            input_tokens,
            output_tokens,
        }
    }

    /// Total tokens used (input + output)
    pub fn total_tokens(&self) -> u64 {
        self.input_tokens + self.output_tokens
    }
}
