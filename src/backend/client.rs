use async_trait::async_trait;
use std::path::PathBuf;

use crate::backend::media::ImageInput;
use crate::error::Result;
use crate::model::{AnalysisConfiguration, AnalysisResult};

/// ImageAnalyzer defines the interface for all image analysis backends.
///
/// Implementors provide a `name` and [`analyze`](ImageAnalyzer::analyze); the
/// default-configuration entry point comes for free, and [`AnalyzerExt`] layers the
/// path/URL/bytes shortcuts on top of every implementor.
///
/// The library ships [`GeminiAnalyzer`](crate::GeminiAnalyzer) for Google's Gemini models.
///
/// # Examples
///
/// ```no_run
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// use image_analyzer::{AnalysisConfiguration, GeminiAnalyzer, ImageAnalyzer, ImageInput};
///
/// let analyzer = GeminiAnalyzer::new("your-gemini-api-key")?;
///
/// let result = analyzer
///     .analyze(
///         ImageInput::from_url("https://www.rust-lang.org/logos/rust-logo-512x512.png"),
///         &AnalysisConfiguration::detailed(),
///     )
///     .await?;
///
/// println!("{}", result.raw_response);
/// # Ok(())
/// # }
/// ```
#[async_trait]
pub trait ImageAnalyzer: Send + Sync {
    /// Human-readable analyzer name, recorded in result metadata.
    fn name(&self) -> &str;

    /// Analyze an image with an explicit configuration.
    async fn analyze(
        &self,
        input: ImageInput,
        config: &AnalysisConfiguration,
    ) -> Result<AnalysisResult>;

    /// Analyze an image with [`AnalysisConfiguration::default`].
    async fn analyze_default(&self, input: ImageInput) -> Result<AnalysisResult> {
        self.analyze(input, &AnalysisConfiguration::default()).await
    }
}

/// Input-type shortcuts available on every [`ImageAnalyzer`].
///
/// Each method only builds the matching [`ImageInput`] and forwards to
/// [`ImageAnalyzer::analyze`].
#[async_trait]
pub trait AnalyzerExt: ImageAnalyzer {
    async fn analyze_file<P>(&self, path: P, config: &AnalysisConfiguration) -> Result<AnalysisResult>
    where
        P: Into<PathBuf> + Send,
    {
        self.analyze(ImageInput::from_path(path), config).await
    }

    async fn analyze_url<U>(&self, url: U, config: &AnalysisConfiguration) -> Result<AnalysisResult>
    where
        U: Into<String> + Send,
    {
        self.analyze(ImageInput::from_url(url), config).await
    }

    async fn analyze_bytes<D, M>(
        &self,
        data: D,
        mime_type: M,
        config: &AnalysisConfiguration,
    ) -> Result<AnalysisResult>
    where
        D: Into<Vec<u8>> + Send,
        M: Into<String> + Send,
    {
        self.analyze(ImageInput::from_bytes(data, mime_type), config)
            .await
    }
}

impl<A: ImageAnalyzer + ?Sized> AnalyzerExt for A {}
