//! image-analyzer: describe images with Gemini vision models
//!
//! # Overview
//!
//! Send an image (inline bytes, a local file or a remote URL) to a generative vision API,
//! get back a natural-language description, and recover a JSON object from the response
//! when the model produced one.
//!
//! Key features:
//! - One [`ImageInput`] type for bytes, files and URLs, with MIME type inference
//! - [`GeminiAnalyzer`] for Google's Gemini `generateContent` endpoint
//! - Best-effort extraction of fenced JSON into [`AnalysisResult::parsed_data`]
//! - A pluggable [`Transport`] so requests can be stubbed in tests
//! - Ready-made [`AnalysisConfiguration`] presets for thumbnails and detailed analysis
//!
//! # Quick Start
//!
//! ```no_run
//! use image_analyzer::{AnalysisConfiguration, AnalyzerExt, GeminiAnalyzer};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let analyzer = GeminiAnalyzer::from_env()?;
//!
//!     let result = analyzer
//!         .analyze_file("sunset.jpg", &AnalysisConfiguration::detailed())
//!         .await?;
//!
//!     println!("Description: {}", result.raw_response);
//!     if let Some(colors) = result.field("colors") {
//!         println!("Colors: {}", colors);
//!     }
//!     println!("Sent {} bytes", result.metadata.image_size_bytes);
//!
//!     Ok(())
//! }
//! ```

mod backend;
mod error;
pub mod model;
#[cfg(feature = "logging")]
pub mod logging;

// Re-exports for convenience
pub use error::{AnalysisError, BoxError, Result};
pub use model::{
    AnalysisConfiguration, AnalysisMetadata, AnalysisResult, DEFAULT_PROMPT, DEFAULT_TEMPERATURE,
};

pub use backend::{
    AnalyzerExt, DEFAULT_MIME_TYPE, GeminiAnalyzer, GeminiConfig, GeminiModel, HttpRequest,
    HttpResponse, ImageAnalyzer, ImageInput, LoadedImage, Method, TokenUsage, Transport,
    extract_structured_data, extract_text, load_image, mime_type_for_path, mime_type_for_url,
    provider_error_message, strip_json_fences,
};

#[cfg(feature = "reqwest-transport")]
pub use backend::ReqwestTransport;
