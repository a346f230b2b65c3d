//! Describe an image file or URL with Gemini.
//!
//! ```bash
//! export GEMINI_API_KEY=your_key_here
//! cargo run --example analyze_image -- path/to/photo.jpg
//! cargo run --example analyze_image -- https://www.rust-lang.org/logos/rust-logo-512x512.png --thumbnail
//! ```

use image_analyzer::logging::{LogLevel, init_logging};
use image_analyzer::{AnalysisConfiguration, GeminiAnalyzer, ImageAnalyzer, ImageInput};
use std::env;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging(LogLevel::Info);

    let mut args = env::args().skip(1);
    let Some(target) = args.next() else {
        eprintln!("usage: analyze_image <path-or-url> [--thumbnail|--detailed]");
        std::process::exit(2);
    };

    let config = match args.next().as_deref() {
        Some("--thumbnail") => AnalysisConfiguration::thumbnail(),
        Some("--detailed") => AnalysisConfiguration::detailed(),
        _ => AnalysisConfiguration::default(),
    };

    let input = if target.starts_with("http://") || target.starts_with("https://") {
        ImageInput::from_url(target)
    } else {
        ImageInput::from_path(target)
    };

    let analyzer = GeminiAnalyzer::from_env()?;
    let result = analyzer.analyze(input, &config).await?;

    println!("{}", result.raw_response);
    if let Some(data) = &result.parsed_data {
        println!("\nStructured data:");
        println!("{}", serde_json::to_string_pretty(data)?);
    }
    println!(
        "\n{} bytes of {} in {:.2}s",
        result.metadata.image_size_bytes,
        result.metadata.mime_type,
        result.metadata.processing_time_seconds.unwrap_or_default()
    );
    if let Some(usage) = &result.metadata.usage {
        println!("{} tokens ({})", usage.total_tokens(), usage.model);
    }

    Ok(())
}
