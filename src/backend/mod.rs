pub mod client;
pub mod gemini;
pub mod media;
pub mod transport;
pub mod usage;
pub mod utils;

pub use client::{AnalyzerExt, ImageAnalyzer};
pub use gemini::{GeminiAnalyzer, GeminiConfig, Model as GeminiModel, extract_text};
pub use media::{
    DEFAULT_MIME_TYPE, ImageInput, LoadedImage, load_image, mime_type_for_path, mime_type_for_url,
};
#[cfg(feature = "reqwest-transport")]
pub use transport::ReqwestTransport;
pub use transport::{HttpRequest, HttpResponse, Method, Transport};
pub use usage::TokenUsage;
pub use utils::{extract_structured_data, provider_error_message, strip_json_fences};
