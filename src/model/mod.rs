pub mod config;
pub mod result;

pub use config::{AnalysisConfiguration, DEFAULT_PROMPT, DEFAULT_TEMPERATURE};
pub use result::{AnalysisMetadata, AnalysisResult};
