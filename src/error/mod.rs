use thiserror::Error;

/// Boxed error used to carry transport and I/O failures across the [`Transport`] seam.
///
/// [`Transport`]: crate::Transport
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Error types for the image analyzer.
///
/// Every failure of an analysis is surfaced as one of these variants. The only thing that
/// never fails an analysis is structured JSON recovery: a response that is not JSON-shaped
/// simply produces a result without `parsed_data`.
///
/// # Examples
///
/// ```
/// use image_analyzer::{AnalysisError, Result};
///
/// fn check_payload(data: &[u8]) -> Result<()> {
///     if data.is_empty() {
///         return Err(AnalysisError::InvalidImageData);
///     }
///     Ok(())
/// }
///
/// match check_payload(&[]) {
///     Err(AnalysisError::InvalidImageData) => println!("nothing to send"),
///     Err(e) => println!("Unexpected error: {}", e),
///     Ok(()) => println!("ok"),
/// }
/// ```
#[derive(Error, Debug)]
pub enum AnalysisError {
    /// The image payload is empty
    #[error("Invalid image data: image payload is empty")]
    InvalidImageData,

    /// The image format is not accepted. Reserved for format gating; no path produces it yet.
    #[error("Unsupported image format: {format}")]
    UnsupportedFormat { format: String },

    /// The transport failed to deliver a request or fetch a remote image
    #[error("Network error: {0}")]
    NetworkError(#[source] BoxError),

    /// The provider rejected the request
    #[error("API error ({status_code}): {message}")]
    ApiError { status_code: u16, message: String },

    /// Credential problems detected before a request is sent
    #[error("Authentication error: {0}")]
    AuthError(String),

    /// The provider response was malformed or had an unexpected shape
    #[error("Parsing error: {0}")]
    ParsingError(String),

    /// Anything else, wrapping the underlying failure
    #[error("Unknown error: {0}")]
    Unknown(#[source] BoxError),
}

impl AnalysisError {
    /// Wrap a transport failure.
    pub fn network(err: impl Into<BoxError>) -> Self {
        Self::NetworkError(err.into())
    }

    /// Wrap an unclassified failure, such as a local file that cannot be read.
    pub fn unknown(err: impl Into<BoxError>) -> Self {
        Self::Unknown(err.into())
    }

    /// Build an [`AnalysisError::ApiError`].
    pub fn api(status_code: u16, message: impl Into<String>) -> Self {
        Self::ApiError {
            status_code,
            message: message.into(),
        }
    }
}

// Wrapped sources don't implement PartialEq, so they compare by their rendered message.
impl PartialEq for AnalysisError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::InvalidImageData, Self::InvalidImageData) => true,
            (Self::UnsupportedFormat { format: a }, Self::UnsupportedFormat { format: b }) => a == b,
            (Self::NetworkError(a), Self::NetworkError(b)) => a.to_string() == b.to_string(),
            (
                Self::ApiError {
                    status_code: sa,
                    message: ma,
                },
                Self::ApiError {
                    status_code: sb,
                    message: mb,
                },
            ) => sa == sb && ma == mb,
            (Self::AuthError(a), Self::AuthError(b)) => a == b,
            (Self::ParsingError(a), Self::ParsingError(b)) => a == b,
            (Self::Unknown(a), Self::Unknown(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}

/// A specialized Result type for analyzer operations.
pub type Result<T> = std::result::Result<T, AnalysisError>;
