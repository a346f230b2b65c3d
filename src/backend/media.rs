use base64::{Engine, engine::general_purpose::STANDARD};
use std::path::{Path, PathBuf};
use tracing::{debug, error, instrument};

use crate::backend::transport::{HttpRequest, Transport};
use crate::error::{AnalysisError, Result};

/// MIME type used when the extension is missing or unknown.
pub const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

/// An image to analyze.
///
/// # Examples
///
/// ```
/// use image_analyzer::ImageInput;
///
/// let inline = ImageInput::from_bytes(vec![0x89, 0x50, 0x4e, 0x47], "image/png");
/// let local = ImageInput::from_path("photos/cat.jpg");
/// let remote = ImageInput::from_url("https://example.com/cat.webp");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageInput {
    /// Raw bytes with a caller-declared MIME type
    Bytes { data: Vec<u8>, mime_type: String },
    /// A file on the local filesystem
    LocalFile { path: PathBuf },
    /// An image fetched over HTTP
    RemoteUrl { url: String },
}

impl ImageInput {
    pub fn from_bytes(data: impl Into<Vec<u8>>, mime_type: impl Into<String>) -> Self {
        ImageInput::Bytes {
            data: data.into(),
            mime_type: mime_type.into(),
        }
    }

    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        ImageInput::LocalFile { path: path.into() }
    }

    pub fn from_url(url: impl Into<String>) -> Self {
        ImageInput::RemoteUrl { url: url.into() }
    }

    fn kind(&self) -> &'static str {
        match self {
            ImageInput::Bytes { .. } => "bytes",
            ImageInput::LocalFile { .. } => "local_file",
            ImageInput::RemoteUrl { .. } => "remote_url",
        }
    }
}

/// Image bytes ready to be sent, with their MIME type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedImage {
    pub data: Vec<u8>,
    pub mime_type: String,
}

impl LoadedImage {
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Standard padded base64, as the provider's inline data part expects.
    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.data)
    }
}

/// Resolve a MIME type from a file path's extension (case-insensitive).
///
/// ```
/// use image_analyzer::mime_type_for_path;
///
/// assert_eq!(mime_type_for_path("holiday/beach.JPG"), "image/jpeg");
/// assert_eq!(mime_type_for_path("notes.txt"), "application/octet-stream");
/// ```
pub fn mime_type_for_path(path: impl AsRef<Path>) -> &'static str {
    let ext = path
        .as_ref()
        .extension()
        .and_then(|value| value.to_str())
        .map(|value| value.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "tiff" | "tif" => "image/tiff",
        _ => DEFAULT_MIME_TYPE,
    }
}

/// Resolve a MIME type from the path component of a URL, ignoring query and fragment.
pub fn mime_type_for_url(url: &str) -> &'static str {
    let end = url.find(['?', '#']).unwrap_or(url.len());
    let without_query = &url[..end];
    let path = match without_query.find("://") {
        Some(scheme_end) => {
            let rest = &without_query[scheme_end + 3..];
            rest.find('/').map(|slash| &rest[slash..]).unwrap_or("")
        }
        None => without_query,
    };
    mime_type_for_path(path)
}

/// Keep the media type of a `Content-Type` header, dropping parameters.
fn normalize_content_type(value: &str) -> Option<String> {
    let media_type = value.split(';').next().unwrap_or("").trim();
    if media_type.is_empty() {
        None
    } else {
        Some(media_type.to_ascii_lowercase())
    }
}

/// Turn any [`ImageInput`] into bytes plus a MIME type.
///
/// Local files are read in full; remote URLs are fetched with a single GET through
/// `transport`. Inline bytes are passed through untouched.
#[instrument(skip(input, transport), fields(kind = input.kind()))]
pub async fn load_image(input: ImageInput, transport: &dyn Transport) -> Result<LoadedImage> {
    match input {
        ImageInput::Bytes { data, mime_type } => Ok(LoadedImage { data, mime_type }),
        ImageInput::LocalFile { path } => {
            let data = tokio::fs::read(&path).await.map_err(|e| {
                error!(error = %e, path = %path.display(), "Failed to read image file");
                AnalysisError::unknown(e)
            })?;
            let mime_type = mime_type_for_path(&path).to_string();
            debug!(bytes = data.len(), mime_type = %mime_type, "Read image from disk");
            Ok(LoadedImage { data, mime_type })
        }
        ImageInput::RemoteUrl { url } => {
            let response = transport
                .send(HttpRequest::get(url.as_str()))
                .await
                .map_err(|e| {
                    error!(error = %e, url = %url, "Failed to fetch remote image");
                    AnalysisError::NetworkError(e)
                })?;

            if !response.is_success() {
                error!(status = response.status, url = %url, "Remote image fetch was rejected");
                return Err(AnalysisError::network(format!(
                    "fetching {} returned HTTP {}",
                    url, response.status
                )));
            }

            let mime_type = response
                .content_type()
                .and_then(normalize_content_type)
                .unwrap_or_else(|| mime_type_for_url(&url).to_string());
            debug!(
                bytes = response.body.len(),
                mime_type = %mime_type,
                "Fetched remote image"
            );
            Ok(LoadedImage {
                data: response.body,
                mime_type,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_extensions() {
        let cases = [
            ("a.jpg", "image/jpeg"),
            ("a.jpeg", "image/jpeg"),
            ("a.png", "image/png"),
            ("a.gif", "image/gif"),
            ("a.webp", "image/webp"),
            ("a.bmp", "image/bmp"),
            ("a.tiff", "image/tiff"),
            ("a.tif", "image/tiff"),
        ];
        for (path, expected) in cases {
            assert_eq!(mime_type_for_path(path), expected, "{}", path);
            assert_eq!(
                mime_type_for_path(path.to_ascii_uppercase()),
                expected,
                "{}",
                path
            );
        }
    }

    #[test]
    fn test_unknown_or_missing_extension() {
        assert_eq!(mime_type_for_path("archive.zip"), DEFAULT_MIME_TYPE);
        assert_eq!(mime_type_for_path("README"), DEFAULT_MIME_TYPE);
        assert_eq!(mime_type_for_path(""), DEFAULT_MIME_TYPE);
        assert_eq!(mime_type_for_path("photos/.png/raw"), DEFAULT_MIME_TYPE);
    }

    #[test]
    fn test_url_ignores_query_and_fragment() {
        assert_eq!(
            mime_type_for_url("https://cdn.example.com/img/cat.PNG?size=large#top"),
            "image/png"
        );
        assert_eq!(mime_type_for_url("https://example.com/photo.jpeg"), "image/jpeg");
        assert_eq!(mime_type_for_url("https://example.com/"), DEFAULT_MIME_TYPE);
        assert_eq!(mime_type_for_url("https://example.com"), DEFAULT_MIME_TYPE);
        assert_eq!(mime_type_for_url("https://example.png"), DEFAULT_MIME_TYPE);
    }

    #[test]
    fn test_normalize_content_type() {
        assert_eq!(
            normalize_content_type("Image/PNG; charset=binary").as_deref(),
            Some("image/png")
        );
        assert_eq!(normalize_content_type("  ").as_deref(), None);
        assert_eq!(normalize_content_type("").as_deref(), None);
    }

    #[test]
    fn test_base64_encoding() {
        let image = LoadedImage {
            data: b"abc".to_vec(),
            mime_type: "image/png".to_string(),
        };
        assert_eq!(image.to_base64(), "YWJj");
        assert_eq!(image.len(), 3);
        assert!(!image.is_empty());
    }
}
