//! Tests for turning file and URL inputs into the bytes sent to the provider.

mod common;

#[cfg(test)]
mod image_loading_tests {
    use crate::common::{API_KEY, PNG_BYTES, StubTransport, candidate_body};
    use image_analyzer::{
        AnalysisConfiguration, AnalysisError, AnalyzerExt, GeminiAnalyzer, HttpResponse,
        ImageInput, Method, load_image,
    };
    use std::io::Write;

    fn analyzer(transport: &StubTransport) -> GeminiAnalyzer {
        GeminiAnalyzer::with_transport(API_KEY, transport.clone()).unwrap()
    }

    fn write_fixture(dir: &tempfile::TempDir, name: &str, data: &[u8]) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).expect("fixture should be created");
        file.write_all(data).expect("fixture should be written");
        path
    }

    #[tokio::test]
    async fn test_bytes_pass_through() {
        let transport = StubTransport::new();
        let image = load_image(ImageInput::from_bytes(vec![1, 2, 3], "image/x-custom"), &transport)
            .await
            .unwrap();
        assert_eq!(image.data, vec![1, 2, 3]);
        assert_eq!(image.mime_type, "image/x-custom");
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_local_file_uses_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture(&dir, "Holiday.JPEG", b"\xff\xd8\xff\xe0jpegdata");

        let image = load_image(ImageInput::from_path(&path), &StubTransport::new())
            .await
            .unwrap();
        assert_eq!(image.mime_type, "image/jpeg");
        assert_eq!(image.data, b"\xff\xd8\xff\xe0jpegdata".to_vec());
    }

    #[tokio::test]
    async fn test_local_file_unknown_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture(&dir, "scan.heic", b"heic");
        let image = load_image(ImageInput::from_path(&path), &StubTransport::new())
            .await
            .unwrap();
        assert_eq!(image.mime_type, "application/octet-stream");
    }

    #[tokio::test]
    async fn test_missing_file_is_unknown_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_image(
            ImageInput::from_path(dir.path().join("missing.png")),
            &StubTransport::new(),
        )
        .await
        .unwrap_err();
        match err {
            AnalysisError::Unknown(source) => {
                assert!(source.downcast_ref::<std::io::Error>().is_some());
            }
            other => panic!("Expected Unknown, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_remote_url_prefers_declared_content_type() {
        let transport = StubTransport::new().respond(
            HttpResponse::new(200, PNG_BYTES.to_vec())
                .with_header("Content-Type", "image/webp; charset=binary"),
        );
        let image = load_image(
            ImageInput::from_url("https://example.com/picture.png"),
            &transport,
        )
        .await
        .unwrap();
        assert_eq!(image.mime_type, "image/webp");
        assert_eq!(image.data, PNG_BYTES.to_vec());

        let requests = transport.requests();
        assert_eq!(requests[0].method, Method::Get);
        assert_eq!(requests[0].url, "https://example.com/picture.png");
    }

    #[tokio::test]
    async fn test_remote_url_falls_back_to_extension() {
        let transport = StubTransport::new().respond(HttpResponse::new(200, vec![1u8, 2]));
        let image = load_image(
            ImageInput::from_url("https://example.com/img/diagram.GIF?v=2"),
            &transport,
        )
        .await
        .unwrap();
        assert_eq!(image.mime_type, "image/gif");
    }

    #[tokio::test]
    async fn test_remote_transport_failure_is_network_error() {
        let transport = StubTransport::new().fail("dns error");
        let err = load_image(ImageInput::from_url("https://nowhere.invalid/a.png"), &transport)
            .await
            .unwrap_err();
        assert_eq!(err, AnalysisError::network("dns error"));
    }

    #[tokio::test]
    async fn test_remote_http_error_is_network_error() {
        let transport = StubTransport::new().respond(HttpResponse::new(404, "not found"));
        let err = load_image(ImageInput::from_url("https://example.com/gone.png"), &transport)
            .await
            .unwrap_err();
        assert!(matches!(err, AnalysisError::NetworkError(_)), "{:?}", err);
    }

    #[tokio::test]
    async fn test_file_shortcut_reports_size_of_sent_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture(&dir, "logo.png", PNG_BYTES);
        let transport = StubTransport::new().respond_json(200, candidate_body("A logo"));

        let result = analyzer(&transport)
            .analyze_file(&path, &AnalysisConfiguration::default())
            .await
            .unwrap();
        assert_eq!(result.metadata.image_size_bytes, PNG_BYTES.len());
        assert_eq!(result.metadata.mime_type, "image/png");

        let request = transport.request_json(0);
        assert_eq!(
            request["contents"][0]["parts"][1]["inline_data"]["data"],
            "iVBORw0KGgoAAAAN"
        );
    }

    #[tokio::test]
    async fn test_url_shortcut_fetches_then_analyzes() {
        let image_bytes = vec![0xffu8; 1024];
        let transport = StubTransport::new()
            .respond(
                HttpResponse::new(200, image_bytes.clone()).with_header("content-type", "image/jpeg"),
            )
            .respond_json(200, candidate_body("A grey square"));

        let result = analyzer(&transport)
            .analyze_url("https://example.com/square", &AnalysisConfiguration::default())
            .await
            .unwrap();
        assert_eq!(result.raw_response, "A grey square");
        assert_eq!(result.metadata.image_size_bytes, 1024);
        assert_eq!(result.metadata.mime_type, "image/jpeg");

        let requests = transport.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].method, Method::Get);
        assert_eq!(requests[1].method, Method::Post);
        assert_eq!(
            transport.request_json(1)["contents"][0]["parts"][1]["inline_data"]["mime_type"],
            "image/jpeg"
        );
    }

    #[tokio::test]
    async fn test_empty_remote_image_is_invalid() {
        let transport = StubTransport::new().respond(HttpResponse::new(200, Vec::<u8>::new()));
        let err = analyzer(&transport)
            .analyze_url("https://example.com/empty.png", &AnalysisConfiguration::default())
            .await
            .unwrap_err();
        assert_eq!(err, AnalysisError::InvalidImageData);
        assert_eq!(transport.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_empty_local_file_is_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture(&dir, "empty.png", b"");
        let transport = StubTransport::new();
        let err = analyzer(&transport)
            .analyze_file(path, &AnalysisConfiguration::default())
            .await
            .unwrap_err();
        assert_eq!(err, AnalysisError::InvalidImageData);
        assert!(transport.requests().is_empty());
    }
}
