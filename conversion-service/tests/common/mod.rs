#![allow(dead_code)]

use async_trait::async_trait;
use conversion_service::config::ConversionConfig;
use conversion_service::converters::{DocumentConverter, PdfRenderer};
use conversion_service::error::{CommandError, ConversionError, RenderError};
use conversion_service::pipeline::ConversionPipeline;
use conversion_service::services::TempWorkspace;
use conversion_service::startup::Application;
use service_core::observability::build_dispatch;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use uuid::Uuid;

/// Treats the upload as text and wraps it in a paragraph.
pub struct FakeConverter;

#[async_trait]
impl DocumentConverter for FakeConverter {
    async fn to_html(&self, input_path: &Path) -> Result<String, ConversionError> {
        let bytes = tokio::fs::read(input_path).await.map_err(|source| {
            ConversionError::Tool(CommandError::Io {
                tool: "fake-pandoc".to_string(),
                source,
            })
        })?;
        Ok(format!("<p>{}</p>", String::from_utf8(bytes)?))
    }
}

/// Writes a minimal PDF carrying the HTML so responses can be told apart.
pub struct FakeRenderer;

#[async_trait]
impl PdfRenderer for FakeRenderer {
    async fn to_pdf(&self, html: &str, output_path: &Path) -> Result<(), RenderError> {
        tokio::fs::write(output_path, format!("%PDF-1.4\n{}\n%%EOF", html))
            .await
            .map_err(|_| RenderError::MissingOutput)
    }
}

pub struct FailingRenderer;

#[async_trait]
impl PdfRenderer for FailingRenderer {
    async fn to_pdf(&self, _html: &str, output_path: &Path) -> Result<(), RenderError> {
        tokio::fs::write(output_path, b"%PDF-1.4\n").await.ok();
        Err(RenderError::Tool(CommandError::Failed {
            tool: "fake-wkhtmltopdf".to_string(),
            status: "exit status: 1".to_string(),
            stderr: "Exit with code 1 due to network error: HostNotFoundError".to_string(),
        }))
    }
}

pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub temp_dir: PathBuf,
}

impl TestApp {
    /// App with in-process fakes for both tools.
    pub async fn spawn() -> Self {
        Self::spawn_with(Arc::new(FakeConverter), Arc::new(FakeRenderer)).await
    }

    pub async fn spawn_with_upload_limit(max_upload_bytes: usize) -> Self {
        Self::spawn_inner(Arc::new(FakeConverter), Arc::new(FakeRenderer), max_upload_bytes).await
    }

    pub async fn spawn_with(
        converter: Arc<dyn DocumentConverter>,
        renderer: Arc<dyn PdfRenderer>,
    ) -> Self {
        Self::spawn_inner(converter, renderer, 20 * 1024 * 1024).await
    }

    async fn spawn_inner(
        converter: Arc<dyn DocumentConverter>,
        renderer: Arc<dyn PdfRenderer>,
        max_upload_bytes: usize,
    ) -> Self {
        let mut config = test_config();
        config.max_upload_bytes = max_upload_bytes;
        let temp_dir = config.workspace.temp_dir.clone();
        std::fs::create_dir_all(&temp_dir).expect("Failed to create temp dir");

        let pipeline =
            ConversionPipeline::new(TempWorkspace::in_dir(&temp_dir), converter, renderer);
        let app = Application::build_with_pipeline(config, pipeline, test_logger())
            .await
            .expect("Failed to build test application");

        Self::start(app, temp_dir).await
    }

    /// App wired with the real command-line tools at the given paths.
    pub async fn spawn_with_tools(pandoc_path: &str, wkhtmltopdf_path: &str) -> Self {
        let mut config = test_config();
        config.tools.pandoc_path = pandoc_path.to_string();
        config.tools.wkhtmltopdf_path = wkhtmltopdf_path.to_string();
        let temp_dir = config.workspace.temp_dir.clone();

        let app = Application::build(config, test_logger())
            .await
            .expect("Failed to build test application");

        Self::start(app, temp_dir).await
    }

    async fn start(app: Application, temp_dir: PathBuf) -> Self {
        let port = app.port();
        let address = format!("http://127.0.0.1:{}", port);

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        // Wait for HTTP server to be ready by polling health endpoint
        let client = reqwest::Client::new();
        let health_url = format!("{}/health", address);
        for _ in 0..50 {
            if client.get(&health_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
        }

        TestApp {
            address,
            port,
            temp_dir,
        }
    }

    pub fn convert_url(&self) -> String {
        format!("{}/convert", self.address)
    }

    /// Files currently in this app's temp directory.
    pub fn temp_files(&self) -> Vec<PathBuf> {
        std::fs::read_dir(&self.temp_dir)
            .map(|entries| entries.filter_map(|e| e.ok()).map(|e| e.path()).collect())
            .unwrap_or_default()
    }

    pub async fn cleanup(&self) {
        let _ = tokio::fs::remove_dir_all(&self.temp_dir).await;
    }
}

fn test_config() -> ConversionConfig {
    let mut config = ConversionConfig::load().expect("Failed to load configuration");
    config.common.port = 0; // Random port for testing
    config.workspace.temp_dir = PathBuf::from(format!("target/test-convert-{}", Uuid::new_v4()));
    config.tools.timeout_secs = 10;
    config
}

fn test_logger() -> tracing::Dispatch {
    build_dispatch("conversion-service-test", "warn", None)
}

pub fn docx_form(filename: &str, content: &str) -> reqwest::multipart::Form {
    reqwest::multipart::Form::new().part(
        "file",
        reqwest::multipart::Part::bytes(content.as_bytes().to_vec())
            .file_name(filename.to_string())
            .mime_str("application/vnd.openxmlformats-officedocument.wordprocessingml.document")
            .unwrap(),
    )
}
