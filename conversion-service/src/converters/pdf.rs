use crate::converters::executor::CommandExecutor;
use crate::error::RenderError;
use async_trait::async_trait;
use std::path::Path;

/// Options passed to wkhtmltopdf on every render.
///
/// The HTML comes from an untrusted upload: the renderer must not reach the
/// network for images or links, must not run scripts, and must not prompt.
/// These are fixed and intentionally absent from configuration.
pub const RENDER_SAFETY_ARGS: &[&str] = &[
    "--quiet",
    "--no-images",
    "--disable-external-links",
    "--disable-javascript",
    "--encoding",
    "UTF-8",
];

/// Second stage: render HTML into a PDF file at `output_path`.
#[async_trait]
pub trait PdfRenderer: Send + Sync {
    async fn to_pdf(&self, html: &str, output_path: &Path) -> Result<(), RenderError>;
}

/// HTML to PDF through wkhtmltopdf, with the HTML piped over stdin.
pub struct WkhtmltopdfRenderer {
    program: String,
    executor: CommandExecutor,
}

impl WkhtmltopdfRenderer {
    pub fn new(program: impl Into<String>, executor: CommandExecutor) -> Self {
        Self {
            program: program.into(),
            executor,
        }
    }
}

fn render_args(output_path: &str) -> Vec<&str> {
    let mut args = RENDER_SAFETY_ARGS.to_vec();
    // "-" reads the page from stdin.
    args.push("-");
    args.push(output_path);
    args
}

#[async_trait]
impl PdfRenderer for WkhtmltopdfRenderer {
    async fn to_pdf(&self, html: &str, output_path: &Path) -> Result<(), RenderError> {
        let output = output_path.to_string_lossy();

        self.executor
            .execute(
                &self.program,
                &render_args(&output),
                Some(html.as_bytes().to_vec()),
            )
            .await?;

        match tokio::fs::metadata(output_path).await {
            Ok(meta) if meta.len() > 0 => {
                tracing::debug!(pdf_size = meta.len(), "HTML rendered to PDF");
                Ok(())
            }
            _ => Err(RenderError::MissingOutput),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safety_args_always_present() {
        let args = render_args("/tmp/out.pdf");

        for required in [
            "--no-images",
            "--disable-external-links",
            "--disable-javascript",
            "--quiet",
        ] {
            assert!(args.contains(&required), "missing {required}");
        }
        let encoding = args.iter().position(|a| *a == "--encoding").unwrap();
        assert_eq!(args[encoding + 1], "UTF-8");
        assert_eq!(&args[args.len() - 2..], &["-", "/tmp/out.pdf"]);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_successful_exit_without_output_is_error() {
        let renderer = WkhtmltopdfRenderer::new(
            "true",
            CommandExecutor::new(std::time::Duration::from_secs(5)),
        );
        let output = std::env::temp_dir().join(format!("docx2pdf-{}.pdf", uuid::Uuid::new_v4()));

        let err = renderer.to_pdf("<p>hi</p>", &output).await.unwrap_err();

        assert!(matches!(err, RenderError::MissingOutput));
    }
}
