use crate::config::ConversionConfig;
use crate::converters::{
    CommandExecutor, DocumentConverter, PandocConverter, PdfRenderer, WkhtmltopdfRenderer,
};
use crate::error::JobError;
use crate::models::{ConversionJob, JobStatus, Upload};
use crate::services::metrics;
use crate::services::{JobWorkspace, TempWorkspace};
use std::path::Path;
use std::sync::Arc;
use tracing::Instrument;

const INPUT_SUFFIX: &str = ".docx";
const OUTPUT_SUFFIX: &str = ".pdf";

/// Runs one upload through DOCX -> HTML -> PDF.
///
/// Jobs share nothing but the temp directory, so one pipeline serves any
/// number of concurrent requests.
pub struct ConversionPipeline {
    workspace: TempWorkspace,
    converter: Arc<dyn DocumentConverter>,
    renderer: Arc<dyn PdfRenderer>,
}

impl ConversionPipeline {
    pub fn new(
        workspace: TempWorkspace,
        converter: Arc<dyn DocumentConverter>,
        renderer: Arc<dyn PdfRenderer>,
    ) -> Self {
        Self {
            workspace,
            converter,
            renderer,
        }
    }

    /// pandoc + wkhtmltopdf, as configured.
    pub fn from_config(config: &ConversionConfig) -> Self {
        let executor = CommandExecutor::new(config.tools.command_timeout());

        Self::new(
            TempWorkspace::in_dir(&config.workspace.temp_dir),
            Arc::new(PandocConverter::new(
                &config.tools.pandoc_path,
                executor.clone(),
            )),
            Arc::new(WkhtmltopdfRenderer::new(
                &config.tools.wkhtmltopdf_path,
                executor,
            )),
        )
    }

    /// Convert `upload` and return the complete PDF.
    ///
    /// Temp files are released before this returns, whatever the outcome.
    pub async fn run(&self, upload: Upload) -> Result<Vec<u8>, JobError> {
        let mut job = ConversionJob::new(&upload);
        let span = tracing::info_span!("conversion_job", job_id = %job.id);

        async move {
            tracing::info!(
                filename = %job.original_filename,
                size = job.size,
                "Received conversion request"
            );
            metrics::record_job_started();

            let mut workspace = self.workspace.begin();
            let result = self.execute(&mut job, &mut workspace, &upload.bytes).await;

            match &result {
                Ok(pdf) => {
                    job.transition(JobStatus::Succeeded);
                    metrics::record_job_succeeded(job.elapsed());
                    tracing::info!(
                        pdf_size = pdf.len(),
                        duration_ms = job.elapsed().as_millis() as u64,
                        "Conversion successful"
                    );
                }
                Err(e) => {
                    job.transition(JobStatus::Failed);
                    metrics::record_job_failed(e.stage());
                    tracing::error!(stage = e.stage(), error = %e, "Conversion failed");
                }
            }

            workspace.release().await;
            result
        }
        .instrument(span)
        .await
    }

    async fn execute(
        &self,
        job: &mut ConversionJob,
        workspace: &mut JobWorkspace,
        bytes: &[u8],
    ) -> Result<Vec<u8>, JobError> {
        let input_path = workspace
            .stage_input(INPUT_SUFFIX, bytes)
            .await
            .map_err(JobError::Staging)?;

        job.transition(JobStatus::ConvertingHtml);
        let html = self.converter.to_html(&input_path).await?;

        job.transition(JobStatus::RenderingPdf);
        let output_path = workspace.allocate_output_path(OUTPUT_SUFFIX);
        self.render(html, &output_path).await?;

        tokio::fs::read(&output_path).await.map_err(JobError::Output)
    }

    // Takes the HTML by value so it is dropped as soon as rendering ends.
    async fn render(&self, html: String, output_path: &Path) -> Result<(), JobError> {
        self.renderer.to_pdf(&html, output_path).await?;
        Ok(())
    }
}
