use crate::converters::executor::CommandExecutor;
use crate::error::ConversionError;
use async_trait::async_trait;
use std::path::Path;

/// First stage: turn an uploaded document into HTML held in memory.
#[async_trait]
pub trait DocumentConverter: Send + Sync {
    async fn to_html(&self, input_path: &Path) -> Result<String, ConversionError>;
}

/// DOCX to HTML through pandoc, reading the result from stdout.
pub struct PandocConverter {
    program: String,
    executor: CommandExecutor,
}

impl PandocConverter {
    pub fn new(program: impl Into<String>, executor: CommandExecutor) -> Self {
        Self {
            program: program.into(),
            executor,
        }
    }
}

#[async_trait]
impl DocumentConverter for PandocConverter {
    async fn to_html(&self, input_path: &Path) -> Result<String, ConversionError> {
        let input = input_path.to_string_lossy();
        let output = self
            .executor
            .execute(&self.program, &["--from=docx", "--to=html", input.as_ref()], None)
            .await?;

        let html = String::from_utf8(output.stdout)?;

        tracing::debug!(html_length = html.len(), "Document converted to HTML");

        Ok(html)
    }
}
