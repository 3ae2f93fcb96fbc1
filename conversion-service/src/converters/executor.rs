use crate::error::CommandError;
use std::path::Path;
use std::process::{Output, Stdio};
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// Runs external tools with a hard deadline.
///
/// The child is killed when the deadline passes or when the calling future
/// is dropped, so a hung tool never outlives its request.
#[derive(Debug, Clone)]
pub struct CommandExecutor {
    timeout: Duration,
}

impl CommandExecutor {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Run `program` with `args`, optionally feeding `stdin`.
    ///
    /// Returns the captured output on a zero exit status.
    pub async fn execute(
        &self,
        program: &str,
        args: &[&str],
        stdin: Option<Vec<u8>>,
    ) -> Result<Output, CommandError> {
        let tool = tool_name(program);
        let mut cmd = Command::new(program);
        cmd.args(args)
            .stdin(if stdin.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        tracing::debug!(
            program = %program,
            args = ?args,
            timeout_secs = %self.timeout.as_secs(),
            "Executing command"
        );

        let mut child = cmd.spawn().map_err(|source| CommandError::Spawn {
            tool: tool.clone(),
            source,
        })?;

        // Feed stdin from a separate task so a tool that writes before it
        // finishes reading cannot deadlock against us.
        let writer = match (stdin, child.stdin.take()) {
            (Some(input), Some(mut pipe)) => Some(tokio::spawn(async move {
                pipe.write_all(&input).await?;
                pipe.shutdown().await
            })),
            _ => None,
        };

        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| {
                tracing::error!(
                    program = %program,
                    timeout_secs = %self.timeout.as_secs(),
                    "Command timed out"
                );
                CommandError::TimedOut {
                    tool: tool.clone(),
                    timeout: self.timeout,
                }
            })?
            .map_err(|source| CommandError::Io {
                tool: tool.clone(),
                source,
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            tracing::error!(
                program = %program,
                args = ?args,
                status = %output.status,
                stderr = %stderr,
                "Command failed"
            );
            return Err(CommandError::Failed {
                tool: tool.clone(),
                status: output.status.to_string(),
                stderr,
            });
        }

        // A tool may exit successfully without draining stdin; a broken pipe
        // is only interesting when it made the tool fail, handled above.
        if let Some(writer) = writer {
            match writer.await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => tracing::debug!(program = %program, error = %e, "stdin write ended early"),
                Err(e) => tracing::debug!(program = %program, error = %e, "stdin writer task failed"),
            }
        }

        tracing::debug!(
            program = %program,
            output_size = output.stdout.len(),
            "Command succeeded"
        );

        Ok(output)
    }
}

/// File name of `program`, for error messages that may reach clients.
fn tool_name(program: &str) -> String {
    Path::new(program)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "external tool".to_string())
}
