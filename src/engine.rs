//! Default [`TransformEngine`]: pipes each file through an external program.
//!
//! The program for a format comes from its [`FormatOptions`]: it receives the
//! original bytes on stdin and must write the transformed bytes to stdout.

use std::io::ErrorKind;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, error, info};

use crate::contract::{FormatOptions, TransformEngine};
use crate::error::TransformError;
use crate::process::extension_of;

#[derive(Debug, Clone, Default)]
pub struct CommandEngine;

impl CommandEngine {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl TransformEngine for CommandEngine {
    async fn transform(
        &self,
        path: &str,
        input: &[u8],
        options: &FormatOptions,
    ) -> Result<Vec<u8>, TransformError> {
        let command = match options.command.as_deref() {
            Some(command) if !command.trim().is_empty() => command,
            _ => {
                return Err(TransformError::UnsupportedFormat {
                    extension: extension_of(path),
                })
            }
        };

        debug!(path, command, args = ?options.args, "Launching transform command");
        let mut child = Command::new(command)
            .args(&options.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                error!(error = ?e, path, command, "Failed to launch transform command");
                TransformError::Spawn {
                    command: command.to_string(),
                    source: e,
                }
            })?;

        let mut stdin = child.stdin.take().ok_or_else(|| TransformError::Other(format!(
            "stdin of `{command}` was not captured"
        )))?;

        // Feed stdin while draining stdout so large files cannot deadlock on a full pipe.
        let feed = async move {
            let written = stdin.write_all(input).await;
            drop(stdin);
            written
        };
        let (written, output) = tokio::join!(feed, child.wait_with_output());

        let output = output.map_err(|e| {
            error!(error = ?e, path, command, "Failed to collect transform output");
            TransformError::Io {
                command: command.to_string(),
                source: e,
            }
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            error!(path, command, status = %output.status, stderr = %stderr, "Transform command failed");
            return Err(TransformError::Failed {
                command: command.to_string(),
                status: output.status.to_string(),
                stderr,
            });
        }

        // A tool may legitimately stop reading early; only other write errors count.
        if let Err(e) = written {
            if e.kind() != ErrorKind::BrokenPipe {
                error!(error = ?e, path, command, "Failed to write input to transform command");
                return Err(TransformError::Io {
                    command: command.to_string(),
                    source: e,
                });
            }
        }

        info!(
            path,
            command,
            input_size = input.len(),
            output_size = output.stdout.len(),
            "Transform command succeeded"
        );
        Ok(output.stdout)
    }
}
