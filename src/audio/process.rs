//! Playback backed by a host child process.

use super::Playback;
use crate::types::Provider;
use crate::{Error, Result};
use async_trait::async_trait;
use bytes::Bytes;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::process::{Child, Command};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Runs one program to completion as the audible output of an utterance.
///
/// Used both by the local engine (the engine process speaks directly) and by
/// [`super::CommandSink`] (a player process reads encoded audio from stdin).
/// Stopping kills the process; an optional stop command runs afterwards for
/// engines that queue speech in a daemon, such as speech-dispatcher.
#[derive(Debug)]
pub struct ProcessPlayback {
    provider: Provider,
    program: PathBuf,
    args: Vec<String>,
    stdin: Option<Bytes>,
    stop_command: Option<(PathBuf, Vec<String>)>,
    child: Option<Child>,
    writer: Option<JoinHandle<()>>,
}

impl ProcessPlayback {
    pub fn new(provider: Provider, program: impl Into<PathBuf>, args: Vec<String>) -> Self {
        Self {
            provider,
            program: program.into(),
            args,
            stdin: None,
            stop_command: None,
            child: None,
            writer: None,
        }
    }

    /// Feed `data` to the process on stdin, then close it.
    pub fn with_stdin(mut self, data: Bytes) -> Self {
        self.stdin = Some(data);
        self
    }

    /// Run `program args` after killing the process on cancel.
    pub fn with_stop_command(mut self, program: impl Into<PathBuf>, args: Vec<String>) -> Self {
        self.stop_command = Some((program.into(), args));
        self
    }

    fn label(&self) -> String {
        self.program.display().to_string()
    }
}

#[async_trait]
impl Playback for ProcessPlayback {
    async fn start(&mut self) -> Result<()> {
        if self.child.is_some() {
            return Ok(());
        }
        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .stdin(if self.stdin.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = command.spawn().map_err(|e| {
            Error::playback(self.provider, format!("failed to launch {}: {}", self.label(), e))
        })?;
        debug!(program = %self.label(), pid = ?child.id(), "playback process started");

        if let (Some(data), Some(mut pipe)) = (self.stdin.take(), child.stdin.take()) {
            let program = self.label();
            self.writer = Some(tokio::spawn(async move {
                // A player that exits early closes the pipe; that surfaces via
                // its exit status, not here.
                if let Err(e) = pipe.write_all(&data).await {
                    debug!(program = %program, error = %e, "stdin closed early");
                }
                let _ = pipe.shutdown().await;
            }));
        }

        self.child = Some(child);
        Ok(())
    }

    async fn finished(&mut self) -> Result<()> {
        let provider = self.provider;
        let label = self.label();
        let child = self
            .child
            .as_mut()
            .ok_or_else(|| Error::playback(provider, "playback was never started"))?;

        let mut stderr = child.stderr.take();
        let read_stderr = async {
            let mut buf = Vec::new();
            if let Some(pipe) = stderr.as_mut() {
                let _ = pipe.read_to_end(&mut buf).await;
            }
            buf
        };
        let (status, stderr_bytes) = tokio::join!(child.wait(), read_stderr);
        let status = status
            .map_err(|e| Error::playback(provider, format!("waiting for {}: {}", label, e)))?;
        self.child = None;
        if let Some(writer) = self.writer.take() {
            writer.abort();
        }

        if status.success() {
            Ok(())
        } else {
            let detail = String::from_utf8_lossy(&stderr_bytes);
            Err(Error::playback(
                provider,
                format!("{} exited with {}: {}", label, status, detail.trim()),
            ))
        }
    }

    async fn cancel(&mut self) {
        if let Some(writer) = self.writer.take() {
            writer.abort();
        }
        if let Some(mut child) = self.child.take() {
            if let Err(e) = child.kill().await {
                warn!(program = %self.label(), error = %e, "failed to kill playback process");
            }
        }
        if let Some((program, args)) = self.stop_command.take() {
            let status = Command::new(&program)
                .args(&args)
                .stdin(Stdio::null())
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .status()
                .await;
            if let Err(e) = status {
                warn!(program = %program.display(), error = %e, "stop command failed");
            }
        }
    }
}
