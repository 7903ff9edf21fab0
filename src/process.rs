//! Process runner for the external capture tools.
//!
//! This module handles spawning a capture program, pumping its stdout to a
//! callback, and terminating it when a cancellation signal fires.

use async_trait::async_trait;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::process::{Child, Command};

use crate::cancel::CancelToken;
use crate::error::CameraError;

/// Read buffer size for stdout chunks (64KB).
pub const CHUNK_SIZE: usize = 65536;

/// How long a cancelled process gets to exit after SIGINT before it is killed.
pub const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

/// How long stderr forwarding may keep running after the process is reaped.
///
/// A grandchild that inherited the pipe can hold it open indefinitely.
pub const STDERR_DRAIN: Duration = Duration::from_millis(500);

/// Exit code reported for a process terminated by a signal.
pub const SIGNALLED_EXIT_CODE: i32 = -1;

/// Runs an external program and streams its stdout.
#[async_trait]
pub trait ProcessRunner: Send + Sync + 'static {
    /// Spawn `program` with `args`, hand every stdout chunk to `on_chunk`,
    /// and return the exit code.
    ///
    /// When `cancel` fires the process is terminated and its exit code is
    /// still returned.
    async fn run(
        &self,
        program: &str,
        args: &[String],
        on_chunk: &mut (dyn for<'c> FnMut(&'c [u8]) + Send),
        cancel: &CancelToken,
    ) -> Result<i32, CameraError>;
}

/// Runs programs as real child processes via tokio.
#[derive(Debug, Clone, Default)]
pub struct SystemProcessRunner;

impl SystemProcessRunner {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ProcessRunner for SystemProcessRunner {
    async fn run(
        &self,
        program: &str,
        args: &[String],
        on_chunk: &mut (dyn for<'c> FnMut(&'c [u8]) + Send),
        cancel: &CancelToken,
    ) -> Result<i32, CameraError> {
        log::debug!("Spawning {} {}", program, args.join(" "));

        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| CameraError::from_spawn(program, e))?;

        // Forward stderr to the log so tool diagnostics are not lost
        let stderr_task = child.stderr.take().map(|stderr| {
            let name = program.to_string();
            tokio::spawn(async move {
                let mut lines = BufReader::new(stderr).lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    log::debug!("[{}] {}", name, line);
                }
            })
        });

        let mut stdout = child.stdout.take().ok_or_else(|| {
            CameraError::Io(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "child stdout was not captured",
            ))
        })?;

        let mut buf = vec![0u8; CHUNK_SIZE];
        let mut cancelled = false;
        loop {
            tokio::select! {
                read = stdout.read(&mut buf) => {
                    match read.map_err(CameraError::from_os)? {
                        0 => break, // EOF
                        n => on_chunk(&buf[..n]),
                    }
                }
                _ = cancel.cancelled() => {
                    cancelled = true;
                    break;
                }
            }
        }

        let status = if cancelled {
            log::info!("Cancelling {}", program);
            terminate(&mut child).await
        } else {
            // stdout is closed but the process may still be running
            tokio::select! {
                status = child.wait() => status,
                _ = cancel.cancelled() => {
                    log::info!("Cancelling {} after its output closed", program);
                    terminate(&mut child).await
                }
            }
        };
        let status = status.map_err(CameraError::from_os)?;

        if let Some(task) = stderr_task {
            let abort = task.abort_handle();
            if tokio::time::timeout(STDERR_DRAIN, task).await.is_err() {
                log::debug!("{} stderr still open after exit, detaching", program);
                abort.abort();
            }
        }

        let code = status.code().unwrap_or(SIGNALLED_EXIT_CODE);
        log::debug!("{} exited with code {}", program, code);
        Ok(code)
    }
}

/// Ask the process to stop, then force it.
///
/// Sends SIGINT so the capture tool can flush its output, and kills the
/// process if it hasn't exited within [`SHUTDOWN_GRACE`].
async fn terminate(child: &mut Child) -> std::io::Result<ExitStatus> {
    #[cfg(unix)]
    {
        if let Some(pid) = child.id() {
            // SAFETY: kill has no memory-safety preconditions; pid belongs to our child.
            unsafe {
                libc::kill(pid as libc::pid_t, libc::SIGINT);
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = child.start_kill();
    }

    match tokio::time::timeout(SHUTDOWN_GRACE, child.wait()).await {
        Ok(status) => status,
        Err(_) => {
            log::warn!("Process ignored SIGINT, killing it");
            child.kill().await?;
            child.wait().await
        }
    }
}
