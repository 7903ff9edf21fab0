//! Exclusive-access controller for the still and video capture tools.
//!
//! The camera can serve one operation at a time: either a single still
//! capture or one video stream. [`CameraController`] owns that access state
//! and hands the actual process work to a [`ProcessRunner`].

use serde::Deserialize;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::runtime::Handle;

use super::types::{StillCaptureRequest, VideoStreamRequest};
use crate::cancel::CancelToken;
use crate::error::CameraError;
use crate::process::{ProcessRunner, SystemProcessRunner};

/// Callback invoked once when a video stream ends.
pub type ExitCallback = Box<dyn FnOnce() + Send + 'static>;

/// Programs used for still capture and video streaming.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ToolPaths {
    pub still: String,
    pub video: String,
}

impl Default for ToolPaths {
    fn default() -> Self {
        Self {
            still: "raspistill".to_string(),
            video: "raspivid".to_string(),
        }
    }
}

/// What the camera is currently doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessMode {
    Idle,
    StillCapture,
    VideoStream,
}

impl fmt::Display for AccessMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessMode::Idle => write!(f, "idle"),
            AccessMode::StillCapture => write!(f, "capturing still"),
            AccessMode::VideoStream => write!(f, "streaming video"),
        }
    }
}

/// Access state. A video session carries its own cancellation signal.
enum Access {
    Idle,
    Still,
    Video(CancelToken),
}

impl Access {
    fn mode(&self) -> AccessMode {
        match self {
            Access::Idle => AccessMode::Idle,
            Access::Still => AccessMode::StillCapture,
            Access::Video(_) => AccessMode::VideoStream,
        }
    }
}

struct AccessCell {
    access: Mutex<Access>,
}

impl AccessCell {
    fn lock(&self) -> MutexGuard<'_, Access> {
        // Access is a plain enum, a poisoned lock still holds a valid value
        self.access.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Move from `Idle` to `next` in one critical section.
    fn try_acquire(self: &Arc<Self>, next: Access) -> Result<AccessGuard, CameraError> {
        let mut access = self.lock();
        if !matches!(*access, Access::Idle) {
            return Err(CameraError::ResourceBusy);
        }
        *access = next;
        Ok(AccessGuard {
            cell: Arc::clone(self),
        })
    }
}

/// Returns the camera to `Idle` when dropped.
struct AccessGuard {
    cell: Arc<AccessCell>,
}

impl Drop for AccessGuard {
    fn drop(&mut self) {
        *self.cell.lock() = Access::Idle;
    }
}

/// Cleanup for a video session, run however the stream task ends.
///
/// Order: exit callback, session signal, then the access guard field
/// releases the camera.
struct SessionTeardown {
    on_exit: Option<ExitCallback>,
    session: CancelToken,
    _access: AccessGuard,
}

impl Drop for SessionTeardown {
    fn drop(&mut self) {
        if let Some(on_exit) = self.on_exit.take() {
            on_exit();
        }
        self.session.cancel();
    }
}

/// Coordinates exclusive access to the camera.
///
/// Construct one per camera at the composition root and share it by
/// reference or `Arc`.
pub struct CameraController<R: ProcessRunner = SystemProcessRunner> {
    runner: Arc<R>,
    tools: ToolPaths,
    runtime: Handle,
    access: Arc<AccessCell>,
}

impl<R: ProcessRunner> fmt::Debug for CameraController<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CameraController")
            .field("tools", &self.tools)
            .field("mode", &self.mode())
            .finish_non_exhaustive()
    }
}

impl CameraController<SystemProcessRunner> {
    /// Controller that runs the real capture programs.
    pub fn system(tools: ToolPaths, runtime: Handle) -> Self {
        Self::new(SystemProcessRunner::new(), tools, runtime)
    }
}

impl<R: ProcessRunner> CameraController<R> {
    /// Create a controller.
    ///
    /// Video stream tasks are spawned on `runtime`.
    pub fn new(runner: R, tools: ToolPaths, runtime: Handle) -> Self {
        Self {
            runner: Arc::new(runner),
            tools,
            runtime,
            access: Arc::new(AccessCell {
                access: Mutex::new(Access::Idle),
            }),
        }
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    pub fn tools(&self) -> &ToolPaths {
        &self.tools
    }

    /// Check whether a still capture or video stream owns the camera.
    pub fn is_busy(&self) -> bool {
        self.mode() != AccessMode::Idle
    }

    pub fn mode(&self) -> AccessMode {
        self.access.lock().mode()
    }

    /// Capture a single still image.
    ///
    /// Returns the tool's output, or an empty buffer when the tool exits
    /// with a non-zero code. A cancelled capture ends with the tool being
    /// signalled, so it also yields an empty buffer; a token that is already
    /// cancelled skips the tool entirely. The camera is released when this
    /// future completes or is dropped.
    ///
    /// # Errors
    /// * `CameraError::InvalidConfig` - If `timeout_ms` is not positive
    /// * `CameraError::ResourceBusy` - If another capture or stream is active
    /// * Any error from the process runner
    pub async fn capture_still(
        &self,
        request: &StillCaptureRequest,
        cancel: &CancelToken,
    ) -> Result<Vec<u8>, CameraError> {
        if request.timeout_ms <= 0 {
            return Err(CameraError::InvalidConfig {
                field: "timeout_ms",
                value: request.timeout_ms,
            });
        }

        if cancel.is_cancelled() {
            log::info!("Still capture cancelled before it started");
            return Ok(Vec::new());
        }

        let _access = self.access.try_acquire(Access::Still)?;
        log::info!(
            "Capturing {} still at {}",
            request.encoding.as_arg(),
            request.resolution()
        );

        let args = request.to_args();
        let mut image = Vec::new();
        let code = self
            .runner
            .run(
                &self.tools.still,
                &args,
                &mut |chunk: &[u8]| image.extend_from_slice(chunk),
                cancel,
            )
            .await?;

        if code != 0 {
            log::warn!("{} exited with code {}", self.tools.still, code);
            return Ok(Vec::new());
        }

        log::debug!("Captured {} bytes", image.len());
        Ok(image)
    }

    /// Capture a JPEG at quality 90 with a 300ms timeout.
    pub async fn capture_still_jpeg(
        &self,
        width: u32,
        height: u32,
        cancel: &CancelToken,
    ) -> Result<Vec<u8>, CameraError> {
        self.capture_still(&StillCaptureRequest::jpeg(width, height), cancel)
            .await
    }

    /// Blocking version of [`capture_still`](Self::capture_still).
    ///
    /// The capture runs on a dedicated thread with its own runtime, so this
    /// can be called from inside an async context without deadlocking it.
    pub fn capture_still_blocking(
        &self,
        request: &StillCaptureRequest,
        cancel: &CancelToken,
    ) -> Result<Vec<u8>, CameraError> {
        std::thread::scope(|scope| {
            scope
                .spawn(|| -> Result<Vec<u8>, CameraError> {
                    let runtime = tokio::runtime::Builder::new_current_thread()
                        .enable_all()
                        .build()?;
                    runtime.block_on(self.capture_still(request, cancel))
                })
                .join()
                .unwrap_or_else(|_| {
                    Err(CameraError::Io(std::io::Error::new(
                        std::io::ErrorKind::Other,
                        "still capture thread panicked",
                    )))
                })
        })
    }

    /// Start a video stream in the background.
    ///
    /// `on_data` receives every chunk the video tool writes. When the stream
    /// ends for any reason, `on_exit` runs and the camera is released.
    /// Failures inside the stream are logged, never returned.
    ///
    /// # Errors
    /// * `CameraError::InvalidConfig` - If `timeout_ms` is negative
    /// * `CameraError::ResourceBusy` - If another capture or stream is active
    pub fn open_video_stream<F>(
        &self,
        request: VideoStreamRequest,
        mut on_data: F,
        on_exit: Option<ExitCallback>,
    ) -> Result<(), CameraError>
    where
        F: FnMut(&[u8]) + Send + 'static,
    {
        if request.timeout_ms < 0 {
            return Err(CameraError::InvalidConfig {
                field: "timeout_ms",
                value: request.timeout_ms,
            });
        }

        let session = CancelToken::new();
        let access = self.access.try_acquire(Access::Video(session.clone()))?;
        let teardown = SessionTeardown {
            on_exit,
            session: session.clone(),
            _access: access,
        };

        let runner = Arc::clone(&self.runner);
        let program = self.tools.video.clone();
        let args = request.to_args();
        log::info!(
            "Opening video stream at {} ({} ms)",
            request.resolution(),
            request.timeout_ms
        );

        let stream = self.runtime.spawn(async move {
            let _teardown = teardown;
            match runner.run(&program, &args, &mut on_data, &session).await {
                Ok(0) => log::info!("Video stream ended"),
                Ok(code) if session.is_cancelled() => {
                    log::info!("Video stream closed ({} exited with code {})", program, code)
                }
                Ok(code) => log::warn!("{} exited with code {}", program, code),
                Err(e) => log::error!("Video stream failed: {}", e),
            }
        });

        // Only watch the task for a panic; teardown already ran during unwind
        self.runtime.spawn(async move {
            if let Err(e) = stream.await {
                if e.is_panic() {
                    log::error!("Video stream task panicked: {}", e);
                }
            }
        });

        Ok(())
    }

    /// Start an indefinite 1920x1080 stream without preview.
    pub fn open_default_video_stream<F>(
        &self,
        on_data: F,
        on_exit: Option<ExitCallback>,
    ) -> Result<(), CameraError>
    where
        F: FnMut(&[u8]) + Send + 'static,
    {
        self.open_video_stream(VideoStreamRequest::default(), on_data, on_exit)
    }

    /// Signal the active video stream to stop.
    ///
    /// Returns `true` if this call fired the session's cancellation signal.
    /// Does nothing when no video stream is active or it is already closing.
    pub fn close_video_stream(&self) -> bool {
        let access = self.access.lock();
        match &*access {
            Access::Video(session) => {
                let fired = session.cancel();
                if fired {
                    log::info!("Closing video stream");
                }
                fired
            }
            _ => false,
        }
    }
}
