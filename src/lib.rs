//! picam-control library crate.
//!
//! Coordinates exclusive access to a single-board computer camera driven by
//! the external still (`raspistill`) and video (`raspivid`) capture tools.

pub mod camera;
pub mod cancel;
pub mod config;
pub mod error;
pub mod process;

pub use camera::{CameraController, StillCaptureRequest, VideoStreamRequest};
pub use cancel::CancelToken;
pub use error::CameraError;
pub use process::{ProcessRunner, SystemProcessRunner};
