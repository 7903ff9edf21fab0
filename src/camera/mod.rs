//! Camera access for the still and video capture tools.
//!
//! This module provides the high-level API for camera operations:
//! - Exclusive access coordination via [`CameraController`]
//! - Capture settings via [`StillCaptureRequest`] and [`VideoStreamRequest`]
//! - Tool argument construction via the requests' `to_args` methods

mod args;
mod controller;
mod types;

pub use controller::{AccessMode, CameraController, ExitCallback, ToolPaths};
pub use types::{
    ExposureMode, H264Profile, ImageAdjustments, ImageEffect, ImageEncoding, MeteringMode,
    Resolution, StillCaptureRequest, VideoStreamRequest, WhiteBalanceMode,
};
