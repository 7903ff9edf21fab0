//! CLI argument parsing with clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use super::enums::{Encoding, Profile};

/// Capture stills and video from the Raspberry Pi camera
#[derive(Parser, Debug)]
#[command(name = "picam")]
#[command(version, about = "Still and video capture for the Raspberry Pi camera", long_about = None)]
#[command(after_help = "EXAMPLES:
    # Take a full-resolution JPEG
    picam still -o photo.jpg

    # Small PNG, rotated by the config file settings
    picam still -o thumb.png --width 640 --height 480 --encoding png

    # Record 10 seconds of 720p video
    picam video -o clip.h264 --width 1280 --height 720 --duration-secs 10

    # Record until Ctrl+C
    picam video -o stream.h264")]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Config file path (default: ~/.config/picam-control/config.toml)
    #[arg(long, short, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Capture a single still image
    Still(StillArgs),
    /// Record the video stream to a file
    Video(VideoArgs),
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Options for `picam still`. Unset options come from the config file.
#[derive(clap::Args, Debug)]
pub struct StillArgs {
    /// Output file
    #[arg(long, short, default_value = "capture.jpg")]
    pub output: PathBuf,

    /// Image width in pixels
    #[arg(long)]
    pub width: Option<u32>,

    /// Image height in pixels
    #[arg(long)]
    pub height: Option<u32>,

    /// JPEG quality (0-100)
    #[arg(long, short, value_parser = clap::value_parser!(u32).range(0..=100))]
    pub quality: Option<u32>,

    /// Milliseconds before the picture is taken
    #[arg(long, allow_negative_numbers = true)]
    pub timeout_ms: Option<i64>,

    /// Image encoding
    #[arg(long, short)]
    pub encoding: Option<Encoding>,

    /// Show the preview window while capturing
    #[arg(long)]
    pub preview: bool,
}

/// Options for `picam video`. Unset options come from the config file.
#[derive(clap::Args, Debug)]
pub struct VideoArgs {
    /// Output file for the raw H.264 stream
    #[arg(long, short, default_value = "capture.h264")]
    pub output: PathBuf,

    /// Frame width in pixels
    #[arg(long)]
    pub width: Option<u32>,

    /// Frame height in pixels
    #[arg(long)]
    pub height: Option<u32>,

    /// Recording length in seconds (0 = until Ctrl+C)
    #[arg(long, short)]
    pub duration_secs: Option<u64>,

    /// Target bitrate in bits per second
    #[arg(long, short)]
    pub bitrate: Option<u32>,

    /// Frames per second
    #[arg(long, short, value_parser = clap::value_parser!(u32).range(1..=120))]
    pub framerate: Option<u32>,

    /// H.264 profile
    #[arg(long, short)]
    pub profile: Option<Profile>,

    /// Show the preview window while recording
    #[arg(long)]
    pub preview: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigAction {
    /// Show current configuration
    Show,
    /// Create default config file
    Init,
}
