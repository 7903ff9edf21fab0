//! CLI enum types for encoding and H.264 profile options.

use clap::ValueEnum;

use picam_control::camera::{H264Profile, ImageEncoding};

/// Still image encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Encoding {
    #[default]
    Jpg,
    Bmp,
    Gif,
    Png,
}

impl From<Encoding> for ImageEncoding {
    fn from(e: Encoding) -> Self {
        match e {
            Encoding::Jpg => ImageEncoding::Jpg,
            Encoding::Bmp => ImageEncoding::Bmp,
            Encoding::Gif => ImageEncoding::Gif,
            Encoding::Png => ImageEncoding::Png,
        }
    }
}

/// H.264 encoder profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Profile {
    Baseline,
    Main,
    #[default]
    High,
}

impl From<Profile> for H264Profile {
    fn from(p: Profile) -> Self {
        match p {
            Profile::Baseline => H264Profile::Baseline,
            Profile::Main => H264Profile::Main,
            Profile::High => H264Profile::High,
        }
    }
}
