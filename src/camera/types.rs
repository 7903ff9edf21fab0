//! Capture request types shared by still capture and video streaming.

use serde::Deserialize;
use std::fmt;

/// Capture resolution in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    /// 640x480
    pub const VGA: Resolution = Resolution {
        width: 640,
        height: 480,
    };

    /// 1280x720
    pub const HD: Resolution = Resolution {
        width: 1280,
        height: 720,
    };

    /// 1920x1080, the default for video streams
    pub const FULL_HD: Resolution = Resolution {
        width: 1920,
        height: 1080,
    };

    /// Full sensor resolution of the v2 camera module (3280x2464)
    pub const SENSOR_V2: Resolution = Resolution {
        width: 3280,
        height: 2464,
    };

    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Output image encoding for still captures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageEncoding {
    #[default]
    Jpg,
    Bmp,
    Gif,
    Png,
}

impl ImageEncoding {
    /// Value passed to the still tool's `-e` flag.
    pub fn as_arg(&self) -> &'static str {
        match self {
            ImageEncoding::Jpg => "jpg",
            ImageEncoding::Bmp => "bmp",
            ImageEncoding::Gif => "gif",
            ImageEncoding::Png => "png",
        }
    }
}

/// Exposure mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExposureMode {
    Off,
    #[default]
    Auto,
    Night,
    Backlight,
    Spotlight,
    Sports,
    Snow,
    Beach,
    Fireworks,
}

impl ExposureMode {
    pub fn as_arg(&self) -> &'static str {
        match self {
            ExposureMode::Off => "off",
            ExposureMode::Auto => "auto",
            ExposureMode::Night => "night",
            ExposureMode::Backlight => "backlight",
            ExposureMode::Spotlight => "spotlight",
            ExposureMode::Sports => "sports",
            ExposureMode::Snow => "snow",
            ExposureMode::Beach => "beach",
            ExposureMode::Fireworks => "fireworks",
        }
    }
}

/// Automatic white balance mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WhiteBalanceMode {
    Off,
    #[default]
    Auto,
    Sun,
    Cloud,
    Shade,
    Tungsten,
    Fluorescent,
    Incandescent,
    Flash,
    Horizon,
}

impl WhiteBalanceMode {
    pub fn as_arg(&self) -> &'static str {
        match self {
            WhiteBalanceMode::Off => "off",
            WhiteBalanceMode::Auto => "auto",
            WhiteBalanceMode::Sun => "sun",
            WhiteBalanceMode::Cloud => "cloud",
            WhiteBalanceMode::Shade => "shade",
            WhiteBalanceMode::Tungsten => "tungsten",
            WhiteBalanceMode::Fluorescent => "fluorescent",
            WhiteBalanceMode::Incandescent => "incandescent",
            WhiteBalanceMode::Flash => "flash",
            WhiteBalanceMode::Horizon => "horizon",
        }
    }
}

/// Image effect applied by the camera firmware.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageEffect {
    #[default]
    None,
    Negative,
    Solarise,
    Sketch,
    Denoise,
    Emboss,
    Cartoon,
}

impl ImageEffect {
    pub fn as_arg(&self) -> &'static str {
        match self {
            ImageEffect::None => "none",
            ImageEffect::Negative => "negative",
            ImageEffect::Solarise => "solarise",
            ImageEffect::Sketch => "sketch",
            ImageEffect::Denoise => "denoise",
            ImageEffect::Emboss => "emboss",
            ImageEffect::Cartoon => "cartoon",
        }
    }
}

/// Metering mode used for exposure calculation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeteringMode {
    #[default]
    Average,
    Spot,
    Backlit,
    Matrix,
}

impl MeteringMode {
    pub fn as_arg(&self) -> &'static str {
        match self {
            MeteringMode::Average => "average",
            MeteringMode::Spot => "spot",
            MeteringMode::Backlit => "backlit",
            MeteringMode::Matrix => "matrix",
        }
    }
}

/// H.264 profile for video streams.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum H264Profile {
    Baseline,
    Main,
    #[default]
    High,
}

impl H264Profile {
    pub fn as_arg(&self) -> &'static str {
        match self {
            H264Profile::Baseline => "baseline",
            H264Profile::Main => "main",
            H264Profile::High => "high",
        }
    }
}

/// Picture settings common to stills and video.
///
/// Defaults match the capture tools' own defaults, so an untouched
/// `ImageAdjustments` adds no arguments.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ImageAdjustments {
    /// -100..=100
    pub sharpness: i32,
    /// -100..=100
    pub contrast: i32,
    /// 0..=100
    pub brightness: i32,
    /// -100..=100
    pub saturation: i32,
    /// Sensor ISO (100-800), `None` for automatic
    pub iso: Option<u32>,
    pub exposure: ExposureMode,
    pub white_balance: WhiteBalanceMode,
    pub effect: ImageEffect,
    pub metering: MeteringMode,
    /// 0, 90, 180 or 270 degrees
    pub rotation: u32,
    pub horizontal_flip: bool,
    pub vertical_flip: bool,
}

impl Default for ImageAdjustments {
    fn default() -> Self {
        Self {
            sharpness: 0,
            contrast: 0,
            brightness: 50,
            saturation: 0,
            iso: None,
            exposure: ExposureMode::default(),
            white_balance: WhiteBalanceMode::default(),
            effect: ImageEffect::default(),
            metering: MeteringMode::default(),
            rotation: 0,
            horizontal_flip: false,
            vertical_flip: false,
        }
    }
}

/// Settings for a single still capture.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct StillCaptureRequest {
    pub width: u32,
    pub height: u32,
    /// Encoder quality, 0..=100 (JPEG only)
    pub quality: u32,
    /// Time the tool runs before taking the picture. Must be positive.
    pub timeout_ms: i64,
    /// Show the on-screen preview window
    pub preview: bool,
    pub encoding: ImageEncoding,
    pub adjustments: ImageAdjustments,
}

impl Default for StillCaptureRequest {
    fn default() -> Self {
        Self {
            width: Resolution::SENSOR_V2.width,
            height: Resolution::SENSOR_V2.height,
            quality: 90,
            timeout_ms: 300,
            preview: false,
            encoding: ImageEncoding::Jpg,
            adjustments: ImageAdjustments::default(),
        }
    }
}

impl StillCaptureRequest {
    /// JPEG capture at quality 90 with a 300ms timeout.
    pub fn jpeg(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            quality: 90,
            timeout_ms: 300,
            encoding: ImageEncoding::Jpg,
            ..Self::default()
        }
    }

    pub fn resolution(&self) -> Resolution {
        Resolution::new(self.width, self.height)
    }
}

/// Settings for a video stream.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct VideoStreamRequest {
    pub width: u32,
    pub height: u32,
    /// Stream duration. 0 streams until cancelled; negative is invalid.
    pub timeout_ms: i64,
    /// Show the on-screen preview window
    pub preview: bool,
    /// Target bitrate in bits per second
    pub bitrate: u32,
    pub framerate: u32,
    pub profile: H264Profile,
    /// Frames between I-frames, `None` to let the encoder decide
    pub intra_period: Option<u32>,
    /// Repeat SPS/PPS headers on every I-frame so a reader can join mid-stream
    pub inline_headers: bool,
    pub adjustments: ImageAdjustments,
}

impl Default for VideoStreamRequest {
    fn default() -> Self {
        Self {
            width: Resolution::FULL_HD.width,
            height: Resolution::FULL_HD.height,
            timeout_ms: 0,
            preview: false,
            bitrate: 17_000_000,
            framerate: 30,
            profile: H264Profile::High,
            intra_period: None,
            inline_headers: true,
            adjustments: ImageAdjustments::default(),
        }
    }
}

impl VideoStreamRequest {
    pub fn resolution(&self) -> Resolution {
        Resolution::new(self.width, self.height)
    }
}
