//! Command-line argument construction for the still and video capture tools.
//!
//! Output always goes to stdout (`-o -`) so the controller can pump it.

use super::types::{
    ExposureMode, ImageAdjustments, ImageEffect, MeteringMode, StillCaptureRequest,
    VideoStreamRequest, WhiteBalanceMode,
};

impl ImageAdjustments {
    /// Arguments for every setting that differs from the tool defaults.
    pub fn to_args(&self) -> Vec<String> {
        let defaults = ImageAdjustments::default();
        let mut args = Vec::new();

        let mut push = |flag: &str, value: String| {
            args.push(flag.to_string());
            args.push(value);
        };

        if self.sharpness != defaults.sharpness {
            push("-sh", self.sharpness.clamp(-100, 100).to_string());
        }
        if self.contrast != defaults.contrast {
            push("-co", self.contrast.clamp(-100, 100).to_string());
        }
        if self.brightness != defaults.brightness {
            push("-br", self.brightness.clamp(0, 100).to_string());
        }
        if self.saturation != defaults.saturation {
            push("-sa", self.saturation.clamp(-100, 100).to_string());
        }
        if let Some(iso) = self.iso {
            push("-ISO", iso.clamp(100, 800).to_string());
        }
        if self.exposure != ExposureMode::default() {
            push("-ex", self.exposure.as_arg().to_string());
        }
        if self.white_balance != WhiteBalanceMode::default() {
            push("-awb", self.white_balance.as_arg().to_string());
        }
        if self.effect != ImageEffect::default() {
            push("-ifx", self.effect.as_arg().to_string());
        }
        if self.metering != MeteringMode::default() {
            push("-mm", self.metering.as_arg().to_string());
        }
        // Tools only accept quarter turns
        let rotation = (self.rotation / 90 % 4) * 90;
        if rotation != 0 {
            push("-rot", rotation.to_string());
        }

        if self.horizontal_flip {
            args.push("-hf".to_string());
        }
        if self.vertical_flip {
            args.push("-vf".to_string());
        }
        args
    }
}

impl StillCaptureRequest {
    /// Arguments for the still capture tool.
    pub fn to_args(&self) -> Vec<String> {
        let mut args = vec![
            "-o".to_string(),
            "-".to_string(),
            "-t".to_string(),
            self.timeout_ms.max(0).to_string(),
            "-w".to_string(),
            self.width.to_string(),
            "-h".to_string(),
            self.height.to_string(),
            "-e".to_string(),
            self.encoding.as_arg().to_string(),
            "-q".to_string(),
            self.quality.min(100).to_string(),
        ];
        if !self.preview {
            args.push("-n".to_string());
        }
        args.extend(self.adjustments.to_args());
        args
    }
}

impl VideoStreamRequest {
    /// Arguments for the video capture tool.
    pub fn to_args(&self) -> Vec<String> {
        let mut args = vec![
            "-o".to_string(),
            "-".to_string(),
            "-t".to_string(),
            self.timeout_ms.max(0).to_string(),
            "-w".to_string(),
            self.width.to_string(),
            "-h".to_string(),
            self.height.to_string(),
            "-b".to_string(),
            self.bitrate.to_string(),
            "-fps".to_string(),
            self.framerate.to_string(),
            "-pf".to_string(),
            self.profile.as_arg().to_string(),
        ];
        if let Some(period) = self.intra_period {
            args.push("-g".to_string());
            args.push(period.to_string());
        }
        if self.inline_headers {
            args.push("-ih".to_string());
        }
        if !self.preview {
            args.push("-n".to_string());
        }
        args.extend(self.adjustments.to_args());
        args
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::types::{H264Profile, ImageEncoding};

    /// Find the value following `flag` in an argument list.
    fn value_of<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
        args.iter()
            .position(|a| a == flag)
            .and_then(|i| args.get(i + 1))
            .map(String::as_str)
    }

    #[test]
    fn test_default_adjustments_produce_no_args() {
        assert!(ImageAdjustments::default().to_args().is_empty());
    }

    #[test]
    fn test_adjustments_emit_changed_values() {
        let adjustments = ImageAdjustments {
            contrast: 20,
            iso: Some(400),
            exposure: ExposureMode::Night,
            rotation: 270,
            vertical_flip: true,
            ..ImageAdjustments::default()
        };
        let args = adjustments.to_args();
        assert_eq!(value_of(&args, "-co"), Some("20"));
        assert_eq!(value_of(&args, "-ISO"), Some("400"));
        assert_eq!(value_of(&args, "-ex"), Some("night"));
        assert_eq!(value_of(&args, "-rot"), Some("270"));
        assert!(args.contains(&"-vf".to_string()));
        assert!(!args.contains(&"-hf".to_string()));
        assert!(!args.contains(&"-br".to_string()));
    }

    #[test]
    fn test_adjustments_clamp_out_of_range() {
        let adjustments = ImageAdjustments {
            sharpness: 500,
            brightness: -10,
            iso: Some(3200),
            ..ImageAdjustments::default()
        };
        let args = adjustments.to_args();
        assert_eq!(value_of(&args, "-sh"), Some("100"));
        assert_eq!(value_of(&args, "-br"), Some("0"));
        assert_eq!(value_of(&args, "-ISO"), Some("800"));
    }

    #[test]
    fn test_rotation_snaps_to_quarter_turns() {
        let adjustments = ImageAdjustments {
            rotation: 450,
            ..ImageAdjustments::default()
        };
        assert_eq!(value_of(&adjustments.to_args(), "-rot"), Some("90"));
    }

    #[test]
    fn test_still_args_write_to_stdout() {
        let args = StillCaptureRequest::jpeg(640, 480).to_args();
        assert_eq!(value_of(&args, "-o"), Some("-"));
        assert_eq!(value_of(&args, "-t"), Some("300"));
        assert_eq!(value_of(&args, "-w"), Some("640"));
        assert_eq!(value_of(&args, "-h"), Some("480"));
        assert_eq!(value_of(&args, "-q"), Some("90"));
        assert_eq!(value_of(&args, "-e"), Some("jpg"));
        assert!(args.contains(&"-n".to_string()));
    }

    #[test]
    fn test_still_args_with_preview_and_png() {
        let request = StillCaptureRequest {
            preview: true,
            encoding: ImageEncoding::Png,
            ..StillCaptureRequest::default()
        };
        let args = request.to_args();
        assert!(!args.contains(&"-n".to_string()));
        assert_eq!(value_of(&args, "-e"), Some("png"));
    }

    #[test]
    fn test_video_args_default() {
        let args = VideoStreamRequest::default().to_args();
        assert_eq!(value_of(&args, "-o"), Some("-"));
        assert_eq!(value_of(&args, "-t"), Some("0"));
        assert_eq!(value_of(&args, "-w"), Some("1920"));
        assert_eq!(value_of(&args, "-h"), Some("1080"));
        assert_eq!(value_of(&args, "-fps"), Some("30"));
        assert_eq!(value_of(&args, "-pf"), Some("high"));
        assert!(args.contains(&"-ih".to_string()));
        assert!(args.contains(&"-n".to_string()));
        assert!(!args.contains(&"-g".to_string()));
    }

    #[test]
    fn test_video_args_intra_period_and_profile() {
        let request = VideoStreamRequest {
            intra_period: Some(15),
            profile: H264Profile::Baseline,
            inline_headers: false,
            ..VideoStreamRequest::default()
        };
        let args = request.to_args();
        assert_eq!(value_of(&args, "-g"), Some("15"));
        assert_eq!(value_of(&args, "-pf"), Some("baseline"));
        assert!(!args.contains(&"-ih".to_string()));
    }
}
