//! Error types for camera operations.

/// Errors that can occur while coordinating access to the camera.
#[derive(Debug, thiserror::Error)]
pub enum CameraError {
    /// Another still capture or video stream currently owns the camera
    #[error("Camera is busy with another capture or stream")]
    ResourceBusy,

    /// A numeric request setting is outside its valid range
    #[error("Invalid camera configuration: {field} = {value}")]
    InvalidConfig {
        /// Name of the offending setting
        field: &'static str,
        /// The rejected value
        value: i64,
    },

    /// An OS-level failure while talking to the camera tools
    #[error("Camera hardware failure (error {code}){}", format_extension(.extension))]
    HardwareFailure {
        /// Platform error code
        code: i32,
        /// Human-readable description, empty when the lookup failed
        extension: String,
    },

    /// The capture program is not installed or not on PATH
    #[error("Capture tool '{program}' not found. Is the camera software installed?")]
    ToolNotFound {
        /// Program that failed to spawn
        program: String,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn format_extension(extension: &str) -> String {
    if extension.is_empty() {
        String::new()
    } else {
        format!(": {}", extension)
    }
}

impl CameraError {
    /// Build a hardware failure for a platform error code.
    ///
    /// The description is looked up on a best-effort basis.
    pub fn hardware(code: i32) -> Self {
        CameraError::HardwareFailure {
            code,
            extension: os_error_string(code),
        }
    }

    /// Classify an I/O error raised while spawning `program`.
    pub fn from_spawn(program: &str, err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::NotFound {
            return CameraError::ToolNotFound {
                program: program.to_string(),
            };
        }
        Self::from_os(err)
    }

    /// Map an I/O error to a hardware failure when it carries an OS code.
    pub fn from_os(err: std::io::Error) -> Self {
        match err.raw_os_error() {
            Some(code) => Self::hardware(code),
            None => CameraError::Io(err),
        }
    }
}

/// Look up the human-readable description of a platform error code.
///
/// Lookup failures are logged and yield an empty string.
#[cfg(unix)]
pub fn os_error_string(code: i32) -> String {
    let mut buf = [0 as libc::c_char; 256];
    // SAFETY: buf is writable for buf.len() bytes and strerror_r NUL-terminates on success.
    let rc = unsafe { libc::strerror_r(code, buf.as_mut_ptr(), buf.len()) };
    if rc != 0 {
        log::debug!("No description available for OS error {}", code);
        return String::new();
    }
    // SAFETY: strerror_r succeeded, so buf holds a NUL-terminated string.
    let description = unsafe { std::ffi::CStr::from_ptr(buf.as_ptr()) };
    description.to_string_lossy().into_owned()
}

#[cfg(not(unix))]
pub fn os_error_string(code: i32) -> String {
    let message = std::io::Error::from_raw_os_error(code).to_string();
    // std appends " (os error N)", which is already carried by the code
    match message.rfind(" (os error") {
        Some(idx) => message[..idx].to_string(),
        None => message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_busy_display() {
        let msg = format!("{}", CameraError::ResourceBusy);
        assert!(msg.contains("busy"));
    }

    #[test]
    fn test_invalid_config_display() {
        let err = CameraError::InvalidConfig {
            field: "timeout_ms",
            value: -1,
        };
        assert_eq!(
            format!("{}", err),
            "Invalid camera configuration: timeout_ms = -1"
        );
    }

    #[test]
    fn test_hardware_failure_with_extension() {
        let err = CameraError::HardwareFailure {
            code: 5,
            extension: "Input/output error".to_string(),
        };
        assert_eq!(
            format!("{}", err),
            "Camera hardware failure (error 5): Input/output error"
        );
    }

    #[test]
    fn test_hardware_failure_without_extension() {
        let err = CameraError::HardwareFailure {
            code: 5,
            extension: String::new(),
        };
        assert_eq!(format!("{}", err), "Camera hardware failure (error 5)");
    }

    #[test]
    fn test_from_spawn_not_found() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        match CameraError::from_spawn("raspistill", io) {
            CameraError::ToolNotFound { program } => assert_eq!(program, "raspistill"),
            other => panic!("Expected ToolNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_from_os_without_code_is_io() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "pipe closed");
        assert!(matches!(CameraError::from_os(io), CameraError::Io(_)));
    }

    #[cfg(unix)]
    #[test]
    fn test_from_os_with_code_is_hardware_failure() {
        let io = std::io::Error::from_raw_os_error(libc::EIO);
        match CameraError::from_os(io) {
            CameraError::HardwareFailure { code, .. } => assert_eq!(code, libc::EIO),
            other => panic!("Expected HardwareFailure, got {:?}", other),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_os_error_string_known_code() {
        let description = os_error_string(libc::ENOENT);
        assert!(description.contains("No such file"));
    }

    #[test]
    fn test_os_error_string_unknown_code_does_not_panic() {
        // May be empty or a generic "Unknown error" depending on the platform
        let _ = os_error_string(987_654);
    }
}
