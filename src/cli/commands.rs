//! Subcommand handlers for still capture, video recording and config actions.

use std::error::Error;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use picam_control::camera::ExitCallback;
use picam_control::config::{default_path, Config, DEFAULT_CONFIG};
use picam_control::{CameraController, CancelToken, StillCaptureRequest, VideoStreamRequest};
use tokio::runtime::Handle;
use tokio::sync::oneshot;

use super::args::{ConfigAction, StillArgs, VideoArgs};

/// Apply command-line overrides on top of the configured still settings.
pub fn still_request(config: &Config, args: &StillArgs) -> StillCaptureRequest {
    let mut request = config.still.clone();
    if let Some(width) = args.width {
        request.width = width;
    }
    if let Some(height) = args.height {
        request.height = height;
    }
    if let Some(quality) = args.quality {
        request.quality = quality;
    }
    if let Some(timeout_ms) = args.timeout_ms {
        request.timeout_ms = timeout_ms;
    }
    if let Some(encoding) = args.encoding {
        request.encoding = encoding.into();
    }
    request.preview = request.preview || args.preview;
    request
}

/// Apply command-line overrides on top of the configured video settings.
pub fn video_request(config: &Config, args: &VideoArgs) -> VideoStreamRequest {
    let mut request = config.video.clone();
    if let Some(width) = args.width {
        request.width = width;
    }
    if let Some(height) = args.height {
        request.height = height;
    }
    if let Some(secs) = args.duration_secs {
        request.timeout_ms = i64::try_from(secs.saturating_mul(1000)).unwrap_or(i64::MAX);
    }
    if let Some(bitrate) = args.bitrate {
        request.bitrate = bitrate;
    }
    if let Some(framerate) = args.framerate {
        request.framerate = framerate;
    }
    if let Some(profile) = args.profile {
        request.profile = profile.into();
    }
    request.preview = request.preview || args.preview;
    request
}

/// Capture one still and write it to the output file.
pub async fn run_still(config: &Config, args: StillArgs) -> Result<(), Box<dyn Error>> {
    let camera = CameraController::system(config.tools.clone(), Handle::current());
    let request = still_request(config, &args);

    let cancel = CancelToken::new();
    let on_ctrlc = cancel.clone();
    ctrlc::set_handler(move || {
        eprintln!("\nReceived Ctrl+C, cancelling capture...");
        on_ctrlc.cancel();
    })?;

    let image = camera.capture_still(&request, &cancel).await?;
    if image.is_empty() {
        return Err(format!(
            "{} produced no image (cancelled or failed, run with RUST_LOG=debug for details)",
            camera.tools().still
        )
        .into());
    }

    std::fs::write(&args.output, &image)?;
    println!(
        "Saved {} ({} bytes, {})",
        args.output.display(),
        image.len(),
        request.resolution()
    );
    Ok(())
}

/// Record the video stream into the output file until it ends or Ctrl+C.
pub async fn run_video(config: &Config, args: VideoArgs) -> Result<(), Box<dyn Error>> {
    let camera = Arc::new(CameraController::system(
        config.tools.clone(),
        Handle::current(),
    ));
    let request = video_request(config, &args);

    let writer = Arc::new(Mutex::new(BufWriter::new(File::create(&args.output)?)));
    let written = Arc::new(AtomicU64::new(0));
    let (exit_tx, exit_rx) = oneshot::channel();

    let sink = Arc::clone(&writer);
    let counter = Arc::clone(&written);
    let on_data = move |chunk: &[u8]| {
        let mut out = match sink.lock() {
            Ok(out) => out,
            Err(_) => return,
        };
        match out.write_all(chunk) {
            Ok(()) => {
                counter.fetch_add(chunk.len() as u64, Ordering::Relaxed);
            }
            Err(e) => log::error!("Failed to write video data: {}", e),
        }
    };
    let on_exit: ExitCallback = Box::new(move || {
        let _ = exit_tx.send(());
    });

    let stopper = Arc::clone(&camera);
    ctrlc::set_handler(move || {
        eprintln!("\nReceived Ctrl+C, stopping stream...");
        stopper.close_video_stream();
    })?;

    camera.open_video_stream(request.clone(), on_data, Some(on_exit))?;
    if request.timeout_ms == 0 {
        println!(
            "Recording {} to {} (Ctrl+C to stop)",
            request.resolution(),
            args.output.display()
        );
    } else {
        println!(
            "Recording {} to {} for {} ms",
            request.resolution(),
            args.output.display(),
            request.timeout_ms
        );
    }

    // The sender is dropped with the stream task if on_exit never ran
    let _ = exit_rx.await;

    match writer.lock() {
        Ok(mut out) => out.flush()?,
        Err(_) => return Err("video writer lock poisoned".into()),
    }

    let bytes = written.load(Ordering::Relaxed);
    if bytes == 0 {
        return Err(format!(
            "{} produced no video data (run with RUST_LOG=debug for details)",
            camera.tools().video
        )
        .into());
    }
    println!("Saved {} ({} bytes)", args.output.display(), bytes);
    Ok(())
}

/// Handle config subcommand actions.
pub fn handle_config_action(
    action: ConfigAction,
    explicit_path: Option<&Path>,
    config: &Config,
) -> Result<(), Box<dyn Error>> {
    let config_path = explicit_path
        .map(Path::to_path_buf)
        .unwrap_or_else(default_path);

    match action {
        ConfigAction::Show => {
            println!("Current configuration:");
            println!("  Still tool: {}", config.tools.still);
            println!("  Video tool: {}", config.tools.video);
            println!(
                "  Still: {} {} q{} ({} ms)",
                config.still.resolution(),
                config.still.encoding.as_arg(),
                config.still.quality,
                config.still.timeout_ms
            );
            println!(
                "  Video: {} @ {} fps, {} bps, {} profile",
                config.video.resolution(),
                config.video.framerate,
                config.video.bitrate,
                config.video.profile.as_arg()
            );
            println!();

            if config_path.exists() {
                println!("Config file: {} (exists)", config_path.display());
            } else {
                println!("Config file: {} (not found)", config_path.display());
            }
            Ok(())
        }
        ConfigAction::Init => {
            if config_path.exists() {
                return Err(format!(
                    "Config file already exists: {}\nUse 'picam config show' to view current settings.",
                    config_path.display()
                )
                .into());
            }

            // Create parent directories if needed
            if let Some(parent) = config_path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&config_path, DEFAULT_CONFIG)?;

            println!("Created config file: {}", config_path.display());
            Ok(())
        }
    }
}
