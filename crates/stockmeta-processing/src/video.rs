//! First-frame extraction for video assets through an external ffmpeg binary.

use std::path::Path;
use std::process::Stdio;

use image::{ImageFormat, RgbImage};
use stockmeta_core::{AppError, AppResult};
use tokio::process::Command;

use crate::run_blocking;

#[derive(Debug, Clone)]
pub struct FrameExtractor {
    ffmpeg_path: String,
}

impl FrameExtractor {
    pub fn new(ffmpeg_path: impl Into<String>) -> AppResult<Self> {
        let ffmpeg_path = ffmpeg_path.into();
        let dangerous_chars = [';', '&', '|', '$', '`', '\n', '\r'];
        if ffmpeg_path.trim().is_empty() || ffmpeg_path.chars().any(|c| dangerous_chars.contains(&c)) {
            return Err(AppError::Config(format!(
                "Invalid ffmpeg path: {}",
                ffmpeg_path
            )));
        }
        Ok(Self { ffmpeg_path })
    }

    /// Decode the first frame of `input` as an RGB image
    pub async fn first_frame(&self, input: &Path) -> AppResult<RgbImage> {
        let output = Command::new(&self.ffmpeg_path)
            .arg("-v")
            .arg("error")
            .arg("-i")
            .arg(input)
            .args(["-frames:v", "1", "-f", "image2pipe", "-vcodec", "png", "pipe:1"])
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| AppError::Media(format!("Failed to execute ffmpeg: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(AppError::Media(format!(
                "FFmpeg frame extraction failed: {}",
                stderr.trim()
            )));
        }
        if output.stdout.is_empty() {
            return Err(AppError::Media(format!(
                "FFmpeg produced no frame for {}",
                input.display()
            )));
        }

        let bytes = output.stdout;
        run_blocking(move || {
            image::load_from_memory_with_format(&bytes, ImageFormat::Png)
                .map(|img| img.to_rgb8())
                .map_err(|e| AppError::Media(format!("Undecodable video frame: {}", e)))
        })
        .await
    }
}
