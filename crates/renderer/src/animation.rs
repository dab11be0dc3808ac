//! Frame sequences assembled into animated GIFs and MP4 videos.
//!
//! GIFs are encoded in-process with the `image` crate; MP4 encoding shells
//! out to `ffmpeg` (libx264, yuv420p) over PNG frames written to a temporary
//! directory.

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Instant;

use image::codecs::gif::{GifEncoder, Repeat};
use image::{Delay, Frame, RgbaImage};
use tracing::{debug, info};

use crate::error::{RenderError, RenderResult};
use crate::png::create_png_auto;

/// Ordered frames played at a fixed rate.
#[derive(Debug, Clone)]
pub struct Animation {
    frames: Vec<RgbaImage>,
    fps: u32,
}

impl Animation {
    pub fn new(fps: u32) -> Self {
        Self {
            frames: Vec::new(),
            fps: fps.max(1),
        }
    }

    pub fn with_frames(frames: Vec<RgbaImage>, fps: u32) -> Self {
        Self {
            frames,
            fps: fps.max(1),
        }
    }

    pub fn push(&mut self, frame: RgbaImage) {
        self.frames.push(frame);
    }

    pub fn frames(&self) -> &[RgbaImage] {
        &self.frames
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn fps(&self) -> u32 {
        self.fps
    }

    /// Display time of one frame.
    pub fn frame_delay(&self) -> Delay {
        Delay::from_numer_denom_ms(1000, self.fps)
    }

    /// Encode an animated GIF that loops forever.
    pub fn write_gif(&self, path: &Path) -> RenderResult<()> {
        if self.frames.is_empty() {
            return Err(RenderError::NoFrames);
        }
        let start = Instant::now();
        let file = BufWriter::new(File::create(path)?);
        let mut encoder = GifEncoder::new_with_speed(file, 10);
        encoder.set_repeat(Repeat::Infinite)?;

        let delay = self.frame_delay();
        encoder.encode_frames(
            self.frames
                .iter()
                .map(|img| Frame::from_parts(img.clone(), 0, 0, delay)),
        )?;

        info!(
            path = %path.display(),
            frames = self.frames.len(),
            fps = self.fps,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Wrote GIF"
        );
        Ok(())
    }

    /// Encode an H.264 MP4 through `ffmpeg`.
    pub fn write_mp4(&self, path: &Path, ffmpeg: &str) -> RenderResult<()> {
        if self.frames.is_empty() {
            return Err(RenderError::NoFrames);
        }
        let start = Instant::now();
        let workdir = tempfile::tempdir()?;
        for (i, frame) in self.frames.iter().enumerate() {
            let png = create_png_auto(frame.as_raw(), frame.width() as usize, frame.height() as usize)?;
            std::fs::write(workdir.path().join(frame_file_name(i)), png)?;
        }

        let output = Command::new(ffmpeg)
            .arg("-y")
            .args(["-loglevel", "error"])
            .args(["-framerate", &self.fps.to_string()])
            .arg("-i")
            .arg(workdir.path().join("frame_%05d.png"))
            .args(["-c:v", "libx264", "-pix_fmt", "yuv420p"])
            // libx264 needs even dimensions
            .args(["-vf", "pad=ceil(iw/2)*2:ceil(ih/2)*2"])
            .arg(path)
            .output()
            .map_err(|e| RenderError::Ffmpeg(format!("failed to launch '{}': {}", ffmpeg, e)))?;

        if !output.status.success() {
            return Err(RenderError::Ffmpeg(format!(
                "{} exited with {}: {}",
                ffmpeg,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        info!(
            path = %path.display(),
            frames = self.frames.len(),
            fps = self.fps,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Wrote MP4"
        );
        Ok(())
    }
}

/// File name of the `i`-th frame handed to ffmpeg.
pub fn frame_file_name(i: usize) -> String {
    format!("frame_{:05}.png", i)
}

/// Decode previously written frame images, in order.
///
/// Every path must exist; the first missing one aborts the load.
pub fn load_frames(paths: &[PathBuf]) -> RenderResult<Vec<RgbaImage>> {
    let mut frames = Vec::with_capacity(paths.len());
    for path in paths {
        if !path.is_file() {
            return Err(RenderError::MissingFrame(path.clone()));
        }
        let img = image::open(path)?.to_rgba8();
        debug!(path = %path.display(), width = img.width(), height = img.height(), "Loaded frame");
        frames.push(img);
    }
    Ok(frames)
}
