//! Frame sources: numbered image sequences and a synthetic test pattern.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::VideoError;
use crate::frame::{hsv_to_rgb, Frame};

/// Supplier of decoded frames at a fixed frame rate.
pub trait FrameSource {
    fn fps(&self) -> f64;

    /// Total frames, when known up front.
    fn frame_count(&self) -> Option<u64>;

    /// The next frame, `Ok(None)` once the source is exhausted. A decode
    /// failure mid-stream is an error, not end-of-stream.
    fn next_frame(&mut self) -> Result<Option<Frame>, VideoError>;
}

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];

/// Numbered image files in a directory, played back in filename order.
pub struct ImageSequenceSource {
    paths: Vec<PathBuf>,
    cursor: usize,
    fps: f64,
}

impl ImageSequenceSource {
    /// Scan `dir` for image files. Fails when the directory is unreadable
    /// or holds no frames; individual files are decoded lazily.
    pub fn open(dir: impl AsRef<Path>, fps: f64) -> Result<Self, VideoError> {
        let dir = dir.as_ref();
        let entries = fs::read_dir(dir).map_err(|source| VideoError::Io {
            path: dir.to_path_buf(),
            source,
        })?;

        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| VideoError::Io {
                path: dir.to_path_buf(),
                source,
            })?;
            let path = entry.path();
            let is_image = path
                .extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
                .unwrap_or(false);
            if is_image {
                paths.push(path);
            }
        }
        if paths.is_empty() {
            return Err(VideoError::EmptySequence(dir.to_path_buf()));
        }
        paths.sort();

        Ok(Self {
            paths,
            cursor: 0,
            fps,
        })
    }
}

impl FrameSource for ImageSequenceSource {
    fn fps(&self) -> f64 {
        self.fps
    }

    fn frame_count(&self) -> Option<u64> {
        Some(self.paths.len() as u64)
    }

    fn next_frame(&mut self) -> Result<Option<Frame>, VideoError> {
        let path = match self.paths.get(self.cursor) {
            Some(path) => path.clone(),
            None => return Ok(None),
        };
        self.cursor += 1;

        let image = image::open(&path)
            .map_err(|source| VideoError::Decode { path, source })?
            .to_rgb8();
        Ok(Some(Frame::from(image)))
    }
}

/// Procedural scrolling pattern for tests and the CLI demo.
///
/// A horizontal brightness sinusoid translates by `scroll` pixels per frame
/// (driving motion energy) while the hue drifts slowly around the circle
/// (driving scale changes).
pub struct SyntheticSource {
    width: u32,
    height: u32,
    fps: f64,
    total: u64,
    emitted: u64,
    scroll: f64,
    hue_drift: f64,
}

impl SyntheticSource {
    pub fn new(width: u32, height: u32, fps: f64, frames: u64) -> Self {
        Self {
            width,
            height,
            fps,
            total: frames,
            emitted: 0,
            scroll: 2.0,
            hue_drift: 0.002,
        }
    }

    /// Horizontal translation per frame, in pixels.
    pub fn with_scroll(mut self, pixels_per_frame: f64) -> Self {
        self.scroll = pixels_per_frame;
        self
    }

    /// Hue drift per frame, in turns of the hue circle.
    pub fn with_hue_drift(mut self, turns_per_frame: f64) -> Self {
        self.hue_drift = turns_per_frame;
        self
    }

    fn render(&self) -> Frame {
        let hue_base = self.emitted as f64 * self.hue_drift;
        let offset = self.emitted as f64 * self.scroll;
        let mut data = Vec::with_capacity(self.width as usize * self.height as usize * 3);
        for y in 0..self.height {
            let row_level = 0.75 + 0.25 * (y as f64 / self.height.max(1) as f64);
            for x in 0..self.width {
                let phase = (x as f64 + offset) * 0.15;
                let brightness = row_level * (0.55 + 0.4 * phase.sin());
                let hue = hue_base + 0.1 * x as f64 / self.width as f64;
                let (r, g, b) = hsv_to_rgb(hue, 0.7, brightness);
                data.push((r * 255.0).round() as u8);
                data.push((g * 255.0).round() as u8);
                data.push((b * 255.0).round() as u8);
            }
        }
        // Dimensions always match the buffer we just built.
        Frame::from_rgb8(self.width, self.height, data)
            .unwrap_or_else(|_| unreachable!("synthetic buffer sized to its dimensions"))
    }
}

impl FrameSource for SyntheticSource {
    fn fps(&self) -> f64 {
        self.fps
    }

    fn frame_count(&self) -> Option<u64> {
        Some(self.total)
    }

    fn next_frame(&mut self) -> Result<Option<Frame>, VideoError> {
        if self.emitted >= self.total {
            return Ok(None);
        }
        let frame = self.render();
        self.emitted += 1;
        Ok(Some(frame))
    }
}
