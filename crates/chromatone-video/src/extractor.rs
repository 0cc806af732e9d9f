//! Band-parallel per-frame feature extraction.

use rayon::prelude::*;

use chromatone_core::engine::{FeatureSource, FeatureSourceError};
use chromatone_core::smooth::RawFeatures;

use crate::error::VideoError;
use crate::flow::band_mean_flow;
use crate::frame::{Frame, GrayPlane};
use crate::source::FrameSource;

/// Gain on the mean flow magnitude before clamping to [0, 1].
const ENERGY_SCALE: f64 = 1.2;

/// Minimum columns per flow band.
const MIN_BAND_WIDTH: usize = 16;

/// Per-frame feature extractor over a [`FrameSource`].
///
/// Each step computes flow between the previous and current frame across
/// disjoint column bands in parallel, while the next frame is decoded
/// concurrently. One feature sample is produced per frame pair, so an
/// N-frame source yields N-1 samples.
pub struct VideoFeatureExtractor<F: FrameSource> {
    source: F,
    fps: f64,
    width: u32,
    height: u32,
    bands: Vec<(usize, usize)>,
    prev_gray: GrayPlane,
    current: Frame,
    current_gray: GrayPlane,
    /// Count of frames decoded so far, including the two from construction.
    decoded: u64,
    exhausted: bool,
}

impl<F: FrameSource + Send> VideoFeatureExtractor<F> {
    /// Decode the first two frames. Fails when the source cannot supply
    /// them or their dimensions disagree.
    pub fn new(mut source: F) -> Result<Self, VideoError> {
        let fps = source.fps();
        let first = source.next_frame()?.ok_or(VideoError::TooShort)?;
        let second = source.next_frame()?.ok_or(VideoError::TooShort)?;
        check_dimensions(&second, first.width(), first.height(), 1)?;

        let width = first.width();
        let height = first.height();
        Ok(Self {
            source,
            fps,
            width,
            height,
            bands: column_bands(width as usize),
            prev_gray: first.gray(),
            current_gray: second.gray(),
            current: second,
            decoded: 2,
            exhausted: false,
        })
    }

    pub fn frames_remaining(&self) -> Option<u64> {
        self.source.frame_count().map(|total| total.saturating_sub(self.decoded))
    }

    /// Features for the current frame pair, advancing the stream.
    ///
    /// Flow over the bands and the next frame's decode run concurrently;
    /// the previous plane is replaced only after both finish.
    pub fn step(&mut self) -> Result<Option<RawFeatures>, VideoError> {
        if self.exhausted {
            return Ok(None);
        }

        let prev_gray = &self.prev_gray;
        let current_gray = &self.current_gray;
        let bands = &self.bands;
        let source = &mut self.source;
        let (band_means, read_ahead) = rayon::join(
            || {
                bands
                    .par_iter()
                    .map(|&(x0, x1)| band_mean_flow(prev_gray, current_gray, x0, x1))
                    .collect::<Vec<f64>>()
            },
            || source.next_frame(),
        );

        let mean = band_means.iter().sum::<f64>() / band_means.len() as f64;
        let energy = (mean * ENERGY_SCALE).clamp(0.0, 1.0);
        let (hue, saturation, value) = self.current.mean_hsv();
        let features = RawFeatures {
            energy,
            hue,
            saturation,
            value,
        };

        match read_ahead? {
            Some(frame) => {
                check_dimensions(&frame, self.width, self.height, self.decoded)?;
                self.decoded += 1;
                self.prev_gray = std::mem::replace(&mut self.current_gray, frame.gray());
                self.current = frame;
            }
            None => self.exhausted = true,
        }
        Ok(Some(features))
    }
}

impl<F: FrameSource + Send> FeatureSource for VideoFeatureExtractor<F> {
    fn fps(&self) -> f64 {
        self.fps
    }

    fn next_features(&mut self) -> Result<Option<RawFeatures>, FeatureSourceError> {
        let frame = self.decoded;
        self.step().map_err(|err| FeatureSourceError::Decode {
            frame,
            message: err.to_string(),
        })
    }
}

fn check_dimensions(frame: &Frame, width: u32, height: u32, index: u64) -> Result<(), VideoError> {
    if frame.width() != width || frame.height() != height {
        return Err(VideoError::DimensionMismatch {
            frame: index,
            got_width: frame.width(),
            got_height: frame.height(),
            want_width: width,
            want_height: height,
        });
    }
    Ok(())
}

fn column_bands(width: usize) -> Vec<(usize, usize)> {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    let count = cores.min((width / MIN_BAND_WIDTH).max(1));
    let base = width / count;
    let remainder = width % count;

    let mut bands = Vec::with_capacity(count);
    let mut x = 0;
    for i in 0..count {
        let band_width = base + usize::from(i < remainder);
        bands.push((x, x + band_width));
        x += band_width;
    }
    bands
}
