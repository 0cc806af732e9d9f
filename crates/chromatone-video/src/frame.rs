//! RGB frame model, grayscale planes, and color statistics.

use crate::error::VideoError;

/// One decoded video frame, RGB8 interleaved.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl Frame {
    pub fn from_rgb8(width: u32, height: u32, data: Vec<u8>) -> Result<Self, VideoError> {
        let expected = width as usize * height as usize * 3;
        if data.len() != expected {
            return Err(VideoError::BadFrameData {
                len: data.len(),
                expected,
                width,
                height,
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixel(&self, x: u32, y: u32) -> [u8; 3] {
        let i = (y as usize * self.width as usize + x as usize) * 3;
        [self.data[i], self.data[i + 1], self.data[i + 2]]
    }

    /// Luma plane in [0, 1] using the Rec. 601 weights.
    pub fn gray(&self) -> GrayPlane {
        let mut data = Vec::with_capacity(self.width as usize * self.height as usize);
        for rgb in self.data.chunks_exact(3) {
            let luma =
                0.299 * rgb[0] as f32 + 0.587 * rgb[1] as f32 + 0.114 * rgb[2] as f32;
            data.push(luma / 255.0);
        }
        GrayPlane {
            width: self.width as usize,
            height: self.height as usize,
            data,
        }
    }

    /// Per-channel mean in [0, 1].
    pub fn mean_rgb(&self) -> [f64; 3] {
        let mut sums = [0.0f64; 3];
        for rgb in self.data.chunks_exact(3) {
            for (sum, &channel) in sums.iter_mut().zip(rgb) {
                *sum += channel as f64;
            }
        }
        let count = (self.width as usize * self.height as usize) as f64;
        sums.map(|sum| sum / count / 255.0)
    }

    /// HSV of the frame's mean color, every component in [0, 1].
    ///
    /// The channel means are taken first and converted once, matching how
    /// the engine treats color as a single frame-wide statistic.
    pub fn mean_hsv(&self) -> (f64, f64, f64) {
        let [r, g, b] = self.mean_rgb();
        rgb_to_hsv(r, g, b)
    }
}

impl From<image::RgbImage> for Frame {
    fn from(image: image::RgbImage) -> Self {
        let (width, height) = image.dimensions();
        Self {
            width,
            height,
            data: image.into_raw(),
        }
    }
}

/// Grayscale plane with f32 samples in [0, 1].
#[derive(Debug, Clone)]
pub struct GrayPlane {
    width: usize,
    height: usize,
    data: Vec<f32>,
}

impl GrayPlane {
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn at(&self, x: usize, y: usize) -> f32 {
        self.data[y * self.width + x]
    }
}

/// RGB in [0, 1] to HSV in [0, 1] (hue as a fraction of the circle).
pub fn rgb_to_hsv(r: f64, g: f64, b: f64) -> (f64, f64, f64) {
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;

    let value = max;
    let saturation = if max > 0.0 { delta / max } else { 0.0 };
    let hue = if delta <= f64::EPSILON {
        0.0
    } else if max == r {
        ((g - b) / delta).rem_euclid(6.0) / 6.0
    } else if max == g {
        ((b - r) / delta + 2.0) / 6.0
    } else {
        ((r - g) / delta + 4.0) / 6.0
    };
    (hue, saturation, value)
}

/// HSV in [0, 1] to RGB in [0, 1].
pub fn hsv_to_rgb(h: f64, s: f64, v: f64) -> (f64, f64, f64) {
    let h6 = h.rem_euclid(1.0) * 6.0;
    let sector = h6.floor();
    let f = h6 - sector;
    let p = v * (1.0 - s);
    let q = v * (1.0 - s * f);
    let t = v * (1.0 - s * (1.0 - f));
    match sector as u32 % 6 {
        0 => (v, t, p),
        1 => (q, v, p),
        2 => (p, v, t),
        3 => (p, q, v),
        4 => (t, p, v),
        _ => (v, p, q),
    }
}
