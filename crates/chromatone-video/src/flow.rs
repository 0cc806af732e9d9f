//! Dense Lucas-Kanade optical flow magnitude.
//!
//! Per-pixel flow is solved over a small accumulation window and reduced to
//! a mean magnitude per column band; the extractor averages the bands into
//! the motion-energy feature. Direction is discarded, only how much the
//! image moved matters.

use crate::frame::GrayPlane;

/// Half-width of the accumulation window (5x5).
const WINDOW_RADIUS: usize = 2;

/// Determinant floor below which the 2x2 flow system is singular.
const MIN_DETERMINANT: f64 = 1e-9;

/// Mean flow magnitude in pixels over the column band `[x0, x1)`.
///
/// Spatial gradients are central differences on the previous frame, the
/// temporal difference is current minus previous. Pixels whose window
/// system is near-singular (flat patches) contribute zero motion. Bands
/// too narrow to hold a full window yield zero.
pub fn band_mean_flow(prev: &GrayPlane, current: &GrayPlane, x0: usize, x1: usize) -> f64 {
    let width = prev.width();
    let height = prev.height();
    let margin = WINDOW_RADIUS + 1;
    if width < 2 * margin + 1 || height < 2 * margin + 1 {
        return 0.0;
    }

    let x_lo = x0.max(margin);
    let x_hi = x1.min(width - margin);
    if x_lo >= x_hi {
        return 0.0;
    }

    let mut total = 0.0f64;
    let mut count = 0u64;
    for y in margin..height - margin {
        for x in x_lo..x_hi {
            let mut sxx = 0.0f64;
            let mut sxy = 0.0f64;
            let mut syy = 0.0f64;
            let mut sxt = 0.0f64;
            let mut syt = 0.0f64;
            for wy in y - WINDOW_RADIUS..=y + WINDOW_RADIUS {
                for wx in x - WINDOW_RADIUS..=x + WINDOW_RADIUS {
                    let ix = 0.5 * (prev.at(wx + 1, wy) - prev.at(wx - 1, wy)) as f64;
                    let iy = 0.5 * (prev.at(wx, wy + 1) - prev.at(wx, wy - 1)) as f64;
                    let it = (current.at(wx, wy) - prev.at(wx, wy)) as f64;
                    sxx += ix * ix;
                    sxy += ix * iy;
                    syy += iy * iy;
                    sxt += ix * it;
                    syt += iy * it;
                }
            }

            let det = sxx * syy - sxy * sxy;
            if det.abs() >= MIN_DETERMINANT {
                let u = (sxy * syt - syy * sxt) / det;
                let v = (sxy * sxt - sxx * syt) / det;
                total += (u * u + v * v).sqrt();
            }
            count += 1;
        }
    }

    if count == 0 {
        0.0
    } else {
        total / count as f64
    }
}
