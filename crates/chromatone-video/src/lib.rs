//! Chromatone Video Analysis
//!
//! This crate turns decoded video frames into the per-frame feature vector
//! the core engine consumes: motion energy from dense optical flow plus mean
//! HSV color statistics.
//!
//! # Pipeline
//!
//! - [`frame`]: the RGB frame model, grayscale planes, and color statistics
//! - [`source`]: the `FrameSource` trait with image-sequence and synthetic
//!   implementations
//! - [`flow`]: dense Lucas-Kanade flow magnitude over column bands
//! - [`extractor`]: the band-parallel [`VideoFeatureExtractor`] implementing
//!   the core `FeatureSource` trait
//!
//! # Concurrency
//!
//! Flow is computed over disjoint column bands with rayon while the next
//! frame is decoded in parallel. Band boundaries depend on the machine's
//! available parallelism, so motion energy is statistically stable but not
//! bit-identical across different core counts.

pub mod error;
pub mod extractor;
pub mod flow;
pub mod frame;
pub mod source;

pub use error::VideoError;
pub use extractor::VideoFeatureExtractor;
pub use frame::{Frame, GrayPlane};
pub use source::{FrameSource, ImageSequenceSource, SyntheticSource};
