//! Video analysis errors.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum VideoError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("no image frames found in {0}")]
    EmptySequence(PathBuf),

    #[error("source ended before two frames were available")]
    TooShort,

    #[error("frame {frame} is {got_width}x{got_height}, expected {want_width}x{want_height}")]
    DimensionMismatch {
        frame: u64,
        got_width: u32,
        got_height: u32,
        want_width: u32,
        want_height: u32,
    },

    #[error("frame data holds {len} bytes, expected {expected} for {width}x{height} rgb")]
    BadFrameData {
        len: usize,
        expected: usize,
        width: u32,
        height: u32,
    },
}
