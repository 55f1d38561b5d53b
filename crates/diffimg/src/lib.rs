//! Pixel-level image differencing.
//!
//! Two equally sized images are compared channel by channel. The summed
//! absolute deltas are normalized into a ratio where `0.0` means identical
//! and `1.0` means every counted channel of every pixel is maximally
//! different. Optionally a diff image holding the per-channel deltas is
//! rendered, and the same ratio can be derived back from it.
//!
//! The engine compares whatever RGBA values it is given. Grids loaded through
//! [`adapter`] are premultiplied by alpha, so transparent pixels compare equal
//! regardless of the color stored underneath.

use std::path::PathBuf;

use image::ImageError;
use thiserror::Error;

pub mod adapter;
pub mod channel;
pub mod compare;
mod parallel;

pub use self::channel::{Color, abs_channel_diff, extract_color};
pub use self::compare::diff_image::{DiffImage, create_diff_image, ratio_from_diff_image};
pub use self::compare::ratio::compute_ratio;
pub use self::compare::{AlphaPresentation, DiffOptions, DiffResult, check_dimensions, diff};

#[derive(Debug, Error)]
pub enum DiffError {
    #[error("file not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    #[error("failed to read {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode {}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: ImageError,
    },

    #[error("failed to decode image data")]
    DecodeBuffer(#[source] ImageError),

    #[error("image dimensions are different: {left_w}x{left_h} vs {right_w}x{right_h}")]
    DimensionMismatch {
        left_w: u32,
        left_h: u32,
        right_w: u32,
        right_h: u32,
    },

    #[error("failed to write diff image {}", path.display())]
    Encode {
        path: PathBuf,
        #[source]
        source: ImageError,
    },

    #[error("failed to encode diff image")]
    EncodeBuffer(#[source] ImageError),

    #[error("invalid diff options: {0}")]
    InvalidOptions(String),
}
