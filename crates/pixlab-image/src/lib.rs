#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Error types for the image module.
pub mod error;

/// image representation for computer vision purposes.
pub mod image;

/// Operations on image buffers.
pub mod ops;

pub use crate::error::ImageError;
pub use crate::image::{Image, ImageSize};
