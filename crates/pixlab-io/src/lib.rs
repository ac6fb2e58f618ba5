#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Error types for I/O operations.
pub mod error;

/// High-level image reading and writing functions.
///
/// Images are handed out in BGR channel order. See [`functional::read_image_any_bgr8`].
pub mod functional;

pub use crate::error::IoError;
