#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// color transformations module.
pub mod color;

/// intensity transformations module.
pub mod enhance;

/// image filtering module.
pub mod filter;

/// frequency domain filtering module.
pub mod fourier;

/// compute image histogram module.
pub mod histogram;

/// image padding module.
pub mod padding;

/// module containing parallization utilities.
pub mod parallel;

/// zoom, pan and region of interest utilities.
pub mod viewport;
