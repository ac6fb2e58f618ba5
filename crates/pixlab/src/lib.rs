#![doc = include_str!(concat!("../", env!("CARGO_PKG_README")))]

#[doc(inline)]
pub use pixlab_image as image;

#[doc(inline)]
pub use pixlab_imgproc as imgproc;

#[doc(inline)]
pub use pixlab_io as io;
