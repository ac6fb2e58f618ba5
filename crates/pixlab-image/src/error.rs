/// An error type for the image module.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ImageError {
    /// Error when channel and shape are not valid.
    #[error("Data length ({0}) does not match the image size ({1})")]
    InvalidChannelShape(usize, usize),

    /// Error when the image sizes of two buffers do not match.
    #[error("Image size mismatch: ({0}x{1}) vs ({2}x{3})")]
    InvalidImageSize(usize, usize, usize, usize),

    /// Error when the pixel coordinates are out of bounds.
    #[error("Pixel coordinates ({0}, {1}) are out of bounds ({2}, {3})")]
    PixelIndexOutOfBounds(usize, usize, usize, usize),

    /// Error when the channel index is out of bounds.
    #[error("Channel index ({0}) is out of bounds ({1})")]
    ChannelIndexOutOfBounds(usize, usize),

    /// Error when a value cannot be cast to the target pixel type.
    #[error("Failed to cast image data to {0}")]
    CastError(String),

    /// Error when the kernel rows are empty or do not form a square.
    #[error("Kernel must be square, got {0} rows and {1} columns")]
    InvalidKernelShape(usize, usize),

    /// Error when the kernel side length is even.
    #[error("Kernel side must be odd, got {0}")]
    InvalidKernelSize(usize),

    /// Error when a filter parameter is out of its valid range.
    #[error("Invalid filter parameter `{0}`: {1}")]
    InvalidFilterParameter(&'static str, f64),

    /// Error when an operation needs at least one pixel.
    #[error("Image is empty")]
    EmptyImage,

    /// Error raised by the parallel execution utilities.
    #[error("Parallel execution failed: {0}")]
    Parallel(String),
}
