mod catalog;
pub use catalog::{KernelCatalog, NamedKernel, CUSTOM_KERNEL_NAME};

mod convolution;
pub use convolution::{filter2d, filter2d_f32};

mod kernel;
pub use kernel::Kernel;
