mod fft;
pub use fft::{fftshift, forward_transform, ifftshift, Spectrum};

mod mask;
pub use mask::{build_mask, build_mask_with_center, FilterKind, FrequencyMask, MaskCenter};

mod spectrum;
pub use spectrum::{apply_mask_and_invert, frequency_filter, magnitude_spectrum};
