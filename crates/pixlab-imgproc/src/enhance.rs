use pixlab_image::{Image, ImageError};

use crate::histogram::{apply_lut, LookupTable};

/// Point-wise tone mapping of 8-bit samples.
///
/// Every variant maps an intensity `v` in `[0, 255]` to a new one; results are clipped
/// to `[0, 255]` and truncated.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum IntensityTransform {
    /// Keep every sample as is.
    #[default]
    Identity,
    /// `255 - v`.
    Negative,
    /// `255 * ln(1 + 10^c * v) / ln(1 + 10^c * 255)`.
    Logarithmic {
        /// Base 10 exponent of the gain applied before the logarithm.
        c: f64,
    },
    /// `c * (v / 255)^gamma * 255`.
    Gamma {
        /// Output gain.
        c: f64,
        /// Exponent, must be non-negative.
        gamma: f64,
    },
}

impl IntensityTransform {
    /// Build the lookup table of the transform.
    ///
    /// # Errors
    ///
    /// Returns an error if a parameter is not finite, if `gamma` is negative, or if
    /// `10^c` over- or underflows.
    ///
    /// # Example
    ///
    /// ```
    /// use pixlab_imgproc::enhance::IntensityTransform;
    ///
    /// let lut = IntensityTransform::Gamma { c: 1.0, gamma: 2.0 }.lut().unwrap();
    ///
    /// assert_eq!(lut[0], 0);
    /// assert_eq!(lut[128], 64);
    /// assert_eq!(lut[255], 255);
    /// ```
    pub fn lut(&self) -> Result<LookupTable, ImageError> {
        let mut lut = [0u8; 256];

        match *self {
            IntensityTransform::Identity => {
                lut.iter_mut().enumerate().for_each(|(v, l)| *l = v as u8);
            }
            IntensityTransform::Negative => {
                lut.iter_mut().enumerate().for_each(|(v, l)| *l = 255 - v as u8);
            }
            IntensityTransform::Logarithmic { c } => {
                if !c.is_finite() {
                    return Err(ImageError::InvalidFilterParameter("c", c));
                }
                let gain = 10f64.powf(c);
                if !gain.is_finite() || gain <= 0.0 {
                    return Err(ImageError::InvalidFilterParameter("c", c));
                }
                let norm = (1.0 + gain * 255.0).ln();
                fill(&mut lut, |v| 255.0 * (1.0 + gain * v).ln() / norm);
            }
            IntensityTransform::Gamma { c, gamma } => {
                if !c.is_finite() {
                    return Err(ImageError::InvalidFilterParameter("c", c));
                }
                if !gamma.is_finite() || gamma < 0.0 {
                    return Err(ImageError::InvalidFilterParameter("gamma", gamma));
                }
                fill(&mut lut, |v| c * (v / 255.0).powf(gamma) * 255.0);
            }
        }

        Ok(lut)
    }
}

fn fill(lut: &mut LookupTable, f: impl Fn(f64) -> f64) {
    for (v, l) in lut.iter_mut().enumerate() {
        *l = f(v as f64).clamp(0.0, 255.0) as u8;
    }
}

/// Apply an intensity transform to every sample of an image.
///
/// PRECONDITION: `src` and `dst` must have the same shape.
///
/// # Example
///
/// ```
/// use pixlab_image::Image;
/// use pixlab_imgproc::enhance::{apply_intensity_transform, IntensityTransform};
///
/// let image = Image::<u8, 3>::new([1, 1].into(), vec![0, 100, 255]).unwrap();
/// let mut out = Image::<u8, 3>::from_size_val(image.size(), 0).unwrap();
///
/// apply_intensity_transform(&image, &mut out, IntensityTransform::Negative).unwrap();
///
/// assert_eq!(out.as_slice(), &[255, 155, 0]);
/// ```
pub fn apply_intensity_transform<const C: usize>(
    src: &Image<u8, C>,
    dst: &mut Image<u8, C>,
    transform: IntensityTransform,
) -> Result<(), ImageError> {
    let lut = transform.lut()?;
    apply_lut(src, dst, &lut)
}
