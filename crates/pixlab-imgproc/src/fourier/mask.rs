use pixlab_image::{ImageError, ImageSize};
use rayon::prelude::*;

/// The radial filters that can be applied to a centered spectrum.
///
/// `D` is the distance of a frequency bin to the spectrum center and `r` the cutoff
/// radius given to [`build_mask`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FilterKind {
    /// 1 where `D <= r`, 0 elsewhere.
    IdealLowPass,
    /// 1 where `D >= r`, 0 elsewhere.
    IdealHighPass,
    /// `1 / (1 + (D / r)^(2 * order))`.
    ButterworthLowPass {
        /// Order of the filter, at least 1.
        order: u32,
    },
    /// One minus the matching low-pass.
    ButterworthHighPass {
        /// Order of the filter, at least 1.
        order: u32,
    },
    /// `exp(-D^2 / (2 * r^2))`.
    GaussianLowPass,
    /// One minus the matching low-pass.
    GaussianHighPass,
}

/// Where distances are measured from when building a mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MaskCenter {
    /// Both the row and the column offsets are measured from `height / 2`.
    ///
    /// Matches the laboratory reference output. On non-square images the mask is
    /// not centered on the zero frequency along the columns.
    #[default]
    SharedAxis,
    /// Row offsets from `height / 2`, column offsets from `width / 2`.
    PerAxis,
}

impl MaskCenter {
    fn offsets(&self, size: ImageSize) -> (f64, f64) {
        let row = (size.height / 2) as f64;
        match self {
            MaskCenter::SharedAxis => (row, row),
            MaskCenter::PerAxis => (row, (size.width / 2) as f64),
        }
    }
}

/// Weights in `[0, 1]` multiplied into a centered spectrum, row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct FrequencyMask {
    size: ImageSize,
    weights: Vec<f64>,
}

impl FrequencyMask {
    /// A mask letting every frequency through.
    pub fn all_pass(size: ImageSize) -> Self {
        Self {
            size,
            weights: vec![1.0; size.area()],
        }
    }

    /// The size of the mask.
    pub fn size(&self) -> ImageSize {
        self.size
    }

    /// The weights, row-major.
    pub fn as_slice(&self) -> &[f64] {
        &self.weights
    }

    /// The weight at the given row and column.
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        if row >= self.size.height || col >= self.size.width {
            return None;
        }
        Some(self.weights[row * self.size.width + col])
    }
}

/// Build a radial frequency mask with the default [`MaskCenter`].
///
/// # Errors
///
/// See [`build_mask_with_center`].
///
/// # Example
///
/// ```
/// use pixlab_imgproc::fourier::{build_mask, FilterKind};
///
/// let mask = build_mask(FilterKind::IdealLowPass, [5, 5].into(), 1.0).unwrap();
///
/// assert_eq!(mask.get(2, 2), Some(1.0));
/// assert_eq!(mask.get(1, 2), Some(1.0));
/// assert_eq!(mask.get(1, 1), Some(0.0));
/// ```
pub fn build_mask(
    kind: FilterKind,
    size: ImageSize,
    radius: f64,
) -> Result<FrequencyMask, ImageError> {
    build_mask_with_center(kind, size, radius, MaskCenter::default())
}

/// Build a radial frequency mask.
///
/// # Arguments
///
/// * `kind` - The filter family and variant.
/// * `size` - The size of the spectrum the mask is applied to.
/// * `radius` - The cutoff radius, in frequency bins.
/// * `center` - Where distances are measured from.
///
/// # Errors
///
/// Returns an error if the size is empty, if the radius is negative or not finite,
/// if a Butterworth or Gaussian radius is zero, or if a Butterworth order is zero.
pub fn build_mask_with_center(
    kind: FilterKind,
    size: ImageSize,
    radius: f64,
    center: MaskCenter,
) -> Result<FrequencyMask, ImageError> {
    if size.area() == 0 {
        return Err(ImageError::EmptyImage);
    }

    if !radius.is_finite() || radius < 0.0 {
        return Err(ImageError::InvalidFilterParameter("radius", radius));
    }

    match kind {
        FilterKind::IdealLowPass | FilterKind::IdealHighPass => {}
        FilterKind::ButterworthLowPass { order } | FilterKind::ButterworthHighPass { order } => {
            if radius == 0.0 {
                return Err(ImageError::InvalidFilterParameter("radius", radius));
            }
            if order == 0 {
                return Err(ImageError::InvalidFilterParameter("order", order as f64));
            }
        }
        FilterKind::GaussianLowPass | FilterKind::GaussianHighPass => {
            if radius == 0.0 {
                return Err(ImageError::InvalidFilterParameter("radius", radius));
            }
        }
    }

    log::debug!("build_mask: {kind:?} r={radius} on {size} ({center:?})");

    let (crow, ccol) = center.offsets(size);
    let mut weights = vec![0.0; size.area()];

    weights
        .par_chunks_exact_mut(size.width)
        .enumerate()
        .for_each(|(u, row)| {
            for (v, w) in row.iter_mut().enumerate() {
                let du = u as f64 - crow;
                let dv = v as f64 - ccol;
                *w = weight(kind, (du * du + dv * dv).sqrt(), radius);
            }
        });

    Ok(FrequencyMask { size, weights })
}

fn weight(kind: FilterKind, d: f64, r: f64) -> f64 {
    match kind {
        FilterKind::IdealLowPass => {
            if d <= r {
                1.0
            } else {
                0.0
            }
        }
        FilterKind::IdealHighPass => {
            if d >= r {
                1.0
            } else {
                0.0
            }
        }
        FilterKind::ButterworthLowPass { order } => butterworth(d, r, order),
        FilterKind::ButterworthHighPass { order } => 1.0 - butterworth(d, r, order),
        FilterKind::GaussianLowPass => gaussian(d, r),
        FilterKind::GaussianHighPass => 1.0 - gaussian(d, r),
    }
}

fn butterworth(d: f64, r: f64, order: u32) -> f64 {
    1.0 / (1.0 + (d / r).powf(2.0 * order as f64))
}

fn gaussian(d: f64, r: f64) -> f64 {
    (-(d * d) / (2.0 * r * r)).exp()
}
