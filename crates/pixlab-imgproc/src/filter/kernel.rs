use pixlab_image::ImageError;

/// A square convolution kernel with an odd side length.
///
/// The weights are stored row-major. On construction, when the raw weight sum `S` is
/// neither 0 nor 1, every weight is divided by `S` so that blur-type kernels keep the
/// image brightness; edge and sharpen kernels summing to 0 or 1 are kept as given.
///
/// # Example
///
/// ```
/// use pixlab_imgproc::filter::Kernel;
///
/// let kernel = Kernel::from_rows(&[[1.0, 2.0, 1.0], [2.0, 4.0, 2.0], [1.0, 2.0, 1.0]]).unwrap();
///
/// assert_eq!(kernel.side(), 3);
/// assert_eq!(kernel.get(1, 1), Some(0.25));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Kernel {
    side: usize,
    weights: Vec<f32>,
}

impl Kernel {
    /// Create a kernel from its side length and row-major weights.
    ///
    /// # Errors
    ///
    /// Returns an error if the side is even or zero, or if the number of weights is not
    /// `side * side`.
    pub fn new(side: usize, weights: Vec<f32>) -> Result<Self, ImageError> {
        if side == 0 || Some(weights.len()) != side.checked_mul(side) {
            return Err(ImageError::InvalidKernelShape(
                side,
                weights.len().checked_div(side).unwrap_or(weights.len()),
            ));
        }

        if side % 2 == 0 {
            return Err(ImageError::InvalidKernelSize(side));
        }

        Ok(Self {
            side,
            weights: normalize(weights),
        })
    }

    /// Create a kernel from a list of rows.
    ///
    /// # Errors
    ///
    /// Returns an error if the rows are empty, ragged, not square or of even length.
    pub fn from_rows<R: AsRef<[f32]>>(rows: &[R]) -> Result<Self, ImageError> {
        let side = rows.len();

        if let Some(row) = rows.iter().find(|row| row.as_ref().len() != side) {
            return Err(ImageError::InvalidKernelShape(side, row.as_ref().len()));
        }

        let weights = rows
            .iter()
            .flat_map(|row| row.as_ref().iter().copied())
            .collect();

        Self::new(side, weights)
    }

    /// Create a kernel whose weights are all zero.
    ///
    /// # Errors
    ///
    /// Returns an error if the side is even or zero, or if `side * side` overflows.
    pub fn zeros(side: usize) -> Result<Self, ImageError> {
        if side % 2 == 0 {
            return Err(ImageError::InvalidKernelSize(side));
        }
        let area = side
            .checked_mul(side)
            .ok_or(ImageError::InvalidKernelSize(side))?;
        Self::new(side, vec![0.0; area])
    }

    /// The identity kernel of side 1.
    pub fn identity() -> Self {
        Self {
            side: 1,
            weights: vec![1.0],
        }
    }

    /// Number of rows (and columns) of the kernel.
    pub fn side(&self) -> usize {
        self.side
    }

    /// Number of pixels the kernel reaches past its center on every side.
    pub fn radius(&self) -> usize {
        self.side / 2
    }

    /// Row-major weights of the kernel.
    pub fn weights(&self) -> &[f32] {
        &self.weights
    }

    /// Weight at the given row and column.
    pub fn get(&self, row: usize, col: usize) -> Option<f32> {
        if row >= self.side || col >= self.side {
            return None;
        }
        Some(self.weights[row * self.side + col])
    }

    /// Sum of all the weights.
    pub fn sum(&self) -> f32 {
        self.weights.iter().sum()
    }
}

fn normalize(mut weights: Vec<f32>) -> Vec<f32> {
    let sum = weights.iter().map(|&w| w as f64).sum::<f64>();
    if sum != 0.0 && sum != 1.0 {
        weights
            .iter_mut()
            .for_each(|w| *w = (*w as f64 / sum) as f32);
    }
    weights
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn kernel_normalizes_blur_weights() -> Result<(), ImageError> {
        let kernel = Kernel::from_rows(&[[1.0, 2.0, 1.0], [2.0, 4.0, 2.0], [1.0, 2.0, 1.0]])?;

        assert_eq!(kernel.get(0, 0), Some(1.0 / 16.0));
        assert_eq!(kernel.get(1, 1), Some(0.25));
        assert_relative_eq!(kernel.sum(), 1.0, epsilon = 1e-6);

        Ok(())
    }

    #[test]
    fn kernel_scales_by_inverse_sum() -> Result<(), ImageError> {
        let raw = [2.0f32, 2.0, 2.0, 2.0, 0.0, 2.0, 2.0, 2.0, 2.0];
        let kernel = Kernel::new(3, raw.to_vec())?;

        for (w, r) in kernel.weights().iter().zip(raw.iter()) {
            assert_relative_eq!(*w, r / 16.0, epsilon = 1e-7);
        }
        assert_relative_eq!(kernel.sum(), 1.0, epsilon = 1e-6);

        Ok(())
    }

    #[test]
    fn kernel_keeps_zero_and_unit_sums() -> Result<(), ImageError> {
        let sobel = [[-1.0, 0.0, 1.0], [-2.0, 0.0, 2.0], [-1.0, 0.0, 1.0]];
        let kernel = Kernel::from_rows(&sobel)?;
        assert_eq!(kernel.weights(), sobel.concat().as_slice());

        let hipass = [[-1.0, -1.0, -1.0], [-1.0, 9.0, -1.0], [-1.0, -1.0, -1.0]];
        let kernel = Kernel::from_rows(&hipass)?;
        assert_eq!(kernel.weights(), hipass.concat().as_slice());

        Ok(())
    }

    #[test]
    fn kernel_rejects_bad_shapes() {
        assert_eq!(
            Kernel::from_rows(&[[1.0, 1.0], [1.0, 1.0]]),
            Err(ImageError::InvalidKernelSize(2))
        );
        assert_eq!(
            Kernel::from_rows(&[vec![1.0, 1.0, 1.0], vec![1.0, 1.0]]),
            Err(ImageError::InvalidKernelShape(2, 3))
        );
        assert_eq!(
            Kernel::from_rows::<Vec<f32>>(&[]),
            Err(ImageError::InvalidKernelShape(0, 0))
        );
        assert_eq!(
            Kernel::new(3, vec![1.0; 8]),
            Err(ImageError::InvalidKernelShape(3, 2))
        );
    }

    #[test]
    fn kernel_rejects_overflowing_sides() {
        let side = (1usize << (usize::BITS / 2)) + 1;
        assert_eq!(
            Kernel::new(side, vec![0.0]),
            Err(ImageError::InvalidKernelShape(side, 0))
        );
        assert_eq!(
            Kernel::zeros(usize::MAX),
            Err(ImageError::InvalidKernelSize(usize::MAX))
        );
    }

    #[test]
    fn kernel_accessors() -> Result<(), ImageError> {
        let kernel = Kernel::zeros(5)?;
        assert_eq!(kernel.side(), 5);
        assert_eq!(kernel.radius(), 2);
        assert_eq!(kernel.get(5, 0), None);
        assert_eq!(Kernel::identity().weights(), &[1.0]);
        Ok(())
    }
}
