use std::sync::Arc;

use pixlab_image::{Image, ImageError, ImageSize};
use rayon::prelude::*;
use rustfft::{num_complex::Complex, Fft, FftDirection, FftPlanner};

/// The 2D discrete Fourier transform of a grayscale image.
///
/// The coefficients are stored row-major with the zero frequency moved to the
/// center, i.e. at row `height / 2` and column `width / 2`.
#[derive(Debug, Clone, PartialEq)]
pub struct Spectrum {
    size: ImageSize,
    data: Vec<Complex<f64>>,
}

impl Spectrum {
    /// The size of the image the spectrum was computed from.
    pub fn size(&self) -> ImageSize {
        self.size
    }

    /// The centered coefficients, row-major.
    pub fn as_slice(&self) -> &[Complex<f64>] {
        &self.data
    }

    /// The coefficient at the given row and column, if inside the spectrum.
    pub fn get(&self, row: usize, col: usize) -> Option<Complex<f64>> {
        if row >= self.size.height || col >= self.size.width {
            return None;
        }
        Some(self.data[row * self.size.width + col])
    }
}

/// Compute the centered 2D discrete Fourier transform of a grayscale image.
///
/// The samples are taken as they are (`0..=255`). Rows are transformed in parallel,
/// then columns; the quadrants are finally swapped so the zero frequency sits at
/// the center.
///
/// # Errors
///
/// Returns [`ImageError::EmptyImage`] if the image has no pixels.
///
/// # Example
///
/// ```
/// use pixlab_image::Image;
/// use pixlab_imgproc::fourier::forward_transform;
///
/// let image = Image::<u8, 1>::from_size_val([4, 4].into(), 2).unwrap();
/// let spectrum = forward_transform(&image).unwrap();
///
/// // all the energy of a constant image is in the zero frequency
/// assert_eq!(spectrum.get(2, 2).map(|c| c.re), Some(32.0));
/// assert_eq!(spectrum.get(0, 0).map(|c| c.norm()), Some(0.0));
/// ```
pub fn forward_transform(src: &Image<u8, 1>) -> Result<Spectrum, ImageError> {
    if src.is_empty() {
        return Err(ImageError::EmptyImage);
    }

    log::debug!("forward_transform: {}", src.size());

    let size = src.size();
    let mut data = src
        .as_slice()
        .par_iter()
        .map(|&v| Complex::new(v as f64, 0.0))
        .collect::<Vec<_>>();

    fft_2d(size, &mut data, FftDirection::Forward);

    Ok(Spectrum {
        size,
        data: fftshift(size, &data),
    })
}

/// Undo the quadrant swap of `spectrum` and compute the normalized inverse transform.
///
/// The returned samples are scaled by `1 / (width * height)`.
pub(crate) fn inverse_transform(size: ImageSize, spectrum: &[Complex<f64>]) -> Vec<Complex<f64>> {
    let mut data = ifftshift(size, spectrum);
    fft_2d(size, &mut data, FftDirection::Inverse);

    let scale = 1.0 / size.area() as f64;
    data.par_iter_mut().for_each(|c| *c *= scale);

    data
}

/// Move the element at `(0, 0)` to `(height / 2, width / 2)`, wrapping around.
pub fn fftshift<T: Copy + Send + Sync>(size: ImageSize, data: &[T]) -> Vec<T> {
    roll(size, data, size.height / 2, size.width / 2)
}

/// Inverse of [`fftshift`]; the two differ on odd sizes.
pub fn ifftshift<T: Copy + Send + Sync>(size: ImageSize, data: &[T]) -> Vec<T> {
    roll(
        size,
        data,
        size.height - size.height / 2,
        size.width - size.width / 2,
    )
}

fn roll<T: Copy + Send + Sync>(size: ImageSize, data: &[T], dy: usize, dx: usize) -> Vec<T> {
    let (width, height) = (size.width, size.height);
    if width == 0 || height == 0 {
        return data.to_vec();
    }

    let mut out = data.to_vec();
    out.par_chunks_exact_mut(width)
        .enumerate()
        .for_each(|(y, out_row)| {
            let src_y = (y + height - dy % height) % height;
            let src_row = &data[src_y * width..(src_y + 1) * width];
            for (x, out) in out_row.iter_mut().enumerate() {
                *out = src_row[(x + width - dx % width) % width];
            }
        });

    out
}

fn fft_2d(size: ImageSize, data: &mut Vec<Complex<f64>>, direction: FftDirection) {
    let mut planner = FftPlanner::new();
    let row_fft = planner.plan_fft(size.width, direction);
    let col_fft = planner.plan_fft(size.height, direction);

    fft_rows(&row_fft, data, size.width);

    let mut transposed = transpose(data, size.height, size.width);
    fft_rows(&col_fft, &mut transposed, size.height);

    *data = transpose(&transposed, size.width, size.height);
}

fn fft_rows(fft: &Arc<dyn Fft<f64>>, data: &mut [Complex<f64>], len: usize) {
    let scratch_len = fft.get_inplace_scratch_len();
    data.par_chunks_exact_mut(len).for_each_init(
        || vec![Complex::new(0.0, 0.0); scratch_len],
        |scratch, row| fft.process_with_scratch(row, scratch),
    );
}

/// Transpose a `rows x cols` row-major buffer into a `cols x rows` one.
fn transpose(data: &[Complex<f64>], rows: usize, cols: usize) -> Vec<Complex<f64>> {
    let mut out = vec![Complex::new(0.0, 0.0); data.len()];
    out.par_chunks_exact_mut(rows)
        .enumerate()
        .for_each(|(c, out_row)| {
            for (r, out) in out_row.iter_mut().enumerate() {
                *out = data[r * cols + c];
            }
        });
    out
}
