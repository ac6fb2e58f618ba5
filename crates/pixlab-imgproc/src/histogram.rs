use pixlab_image::{Image, ImageError};
use rayon::prelude::*;

use crate::parallel::{self, ExecuteExt, ExecutionStrategy};

/// Number of pixels for each of the 256 intensity levels of an 8-bit image.
pub type Histogram = [usize; 256];

/// A table mapping every 8-bit intensity to a new one.
pub type LookupTable = [u8; 256];

/// Outcome of [`equalize_histogram`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Equalization {
    /// The lookup table was built and applied.
    Applied,
    /// All the pixels share a single intensity (or there are none); the image was
    /// copied unchanged.
    Degenerate,
}

/// Compute the pixel intensity histogram of an image.
///
/// The pixels are split into one chunk per thread of the current rayon pool.
///
/// # Example
///
/// ```
/// use pixlab_image::{Image, ImageSize};
/// use pixlab_imgproc::histogram::compute_histogram;
///
/// let image = Image::<u8, 1>::new(
///   ImageSize {
///     width: 3,
///     height: 3,
///   },
///   vec![0, 2, 4, 128, 128, 132, 254, 255, 255],
/// ).unwrap();
///
/// let hist = compute_histogram(&image);
///
/// assert_eq!(hist[128], 2);
/// assert_eq!(hist[255], 2);
/// assert_eq!(hist.iter().sum::<usize>(), 9);
/// ```
pub fn compute_histogram(src: &Image<u8, 1>) -> Histogram {
    compute_histogram_with_workers(src, rayon::current_num_threads())
}

/// Compute the pixel intensity histogram of an image using `workers` chunks.
///
/// Every chunk is counted into its own private bins; the partial histograms are
/// summed once all the chunks are done. A worker count of zero is treated as one.
pub fn compute_histogram_with_workers(src: &Image<u8, 1>, workers: usize) -> Histogram {
    let data = src.as_slice();

    let partials = parallel::chunk_ranges(data.len(), workers)
        .into_par_iter()
        .map(|range| {
            let mut local = [0usize; 256];
            for &px in &data[range] {
                local[px as usize] += 1;
            }
            local
        })
        .collect::<Vec<_>>();

    let mut hist = [0usize; 256];
    for local in partials.iter() {
        for (bin, count) in hist.iter_mut().zip(local.iter()) {
            *bin += count;
        }
    }

    hist
}

/// Running sum of a histogram.
pub fn cumulative_histogram(hist: &Histogram) -> Histogram {
    let mut cdf = [0usize; 256];
    let mut acc = 0;
    for (c, &h) in cdf.iter_mut().zip(hist.iter()) {
        acc += h;
        *c = acc;
    }
    cdf
}

/// Build the equalization lookup table of a histogram.
///
/// `lut[v] = (cdf[v] - cdf_min) * 255 / (total - cdf_min)` with integer truncation,
/// where `cdf_min` is the smallest non-zero value of the cumulative histogram.
/// Intensities below the first occupied bin map to 0.
///
/// Returns `None` when the histogram has fewer than two occupied bins.
pub fn equalization_lut(hist: &Histogram) -> Option<LookupTable> {
    let cdf = cumulative_histogram(hist);
    let total = cdf[255];
    let cdf_min = cdf.iter().copied().find(|&c| c > 0)?;

    if total == cdf_min {
        return None;
    }

    let range = total - cdf_min;
    let mut lut = [0u8; 256];
    for (l, &c) in lut.iter_mut().zip(cdf.iter()) {
        *l = (c.saturating_sub(cdf_min) * 255 / range) as u8;
    }

    Some(lut)
}

/// Map every sample of an image through a lookup table.
///
/// PRECONDITION: `src` and `dst` must have the same shape.
pub fn apply_lut<const C: usize>(
    src: &Image<u8, C>,
    dst: &mut Image<u8, C>,
    lut: &LookupTable,
) -> Result<(), ImageError> {
    apply_lut_with(src, dst, lut, ExecutionStrategy::AutoRows(src.width() * C))
}

/// Same as [`apply_lut`] with an explicit execution strategy.
pub fn apply_lut_with<const C: usize>(
    src: &Image<u8, C>,
    dst: &mut Image<u8, C>,
    lut: &LookupTable,
    strategy: ExecutionStrategy,
) -> Result<(), ImageError> {
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.width(),
            src.height(),
            dst.width(),
            dst.height(),
        ));
    }

    if src.is_empty() {
        return Ok(());
    }

    src.as_slice()
        .execute_with(strategy, dst.as_slice_mut(), |(&s, d)| {
            *d = lut[s as usize]
        })?;

    Ok(())
}

/// Equalize the histogram of a grayscale image.
///
/// # Arguments
///
/// * `src` - The input grayscale image.
/// * `dst` - The output image, same size as `src`.
///
/// # Returns
///
/// [`Equalization::Degenerate`] when every pixel has the same intensity (including
/// single pixel and empty images), in which case `dst` receives an unchanged copy of
/// `src`. [`Equalization::Applied`] otherwise.
///
/// # Errors
///
/// Returns an error if the sizes of `src` and `dst` do not match.
///
/// # Example
///
/// ```
/// use pixlab_image::{Image, ImageSize};
/// use pixlab_imgproc::histogram::{equalize_histogram, Equalization};
///
/// let image = Image::<u8, 1>::new(ImageSize { width: 4, height: 1 }, vec![50, 50, 60, 70]).unwrap();
/// let mut out = Image::<u8, 1>::from_size_val(image.size(), 0).unwrap();
///
/// let outcome = equalize_histogram(&image, &mut out).unwrap();
///
/// assert_eq!(outcome, Equalization::Applied);
/// assert_eq!(out.as_slice(), &[0, 0, 127, 255]);
/// ```
pub fn equalize_histogram(
    src: &Image<u8, 1>,
    dst: &mut Image<u8, 1>,
) -> Result<Equalization, ImageError> {
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.width(),
            src.height(),
            dst.width(),
            dst.height(),
        ));
    }

    let hist = compute_histogram(src);

    let Some(lut) = equalization_lut(&hist) else {
        log::debug!("equalize_histogram: degenerate histogram on {}", src.size());
        dst.as_slice_mut().copy_from_slice(src.as_slice());
        return Ok(Equalization::Degenerate);
    };

    apply_lut(src, dst, &lut)?;

    Ok(Equalization::Applied)
}
