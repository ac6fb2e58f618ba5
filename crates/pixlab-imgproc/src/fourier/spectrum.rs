use pixlab_image::{Image, ImageError};
use rayon::prelude::*;

use super::{build_mask, fft, FilterKind, FrequencyMask, Spectrum};

/// Multiply a spectrum by a mask and transform it back to an image.
///
/// The magnitude of every reconstructed sample is truncated to `u8`, saturating at 255.
///
/// # Arguments
///
/// * `spectrum` - The centered spectrum, as returned by [`super::forward_transform`].
/// * `mask` - The weights to apply, same size as the spectrum.
/// * `dst` - The reconstructed image, same size as the spectrum.
///
/// # Errors
///
/// Returns an error if the mask or `dst` differ in size from the spectrum. Nothing is
/// computed in that case.
pub fn apply_mask_and_invert(
    spectrum: &Spectrum,
    mask: &FrequencyMask,
    dst: &mut Image<u8, 1>,
) -> Result<(), ImageError> {
    let size = spectrum.size();

    if mask.size() != size {
        return Err(ImageError::InvalidImageSize(
            size.width,
            size.height,
            mask.size().width,
            mask.size().height,
        ));
    }

    if dst.size() != size {
        return Err(ImageError::InvalidImageSize(
            size.width,
            size.height,
            dst.width(),
            dst.height(),
        ));
    }

    let filtered = spectrum
        .as_slice()
        .par_iter()
        .zip(mask.as_slice().par_iter())
        .map(|(&c, &w)| c * w)
        .collect::<Vec<_>>();

    let back = fft::inverse_transform(size, &filtered);

    dst.as_slice_mut()
        .par_iter_mut()
        .zip(back.par_iter())
        .for_each(|(out, c)| *out = c.norm() as u8);

    Ok(())
}

/// Render the log-magnitude of a spectrum for display.
///
/// Every coefficient becomes `20 * log10(|X|)`, clipped to `[0, 255]` and truncated.
/// Coefficients of zero magnitude map to 0.
///
/// PRECONDITION: `dst` must have the size of the spectrum.
pub fn magnitude_spectrum(spectrum: &Spectrum, dst: &mut Image<u8, 1>) -> Result<(), ImageError> {
    let size = spectrum.size();
    if dst.size() != size {
        return Err(ImageError::InvalidImageSize(
            size.width,
            size.height,
            dst.width(),
            dst.height(),
        ));
    }

    dst.as_slice_mut()
        .par_iter_mut()
        .zip(spectrum.as_slice().par_iter())
        .for_each(|(out, c)| {
            let norm = c.norm();
            *out = if norm > 0.0 {
                (20.0 * norm.log10()).clamp(0.0, 255.0) as u8
            } else {
                0
            };
        });

    Ok(())
}

/// Filter a grayscale image in the frequency domain.
///
/// Runs the forward transform, builds the mask with the default center, writes the
/// filtered image to `dst` and the log-magnitude of the unfiltered spectrum to
/// `spectrum_dst`.
///
/// # Errors
///
/// Returns an error if the image is empty, if the filter parameters are invalid, or
/// if `dst` or `spectrum_dst` differ in size from `src`.
///
/// # Example
///
/// ```
/// use pixlab_image::Image;
/// use pixlab_imgproc::fourier::{frequency_filter, FilterKind};
///
/// let image = Image::<u8, 1>::new([4, 1].into(), vec![0, 200, 0, 200]).unwrap();
/// let mut out = Image::<u8, 1>::from_size_val(image.size(), 0).unwrap();
/// let mut spectrum = Image::<u8, 1>::from_size_val(image.size(), 0).unwrap();
///
/// frequency_filter(&image, FilterKind::IdealHighPass, 0.0, &mut out, &mut spectrum).unwrap();
///
/// assert_eq!(out.as_slice(), image.as_slice());
/// ```
pub fn frequency_filter(
    src: &Image<u8, 1>,
    kind: FilterKind,
    radius: f64,
    dst: &mut Image<u8, 1>,
    spectrum_dst: &mut Image<u8, 1>,
) -> Result<(), ImageError> {
    for out in [dst.size(), spectrum_dst.size()] {
        if out != src.size() {
            return Err(ImageError::InvalidImageSize(
                src.width(),
                src.height(),
                out.width,
                out.height,
            ));
        }
    }

    let spectrum = super::forward_transform(src)?;
    let mask = build_mask(kind, spectrum.size(), radius)?;

    apply_mask_and_invert(&spectrum, &mask, dst)?;
    magnitude_spectrum(&spectrum, spectrum_dst)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fourier::{build_mask_with_center, forward_transform, MaskCenter};
    use pixlab_image::ImageSize;

    fn pattern(size: ImageSize) -> Result<Image<u8, 1>, ImageError> {
        let data = (0..size.area()).map(|i| (i * 53 % 251) as u8).collect();
        Image::new(size, data)
    }

    #[test]
    fn all_pass_reconstructs() -> Result<(), ImageError> {
        let size = ImageSize {
            width: 12,
            height: 9,
        };
        let image = pattern(size)?;
        let mut out = Image::<u8, 1>::from_size_val(size, 0)?;

        let spectrum = forward_transform(&image)?;
        apply_mask_and_invert(&spectrum, &FrequencyMask::all_pass(size), &mut out)?;

        // truncation of the magnitude may lose one level
        for (a, b) in out.as_slice().iter().zip(image.as_slice()) {
            assert!(*b as i32 - *a as i32 <= 1 && a <= b, "{a} vs {b}");
        }

        Ok(())
    }

    #[test]
    fn ideal_low_pass_zero_radius_keeps_mean() -> Result<(), ImageError> {
        let size = ImageSize {
            width: 8,
            height: 8,
        };
        let image = pattern(size)?;
        let mean = image.as_slice().iter().map(|&v| v as f64).sum::<f64>() / 64.0;
        let mut out = Image::<u8, 1>::from_size_val(size, 0)?;

        let spectrum = forward_transform(&image)?;
        let mask = build_mask(FilterKind::IdealLowPass, size, 0.0)?;
        apply_mask_and_invert(&spectrum, &mask, &mut out)?;

        let first = out.as_slice()[0];
        assert!(out.as_slice().iter().all(|&v| v == first));
        assert!((first as f64 - mean).abs() <= 1.0);

        Ok(())
    }

    #[test]
    fn shared_axis_mask_misses_dc_on_wide_images() -> Result<(), ImageError> {
        let size = ImageSize {
            width: 8,
            height: 4,
        };
        let image = Image::<u8, 1>::from_size_val(size, 100)?;
        let mut out = Image::<u8, 1>::from_size_val(size, 0)?;
        let spectrum = forward_transform(&image)?;

        let shared = build_mask(FilterKind::IdealLowPass, size, 1.0)?;
        apply_mask_and_invert(&spectrum, &shared, &mut out)?;
        assert!(out.as_slice().iter().all(|&v| v == 0));

        let per_axis =
            build_mask_with_center(FilterKind::IdealLowPass, size, 1.0, MaskCenter::PerAxis)?;
        apply_mask_and_invert(&spectrum, &per_axis, &mut out)?;
        assert!(out.as_slice().iter().all(|&v| (99..=100).contains(&v)));

        Ok(())
    }

    #[test]
    fn magnitude_of_constant_image() -> Result<(), ImageError> {
        let size = ImageSize {
            width: 4,
            height: 4,
        };
        let image = Image::<u8, 1>::from_size_val(size, 10)?;
        let mut out = Image::<u8, 1>::from_size_val(size, 7)?;

        magnitude_spectrum(&forward_transform(&image)?, &mut out)?;

        // 20 * log10(160) at the center, zero elsewhere
        assert_eq!(out.get_pixel(2, 2, 0)?, &44);
        assert_eq!(out.as_slice().iter().filter(|&&v| v != 0).count(), 1);

        Ok(())
    }

    #[test]
    fn size_mismatch() -> Result<(), ImageError> {
        let size = ImageSize {
            width: 4,
            height: 4,
        };
        let image = pattern(size)?;
        let spectrum = forward_transform(&image)?;
        let mut out = Image::<u8, 1>::from_size_val(size, 0)?;

        let mask = FrequencyMask::all_pass([4, 3].into());
        assert_eq!(
            apply_mask_and_invert(&spectrum, &mask, &mut out),
            Err(ImageError::InvalidImageSize(4, 4, 4, 3))
        );

        let mut small = Image::<u8, 1>::from_size_val([2, 2].into(), 0)?;
        assert_eq!(
            magnitude_spectrum(&spectrum, &mut small),
            Err(ImageError::InvalidImageSize(4, 4, 2, 2))
        );
        assert_eq!(
            frequency_filter(&image, FilterKind::IdealLowPass, 1.0, &mut out, &mut small),
            Err(ImageError::InvalidImageSize(4, 4, 2, 2))
        );

        Ok(())
    }
}
