use pixlab_image::{ops::cast_and_normalize, Image, ImageError};
use rayon::prelude::*;

use super::Kernel;
use crate::padding::{constant_padding, Padding2D};

/// Convolve an 8-bit image with a square kernel.
///
/// Samples are scaled to `[0, 1]`, every channel is zero padded by `kernel.radius()`
/// pixels and convolved independently, then the result is scaled back to `[0, 255]`,
/// clipped and truncated. Pixels close to the border see the zero padding, which
/// darkens them under averaging kernels.
///
/// 3x3 and 5x5 kernels use unrolled inner loops; any other odd side uses the generic
/// nested loop. Output rows are computed in parallel.
///
/// # Arguments
///
/// * `src` - The source image with shape (H, W, C).
/// * `dst` - The destination image with shape (H, W, C).
/// * `kernel` - The convolution kernel.
///
/// PRECONDITION: `src` and `dst` must have the same shape.
///
/// # Example
///
/// ```
/// use pixlab_image::{Image, ImageSize};
/// use pixlab_imgproc::filter::{filter2d, Kernel};
///
/// let image = Image::<u8, 1>::from_size_val(ImageSize { width: 3, height: 3 }, 90).unwrap();
/// let mut out = Image::<u8, 1>::from_size_val(image.size(), 0).unwrap();
///
/// let kernel = Kernel::from_rows(&[[1.0, 2.0, 1.0], [2.0, 4.0, 2.0], [1.0, 2.0, 1.0]]).unwrap();
/// filter2d(&image, &mut out, &kernel).unwrap();
///
/// // the center sees a full neighborhood, the corners see the zero padding
/// assert_eq!(out.get_pixel(1, 1, 0).unwrap(), &90);
/// assert!(*out.get_pixel(0, 0, 0).unwrap() < 90);
/// ```
pub fn filter2d<const C: usize>(
    src: &Image<u8, C>,
    dst: &mut Image<u8, C>,
    kernel: &Kernel,
) -> Result<(), ImageError> {
    check_same_size(src, dst)?;

    let mut src_f32 = Image::<f32, C>::from_size_val(src.size(), 0.0)?;
    cast_and_normalize(src, &mut src_f32, 255.0)?;

    let mut dst_f32 = Image::<f32, C>::from_size_val(src.size(), 0.0)?;
    filter2d_f32(&src_f32, &mut dst_f32, kernel)?;

    dst.as_slice_mut()
        .par_iter_mut()
        .zip(dst_f32.as_slice().par_iter())
        .for_each(|(out, &val)| {
            *out = (val as f64 * 255.0).clamp(0.0, 255.0) as u8;
        });

    Ok(())
}

/// Convolve a floating point image with a square kernel.
///
/// Same border handling as [`filter2d`], without any scaling or clipping of the
/// samples.
///
/// PRECONDITION: `src` and `dst` must have the same shape.
pub fn filter2d_f32<const C: usize>(
    src: &Image<f32, C>,
    dst: &mut Image<f32, C>,
    kernel: &Kernel,
) -> Result<(), ImageError> {
    check_same_size(src, dst)?;

    if src.is_empty() {
        return Ok(());
    }

    log::debug!(
        "filter2d: {}x{} kernel on {} with {} channels",
        kernel.side(),
        kernel.side(),
        src.size(),
        C
    );

    let padding = Padding2D::uniform(kernel.radius());
    let mut padded = Image::<f32, 1>::from_size_val(padding.padded_size(src.size()), 0.0)?;
    let mut plane = Image::<f32, 1>::from_size_val(src.size(), 0.0)?;

    for ch in 0..C {
        constant_padding(&src.channel(ch)?, &mut padded, padding, [0.0])?;

        match kernel.side() {
            3 => convolve_3x3(&padded, &mut plane, kernel.weights()),
            5 => convolve_5x5(&padded, &mut plane, kernel.weights()),
            _ => convolve_generic(&padded, &mut plane, kernel),
        }

        dst.set_channel(ch, &plane)?;
    }

    Ok(())
}

fn check_same_size<T1, T2, const C: usize>(
    src: &Image<T1, C>,
    dst: &Image<T2, C>,
) -> Result<(), ImageError> {
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.width(),
            src.height(),
            dst.width(),
            dst.height(),
        ));
    }
    Ok(())
}

fn convolve_3x3(padded: &Image<f32, 1>, dst: &mut Image<f32, 1>, k: &[f32]) {
    let stride = padded.width();
    let src = padded.as_slice();
    let width = dst.width();

    dst.as_slice_mut()
        .par_chunks_exact_mut(width)
        .enumerate()
        .for_each(|(y, dst_row)| {
            let r0 = &src[y * stride..(y + 1) * stride];
            let r1 = &src[(y + 1) * stride..(y + 2) * stride];
            let r2 = &src[(y + 2) * stride..(y + 3) * stride];

            for (x, out) in dst_row.iter_mut().enumerate() {
                *out = r0[x] * k[0]
                    + r0[x + 1] * k[1]
                    + r0[x + 2] * k[2]
                    + r1[x] * k[3]
                    + r1[x + 1] * k[4]
                    + r1[x + 2] * k[5]
                    + r2[x] * k[6]
                    + r2[x + 1] * k[7]
                    + r2[x + 2] * k[8];
            }
        });
}

fn convolve_5x5(padded: &Image<f32, 1>, dst: &mut Image<f32, 1>, k: &[f32]) {
    let stride = padded.width();
    let src = padded.as_slice();
    let width = dst.width();

    dst.as_slice_mut()
        .par_chunks_exact_mut(width)
        .enumerate()
        .for_each(|(y, dst_row)| {
            let r0 = &src[y * stride..(y + 1) * stride];
            let r1 = &src[(y + 1) * stride..(y + 2) * stride];
            let r2 = &src[(y + 2) * stride..(y + 3) * stride];
            let r3 = &src[(y + 3) * stride..(y + 4) * stride];
            let r4 = &src[(y + 4) * stride..(y + 5) * stride];

            for (x, out) in dst_row.iter_mut().enumerate() {
                *out = r0[x] * k[0]
                    + r0[x + 1] * k[1]
                    + r0[x + 2] * k[2]
                    + r0[x + 3] * k[3]
                    + r0[x + 4] * k[4]
                    + r1[x] * k[5]
                    + r1[x + 1] * k[6]
                    + r1[x + 2] * k[7]
                    + r1[x + 3] * k[8]
                    + r1[x + 4] * k[9]
                    + r2[x] * k[10]
                    + r2[x + 1] * k[11]
                    + r2[x + 2] * k[12]
                    + r2[x + 3] * k[13]
                    + r2[x + 4] * k[14]
                    + r3[x] * k[15]
                    + r3[x + 1] * k[16]
                    + r3[x + 2] * k[17]
                    + r3[x + 3] * k[18]
                    + r3[x + 4] * k[19]
                    + r4[x] * k[20]
                    + r4[x + 1] * k[21]
                    + r4[x + 2] * k[22]
                    + r4[x + 3] * k[23]
                    + r4[x + 4] * k[24];
            }
        });
}

fn convolve_generic(padded: &Image<f32, 1>, dst: &mut Image<f32, 1>, kernel: &Kernel) {
    let stride = padded.width();
    let src = padded.as_slice();
    let width = dst.width();
    let side = kernel.side();
    let weights = kernel.weights();

    dst.as_slice_mut()
        .par_chunks_exact_mut(width)
        .enumerate()
        .for_each(|(y, dst_row)| {
            for (x, out) in dst_row.iter_mut().enumerate() {
                let mut sum = 0.0f32;
                for (ky, k_row) in weights.chunks_exact(side).enumerate() {
                    let src_row = &src[(y + ky) * stride + x..(y + ky) * stride + x + side];
                    for (&s, &w) in src_row.iter().zip(k_row) {
                        sum += s * w;
                    }
                }
                *out = sum;
            }
        });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::KernelCatalog;
    use approx::assert_relative_eq;
    use pixlab_image::ImageSize;

    fn box_kernel(side: usize) -> Result<Kernel, ImageError> {
        Kernel::new(side, vec![1.0; side * side])
    }

    #[test]
    fn constant_image_box_3x3() -> Result<(), ImageError> {
        let size = ImageSize {
            width: 5,
            height: 5,
        };
        let image = Image::<u8, 1>::from_size_val(size, 100)?;
        let mut out = Image::<u8, 1>::from_size_val(size, 0)?;

        filter2d(&image, &mut out, &box_kernel(3)?)?;

        #[rustfmt::skip]
        let expected = [
            44, 66, 66, 66, 44,
            66, 100, 100, 100, 66,
            66, 100, 100, 100, 66,
            66, 100, 100, 100, 66,
            44, 66, 66, 66, 44,
        ];
        assert_eq!(out.as_slice(), &expected);

        Ok(())
    }

    #[test]
    fn averaging_kernels_keep_flat_regions() -> Result<(), ImageError> {
        let size = ImageSize {
            width: 7,
            height: 7,
        };
        let catalog = KernelCatalog::with_presets()?;
        let mut kernels = vec![box_kernel(3)?, box_kernel(5)?];
        for name in ["Gaussian 3x3", "Gaussian 5x5", "Softening"] {
            kernels.extend(catalog.get(name).cloned());
        }
        assert_eq!(kernels.len(), 5);

        let mut out = Image::<u8, 1>::from_size_val(size, 0)?;
        for value in 0..=255u8 {
            let image = Image::<u8, 1>::from_size_val(size, value)?;
            for kernel in &kernels {
                filter2d(&image, &mut out, kernel)?;
                // the f32 sum is truncated, so a level can be lost
                let center = *out.get_pixel(3, 3, 0)? as i32;
                assert!(
                    (center - value as i32).abs() <= 1,
                    "{value} -> {center} with side {}",
                    kernel.side()
                );
            }
        }

        Ok(())
    }

    #[test]
    fn sobel_horizontal_checkerboard() -> Result<(), ImageError> {
        let size = ImageSize {
            width: 4,
            height: 4,
        };
        let data = (0..16)
            .map(|i| if (i / 4 + i % 4) % 2 == 0 { 0 } else { 255 })
            .collect();
        let image = Image::<u8, 1>::new(size, data)?;
        let mut out = Image::<u8, 1>::from_size_val(size, 1)?;

        let catalog = KernelCatalog::with_presets()?;
        let sobel = catalog.get("Sobel Horizontal").expect("preset exists");
        filter2d(&image, &mut out, sobel)?;

        #[rustfmt::skip]
        let expected = [
            255, 0, 0, 0,
            255, 0, 0, 0,
            255, 0, 0, 0,
            255, 0, 0, 0,
        ];
        assert_eq!(out.as_slice(), &expected);

        // interior 2x2 block
        for y in 1..3 {
            for x in 1..3 {
                assert_eq!(out.get_pixel(x, y, 0)?, &0);
            }
        }

        Ok(())
    }

    #[test]
    fn identity_kernel_is_lossless() -> Result<(), ImageError> {
        let size = ImageSize {
            width: 16,
            height: 16,
        };
        let data = (0..=255u8).collect();
        let image = Image::<u8, 1>::new(size, data)?;
        let mut out = Image::<u8, 1>::from_size_val(size, 0)?;

        filter2d(&image, &mut out, &Kernel::identity())?;
        assert_eq!(out, image);

        Ok(())
    }

    #[test]
    fn fast_paths_match_generic() -> Result<(), ImageError> {
        let size = ImageSize {
            width: 7,
            height: 6,
        };
        let data = (0..size.area()).map(|i| (i * 37 % 101) as f32 / 100.0).collect();
        let image = Image::<f32, 1>::new(size, data)?;

        let padding = Padding2D::uniform(2);
        let mut padded = Image::<f32, 1>::from_size_val(padding.padded_size(size), 0.0)?;
        constant_padding(&image, &mut padded, padding, [0.0])?;

        let kernel = Kernel::new(5, (0..25).map(|i| i as f32 - 12.0).collect())?;
        let mut fast = Image::<f32, 1>::from_size_val(size, 0.0)?;
        let mut generic = Image::<f32, 1>::from_size_val(size, 0.0)?;
        convolve_5x5(&padded, &mut fast, kernel.weights());
        convolve_generic(&padded, &mut generic, &kernel);

        for (a, b) in fast.as_slice().iter().zip(generic.as_slice()) {
            assert_relative_eq!(a, b, epsilon = 1e-4);
        }

        Ok(())
    }

    #[test]
    fn generic_path_7x7() -> Result<(), ImageError> {
        let size = ImageSize {
            width: 9,
            height: 9,
        };
        let image = Image::<u8, 1>::from_size_val(size, 70)?;
        let mut out = Image::<u8, 1>::from_size_val(size, 0)?;

        filter2d(&image, &mut out, &Kernel::new(7, vec![1.0; 49])?)?;

        let center = *out.get_pixel(4, 4, 0)? as i32;
        assert!((center - 70).abs() <= 1);
        assert!(*out.get_pixel(0, 0, 0)? < 70 / 3);

        Ok(())
    }

    #[test]
    fn channels_are_independent() -> Result<(), ImageError> {
        let size = ImageSize {
            width: 3,
            height: 3,
        };
        let data = [10u8, 200, 0].repeat(size.area());
        let image = Image::<u8, 3>::new(size, data)?;
        let mut out = Image::<u8, 3>::from_size_val(size, 0)?;

        let kernel = Kernel::from_rows(&[[0.0, 0.0, 0.0], [0.0, 2.0, 0.0], [0.0, 0.0, 0.0]])?;
        filter2d(&image, &mut out, &kernel)?;

        // weights sum to 2 and get normalized back to the identity
        assert_eq!(out, image);

        Ok(())
    }

    #[test]
    fn saturates_instead_of_wrapping() -> Result<(), ImageError> {
        let size = ImageSize {
            width: 3,
            height: 3,
        };
        let image = Image::<u8, 1>::from_size_val(size, 200)?;
        let mut out = Image::<u8, 1>::from_size_val(size, 0)?;

        let sharpen = KernelCatalog::with_presets()?
            .get("Laplace High Pass Filter (3x3)")
            .cloned()
            .expect("preset exists");
        filter2d(&image, &mut out, &sharpen)?;

        // a flat neighborhood cancels out, corners lose five neighbors to the padding
        assert_eq!(out.get_pixel(1, 1, 0)?, &0);
        assert_eq!(out.get_pixel(0, 0, 0)?, &255);

        Ok(())
    }

    #[test]
    fn size_mismatch() -> Result<(), ImageError> {
        let image = Image::<u8, 1>::from_size_val([3, 3].into(), 0)?;
        let mut out = Image::<u8, 1>::from_size_val([3, 4].into(), 0)?;
        assert_eq!(
            filter2d(&image, &mut out, &Kernel::identity()),
            Err(ImageError::InvalidImageSize(3, 3, 3, 4))
        );
        Ok(())
    }
}
