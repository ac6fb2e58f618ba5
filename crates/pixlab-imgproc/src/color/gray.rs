use crate::parallel;
use pixlab_image::{Image, ImageError};

/// Average the three channels of a pixel, truncating the result.
#[inline]
fn channel_mean(pixel: &[u8]) -> u8 {
    ((pixel[0] as u16 + pixel[1] as u16 + pixel[2] as u16) / 3) as u8
}

fn check_same_size<T1, const C1: usize, T2, const C2: usize>(
    src: &Image<T1, C1>,
    dst: &Image<T2, C2>,
) -> Result<(), ImageError> {
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.cols(),
            src.rows(),
            dst.cols(),
            dst.rows(),
        ));
    }
    Ok(())
}

/// Convert a BGR8 image to a single channel grayscale image using the formula:
///
/// Y = (B + G + R) / 3
///
/// The division truncates, so the output is the integer part of the channel mean.
///
/// # Arguments
///
/// * `src` - The input BGR8 image.
/// * `dst` - The output grayscale image.
///
/// Precondition: the input and output images must have the same size.
///
/// # Example
///
/// ```
/// use pixlab_image::{Image, ImageSize};
/// use pixlab_imgproc::color::gray_from_bgr_u8;
///
/// let image = Image::<u8, 3>::new(
///     ImageSize { width: 2, height: 1 },
///     vec![10, 20, 30, 255, 255, 254],
/// )
/// .unwrap();
///
/// let mut gray = Image::<u8, 1>::from_size_val(image.size(), 0).unwrap();
///
/// gray_from_bgr_u8(&image, &mut gray).unwrap();
/// assert_eq!(gray.as_slice(), &[20, 254]);
/// ```
pub fn gray_from_bgr_u8(src: &Image<u8, 3>, dst: &mut Image<u8, 1>) -> Result<(), ImageError> {
    check_same_size(src, dst)?;

    parallel::par_iter_rows(src, dst, |src_pixel, dst_pixel| {
        dst_pixel[0] = channel_mean(src_pixel);
    });

    Ok(())
}

/// Convert a BGR8 image to grayscale while keeping three channels.
///
/// Each output pixel holds the truncated channel mean in all of its channels, so the
/// result can flow through code that expects colour images.
///
/// # Arguments
///
/// * `src` - The input BGR8 image.
/// * `dst` - The output three channel grayscale image.
///
/// Precondition: the input and output images must have the same size.
pub fn gray3_from_bgr_u8(src: &Image<u8, 3>, dst: &mut Image<u8, 3>) -> Result<(), ImageError> {
    check_same_size(src, dst)?;

    parallel::par_iter_rows(src, dst, |src_pixel, dst_pixel| {
        let gray = channel_mean(src_pixel);
        dst_pixel[0] = gray;
        dst_pixel[1] = gray;
        dst_pixel[2] = gray;
    });

    Ok(())
}

/// Convert a grayscale image to a BGR image by replicating the grayscale value across all three channels.
///
/// # Arguments
///
/// * `src` - The input grayscale image.
/// * `dst` - The output BGR image.
///
/// Precondition: the input and output images must have the same size.
pub fn bgr_from_gray<T>(src: &Image<T, 1>, dst: &mut Image<T, 3>) -> Result<(), ImageError>
where
    T: Copy + Send + Sync,
{
    check_same_size(src, dst)?;

    parallel::par_iter_rows(src, dst, |src_pixel, dst_pixel| {
        dst_pixel[0] = src_pixel[0];
        dst_pixel[1] = src_pixel[0];
        dst_pixel[2] = src_pixel[0];
    });

    Ok(())
}
