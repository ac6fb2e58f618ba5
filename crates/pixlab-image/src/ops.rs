use crate::{Image, ImageError};

/// Cast the pixel data of an image to a different type, dividing every value by `max`.
///
/// Used to bring 8-bit samples into `[0, 1]` before floating point processing. The
/// division is done in the target type, so `255u8` with `max = 255.0` maps exactly to
/// `1.0`.
///
/// # Arguments
///
/// * `src` - The source image.
/// * `dst` - The destination image, same size as `src`.
/// * `max` - The value mapped to one.
///
/// Example:
///
/// ```
/// use pixlab_image::{Image, ImageSize};
/// use pixlab_image::ops::cast_and_normalize;
///
/// let image = Image::<u8, 1>::new(
///   ImageSize {
///     width: 2,
///     height: 1,
///   },
///   vec![0u8, 255],
/// ).unwrap();
///
/// let mut image_f32 = Image::from_size_val(image.size(), 0.0f32).unwrap();
///
/// cast_and_normalize(&image, &mut image_f32, 255.0).unwrap();
///
/// assert_eq!(image_f32.get_pixel(0, 0, 0).unwrap(), &0.0f32);
/// assert_eq!(image_f32.get_pixel(1, 0, 0).unwrap(), &1.0f32);
/// ```
pub fn cast_and_normalize<T, U, const C: usize>(
    src: &Image<T, C>,
    dst: &mut Image<U, C>,
    max: U,
) -> Result<(), ImageError>
where
    T: Copy + num_traits::NumCast,
    U: Copy + num_traits::NumCast + std::ops::Div<U, Output = U>,
{
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.width(),
            src.height(),
            dst.width(),
            dst.height(),
        ));
    }

    dst.as_slice_mut()
        .iter_mut()
        .zip(src.as_slice().iter())
        .try_for_each(|(out, &inp)| {
            let x = U::from(inp).ok_or(ImageError::CastError(
                std::any::type_name::<U>().to_string(),
            ))?;
            *out = x / max;
            Ok::<(), ImageError>(())
        })?;

    Ok(())
}
