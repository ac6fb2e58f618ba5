use pixlab_image::{Image, ImageError, ImageSize};
use rayon::prelude::*;

/// Represents 2D padding with top, bottom, left, and right values (in pixels).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Padding2D {
    /// Amount of padding to add on the top side.
    pub top: usize,
    /// Amount of padding to add on the bottom side.
    pub bottom: usize,
    /// Amount of padding to add on the left side.
    pub left: usize,
    /// Amount of padding to add on the right side.
    pub right: usize,
}

impl Padding2D {
    /// The same amount of padding on every side.
    pub fn uniform(pad: usize) -> Self {
        Self {
            top: pad,
            bottom: pad,
            left: pad,
            right: pad,
        }
    }

    /// The size of an image of `size` once this padding is applied.
    pub fn padded_size(&self, size: ImageSize) -> ImageSize {
        ImageSize {
            width: size.width + self.left + self.right,
            height: size.height + self.top + self.bottom,
        }
    }

    /// Validates that a new image size correctly matches the expected dimensions
    /// after applying this padding to an existing image.
    ///
    /// # Example
    /// ```rust
    /// use pixlab_image::ImageSize;
    /// use pixlab_imgproc::padding::Padding2D;
    /// let padding = Padding2D { top: 1, bottom: 1, left: 2, right: 2 };
    /// let old_size = ImageSize { width: 4, height: 4 };
    /// let new_size = ImageSize { width: 8, height: 6 };
    ///
    /// assert!(padding.validate_size(old_size, new_size));
    /// ```
    pub fn validate_size(&self, old_size: ImageSize, new_size: ImageSize) -> bool {
        self.padded_size(old_size) == new_size
    }
}

/// Pads an image with a constant value, centering the original image in `dst`.
///
/// # Arguments
///
/// * `src` - The source image to pad.
/// * `dst` - The destination image where the padded output will be stored.
/// * `padding` - The amount of padding (in pixels) for all four sides.
/// * `constant_value` - The pixel value written to the border, one value per channel.
///
/// # Errors
///
/// Returns an error if the size of `dst` does not match the padded size of `src`.
///
/// # Example
///
/// ```rust
/// use pixlab_image::{ImageSize, Image};
/// use pixlab_imgproc::padding::{constant_padding, Padding2D};
///
/// let src = Image::<u8, 1>::new(ImageSize { width: 2, height: 2 }, vec![1, 2, 3, 4]).unwrap();
/// let mut dst = Image::<u8, 1>::from_size_val(ImageSize { width: 4, height: 4 }, 9).unwrap();
///
/// constant_padding(&src, &mut dst, Padding2D::uniform(1), [0]).unwrap();
///
/// assert_eq!(
///     dst.as_slice(),
///     &[0, 0, 0, 0, 0, 1, 2, 0, 0, 3, 4, 0, 0, 0, 0, 0]
/// );
/// ```
pub fn constant_padding<T, const C: usize>(
    src: &Image<T, C>,
    dst: &mut Image<T, C>,
    padding: Padding2D,
    constant_value: [T; C],
) -> Result<(), ImageError>
where
    T: Copy + Send + Sync,
{
    if !padding.validate_size(src.size(), dst.size()) {
        let expected = padding.padded_size(src.size());
        return Err(ImageError::InvalidImageSize(
            dst.width(),
            dst.height(),
            expected.width,
            expected.height,
        ));
    }

    let old_stride = src.width() * C;
    let new_stride = dst.width() * C;
    if new_stride == 0 {
        return Ok(());
    }

    let left = padding.left * C;
    let top = padding.top;
    let old_height = src.height();
    let old_data = src.as_slice();

    dst.as_slice_mut()
        .par_chunks_exact_mut(new_stride)
        .enumerate()
        .for_each(|(y, dst_row)| {
            dst_row
                .chunks_exact_mut(C)
                .for_each(|px| px.copy_from_slice(&constant_value));

            if old_stride == 0 || y < top || y >= top + old_height {
                return;
            }

            let src_y = y - top;
            let src_row = &old_data[src_y * old_stride..(src_y + 1) * old_stride];
            dst_row[left..left + old_stride].copy_from_slice(src_row);
        });

    Ok(())
}
