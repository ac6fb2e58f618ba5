use pixlab_image::{Image, ImageError, ImageSize};
use rayon::prelude::*;

/// Scale factor applied by one zoom-in step.
pub const ZOOM_IN_FACTOR: f64 = 1.1;

/// Scale factor applied by one zoom-out step.
pub const ZOOM_OUT_FACTOR: f64 = 0.9;

/// A rectangular region of an image, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Roi {
    /// Column of the top-left corner.
    pub x: usize,
    /// Row of the top-left corner.
    pub y: usize,
    /// Number of columns.
    pub width: usize,
    /// Number of rows.
    pub height: usize,
}

impl Roi {
    /// The size of the region.
    pub fn size(&self) -> ImageSize {
        ImageSize {
            width: self.width,
            height: self.height,
        }
    }
}

/// Zoom and pan state over an image of a given size.
///
/// The viewport tracks a center point and a scale; [`Viewport::roi`] gives the part of
/// the image visible at that scale, always kept inside the image.
///
/// # Example
///
/// ```
/// use pixlab_imgproc::viewport::{Roi, Viewport};
///
/// let mut viewport = Viewport::new([100, 50].into());
/// viewport.zoom(true);
/// viewport.pan(1000.0, 0.0);
///
/// assert_eq!(viewport.roi(), Roi { x: 10, y: 2, width: 90, height: 45 });
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    image_size: ImageSize,
    center: (f64, f64),
    scale: f64,
}

impl Viewport {
    /// A viewport showing the whole image.
    pub fn new(image_size: ImageSize) -> Self {
        Self {
            image_size,
            center: centered(image_size),
            scale: 1.0,
        }
    }

    /// The size of the image being viewed.
    pub fn image_size(&self) -> ImageSize {
        self.image_size
    }

    /// The current center, as `(x, y)`.
    pub fn center(&self) -> (f64, f64) {
        self.center
    }

    /// The current zoom scale, never below 1.
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Track a new image, re-centering if the current center falls outside of it.
    pub fn set_image_size(&mut self, image_size: ImageSize) {
        self.image_size = image_size;
        if self.center.0 > image_size.width as f64 || self.center.1 > image_size.height as f64 {
            self.center = centered(image_size);
        }
    }

    /// Zoom one step in or out.
    pub fn zoom(&mut self, zoom_in: bool) {
        self.scale *= if zoom_in {
            ZOOM_IN_FACTOR
        } else {
            ZOOM_OUT_FACTOR
        };
        self.scale = self.scale.max(1.0);
    }

    /// Move the center by `(dx, dy)` pixels, keeping the visible region inside the image.
    pub fn pan(&mut self, dx: f64, dy: f64) {
        let (roi_w, roi_h) = self.roi_extent();
        let (width, height) = (
            self.image_size.width as f64,
            self.image_size.height as f64,
        );

        let x = self.center.0 + dx;
        let y = self.center.1 + dy;

        self.center = (
            x.min(width - roi_w as f64 / 2.0).max(roi_w as f64 / 2.0),
            y.min(height - roi_h as f64 / 2.0).max(roi_h as f64 / 2.0),
        );
    }

    /// The visible region of the image.
    ///
    /// The region is `size / scale` pixels (at least one) around the center. When it
    /// crosses an image edge it is shifted back inside, keeping its size.
    pub fn roi(&self) -> Roi {
        let (width, height) = (self.image_size.width, self.image_size.height);
        if width == 0 || height == 0 {
            return Roi {
                x: 0,
                y: 0,
                width: 0,
                height: 0,
            };
        }

        let (roi_w, roi_h) = self.roi_extent();
        let (x, w) = clamp_span(self.center.0, roi_w, width);
        let (y, h) = clamp_span(self.center.1, roi_h, height);

        Roi {
            x,
            y,
            width: w,
            height: h,
        }
    }

    fn roi_extent(&self) -> (usize, usize) {
        let roi_w = (self.image_size.width as f64 / self.scale) as usize;
        let roi_h = (self.image_size.height as f64 / self.scale) as usize;
        (roi_w.max(1), roi_h.max(1))
    }
}

fn centered(size: ImageSize) -> (f64, f64) {
    ((size.width / 2) as f64, (size.height / 2) as f64)
}

/// Place a span of `extent` around `center` inside `[0, limit)`.
fn clamp_span(center: f64, extent: usize, limit: usize) -> (usize, usize) {
    let half = extent as f64 / 2.0;
    let start = ((center - half) as i64).max(0);
    let end = ((center + half) as i64).min(limit as i64);

    let extent = extent.min(limit) as i64;
    let (start, end) = if end - start < extent {
        if start == 0 {
            (start, start + extent)
        } else {
            (end - extent, end)
        }
    } else {
        (start, end)
    };

    let start = start.clamp(0, limit as i64) as usize;
    let end = end.clamp(0, limit as i64) as usize;
    (start, end.saturating_sub(start))
}

/// Crop an image to a specified region.
///
/// # Arguments
///
/// * `src` - The source image to crop.
/// * `dst` - The destination image, its size is the size of the region.
/// * `x` - The x-coordinate of the top-left corner of the region to crop.
/// * `y` - The y-coordinate of the top-left corner of the region to crop.
///
/// # Errors
///
/// Returns an error if the region does not fit inside `src`.
///
/// # Examples
///
/// ```rust
/// use pixlab_image::{Image, ImageSize};
/// use pixlab_imgproc::viewport::crop_image;
///
/// let image = Image::<_, 1>::new(ImageSize { width: 4, height: 4 }, vec![
///     0u8, 1, 2, 3,
///     4u8, 5, 6, 7,
///     8u8, 9, 10, 11,
///     12u8, 13, 14, 15
/// ]).unwrap();
///
/// let mut cropped = Image::<_, 1>::from_size_val(ImageSize { width: 2, height: 2 }, 0u8).unwrap();
///
/// crop_image(&image, &mut cropped, 1, 1).unwrap();
///
/// assert_eq!(cropped.as_slice(), &[5u8, 6, 9, 10]);
/// ```
pub fn crop_image<T, const C: usize>(
    src: &Image<T, C>,
    dst: &mut Image<T, C>,
    x: usize,
    y: usize,
) -> Result<(), ImageError>
where
    T: Copy + Send + Sync,
{
    if x + dst.cols() > src.cols() || y + dst.rows() > src.rows() {
        return Err(ImageError::InvalidImageSize(
            x + dst.cols(),
            y + dst.rows(),
            src.cols(),
            src.rows(),
        ));
    }

    let dst_cols = dst.cols();
    if dst_cols == 0 {
        return Ok(());
    }

    let src_cols = src.cols();
    let src_data = src.as_slice();

    dst.as_slice_mut()
        .par_chunks_exact_mut(dst_cols * C)
        .enumerate()
        .for_each(|(i, dst_row)| {
            // get the slice at the top left corner
            let offset = (y + i) * src_cols * C + x * C;
            dst_row.copy_from_slice(&src_data[offset..offset + dst_cols * C]);
        });

    Ok(())
}

/// Copy the region visible through `viewport` into a new image.
///
/// # Errors
///
/// Returns an error if `viewport` tracks a different image size than `src`.
pub fn crop_roi<T, const C: usize>(
    src: &Image<T, C>,
    viewport: &Viewport,
) -> Result<Image<T, C>, ImageError>
where
    T: Copy + Default + Send + Sync,
{
    if viewport.image_size() != src.size() {
        return Err(ImageError::InvalidImageSize(
            src.width(),
            src.height(),
            viewport.image_size().width,
            viewport.image_size().height,
        ));
    }

    let roi = viewport.roi();
    let mut dst = Image::from_size_val(roi.size(), T::default())?;
    crop_image(src, &mut dst, roi.x, roi.y)?;

    Ok(dst)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn full_view() {
        let viewport = Viewport::new([7, 5].into());

        assert_eq!(viewport.center(), (3.0, 2.0));
        assert_eq!(
            viewport.roi(),
            Roi {
                x: 0,
                y: 0,
                width: 7,
                height: 5
            }
        );
    }

    #[test]
    fn zoom_steps() {
        let mut viewport = Viewport::new([100, 100].into());

        viewport.zoom(false);
        assert_eq!(viewport.scale(), 1.0);

        viewport.zoom(true);
        viewport.zoom(true);
        assert_relative_eq!(viewport.scale(), 1.21, epsilon = 1e-12);

        // 100 / 1.21 = 82.6
        let roi = viewport.roi();
        assert_eq!((roi.width, roi.height), (82, 82));
        assert_eq!((roi.x, roi.y), (9, 9));

        viewport.zoom(false);
        assert_relative_eq!(viewport.scale(), 1.089, epsilon = 1e-12);
    }

    #[test]
    fn roi_is_shifted_inside() {
        let mut viewport = Viewport::new([100, 50].into());
        for _ in 0..8 {
            viewport.zoom(true);
        }
        // scale 2.14, region 46x23
        viewport.pan(-1000.0, 1000.0);

        let roi = viewport.roi();
        assert_eq!(roi.x, 0);
        assert_eq!(roi.y + roi.height, 50);
        assert_eq!((roi.width, roi.height), (46, 23));
    }

    #[test]
    fn pan_clamps_center() {
        let mut viewport = Viewport::new([40, 20].into());
        viewport.zoom(true);
        // region 36x18
        viewport.pan(100.0, -100.0);
        assert_eq!(viewport.center(), (22.0, 9.0));
    }

    #[test]
    fn set_image_size_recenters() {
        let mut viewport = Viewport::new([100, 100].into());

        viewport.set_image_size([120, 80].into());
        assert_eq!(viewport.center(), (50.0, 50.0));

        viewport.set_image_size([30, 30].into());
        assert_eq!(viewport.center(), (15.0, 15.0));
    }

    #[test]
    fn tiny_and_empty_images() {
        let mut viewport = Viewport::new([1, 1].into());
        for _ in 0..5 {
            viewport.zoom(true);
        }
        assert_eq!(
            viewport.roi(),
            Roi {
                x: 0,
                y: 0,
                width: 1,
                height: 1
            }
        );

        let viewport = Viewport::new([0, 0].into());
        assert_eq!(viewport.roi().size(), ImageSize::default());
    }

    #[test]
    fn crop_rgb() -> Result<(), ImageError> {
        #[rustfmt::skip]
        let image = Image::<_, 3>::new(
            [2, 3].into(),
            vec![
                0u8, 1, 2, 3, 4, 5,
                6u8, 7, 8, 9, 10, 11,
                12u8, 13, 14, 15, 16, 17,
            ],
        )?;

        let mut cropped = Image::<_, 3>::from_size_val([1, 2].into(), 0u8)?;
        crop_image(&image, &mut cropped, 1, 1)?;
        assert_eq!(cropped.as_slice(), &[9u8, 10, 11, 15, 16, 17]);

        let mut too_big = Image::<_, 3>::from_size_val([2, 2].into(), 0u8)?;
        assert_eq!(
            crop_image(&image, &mut too_big, 1, 1),
            Err(ImageError::InvalidImageSize(3, 3, 2, 3))
        );

        Ok(())
    }

    #[test]
    fn crop_through_viewport() -> Result<(), ImageError> {
        let size = ImageSize {
            width: 10,
            height: 10,
        };
        let image = Image::<u8, 1>::new(size, (0..100).collect())?;

        let mut viewport = Viewport::new(size);
        for _ in 0..8 {
            viewport.zoom(true);
        }
        viewport.pan(-100.0, -100.0);

        let roi = crop_roi(&image, &viewport)?;
        assert_eq!(roi.size(), [4, 4].into());
        assert_eq!(roi.as_slice()[..4], [0, 1, 2, 3]);
        assert_eq!(roi.as_slice()[4], 10);

        let other = Viewport::new([5, 5].into());
        assert!(crop_roi(&image, &other).is_err());

        Ok(())
    }
}
