use std::path::Path;

use pixlab_image::{Image, ImageSize};

use crate::error::IoError;

/// Reads an image from the given file path as 8-bit BGR.
///
/// The method tries to read from any image format supported by the image crate,
/// guessing it from the file content. Grayscale and alpha images are expanded or
/// flattened to three channels.
///
/// # Arguments
///
/// * `file_path` - The path to a valid image file.
///
/// # Returns
///
/// An image with the channels in BGR order.
pub fn read_image_any_bgr8(file_path: impl AsRef<Path>) -> Result<Image<u8, 3>, IoError> {
    let file_path = file_path.as_ref().to_owned();

    // verify the file exists
    if !file_path.exists() {
        return Err(IoError::FileDoesNotExist(file_path));
    }

    let img = image::ImageReader::open(&file_path)?
        .with_guessed_format()?
        .decode()?;

    if img.color() != image::ColorType::Rgb8 {
        log::warn!(
            "converting {:?} image {} to 8-bit BGR",
            img.color(),
            file_path.display()
        );
    }

    let size = ImageSize {
        width: img.width() as usize,
        height: img.height() as usize,
    };

    let mut data = img.into_rgb8().into_raw();
    swap_red_blue(&mut data);

    Ok(Image::new(size, data)?)
}

/// Writes a BGR image to the given file path.
///
/// The format is chosen from the file extension.
///
/// # Arguments
///
/// * `file_path` - The path to the output image.
/// * `image` - The image with the channels in BGR order.
pub fn write_image_bgr8(file_path: impl AsRef<Path>, image: &Image<u8, 3>) -> Result<(), IoError> {
    let mut data = image.as_slice().to_vec();
    swap_red_blue(&mut data);

    save(
        file_path.as_ref(),
        &data,
        image.size(),
        image::ExtendedColorType::Rgb8,
    )
}

/// Writes a grayscale image to the given file path.
///
/// The format is chosen from the file extension.
pub fn write_image_gray8(
    file_path: impl AsRef<Path>,
    image: &Image<u8, 1>,
) -> Result<(), IoError> {
    save(
        file_path.as_ref(),
        image.as_slice(),
        image.size(),
        image::ExtendedColorType::L8,
    )
}

fn save(
    file_path: &Path,
    data: &[u8],
    size: ImageSize,
    color: image::ExtendedColorType,
) -> Result<(), IoError> {
    let format = image::ImageFormat::from_path(file_path)
        .map_err(|_| IoError::InvalidFileExtension(file_path.to_path_buf()))?;

    let (width, height) = (
        u32::try_from(size.width).map_err(|_| IoError::UnsupportedImageFormat)?,
        u32::try_from(size.height).map_err(|_| IoError::UnsupportedImageFormat)?,
    );

    image::save_buffer_with_format(file_path, data, width, height, color, format)?;

    Ok(())
}

fn swap_red_blue(data: &mut [u8]) {
    data.chunks_exact_mut(3).for_each(|px| px.swap(0, 2));
}
