//! Turning a decoded image into a flat buffer of pixel samples.

use image::{DynamicImage, GenericImageView, imageops::FilterType};

use crate::{ColorSpace, PaletteError, PaletteOptions, PixelSample, Result, color};

/// Flatten `img` into one sample per pixel (row-major) in the requested color space.
///
/// When `options.downscale` is set the image is first shrunk with nearest-neighbour
/// sampling so that its longest side equals that value. Images already smaller
/// are left untouched.
pub fn sample(img: &DynamicImage, options: &PaletteOptions) -> Result<Vec<PixelSample>> {
    let working = match options.downscale {
        Some(max_side) => downscale(img, max_side),
        None => None,
    };
    let img = working.as_ref().unwrap_or(img);

    let raw = img.to_rgba8().into_raw();
    let mut samples: Vec<PixelSample> = raw
        .chunks_exact(4)
        .filter(|px| !(options.skip_transparent && px[3] == 0))
        .map(|px| [px[0], px[1], px[2]])
        .collect();

    if samples.is_empty() {
        return Err(PaletteError::EmptyImage);
    }

    if options.color_space == ColorSpace::Hsv {
        color::samples_to_hsv(&mut samples);
    }

    tracing::debug!(
        width = img.width(),
        height = img.height(),
        samples = samples.len(),
        color_space = %options.color_space,
        "sampled image"
    );

    Ok(samples)
}

fn downscale(img: &DynamicImage, max_side: u32) -> Option<DynamicImage> {
    let (orig_w, orig_h) = img.dimensions();
    let longest = orig_w.max(orig_h);
    if max_side == 0 || longest <= max_side {
        return None;
    }

    let ratio = max_side as f32 / longest as f32;
    let w = ((orig_w as f32) * ratio).round().max(1.0) as u32;
    let h = ((orig_h as f32) * ratio).round().max(1.0) as u32;
    Some(DynamicImage::ImageRgba8(image::imageops::resize(
        img,
        w,
        h,
        FilterType::Nearest,
    )))
}
