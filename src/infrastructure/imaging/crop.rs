use image::{imageops::{self, FilterType}, DynamicImage, Rgb, RgbImage};

use crate::{
    infrastructure::imaging::{decode_image, encode_jpeg, ImagingError},
    settings::ImagingSettings,
};

/// Source rectangle in source pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CropRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone)]
pub struct CropOptions {
    pub aspect_w: u32,
    pub aspect_h: u32,
    pub output_width: u32,
    pub output_height: u32,
    pub background: Rgb<u8>,
    pub jpeg_quality: u8,
}

impl Default for CropOptions {
    fn default() -> Self {
        CropOptions::from(&ImagingSettings::default())
    }
}

impl From<&ImagingSettings> for CropOptions {
    fn from(settings: &ImagingSettings) -> Self {
        CropOptions {
            aspect_w: settings.aspect_w,
            aspect_h: settings.aspect_h,
            output_width: settings.output_width,
            output_height: settings.output_height,
            background: Rgb(settings.background),
            jpeg_quality: settings.jpeg_quality,
        }
    }
}

/// Largest rect of the target aspect that fits the source.
///
/// Sources wider than the target are cropped horizontally around the center; narrower
/// (or equal) ones keep the full width and are anchored at the top, so heads stay in frame.
pub fn compute_crop_rect(src_width: u32, src_height: u32, aspect_w: u32, aspect_h: u32) -> CropRect {
    let target_aspect = aspect_w as f64 / aspect_h as f64;
    let src_w = src_width as f64;
    let src_h = src_height as f64;
    let source_aspect = src_w / src_h;

    if source_aspect > target_aspect {
        let width = src_h * target_aspect;
        CropRect {
            x: (src_w - width) / 2.0,
            y: 0.0,
            width,
            height: src_h,
        }
    } else {
        CropRect {
            x: 0.0,
            y: 0.0,
            width: src_w,
            height: src_w / target_aspect,
        }
    }
}

/// Draws the crop of `source` onto a background-filled canvas of the output size.
pub fn crop_image(source: &DynamicImage, options: &CropOptions) -> RgbImage {
    let mut canvas = RgbImage::from_pixel(options.output_width, options.output_height, options.background);

    let rgb = source.to_rgb8();
    let (src_w, src_h) = rgb.dimensions();
    if src_w == 0 || src_h == 0 {
        return canvas;
    }

    let rect = compute_crop_rect(src_w, src_h, options.aspect_w, options.aspect_h);

    // Only the part of the rect that lies inside the source is drawn; the rest stays background.
    let x0 = rect.x.max(0.0).floor() as u32;
    let y0 = rect.y.max(0.0).floor() as u32;
    let x1 = ((rect.x + rect.width).min(src_w as f64).ceil() as u32).min(src_w);
    let y1 = ((rect.y + rect.height).min(src_h as f64).ceil() as u32).min(src_h);
    if x1 <= x0 || y1 <= y0 {
        return canvas;
    }

    let scale_x = options.output_width as f64 / rect.width;
    let scale_y = options.output_height as f64 / rect.height;

    let dest_w = (((x1 - x0) as f64 * scale_x).round() as u32).max(1);
    let dest_h = (((y1 - y0) as f64 * scale_y).round() as u32).max(1);
    let dest_x = ((x0 as f64 - rect.x) * scale_x).round() as i64;
    let dest_y = ((y0 as f64 - rect.y) * scale_y).round() as i64;

    let region = imageops::crop_imm(&rgb, x0, y0, x1 - x0, y1 - y0).to_image();
    let scaled = imageops::resize(&region, dest_w, dest_h, FilterType::Triangle);
    imageops::overlay(&mut canvas, &scaled, dest_x, dest_y);

    canvas
}

/// Decodes, crops and re-encodes an image as JPEG at the configured size.
pub fn crop_to_aspect(bytes: &[u8], options: &CropOptions) -> Result<Vec<u8>, ImagingError> {
    let source = decode_image(bytes)?;
    let cropped = crop_image(&source, options);
    encode_jpeg(&cropped, options.jpeg_quality)
}
