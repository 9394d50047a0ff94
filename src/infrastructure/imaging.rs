pub mod card;
pub mod crop;

use std::io::Cursor;

use derive_more::Display;
use image::{codecs::jpeg::JpegEncoder, DynamicImage, RgbImage};

#[derive(Debug, Display)]
pub enum ImagingError {
    #[display("Image failed to decode: {_0}")]
    Decode(String),

    #[display("Image failed to encode: {_0}")]
    Encode(String),
}

impl std::error::Error for ImagingError {}

pub fn decode_image(bytes: &[u8]) -> Result<DynamicImage, ImagingError> {
    image::load_from_memory(bytes).map_err(|e| ImagingError::Decode(e.to_string()))
}

pub fn encode_jpeg(image: &RgbImage, quality: u8) -> Result<Vec<u8>, ImagingError> {
    let mut buffer = Cursor::new(Vec::new());
    JpegEncoder::new_with_quality(&mut buffer, quality.clamp(1, 100))
        .encode_image(image)
        .map_err(|e| ImagingError::Encode(e.to_string()))?;
    Ok(buffer.into_inner())
}
