use std::io::Cursor;

use base64::{engine::general_purpose::STANDARD, Engine};
use image::codecs::jpeg::JpegEncoder;
use image::{ImageFormat, RgbImage};
use stockmeta_core::{AppError, AppResult};

/// A JPEG frame ready to embed in a vision request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedPreview {
    pub width: u32,
    pub height: u32,
    /// Base64 of the JPEG bytes
    pub data: String,
}

impl EncodedPreview {
    pub const MEDIA_TYPE: &'static str = "image/jpeg";

    pub fn from_image(img: &RgbImage, quality: u8) -> AppResult<Self> {
        let jpeg = encode_jpeg(img, quality)?;
        Ok(Self {
            width: img.width(),
            height: img.height(),
            data: STANDARD.encode(jpeg),
        })
    }

    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", Self::MEDIA_TYPE, self.data)
    }
}

pub fn encode_jpeg(img: &RgbImage, quality: u8) -> AppResult<Vec<u8>> {
    let mut buf = Vec::new();
    JpegEncoder::new_with_quality(&mut buf, quality)
        .encode_image(img)
        .map_err(|e| AppError::Media(format!("JPEG encoding failed: {}", e)))?;
    Ok(buf)
}

pub fn encode_png(img: &RgbImage) -> AppResult<Vec<u8>> {
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageFormat::Png)
        .map_err(|e| AppError::Media(format!("PNG encoding failed: {}", e)))?;
    Ok(buf.into_inner())
}
