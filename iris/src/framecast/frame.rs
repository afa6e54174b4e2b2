use crate::{iris_error, iris_error_cause};
use crate::utils::OrError;
use bytes::Bytes;
use image::codecs::jpeg::JpegEncoder;
use image::DynamicImage;
use std::path::Path;

/// In-memory image re-encoded to JPEG on demand.
/// Stored as 8-bit RGB: alpha is dropped on load, the way a color-mode read does.
/// Encoding the same source with the same quality yields identical bytes.
#[derive(Debug, Clone)]
pub struct FrameSource {
    image: DynamicImage,
    quality: u8,
}

impl FrameSource {
    /// Error: unreadable/undecodable file, or `quality` outside 1..=100.
    pub fn open(path: impl AsRef<Path>, quality: u8) -> OrError<Self> {
        let path = path.as_ref();
        let image = image::open(path).map_err(|e| {
            iris_error_cause!("framecast::FrameSource", "open",
                &format!("failed to load image {}", path.display()), e)
        })?;
        Self::from_image(image, quality)
    }

    pub fn from_image(image: DynamicImage, quality: u8) -> OrError<Self> {
        if !(1..=100).contains(&quality) {
            return Err(iris_error!("framecast::FrameSource", "from_image",
                &format!("jpeg quality {} outside 1..=100", quality)));
        }
        Ok(Self {
            image: DynamicImage::ImageRgb8(image.to_rgb8()),
            quality,
        })
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.image.width(), self.image.height())
    }

    pub fn encode_jpeg(&self) -> OrError<Bytes> {
        let mut buf = Vec::new();
        let encoder = JpegEncoder::new_with_quality(&mut buf, self.quality);
        self.image.write_with_encoder(encoder).map_err(|e| {
            iris_error_cause!("framecast::FrameSource", "encode_jpeg", "jpeg encoding failed", e)
        })?;
        Ok(Bytes::from(buf))
    }
}
