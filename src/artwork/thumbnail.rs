// Album artwork normalisation: base64 in, small JPEG out

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::DynamicImage;

use crate::errors::ArtworkError;

/// Edge length of the square thumbnail sent to the image host
pub const THUMBNAIL_SIZE: u32 = 300;

/// JPEG quality used when re-encoding the thumbnail
pub const JPEG_QUALITY: u8 = 85;

/// Decode base64 artwork, resize it to a square thumbnail and re-encode as JPEG.
///
/// Accepts both bare base64 and `data:image/...;base64,` URLs. CPU bound; call
/// from a blocking context.
pub fn encode_thumbnail(artwork_base64: &str) -> Result<Vec<u8>, ArtworkError> {
    let payload = strip_data_url(artwork_base64.trim());
    let bytes = BASE64.decode(payload)?;

    let image = image::load_from_memory(&bytes)?;
    let rgb = image.to_rgb8();
    let resized = image::imageops::resize(&rgb, THUMBNAIL_SIZE, THUMBNAIL_SIZE, FilterType::Lanczos3);

    let mut output = Vec::new();
    DynamicImage::ImageRgb8(resized)
        .write_with_encoder(JpegEncoder::new_with_quality(&mut output, JPEG_QUALITY))?;

    tracing::debug!(
        original_bytes = bytes.len(),
        thumbnail_bytes = output.len(),
        "Encoded artwork thumbnail"
    );

    Ok(output)
}

fn strip_data_url(input: &str) -> &str {
    match input.split_once(";base64,") {
        Some((prefix, data)) if prefix.starts_with("data:") => data,
        _ => input,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgb, RgbImage};
    use std::io::Cursor;

    fn png_base64(width: u32, height: u32) -> String {
        let image = RgbImage::from_pixel(width, height, Rgb([200, 30, 30]));
        let mut bytes = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(image)
            .write_to(&mut bytes, ImageFormat::Png)
            .unwrap();
        BASE64.encode(bytes.into_inner())
    }

    #[test]
    fn test_thumbnail_is_square_jpeg() {
        let jpeg = encode_thumbnail(&png_base64(640, 480)).unwrap();

        assert_eq!(image::guess_format(&jpeg).unwrap(), ImageFormat::Jpeg);
        let decoded = image::load_from_memory(&jpeg).unwrap();
        assert_eq!(decoded.width(), THUMBNAIL_SIZE);
        assert_eq!(decoded.height(), THUMBNAIL_SIZE);
    }

    #[test]
    fn test_small_artwork_is_upscaled() {
        let jpeg = encode_thumbnail(&png_base64(16, 16)).unwrap();
        let decoded = image::load_from_memory(&jpeg).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (300, 300));
    }

    #[test]
    fn test_data_url_prefix_accepted() {
        let data_url = format!("data:image/png;base64,{}", png_base64(8, 8));
        assert!(encode_thumbnail(&data_url).is_ok());
    }

    #[test]
    fn test_invalid_base64_rejected() {
        let err = encode_thumbnail("!!not base64!!").unwrap_err();
        assert!(matches!(err, ArtworkError::Decode(_)));
    }

    #[test]
    fn test_non_image_payload_rejected() {
        let err = encode_thumbnail(&BASE64.encode(b"plain text, not pixels")).unwrap_err();
        assert!(matches!(err, ArtworkError::Image(_)));
    }
}
