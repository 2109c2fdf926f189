use std::io::Cursor;

use image::{ImageFormat, ImageReader};

pub const ALLOWED_FORMATS: &[ImageFormat] = &[
    ImageFormat::Jpeg,
    ImageFormat::Png,
    ImageFormat::Gif,
    ImageFormat::WebP,
];

pub const MAX_FILE_SIZE: usize = 2 * 1024 * 1024;

/// Validate an uploaded image: detect the format from magic bytes, check it's
/// allowed, and make sure it actually decodes. Returns the content type.
pub fn validate_image(data: &[u8]) -> Result<String, String> {
    if data.len() > MAX_FILE_SIZE {
        return Err(format!(
            "File too large. Maximum size is {} bytes",
            MAX_FILE_SIZE
        ));
    }

    let reader = ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| format!("Failed to read image: {}", e))?;

    let format = reader
        .format()
        .ok_or_else(|| "Could not detect image format".to_string())?;

    if !ALLOWED_FORMATS.contains(&format) {
        return Err(format!(
            "Unsupported image format: {:?}. Allowed: JPEG, PNG, GIF, WebP",
            format
        ));
    }

    let content_type = format.to_mime_type().to_string();

    reader
        .decode()
        .map_err(|e| format!("Failed to decode image: {}", e))?;

    Ok(content_type)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, RgbImage};

    fn sample_image_bytes(format: ImageFormat) -> Vec<u8> {
        let img = DynamicImage::ImageRgb8(RgbImage::new(10, 10));
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, format).unwrap();
        buf.into_inner()
    }

    #[test]
    fn test_valid_png() {
        let bytes = sample_image_bytes(ImageFormat::Png);
        assert_eq!(validate_image(&bytes).unwrap(), "image/png");
    }

    #[test]
    fn test_valid_jpeg() {
        let bytes = sample_image_bytes(ImageFormat::Jpeg);
        assert_eq!(validate_image(&bytes).unwrap(), "image/jpeg");
    }

    #[test]
    fn test_not_an_image() {
        assert!(validate_image(b"definitely not an image").is_err());
    }

    #[test]
    fn test_truncated_image_rejected() {
        let bytes = sample_image_bytes(ImageFormat::Png);
        assert!(validate_image(&bytes[..bytes.len() / 2]).is_err());
    }

    #[test]
    fn test_oversized_rejected() {
        let bytes = vec![0u8; MAX_FILE_SIZE + 1];
        assert!(validate_image(&bytes).is_err());
    }
}
