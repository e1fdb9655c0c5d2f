//! Avatar image loading
//!
//! Decoding of user-picked avatar files. No format or size validation beyond
//! what the decoder itself rejects.

use anyhow::{Context, Result};
use image::{DynamicImage, ImageResult};
use std::path::Path;

/// Load an image from a file path
pub fn load_image(path: &Path) -> Result<DynamicImage> {
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read image: {:?}", path))?;
    let img = load_image_from_bytes(&bytes)
        .with_context(|| format!("Failed to decode image: {:?}", path))?;
    Ok(img)
}

/// Decode an image from bytes, guessing the format from its content
pub fn load_image_from_bytes(bytes: &[u8]) -> ImageResult<DynamicImage> {
    image::load_from_memory(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn tiny_png() -> Vec<u8> {
        let mut bytes = Vec::new();
        DynamicImage::new_rgb8(1, 1)
            .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn test_load_from_bytes() {
        let img = load_image_from_bytes(&tiny_png()).unwrap();
        assert_eq!((img.width(), img.height()), (1, 1));
        assert!(load_image_from_bytes(b"nope").is_err());
    }

    #[test]
    fn test_load_missing_file_mentions_path() {
        let err = load_image(Path::new("/no/such/avatar.png")).unwrap_err();
        assert!(format!("{:#}", err).contains("avatar.png"));
    }
}
