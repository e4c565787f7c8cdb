//! Product photos, carried inside records as data URIs.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PhotoError {
    #[error("Failed to read photo {}: {}", .0.display(), .1)]
    Io(PathBuf, #[source] std::io::Error),

    #[error("Unrecognized image format")]
    UnknownFormat,

    #[error("Not a base64 data URI")]
    NotDataUri,

    #[error("Invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),
}

/// Encodes image bytes as a `data:<mime>;base64,` URI.
///
/// The MIME type is sniffed from the bytes; anything the image decoder does
/// not recognise is rejected.
pub fn to_data_uri(bytes: &[u8]) -> Result<String, PhotoError> {
    let format = image::guess_format(bytes).map_err(|_| PhotoError::UnknownFormat)?;
    Ok(format!(
        "data:{};base64,{}",
        format.to_mime_type(),
        STANDARD.encode(bytes)
    ))
}

/// Reads a photo file and encodes it as a data URI.
pub fn photo_from_path(path: &Path) -> Result<String, PhotoError> {
    let bytes = std::fs::read(path).map_err(|e| PhotoError::Io(path.to_path_buf(), e))?;
    to_data_uri(&bytes)
}

/// Decodes the payload of a base64 data URI.
pub fn decode_data_uri(uri: &str) -> Result<Vec<u8>, PhotoError> {
    let rest = uri.strip_prefix("data:").ok_or(PhotoError::NotDataUri)?;
    let (header, payload) = rest.split_once(',').ok_or(PhotoError::NotDataUri)?;
    if !header.ends_with(";base64") {
        return Err(PhotoError::NotDataUri);
    }
    Ok(STANDARD.decode(payload.trim())?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgb, RgbImage};
    use std::io::Cursor;

    fn tiny_png() -> Vec<u8> {
        let img = RgbImage::from_pixel(2, 2, Rgb([200, 10, 10]));
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn test_to_data_uri_sniffs_png() {
        let uri = to_data_uri(&tiny_png()).unwrap();
        assert!(uri.starts_with("data:image/png;base64,"));
    }

    #[test]
    fn test_to_data_uri_rejects_unknown() {
        assert!(matches!(
            to_data_uri(b"definitely not an image"),
            Err(PhotoError::UnknownFormat)
        ));
    }

    #[test]
    fn test_decode_data_uri() {
        let png = tiny_png();
        let uri = to_data_uri(&png).unwrap();
        assert_eq!(decode_data_uri(&uri).unwrap(), png);
    }

    #[test]
    fn test_decode_rejects_non_data_uri() {
        assert!(matches!(
            decode_data_uri("https://example.com/a.png"),
            Err(PhotoError::NotDataUri)
        ));
        assert!(matches!(
            decode_data_uri("data:image/png,rawtext"),
            Err(PhotoError::NotDataUri)
        ));
    }

    #[test]
    fn test_photo_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("photo.png");
        std::fs::write(&path, tiny_png()).unwrap();

        let uri = photo_from_path(&path).unwrap();
        assert!(uri.starts_with("data:image/png;base64,"));

        let missing = photo_from_path(&dir.path().join("missing.png"));
        assert!(matches!(missing, Err(PhotoError::Io(_, _))));
    }
}
