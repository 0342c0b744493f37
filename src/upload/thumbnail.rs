//! Image previews as `data:` URIs.

use super::queue::QueueEvent;
use super::types::{FileId, FilePatch, RawFile};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::io::Cursor;
use std::sync::mpsc::Sender;

/// Longest edge of a generated preview, in pixels.
pub const THUMBNAIL_EDGE: u32 = 150;

const DATA_URI_PREFIX: &str = "data:";
const BASE64_MARKER: &str = ";base64,";

#[derive(Debug, thiserror::Error)]
pub enum ThumbnailError {
    #[error("failed to read {name}: {source}")]
    Read {
        name: String,
        source: std::io::Error,
    },
    #[error("not a base64 data URI")]
    NotDataUri,
    #[error("invalid base64 payload: {0}")]
    Decode(#[from] base64::DecodeError),
}

/// Reads `raw`, derives a preview and sends it as a patch for `id`.
///
/// Failures are logged only; a missing preview is not an error for the user.
pub async fn generate(id: FileId, raw: RawFile, events: Sender<QueueEvent>) {
    match build_data_uri(&raw).await {
        Ok(uri) => {
            log::debug!(
                target: "dropzone::thumbnail",
                "thumbnail ready for {} ({} chars)",
                raw.name,
                uri.len()
            );
            let _ = events.send(QueueEvent::Patch {
                id,
                patch: FilePatch::thumbnail(uri),
            });
        }
        Err(e) => {
            log::warn!(target: "dropzone::thumbnail", "no thumbnail for {}: {}", raw.name, e);
        }
    }
}

pub async fn build_data_uri(raw: &RawFile) -> Result<String, ThumbnailError> {
    let bytes = raw.read_bytes().await.map_err(|source| ThumbnailError::Read {
        name: raw.name.clone(),
        source,
    })?;

    match downscale_png(&bytes) {
        Some(png) => Ok(encode_data_uri("image/png", &png)),
        None => {
            log::debug!(
                target: "dropzone::thumbnail",
                "could not decode {}, embedding original bytes",
                raw.name
            );
            Ok(encode_data_uri(&raw.mime_type, &bytes))
        }
    }
}

fn downscale_png(bytes: &[u8]) -> Option<Vec<u8>> {
    let image = image::load_from_memory(bytes).ok()?;
    let preview = if image.width() > THUMBNAIL_EDGE || image.height() > THUMBNAIL_EDGE {
        image.thumbnail(THUMBNAIL_EDGE, THUMBNAIL_EDGE)
    } else {
        image
    };

    let mut out = Cursor::new(Vec::new());
    preview.write_to(&mut out, image::ImageFormat::Png).ok()?;
    Some(out.into_inner())
}

pub fn encode_data_uri(mime_type: &str, bytes: &[u8]) -> String {
    format!(
        "{}{}{}{}",
        DATA_URI_PREFIX,
        mime_type,
        BASE64_MARKER,
        STANDARD.encode(bytes)
    )
}

/// Payload bytes of a base64 `data:` URI.
pub fn decode_data_uri(uri: &str) -> Result<Vec<u8>, ThumbnailError> {
    let rest = uri
        .strip_prefix(DATA_URI_PREFIX)
        .ok_or(ThumbnailError::NotDataUri)?;
    let (_, payload) = rest
        .split_once(BASE64_MARKER)
        .ok_or(ThumbnailError::NotDataUri)?;
    Ok(STANDARD.decode(payload)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = image::RgbaImage::from_pixel(width, height, image::Rgba([255, 0, 0, 255]));
        let mut out = Cursor::new(Vec::new());
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut out, image::ImageFormat::Png)
            .unwrap();
        out.into_inner()
    }

    #[tokio::test]
    async fn large_images_are_downscaled() {
        let raw = RawFile::from_bytes("big.png", png_bytes(600, 300));
        let uri = build_data_uri(&raw).await.unwrap();
        assert!(uri.starts_with("data:image/png;base64,"));

        let decoded = image::load_from_memory(&decode_data_uri(&uri).unwrap()).unwrap();
        assert_eq!(decoded.width(), THUMBNAIL_EDGE);
        assert!(decoded.height() <= THUMBNAIL_EDGE);
    }

    #[tokio::test]
    async fn undecodable_images_embed_original_bytes() {
        let raw = RawFile::from_bytes("vector.svg", b"<svg/>".to_vec());
        let uri = build_data_uri(&raw).await.unwrap();
        assert!(uri.starts_with("data:image/svg+xml;base64,"));
        assert_eq!(decode_data_uri(&uri).unwrap(), b"<svg/>");
    }

    #[tokio::test]
    async fn missing_file_is_a_read_error() {
        let raw = RawFile {
            name: "gone.png".into(),
            size: 0,
            mime_type: "image/png".into(),
            source: super::super::types::FileSource::Path("/definitely/not/here.png".into()),
        };
        assert!(matches!(
            build_data_uri(&raw).await,
            Err(ThumbnailError::Read { .. })
        ));
    }

    #[test]
    fn decode_rejects_plain_urls() {
        assert!(matches!(
            decode_data_uri("https://example.com/a.png"),
            Err(ThumbnailError::NotDataUri)
        ));
    }
}
