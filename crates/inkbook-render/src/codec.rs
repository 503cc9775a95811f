//! Data URL and bitmap encoding.

use crate::surface::{RenderError, RenderResult};
use base64::{Engine, engine::general_purpose::STANDARD};
use image::ImageEncoder;

/// Wrap bytes in a base64 data URL.
pub fn encode_data_url(mime_type: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime_type, STANDARD.encode(bytes))
}

/// Split a base64 data URL into its MIME type and decoded bytes.
pub fn decode_data_url(data_url: &str) -> RenderResult<(String, Vec<u8>)> {
    let rest = data_url
        .strip_prefix("data:")
        .ok_or_else(|| RenderError::Decode("not a data URL".to_string()))?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| RenderError::Decode("data URL has no payload".to_string()))?;
    let mime_type = header
        .strip_suffix(";base64")
        .ok_or_else(|| RenderError::Decode(format!("unsupported data URL encoding: {header}")))?;
    let bytes = STANDARD
        .decode(payload.trim())
        .map_err(|e| RenderError::Decode(format!("invalid base64: {e}")))?;
    Ok((mime_type.to_string(), bytes))
}

/// Encode straight RGBA8 pixels as PNG.
pub fn encode_png(rgba: &[u8], width: u32, height: u32) -> RenderResult<Vec<u8>> {
    let mut png_data = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut png_data, width, height);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);

        let mut writer = encoder
            .write_header()
            .map_err(|e| RenderError::Encode(format!("PNG header: {e}")))?;
        writer
            .write_image_data(rgba)
            .map_err(|e| RenderError::Encode(format!("PNG data: {e}")))?;
    }
    Ok(png_data)
}

/// Encode RGBA8 pixels as JPEG, flattening alpha onto white.
pub fn encode_jpeg(rgba: &[u8], width: u32, height: u32, quality: u8) -> RenderResult<Vec<u8>> {
    let mut rgb_data = Vec::with_capacity(rgba.len() / 4 * 3);
    for pixel in rgba.chunks_exact(4) {
        let alpha = u32::from(pixel[3]);
        for channel in &pixel[..3] {
            let value = (u32::from(*channel) * alpha + 255 * (255 - alpha) + 127) / 255;
            rgb_data.push(value as u8);
        }
    }

    let mut buf = std::io::Cursor::new(Vec::new());
    let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buf, quality.clamp(1, 100));
    encoder
        .write_image(&rgb_data, width, height, image::ColorType::Rgb8.into())
        .map_err(|e| RenderError::Encode(format!("JPEG: {e}")))?;
    Ok(buf.into_inner())
}

/// Decode PNG or JPEG bytes to RGBA8.
pub fn decode_image(bytes: &[u8]) -> RenderResult<image::RgbaImage> {
    image::load_from_memory(bytes)
        .map(|img| img.to_rgba8())
        .map_err(|e| RenderError::Decode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_url_round_trip() {
        let url = encode_data_url("image/png", &[1, 2, 3]);
        assert_eq!(url, "data:image/png;base64,AQID");
        let (mime, bytes) = decode_data_url(&url).unwrap();
        assert_eq!(mime, "image/png");
        assert_eq!(bytes, vec![1, 2, 3]);
    }

    #[test]
    fn test_rejects_malformed_data_urls() {
        assert!(decode_data_url("").is_err());
        assert!(decode_data_url("http://example.com/a.png").is_err());
        assert!(decode_data_url("data:image/png;base64").is_err());
        assert!(decode_data_url("data:text/plain,hello").is_err());
        assert!(decode_data_url("data:image/png;base64,@@@").is_err());
    }

    #[test]
    fn test_png_decodes_to_same_pixels() {
        let pixels = [255, 0, 0, 255, 0, 0, 255, 128];
        let png = encode_png(&pixels, 2, 1).unwrap();
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");

        let decoded = decode_image(&png).unwrap();
        assert_eq!(decoded.dimensions(), (2, 1));
        assert_eq!(decoded.as_raw().as_slice(), &pixels);
    }

    #[test]
    fn test_jpeg_has_soi_marker() {
        let pixels = vec![0u8; 4 * 4 * 4];
        let jpeg = encode_jpeg(&pixels, 4, 4, 100).unwrap();
        assert_eq!(&jpeg[..2], &[0xFF, 0xD8]);
        // Fully transparent pixels flatten to white.
        let decoded = decode_image(&jpeg).unwrap();
        assert!(decoded.pixels().all(|p| p.0[0] > 240));
    }

    #[test]
    fn test_decode_garbage_fails() {
        assert!(matches!(decode_image(b"nope"), Err(RenderError::Decode(_))));
    }
}
