//! Persisted image encoding: PNG wrapped in a base64 data URL.

use crate::{Error, Result};
use base64::Engine as Base64Engine;
use image::{ImageFormat, RgbaImage};
use std::io::Cursor;

pub const DATA_URL_PREFIX: &str = "data:image/png;base64,";

/// Encode an RGBA image as `data:image/png;base64,...`.
pub fn encode_data_url(img: &RgbaImage) -> Result<String> {
    let png = encode_png(img)?;
    let mut out = String::with_capacity(DATA_URL_PREFIX.len() + png.len() * 4 / 3 + 4);
    out.push_str(DATA_URL_PREFIX);
    base64::engine::general_purpose::STANDARD.encode_string(&png, &mut out);
    Ok(out)
}

pub fn encode_png(img: &RgbaImage) -> Result<Vec<u8>> {
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageFormat::Png)?;
    Ok(buf.into_inner())
}

/// Decode a data URL produced by [`encode_data_url`].
///
/// A bare base64 payload without the `data:` header is accepted too.
pub fn decode_data_url(encoded: &str) -> Result<RgbaImage> {
    let payload = decode_payload(encoded)?;
    decode_png(&payload)
}

pub fn decode_png(bytes: &[u8]) -> Result<RgbaImage> {
    let img = image::load_from_memory_with_format(bytes, ImageFormat::Png)?;
    Ok(img.to_rgba8())
}

fn decode_payload(encoded: &str) -> Result<Vec<u8>> {
    let body = match encoded.strip_prefix("data:") {
        Some(rest) => {
            let (header, data) = rest
                .split_once(',')
                .ok_or_else(|| Error::CodecError("data URL without payload".into()))?;
            if !header.ends_with(";base64") {
                return Err(Error::CodecError(format!(
                    "unsupported data URL encoding: {}",
                    header
                )));
            }
            data
        }
        None => encoded,
    };
    Ok(base64::engine::general_purpose::STANDARD.decode(body.trim())?)
}
