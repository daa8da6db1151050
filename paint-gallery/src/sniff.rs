//! Content-type sniffing from leading bytes.
//!
//! Only the first [`SNIFF_LEN`] bytes are looked at. Known magic numbers are
//! matched by `infer`; anything else is `text/plain; charset=utf-8` when it
//! contains no binary control bytes, `application/octet-stream` otherwise.

pub const SNIFF_LEN: usize = 512;

pub const IMAGE_PNG: &str = "image/png";
pub const IMAGE_JPEG: &str = "image/jpeg";
pub const IMAGE_GIF: &str = "image/gif";
pub const IMAGE_WEBP: &str = "image/webp";
pub const IMAGE_BMP: &str = "image/bmp";
pub const TEXT_PLAIN: &str = "text/plain; charset=utf-8";
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Best-effort MIME type of `payload`, judged from its leading bytes
pub fn detect_content_type(payload: &[u8]) -> &'static str {
    let data = &payload[..payload.len().min(SNIFF_LEN)];

    if let Some(kind) = infer::get(data) {
        return kind.mime_type();
    }

    if data.iter().any(|b| is_binary_byte(*b)) {
        OCTET_STREAM
    } else {
        TEXT_PLAIN
    }
}

fn is_binary_byte(b: u8) -> bool {
    matches!(b, 0x00..=0x08 | 0x0B | 0x0E..=0x1A | 0x1C..=0x1F)
}
