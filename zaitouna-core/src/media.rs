//! Embedding uploaded files as data URLs.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

/// Encode `bytes` as a `data:` URL suitable for a narrative's `image` field.
pub fn data_url(mime: &str, bytes: &[u8]) -> String {
    let mime = if mime.trim().is_empty() {
        "application/octet-stream"
    } else {
        mime.trim()
    };
    format!("data:{mime};base64,{}", STANDARD.encode(bytes))
}

/// Guess an image MIME type from a file name.
pub fn image_mime_for(file_name: &str) -> &'static str {
    let ext = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_url() {
        assert_eq!(data_url("image/png", b"hi"), "data:image/png;base64,aGk=");
        assert_eq!(data_url("", b""), "data:application/octet-stream;base64,");
    }

    #[test]
    fn test_image_mime_for() {
        assert_eq!(image_mime_for("harvest.JPG"), "image/jpeg");
        assert_eq!(image_mime_for("press.webp"), "image/webp");
        assert_eq!(image_mime_for("README"), "application/octet-stream");
    }
}
