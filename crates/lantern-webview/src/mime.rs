//! MIME type detection for web assets.

/// Fallback for unknown extensions.
pub const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

/// Detect MIME type from a file path's extension.
///
/// Extensions are matched case-insensitively. Paths without a known
/// extension get [`DEFAULT_MIME_TYPE`].
pub fn mime_for_path(path: &str) -> &'static str {
    let file = path.rsplit('/').next().unwrap_or(path);
    let Some((_, ext)) = file.rsplit_once('.') else {
        return DEFAULT_MIME_TYPE;
    };
    match ext.to_ascii_lowercase().as_str() {
        "html" | "htm" => "text/html",
        "css" => "text/css",
        "js" | "mjs" => "text/javascript",
        "json" | "map" => "application/json",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "svg" => "image/svg+xml",
        "webp" => "image/webp",
        "gif" => "image/gif",
        "ico" => "image/x-icon",
        "woff" => "font/woff",
        "woff2" => "font/woff2",
        "ttf" => "font/ttf",
        "otf" => "font/otf",
        "wasm" => "application/wasm",
        "txt" => "text/plain",
        _ => DEFAULT_MIME_TYPE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_extensions() {
        assert_eq!(mime_for_path("index.html"), "text/html");
        assert_eq!(mime_for_path("assets/index-4f2a.js"), "text/javascript");
        assert_eq!(mime_for_path("assets/LOGO.SVG"), "image/svg+xml");
    }

    #[test]
    fn test_unknown_or_missing_extension() {
        assert_eq!(mime_for_path("LICENSE"), DEFAULT_MIME_TYPE);
        assert_eq!(mime_for_path("v1.2/data"), DEFAULT_MIME_TYPE);
        assert_eq!(mime_for_path("blob.xyz"), DEFAULT_MIME_TYPE);
    }
}
