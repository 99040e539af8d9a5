//! MIME type detection based on file extensions.

/// Maps a file path's extension to a MIME type.
///
/// Unknown extensions fall back to `application/octet-stream`.
pub fn mime_type(path: &str) -> &'static str {
    let ext = match path.rsplit_once('.') {
        Some((_, ext)) => ext,
        None => return "application/octet-stream",
    };

    match ext.to_ascii_lowercase().as_str() {
        "htm" | "html" => "text/html",
        "css" => "text/css",
        "txt" => "text/plain",
        "js" => "application/javascript",
        "json" => "application/json",
        "xml" => "application/xml",
        "png" => "image/png",
        "jpe" | "jpeg" | "jpg" => "image/jpeg",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        "ico" => "image/vnd.microsoft.icon",
        "tif" | "tiff" => "image/tiff",
        "svg" | "svgz" => "image/svg+xml",
        "csv" => "text/csv",
        _ => "application/octet-stream",
    }
}
