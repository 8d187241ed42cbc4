//! Content-Type detection for served assets.
//!
//! Lookup order: the configured extension table, then the file's leading
//! bytes, then the `mime_guess` database, then `application/octet-stream`.

use std::{collections::HashMap, path::Path};

pub const OCTET_STREAM: &str = "application/octet-stream";

/// Built-in extension table. Caller-supplied entries are merged over it.
pub const DEFAULT_MIME_TYPES: &[(&str, &str)] = &[
    ("txt", "text/plain"),
    ("htm", "text/html"),
    ("html", "text/html"),
    ("php", "text/html"),
    ("css", "text/css"),
    ("js", "application/javascript"),
    ("json", "application/json"),
    ("xml", "application/xml"),
    ("swf", "application/x-shockwave-flash"),
    ("flv", "video/x-flv"),
    /* --------------------------------- Images --------------------------------- */
    ("png", "image/png"),
    ("jpe", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("jpg", "image/jpeg"),
    ("gif", "image/gif"),
    ("bmp", "image/bmp"),
    ("ico", "image/vnd.microsoft.icon"),
    ("tiff", "image/tiff"),
    ("tif", "image/tiff"),
    ("svg", "image/svg+xml"),
    ("svgz", "image/svg+xml"),
    /* -------------------------------- Archives -------------------------------- */
    ("zip", "application/zip"),
    ("rar", "application/x-rar-compressed"),
    ("exe", "application/x-msdownload"),
    ("msi", "application/x-msdownload"),
    ("cab", "application/vnd.ms-cab-compressed"),
    /* ------------------------------ Audio / video ----------------------------- */
    ("mp3", "audio/mpeg"),
    ("qt", "video/quicktime"),
    ("mov", "video/quicktime"),
    /* ---------------------------------- Adobe --------------------------------- */
    ("pdf", "application/pdf"),
    ("psd", "image/vnd.adobe.photoshop"),
    ("ai", "application/postscript"),
    ("eps", "application/postscript"),
    ("ps", "application/postscript"),
    /* -------------------------------- MS Office ------------------------------- */
    ("doc", "application/msword"),
    ("rtf", "application/rtf"),
    ("xls", "application/vnd.ms-excel"),
    ("ppt", "application/vnd.ms-powerpoint"),
    /* ------------------------------- Open Office ------------------------------ */
    ("odt", "application/vnd.oasis.opendocument.text"),
    ("ods", "application/vnd.oasis.opendocument.spreadsheet"),
    /* ---------------------------------- Fonts --------------------------------- */
    ("eot", "application/vnd.ms-fontobject"),
    ("woff", "application/font-woff"),
    ("woff2", "application/font-woff2"),
    ("ttf", "application/x-font-truetype"),
    ("otf", "application/x-font-opentype"),
];

/// Extension to MIME type mapping owned by a resolver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MimeTable {
    types: HashMap<String, String>,
}

impl Default for MimeTable {
    fn default() -> Self {
        Self {
            types: DEFAULT_MIME_TYPES
                .iter()
                .map(|(ext, mime)| (ext.to_string(), mime.to_string()))
                .collect(),
        }
    }
}

impl MimeTable {
    /// The default table with `overrides` merged in. Overrides win.
    pub fn with_overrides(overrides: &HashMap<String, String>) -> Self {
        let mut table = Self::default();
        for (ext, mime) in overrides {
            table
                .types
                .insert(ext.trim_start_matches('.').to_lowercase(), mime.clone());
        }
        table
    }

    pub fn get(&self, extension: &str) -> Option<&str> {
        self.types
            .get(&extension.to_lowercase())
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Detect the Content-Type for `file`, whose bytes are `contents`.
    pub fn detect(&self, file: &Path, contents: &[u8]) -> String {
        if let Some(mime) = extension_of(file).and_then(|ext| self.get(ext)) {
            return mime.to_string();
        }

        if let Some(mime) = sniff(contents) {
            return mime.to_string();
        }

        mime_guess::from_path(file)
            .first_raw()
            .unwrap_or(OCTET_STREAM)
            .to_string()
    }
}

/// Everything after the last `.` of the file name.
fn extension_of(file: &Path) -> Option<&str> {
    let name = file.file_name()?.to_str()?;
    name.rsplit_once('.').map(|(_, ext)| ext)
}

const SIGNATURES: &[(&[u8], &str)] = &[
    (&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A], "image/png"),
    (&[0xFF, 0xD8, 0xFF], "image/jpeg"),
    (b"GIF87a", "image/gif"),
    (b"GIF89a", "image/gif"),
    (b"%PDF-", "application/pdf"),
    (&[0x50, 0x4B, 0x03, 0x04], "application/zip"),
    (&[0x50, 0x4B, 0x05, 0x06], "application/zip"),
    (&[0x1F, 0x8B], "application/gzip"),
    (&[0x00, 0x61, 0x73, 0x6D], "application/wasm"),
    (b"wOFF", "font/woff"),
    (b"wOF2", "font/woff2"),
    (b"OggS", "audio/ogg"),
    (b"ID3", "audio/mpeg"),
];

/// Inspect leading bytes. `None` when the content is inconclusive.
pub fn sniff(contents: &[u8]) -> Option<&'static str> {
    if contents.is_empty() {
        return None;
    }

    for (magic, mime) in SIGNATURES {
        if contents.starts_with(magic) {
            return Some(*mime);
        }
    }

    if contents.len() >= 12 && &contents[0..4] == b"RIFF" && &contents[8..12] == b"WEBP" {
        return Some("image/webp");
    }

    let head = &contents[..contents.len().min(512)];
    if !head.contains(&0) && looks_like_utf8(head) {
        return Some("text/plain");
    }

    None
}

/// UTF-8 check that tolerates a multi-byte sequence cut off by the 512 byte window.
fn looks_like_utf8(head: &[u8]) -> bool {
    match std::str::from_utf8(head) {
        Ok(_) => true,
        Err(e) => e.error_len().is_none(),
    }
}
