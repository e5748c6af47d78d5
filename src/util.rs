//! Small shared utilities: seeding and cover media detection.

/// Get a time-based seed value for pseudo-random number generation.
pub fn time_seed_nanos() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(12345)
}

// ============================================================================
// Cover Format Detection
// ============================================================================

/// Detected cover media format.
///
/// Only the formats a cover asset can be packaged as are distinguished;
/// everything else is `Binary`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaFormat {
    /// JPEG image
    Jpeg,
    /// PNG image
    Png,
    /// Unknown/binary format
    Binary,
}

impl MediaFormat {
    /// Get the MIME type string for this format.
    pub fn mime_type(self) -> &'static str {
        match self {
            MediaFormat::Jpeg => "image/jpeg",
            MediaFormat::Png => "image/png",
            MediaFormat::Binary => "application/octet-stream",
        }
    }

    /// Get the conventional file extension for this format.
    pub fn extension(self) -> &'static str {
        match self {
            MediaFormat::Jpeg => "jpg",
            MediaFormat::Png => "png",
            MediaFormat::Binary => "bin",
        }
    }
}

/// Detect cover format from file path and/or raw bytes.
///
/// Tries extension-based detection first, then falls back to magic bytes.
/// Returns `Binary` if neither identifies the data.
pub fn detect_media_format(path: &str, data: &[u8]) -> MediaFormat {
    let path_lower = path.to_lowercase();

    if path_lower.ends_with(".jpg") || path_lower.ends_with(".jpeg") {
        return MediaFormat::Jpeg;
    }
    if path_lower.ends_with(".png") {
        return MediaFormat::Png;
    }

    if data.len() >= 4 {
        // JPEG: FF D8
        if data[0] == 0xFF && data[1] == 0xD8 {
            return MediaFormat::Jpeg;
        }
        // PNG: 89 50 4E 47 (.PNG)
        if data[0] == 0x89 && data[1] == 0x50 && data[2] == 0x4E && data[3] == 0x47 {
            return MediaFormat::Png;
        }
    }

    MediaFormat::Binary
}

// ============================================================================
// Tests
// ============================================================================
