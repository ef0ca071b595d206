//! Share-link normalization.
//!
//! Admins paste share-page URLs from file hosts; visitors need links that
//! start a download directly. Recognized share pages are rewritten at write
//! time, everything else passes through untouched.

use once_cell::sync::Lazy;
use regex_lite::Regex;

/// Google Drive share pages: `/file/d/<id>/view` and `/open?id=<id>`.
static DRIVE_SHARE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^https?://drive\.google\.com/(?:file/d/|open\?(?:[^#]*&)?id=)([-\w]{25,})")
        .expect("drive share pattern is valid")
});

/// Pixeldrain share pages: `/u/<id>`.
static PIXELDRAIN_SHARE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^https?://pixeldrain\.com/u/([^/?#\s]+)")
        .expect("pixeldrain share pattern is valid")
});

/// Known file hosts a link can point at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkHost {
    GoogleDrive,
    Pixeldrain,
}

/// Direct-download endpoint for a Google Drive file id.
pub fn drive_download_url(file_id: &str) -> String {
    format!("https://drive.google.com/uc?export=download&id={}", file_id)
}

/// Direct-download endpoint for a Pixeldrain file id.
pub fn pixeldrain_download_url(file_id: &str) -> String {
    format!("https://pixeldrain.com/api/file/{}", file_id)
}

/// Detect a recognized share page and return its host and file id.
pub fn share_link(url: &str) -> Option<(LinkHost, &str)> {
    if let Some(id) = DRIVE_SHARE.captures(url).and_then(|c| c.get(1)) {
        return Some((LinkHost::GoogleDrive, id.as_str()));
    }
    if let Some(id) = PIXELDRAIN_SHARE.captures(url).and_then(|c| c.get(1)) {
        return Some((LinkHost::Pixeldrain, id.as_str()));
    }
    None
}

/// Rewrite a share-page URL into a direct-download URL.
///
/// Idempotent: direct-download URLs no longer look like share pages.
pub fn normalize(url: &str) -> String {
    match share_link(url) {
        Some((LinkHost::GoogleDrive, id)) => drive_download_url(id),
        Some((LinkHost::Pixeldrain, id)) => pixeldrain_download_url(id),
        None => url.to_string(),
    }
}
