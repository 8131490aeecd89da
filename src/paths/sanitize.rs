//! Destination sanitization
//!
//! Destination hints in the input lists often carry query strings or other
//! trailing noise after the file extension. Sanitizing keeps everything up to
//! and including the first recognized image extension.

/// Image extensions recognized by [`sanitize`], in match priority order
pub const IMAGE_EXTENSIONS: [&str; 4] = [".jpg", ".jpeg", ".png", ".webp"];

/// Result of sanitizing a raw destination
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sanitized<'a> {
    /// Relative path ending exactly at an image extension, in its original case
    Image(&'a str),
    /// No recognized image extension anywhere in the destination
    NotAPicture,
}

impl<'a> Sanitized<'a> {
    /// Returns the sanitized suffix, if the destination names an image
    pub fn as_image(&self) -> Option<&'a str> {
        match self {
            Self::Image(suffix) => Some(suffix),
            Self::NotAPicture => None,
        }
    }
}

/// Maps a raw destination to a normalized image path
///
/// Matching is case-insensitive but the returned slice keeps the caller's
/// casing. Extensions are tried in [`IMAGE_EXTENSIONS`] order and the first
/// one present wins.
///
/// # Examples
///
/// ```
/// use wave_harvest::paths::{sanitize, Sanitized};
///
/// assert_eq!(sanitize("Foo/BAR.JPG?x=1"), Sanitized::Image("Foo/BAR.JPG"));
/// assert_eq!(sanitize("foo/bar.gif"), Sanitized::NotAPicture);
/// ```
pub fn sanitize(raw: &str) -> Sanitized<'_> {
    // ASCII lowering keeps byte offsets aligned with `raw`
    let lowered = raw.to_ascii_lowercase();

    for ext in IMAGE_EXTENSIONS {
        if let Some(idx) = lowered.find(ext) {
            return Sanitized::Image(&raw[..idx + ext.len()]);
        }
    }

    Sanitized::NotAPicture
}
