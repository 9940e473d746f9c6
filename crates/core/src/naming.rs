//! Filename rules for persisted uploads.
//!
//! Uploads are stored under the session's directory keyed by their original
//! filename. The name comes from the client, so it is reduced to a single
//! safe path component first.

/// Name used when nothing usable is left after sanitising.
pub const FALLBACK_UPLOAD_NAME: &str = "upload";

/// Reduce a client-supplied filename to a safe single path component.
///
/// - directory parts (`/` and `\`) are stripped, keeping the last segment
/// - characters other than ASCII alphanumerics, `.`, `-`, `_` become `_`
/// - leading dots are removed so the result is never hidden or `..`
///
/// # Examples
///
/// ```
/// use matrixpert_core::naming::sanitize_upload_name;
///
/// assert_eq!(sanitize_upload_name("sample.jpg"), "sample.jpg");
/// assert_eq!(sanitize_upload_name("../../etc/passwd"), "passwd");
/// assert_eq!(sanitize_upload_name("grain map.png"), "grain_map.png");
/// ```
pub fn sanitize_upload_name(filename: &str) -> String {
    let basename = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(filename);

    let cleaned: String = basename
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();

    let trimmed = cleaned.trim_start_matches('.');
    if trimmed.is_empty() {
        FALLBACK_UPLOAD_NAME.to_string()
    } else {
        trimmed.to_string()
    }
}
