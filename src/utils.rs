//! Utility functions for output naming

use chrono::{DateTime, Utc};

/// Derive an output filename by substituting the extension
///
/// The input's extension (everything after the last `.`) is replaced with
/// `target_extension`, case-insensitively — "IMG_0001.HEIC" becomes
/// "IMG_0001.jpg". Inputs without an extension get the target extension
/// appended. A leading dot ("hidden file" names like ".heic") is not treated
/// as an extension separator.
///
/// # Examples
///
/// ```
/// use imgpack::utils::derive_output_name;
///
/// assert_eq!(derive_output_name("photo.heic", "jpg"), "photo.jpg");
/// assert_eq!(derive_output_name("PHOTO.HEIC", "jpg"), "PHOTO.jpg");
/// assert_eq!(derive_output_name("archive.tar.heic", "jpg"), "archive.tar.jpg");
/// assert_eq!(derive_output_name("noext", "jpg"), "noext.jpg");
/// ```
pub fn derive_output_name(input_name: &str, target_extension: &str) -> String {
    match input_name.rfind('.') {
        // rfind == 0 means the name is all-extension (".heic") — keep it whole
        Some(dot) if dot > 0 => format!("{}.{}", &input_name[..dot], target_extension),
        _ => format!("{input_name}.{target_extension}"),
    }
}

/// Build the timestamp-derived archive filename offered for download
///
/// Format: `<prefix>-YYYYMMDD-HHMMSS.zip` in UTC.
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use imgpack::utils::archive_file_name;
///
/// let at = Utc.with_ymd_and_hms(2026, 8, 6, 14, 25, 1).unwrap();
/// assert_eq!(archive_file_name("converted", at), "converted-20260806-142501.zip");
/// ```
pub fn archive_file_name(prefix: &str, at: DateTime<Utc>) -> String {
    format!("{}-{}.zip", prefix, at.format("%Y%m%d-%H%M%S"))
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn replaces_lowercase_extension() {
        assert_eq!(derive_output_name("a.heic", "jpg"), "a.jpg");
    }

    #[test]
    fn replaces_uppercase_and_mixed_case_extensions() {
        assert_eq!(derive_output_name("a.HEIC", "jpg"), "a.jpg");
        assert_eq!(derive_output_name("a.HeIf", "jpg"), "a.jpg");
    }

    #[test]
    fn preserves_stem_case() {
        assert_eq!(derive_output_name("IMG_0042.heic", "jpg"), "IMG_0042.jpg");
    }

    #[test]
    fn only_last_extension_is_replaced() {
        assert_eq!(
            derive_output_name("vacation.2024.heic", "jpg"),
            "vacation.2024.jpg"
        );
    }

    #[test]
    fn appends_extension_when_input_has_none() {
        assert_eq!(derive_output_name("photo", "jpg"), "photo.jpg");
    }

    #[test]
    fn leading_dot_is_not_an_extension_separator() {
        assert_eq!(derive_output_name(".heic", "jpg"), ".heic.jpg");
    }

    #[test]
    fn names_with_spaces_survive_substitution() {
        assert_eq!(
            derive_output_name("my photo (1).heic", "jpg"),
            "my photo (1).jpg"
        );
    }

    #[test]
    fn archive_file_name_formats_utc_timestamp() {
        let at = Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap();
        assert_eq!(archive_file_name("converted", at), "converted-20260102-030405.zip");
    }

    #[test]
    fn archive_file_name_uses_configured_prefix() {
        let at = Utc.with_ymd_and_hms(2026, 12, 31, 23, 59, 59).unwrap();
        assert_eq!(archive_file_name("photos", at), "photos-20261231-235959.zip");
    }
}
