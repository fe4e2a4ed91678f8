//! Upload filename validation.
//!
//! Extension allow-list only — no content sniffing. A renamed file passes
//! here and fails later in the decoder instead.

/// Extensions accepted for upload, lower-case.
pub const ALLOWED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "gif", "tiff", "pdf"];

/// Lower-cased substring after the final dot, if any.
pub fn file_extension(filename: &str) -> Option<String> {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
}

/// True iff the filename carries an allow-listed extension.
pub fn allowed_file(filename: &str) -> bool {
    match file_extension(filename) {
        Some(ext) => ALLOWED_EXTENSIONS.contains(&ext.as_str()),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_all_listed_extensions() {
        for ext in ALLOWED_EXTENSIONS {
            assert!(allowed_file(&format!("scan.{ext}")), "should accept .{ext}");
        }
    }

    #[test]
    fn accepts_uppercase_extension() {
        assert!(allowed_file("REPORT.PDF"));
        assert!(allowed_file("photo.JpG"));
    }

    #[test]
    fn rejects_missing_dot() {
        assert!(!allowed_file("report"));
        assert!(!allowed_file(""));
    }

    #[test]
    fn rejects_unknown_extension() {
        assert!(!allowed_file("notes.txt"));
        assert!(!allowed_file("archive.zip"));
        assert!(!allowed_file("report.pdf.exe"));
    }

    #[test]
    fn trailing_dot_has_empty_extension() {
        assert!(!allowed_file("report."));
    }

    #[test]
    fn extension_is_after_final_dot() {
        assert_eq!(file_extension("a.b.pdf").as_deref(), Some("pdf"));
        assert_eq!(file_extension("no_ext"), None);
    }
}
