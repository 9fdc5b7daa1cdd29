//! Structural PDF validation.
//!
//! A file is considered a valid PDF when lopdf can parse its header,
//! cross-reference table, and object graph, and it contains at least one
//! page. No content or OCR checks happen here.

use std::path::Path;

use lopdf::Document;
use tracing::debug;

/// Validate that the file at `path` is a structurally sound PDF.
///
/// Returns `Ok(())` when the document parses, or `Err` with a
/// human-readable reason suitable for storing as `invalid_reason`.
pub fn validate_structure(path: &Path) -> Result<(), String> {
    let doc = Document::load(path).map_err(|e| format!("Invalid PDF file: {}", e))?;

    let page_count = doc.get_pages().len();
    if page_count == 0 {
        return Err("Invalid PDF file: document has no pages".to_string());
    }

    debug!(path = %path.display(), pages = page_count, "PDF structure ok");
    Ok(())
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use lopdf::{dictionary, Object, Stream};
    use std::io::Write;

    /// Build a minimal one-page PDF in memory.
    pub fn minimal_pdf_bytes() -> Vec<u8> {
        let mut doc = Document::with_version("1.5");

        let pages_id = doc.new_object_id();
        let content = Stream::new(dictionary! {}, b"BT /F1 12 Tf 72 720 Td (Receipt) Tj ET".to_vec());
        let content_id = doc.add_object(content);
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![page_id.into()],
                "Count" => 1,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).unwrap();
        bytes
    }

    #[test]
    fn test_valid_pdf_passes() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(&minimal_pdf_bytes()).unwrap();

        assert!(validate_structure(tmp.path()).is_ok());
    }

    #[test]
    fn test_garbage_bytes_fail_with_reason() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(b"definitely not a pdf document").unwrap();

        let err = validate_structure(tmp.path()).unwrap_err();
        assert!(err.starts_with("Invalid PDF file"));
    }

    #[test]
    fn test_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = validate_structure(&dir.path().join("gone.pdf")).unwrap_err();
        assert!(err.starts_with("Invalid PDF file"));
    }

    #[test]
    fn test_truncated_pdf_fails() {
        let bytes = minimal_pdf_bytes();
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        // Chop off the xref table and trailer
        tmp.write_all(&bytes[..bytes.len() / 2]).unwrap();

        assert!(validate_structure(tmp.path()).is_err());
    }
}
