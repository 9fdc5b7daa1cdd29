//! Page-by-page PDF rasterization and Tesseract OCR.

use std::path::Path;
use std::process::Command;

use tempfile::TempDir;
use thiserror::Error;

/// Errors that can occur during text extraction.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("External tool not found: {0}")]
    ToolNotFound(String),

    #[error("Extraction failed: {0}")]
    ExtractionFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Handle command output, extracting stdout on success or returning appropriate error.
fn handle_cmd_output(
    result: std::io::Result<std::process::Output>,
    tool_name: &str,
    error_prefix: &str,
) -> Result<String, ExtractionError> {
    match result {
        Ok(output) => {
            if output.status.success() {
                Ok(String::from_utf8_lossy(&output.stdout).to_string())
            } else {
                let stderr = String::from_utf8_lossy(&output.stderr);
                Err(ExtractionError::ExtractionFailed(format!(
                    "{}: {}",
                    error_prefix, stderr
                )))
            }
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(ExtractionError::ToolNotFound(tool_name.to_string()))
        }
        Err(e) => Err(ExtractionError::Io(e)),
    }
}

/// Check command status, returning appropriate error on failure.
fn check_cmd_status(
    result: std::io::Result<std::process::ExitStatus>,
    tool_name: &str,
    error_msg: &str,
) -> Result<(), ExtractionError> {
    match result {
        Ok(s) if s.success() => Ok(()),
        Ok(_) => Err(ExtractionError::ExtractionFailed(error_msg.to_string())),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(ExtractionError::ToolNotFound(tool_name.to_string()))
        }
        Err(e) => Err(ExtractionError::Io(e)),
    }
}

/// Check if a binary is available in PATH.
fn check_binary(name: &str) -> bool {
    Command::new("which")
        .arg(name)
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

/// OCR text extractor for scanned PDFs.
///
/// Calls block until the external tools return; callers that care about
/// request latency should run extraction on a blocking task.
#[derive(Clone)]
pub struct TextExtractor {
    /// Rasterization resolution in DPI.
    dpi: u32,
    /// Tesseract language setting.
    tesseract_lang: String,
}

impl Default for TextExtractor {
    fn default() -> Self {
        Self {
            dpi: 300,
            tesseract_lang: "eng".to_string(),
        }
    }
}

impl TextExtractor {
    /// Create a new text extractor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set Tesseract language.
    #[allow(dead_code)]
    pub fn with_language(mut self, lang: &str) -> Self {
        self.tesseract_lang = lang.to_string();
        self
    }

    /// Extract text from a PDF by OCR'ing every page.
    ///
    /// Page texts are concatenated in page order with no separator. Any
    /// failure to render or OCR a page is fatal; there is no best-effort
    /// partial result.
    pub fn extract_text(&self, file_path: &Path) -> Result<String, ExtractionError> {
        let temp_dir = TempDir::new()?;
        let temp_path = temp_dir.path();

        // Convert all pages to images using pdftoppm
        let dpi = self.dpi.to_string();
        let status = Command::new("pdftoppm")
            .args(["-png", "-r", &dpi])
            .arg(file_path)
            .arg(temp_path.join("page"))
            .status();

        check_cmd_status(
            status,
            "pdftoppm (install poppler-utils)",
            "pdftoppm failed to convert PDF",
        )?;

        // pdftoppm names images page-01.png, page-02.png, ... so a name
        // sort recovers page order
        let mut images: Vec<_> = std::fs::read_dir(temp_path)?
            .filter_map(|e| e.ok())
            .filter(|e| {
                e.path()
                    .extension()
                    .map(|ext| ext == "png")
                    .unwrap_or(false)
            })
            .map(|e| e.path())
            .collect();

        images.sort();

        if images.is_empty() {
            return Err(ExtractionError::ExtractionFailed(
                "No images generated from PDF".to_string(),
            ));
        }

        let mut text = String::new();
        for image_path in &images {
            text.push_str(&self.run_tesseract(image_path)?);
        }

        Ok(text)
    }

    /// Run Tesseract OCR on an image.
    fn run_tesseract(&self, image_path: &Path) -> Result<String, ExtractionError> {
        let output = Command::new("tesseract")
            .arg(image_path)
            .arg("stdout")
            .args(["-l", &self.tesseract_lang])
            .output();

        handle_cmd_output(output, "tesseract (install tesseract-ocr)", "tesseract failed")
    }

    /// Check if required tools are available.
    pub fn check_tools() -> Vec<(String, bool)> {
        ["pdftoppm", "tesseract"]
            .iter()
            .map(|tool| (tool.to_string(), check_binary(tool)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_check_tools() {
        let tools = TextExtractor::check_tools();
        assert_eq!(tools.len(), 2);
        assert!(tools.iter().any(|(name, _)| name == "tesseract"));
    }

    #[test]
    fn test_extract_from_non_pdf_fails() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(b"this is not a pdf").unwrap();

        let extractor = TextExtractor::new();
        let result = extractor.extract_text(tmp.path());
        // Either pdftoppm is missing or it rejects the garbage input;
        // both are fatal, never a partial result
        assert!(result.is_err());
    }
}
