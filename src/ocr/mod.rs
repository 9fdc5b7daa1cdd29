//! OCR text extraction for scanned receipts.
//!
//! Rasterizes every PDF page with pdftoppm (Poppler) and runs Tesseract
//! OCR on each page image. Both tools are invoked as external binaries;
//! any render or per-page OCR failure aborts the whole extraction rather
//! than producing partial text.

mod extractor;

pub use extractor::{ExtractionError, TextExtractor};
