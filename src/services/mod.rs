//! Application services tying storage, OCR, and field extraction together.

mod intake;
mod process;

pub use intake::{sanitize_filename, store_upload, IntakeError, IntakeOutcome};
pub use process::{process_file, ProcessError, ProcessOutcome};
