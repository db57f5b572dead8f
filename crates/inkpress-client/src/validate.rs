//! Pre-upload input validation.
//!
//! These checks run before any bytes hit the wire so a user with a 60 MB
//! scan gets an immediate, actionable message instead of a server reject.
//! The messages are user-facing and match the hosted product's wording.

use inkpress_api_models::{SplitMethod, SplitOptions};
use inkpress_ops::InputFile;

use crate::error::{ClientError, ClientResult};

/// Largest file the service accepts, in bytes (50 MB).
pub const MAX_FILE_SIZE: u64 = 50 * 1024 * 1024;

/// Reject anything that does not carry a `.pdf` extension (case-insensitive).
///
/// # Errors
///
/// Returns [`ClientError::Validation`] when the name has no PDF extension.
pub fn ensure_pdf(file: &InputFile) -> ClientResult<()> {
    let is_pdf = std::path::Path::new(&file.name)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));
    if is_pdf {
        Ok(())
    } else {
        Err(ClientError::validation(
            "Invalid file type. Please upload a PDF file.",
        ))
    }
}

/// Enforce the service's upload ceiling.
///
/// # Errors
///
/// Returns [`ClientError::Validation`] when the file exceeds [`MAX_FILE_SIZE`].
pub fn ensure_size(file: &InputFile) -> ClientResult<()> {
    if file.size_bytes > MAX_FILE_SIZE {
        Err(ClientError::validation(
            "File too large. Maximum file size is 50MB.",
        ))
    } else {
        Ok(())
    }
}

/// Combined type and size check applied to every PDF upload.
///
/// # Errors
///
/// Returns the first failing check from [`ensure_pdf`] or [`ensure_size`].
pub fn ensure_pdf_upload(file: &InputFile) -> ClientResult<()> {
    ensure_pdf(file)?;
    ensure_size(file)
}

/// Merge needs at least two documents to produce anything meaningful.
///
/// # Errors
///
/// Returns [`ClientError::Validation`] when fewer than two files are given
/// or any file fails the upload checks.
pub fn ensure_merge_inputs(files: &[InputFile]) -> ClientResult<()> {
    if files.len() < 2 {
        return Err(ClientError::validation(
            "Please select at least two PDF files to merge.",
        ));
    }
    for file in files {
        ensure_pdf_upload(file)?;
    }
    Ok(())
}

/// Check that the options carried by a split request are coherent for the
/// chosen method before submission.
///
/// # Errors
///
/// Returns [`ClientError::Validation`] when `range` mode lacks page ranges
/// or `every` mode lacks a positive chunk size.
pub fn ensure_split_options(method: SplitMethod, options: &SplitOptions) -> ClientResult<()> {
    match method {
        SplitMethod::Range => {
            let ranges = options.page_ranges.as_deref().unwrap_or("").trim();
            if ranges.is_empty() {
                return Err(ClientError::validation(
                    "Please specify page ranges (e.g., 1-3,4,5-7)",
                ));
            }
        }
        SplitMethod::Every => {
            if options.every_n_pages.is_none_or(|n| n == 0) {
                return Err(ClientError::validation(
                    "Please specify how many pages each document should contain.",
                ));
            }
        }
        SplitMethod::Extract => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pdf(name: &str, size: u64) -> InputFile {
        InputFile {
            name: name.to_owned(),
            size_bytes: size,
            bytes: Vec::new(),
        }
    }

    #[test]
    fn accepts_mixed_case_pdf_extensions() {
        assert!(ensure_pdf(&pdf("scan.PDF", 10)).is_ok());
        assert!(ensure_pdf(&pdf("scan.pdf", 10)).is_ok());
    }

    #[test]
    fn rejects_non_pdf_files_with_the_product_message() {
        let err = ensure_pdf(&pdf("notes.txt", 10)).expect_err("must reject");
        assert_eq!(
            err.to_string(),
            "Invalid file type. Please upload a PDF file."
        );
    }

    #[test]
    fn enforces_the_upload_ceiling_inclusively() {
        assert!(ensure_size(&pdf("ok.pdf", MAX_FILE_SIZE)).is_ok());
        let err = ensure_size(&pdf("big.pdf", MAX_FILE_SIZE + 1)).expect_err("must reject");
        assert_eq!(err.to_string(), "File too large. Maximum file size is 50MB.");
    }

    #[test]
    fn merge_requires_two_files() {
        let err = ensure_merge_inputs(&[pdf("a.pdf", 10)]).expect_err("must reject");
        assert!(err.to_string().contains("at least two"));
        assert!(ensure_merge_inputs(&[pdf("a.pdf", 10), pdf("b.pdf", 10)]).is_ok());
    }

    #[test]
    fn range_split_requires_page_ranges() {
        let options = SplitOptions {
            page_ranges: Some("  ".into()),
            every_n_pages: None,
        };
        let err = ensure_split_options(SplitMethod::Range, &options).expect_err("must reject");
        assert_eq!(
            err.to_string(),
            "Please specify page ranges (e.g., 1-3,4,5-7)"
        );
    }

    #[test]
    fn every_split_requires_a_positive_chunk() {
        let options = SplitOptions {
            page_ranges: None,
            every_n_pages: Some(0),
        };
        assert!(ensure_split_options(SplitMethod::Every, &options).is_err());

        let options = SplitOptions {
            every_n_pages: Some(3),
            ..options
        };
        assert!(ensure_split_options(SplitMethod::Every, &options).is_ok());
    }

    #[test]
    fn extract_split_needs_no_extra_options() {
        assert!(ensure_split_options(SplitMethod::Extract, &SplitOptions::default()).is_ok());
    }
}
