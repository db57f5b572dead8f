//! Service seam between tool surfaces and the HTTP client.
//!
//! Tool commands program against [`ToolBackend`] rather than [`ApiClient`]
//! directly, so tests can substitute a fixture that answers instantly
//! without a server. [`ApiClient`] is the production implementation.

use async_trait::async_trait;
use inkpress_api_models::{
    CompressQuality, CompressResponse, ExtractTextResponse, FileOperationResponse, MergeResponse,
    OcrResponse, RotationAngle, SignaturePlacement, SplitMethod, SplitOptions,
    SplitStatusResponse, StartOutcome, WatermarkOptions,
};
use inkpress_ops::{DownloadLink, InputFile};

use crate::client::ApiClient;
use crate::error::ClientResult;

/// Document operations available to tool surfaces.
#[async_trait]
pub trait ToolBackend: Send + Sync {
    /// Compress a document at the given quality.
    async fn compress(
        &self,
        file: &InputFile,
        quality: CompressQuality,
    ) -> ClientResult<CompressResponse>;

    /// Convert a document to the given target format.
    async fn convert(
        &self,
        file: &InputFile,
        target_format: &str,
    ) -> ClientResult<FileOperationResponse>;

    /// Merge two or more documents into one.
    async fn merge(&self, files: &[InputFile]) -> ClientResult<MergeResponse>;

    /// Start a split; the server may answer synchronously or queue a job.
    async fn split(
        &self,
        file: &InputFile,
        method: SplitMethod,
        options: &SplitOptions,
    ) -> ClientResult<StartOutcome>;

    /// Query the status of a queued split job.
    async fn split_status(&self, job_id: &str) -> ClientResult<SplitStatusResponse>;

    /// Password-protect a document.
    async fn protect(
        &self,
        file: &InputFile,
        password: &str,
    ) -> ClientResult<FileOperationResponse>;

    /// Remove password protection from a document.
    async fn unlock(&self, file: &InputFile, password: &str)
    -> ClientResult<FileOperationResponse>;

    /// Rotate the selected pages.
    async fn rotate(
        &self,
        file: &InputFile,
        angle: RotationAngle,
        pages: &str,
    ) -> ClientResult<FileOperationResponse>;

    /// Stamp a text or image watermark on the selected pages.
    async fn watermark(
        &self,
        file: &InputFile,
        options: &WatermarkOptions,
    ) -> ClientResult<FileOperationResponse>;

    /// Add page numbers starting at the given value.
    async fn add_page_numbers(
        &self,
        file: &InputFile,
        position: &str,
        start_number: u32,
    ) -> ClientResult<FileOperationResponse>;

    /// Remove the listed pages.
    async fn remove_pages(
        &self,
        file: &InputFile,
        pages: &str,
    ) -> ClientResult<FileOperationResponse>;

    /// Place a signature image on a page.
    async fn sign(
        &self,
        file: &InputFile,
        signature: &InputFile,
        placement: SignaturePlacement,
    ) -> ClientResult<FileOperationResponse>;

    /// Open a text-edit session for a document.
    async fn extract_text(&self, file: &InputFile) -> ClientResult<ExtractTextResponse>;

    /// Save edited text back into an open session.
    async fn save_edited_text(
        &self,
        session_id: &str,
        edited_text: &str,
    ) -> ClientResult<FileOperationResponse>;

    /// Run OCR over a scanned document.
    async fn ocr(&self, file: &InputFile, language: &str) -> ClientResult<OcrResponse>;

    /// Extract recognised text without producing a searchable document.
    async fn ocr_extract(&self, file: &InputFile) -> ClientResult<OcrResponse>;

    /// Resolve a synchronous operation response to a direct download link.
    fn resolve_operation(&self, response: &FileOperationResponse) -> ClientResult<DownloadLink>;
}

#[async_trait]
impl ToolBackend for ApiClient {
    async fn compress(
        &self,
        file: &InputFile,
        quality: CompressQuality,
    ) -> ClientResult<CompressResponse> {
        Self::compress(self, file, quality).await
    }

    async fn convert(
        &self,
        file: &InputFile,
        target_format: &str,
    ) -> ClientResult<FileOperationResponse> {
        Self::convert(self, file, target_format).await
    }

    async fn merge(&self, files: &[InputFile]) -> ClientResult<MergeResponse> {
        Self::merge(self, files).await
    }

    async fn split(
        &self,
        file: &InputFile,
        method: SplitMethod,
        options: &SplitOptions,
    ) -> ClientResult<StartOutcome> {
        Self::split(self, file, method, options).await
    }

    async fn split_status(&self, job_id: &str) -> ClientResult<SplitStatusResponse> {
        Self::split_status(self, job_id).await
    }

    async fn protect(
        &self,
        file: &InputFile,
        password: &str,
    ) -> ClientResult<FileOperationResponse> {
        Self::protect(self, file, password).await
    }

    async fn unlock(
        &self,
        file: &InputFile,
        password: &str,
    ) -> ClientResult<FileOperationResponse> {
        Self::unlock(self, file, password).await
    }

    async fn rotate(
        &self,
        file: &InputFile,
        angle: RotationAngle,
        pages: &str,
    ) -> ClientResult<FileOperationResponse> {
        Self::rotate(self, file, angle, pages).await
    }

    async fn watermark(
        &self,
        file: &InputFile,
        options: &WatermarkOptions,
    ) -> ClientResult<FileOperationResponse> {
        Self::watermark(self, file, options).await
    }

    async fn add_page_numbers(
        &self,
        file: &InputFile,
        position: &str,
        start_number: u32,
    ) -> ClientResult<FileOperationResponse> {
        Self::add_page_numbers(self, file, position, start_number).await
    }

    async fn remove_pages(
        &self,
        file: &InputFile,
        pages: &str,
    ) -> ClientResult<FileOperationResponse> {
        Self::remove_pages(self, file, pages).await
    }

    async fn sign(
        &self,
        file: &InputFile,
        signature: &InputFile,
        placement: SignaturePlacement,
    ) -> ClientResult<FileOperationResponse> {
        Self::sign(self, file, signature, placement).await
    }

    async fn extract_text(&self, file: &InputFile) -> ClientResult<ExtractTextResponse> {
        Self::extract_text(self, file).await
    }

    async fn save_edited_text(
        &self,
        session_id: &str,
        edited_text: &str,
    ) -> ClientResult<FileOperationResponse> {
        Self::save_edited_text(self, session_id, edited_text).await
    }

    async fn ocr(&self, file: &InputFile, language: &str) -> ClientResult<OcrResponse> {
        Self::ocr(self, file, language).await
    }

    async fn ocr_extract(&self, file: &InputFile) -> ClientResult<OcrResponse> {
        Self::ocr_extract(self, file).await
    }

    fn resolve_operation(&self, response: &FileOperationResponse) -> ClientResult<DownloadLink> {
        Self::resolve_operation(self, response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ClientError;

    /// Canned backend answering from fixtures, the substitution the seam
    /// exists for.
    struct FixtureBackend;

    fn canned_operation(filename: &str) -> FileOperationResponse {
        FileOperationResponse {
            success: true,
            message: "done".into(),
            file_url: format!("/api/file?folder=fixtures&filename=raw-{filename}"),
            filename: filename.to_owned(),
            original_name: "input.pdf".into(),
            file_size: 1024,
            billing: None,
        }
    }

    #[async_trait]
    impl ToolBackend for FixtureBackend {
        async fn compress(
            &self,
            _file: &InputFile,
            _quality: CompressQuality,
        ) -> ClientResult<CompressResponse> {
            Ok(CompressResponse {
                operation: canned_operation("compressed.pdf"),
                compression_ratio: 0.4,
            })
        }

        async fn convert(
            &self,
            _file: &InputFile,
            target_format: &str,
        ) -> ClientResult<FileOperationResponse> {
            Ok(canned_operation(&format!("converted.{target_format}")))
        }

        async fn merge(&self, files: &[InputFile]) -> ClientResult<MergeResponse> {
            Ok(MergeResponse {
                operation: canned_operation("merged.pdf"),
                merged_files: u32::try_from(files.len()).unwrap_or(u32::MAX),
            })
        }

        async fn split(
            &self,
            _file: &InputFile,
            _method: SplitMethod,
            _options: &SplitOptions,
        ) -> ClientResult<StartOutcome> {
            Ok(StartOutcome::Async {
                job_id: "fixture-job".into(),
            })
        }

        async fn split_status(&self, job_id: &str) -> ClientResult<SplitStatusResponse> {
            Ok(SplitStatusResponse {
                id: job_id.to_owned(),
                status: None,
                progress: 10,
                total: 0,
                completed: 0,
                results: Vec::new(),
            })
        }

        async fn protect(
            &self,
            _file: &InputFile,
            _password: &str,
        ) -> ClientResult<FileOperationResponse> {
            Ok(canned_operation("protected.pdf"))
        }

        async fn unlock(
            &self,
            _file: &InputFile,
            _password: &str,
        ) -> ClientResult<FileOperationResponse> {
            Ok(canned_operation("unlocked.pdf"))
        }

        async fn rotate(
            &self,
            _file: &InputFile,
            _angle: RotationAngle,
            _pages: &str,
        ) -> ClientResult<FileOperationResponse> {
            Ok(canned_operation("rotated.pdf"))
        }

        async fn watermark(
            &self,
            _file: &InputFile,
            _options: &WatermarkOptions,
        ) -> ClientResult<FileOperationResponse> {
            Ok(canned_operation("watermarked.pdf"))
        }

        async fn add_page_numbers(
            &self,
            _file: &InputFile,
            _position: &str,
            _start_number: u32,
        ) -> ClientResult<FileOperationResponse> {
            Ok(canned_operation("numbered.pdf"))
        }

        async fn remove_pages(
            &self,
            _file: &InputFile,
            _pages: &str,
        ) -> ClientResult<FileOperationResponse> {
            Ok(canned_operation("trimmed.pdf"))
        }

        async fn sign(
            &self,
            _file: &InputFile,
            _signature: &InputFile,
            _placement: SignaturePlacement,
        ) -> ClientResult<FileOperationResponse> {
            Ok(canned_operation("signed.pdf"))
        }

        async fn extract_text(&self, _file: &InputFile) -> ClientResult<ExtractTextResponse> {
            Ok(ExtractTextResponse {
                success: true,
                session_id: "sess-1".into(),
                extracted_text: "hello".into(),
                page_count: 1,
                edit_url: "/edit/sess-1".into(),
            })
        }

        async fn save_edited_text(
            &self,
            _session_id: &str,
            _edited_text: &str,
        ) -> ClientResult<FileOperationResponse> {
            Ok(canned_operation("edited.pdf"))
        }

        async fn ocr(&self, _file: &InputFile, _language: &str) -> ClientResult<OcrResponse> {
            Ok(OcrResponse {
                operation: canned_operation("searchable.pdf"),
                extracted_text: None,
            })
        }

        async fn ocr_extract(&self, _file: &InputFile) -> ClientResult<OcrResponse> {
            Ok(OcrResponse {
                operation: canned_operation("text.pdf"),
                extracted_text: Some("recognised".into()),
            })
        }

        fn resolve_operation(
            &self,
            response: &FileOperationResponse,
        ) -> ClientResult<DownloadLink> {
            inkpress_api_models::parse_composite_file_url(&response.file_url)
                .map(|location| DownloadLink {
                    filename: response.filename.clone(),
                    download_url: format!(
                        "fixture://{}/{}",
                        location.folder, response.filename
                    ),
                    file_size: response.file_size,
                    page_range: None,
                })
                .ok_or(ClientError::UnexpectedResponse)
        }
    }

    async fn drive_convert(backend: &dyn ToolBackend) -> ClientResult<DownloadLink> {
        let file = InputFile::new("input.pdf", b"%PDF".to_vec());
        let response = backend.convert(&file, "docx").await?;
        backend.resolve_operation(&response)
    }

    #[tokio::test]
    async fn tools_run_unchanged_against_a_fixture_backend() {
        let link = drive_convert(&FixtureBackend).await.expect("converted");
        assert_eq!(link.filename, "converted.docx");
        assert_eq!(link.download_url, "fixture://fixtures/converted.docx");
    }
}
