#![forbid(unsafe_code)]
#![deny(
    warnings,
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]
//! Shared HTTP DTOs for the Inkpress document-processing API.
//!
//! These types are re-used by the client and the CLI for request/response
//! encoding so the wire contract stays in one place. Field names follow the
//! service's JSON (camelCase) exactly; request parameter enums carry the
//! form-field spellings the upload endpoints expect.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub mod file_url;

pub use file_url::{FileLocation, parse_composite_file_url};

/// Error document returned by the service on failed requests.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApiProblem {
    /// Short, human-readable summary of the issue.
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    /// Free-form diagnostic detail when available.
    pub details: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    /// Machine-readable error code.
    pub code: Option<String>,
}

/// Account snapshot embedded in auth responses and cached client-side.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Account identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Contact email address.
    pub email: String,
    /// Role assigned by the service.
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Whether the email address has been verified.
    pub is_email_verified: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Prepaid balance when included.
    pub balance: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Free-tier operations consumed this cycle.
    pub free_operations_used: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Free-tier operations remaining this cycle.
    pub free_operations_remaining: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Account creation timestamp.
    pub created_at: Option<DateTime<Utc>>,
}

/// Response to `POST /api/auth/login` and `POST /api/auth/register`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    /// Whether the call succeeded.
    pub success: bool,
    /// Bearer token to persist for subsequent calls.
    pub token: String,
    /// Authenticated account snapshot.
    pub user: User,
}

/// Response to `POST /api/auth/logout`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogoutResponse {
    /// Whether the call succeeded.
    pub success: bool,
    /// Human-readable confirmation.
    pub message: String,
}

/// Generic `{success, message}` acknowledgement returned by several
/// endpoints (password reset, email verification, key revocation, usage
/// tracking).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Acknowledgement {
    /// Whether the call succeeded.
    pub success: bool,
    /// Human-readable confirmation.
    pub message: String,
}

/// Response to `GET /api/auth/validate`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenValidation {
    /// Whether the presented token is still valid.
    pub valid: bool,
    /// Account identifier bound to the token.
    pub user_id: String,
    /// Role bound to the token.
    pub role: String,
}

/// Billing block attached to successful operation responses.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BillingInfo {
    /// Cost charged for this operation.
    pub operation_cost: f64,
    /// Remaining prepaid balance.
    pub current_balance: f64,
    /// Remaining free-tier operations.
    pub free_operations_remaining: u32,
    /// Whether a free-tier operation covered this call.
    pub used_free_operation: bool,
}

/// Common shape for synchronous single-file operation responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileOperationResponse {
    /// Whether the call succeeded.
    pub success: bool,
    /// Human-readable confirmation.
    pub message: String,
    /// Composite storage location; see [`parse_composite_file_url`].
    pub file_url: String,
    /// Name of the produced file.
    pub filename: String,
    /// Name of the uploaded source file.
    pub original_name: String,
    /// Size of the produced file in bytes.
    pub file_size: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Billing block when the service includes it.
    pub billing: Option<BillingInfo>,
}

/// Response to `POST /api/pdf/compress`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompressResponse {
    /// Common operation fields.
    #[serde(flatten)]
    pub operation: FileOperationResponse,
    /// Achieved size reduction ratio.
    pub compression_ratio: f64,
}

/// Response to `POST /api/pdf/merge`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeResponse {
    /// Common operation fields.
    #[serde(flatten)]
    pub operation: FileOperationResponse,
    /// Number of source documents merged.
    pub merged_files: u32,
}

/// One output file reported by a split operation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SplitResult {
    /// Name of the produced file.
    pub filename: String,
    /// Composite storage location; see [`parse_composite_file_url`].
    pub file_url: String,
    #[serde(default)]
    /// Page range covered by this file, when reported.
    pub page_range: String,
    #[serde(default)]
    /// Size of the produced file in bytes, when reported.
    pub file_size: u64,
}

/// Raw response to `POST /api/pdf/split`.
///
/// The server answers either synchronously (inline `results`) or
/// asynchronously (an `id` for later polling). [`SplitResponse::into_outcome`]
/// converts this implicit union into the explicit [`StartOutcome`] variant
/// callers branch on.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SplitResponse {
    /// Whether the call succeeded.
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Human-readable confirmation.
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Inline results for a synchronous completion.
    pub results: Option<Vec<SplitResult>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Job identifier for an asynchronous completion.
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Billing block when the service includes it.
    pub billing: Option<BillingInfo>,
}

/// Explicit start-operation outcome derived from a [`SplitResponse`].
#[derive(Debug, Clone, PartialEq)]
pub enum StartOutcome {
    /// The server finished synchronously and returned the results inline.
    Sync(Vec<SplitResult>),
    /// The server queued an asynchronous job to poll for completion.
    Async {
        /// Identifier accepted by the status endpoint.
        job_id: String,
    },
}

impl SplitResponse {
    /// Resolve the sync-vs-async union.
    ///
    /// Inline results win over a job id when both are present, matching the
    /// order the service documents. Returns `None` when the response carries
    /// neither, which callers treat as a failed start.
    #[must_use]
    pub fn into_outcome(self) -> Option<StartOutcome> {
        if let Some(results) = self.results {
            return Some(StartOutcome::Sync(results));
        }
        self.id.map(|job_id| StartOutcome::Async { job_id })
    }
}

/// Lifecycle status reported by the split status endpoint.
///
/// Anything the client does not recognise deserialises to `Working`, which
/// the polling driver treats as "not finished yet".
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// Queued, not yet started.
    Pending,
    /// Being processed.
    Processing,
    /// Finished; results are available.
    Completed,
    /// Finished unsuccessfully.
    Failed,
    /// Unrecognised status value; keep polling.
    #[serde(other)]
    Working,
}

/// Response to `GET /api/pdf/split/status?id=<id>`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SplitStatusResponse {
    /// Job identifier echoed back.
    pub id: String,
    #[serde(default)]
    /// Reported job status; absent means still working.
    pub status: Option<JobStatus>,
    #[serde(default)]
    /// Progress percentage, 0-100.
    pub progress: u8,
    #[serde(default)]
    /// Total number of output files expected.
    pub total: u32,
    #[serde(default)]
    /// Number of output files finished so far.
    pub completed: u32,
    #[serde(default)]
    /// Results, populated once the job completes.
    pub results: Vec<SplitResult>,
}

/// Response to `POST /api/pdf/extract-text`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractTextResponse {
    /// Whether the call succeeded.
    pub success: bool,
    /// Edit session identifier for follow-up calls.
    pub session_id: String,
    /// Extracted document text.
    pub extracted_text: String,
    /// Number of pages processed.
    pub page_count: u32,
    /// URL of the hosted edit session.
    pub edit_url: String,
}

/// Response to `POST /api/ocr` and `POST /api/ocr/extract`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OcrResponse {
    /// Common operation fields.
    #[serde(flatten)]
    pub operation: FileOperationResponse,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Recognised text when the endpoint returns it inline.
    pub extracted_text: Option<String>,
}

/// Response to `GET /api/user/profile`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// Account identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Contact email address.
    pub email: String,
    /// Role assigned by the service.
    pub role: String,
    /// Prepaid balance.
    pub balance: f64,
    /// Free-tier operations consumed this cycle.
    pub free_operations_used: u32,
    /// Free-tier operations remaining this cycle.
    pub free_operations_remaining: u32,
    /// Account creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl From<UserProfile> for User {
    fn from(profile: UserProfile) -> Self {
        Self {
            id: profile.id,
            name: profile.name,
            email: profile.email,
            role: profile.role,
            is_email_verified: None,
            balance: Some(profile.balance),
            free_operations_used: Some(profile.free_operations_used),
            free_operations_remaining: Some(profile.free_operations_remaining),
            created_at: Some(profile.created_at),
        }
    }
}

/// Response to `PUT /api/user/profile`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileUpdateResponse {
    /// Whether the call succeeded.
    pub success: bool,
    /// Human-readable confirmation.
    pub message: String,
    /// Profile after the update.
    pub user: UserProfile,
}

/// Response to `GET /api/user/balance`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserBalance {
    /// Prepaid balance.
    pub balance: f64,
    /// Free-tier operations consumed this cycle.
    pub free_operations_used: u32,
    /// Free-tier operations remaining this cycle.
    pub free_operations_remaining: u32,
    /// When the free-tier counter resets.
    pub free_operations_reset: DateTime<Utc>,
}

/// Response to `POST /api/user/deposit`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepositResponse {
    /// Whether the call succeeded.
    pub success: bool,
    /// Identifier for verifying the deposit later.
    pub transaction_id: String,
    /// Deposited amount.
    pub amount: f64,
    /// Currency code.
    pub currency: String,
    /// Payment provider status.
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Checkout URL when the provider requires a redirect.
    pub payment_url: Option<String>,
}

/// Response to `POST /api/user/deposit/verify`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DepositVerification {
    /// Whether the call succeeded.
    pub success: bool,
    /// Human-readable confirmation.
    pub message: String,
    /// Whether the deposit has settled.
    pub verified: bool,
}

/// One API key summary row.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiKeySummary {
    /// Key identifier.
    pub id: String,
    /// Label chosen at creation time.
    pub name: String,
    /// Masked preview of the key material.
    pub key_preview: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Last use timestamp when recorded.
    pub last_used: Option<DateTime<Utc>>,
    /// Whether the key is active.
    pub is_active: bool,
}

/// Response to `GET /api/keys`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiKeyList {
    /// Keys registered on the account.
    pub keys: Vec<ApiKeySummary>,
}

/// Response to `POST /api/keys`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiKeyCreated {
    /// Key identifier.
    pub id: String,
    /// Label chosen at creation time.
    pub name: String,
    /// Full key material, shown once and persisted client-side.
    pub key: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Response to `GET /api/pricing`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingInfo {
    /// Default per-operation cost.
    pub operation_cost: f64,
    /// Free-tier operations granted per month.
    pub free_operations_monthly: u32,
    /// Per-operation price overrides.
    pub custom_prices: std::collections::HashMap<String, f64>,
    /// When the pricing table last changed.
    pub last_updated: DateTime<Utc>,
    /// Where the pricing table was loaded from.
    pub source: String,
}

/// Response to `GET /api/pricing/operation/{operation}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationPrice {
    /// Operation name.
    pub operation: String,
    /// Price for one invocation.
    pub cost: f64,
    /// Currency code.
    pub currency: String,
}

/// One line of a price-calculator request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceQuery {
    /// Operation name.
    pub operation: String,
    /// Requested invocation count.
    pub count: u32,
}

/// One line of a price-calculator breakdown.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceCalculation {
    /// Operation name.
    pub operation: String,
    /// Requested invocation count.
    pub count: u32,
    /// Price for one invocation.
    pub unit_cost: f64,
    /// Line total.
    pub total_cost: f64,
}

/// Response to `POST /api/pricing/calculator`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceCalculatorResponse {
    /// Grand total across all lines.
    pub total_cost: f64,
    /// Per-operation breakdown.
    pub breakdown: Vec<PriceCalculation>,
    /// Currency code.
    pub currency: String,
}

/// Reporting period attached to usage statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsagePeriod {
    /// Period start.
    pub start: DateTime<Utc>,
    /// Period end.
    pub end: DateTime<Utc>,
}

/// Response to `GET /api/track-usage`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageStatistics {
    /// Operations attempted in the period.
    pub total_operations: u64,
    /// Operations that succeeded.
    pub successful_operations: u64,
    /// Operations that failed.
    pub failed_operations: u64,
    /// Count per operation name.
    pub operation_breakdown: std::collections::HashMap<String, u64>,
    /// Files processed in the period.
    pub total_files_processed: u64,
    /// Bytes processed in the period.
    pub total_data_processed: u64,
    /// Mean processing time in seconds.
    pub average_processing_time: f64,
    /// Reporting window.
    pub period: UsagePeriod,
}

/// Request body for `POST /api/track-usage`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackUsageRequest {
    /// Operation name.
    pub operation: String,
    /// Whether the operation succeeded.
    pub success: bool,
    /// Size of the processed file in bytes.
    pub file_size: u64,
    /// Wall-clock processing time in seconds.
    pub processing_time: f64,
}

/// Response to `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthCheck {
    /// Overall service status ("ok" or "error").
    pub status: String,
    /// Where the service loaded its configuration from.
    pub config_source: String,
}

/// Compression quality accepted by the compress endpoint.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CompressQuality {
    /// Largest output, best fidelity.
    High,
    /// Balanced output.
    Medium,
    /// Smallest output.
    Low,
}

impl CompressQuality {
    /// Form-field spelling expected by the endpoint.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

/// Split strategy accepted by the split endpoint.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SplitMethod {
    /// Split by explicit page ranges (`1-3,4,5-7`).
    Range,
    /// Extract each page into its own file.
    Extract,
    /// Split every N pages.
    Every,
}

impl SplitMethod {
    /// Form-field spelling expected by the endpoint.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Range => "range",
            Self::Extract => "extract",
            Self::Every => "every",
        }
    }
}

/// Method-specific split parameters.
///
/// Only the field matching the chosen [`SplitMethod`] is attached to the
/// upload; the others are ignored, mirroring the endpoint contract.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SplitOptions {
    /// Page ranges for [`SplitMethod::Range`].
    pub page_ranges: Option<String>,
    /// Interval for [`SplitMethod::Every`].
    pub every_n_pages: Option<u32>,
}

/// Rotation angle accepted by the rotate endpoint.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum RotationAngle {
    /// Quarter turn clockwise.
    #[serde(rename = "90")]
    Quarter,
    /// Half turn.
    #[serde(rename = "180")]
    Half,
    /// Three-quarter turn clockwise.
    #[serde(rename = "270")]
    ThreeQuarter,
}

impl RotationAngle {
    /// Degrees as the form-field string the endpoint expects.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Quarter => "90",
            Self::Half => "180",
            Self::ThreeQuarter => "270",
        }
    }
}

/// Placement options for text or image watermarks.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum WatermarkPosition {
    /// Centered on the page.
    Center,
    /// Upper-left corner.
    TopLeft,
    /// Upper-right corner.
    TopRight,
    /// Lower-left corner.
    BottomLeft,
    /// Lower-right corner.
    BottomRight,
}

impl WatermarkPosition {
    /// Form-field spelling expected by the endpoint.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Center => "center",
            Self::TopLeft => "top-left",
            Self::TopRight => "top-right",
            Self::BottomLeft => "bottom-left",
            Self::BottomRight => "bottom-right",
        }
    }
}

/// Page selection for watermarking.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WatermarkPages {
    /// Every page.
    All,
    /// First page only.
    First,
    /// Last page only.
    Last,
    /// Odd-numbered pages.
    Odd,
    /// Even-numbered pages.
    Even,
    /// Pages listed in `custom_pages`.
    Custom,
}

impl WatermarkPages {
    /// Form-field spelling expected by the endpoint.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::First => "first",
            Self::Last => "last",
            Self::Odd => "odd",
            Self::Even => "even",
            Self::Custom => "custom",
        }
    }
}

/// Text-or-image watermark payload.
#[derive(Debug, Clone, PartialEq)]
pub enum WatermarkKind {
    /// A text watermark with the given content.
    Text {
        /// Text to stamp on each selected page.
        content: String,
    },
    /// An image watermark; the image bytes ride in a separate form field.
    Image {
        /// File name reported for the image part.
        filename: String,
        /// Raw image bytes.
        bytes: Vec<u8>,
    },
}

impl WatermarkKind {
    /// Form-field spelling for the `watermarkType` discriminator.
    #[must_use]
    pub const fn type_str(&self) -> &'static str {
        match self {
            Self::Text { .. } => "text",
            Self::Image { .. } => "image",
        }
    }
}

/// Full option set for the watermark endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct WatermarkOptions {
    /// Text or image payload.
    pub kind: WatermarkKind,
    /// Placement on the page.
    pub position: Option<WatermarkPosition>,
    /// Opacity percentage, 0-100.
    pub opacity: Option<u8>,
    /// Rotation in degrees.
    pub rotation: Option<i32>,
    /// Scale percentage.
    pub scale: Option<u32>,
    /// Text color (hex) for text watermarks.
    pub text_color: Option<String>,
    /// Page selection.
    pub pages: Option<WatermarkPages>,
    /// Explicit page list for [`WatermarkPages::Custom`].
    pub custom_pages: Option<String>,
}

impl WatermarkOptions {
    /// Convenience constructor for a plain text watermark.
    #[must_use]
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            kind: WatermarkKind::Text {
                content: content.into(),
            },
            position: None,
            opacity: None,
            rotation: None,
            scale: None,
            text_color: None,
            pages: None,
            custom_pages: None,
        }
    }
}

/// Placement of a signature image on a page.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct SignaturePlacement {
    /// Horizontal offset in points.
    pub x: i32,
    /// Vertical offset in points.
    pub y: i32,
    /// One-based page number.
    pub page: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn split_response_prefers_inline_results() {
        let response = SplitResponse {
            success: true,
            message: None,
            results: Some(vec![SplitResult {
                filename: "a.pdf".into(),
                file_url: "/api/file?folder=xyz&filename=a.pdf".into(),
                page_range: "1-3".into(),
                file_size: 100,
            }]),
            id: Some("job-42".into()),
            billing: None,
        };

        match response.into_outcome() {
            Some(StartOutcome::Sync(results)) => assert_eq!(results.len(), 1),
            other => panic!("expected sync outcome, got {other:?}"),
        }
    }

    #[test]
    fn split_response_falls_back_to_job_id() {
        let response: SplitResponse =
            serde_json::from_value(json!({"success": true, "id": "job-42"})).expect("deserialize");

        assert_eq!(
            response.into_outcome(),
            Some(StartOutcome::Async {
                job_id: "job-42".into()
            })
        );
    }

    #[test]
    fn split_response_without_results_or_id_is_a_failed_start() {
        let response: SplitResponse =
            serde_json::from_value(json!({"success": false})).expect("deserialize");
        assert_eq!(response.into_outcome(), None);
    }

    #[test]
    fn unknown_job_status_keeps_polling_semantics() {
        let status: SplitStatusResponse = serde_json::from_value(json!({
            "id": "job-42",
            "status": "queued_behind_maintenance",
            "progress": 10
        }))
        .expect("deserialize");

        assert_eq!(status.status, Some(JobStatus::Working));
        assert_eq!(status.progress, 10);
    }

    #[test]
    fn absent_job_status_deserializes_as_none() {
        let status: SplitStatusResponse =
            serde_json::from_value(json!({"id": "job-42"})).expect("deserialize");
        assert_eq!(status.status, None);
        assert!(status.results.is_empty());
    }

    #[test]
    fn file_operation_response_uses_camel_case_wire_names() {
        let response: FileOperationResponse = serde_json::from_value(json!({
            "success": true,
            "message": "done",
            "fileUrl": "/api/file?folder=abc&filename=out.pdf",
            "filename": "out.pdf",
            "originalName": "in.pdf",
            "fileSize": 2048
        }))
        .expect("deserialize");

        assert_eq!(response.filename, "out.pdf");
        assert_eq!(response.file_size, 2048);
        assert!(response.billing.is_none());
    }

    #[test]
    fn compress_response_flattens_common_fields() {
        let response: CompressResponse = serde_json::from_value(json!({
            "success": true,
            "message": "done",
            "fileUrl": "/api/file?folder=abc&filename=out.pdf",
            "filename": "out.pdf",
            "originalName": "in.pdf",
            "fileSize": 1024,
            "compressionRatio": 0.42
        }))
        .expect("deserialize");

        assert!((response.compression_ratio - 0.42).abs() < f64::EPSILON);
        assert_eq!(response.operation.filename, "out.pdf");
    }

    #[test]
    fn request_enums_spell_form_fields_exactly() {
        assert_eq!(CompressQuality::Medium.as_str(), "medium");
        assert_eq!(SplitMethod::Every.as_str(), "every");
        assert_eq!(RotationAngle::ThreeQuarter.as_str(), "270");
        assert_eq!(WatermarkPosition::BottomRight.as_str(), "bottom-right");
        assert_eq!(WatermarkPages::Custom.as_str(), "custom");
        assert_eq!(WatermarkOptions::text("draft").kind.type_str(), "text");
    }
}
