//! Typed HTTP client, one method per consumed endpoint.
//!
//! Every method validates its inputs first, so a rejected request never
//! leaves the process, then authorizes with whatever credentials the
//! session store holds. A `401` from any endpoint invalidates the session
//! globally before the error surfaces.

use std::time::Duration;

use async_trait::async_trait;
use inkpress_api_models::{
    Acknowledgement, ApiKeyCreated, ApiKeyList, AuthResponse, CompressQuality, CompressResponse,
    DepositResponse, DepositVerification, ExtractTextResponse, FileOperationResponse, HealthCheck,
    JobStatus, LogoutResponse, MergeResponse, OcrResponse, OperationPrice,
    PriceCalculatorResponse, PriceQuery, PricingInfo, ProfileUpdateResponse, SignaturePlacement,
    SplitMethod, SplitOptions, SplitResponse, SplitResult, SplitStatusResponse, StartOutcome,
    TokenValidation, TrackUsageRequest, UsageStatistics, UserBalance, UserProfile,
    WatermarkKind, WatermarkOptions, parse_composite_file_url,
};
use inkpress_ops::{DownloadLink, InputFile, PollReport, StatusProbe};
use reqwest::multipart::{Form, Part};
use reqwest::{Method, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::debug;

use crate::error::{ClientError, ClientResult, classify, is_unauthorized};
use crate::session::SessionStore;
use crate::validate;

/// Request timeout applied when the caller does not override it.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Header carrying the persisted API key on every authorized request.
pub const HEADER_API_KEY: &str = "X-API-Key";

/// Message surfaced when an asynchronous job reports failure.
const SPLIT_FAILED_MESSAGE: &str = "Split operation failed";

/// Typed client for the remote document-processing API.
///
/// Cloning is cheap; clones share the connection pool and session store.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    session: SessionStore,
}

impl ApiClient {
    /// Build a client against `base_url` with the default timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(base_url: Url, session: SessionStore) -> ClientResult<Self> {
        Self::with_timeout(base_url, session, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Build a client with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn with_timeout(
        base_url: Url,
        session: SessionStore,
        timeout: Duration,
    ) -> ClientResult<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url,
            session,
        })
    }

    /// Session store this client authorizes from and invalidates into.
    #[must_use]
    pub const fn session(&self) -> &SessionStore {
        &self.session
    }

    /// Base URL the client was configured with.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ---- auth ----------------------------------------------------------

    /// `POST /api/auth/register`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the service rejects it.
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> ClientResult<AuthResponse> {
        let body = json!({ "name": name, "email": email, "password": password });
        self.post_json("/api/auth/register", &body).await
    }

    /// `POST /api/auth/login`. On success the bearer token and profile
    /// snapshot are persisted to the session store.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the credentials are rejected.
    pub async fn login(&self, email: &str, password: &str) -> ClientResult<AuthResponse> {
        let body = json!({ "email": email, "password": password });
        let response: AuthResponse = self.post_json("/api/auth/login", &body).await?;
        self.session.set_auth_token(response.token.clone())?;
        self.session.set_user(response.user.clone())?;
        debug!(user = %response.user.email, "login persisted");
        Ok(response)
    }

    /// `POST /api/auth/logout`. Clears the persisted token and profile; a
    /// created API key survives the logout.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the session file cannot be
    /// updated.
    pub async fn logout(&self) -> ClientResult<LogoutResponse> {
        let response: LogoutResponse = self.post_empty("/api/auth/logout").await?;
        self.session.clear_login()?;
        Ok(response)
    }

    /// `POST /api/auth/reset-password` — request a password reset email.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the service rejects it.
    pub async fn request_password_reset(&self, email: &str) -> ClientResult<Acknowledgement> {
        self.post_json("/api/auth/reset-password", &json!({ "email": email }))
            .await
    }

    /// `POST /api/auth/reset-password/confirm` — complete a reset.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the token is rejected.
    pub async fn confirm_password_reset(
        &self,
        token: &str,
        new_password: &str,
    ) -> ClientResult<Acknowledgement> {
        let body = json!({ "token": token, "newPassword": new_password });
        self.post_json("/api/auth/reset-password/confirm", &body)
            .await
    }

    /// Email verification: with a token this confirms it
    /// (`GET /api/auth/verify-email?token=`), without one it requests a new
    /// verification email (`POST /api/auth/verify-email`).
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the token is rejected.
    pub async fn verify_email(&self, token: Option<&str>) -> ClientResult<Acknowledgement> {
        match token {
            Some(token) => {
                let mut url = self.join_url("/api/auth/verify-email")?;
                url.query_pairs_mut().append_pair("token", token);
                self.run(self.http.get(url)).await
            }
            None => self.post_empty("/api/auth/verify-email").await,
        }
    }

    /// `GET /api/auth/validate`. When the token is still valid the profile
    /// snapshot in the session store is refreshed from the server.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails; an invalid token surfaces as
    /// [`ClientError::Unauthorized`] after the session is cleared.
    pub async fn validate_session(&self) -> ClientResult<TokenValidation> {
        let validation: TokenValidation = self.get("/api/auth/validate").await?;
        if validation.valid {
            let profile = self.profile().await?;
            self.session.set_user(profile.into())?;
        }
        Ok(validation)
    }

    // ---- pdf tools -----------------------------------------------------

    /// `POST /api/pdf/compress`.
    ///
    /// # Errors
    ///
    /// Returns an error if validation fails, the request fails, or the
    /// service rejects it.
    pub async fn compress(
        &self,
        file: &InputFile,
        quality: CompressQuality,
    ) -> ClientResult<CompressResponse> {
        validate::ensure_pdf_upload(file)?;
        let form = pdf_form(file).text("quality", quality.as_str());
        self.post_form("/api/pdf/compress", form).await
    }

    /// `POST /api/pdf/convert`.
    ///
    /// # Errors
    ///
    /// Returns an error if validation fails, the request fails, or the
    /// service rejects it.
    pub async fn convert(
        &self,
        file: &InputFile,
        target_format: &str,
    ) -> ClientResult<FileOperationResponse> {
        validate::ensure_pdf_upload(file)?;
        let form = pdf_form(file).text("targetFormat", target_format.to_owned());
        self.post_form("/api/pdf/convert", form).await
    }

    /// `POST /api/pdf/merge`. Requires at least two documents.
    ///
    /// # Errors
    ///
    /// Returns an error if validation fails, the request fails, or the
    /// service rejects it.
    pub async fn merge(&self, files: &[InputFile]) -> ClientResult<MergeResponse> {
        validate::ensure_merge_inputs(files)?;
        let mut form = Form::new();
        for file in files {
            form = form.part("files", file_part(file));
        }
        self.post_form("/api/pdf/merge", form).await
    }

    /// `POST /api/pdf/split`. Only the option matching `method` is sent;
    /// `extract` carries no extra field.
    ///
    /// # Errors
    ///
    /// Returns an error if validation fails, the request fails, or the
    /// response carries neither inline results nor a job identifier.
    pub async fn split(
        &self,
        file: &InputFile,
        method: SplitMethod,
        options: &SplitOptions,
    ) -> ClientResult<StartOutcome> {
        validate::ensure_pdf_upload(file)?;
        validate::ensure_split_options(method, options)?;

        let mut form = pdf_form(file).text("splitMethod", method.as_str());
        match method {
            SplitMethod::Range => {
                if let Some(ranges) = &options.page_ranges {
                    form = form.text("pageRanges", ranges.clone());
                }
            }
            SplitMethod::Every => {
                if let Some(n) = options.every_n_pages {
                    form = form.text("everyNPages", n.to_string());
                }
            }
            SplitMethod::Extract => {}
        }

        let response: SplitResponse = self.post_form("/api/pdf/split", form).await?;
        response
            .into_outcome()
            .ok_or(ClientError::UnexpectedResponse)
    }

    /// `GET /api/pdf/split/status?id=<id>`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the service rejects it.
    pub async fn split_status(&self, job_id: &str) -> ClientResult<SplitStatusResponse> {
        let mut url = self.join_url("/api/pdf/split/status")?;
        url.query_pairs_mut().append_pair("id", job_id);
        self.run(self.http.get(url)).await
    }

    /// `POST /api/pdf/protect`.
    ///
    /// # Errors
    ///
    /// Returns an error if validation fails, the request fails, or the
    /// service rejects it.
    pub async fn protect(
        &self,
        file: &InputFile,
        password: &str,
    ) -> ClientResult<FileOperationResponse> {
        validate::ensure_pdf_upload(file)?;
        let form = pdf_form(file).text("password", password.to_owned());
        self.post_form("/api/pdf/protect", form).await
    }

    /// `POST /api/pdf/unlock`.
    ///
    /// # Errors
    ///
    /// Returns an error if validation fails, the request fails, or the
    /// service rejects it.
    pub async fn unlock(
        &self,
        file: &InputFile,
        password: &str,
    ) -> ClientResult<FileOperationResponse> {
        validate::ensure_pdf_upload(file)?;
        let form = pdf_form(file).text("password", password.to_owned());
        self.post_form("/api/pdf/unlock", form).await
    }

    /// `POST /api/pdf/rotate`.
    ///
    /// # Errors
    ///
    /// Returns an error if validation fails, the request fails, or the
    /// service rejects it.
    pub async fn rotate(
        &self,
        file: &InputFile,
        angle: inkpress_api_models::RotationAngle,
        pages: &str,
    ) -> ClientResult<FileOperationResponse> {
        validate::ensure_pdf_upload(file)?;
        let form = pdf_form(file)
            .text("rotation", angle.as_str())
            .text("pages", pages.to_owned());
        self.post_form("/api/pdf/rotate", form).await
    }

    /// `POST /api/pdf/watermark`. Text watermarks send a `content` field,
    /// image watermarks a `watermarkImage` part; optional fields are
    /// attached only when set.
    ///
    /// # Errors
    ///
    /// Returns an error if validation fails, the request fails, or the
    /// service rejects it.
    pub async fn watermark(
        &self,
        file: &InputFile,
        options: &WatermarkOptions,
    ) -> ClientResult<FileOperationResponse> {
        validate::ensure_pdf_upload(file)?;
        let mut form = pdf_form(file).text("watermarkType", options.kind.type_str());

        match &options.kind {
            WatermarkKind::Text { content } => {
                form = form.text("content", content.clone());
            }
            WatermarkKind::Image { filename, bytes } => {
                let part = Part::bytes(bytes.clone()).file_name(filename.clone());
                form = form.part("watermarkImage", part);
            }
        }

        if let Some(position) = options.position {
            form = form.text("position", position.as_str());
        }
        if let Some(opacity) = options.opacity {
            form = form.text("opacity", opacity.to_string());
        }
        if let Some(rotation) = options.rotation {
            form = form.text("rotation", rotation.to_string());
        }
        if let Some(scale) = options.scale {
            form = form.text("scale", scale.to_string());
        }
        if let Some(color) = &options.text_color {
            form = form.text("textColor", color.clone());
        }
        if let Some(pages) = options.pages {
            form = form.text("pages", pages.as_str());
        }
        if let Some(custom) = &options.custom_pages {
            form = form.text("customPages", custom.clone());
        }

        self.post_form("/api/pdf/watermark", form).await
    }

    /// `POST /api/pdf/pagenumber`.
    ///
    /// # Errors
    ///
    /// Returns an error if validation fails, the request fails, or the
    /// service rejects it.
    pub async fn add_page_numbers(
        &self,
        file: &InputFile,
        position: &str,
        start_number: u32,
    ) -> ClientResult<FileOperationResponse> {
        validate::ensure_pdf_upload(file)?;
        let form = pdf_form(file)
            .text("position", position.to_owned())
            .text("startNumber", start_number.to_string());
        self.post_form("/api/pdf/pagenumber", form).await
    }

    /// `POST /api/pdf/remove`.
    ///
    /// # Errors
    ///
    /// Returns an error if validation fails, the request fails, or the
    /// service rejects it.
    pub async fn remove_pages(
        &self,
        file: &InputFile,
        pages: &str,
    ) -> ClientResult<FileOperationResponse> {
        validate::ensure_pdf_upload(file)?;
        let form = pdf_form(file).text("pages", pages.to_owned());
        self.post_form("/api/pdf/remove", form).await
    }

    /// `POST /api/pdf/sign`. The signature image rides in its own part;
    /// placement is flattened into `x`, `y` and `page` fields.
    ///
    /// # Errors
    ///
    /// Returns an error if validation fails, the request fails, or the
    /// service rejects it.
    pub async fn sign(
        &self,
        file: &InputFile,
        signature: &InputFile,
        placement: SignaturePlacement,
    ) -> ClientResult<FileOperationResponse> {
        validate::ensure_pdf_upload(file)?;
        let form = pdf_form(file)
            .part("signature", file_part(signature))
            .text("x", placement.x.to_string())
            .text("y", placement.y.to_string())
            .text("page", placement.page.to_string());
        self.post_form("/api/pdf/sign", form).await
    }

    /// `POST /api/pdf/extract-text` — open an edit session for a document.
    ///
    /// # Errors
    ///
    /// Returns an error if validation fails, the request fails, or the
    /// service rejects it.
    pub async fn extract_text(&self, file: &InputFile) -> ClientResult<ExtractTextResponse> {
        validate::ensure_pdf_upload(file)?;
        self.post_form("/api/pdf/extract-text", pdf_form(file)).await
    }

    /// `POST /api/pdf/save-edited-text` — write the edited text back into
    /// the session opened by [`ApiClient::extract_text`].
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the session is unknown.
    pub async fn save_edited_text(
        &self,
        session_id: &str,
        edited_text: &str,
    ) -> ClientResult<FileOperationResponse> {
        let body = json!({ "sessionId": session_id, "editedText": edited_text });
        self.post_json("/api/pdf/save-edited-text", &body).await
    }

    // ---- ocr -----------------------------------------------------------

    /// `POST /api/ocr` — run OCR over a scanned document.
    ///
    /// # Errors
    ///
    /// Returns an error if validation fails, the request fails, or the
    /// service rejects it.
    pub async fn ocr(&self, file: &InputFile, language: &str) -> ClientResult<OcrResponse> {
        validate::ensure_pdf_upload(file)?;
        let form = pdf_form(file).text("language", language.to_owned());
        self.post_form("/api/ocr", form).await
    }

    /// `POST /api/ocr/extract` — extract recognised text without producing
    /// a searchable document.
    ///
    /// # Errors
    ///
    /// Returns an error if validation fails, the request fails, or the
    /// service rejects it.
    pub async fn ocr_extract(&self, file: &InputFile) -> ClientResult<OcrResponse> {
        validate::ensure_pdf_upload(file)?;
        self.post_form("/api/ocr/extract", pdf_form(file)).await
    }

    // ---- user ----------------------------------------------------------

    /// `GET /api/user/profile`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the session is invalid.
    pub async fn profile(&self) -> ClientResult<UserProfile> {
        self.get("/api/user/profile").await
    }

    /// `PUT /api/user/profile`. Either field may be omitted to leave it
    /// unchanged. The session snapshot is refreshed on success.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the service rejects it.
    pub async fn update_profile(
        &self,
        name: Option<&str>,
        email: Option<&str>,
    ) -> ClientResult<ProfileUpdateResponse> {
        let mut body = serde_json::Map::new();
        if let Some(name) = name {
            body.insert("name".into(), json!(name));
        }
        if let Some(email) = email {
            body.insert("email".into(), json!(email));
        }
        let response: ProfileUpdateResponse = self
            .run(
                self.request(Method::PUT, "/api/user/profile")?
                    .json(&serde_json::Value::Object(body)),
            )
            .await?;
        self.session.set_user(response.user.clone().into())?;
        Ok(response)
    }

    /// `PUT /api/user/password`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the current password is
    /// rejected.
    pub async fn change_password(
        &self,
        current_password: &str,
        new_password: &str,
    ) -> ClientResult<Acknowledgement> {
        let body = json!({
            "currentPassword": current_password,
            "newPassword": new_password,
        });
        self.run(self.request(Method::PUT, "/api/user/password")?.json(&body))
            .await
    }

    /// `GET /api/user/balance`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the session is invalid.
    pub async fn balance(&self) -> ClientResult<UserBalance> {
        self.get("/api/user/balance").await
    }

    /// `POST /api/user/deposit`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the service rejects it.
    pub async fn create_deposit(
        &self,
        amount: f64,
        currency: &str,
    ) -> ClientResult<DepositResponse> {
        let body = json!({ "amount": amount, "currency": currency });
        self.post_json("/api/user/deposit", &body).await
    }

    /// `POST /api/user/deposit/verify`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the transaction is unknown.
    pub async fn verify_deposit(&self, transaction_id: &str) -> ClientResult<DepositVerification> {
        let body = json!({ "transactionId": transaction_id });
        self.post_json("/api/user/deposit/verify", &body).await
    }

    // ---- api keys ------------------------------------------------------

    /// `GET /api/keys`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the session is invalid.
    pub async fn list_api_keys(&self) -> ClientResult<ApiKeyList> {
        self.get("/api/keys").await
    }

    /// `POST /api/keys`. The full key material is shown once by the server;
    /// it is persisted to the session store so later requests carry it.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the session file cannot be
    /// updated.
    pub async fn create_api_key(&self, name: &str) -> ClientResult<ApiKeyCreated> {
        let created: ApiKeyCreated = self.post_json("/api/keys", &json!({ "name": name })).await?;
        self.session.set_api_key(created.key.clone())?;
        Ok(created)
    }

    /// `DELETE /api/keys/{id}`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the key is unknown.
    pub async fn revoke_api_key(&self, id: &str) -> ClientResult<Acknowledgement> {
        let path = format!("/api/keys/{id}");
        self.run(self.request(Method::DELETE, &path)?).await
    }

    // ---- pricing and usage ---------------------------------------------

    /// `GET /api/pricing`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn pricing(&self) -> ClientResult<PricingInfo> {
        self.get("/api/pricing").await
    }

    /// `GET /api/pricing/operation/{operation}`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the operation is unknown.
    pub async fn operation_price(&self, operation: &str) -> ClientResult<OperationPrice> {
        let path = format!("/api/pricing/operation/{operation}");
        self.get(&path).await
    }

    /// `POST /api/pricing/calculator`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn calculate_price(
        &self,
        operations: &[PriceQuery],
    ) -> ClientResult<PriceCalculatorResponse> {
        let body = json!({ "operations": operations });
        self.post_json("/api/pricing/calculator", &body).await
    }

    /// `GET /api/track-usage`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the session is invalid.
    pub async fn usage_statistics(&self) -> ClientResult<UsageStatistics> {
        self.get("/api/track-usage").await
    }

    /// `POST /api/track-usage`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn track_usage(&self, usage: &TrackUsageRequest) -> ClientResult<Acknowledgement> {
        self.post_json("/api/track-usage", usage).await
    }

    // ---- system --------------------------------------------------------

    /// `GET /health`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn health(&self) -> ClientResult<HealthCheck> {
        self.get("/health").await
    }

    // ---- file resolution -----------------------------------------------

    /// Build the download URL for a stored file:
    /// `GET /api/file?folder=<folder>&filename=<filename>`.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL cannot absorb the path.
    pub fn file_url(&self, folder: &str, filename: &str) -> ClientResult<Url> {
        let mut url = self.join_url("/api/file")?;
        url.query_pairs_mut()
            .append_pair("folder", folder)
            .append_pair("filename", filename);
        Ok(url)
    }

    /// Resolve one split result to a direct download link. The folder comes
    /// from the composite `fileUrl`; the filename is taken from the
    /// explicit field, not the URL remainder.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::UnexpectedResponse`] when the composite URL
    /// does not carry the expected markers.
    pub fn resolve_split_result(&self, result: &SplitResult) -> ClientResult<DownloadLink> {
        let location = parse_composite_file_url(&result.file_url)
            .ok_or(ClientError::UnexpectedResponse)?;
        let url = self.file_url(&location.folder, &result.filename)?;
        Ok(DownloadLink {
            filename: result.filename.clone(),
            download_url: url.to_string(),
            file_size: result.file_size,
            page_range: (!result.page_range.is_empty()).then(|| result.page_range.clone()),
        })
    }

    /// Resolve a synchronous operation response to a direct download link.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::UnexpectedResponse`] when the composite URL
    /// does not carry the expected markers.
    pub fn resolve_operation(
        &self,
        response: &FileOperationResponse,
    ) -> ClientResult<DownloadLink> {
        let location = parse_composite_file_url(&response.file_url)
            .ok_or(ClientError::UnexpectedResponse)?;
        let url = self.file_url(&location.folder, &response.filename)?;
        Ok(DownloadLink {
            filename: response.filename.clone(),
            download_url: url.to_string(),
            file_size: response.file_size,
            page_range: None,
        })
    }

    /// Fetch the raw bytes behind a resolved download link.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is malformed, the request fails, or the
    /// service rejects it.
    pub async fn download(&self, url: &str) -> ClientResult<Vec<u8>> {
        let url = Url::parse(url).map_err(|err| ClientError::InvalidUrl {
            detail: err.to_string(),
        })?;
        let response = self.dispatch(self.http.get(url)).await?;
        Ok(response.bytes().await?.to_vec())
    }

    // ---- plumbing ------------------------------------------------------

    fn join_url(&self, path: &str) -> ClientResult<Url> {
        self.base_url
            .join(path)
            .map_err(|err| ClientError::InvalidUrl {
                detail: err.to_string(),
            })
    }

    fn request(&self, method: Method, path: &str) -> ClientResult<RequestBuilder> {
        Ok(self.http.request(method, self.join_url(path)?))
    }

    fn authorize(&self, mut builder: RequestBuilder) -> RequestBuilder {
        if let Some(token) = self.session.auth_token() {
            builder = builder.bearer_auth(token);
        }
        if let Some(key) = self.session.api_key() {
            builder = builder.header(HEADER_API_KEY, key);
        }
        builder
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        self.run(self.request(Method::GET, path)?).await
    }

    async fn post_json<B: serde::Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        self.run(self.request(Method::POST, path)?.json(body)).await
    }

    async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        self.run(self.request(Method::POST, path)?).await
    }

    async fn post_form<T: DeserializeOwned>(&self, path: &str, form: Form) -> ClientResult<T> {
        self.run(self.request(Method::POST, path)?.multipart(form))
            .await
    }

    async fn run<T: DeserializeOwned>(&self, builder: RequestBuilder) -> ClientResult<T> {
        let response = self.dispatch(builder).await?;
        Ok(response.json().await?)
    }

    /// Send an authorized request and apply the shared status handling:
    /// `401` invalidates the session globally before surfacing, every other
    /// non-success status is classified into [`ClientError::Api`].
    async fn dispatch(&self, builder: RequestBuilder) -> ClientResult<Response> {
        let response = self.authorize(builder).send().await?;
        let status = response.status();
        if is_unauthorized(status) {
            self.session.invalidate();
            return Err(ClientError::Unauthorized);
        }
        if !status.is_success() {
            return Err(classify(response).await);
        }
        Ok(response)
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("ApiClient")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl StatusProbe for ApiClient {
    async fn check(&self, job_id: &str) -> anyhow::Result<PollReport> {
        let status = self.split_status(job_id).await?;
        let report = match status.status {
            Some(JobStatus::Completed) => {
                let links = status
                    .results
                    .iter()
                    .map(|result| self.resolve_split_result(result))
                    .collect::<ClientResult<Vec<_>>>()?;
                PollReport::Completed(links)
            }
            Some(JobStatus::Failed) => PollReport::Failed(SPLIT_FAILED_MESSAGE.to_owned()),
            Some(JobStatus::Pending | JobStatus::Processing | JobStatus::Working) | None => {
                PollReport::Working {
                    progress: Some(status.progress),
                    completed: Some(status.completed),
                    total: Some(status.total),
                }
            }
        };
        Ok(report)
    }
}

fn file_part(file: &InputFile) -> Part {
    Part::bytes(file.bytes.clone()).file_name(file.name.clone())
}

fn pdf_form(file: &InputFile) -> Form {
    Form::new().part("file", file_part(file))
}
