//! Scan server API abstraction for testability.
//!
//! The [`ScanApi`] trait abstracts the scan server's HTTP API, allowing
//! production code to use [`HttpScanApi`](http::HttpScanApi) while tests use
//! `MockScanApi`.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────┐
//! │ ScanEngine │
//! └─────┬──────┘
//!       │
//!       ▼
//!  ┌─────────┐
//!  │ ScanApi │ (trait)
//!  └─────────┘
//!     │    │
//!     ▼    ▼
//!  ┌────┐ ┌──────┐
//!  │Http│ │ Mock │
//!  └──┬─┘ └──────┘
//!     │
//!     ▼
//!  Scan server
//! ```
//!
//! # Examples
//!
//! ```ignore
//! use harborscan_engine::HttpScanApi;
//!
//! let api = HttpScanApi::new("https://api.harborscan.io/api/", "key-123")?;
//! let formats = api.get_supported_scan_file_formats("c-1").await?;
//! # Ok::<(), harborscan_engine::EngineError>(())
//! ```

pub mod dto;
pub mod http;

use std::future::Future;

use harborscan_core::error::ApiError;
use harborscan_core::types::{ScanContext, ScanStatus};

use dto::{
    ApplicationStatusResponse, CreateScanRequest, CreateScanResponse, ProjectSettingsResponse,
    ScanFileFormat, ScanStatusResponse, UploadFile, UploadManifestsResponse,
};

/// Trait abstracting scan server API operations.
///
/// All server calls go through this trait, enabling testability via mocking.
/// The trait is `Send + Sync + 'static`, allowing safe sharing across async
/// contexts.
///
/// # Implementations
///
/// - [`HttpScanApi`](http::HttpScanApi): Production implementation using `reqwest`
/// - `MockScanApi`: Test implementation with configurable responses (available in tests only)
///
/// # Error Handling
///
/// - **Connection errors**: Wrapped as `ApiError::Transport`
/// - **Non-2xx responses**: Wrapped as `ApiError::Status` with the server
///   message extracted from the JSON body when present
/// - **Malformed bodies**: Wrapped as `ApiError::Decode`
pub trait ScanApi: Send + Sync + 'static {
    /// Fetches service-wide and client-specific advisory banners.
    ///
    /// Both banners are optional; an empty response means no advisories.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Transport` or `ApiError::Status` if the call fails.
    fn get_application_status(
        &self,
        client_id: &str,
    ) -> impl Future<Output = Result<ApplicationStatusResponse, ApiError>> + Send;

    /// Registers a new scan and returns its identifiers and polling URLs.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Status` if the server rejects the scan request.
    /// A 2xx response may still carry rejection reasons in `errors`;
    /// the caller is responsible for checking them.
    fn create_scan(
        &self,
        client_id: &str,
        request: &CreateScanRequest,
    ) -> impl Future<Output = Result<CreateScanResponse, ApiError>> + Send;

    /// Fetches manifest patterns and hashable file formats per package manager.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Decode` if the format list cannot be parsed.
    fn get_supported_scan_file_formats(
        &self,
        client_id: &str,
    ) -> impl Future<Output = Result<Vec<ScanFileFormat>, ApiError>> + Send;

    /// Fetches per-project settings, currently the lockfile preference.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Status` if the project is unknown.
    fn get_project_settings(
        &self,
        client_id: &str,
        project_hash: &str,
    ) -> impl Future<Output = Result<ProjectSettingsResponse, ApiError>> + Send;

    /// Uploads one group of manifest files as a multipart request.
    ///
    /// Every file becomes one part named `manifests`, with the part file
    /// name carrying the root-relative path.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Transport` or `ApiError::Status` on failure.
    /// A failure applies to the whole group.
    fn upload_manifest_files(
        &self,
        ctx: &ScanContext,
        files: &[UploadFile],
    ) -> impl Future<Output = Result<UploadManifestsResponse, ApiError>> + Send;

    /// Requests analysis start for a created scan.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Status` if the scan cannot be started.
    fn start_scan(&self, ctx: &ScanContext)
    -> impl Future<Output = Result<(), ApiError>> + Send;

    /// Fetches the current scan status from the status URL.
    ///
    /// The URL comes from [`CreateScanResponse::scan_status_url`] and is
    /// used as-is, without re-deriving it from identifiers.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidUrl` if the URL is malformed.
    fn get_scan_status(
        &self,
        status_url: &str,
    ) -> impl Future<Output = Result<ScanStatusResponse, ApiError>> + Send;

    /// Pushes a terminal status and message for a scan.
    ///
    /// Used to mark scans `Incomplete` or `Error` when the client cannot
    /// finish its part of the work.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Status` if the server rejects the update.
    fn update_scan_status(
        &self,
        ctx: &ScanContext,
        status: ScanStatus,
        message: &str,
    ) -> impl Future<Output = Result<(), ApiError>> + Send;
}

/// 테스트용 Mock 스캔 API
///
/// 설정 가능한 응답을 반환하여 스캔 서버 없이도 테스트할 수 있습니다.
/// 상태 조회는 `statuses`를 순서대로 소진하며 마지막 항목을 반복합니다.
#[cfg(test)]
#[derive(Default)]
pub struct MockScanApi {
    /// getApplicationStatus 호출 시 반환할 배너
    pub application_status: ApplicationStatusResponse,
    /// createScan 호출 시 반환할 응답
    pub create_response: CreateScanResponse,
    /// getSupportedScanFileFormats 호출 시 반환할 형식 목록
    pub formats: Vec<ScanFileFormat>,
    /// getProjectSettings 호출 시 반환할 설정
    pub project_settings: ProjectSettingsResponse,
    /// uploadManifestFiles 호출 시 반환할 응답
    pub upload_response: UploadManifestsResponse,
    /// getScanStatus 호출 순서대로 반환할 응답 목록
    pub statuses: Vec<ScanStatusResponse>,
    /// getApplicationStatus 실패 시뮬레이션 여부
    pub fail_application_status: bool,
    /// createScan 실패 시뮬레이션 여부
    pub fail_create: bool,
    /// startScan 실패 시뮬레이션 여부
    pub fail_start: bool,
    /// updateScanStatus 실패 시뮬레이션 여부
    pub fail_update: bool,
    /// 모든 업로드 실패 시뮬레이션 여부
    pub fail_all_uploads: bool,
    /// 앞에서부터 n번의 업로드 호출만 실패 시뮬레이션
    pub fail_first_uploads: usize,

    status_cursor: std::sync::atomic::AtomicUsize,
    status_calls: std::sync::atomic::AtomicUsize,
    upload_calls: std::sync::atomic::AtomicUsize,
    start_calls: std::sync::atomic::AtomicUsize,
    update_calls: std::sync::atomic::AtomicUsize,
    updates: std::sync::Mutex<Vec<(ScanStatus, String)>>,
    uploads: std::sync::Mutex<Vec<Vec<String>>>,
}

#[cfg(test)]
impl MockScanApi {
    /// 빈 응답을 가진 mock API를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 배너 응답을 설정합니다.
    pub fn with_application_status(mut self, status: ApplicationStatusResponse) -> Self {
        self.application_status = status;
        self
    }

    /// createScan 응답을 설정합니다.
    pub fn with_create_response(mut self, response: CreateScanResponse) -> Self {
        self.create_response = response;
        self
    }

    /// 파일 형식 목록을 설정합니다.
    pub fn with_formats(mut self, formats: Vec<ScanFileFormat>) -> Self {
        self.formats = formats;
        self
    }

    /// 프로젝트 설정 응답을 설정합니다.
    pub fn with_project_settings(mut self, settings: ProjectSettingsResponse) -> Self {
        self.project_settings = settings;
        self
    }

    /// 업로드 응답을 설정합니다.
    pub fn with_upload_response(mut self, response: UploadManifestsResponse) -> Self {
        self.upload_response = response;
        self
    }

    /// 상태 조회 응답 목록을 설정합니다.
    pub fn with_statuses(mut self, statuses: Vec<ScanStatusResponse>) -> Self {
        self.statuses = statuses;
        self
    }

    /// getApplicationStatus가 실패하도록 설정합니다.
    pub fn with_failing_application_status(mut self) -> Self {
        self.fail_application_status = true;
        self
    }

    /// createScan이 실패하도록 설정합니다.
    pub fn with_failing_create(mut self) -> Self {
        self.fail_create = true;
        self
    }

    /// startScan이 실패하도록 설정합니다.
    pub fn with_failing_start(mut self) -> Self {
        self.fail_start = true;
        self
    }

    /// 모든 업로드가 실패하도록 설정합니다.
    pub fn with_failing_uploads(mut self) -> Self {
        self.fail_all_uploads = true;
        self
    }

    /// 앞에서부터 n번의 업로드만 실패하도록 설정합니다.
    pub fn with_failing_first_uploads(mut self, count: usize) -> Self {
        self.fail_first_uploads = count;
        self
    }

    /// getScanStatus 호출 횟수를 반환합니다.
    pub fn status_call_count(&self) -> usize {
        self.status_calls.load(std::sync::atomic::Ordering::Relaxed)
    }

    /// uploadManifestFiles 호출 횟수를 반환합니다.
    pub fn upload_call_count(&self) -> usize {
        self.upload_calls.load(std::sync::atomic::Ordering::Relaxed)
    }

    /// startScan 호출 횟수를 반환합니다.
    pub fn start_call_count(&self) -> usize {
        self.start_calls.load(std::sync::atomic::Ordering::Relaxed)
    }

    /// updateScanStatus 호출 횟수를 반환합니다.
    pub fn update_call_count(&self) -> usize {
        self.update_calls.load(std::sync::atomic::Ordering::Relaxed)
    }

    /// updateScanStatus로 전송된 (상태, 메시지) 기록을 반환합니다.
    pub fn recorded_updates(&self) -> Vec<(ScanStatus, String)> {
        self.updates.lock().unwrap().clone()
    }

    /// 업로드 호출별 파트 파일명 기록을 반환합니다.
    pub fn recorded_uploads(&self) -> Vec<Vec<String>> {
        self.uploads.lock().unwrap().clone()
    }
}

#[cfg(test)]
impl ScanApi for MockScanApi {
    async fn get_application_status(
        &self,
        _client_id: &str,
    ) -> Result<ApplicationStatusResponse, ApiError> {
        if self.fail_application_status {
            return Err(ApiError::Transport {
                reason: "mock application status failure".to_owned(),
            });
        }
        Ok(self.application_status.clone())
    }

    async fn create_scan(
        &self,
        _client_id: &str,
        _request: &CreateScanRequest,
    ) -> Result<CreateScanResponse, ApiError> {
        if self.fail_create {
            return Err(ApiError::Status {
                status: 400,
                message: "mock create failure".to_owned(),
            });
        }
        Ok(self.create_response.clone())
    }

    async fn get_supported_scan_file_formats(
        &self,
        _client_id: &str,
    ) -> Result<Vec<ScanFileFormat>, ApiError> {
        Ok(self.formats.clone())
    }

    async fn get_project_settings(
        &self,
        _client_id: &str,
        _project_hash: &str,
    ) -> Result<ProjectSettingsResponse, ApiError> {
        Ok(self.project_settings.clone())
    }

    async fn upload_manifest_files(
        &self,
        _ctx: &ScanContext,
        files: &[UploadFile],
    ) -> Result<UploadManifestsResponse, ApiError> {
        let call_index = self
            .upload_calls
            .fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        self.uploads
            .lock()
            .unwrap()
            .push(files.iter().map(UploadFile::upload_name).collect());
        if self.fail_all_uploads || call_index < self.fail_first_uploads {
            return Err(ApiError::Status {
                status: 500,
                message: "mock upload failure".to_owned(),
            });
        }
        Ok(self.upload_response.clone())
    }

    async fn start_scan(&self, _ctx: &ScanContext) -> Result<(), ApiError> {
        self.start_calls
            .fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        if self.fail_start {
            return Err(ApiError::Status {
                status: 409,
                message: "mock start failure".to_owned(),
            });
        }
        Ok(())
    }

    async fn get_scan_status(&self, _status_url: &str) -> Result<ScanStatusResponse, ApiError> {
        self.status_calls
            .fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        if self.statuses.is_empty() {
            return Err(ApiError::Status {
                status: 404,
                message: "no scan status configured".to_owned(),
            });
        }
        let cursor = self
            .status_cursor
            .fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        let index = cursor.min(self.statuses.len() - 1);
        Ok(self.statuses[index].clone())
    }

    async fn update_scan_status(
        &self,
        _ctx: &ScanContext,
        status: ScanStatus,
        message: &str,
    ) -> Result<(), ApiError> {
        self.update_calls
            .fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        if self.fail_update {
            return Err(ApiError::Status {
                status: 500,
                message: "mock update failure".to_owned(),
            });
        }
        self.updates
            .lock()
            .unwrap()
            .push((status, message.to_owned()));
        Ok(())
    }
}
