//! reqwest 기반 스캔 서버 클라이언트
//!
//! [`HttpScanApi`]는 [`ScanApi`] 트레이트의 프로덕션 구현입니다.
//! 모든 요청에 API 키 헤더를 붙이고, 2xx가 아닌 응답은 본문에서 서버
//! 메시지를 추출해 [`ApiError::Status`]로 정규화합니다.

use std::time::Duration;

use reqwest::multipart;
use serde::Deserialize;
use serde::de::DeserializeOwned;

use harborscan_core::error::ApiError;
use harborscan_core::types::{ScanContext, ScanStatus};

use crate::api::ScanApi;
use crate::api::dto::{
    ApplicationStatusResponse, CreateScanRequest, CreateScanResponse, ProjectSettingsResponse,
    ScanFileFormat, ScanStatusResponse, UpdateScanStatusRequest, UploadFile,
    UploadManifestsResponse,
};
use crate::error::EngineError;

/// 인증 헤더 이름
const API_KEY_HEADER: &str = "x-harborscan-apikey";
/// 요청 타임아웃 (초)
const REQUEST_TIMEOUT_SECS: u64 = 120;
/// 에러 본문을 메시지로 쓸 때의 최대 길이
const MAX_ERROR_BODY_LEN: usize = 200;

/// reqwest 기반 프로덕션 스캔 API 클라이언트
///
/// # Examples
///
/// ```ignore
/// use harborscan_engine::HttpScanApi;
///
/// let api = HttpScanApi::new("https://api.harborscan.io/api", "key-123")?;
/// # Ok::<(), harborscan_engine::EngineError>(())
/// ```
pub struct HttpScanApi {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl HttpScanApi {
    /// 서버 베이스 URL과 API 키로 클라이언트를 생성합니다.
    ///
    /// 베이스 URL 끝의 `/` 유무는 상관없습니다.
    ///
    /// # Errors
    ///
    /// API 키 또는 베이스 URL이 비어있으면 `EngineError::MissingParameter`,
    /// HTTP 클라이언트 초기화에 실패하면 `EngineError::Config`를 반환합니다.
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Result<Self, EngineError> {
        let base_url = normalize_base_url(base_url.into());
        let api_key = api_key.into();

        if base_url.is_empty() {
            return Err(EngineError::MissingParameter {
                field: "base_url".to_owned(),
            });
        }
        if api_key.is_empty() {
            return Err(EngineError::MissingParameter {
                field: "api_key".to_owned(),
            });
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| EngineError::Config {
                field: "http_client".to_owned(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            client,
            base_url,
            api_key,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, ApiError> {
        let response = self
            .client
            .get(url)
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await
            .map_err(transport_error)?;
        read_json(response).await
    }
}

impl ScanApi for HttpScanApi {
    async fn get_application_status(
        &self,
        client_id: &str,
    ) -> Result<ApplicationStatusResponse, ApiError> {
        let url = self.endpoint(&format!("clients/{client_id}/application-status"));
        self.get_json(&url).await
    }

    async fn create_scan(
        &self,
        client_id: &str,
        request: &CreateScanRequest,
    ) -> Result<CreateScanResponse, ApiError> {
        let url = self.endpoint(&format!("clients/{client_id}/scans"));
        let response = self
            .client
            .post(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(request)
            .send()
            .await
            .map_err(transport_error)?;
        read_json(response).await
    }

    async fn get_supported_scan_file_formats(
        &self,
        client_id: &str,
    ) -> Result<Vec<ScanFileFormat>, ApiError> {
        let url = self.endpoint(&format!("clients/{client_id}/scan-file-formats"));
        self.get_json(&url).await
    }

    async fn get_project_settings(
        &self,
        client_id: &str,
        project_hash: &str,
    ) -> Result<ProjectSettingsResponse, ApiError> {
        let url = self.endpoint(&format!("clients/{client_id}/projects/{project_hash}/settings"));
        self.get_json(&url).await
    }

    async fn upload_manifest_files(
        &self,
        ctx: &ScanContext,
        files: &[UploadFile],
    ) -> Result<UploadManifestsResponse, ApiError> {
        let url = self.endpoint(&format!(
            "clients/{}/projects/{}/branches/{}/scans/{}/manifests",
            ctx.client_id, ctx.project_hash, ctx.branch_hash, ctx.analysis_id
        ));

        let mut form = multipart::Form::new();
        for file in files {
            let bytes = tokio::fs::read(&file.path)
                .await
                .map_err(|e| ApiError::Transport {
                    reason: format!("failed to read {}: {e}", file.path.display()),
                })?;
            let part = multipart::Part::bytes(bytes).file_name(file.upload_name());
            form = form.part("manifests", part);
        }

        let response = self
            .client
            .post(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(transport_error)?;
        read_json(response).await
    }

    async fn start_scan(&self, ctx: &ScanContext) -> Result<(), ApiError> {
        let url = self.endpoint(&format!(
            "clients/{}/projects/{}/scans/{}/start",
            ctx.client_id, ctx.project_hash, ctx.analysis_id
        ));
        let response = self
            .client
            .put(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await
            .map_err(transport_error)?;
        check_status(response).await
    }

    async fn get_scan_status(&self, status_url: &str) -> Result<ScanStatusResponse, ApiError> {
        // 상태 URL은 createScan 응답이 준 것을 그대로 사용
        let url = reqwest::Url::parse(status_url).map_err(|_| ApiError::InvalidUrl {
            url: status_url.to_owned(),
        })?;
        let response = self
            .client
            .get(url)
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await
            .map_err(transport_error)?;
        read_json(response).await
    }

    async fn update_scan_status(
        &self,
        ctx: &ScanContext,
        status: ScanStatus,
        message: &str,
    ) -> Result<(), ApiError> {
        let url = self.endpoint(&format!(
            "clients/{}/projects/{}/branches/{}/scans/{}/{}",
            ctx.client_id,
            ctx.project_hash,
            ctx.branch_hash,
            ctx.scan_type,
            ctx.analysis_id
        ));
        let body = UpdateScanStatusRequest {
            status: status.to_string(),
            message: message.to_owned(),
        };
        let response = self
            .client
            .patch(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;
        check_status(response).await
    }
}

fn transport_error(err: reqwest::Error) -> ApiError {
    ApiError::Transport {
        reason: err.to_string(),
    }
}

/// 베이스 URL 끝에 `/` 하나를 보장합니다.
fn normalize_base_url(mut base_url: String) -> String {
    if !base_url.is_empty() && !base_url.ends_with('/') {
        base_url.push('/');
    }
    base_url
}

async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
    let status = response.status();
    let body = response.text().await.map_err(transport_error)?;

    if !status.is_success() {
        return Err(ApiError::Status {
            status: status.as_u16(),
            message: extract_error_message(&body),
        });
    }

    serde_json::from_str(&body).map_err(|e| ApiError::Decode {
        reason: e.to_string(),
    })
}

async fn check_status(response: reqwest::Response) -> Result<(), ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }
    let body = response.text().await.unwrap_or_default();
    Err(ApiError::Status {
        status: status.as_u16(),
        message: extract_error_message(&body),
    })
}

/// 에러 응답 본문에서 사람이 읽을 메시지를 뽑아냅니다.
///
/// JSON `{"message": ...}` 형태를 우선 시도하고, 아니면 본문 앞부분을
/// 그대로 사용합니다.
fn extract_error_message(body: &str) -> String {
    #[derive(Deserialize)]
    struct ErrorBody {
        message: String,
    }

    if let Ok(parsed) = serde_json::from_str::<ErrorBody>(body) {
        if !parsed.message.is_empty() {
            return parsed.message;
        }
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "no error detail provided".to_owned();
    }
    trimmed.chars().take(MAX_ERROR_BODY_LEN).collect()
}
