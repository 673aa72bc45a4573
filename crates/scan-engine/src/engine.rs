//! 스캔 엔진 오케스트레이터 -- 스캔 생성부터 결과 리포트까지 전체 흐름 관리
//!
//! [`ScanEngine`]은 [`ScanApi`] 구현체를 통해 스캔 서버와 통신하며
//! 매니페스트 탐색, 업로드, 스캔 시작, 완료 대기를 순서대로 수행합니다.
//!
//! # 내부 아키텍처
//!
//! ```text
//! run_scan()
//!     |
//!     +-- lifecycle::surface_banners()          서버 공지 조회 (실패해도 진행)
//!     +-- api.create_scan()                  -> ScanContext
//!     +-- api.get_supported_scan_file_formats()
//!     +-- api.get_project_settings()            lockfile 우선 여부
//!     +-- discovery::discover_manifests()       매니페스트 탐색
//!     +-- hasher::generate_hash_manifests()     (hash_files 설정 시)
//!     +-- upload::upload_manifests()            패키지 관리자 그룹별 업로드
//!     +-- api.start_scan()
//!     +-- lifecycle::wait_for_scan_to_finish()  이중 확인 폴링
//!     +-- report::ScanReport                 -> ScanOutcome
//! ```
//!
//! 스캔 생성 이후 단계에서 실패하면 서버의 스캔 상태를 `Error`로 갱신한 뒤
//! 에러를 반환합니다. 이미 종료 상태가 보고된 스캔은 덮어쓰지 않습니다.

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use harborscan_core::types::{ScanContext, ScanStatus, ScanStatusSnapshot};

use crate::api::ScanApi;
use crate::api::dto::{CreateScanRequest, formats_to_rules};
use crate::config::ScanEngineConfig;
use crate::discovery::{FileMatcher, discover_manifests};
use crate::error::EngineError;
use crate::hasher::generate_hash_manifests;
use crate::lifecycle;
use crate::report::ScanReport;
use crate::upload::upload_manifests;

/// 스캔 한 건의 최종 결과
///
/// 스캔 식별 정보, 종료 시점의 상태 스냅샷, 렌더링 가능한 리포트를 담습니다.
/// `export_report` 설정 시 이 구조체가 JSON 아티팩트로 기록됩니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanOutcome {
    /// 스캔 식별 정보
    pub context: ScanContext,
    /// 종료 시점의 상태 스냅샷
    pub snapshot: ScanStatusSnapshot,
    /// 최종 리포트
    pub report: ScanReport,
}

/// 스캔 엔진
///
/// 스캔 한 건의 전체 수명주기를 실행합니다. [`ScanApi`] 구현체를
/// 주입받아 동작하므로 테스트에서는 모의 구현으로 대체할 수 있습니다.
///
/// # 사용 예시
/// ```ignore
/// use harborscan_engine::{HttpScanApi, ScanEngineBuilder, ScanEngineConfig};
///
/// let config = ScanEngineConfig::from_core(&core_config);
/// let api = HttpScanApi::new("https://api.harborscan.io/api/", api_key)?;
/// let engine = ScanEngineBuilder::new(api).config(config).build()?;
///
/// let outcome = engine.run_scan().await?;
/// println!("{}", outcome.report.to_text());
/// ```
pub struct ScanEngine<A: ScanApi> {
    /// 스캔 서버 API 클라이언트 (공유)
    api: Arc<A>,
    /// 엔진 설정
    config: ScanEngineConfig,
    /// 스캔 대기 중단 토큰
    cancel: Option<CancellationToken>,
}

impl<A: ScanApi> ScanEngine<A> {
    /// 엔진 설정을 반환합니다.
    pub fn config(&self) -> &ScanEngineConfig {
        &self.config
    }

    /// API 클라이언트에 대한 Arc 참조를 반환합니다.
    pub fn api_arc(&self) -> Arc<A> {
        Arc::clone(&self.api)
    }

    /// 스캔 한 건을 끝까지 실행합니다.
    ///
    /// 서버 공지 조회, 스캔 생성, 매니페스트 탐색/업로드, 스캔 시작,
    /// 완료 대기, 리포트 생성 순으로 진행하며 최종 결과를 반환합니다.
    ///
    /// # Errors
    ///
    /// - `EngineError::Setup`: 서버가 스캔 생성을 거부했거나 업로드할
    ///   매니페스트가 없는 경우
    /// - `EngineError::AllUploadsFailed`: 모든 업로드 그룹이 실패한 경우
    /// - `EngineError::Cancelled`: 취소 토큰으로 대기가 중단된 경우
    /// - `EngineError::Api`: 그 외 API 요청 실패
    pub async fn run_scan(&self) -> Result<ScanOutcome, EngineError> {
        let run_id = uuid::Uuid::new_v4().to_string();
        info!(
            run_id = %run_id,
            project = %self.config.project_name,
            scan_type = %self.config.scan_type,
            "starting scan run"
        );

        lifecycle::surface_banners(self.api.as_ref(), &self.config.client_id).await;

        let ctx = self.create_scan_context().await?;
        info!(
            analysis_id = %ctx.analysis_id,
            scan_url = %ctx.scan_url,
            "scan created"
        );

        match self.run_after_create(&ctx).await {
            Ok(outcome) => Ok(outcome),
            Err(err) => {
                if should_report_failure(&err) {
                    report_failure(self.api.as_ref(), &ctx, &err).await;
                }
                Err(err)
            }
        }
    }

    /// 스캔을 생성하고 [`ScanContext`]를 구성합니다.
    ///
    /// 서버 응답에 에러 메시지가 포함되어 있으면 `Setup` 에러를 반환합니다.
    /// 리포트 URL이 없으면 스캔 URL로 대체합니다.
    async fn create_scan_context(&self) -> Result<ScanContext, EngineError> {
        let request = CreateScanRequest {
            project_name: self.config.project_name.clone(),
            branch: self.config.branch.clone(),
            commit_hash: self.config.commit.clone(),
            scan_type: self.config.scan_type,
        };

        let response = self
            .api
            .create_scan(&self.config.client_id, &request)
            .await?;

        if !response.errors.is_empty() {
            return Err(EngineError::Setup {
                reason: response.errors.join("; "),
            });
        }

        let scan_url = response.scan_url;
        let scan_report_url = response.scan_report_url.unwrap_or_else(|| scan_url.clone());

        Ok(ScanContext {
            client_id: self.config.client_id.clone(),
            project_hash: response.project_hash,
            branch_hash: response.branch_hash,
            analysis_id: response.analysis_id,
            scan_type: self.config.scan_type,
            scan_url,
            scan_status_url: response.scan_status_url,
            scan_report_url,
        })
    }

    /// 스캔 생성 이후의 전체 단계를 수행합니다.
    async fn run_after_create(&self, ctx: &ScanContext) -> Result<ScanOutcome, EngineError> {
        let formats = self
            .api
            .get_supported_scan_file_formats(&ctx.client_id)
            .await?;
        let (manifest_rules, hashable_rules) = formats_to_rules(&formats);
        debug!(
            manifest_rules = manifest_rules.len(),
            hashable_rules = hashable_rules.len(),
            "scan file formats loaded"
        );

        let settings = self
            .api
            .get_project_settings(&ctx.client_id, &ctx.project_hash)
            .await?;
        let use_lock_file = settings.use_lock_file.unwrap_or(false);
        debug!(use_lock_file, "project settings loaded");

        // 출력 디렉토리는 항상 탐색에서 제외
        let mut exclude_dirs = self.config.exclude_dirs.clone();
        exclude_dirs.push(self.config.output_dir.clone());
        let matcher = FileMatcher::build(
            Path::new(&self.config.source_dir),
            &self.config.exclude_files,
            &exclude_dirs,
        )?;
        info!(
            root = %matcher.root().display(),
            files = matcher.file_count(),
            "source tree indexed"
        );

        let mut manifests = discover_manifests(&matcher, &manifest_rules, use_lock_file)?;

        if self.config.hash_files {
            let hashed = generate_hash_manifests(&matcher, &hashable_rules).await?;
            manifests.extend(hashed);
        }

        if manifests.is_empty() {
            let reason = "No manifest files found to upload".to_owned();
            warn!("no manifest files found, marking scan incomplete");
            if let Err(e) = self
                .api
                .update_scan_status(ctx, ScanStatus::Incomplete, &reason)
                .await
            {
                warn!(error = %e, "failed to mark scan incomplete");
            }
            return Err(EngineError::Setup { reason });
        }

        let groups = upload_manifests(
            self.api.as_ref(),
            ctx,
            manifests,
            self.config.max_manifests,
            matcher.root(),
        )
        .await?;
        info!(groups = groups.len(), "manifest upload complete");

        self.api.start_scan(ctx).await?;
        info!(scan_url = %ctx.scan_url, "scan started");

        let snapshot = lifecycle::wait_for_scan_to_finish(
            self.api.as_ref(),
            &ctx.scan_status_url,
            self.config.poll_interval(),
            self.cancel.as_ref(),
        )
        .await?;

        if !snapshot.errors.is_empty() {
            error!(count = snapshot.errors.len(), "scan reported errors");
            for message in &snapshot.errors {
                error!(error = %message, "scan error detail");
            }
        }

        if matches!(snapshot.status, ScanStatus::Incomplete | ScanStatus::Error) {
            error!(status = %snapshot.status, "scan ended unsuccessfully");
        }

        let report = ScanReport::from_scan(ctx, &snapshot);
        let outcome = ScanOutcome {
            context: ctx.clone(),
            snapshot,
            report,
        };

        if self.config.export_report {
            self.export_outcome(&outcome).await?;
        }

        info!(status = %outcome.snapshot.status, "scan run finished");
        Ok(outcome)
    }

    /// 스캔 결과를 출력 디렉토리에 JSON 아티팩트로 기록합니다.
    async fn export_outcome(&self, outcome: &ScanOutcome) -> Result<(), EngineError> {
        let dir = Path::new(&self.config.output_dir);
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|e| EngineError::Artifact {
                path: self.config.output_dir.clone(),
                reason: e.to_string(),
            })?;

        let path = dir.join(format!("{}_scan_result.json", outcome.context.analysis_id));
        let json = serde_json::to_string_pretty(outcome).map_err(|e| EngineError::Artifact {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        tokio::fs::write(&path, json)
            .await
            .map_err(|e| EngineError::Artifact {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;

        info!(path = %path.display(), "scan result exported");
        Ok(())
    }
}

/// 서버에 `Error` 상태를 보고해야 하는 실패인지 판별합니다.
///
/// 이미 서버 상태를 갱신한 실패(`Setup`, `AllUploadsFailed`)와
/// 로컬 대기만 중단하는 `Cancelled`는 제외합니다.
fn should_report_failure(err: &EngineError) -> bool {
    !matches!(
        err,
        EngineError::Cancelled | EngineError::Setup { .. } | EngineError::AllUploadsFailed { .. }
    )
}

/// 스캔 생성 이후 단계의 실패를 서버에 전파합니다 (최선 노력).
async fn report_failure<A: ScanApi>(api: &A, ctx: &ScanContext, err: &EngineError) {
    error!(analysis_id = %ctx.analysis_id, error = %err, "scan run failed");

    let message = format!("Scan failed: {err}");
    if let Err(update_err) =
        lifecycle::update_scan_status(api, ctx, ScanStatus::Error, &message).await
    {
        warn!(error = %update_err, "failed to report scan failure to server");
    }
}

/// 스캔 엔진 빌더
///
/// API 클라이언트와 설정으로 엔진을 구성합니다.
pub struct ScanEngineBuilder<A: ScanApi> {
    api: Arc<A>,
    config: ScanEngineConfig,
    cancel: Option<CancellationToken>,
}

impl<A: ScanApi> ScanEngineBuilder<A> {
    /// API 클라이언트로 새 빌더를 생성합니다.
    pub fn new(api: A) -> Self {
        Self {
            api: Arc::new(api),
            config: ScanEngineConfig::default(),
            cancel: None,
        }
    }

    /// 엔진 설정을 지정합니다.
    pub fn config(mut self, config: ScanEngineConfig) -> Self {
        self.config = config;
        self
    }

    /// 스캔 대기 중단 토큰을 지정합니다.
    ///
    /// 토큰이 취소되면 진행 중인 완료 대기가 `Cancelled` 에러로 끝납니다.
    pub fn cancel_token(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// 엔진을 빌드합니다.
    ///
    /// # Errors
    ///
    /// 설정 값이 유효하지 않으면 `EngineError::Config`,
    /// `client_id` 또는 `project_name`이 비어있으면
    /// `EngineError::MissingParameter`를 반환합니다.
    pub fn build(self) -> Result<ScanEngine<A>, EngineError> {
        self.config.validate()?;

        if self.config.client_id.is_empty() {
            return Err(EngineError::MissingParameter {
                field: "client_id".to_owned(),
            });
        }
        if self.config.project_name.is_empty() {
            return Err(EngineError::MissingParameter {
                field: "project_name".to_owned(),
            });
        }

        Ok(ScanEngine {
            api: self.api,
            config: self.config,
            cancel: self.cancel,
        })
    }
}
