//! 스캔 엔진 설정
//!
//! [`ScanEngineConfig`]는 core의 [`HarborscanConfig`](harborscan_core::config::HarborscanConfig)
//! 에서 스캔 실행에 필요한 값을 추려 타입이 있는 형태로 변환합니다.
//!
//! # 사용 예시
//!
//! ```
//! use harborscan_engine::ScanEngineConfig;
//!
//! // 기본값으로 생성
//! let config = ScanEngineConfig::default();
//! config.validate().unwrap();
//!
//! // 빌더로 생성
//! use harborscan_engine::ScanEngineConfigBuilder;
//!
//! let config = ScanEngineConfigBuilder::new()
//!     .project_name("storefront")
//!     .max_manifests(20)
//!     .build()
//!     .unwrap();
//! ```

use serde::{Deserialize, Serialize};

use harborscan_core::types::ScanType;

use crate::error::EngineError;

/// 스캔 엔진 설정
///
/// core의 `HarborscanConfig`에서 파생되며, 스캔 실행에 쓰이는 값만 포함합니다.
///
/// # 필드
///
/// - **client_id / project_name / branch / commit**: 스캔 식별 정보
/// - **scan_type**: 수행할 스캔 종류
/// - **source_dir**: 매니페스트 탐색 루트 디렉토리
/// - **output_dir**: 해시 매니페스트와 리포트 아티팩트 출력 디렉토리
/// - **max_manifests**: 업로드할 매니페스트 최대 개수
/// - **poll_interval_secs**: 스캔 상태 폴링 간격 (초)
/// - **hash_files / export_report**: 선택 기능 토글
/// - **exclude_files / exclude_dirs**: 탐색 제외 글롭 패턴
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanEngineConfig {
    /// 서비스 클라이언트 식별자
    pub client_id: String,
    /// 프로젝트 이름
    pub project_name: String,
    /// 브랜치 이름
    pub branch: String,
    /// 커밋 해시
    pub commit: String,
    /// 수행할 스캔 종류
    pub scan_type: ScanType,
    /// 매니페스트 탐색 루트 디렉토리
    pub source_dir: String,
    /// 아티팩트 출력 디렉토리
    ///
    /// Note: 탐색 시 이 디렉토리는 항상 제외됩니다.
    pub output_dir: String,
    /// 업로드할 매니페스트 최대 개수
    pub max_manifests: usize,
    /// 스캔 상태 폴링 간격 (초)
    pub poll_interval_secs: u64,
    /// 아카이브 파일 해시 매니페스트 생성 여부
    pub hash_files: bool,
    /// 스캔 결과 리포트 아티팩트 기록 여부
    pub export_report: bool,
    /// 탐색 제외 파일 글롭 패턴
    pub exclude_files: Vec<String>,
    /// 탐색 제외 디렉토리 글롭 패턴
    pub exclude_dirs: Vec<String>,
}

impl Default for ScanEngineConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            project_name: String::new(),
            branch: String::new(),
            commit: String::new(),
            scan_type: ScanType::Sca,
            source_dir: ".".to_owned(),
            output_dir: "harborscan".to_owned(),
            max_manifests: 50,
            poll_interval_secs: 10,
            hash_files: false,
            export_report: false,
            exclude_files: Vec::new(),
            exclude_dirs: Vec::new(),
        }
    }
}

/// 설정 상한값 상수
const MAX_MANIFESTS_LIMIT: usize = 500;
const MAX_POLL_INTERVAL_SECS: u64 = 3600; // 1 hour

impl ScanEngineConfig {
    /// core의 `HarborscanConfig`에서 엔진 설정을 생성합니다.
    ///
    /// 인식할 수 없는 `scan_type` 문자열은 기본값(`sca`)으로 대체됩니다.
    pub fn from_core(core: &harborscan_core::config::HarborscanConfig) -> Self {
        let scan_type = ScanType::from_str_loose(&core.scan.scan_type).unwrap_or_default();

        Self {
            client_id: core.server.client_id.clone(),
            project_name: core.project.name.clone(),
            branch: core.project.branch.clone(),
            commit: core.project.commit.clone(),
            scan_type,
            source_dir: core.scan.source_dir.clone(),
            output_dir: core.scan.output_dir.clone(),
            max_manifests: core.scan.max_manifests,
            poll_interval_secs: core.scan.poll_interval_secs,
            hash_files: core.scan.hash_files,
            export_report: core.scan.export_report,
            exclude_files: core.scan.exclude_files.clone(),
            exclude_dirs: core.scan.exclude_dirs.clone(),
        }
    }

    /// 폴링 간격을 [`std::time::Duration`]으로 반환합니다.
    pub fn poll_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.poll_interval_secs)
    }

    /// 설정 값의 유효성을 검증합니다.
    ///
    /// 식별 정보(`client_id`, `project_name`)의 존재 여부는 여기서 검사하지
    /// 않습니다. 엔진 빌드 시점에 확인됩니다.
    ///
    /// # 검증 규칙
    ///
    /// - `max_manifests`: 1-500
    /// - `poll_interval_secs`: 1-3600
    /// - `source_dir` / `output_dir`: 비어있지 않고 ".." 미포함
    /// - `exclude_files` / `exclude_dirs`: 유효한 글롭 패턴
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.max_manifests == 0 || self.max_manifests > MAX_MANIFESTS_LIMIT {
            return Err(EngineError::Config {
                field: "max_manifests".to_owned(),
                reason: format!("must be 1-{MAX_MANIFESTS_LIMIT}"),
            });
        }

        if self.poll_interval_secs == 0 || self.poll_interval_secs > MAX_POLL_INTERVAL_SECS {
            return Err(EngineError::Config {
                field: "poll_interval_secs".to_owned(),
                reason: format!("must be 1-{MAX_POLL_INTERVAL_SECS}"),
            });
        }

        validate_dir_field("source_dir", &self.source_dir)?;
        validate_dir_field("output_dir", &self.output_dir)?;

        for pattern in self.exclude_files.iter().chain(self.exclude_dirs.iter()) {
            if let Err(e) = glob::Pattern::new(pattern) {
                return Err(EngineError::Config {
                    field: "exclude patterns".to_owned(),
                    reason: format!("invalid glob '{pattern}': {e}"),
                });
            }
        }

        Ok(())
    }
}

/// 디렉토리 설정 필드 공통 검증
fn validate_dir_field(field: &str, value: &str) -> Result<(), EngineError> {
    if value.is_empty() {
        return Err(EngineError::Config {
            field: field.to_owned(),
            reason: "must not be empty".to_owned(),
        });
    }

    // Path traversal 체크: Path::components()로 정확하게 ParentDir 컴포넌트 검출
    if std::path::Path::new(value)
        .components()
        .any(|c| c == std::path::Component::ParentDir)
    {
        return Err(EngineError::Config {
            field: field.to_owned(),
            reason: format!("path '{value}' contains path traversal pattern '..'"),
        });
    }

    // 경로 길이 제한
    const MAX_PATH_LEN: usize = 4096;
    if value.len() > MAX_PATH_LEN {
        return Err(EngineError::Config {
            field: field.to_owned(),
            reason: format!("path exceeds maximum length {MAX_PATH_LEN}"),
        });
    }

    Ok(())
}

/// [`ScanEngineConfig`] 빌더
///
/// 유연한 설정 구성 및 빌드 시 유효성 검증을 제공합니다.
#[derive(Default)]
pub struct ScanEngineConfigBuilder {
    config: ScanEngineConfig,
}

impl ScanEngineConfigBuilder {
    /// 기본값을 가진 새 빌더를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 클라이언트 식별자를 설정합니다.
    pub fn client_id(mut self, id: impl Into<String>) -> Self {
        self.config.client_id = id.into();
        self
    }

    /// 프로젝트 이름을 설정합니다.
    pub fn project_name(mut self, name: impl Into<String>) -> Self {
        self.config.project_name = name.into();
        self
    }

    /// 브랜치 이름을 설정합니다.
    pub fn branch(mut self, branch: impl Into<String>) -> Self {
        self.config.branch = branch.into();
        self
    }

    /// 커밋 해시를 설정합니다.
    pub fn commit(mut self, commit: impl Into<String>) -> Self {
        self.config.commit = commit.into();
        self
    }

    /// 스캔 종류를 설정합니다.
    pub fn scan_type(mut self, scan_type: ScanType) -> Self {
        self.config.scan_type = scan_type;
        self
    }

    /// 탐색 루트 디렉토리를 설정합니다.
    pub fn source_dir(mut self, dir: impl Into<String>) -> Self {
        self.config.source_dir = dir.into();
        self
    }

    /// 아티팩트 출력 디렉토리를 설정합니다.
    pub fn output_dir(mut self, dir: impl Into<String>) -> Self {
        self.config.output_dir = dir.into();
        self
    }

    /// 업로드 최대 매니페스트 수를 설정합니다.
    pub fn max_manifests(mut self, max: usize) -> Self {
        self.config.max_manifests = max;
        self
    }

    /// 폴링 간격(초)을 설정합니다.
    pub fn poll_interval_secs(mut self, secs: u64) -> Self {
        self.config.poll_interval_secs = secs;
        self
    }

    /// 해시 매니페스트 생성 여부를 설정합니다.
    pub fn hash_files(mut self, enabled: bool) -> Self {
        self.config.hash_files = enabled;
        self
    }

    /// 리포트 아티팩트 기록 여부를 설정합니다.
    pub fn export_report(mut self, enabled: bool) -> Self {
        self.config.export_report = enabled;
        self
    }

    /// 탐색 제외 파일 패턴을 설정합니다.
    pub fn exclude_files(mut self, patterns: Vec<String>) -> Self {
        self.config.exclude_files = patterns;
        self
    }

    /// 탐색 제외 디렉토리 패턴을 설정합니다.
    pub fn exclude_dirs(mut self, patterns: Vec<String>) -> Self {
        self.config.exclude_dirs = patterns;
        self
    }

    /// 설정을 검증하고 빌드합니다.
    ///
    /// # Errors
    ///
    /// 유효성 검증 실패 시 `EngineError::Config` 반환
    pub fn build(self) -> Result<ScanEngineConfig, EngineError> {
        self.config.validate()?;
        Ok(self.config)
    }
}
