//! 스캔 엔진 에러 타입
//!
//! [`EngineError`]는 스캔 엔진 모듈 내에서 발생할 수 있는 모든 에러를 나타냅니다.
//! `From<EngineError> for HarborscanError` 구현을 통해 `?` 연산자로
//! 상위 에러 타입으로 자연스럽게 전파됩니다.
//!
//! # 에러 카테고리
//!
//! - **API 통신**: `Api`
//! - **매니페스트 탐색**: `Pattern`, `Discovery`
//! - **해시 생성**: `Hashing`
//! - **업로드**: `AllUploadsFailed`
//! - **스캔 준비**: `Setup`, `MissingParameter`, `Config`
//! - **대기 중단**: `Cancelled`
//! - **파일 I/O**: `Artifact`, `Io`

use harborscan_core::error::{ApiError, ConfigError, HarborscanError, ScanError};

/// 스캔 엔진 도메인 에러
///
/// 엔진 내부의 모든 에러 시나리오를 포함합니다.
///
/// # 에러 변환
///
/// `From<EngineError> for HarborscanError` 구현으로
/// `harborscan-cli`에서 사용하는 최상위 에러 타입으로 자동 변환됩니다.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// 스캔 서버 API 요청 실패
    #[error("api request failed: {0}")]
    Api(#[from] ApiError),

    /// 파일 패턴 컴파일 실패
    #[error("invalid file pattern '{pattern}': {reason}")]
    Pattern {
        /// 문제가 된 글롭 패턴
        pattern: String,
        /// 컴파일 실패 사유
        reason: String,
    },

    /// 매니페스트 탐색 실패
    #[error("manifest discovery failed: {path}: {reason}")]
    Discovery {
        /// 탐색 대상 경로
        path: String,
        /// 실패 사유
        reason: String,
    },

    /// 파일 해시 계산 실패
    #[error("file hashing failed: {path}: {reason}")]
    Hashing {
        /// 해시 대상 파일 경로
        path: String,
        /// 실패 사유
        reason: String,
    },

    /// 로컬 아티팩트 기록 실패
    #[error("artifact write failed: {path}: {reason}")]
    Artifact {
        /// 아티팩트 경로
        path: String,
        /// 실패 사유
        reason: String,
    },

    /// 모든 매니페스트 그룹 업로드 실패
    #[error("all {groups} manifest upload groups failed")]
    AllUploadsFailed {
        /// 시도한 업로드 그룹 수
        groups: usize,
    },

    /// 스캔 준비 단계 거부
    #[error("scan setup rejected: {reason}")]
    Setup {
        /// 거부 사유
        reason: String,
    },

    /// 필수 파라미터 누락
    #[error("missing required parameter '{field}'")]
    MissingParameter {
        /// 누락된 필드명
        field: String,
    },

    /// 설정 에러
    #[error("config error: {field}: {reason}")]
    Config {
        /// 설정 필드명
        field: String,
        /// 에러 사유
        reason: String,
    },

    /// 외부 요청으로 스캔 대기 중단
    #[error("scan cancelled")]
    Cancelled,

    /// 파일 I/O 에러
    #[error("io error: {path}: {source}")]
    Io {
        /// 관련 파일 경로
        path: String,
        /// 원본 I/O 에러
        source: std::io::Error,
    },
}

impl From<EngineError> for HarborscanError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::Api(api_err) => HarborscanError::Api(api_err),
            EngineError::Pattern { pattern, reason } => HarborscanError::Scan(
                ScanError::Discovery(format!("invalid file pattern '{pattern}': {reason}")),
            ),
            EngineError::Discovery { path, reason } => {
                HarborscanError::Scan(ScanError::Discovery(format!("{path}: {reason}")))
            }
            EngineError::Hashing { path, reason } => {
                HarborscanError::Scan(ScanError::Hashing(format!("{path}: {reason}")))
            }
            EngineError::Artifact { path, reason } => {
                HarborscanError::Scan(ScanError::Artifact { path, reason })
            }
            EngineError::AllUploadsFailed { groups } => {
                HarborscanError::Scan(ScanError::AllUploadsFailed { groups })
            }
            EngineError::Setup { reason } => HarborscanError::Scan(ScanError::Setup { reason }),
            EngineError::MissingParameter { field } => {
                HarborscanError::Config(ConfigError::MissingParameter { field })
            }
            EngineError::Config { field, reason } => {
                HarborscanError::Config(ConfigError::InvalidValue { field, reason })
            }
            EngineError::Cancelled => HarborscanError::Scan(ScanError::Cancelled),
            EngineError::Io { path: _, source } => HarborscanError::Io(source),
        }
    }
}
