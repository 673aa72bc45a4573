//! 에러 타입 — 도메인별 에러 정의

/// Harborscan 최상위 에러 타입
#[derive(Debug, thiserror::Error)]
pub enum HarborscanError {
    /// 설정 관련 에러
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// 서버 API 호출 에러
    #[error("api error: {0}")]
    Api(#[from] ApiError),

    /// 스캔 수행 에러
    #[error("scan error: {0}")]
    Scan(#[from] ScanError),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// 설정 관련 에러
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 설정 파일을 찾을 수 없음
    #[error("config file not found: {path}")]
    FileNotFound { path: String },

    /// 설정 파싱 실패
    #[error("failed to parse config: {reason}")]
    ParseFailed { reason: String },

    /// 유효하지 않은 설정 값
    #[error("invalid config value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },

    /// 필수 파라미터 누락
    #[error("missing required parameter '{field}'")]
    MissingParameter { field: String },
}

/// 서버 API 호출 에러
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// 전송 계층 실패 (연결, 타임아웃 등)
    #[error("transport failed: {reason}")]
    Transport { reason: String },

    /// 서버가 2xx 외 상태 코드를 반환
    #[error("server returned {status}: {message}")]
    Status { status: u16, message: String },

    /// 응답 본문 디코딩 실패
    #[error("failed to decode response: {reason}")]
    Decode { reason: String },

    /// 유효하지 않은 요청 URL
    #[error("invalid url: {url}")]
    InvalidUrl { url: String },
}

/// 스캔 수행 에러
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    /// 스캔 준비 단계 거부
    #[error("scan setup rejected: {reason}")]
    Setup { reason: String },

    /// 매니페스트 탐색 실패
    #[error("manifest discovery failed: {0}")]
    Discovery(String),

    /// 파일 해시 계산 실패
    #[error("file hashing failed: {0}")]
    Hashing(String),

    /// 모든 매니페스트 그룹 업로드 실패
    #[error("all {groups} manifest upload groups failed")]
    AllUploadsFailed { groups: usize },

    /// 로컬 아티팩트 기록 실패
    #[error("failed to write artifact {path}: {reason}")]
    Artifact { path: String, reason: String },

    /// 외부 요청으로 스캔 대기 중단
    #[error("scan wait cancelled")]
    Cancelled,
}
