//! 설정 관리 — harborscan.toml 파싱 및 런타임 설정
//!
//! [`HarborscanConfig`]는 CLI와 스캔 엔진의 설정을 담는 최상위 구조체입니다.
//!
//! # 설정 로딩 우선순위
//! 1. CLI 인자 (최고 우선)
//! 2. 환경변수 (`HARBORSCAN_SERVER_API_KEY=...` 형식)
//! 3. 설정 파일 (`harborscan.toml`)
//! 4. 기본값 (`Default` 구현)
//!
//! # 사용 예시
//! ```no_run
//! # async fn example() -> Result<(), harborscan_core::error::HarborscanError> {
//! use harborscan_core::config::HarborscanConfig;
//!
//! // 파일에서 로드 + 환경변수 오버라이드
//! let config = HarborscanConfig::load("harborscan.toml").await?;
//!
//! // TOML 문자열에서 직접 파싱
//! let config = HarborscanConfig::parse("[general]\nlog_level = \"debug\"")?;
//! # Ok(())
//! # }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ConfigError, HarborscanError};
use crate::types::ScanType;

/// Harborscan 통합 설정
///
/// `harborscan.toml` 파일의 최상위 구조를 나타냅니다.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HarborscanConfig {
    /// 일반 설정
    #[serde(default)]
    pub general: GeneralConfig,
    /// 서버 연결 설정
    #[serde(default)]
    pub server: ServerConfig,
    /// 프로젝트 식별 설정
    #[serde(default)]
    pub project: ProjectConfig,
    /// 스캔 동작 설정
    #[serde(default)]
    pub scan: ScanConfig,
}

impl HarborscanConfig {
    /// TOML 파일에서 설정을 로드하고 환경변수 오버라이드를 적용합니다.
    ///
    /// 설정 로딩 순서:
    /// 1. TOML 파일 파싱
    /// 2. 환경변수 오버라이드 적용
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, HarborscanError> {
        let mut config = Self::from_file(path).await?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// TOML 파일에서 설정을 로드합니다 (환경변수 오버라이드, 검증 없음).
    ///
    /// 검증은 [`load`](Self::load)에서 오버라이드 적용 후에 수행됩니다.
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, HarborscanError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                HarborscanError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                HarborscanError::Io(e)
            }
        })?;
        Self::parse(&content)
    }

    /// TOML 문자열에서 설정을 파싱합니다.
    pub fn parse(toml_str: &str) -> Result<Self, HarborscanError> {
        toml::from_str(toml_str).map_err(|e| {
            HarborscanError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })
    }

    /// 환경변수로 설정값을 오버라이드합니다.
    ///
    /// 환경변수 네이밍 규칙: `HARBORSCAN_{SECTION}_{FIELD}`
    /// 예: `HARBORSCAN_SERVER_API_KEY=...`
    pub fn apply_env_overrides(&mut self) {
        // General
        override_string(&mut self.general.log_level, "HARBORSCAN_GENERAL_LOG_LEVEL");
        override_string(
            &mut self.general.log_format,
            "HARBORSCAN_GENERAL_LOG_FORMAT",
        );

        // Server
        override_string(&mut self.server.base_url, "HARBORSCAN_SERVER_BASE_URL");
        override_string(&mut self.server.api_key, "HARBORSCAN_SERVER_API_KEY");
        override_string(&mut self.server.client_id, "HARBORSCAN_SERVER_CLIENT_ID");

        // Project
        override_string(&mut self.project.name, "HARBORSCAN_PROJECT_NAME");
        override_string(&mut self.project.branch, "HARBORSCAN_PROJECT_BRANCH");
        override_string(&mut self.project.commit, "HARBORSCAN_PROJECT_COMMIT");

        // Scan
        override_string(&mut self.scan.scan_type, "HARBORSCAN_SCAN_SCAN_TYPE");
        override_string(&mut self.scan.source_dir, "HARBORSCAN_SCAN_SOURCE_DIR");
        override_string(&mut self.scan.output_dir, "HARBORSCAN_SCAN_OUTPUT_DIR");
        override_usize(&mut self.scan.max_manifests, "HARBORSCAN_SCAN_MAX_MANIFESTS");
        override_u64(
            &mut self.scan.poll_interval_secs,
            "HARBORSCAN_SCAN_POLL_INTERVAL_SECS",
        );
        override_bool(&mut self.scan.hash_files, "HARBORSCAN_SCAN_HASH_FILES");
        override_bool(&mut self.scan.export_report, "HARBORSCAN_SCAN_EXPORT_REPORT");
        override_csv(&mut self.scan.exclude_files, "HARBORSCAN_SCAN_EXCLUDE_FILES");
        override_csv(&mut self.scan.exclude_dirs, "HARBORSCAN_SCAN_EXCLUDE_DIRS");
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), HarborscanError> {
        // log_level 검증
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.general.log_level.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_level".to_owned(),
                reason: format!("must be one of: {}", valid_levels.join(", ")),
            }
            .into());
        }

        // log_format 검증
        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.general.log_format.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_format".to_owned(),
                reason: format!("must be one of: {}", valid_formats.join(", ")),
            }
            .into());
        }

        // base_url 검증
        if self.server.base_url.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "server.base_url".to_owned(),
                reason: "base url must not be empty".to_owned(),
            }
            .into());
        }

        // scan_type 검증
        if ScanType::from_str_loose(&self.scan.scan_type).is_none() {
            return Err(ConfigError::InvalidValue {
                field: "scan.scan_type".to_owned(),
                reason: "must be one of: sca, csa, sbom, dast, sast".to_owned(),
            }
            .into());
        }

        // source_dir 검증
        if self.scan.source_dir.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "scan.source_dir".to_owned(),
                reason: "source directory must not be empty".to_owned(),
            }
            .into());
        }

        // max_manifests 검증
        if self.scan.max_manifests == 0 {
            return Err(ConfigError::InvalidValue {
                field: "scan.max_manifests".to_owned(),
                reason: "must be at least 1".to_owned(),
            }
            .into());
        }

        // poll_interval_secs 검증
        if self.scan.poll_interval_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "scan.poll_interval_secs".to_owned(),
                reason: "must be at least 1".to_owned(),
            }
            .into());
        }

        Ok(())
    }
}

// Default는 derive 매크로로 자동 생성 (각 필드가 Default를 구현하므로)

/// 일반 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// 로그 레벨 (trace, debug, info, warn, error)
    pub log_level: String,
    /// 로그 형식 (json, pretty)
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_owned(),
            log_format: "pretty".to_owned(),
        }
    }
}

/// 서버 연결 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// API 기본 URL
    pub base_url: String,
    /// API 키 (비공개 값, 환경변수 주입 권장)
    pub api_key: String,
    /// 조직 식별자
    pub client_id: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.harborscan.io/api/".to_owned(),
            api_key: String::new(),
            client_id: String::new(),
        }
    }
}

/// 프로젝트 식별 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    /// 프로젝트 이름
    pub name: String,
    /// 브랜치 이름 (없으면 서버 기본 브랜치)
    pub branch: String,
    /// 커밋 해시
    pub commit: String,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            branch: String::new(),
            commit: String::new(),
        }
    }
}

/// 스캔 동작 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// 스캔 종류 (sca, csa, sbom, dast, sast)
    pub scan_type: String,
    /// 스캔 대상 소스 루트
    pub source_dir: String,
    /// 아티팩트 출력 디렉토리 (탐색에서 항상 제외)
    pub output_dir: String,
    /// 업로드 매니페스트 상한
    pub max_manifests: usize,
    /// 상태 폴링 간격 (초)
    pub poll_interval_secs: u64,
    /// 해시 매니페스트 생성 여부
    pub hash_files: bool,
    /// 최종 리포트 JSON 아티팩트 기록 여부
    pub export_report: bool,
    /// 탐색 제외 파일 glob 목록
    pub exclude_files: Vec<String>,
    /// 탐색 제외 디렉토리 glob 목록
    pub exclude_dirs: Vec<String>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            scan_type: "sca".to_owned(),
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

// --- 환경변수 오버라이드 헬퍼 ---

fn override_string(target: &mut String, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val;
    }
}

fn override_bool(target: &mut bool, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<bool>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse bool from env var, ignoring"
            ),
        }
    }
}

fn override_usize(target: &mut usize, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<usize>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse usize from env var, ignoring"
            ),
        }
    }
}

fn override_u64(target: &mut u64, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<u64>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse u64 from env var, ignoring"
            ),
        }
    }
}

fn override_csv(target: &mut Vec<String>, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val.split(',').map(|s| s.trim().to_owned()).collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_sane_values() {
        let config = HarborscanConfig::default();
        assert_eq!(config.general.log_level, "info");
        assert_eq!(config.general.log_format, "pretty");
        assert_eq!(config.server.base_url, "https://api.harborscan.io/api/");
        assert!(config.server.api_key.is_empty());
        assert_eq!(config.scan.scan_type, "sca");
        assert_eq!(config.scan.source_dir, ".");
        assert_eq!(config.scan.output_dir, "harborscan");
        assert_eq!(config.scan.max_manifests, 50);
        assert_eq!(config.scan.poll_interval_secs, 10);
        assert!(!config.scan.hash_files);
        assert!(!config.scan.export_report);
    }

    #[test]
    fn default_config_passes_validation() {
        let config = HarborscanConfig::default();
        config.validate().unwrap();
    }

    #[test]
    fn from_str_empty_toml_uses_defaults() {
        let config = HarborscanConfig::parse("").unwrap();
        assert_eq!(config.general.log_level, "info");
        assert_eq!(config.scan.max_manifests, 50);
    }

    #[test]
    fn from_str_partial_toml_merges_with_defaults() {
        let toml = r#"
[general]
log_level = "debug"

[scan]
scan_type = "sbom"
hash_files = true
"#;
        let config = HarborscanConfig::parse(toml).unwrap();
        assert_eq!(config.general.log_level, "debug");
        // log_format은 기본값 유지
        assert_eq!(config.general.log_format, "pretty");
        assert_eq!(config.scan.scan_type, "sbom");
        assert!(config.scan.hash_files);
        assert_eq!(config.scan.max_manifests, 50);
    }

    #[test]
    fn from_str_full_toml() {
        let toml = r#"
[general]
log_level = "warn"
log_format = "json"

[server]
base_url = "https://scan.internal/api/"
api_key = "key-123"
client_id = "org-42"

[project]
name = "billing-service"
branch = "main"
commit = "abc123"

[scan]
scan_type = "sca"
source_dir = "/srv/checkout"
output_dir = "harborscan"
max_manifests = 25
poll_interval_secs = 5
hash_files = true
export_report = true
exclude_files = ["*.min.json"]
exclude_dirs = ["node_modules", "target"]
"#;
        let config = HarborscanConfig::parse(toml).unwrap();
        assert_eq!(config.general.log_level, "warn");
        assert_eq!(config.server.base_url, "https://scan.internal/api/");
        assert_eq!(config.server.client_id, "org-42");
        assert_eq!(config.project.name, "billing-service");
        assert_eq!(config.scan.max_manifests, 25);
        assert_eq!(config.scan.exclude_dirs.len(), 2);
        assert!(config.scan.export_report);
    }

    #[test]
    fn from_str_invalid_toml_returns_error() {
        let result = HarborscanConfig::parse("invalid = [[[toml");
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(
            err,
            HarborscanError::Config(ConfigError::ParseFailed { .. })
        ));
    }

    #[test]
    fn validate_rejects_invalid_log_level() {
        let mut config = HarborscanConfig::default();
        config.general.log_level = "verbose".to_owned();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("log_level"));
    }

    #[test]
    fn validate_rejects_invalid_log_format() {
        let mut config = HarborscanConfig::default();
        config.general.log_format = "xml".to_owned();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("log_format"));
    }

    #[test]
    fn validate_rejects_unknown_scan_type() {
        let mut config = HarborscanConfig::default();
        config.scan.scan_type = "quantum".to_owned();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("scan_type"));
    }

    #[test]
    fn validate_rejects_empty_base_url() {
        let mut config = HarborscanConfig::default();
        config.server.base_url = String::new();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("base_url"));
    }

    #[test]
    fn validate_rejects_zero_max_manifests() {
        let mut config = HarborscanConfig::default();
        config.scan.max_manifests = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("max_manifests"));
    }

    #[test]
    fn validate_rejects_zero_poll_interval() {
        let mut config = HarborscanConfig::default();
        config.scan.poll_interval_secs = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("poll_interval_secs"));
    }

    #[test]
    fn validate_rejects_empty_source_dir() {
        let mut config = HarborscanConfig::default();
        config.scan.source_dir = String::new();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("source_dir"));
    }

    #[test]
    #[serial_test::serial]
    fn env_override_string() {
        let mut val = "original".to_owned();
        // SAFETY: 테스트는 serial로 직렬화되어 환경변수 조작이 안전합니다.
        unsafe { std::env::set_var("TEST_HARBORSCAN_STR", "overridden") };
        override_string(&mut val, "TEST_HARBORSCAN_STR");
        assert_eq!(val, "overridden");
        unsafe { std::env::remove_var("TEST_HARBORSCAN_STR") };
    }

    #[test]
    #[serial_test::serial]
    fn env_override_bool_valid() {
        let mut val = false;
        // SAFETY: 테스트는 serial로 직렬화되어 환경변수 조작이 안전합니다.
        unsafe { std::env::set_var("TEST_HARBORSCAN_BOOL", "true") };
        override_bool(&mut val, "TEST_HARBORSCAN_BOOL");
        assert!(val);
        unsafe { std::env::remove_var("TEST_HARBORSCAN_BOOL") };
    }

    #[test]
    #[serial_test::serial]
    fn env_override_bool_invalid_keeps_original() {
        let mut val = false;
        // SAFETY: 테스트는 serial로 직렬화되어 환경변수 조작이 안전합니다.
        unsafe { std::env::set_var("TEST_HARBORSCAN_BOOL_BAD", "not-a-bool") };
        override_bool(&mut val, "TEST_HARBORSCAN_BOOL_BAD");
        assert!(!val); // 원래 값 유지
        unsafe { std::env::remove_var("TEST_HARBORSCAN_BOOL_BAD") };
    }

    #[test]
    #[serial_test::serial]
    fn env_override_csv() {
        let mut val = vec!["a".to_owned()];
        // SAFETY: 테스트는 serial로 직렬화되어 환경변수 조작이 안전합니다.
        unsafe { std::env::set_var("TEST_HARBORSCAN_CSV", "x, y, z") };
        override_csv(&mut val, "TEST_HARBORSCAN_CSV");
        assert_eq!(val, vec!["x", "y", "z"]);
        unsafe { std::env::remove_var("TEST_HARBORSCAN_CSV") };
    }

    #[test]
    #[serial_test::serial]
    fn env_override_missing_var_keeps_original() {
        let mut val = "original".to_owned();
        override_string(&mut val, "TEST_HARBORSCAN_NONEXISTENT_12345");
        assert_eq!(val, "original");
    }

    #[test]
    fn config_serialize_roundtrip() {
        let config = HarborscanConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed = HarborscanConfig::parse(&toml_str).unwrap();
        assert_eq!(config.general.log_level, parsed.general.log_level);
        assert_eq!(config.server.base_url, parsed.server.base_url);
        assert_eq!(config.scan.max_manifests, parsed.scan.max_manifests);
    }

    #[tokio::test]
    async fn from_file_not_found() {
        let result = HarborscanConfig::from_file("/nonexistent/path/harborscan.toml").await;
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(
            err,
            HarborscanError::Config(ConfigError::FileNotFound { .. })
        ));
    }
}
