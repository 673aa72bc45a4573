//! 도메인 타입 — 스캔 수명주기 전반에서 사용되는 공통 타입
//!
//! 모든 크레이트가 공유하는 데이터 구조를 정의합니다.
//! 엔진과 CLI는 이 타입들을 사용하여 스캔 상태와 결과를 교환합니다.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// 스캔 종류
///
/// `Sca`, `Csa`, `Sbom`은 매니페스트 업로드로 서버가 결과를 생성하는
/// "generated" 계열이고, `Dast`/`Sast`는 별도 분석 계열입니다.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanType {
    /// 오픈소스 의존성 분석
    #[default]
    Sca,
    /// 컨테이너 이미지 분석
    Csa,
    /// SBOM 문서 분석
    Sbom,
    /// 동적 애플리케이션 분석
    Dast,
    /// 정적 코드 분석
    Sast,
}

impl ScanType {
    /// 문자열에서 스캔 종류를 파싱합니다.
    ///
    /// 대소문자를 구분하지 않습니다.
    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "sca" => Some(Self::Sca),
            "csa" => Some(Self::Csa),
            "sbom" => Some(Self::Sbom),
            "dast" => Some(Self::Dast),
            "sast" => Some(Self::Sast),
            _ => None,
        }
    }

    /// 매니페스트 업로드 기반 계열인지 여부
    pub fn is_generated(&self) -> bool {
        matches!(self, Self::Sca | Self::Csa | Self::Sbom)
    }

    /// 리포트 출력용 대문자 약어
    pub fn acronym(&self) -> &'static str {
        match self {
            Self::Sca => "SCA",
            Self::Csa => "CSA",
            Self::Sbom => "SBOM",
            Self::Dast => "DAST",
            Self::Sast => "SAST",
        }
    }
}

impl fmt::Display for ScanType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sca => write!(f, "sca"),
            Self::Csa => write!(f, "csa"),
            Self::Sbom => write!(f, "sbom"),
            Self::Dast => write!(f, "dast"),
            Self::Sast => write!(f, "sast"),
        }
    }
}

/// 스캔 상태
///
/// 서버가 보고하는 스캔의 진행 단계입니다.
/// `Finished`, `FailedWithIssues`, `Incomplete`, `Error`가 종료 상태이며
/// 그중 `Finished`만 성공으로 간주합니다.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScanStatus {
    /// 대기열에 등록됨
    #[default]
    Queued,
    /// 분석 진행 중
    Running,
    /// 정상 완료
    Finished,
    /// 정책 위반과 함께 완료
    FailedWithIssues,
    /// 분석이 끝까지 수행되지 못함
    Incomplete,
    /// 서버 측 오류로 종료
    Error,
}

impl ScanStatus {
    /// 문자열에서 스캔 상태를 파싱합니다.
    ///
    /// 대소문자를 구분하지 않습니다. 알 수 없는 값은 `None`을 반환하며
    /// 호출 측에서 폴링을 계속할지 결정합니다.
    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "queued" => Some(Self::Queued),
            "running" => Some(Self::Running),
            "finished" => Some(Self::Finished),
            "failedwithissues" | "failed_with_issues" => Some(Self::FailedWithIssues),
            "incomplete" => Some(Self::Incomplete),
            "error" => Some(Self::Error),
            _ => None,
        }
    }

    /// 종료 상태인지 여부
    pub fn is_complete(&self) -> bool {
        matches!(
            self,
            Self::Finished | Self::FailedWithIssues | Self::Incomplete | Self::Error
        )
    }

    /// 성공 종료인지 여부 (`Finished`만 해당)
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Finished)
    }
}

impl fmt::Display for ScanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Queued => write!(f, "Queued"),
            Self::Running => write!(f, "Running"),
            Self::Finished => write!(f, "Finished"),
            Self::FailedWithIssues => write!(f, "FailedWithIssues"),
            Self::Incomplete => write!(f, "Incomplete"),
            Self::Error => write!(f, "Error"),
        }
    }
}

/// 서버 공지 메시지 심각도
///
/// 스캔 생성 전 서버가 내려주는 배너 메시지의 수준을 나타냅니다.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MessageSeverity {
    /// 정보성 공지
    #[default]
    Info,
    /// 주의 공지
    Warn,
    /// 오류 공지
    Error,
}

impl MessageSeverity {
    /// 문자열에서 심각도를 파싱합니다.
    ///
    /// 대소문자를 구분하지 않으며 알 수 없는 값은 `None`입니다.
    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "info" | "informational" => Some(Self::Info),
            "warn" | "warning" => Some(Self::Warn),
            "error" => Some(Self::Error),
            _ => None,
        }
    }
}

impl fmt::Display for MessageSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Warn => write!(f, "warn"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// 스캔 컨텍스트
///
/// 스캔 생성 응답에서 만들어지는 불변 식별 정보입니다.
/// 이후 모든 업로드/폴링/리포트 호출은 이 컨텍스트를 참조합니다.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanContext {
    /// 조직 식별자
    pub client_id: String,
    /// 프로젝트 해시
    pub project_hash: String,
    /// 브랜치 해시
    pub branch_hash: String,
    /// 이번 스캔의 분석 ID
    pub analysis_id: String,
    /// 스캔 종류
    pub scan_type: ScanType,
    /// 스캔 결과 웹 페이지 URL
    pub scan_url: String,
    /// 상태 폴링 URL
    pub scan_status_url: String,
    /// 최종 리포트 URL
    pub scan_report_url: String,
}

impl fmt::Display for ScanContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} scan {} (project {})",
            self.scan_type.acronym(),
            self.analysis_id,
            self.project_hash,
        )
    }
}

/// 업로드 대상 매니페스트 파일
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestFile {
    /// 이 파일이 속한 패키지 매니저
    pub package_manager: String,
    /// 파일 이름
    pub name: String,
    /// 절대 경로
    pub path: PathBuf,
}

impl fmt::Display for ManifestFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.name, self.package_manager)
    }
}

/// 단일 해시 결과
///
/// 해시 매니페스트 아티팩트에 기록되는 알고리즘별 다이제스트입니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileDigest {
    /// 해시 알고리즘 이름 (예: sha256)
    pub hash_algorithm: String,
    /// 인코딩된 다이제스트 값
    pub digest: String,
}

/// 단일 파일의 해시 묶음
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileHashes {
    /// 파일 이름
    pub filename: String,
    /// 소스 루트 기준 상대 경로
    pub path: String,
    /// 알고리즘별 다이제스트 목록
    pub digests: Vec<FileDigest>,
}

/// 패키지 매니저 단위 해시 매니페스트
///
/// 디스크에 `<패키지매니저>_harborscan_hashes.json`으로 기록되고
/// 일반 매니페스트와 함께 업로드됩니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HashesManifest {
    /// 패키지 매니저 이름
    pub package_manager: String,
    /// 파일별 해시 목록
    pub file_hashes: Vec<FileHashes>,
}

impl HashesManifest {
    /// 해시가 하나도 없는지 여부
    ///
    /// 빈 매니페스트는 디스크에 기록하지 않습니다.
    pub fn is_empty(&self) -> bool {
        self.file_hashes.is_empty()
    }

    /// 디스크 아티팩트 파일 이름
    pub fn artifact_name(&self) -> String {
        format!("{}_harborscan_hashes.json", self.package_manager.to_lowercase())
    }
}

/// 스캔 종류별 이슈 집계
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IssueCounts {
    /// 식별 불가 패키지 수
    pub unknown_packages: u64,
    /// 타이포스쿼팅 의심 패키지 수
    pub typosquats: u64,
    /// 대체 패키지 제안 수
    pub substitutions: u64,
    /// 웹 취약점 수 (DAST)
    pub web_vulnerabilities: u64,
    /// 코드 이슈 수 (SAST)
    pub code_issues: u64,
}

/// 상태 폴링 스냅샷
///
/// 상태 조회 응답 한 건을 정규화한 결과입니다.
/// `is_complete`/`is_success`는 `status`에서 파생됩니다.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanStatusSnapshot {
    /// 스캔 상태
    pub status: ScanStatus,
    /// 종료 상태 여부 (`status`에서 파생)
    pub is_complete: bool,
    /// 성공 종료 여부 (`status`에서 파생)
    pub is_success: bool,
    /// 정책 위반 수
    pub violations: u64,
    /// 취약점 수
    pub vulnerabilities: u64,
    /// 종류별 이슈 집계
    pub issues: IssueCounts,
    /// 서버가 보고한 오류 메시지 목록
    pub errors: Vec<String>,
}

impl fmt::Display for ScanStatusSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (violations={} vulnerabilities={})",
            self.status, self.violations, self.vulnerabilities,
        )
    }
}
