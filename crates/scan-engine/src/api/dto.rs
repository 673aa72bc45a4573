//! 스캔 서버 API 와이어 DTO
//!
//! 서버 응답/요청의 JSON 형태를 그대로 반영하는 타입들입니다. 필드명은
//! 서버 관례(camelCase)를 따르며, 도메인 타입([`crate::rules`],
//! [`ScanStatusSnapshot`])으로의 변환 함수를 함께 제공합니다.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::warn;

use harborscan_core::types::{IssueCounts, ScanStatus, ScanStatusSnapshot, ScanType};

use crate::rules::{
    DigestEncoding, HashAlgorithm, HashConfig, HashableRule, InputEncoding, ManifestPattern,
    ManifestRule,
};

/// 서비스 공지 배너 하나
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusBanner {
    /// 공지 본문
    pub message: String,
    /// 심각도 문자열 ("info" / "warn" / "error")
    pub severity: String,
    /// 클라이언트가 닫을 수 있는 공지인지 여부
    #[serde(default)]
    pub is_dismissible: bool,
    /// 안내 링크
    #[serde(default)]
    pub url: Option<String>,
    /// 안내 링크 표시 문구
    #[serde(default)]
    pub link_text: Option<String>,
}

/// `getApplicationStatus` 응답
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationStatusResponse {
    /// 서비스 전체 공지
    #[serde(default, rename = "statusMessage")]
    pub service_message: Option<StatusBanner>,
    /// 클라이언트 대상 공지
    #[serde(default)]
    pub client_message: Option<StatusBanner>,
}

/// `createScan` 요청 본문
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateScanRequest {
    /// 프로젝트 이름
    pub project_name: String,
    /// 브랜치 이름
    pub branch: String,
    /// 커밋 해시
    pub commit_hash: String,
    /// 스캔 종류
    pub scan_type: ScanType,
}

/// `createScan` 응답
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateScanResponse {
    /// 조직 식별 해시
    #[serde(default)]
    pub client_hash: String,
    /// 프로젝트 식별 해시
    pub project_hash: String,
    /// 브랜치 식별 해시
    pub branch_hash: String,
    /// 생성된 스캔(분석) 식별자
    pub analysis_id: String,
    /// 스캔 웹 페이지 URL
    pub scan_url: String,
    /// 스캔 상태 조회 URL
    pub scan_status_url: String,
    /// 스캔 리포트 URL (없으면 `scan_url` 사용)
    #[serde(default)]
    pub scan_report_url: Option<String>,
    /// 생성 거부 사유 목록
    #[serde(default)]
    pub errors: Vec<String>,
}

/// 매니페스트 패턴 항목
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestPatternSpec {
    /// 파일명 글롭 또는 확장자 축약형
    pub pattern: String,
    /// lockfile 여부
    #[serde(default)]
    pub is_lock_file: bool,
}

/// 해시 계산 방법 항목
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HashAlgorithmSpec {
    /// 해시 알고리즘 이름
    pub hash_algorithm: String,
    /// 입력 인코딩 이름
    pub buffer_encoding: String,
    /// 출력 인코딩 이름
    pub digest_encoding: String,
}

/// 해시 대상 파일 형식 항목
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HashableFileFormat {
    /// 적용할 해시 계산 방법 목록
    #[serde(default)]
    pub hash_algorithms: Vec<HashAlgorithmSpec>,
    /// 아카이브 파일 확장자
    #[serde(default)]
    pub archive_file_extensions: Vec<String>,
    /// 아카이브 내용물 파일 확장자
    #[serde(default)]
    pub archive_content_file_extensions: Vec<String>,
}

/// `getSupportedScanFileFormats` 응답의 패키지 매니저 항목
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanFileFormat {
    /// 패키지 매니저 이름
    pub package_manager: String,
    /// 매니페스트 패턴 목록
    #[serde(default, rename = "supportedManifests")]
    pub manifests: Vec<ManifestPatternSpec>,
    /// 해시 대상 파일 형식 목록
    #[serde(default)]
    pub hashable_files: Vec<HashableFileFormat>,
}

/// `getProjectSettings` 응답
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSettingsResponse {
    /// lockfile 우선 정책. 없으면 false로 간주
    #[serde(default)]
    pub use_lock_file: Option<bool>,
}

/// 업로드된 매니페스트 항목
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedManifest {
    /// 매니페스트 파일명
    pub name: String,
    /// 업로드 파트에 실렸던 상대 경로
    #[serde(default)]
    pub filename: String,
    /// 패키지 매니저 이름
    #[serde(default)]
    pub package_manager: String,
    /// 서버 처리 상태 코드
    #[serde(default)]
    pub status: String,
    /// 처리 상태 설명
    #[serde(default)]
    pub status_message: String,
}

/// `uploadManifestFiles` 응답
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadManifestsResponse {
    /// 그룹 단위 처리 요약
    #[serde(default)]
    pub message: String,
    /// 개별 매니페스트 처리 결과
    #[serde(default)]
    pub manifests: Vec<UploadedManifest>,
}

/// 업로드할 파일 하나
///
/// 멀티파트 요청의 파트 이름은 소스 루트 기준 상대 디렉토리를 포함해
/// 서버가 파일 위치를 복원할 수 있게 합니다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    /// 파일명
    pub name: String,
    /// 소스 루트 기준 상대 디렉토리 ("": 루트 바로 아래)
    pub relative_dir: String,
    /// 로컬 절대 경로
    pub path: PathBuf,
}

impl UploadFile {
    /// 멀티파트 파트의 파일명으로 쓸 경로를 반환합니다.
    pub fn upload_name(&self) -> String {
        if self.relative_dir.is_empty() {
            self.name.clone()
        } else {
            format!("{}/{}", self.relative_dir, self.name)
        }
    }
}

/// `updateScanStatus` 요청 본문
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateScanStatusRequest {
    /// 전송할 상태 문자열
    pub status: String,
    /// 상태 설명 메시지
    pub message: String,
}

/// `getScanStatus` 응답
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanStatusResponse {
    /// 스캔 상태 문자열
    pub status: String,
    /// 정책 위반 수
    #[serde(default)]
    pub violations: u64,
    /// 취약점 수
    #[serde(default)]
    pub vulnerabilities: u64,
    /// 세부 이슈 수
    #[serde(default)]
    pub issues: IssueCounts,
    /// 서버가 보고한 에러 메시지 목록
    #[serde(default)]
    pub errors: Vec<String>,
}

impl ScanStatusResponse {
    /// 와이어 응답을 도메인 스냅샷으로 변환합니다.
    ///
    /// 인식할 수 없는 상태 문자열은 경고를 남기고 `Running`으로 간주해
    /// 폴링이 계속되도록 합니다. 완료/성공 여부는 상태에서 파생됩니다.
    pub fn into_snapshot(self) -> ScanStatusSnapshot {
        let status = match ScanStatus::from_str_loose(&self.status) {
            Some(status) => status,
            None => {
                warn!(raw = %self.status, "unrecognized scan status, treating as running");
                ScanStatus::Running
            }
        };

        ScanStatusSnapshot {
            status,
            is_complete: status.is_complete(),
            is_success: status.is_success(),
            violations: self.violations,
            vulnerabilities: self.vulnerabilities,
            issues: self.issues,
            errors: self.errors,
        }
    }
}

/// 파일 형식 응답을 탐색/해시 규칙으로 변환합니다.
///
/// 인식할 수 없는 해시 알고리즘/인코딩 항목은 경고를 남기고 건너뜁니다.
/// 매니페스트 패턴이 없는 항목은 매니페스트 규칙을 만들지 않습니다.
pub fn formats_to_rules(formats: &[ScanFileFormat]) -> (Vec<ManifestRule>, Vec<HashableRule>) {
    let mut manifest_rules = Vec::new();
    let mut hashable_rules = Vec::new();

    for format in formats {
        if !format.manifests.is_empty() {
            manifest_rules.push(ManifestRule {
                package_manager: format.package_manager.clone(),
                patterns: format
                    .manifests
                    .iter()
                    .map(|m| ManifestPattern {
                        pattern: m.pattern.clone(),
                        is_lock_file: m.is_lock_file,
                    })
                    .collect(),
            });
        }

        for hashable in &format.hashable_files {
            let mut hash_configs = Vec::new();
            for spec in &hashable.hash_algorithms {
                match parse_hash_config(spec) {
                    Some(config) => hash_configs.push(config),
                    None => {
                        warn!(
                            package_manager = %format.package_manager,
                            algorithm = %spec.hash_algorithm,
                            "unrecognized hash algorithm spec, skipping"
                        );
                    }
                }
            }

            if hash_configs.is_empty() {
                continue;
            }

            hashable_rules.push(HashableRule {
                package_manager: format.package_manager.clone(),
                archive_extensions: hashable.archive_file_extensions.clone(),
                archive_content_extensions: hashable.archive_content_file_extensions.clone(),
                hash_configs,
            });
        }
    }

    (manifest_rules, hashable_rules)
}

fn parse_hash_config(spec: &HashAlgorithmSpec) -> Option<HashConfig> {
    let algorithm = HashAlgorithm::from_str_loose(&spec.hash_algorithm)?;
    let input = InputEncoding::from_str_loose(&spec.buffer_encoding)?;
    let output = DigestEncoding::from_str_loose(&spec.digest_encoding)?;
    Some(HashConfig {
        algorithm,
        input,
        output,
    })
}
