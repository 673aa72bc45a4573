//! 매니페스트 업로드 조정
//!
//! 수집된 매니페스트를 업로드 상한으로 자른 뒤 패키지 매니저 단위
//! 그룹으로 묶어 순차 업로드합니다. 그룹 하나의 실패는 전체를 중단하지
//! 않으며, 모든 그룹이 실패했을 때만 스캔을 원격에서 `Incomplete`로
//! 표시하고 에러를 반환합니다.

use std::path::Path;

use tracing::{info, warn};

use harborscan_core::types::{ManifestFile, ScanContext, ScanStatus};

use crate::api::ScanApi;
use crate::api::dto::UploadFile;
use crate::discovery::relative_string;
use crate::error::EngineError;
use crate::util::pluralize;

/// 모든 그룹 업로드 실패 시 원격에 남기는 메시지
const ALL_UPLOADS_FAILED_MESSAGE: &str = "Error uploading manifests";

/// 매니페스트 하나의 서버 처리 결과
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestReceipt {
    /// 매니페스트 파일명
    pub name: String,
    /// 서버가 알려준 처리 상태
    pub status_message: String,
}

/// 업로드 그룹 하나의 결과
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadOutcome {
    /// 패키지 매니저 이름
    pub package_manager: String,
    /// 그룹 단위 처리 요약
    pub message: String,
    /// 개별 매니페스트 처리 결과
    pub manifests: Vec<ManifestReceipt>,
}

/// 매니페스트를 그룹 단위로 업로드합니다.
///
/// 상한을 넘는 파일은 건너뛰며, 건너뛴 파일마다 경고를 남기고 요약
/// 한 줄을 추가로 남깁니다. 성공한 그룹들의 결과만 반환됩니다.
///
/// # Errors
///
/// 모든 그룹이 실패하면 `EngineError::AllUploadsFailed` 반환.
/// 업로드할 파일이 없으면 에러 없이 빈 결과를 돌려줍니다.
pub async fn upload_manifests<A: ScanApi>(
    api: &A,
    ctx: &ScanContext,
    mut files: Vec<ManifestFile>,
    max_manifests: usize,
    source_root: &Path,
) -> Result<Vec<UploadOutcome>, EngineError> {
    let total = files.len();
    if total > max_manifests {
        for skipped in &files[max_manifests..] {
            warn!(name = %skipped.name, "manifest exceeds upload limit, skipping");
        }
        warn!(
            "{} were detected, {} will not be uploaded",
            pluralize(total, "file"),
            pluralize(total - max_manifests, "file")
        );
        files.truncate(max_manifests);
    }

    let groups = group_by_package_manager(files);
    let mut results: Vec<Result<UploadOutcome, EngineError>> = Vec::new();

    for (package_manager, group) in groups {
        let upload_files = to_upload_files(&group, source_root);
        let result = match api.upload_manifest_files(ctx, &upload_files).await {
            Ok(response) => {
                info!(
                    package_manager = %package_manager,
                    manifests = group.len(),
                    "manifest group uploaded"
                );
                for manifest in &response.manifests {
                    info!(
                        name = %manifest.name,
                        status = %manifest.status_message,
                        "manifest accepted"
                    );
                }
                Ok(UploadOutcome {
                    package_manager,
                    message: response.message,
                    manifests: response
                        .manifests
                        .into_iter()
                        .map(|m| ManifestReceipt {
                            name: m.name,
                            status_message: m.status_message,
                        })
                        .collect(),
                })
            }
            Err(e) => {
                warn!(
                    package_manager = %package_manager,
                    error = %e,
                    "manifest group upload failed"
                );
                Err(EngineError::Api(e))
            }
        };
        results.push(result);
    }

    if all_groups_failed(&results) {
        if let Err(e) = api
            .update_scan_status(ctx, ScanStatus::Incomplete, ALL_UPLOADS_FAILED_MESSAGE)
            .await
        {
            warn!(error = %e, "failed to mark scan incomplete after upload failures");
        }
        return Err(EngineError::AllUploadsFailed {
            groups: results.len(),
        });
    }

    Ok(results.into_iter().filter_map(Result::ok).collect())
}

/// 그룹이 하나라도 있고 전부 실패했는지 판정합니다.
fn all_groups_failed(results: &[Result<UploadOutcome, EngineError>]) -> bool {
    !results.is_empty() && results.iter().all(Result::is_err)
}

/// 매니페스트를 패키지 매니저별로 묶습니다. 그룹 순서는 첫 등장 순서를
/// 따릅니다.
fn group_by_package_manager(files: Vec<ManifestFile>) -> Vec<(String, Vec<ManifestFile>)> {
    let mut groups: Vec<(String, Vec<ManifestFile>)> = Vec::new();
    for file in files {
        match groups
            .iter_mut()
            .find(|(pm, _)| *pm == file.package_manager)
        {
            Some((_, group)) => group.push(file),
            None => groups.push((file.package_manager.clone(), vec![file])),
        }
    }
    groups
}

fn to_upload_files(group: &[ManifestFile], source_root: &Path) -> Vec<UploadFile> {
    group
        .iter()
        .map(|manifest| {
            let relative_dir = manifest
                .path
                .parent()
                .map(|parent| relative_string(parent, source_root))
                .unwrap_or_default();
            UploadFile {
                name: manifest.name.clone(),
                relative_dir,
                path: manifest.path.clone(),
            }
        })
        .collect()
}
