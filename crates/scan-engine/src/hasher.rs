//! 아카이브 파일 해시 매니페스트 생성
//!
//! 해시 규칙에 맞는 파일들의 다이제스트를 계산해 패키지 매니저별
//! `<package_manager>_harborscan_hashes.json` 아티팩트로 소스 루트에
//! 기록하고, 업로드 대상 매니페스트로 등록합니다. 매칭되는 파일이 없는
//! 규칙은 아티팩트를 만들지 않습니다.

use std::borrow::Cow;
use std::collections::HashSet;
use std::fmt::Write as _;

use base64::Engine as _;
use sha1::{Digest, Sha1};
use sha2::{Sha256, Sha512};
use tracing::{debug, info, warn};

use harborscan_core::types::{FileDigest, FileHashes, HashesManifest, ManifestFile};

use crate::discovery::{FileMatcher, MatchedFile};
use crate::error::EngineError;
use crate::rules::{DigestEncoding, HashAlgorithm, HashConfig, HashableRule, InputEncoding};

/// 해시 규칙을 적용해 해시 매니페스트 아티팩트를 생성합니다.
///
/// 반환된 [`ManifestFile`]들은 일반 매니페스트와 같은 방식으로
/// 업로드됩니다. 읽을 수 없는 파일은 경고를 남기고 건너뜁니다.
///
/// # Errors
///
/// 아티팩트 기록에 실패하면 `EngineError::Artifact` 반환
pub async fn generate_hash_manifests(
    matcher: &FileMatcher,
    rules: &[HashableRule],
) -> Result<Vec<ManifestFile>, EngineError> {
    let mut artifacts = Vec::new();

    for rule in rules {
        let files = collect_rule_files(matcher, rule);
        let mut file_hashes = Vec::new();

        for file in &files {
            let content = match tokio::fs::read(&file.path).await {
                Ok(content) => content,
                Err(e) => {
                    warn!(path = %file.relative, error = %e, "skipping unreadable hashable file");
                    continue;
                }
            };

            let digests = rule
                .hash_configs
                .iter()
                .map(|config| FileDigest {
                    hash_algorithm: config.algorithm.name().to_owned(),
                    digest: compute_digest(&content, config),
                })
                .collect();

            file_hashes.push(FileHashes {
                filename: file.name.clone(),
                path: file.relative.clone(),
                digests,
            });
        }

        if file_hashes.is_empty() {
            debug!(package_manager = %rule.package_manager, "no hashable files matched");
            continue;
        }

        let manifest = HashesManifest {
            package_manager: rule.package_manager.clone(),
            file_hashes,
        };
        let name = manifest.artifact_name();
        let path = matcher.root().join(&name);

        let json = serde_json::to_string_pretty(&manifest).map_err(|e| EngineError::Artifact {
            path: name.clone(),
            reason: e.to_string(),
        })?;
        tokio::fs::write(&path, json)
            .await
            .map_err(|e| EngineError::Artifact {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;

        info!(
            package_manager = %rule.package_manager,
            files = manifest.file_hashes.len(),
            path = %path.display(),
            "hash manifest written"
        );

        artifacts.push(ManifestFile {
            package_manager: rule.package_manager.clone(),
            name,
            path,
        });
    }

    Ok(artifacts)
}

/// 규칙의 모든 확장자 패턴으로 매칭한 파일을 중복 없이 모읍니다.
fn collect_rule_files(matcher: &FileMatcher, rule: &HashableRule) -> Vec<MatchedFile> {
    let mut seen = HashSet::new();
    let mut files = Vec::new();

    for raw_pattern in rule.file_patterns() {
        let matches = match matcher.matching_files(raw_pattern) {
            Ok(matches) => matches,
            Err(e) => {
                warn!(
                    package_manager = %rule.package_manager,
                    pattern = %raw_pattern,
                    error = %e,
                    "skipping invalid hashable pattern"
                );
                continue;
            }
        };
        for file in matches {
            if seen.insert(file.path.clone()) {
                files.push(file);
            }
        }
    }

    files
}

/// 해시 설정 하나에 대한 다이제스트 문자열을 계산합니다.
fn compute_digest(content: &[u8], config: &HashConfig) -> String {
    let normalized: Cow<'_, [u8]> = match config.input {
        InputEncoding::Binary => Cow::Borrowed(content),
        // 유효하지 않은 UTF-8 시퀀스는 대체 문자로 치환한 뒤 해시
        InputEncoding::Utf8 => match std::str::from_utf8(content) {
            Ok(_) => Cow::Borrowed(content),
            Err(_) => Cow::Owned(String::from_utf8_lossy(content).into_owned().into_bytes()),
        },
    };

    let raw = match config.algorithm {
        HashAlgorithm::Sha1 => {
            let mut hasher = Sha1::new();
            hasher.update(&normalized);
            hasher.finalize().to_vec()
        }
        HashAlgorithm::Sha256 => {
            let mut hasher = Sha256::new();
            hasher.update(&normalized);
            hasher.finalize().to_vec()
        }
        HashAlgorithm::Sha512 => {
            let mut hasher = Sha512::new();
            hasher.update(&normalized);
            hasher.finalize().to_vec()
        }
    };

    match config.output {
        DigestEncoding::Hex => to_hex(&raw),
        DigestEncoding::Base64 => base64::engine::general_purpose::STANDARD.encode(&raw),
    }
}

fn to_hex(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        let _ = write!(out, "{byte:02x}");
    }
    out
}
