//! 매니페스트 파일 탐색
//!
//! 소스 루트를 한 번 순회해 파일 목록을 수집한 뒤, 서버가 내려준 패턴
//! 규칙을 적용합니다. 작업 디렉토리를 바꾸지 않고 루트 기준 상대 경로로만
//! 매칭하므로 같은 프로세스에서 여러 스캔을 병렬로 돌려도 안전합니다.
//!
//! # 패턴 규칙
//!
//! - `.csproj` 같은 확장자 축약형은 `*.csproj`로 정규화됩니다.
//! - 경로 구분자가 없는 패턴은 깊이와 무관하게 파일명에 매칭됩니다.
//! - 경로 구분자가 있는 패턴은 루트 기준 상대 경로에 매칭됩니다.
//! - 매칭은 대소문자를 구분하지 않습니다.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use glob::{MatchOptions, Pattern};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use harborscan_core::types::ManifestFile;

use crate::error::EngineError;
use crate::rules::ManifestRule;
use crate::util::human_size;

/// 탐색에서 항상 제외되는 아티팩트 디렉토리 이름
pub const RESERVED_OUTPUT_DIR: &str = "harborscan";

fn match_options() -> MatchOptions {
    MatchOptions {
        case_sensitive: false,
        require_literal_separator: false,
        require_literal_leading_dot: false,
    }
}

/// 확장자 축약형을 글롭으로 정규화합니다.
///
/// `.csproj` → `*.csproj`. 그 외 패턴은 그대로 돌려줍니다.
pub fn normalize_pattern(raw: &str) -> String {
    if raw.starts_with('.') {
        format!("*{raw}")
    } else {
        raw.to_owned()
    }
}

/// 탐색으로 수집된 파일 하나
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchedFile {
    /// 로컬 경로
    pub path: PathBuf,
    /// 루트 기준 상대 경로 (`/` 구분)
    pub relative: String,
    /// 파일명
    pub name: String,
    /// 파일 크기 (바이트)
    pub size: u64,
}

/// 제외 규칙이 적용된 소스 트리 파일 목록
///
/// 루트 순회를 한 번만 수행하며, 매니페스트 탐색과 해시 대상 탐색이
/// 같은 목록을 공유합니다.
pub struct FileMatcher {
    root: PathBuf,
    files: Vec<MatchedFile>,
}

impl FileMatcher {
    /// 루트를 순회해 매처를 만듭니다.
    ///
    /// `exclude_dirs` 패턴은 디렉토리 이름 또는 루트 기준 상대 경로와
    /// 비교되며, 일치한 디렉토리는 하위 전체가 건너뛰어집니다.
    /// [`RESERVED_OUTPUT_DIR`]은 항상 제외됩니다. `exclude_files` 패턴과
    /// 일치한 파일은 목록에 들어가지 않습니다.
    ///
    /// 루트가 존재하지 않으면 경고를 남기고 빈 매처를 돌려줍니다.
    ///
    /// # Errors
    ///
    /// 제외 패턴이 유효한 글롭이 아니면 `EngineError::Pattern` 반환
    pub fn build(
        root: &Path,
        exclude_files: &[String],
        exclude_dirs: &[String],
    ) -> Result<Self, EngineError> {
        let dir_patterns = compile_patterns(exclude_dirs)?;
        let file_patterns = compile_patterns(exclude_files)?;
        let options = match_options();

        if !root.exists() {
            warn!(root = %root.display(), "source directory does not exist, nothing to discover");
            return Ok(Self {
                root: root.to_path_buf(),
                files: Vec::new(),
            });
        }

        let mut files = Vec::new();
        let walker = WalkDir::new(root)
            .follow_links(false)
            .into_iter()
            .filter_entry(|entry| {
                if entry.depth() == 0 || !entry.file_type().is_dir() {
                    return true;
                }
                !dir_is_excluded(entry.path(), root, &dir_patterns, options)
            });

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!(error = %e, "skipping unreadable entry");
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }

            let relative = relative_string(entry.path(), root);
            let name = entry.file_name().to_string_lossy().into_owned();

            if matches_any(&file_patterns, &name, &relative, options) {
                debug!(path = %relative, "file excluded by pattern");
                continue;
            }

            let size = entry.metadata().map(|m| m.len()).unwrap_or(0);
            files.push(MatchedFile {
                path: entry.into_path(),
                relative,
                name,
                size,
            });
        }

        debug!(root = %root.display(), files = files.len(), "source tree collected");
        Ok(Self {
            root: root.to_path_buf(),
            files,
        })
    }

    /// 탐색 루트를 반환합니다.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// 수집된 파일 수를 반환합니다.
    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    /// 패턴과 일치하는 파일들을 반환합니다.
    ///
    /// # Errors
    ///
    /// 패턴이 유효한 글롭이 아니면 `EngineError::Pattern` 반환
    pub fn matching_files(&self, raw_pattern: &str) -> Result<Vec<MatchedFile>, EngineError> {
        let normalized = normalize_pattern(raw_pattern);
        let pattern = Pattern::new(&normalized).map_err(|e| EngineError::Pattern {
            pattern: raw_pattern.to_owned(),
            reason: e.to_string(),
        })?;
        let options = match_options();
        let match_relative = normalized.contains('/');

        Ok(self
            .files
            .iter()
            .filter(|file| {
                if match_relative {
                    pattern.matches_with(&file.relative, options)
                } else {
                    pattern.matches_with(&file.name, options)
                }
            })
            .cloned()
            .collect())
    }
}

/// 매니페스트 규칙을 적용해 업로드 대상 파일을 수집합니다.
///
/// lockfile 정책에 따라 규칙마다 한 종류의 패턴만 활성화됩니다.
/// 여러 패턴이 같은 파일을 만나면 먼저 평가된 패턴이 가져갑니다.
/// 유효하지 않은 서버 패턴은 경고를 남기고 건너뜁니다.
pub fn discover_manifests(
    matcher: &FileMatcher,
    rules: &[ManifestRule],
    use_lock_file: bool,
) -> Result<Vec<ManifestFile>, EngineError> {
    let mut manifests = Vec::new();
    let mut seen: HashSet<PathBuf> = HashSet::new();

    for rule in rules {
        for pattern in rule.active_patterns(use_lock_file) {
            let matches = match matcher.matching_files(&pattern.pattern) {
                Ok(matches) => matches,
                Err(e) => {
                    warn!(
                        package_manager = %rule.package_manager,
                        pattern = %pattern.pattern,
                        error = %e,
                        "skipping invalid manifest pattern"
                    );
                    continue;
                }
            };

            info!(
                package_manager = %rule.package_manager,
                pattern = %pattern.pattern,
                matches = matches.len(),
                "manifest pattern evaluated"
            );

            for file in matches {
                if !seen.insert(file.path.clone()) {
                    continue;
                }
                info!(
                    package_manager = %rule.package_manager,
                    path = %file.relative,
                    size = %human_size(file.size),
                    "found manifest file"
                );
                manifests.push(ManifestFile {
                    package_manager: rule.package_manager.clone(),
                    name: file.name,
                    path: file.path,
                });
            }
        }
    }

    Ok(manifests)
}

fn compile_patterns(patterns: &[String]) -> Result<Vec<Pattern>, EngineError> {
    patterns
        .iter()
        .map(|raw| {
            Pattern::new(&normalize_pattern(raw)).map_err(|e| EngineError::Pattern {
                pattern: raw.clone(),
                reason: e.to_string(),
            })
        })
        .collect()
}

fn dir_is_excluded(path: &Path, root: &Path, patterns: &[Pattern], options: MatchOptions) -> bool {
    let name = path.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();
    if name.eq_ignore_ascii_case(RESERVED_OUTPUT_DIR) {
        return true;
    }
    let relative = relative_string(path, root);
    matches_any(patterns, &name, &relative, options)
}

fn matches_any(patterns: &[Pattern], name: &str, relative: &str, options: MatchOptions) -> bool {
    patterns
        .iter()
        .any(|p| p.matches_with(name, options) || p.matches_with(relative, options))
}

/// 루트 기준 상대 경로를 `/` 구분 문자열로 만듭니다.
pub(crate) fn relative_string(path: &Path, root: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    let parts: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    parts.join("/")
}
