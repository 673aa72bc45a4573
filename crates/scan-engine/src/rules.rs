//! 스캔 파일 형식 규칙
//!
//! 스캔 서버가 내려주는 지원 파일 형식 응답을 탐색([`crate::discovery`])과
//! 해시 생성([`crate::hasher`])이 사용하는 규칙 형태로 표현합니다.
//! 와이어 DTO와의 변환은 [`crate::api::dto`]에 있습니다.

/// 매니페스트 파일 패턴 하나
///
/// 패턴 문자열은 파일명 글롭(`package.json`)이거나 확장자 축약형(`.csproj`)
/// 입니다. 축약형 해석은 탐색 모듈이 담당합니다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestPattern {
    /// 글롭 패턴 또는 확장자 축약형
    pub pattern: String,
    /// lockfile 패턴 여부
    pub is_lock_file: bool,
}

/// 패키지 매니저 하나의 매니페스트 규칙
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestRule {
    /// 패키지 매니저 이름 (예: "npm", "cargo")
    pub package_manager: String,
    /// 매니페스트 파일 패턴 목록
    pub patterns: Vec<ManifestPattern>,
}

impl ManifestRule {
    /// lockfile 정책에 따라 활성화되는 패턴만 반환합니다.
    ///
    /// `use_lock_file`가 true면 lockfile 패턴만, false면 일반 매니페스트
    /// 패턴만 선택됩니다. 두 종류를 섞어 쓰지 않습니다.
    pub fn active_patterns(&self, use_lock_file: bool) -> impl Iterator<Item = &ManifestPattern> {
        self.patterns
            .iter()
            .filter(move |p| p.is_lock_file == use_lock_file)
    }
}

/// 해시 알고리즘
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashAlgorithm {
    /// SHA-1
    Sha1,
    /// SHA-256
    Sha256,
    /// SHA-512
    Sha512,
}

impl HashAlgorithm {
    /// 대소문자와 구분 기호에 관대한 파싱
    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().replace('-', "").as_str() {
            "sha1" => Some(Self::Sha1),
            "sha256" => Some(Self::Sha256),
            "sha512" => Some(Self::Sha512),
            _ => None,
        }
    }

    /// 알고리즘 이름 (소문자)
    pub fn name(&self) -> &'static str {
        match self {
            Self::Sha1 => "sha1",
            Self::Sha256 => "sha256",
            Self::Sha512 => "sha512",
        }
    }
}

impl std::fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// 해시 입력 인코딩
///
/// `Utf8`은 파일 내용을 UTF-8 텍스트로 정규화한 뒤 해시합니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputEncoding {
    /// 원본 바이트 그대로
    #[default]
    Binary,
    /// UTF-8 텍스트로 정규화
    Utf8,
}

impl InputEncoding {
    /// 대소문자에 관대한 파싱
    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().replace('-', "").as_str() {
            "binary" => Some(Self::Binary),
            "utf8" => Some(Self::Utf8),
            _ => None,
        }
    }
}

impl std::fmt::Display for InputEncoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Binary => "binary",
            Self::Utf8 => "utf8",
        };
        write!(f, "{name}")
    }
}

/// 다이제스트 출력 인코딩
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DigestEncoding {
    /// 소문자 16진수
    #[default]
    Hex,
    /// 표준 base64
    Base64,
}

impl DigestEncoding {
    /// 대소문자에 관대한 파싱
    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "hex" => Some(Self::Hex),
            "base64" => Some(Self::Base64),
            _ => None,
        }
    }
}

impl std::fmt::Display for DigestEncoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Hex => "hex",
            Self::Base64 => "base64",
        };
        write!(f, "{name}")
    }
}

/// 해시 계산 방법 하나
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashConfig {
    /// 해시 알고리즘
    pub algorithm: HashAlgorithm,
    /// 입력 인코딩
    pub input: InputEncoding,
    /// 출력 인코딩
    pub output: DigestEncoding,
}

/// 패키지 매니저 하나의 해시 대상 파일 규칙
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashableRule {
    /// 패키지 매니저 이름
    pub package_manager: String,
    /// 아카이브 파일 확장자 (예: ".jar")
    pub archive_extensions: Vec<String>,
    /// 아카이브 내용물 파일 확장자 (예: ".dll")
    pub archive_content_extensions: Vec<String>,
    /// 적용할 해시 계산 방법 목록
    pub hash_configs: Vec<HashConfig>,
}

impl HashableRule {
    /// 탐색에 사용할 파일 패턴을 반환합니다.
    ///
    /// 아카이브 확장자와 내용물 확장자를 합친 목록입니다. `.jar` 같은
    /// 축약형 그대로 반환하며, 글롭 변환은 탐색 모듈이 수행합니다.
    pub fn file_patterns(&self) -> impl Iterator<Item = &str> {
        self.archive_extensions
            .iter()
            .chain(self.archive_content_extensions.iter())
            .map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn npm_rule() -> ManifestRule {
        ManifestRule {
            package_manager: "npm".to_owned(),
            patterns: vec![
                ManifestPattern {
                    pattern: "package.json".to_owned(),
                    is_lock_file: false,
                },
                ManifestPattern {
                    pattern: "package-lock.json".to_owned(),
                    is_lock_file: true,
                },
                ManifestPattern {
                    pattern: "yarn.lock".to_owned(),
                    is_lock_file: true,
                },
            ],
        }
    }

    #[test]
    fn active_patterns_selects_lockfiles_only() {
        let rule = npm_rule();
        let active: Vec<_> = rule.active_patterns(true).map(|p| p.pattern.as_str()).collect();
        assert_eq!(active, vec!["package-lock.json", "yarn.lock"]);
    }

    #[test]
    fn active_patterns_selects_manifests_only() {
        let rule = npm_rule();
        let active: Vec<_> = rule.active_patterns(false).map(|p| p.pattern.as_str()).collect();
        assert_eq!(active, vec!["package.json"]);
    }

    #[test]
    fn hash_algorithm_from_str_loose() {
        assert_eq!(HashAlgorithm::from_str_loose("sha1"), Some(HashAlgorithm::Sha1));
        assert_eq!(HashAlgorithm::from_str_loose("SHA-256"), Some(HashAlgorithm::Sha256));
        assert_eq!(HashAlgorithm::from_str_loose("Sha512"), Some(HashAlgorithm::Sha512));
        assert_eq!(HashAlgorithm::from_str_loose("md5"), None);
    }

    #[test]
    fn hash_algorithm_display() {
        assert_eq!(HashAlgorithm::Sha256.to_string(), "sha256");
    }

    #[test]
    fn input_encoding_from_str_loose() {
        assert_eq!(InputEncoding::from_str_loose("binary"), Some(InputEncoding::Binary));
        assert_eq!(InputEncoding::from_str_loose("UTF-8"), Some(InputEncoding::Utf8));
        assert_eq!(InputEncoding::from_str_loose("latin1"), None);
    }

    #[test]
    fn digest_encoding_from_str_loose() {
        assert_eq!(DigestEncoding::from_str_loose("hex"), Some(DigestEncoding::Hex));
        assert_eq!(DigestEncoding::from_str_loose("Base64"), Some(DigestEncoding::Base64));
        assert_eq!(DigestEncoding::from_str_loose("hex32"), None);
    }

    #[test]
    fn hashable_rule_file_patterns_chains_extensions() {
        let rule = HashableRule {
            package_manager: "maven".to_owned(),
            archive_extensions: vec![".jar".to_owned(), ".war".to_owned()],
            archive_content_extensions: vec![".class".to_owned()],
            hash_configs: Vec::new(),
        };
        let patterns: Vec<_> = rule.file_patterns().collect();
        assert_eq!(patterns, vec![".jar", ".war", ".class"]);
    }
}
