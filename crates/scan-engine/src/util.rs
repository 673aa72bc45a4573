//! 로그 메시지용 포매팅 헬퍼

/// 개수에 맞춰 명사를 단수/복수형으로 붙입니다.
///
/// 1일 때만 단수형을 사용합니다. `pluralize(1, "file")` → `"1 file"`,
/// `pluralize(0, "file")` → `"0 files"`. 개수가 없으면(`None`) 0으로
/// 간주합니다.
pub fn pluralize(count: impl Into<Option<usize>>, noun: &str) -> String {
    let count = count.into().unwrap_or(0);
    if count == 1 {
        format!("{count} {noun}")
    } else {
        format!("{count} {noun}s")
    }
}

/// 바이트 수를 사람이 읽기 좋은 단위로 변환합니다.
pub fn human_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{bytes} B")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pluralize_singular() {
        assert_eq!(pluralize(1, "file"), "1 file");
    }

    #[test]
    fn pluralize_zero_is_plural() {
        assert_eq!(pluralize(0, "file"), "0 files");
    }

    #[test]
    fn pluralize_missing_count_is_zero() {
        assert_eq!(pluralize(None, "file"), "0 files");
    }

    #[test]
    fn pluralize_many() {
        assert_eq!(pluralize(42, "manifest"), "42 manifests");
    }

    #[test]
    fn human_size_bytes() {
        assert_eq!(human_size(512), "512 B");
    }

    #[test]
    fn human_size_kilobytes() {
        assert_eq!(human_size(2048), "2.0 KB");
    }

    #[test]
    fn human_size_megabytes() {
        assert_eq!(human_size(5 * 1024 * 1024 + 512 * 1024), "5.5 MB");
    }

    #[test]
    fn human_size_gigabytes() {
        assert_eq!(human_size(3 * 1024 * 1024 * 1024), "3.0 GB");
    }
}
