//! 스캔 결과 리포트 -- 완료된 스캔의 최종 요약
//!
//! 스캔 상태 스냅샷을 스캔 유형에 맞는 항목 구성의 리포트로 변환합니다.
//! 리포트는 구조화된 데이터(`ScanReport`)와 정렬된 텍스트(`to_text`)
//! 두 형태로 소비할 수 있으며, 색상 등 출력 장식은 호출 측의 몫입니다.
//!
//! # 사용 예시
//!
//! ```
//! use harborscan_core::{ScanContext, ScanStatusSnapshot, ScanStatus, ScanType};
//! use harborscan_engine::report::ScanReport;
//!
//! let ctx = ScanContext {
//!     scan_type: ScanType::Sca,
//!     scan_report_url: "https://app.harborscan.io/reports/1".to_owned(),
//!     ..Default::default()
//! };
//! let snapshot = ScanStatusSnapshot {
//!     status: ScanStatus::Finished,
//!     is_complete: true,
//!     is_success: true,
//!     violations: 0,
//!     vulnerabilities: 2,
//!     ..Default::default()
//! };
//!
//! let report = ScanReport::from_scan(&ctx, &snapshot);
//! assert_eq!(report.headline, "SCA scan passed");
//! assert!(report.to_text().contains("Vulnerabilities"));
//! ```

use std::fmt;
use std::fmt::Write as _;

use harborscan_core::types::{ScanContext, ScanStatus, ScanStatusSnapshot, ScanType};
use serde::{Deserialize, Serialize};

/// 항목 라벨 열 너비. 가장 긴 라벨("Web Vulnerabilities")보다 넓게 잡습니다.
pub const LABEL_COLUMN_WIDTH: usize = 22;

/// 리포트의 항목 한 줄
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportRow {
    /// 항목 라벨
    pub label: String,
    /// 집계 건수
    pub count: u64,
}

impl ReportRow {
    fn new(label: &str, count: u64) -> Self {
        Self {
            label: label.to_owned(),
            count,
        }
    }
}

/// 스캔 결과 리포트
///
/// 종료된 스캔의 상태와 이슈 집계를 담습니다. 항목 구성은 스캔 유형을
/// 따릅니다. 매니페스트 업로드 계열은 취약점/미확인 패키지 계열 항목을,
/// `Dast`는 웹 취약점을, `Sast`는 코드 이슈를 포함하며 정책 위반 건수는
/// 항상 포함됩니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanReport {
    /// 스캔 유형
    pub scan_type: ScanType,
    /// 종료 상태
    pub status: ScanStatus,
    /// 결과 한 줄 요약
    pub headline: String,
    /// 스캔 유형별 이슈 집계 항목
    pub rows: Vec<ReportRow>,
    /// 웹 리포트 URL
    pub report_url: String,
    /// 서버가 보고한 오류 메시지
    pub errors: Vec<String>,
}

impl ScanReport {
    /// 스캔 컨텍스트와 상태 스냅샷으로 리포트를 생성합니다.
    pub fn from_scan(ctx: &ScanContext, snapshot: &ScanStatusSnapshot) -> Self {
        Self {
            scan_type: ctx.scan_type,
            status: snapshot.status,
            headline: headline(ctx.scan_type, snapshot.status),
            rows: count_rows(ctx.scan_type, snapshot),
            report_url: ctx.scan_report_url.clone(),
            errors: snapshot.errors.clone(),
        }
    }

    /// 라벨을 고정 폭으로 정렬한 여러 줄 텍스트를 렌더링합니다.
    pub fn to_text(&self) -> String {
        let width = LABEL_COLUMN_WIDTH;
        let mut out = String::new();
        let _ = writeln!(out, "{}", self.headline);
        for row in &self.rows {
            let label = format!("{}:", row.label);
            let _ = writeln!(out, "{label:<width$}{}", row.count);
        }
        let _ = write!(out, "{:<width$}{}", "Report:", self.report_url);
        out
    }
}

impl fmt::Display for ScanReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_text())
    }
}

/// 종료 상태에 대응하는 요약 문구를 만듭니다.
fn headline(scan_type: ScanType, status: ScanStatus) -> String {
    let acronym = scan_type.acronym();
    match status {
        ScanStatus::Finished => format!("{acronym} scan passed"),
        ScanStatus::FailedWithIssues => format!("{acronym} scan failed with issues"),
        ScanStatus::Incomplete => format!("{acronym} scan did not complete"),
        ScanStatus::Error => format!("{acronym} scan errored"),
        ScanStatus::Queued | ScanStatus::Running => {
            format!("{acronym} scan {status}")
        }
    }
}

/// 스캔 유형에 해당하는 집계 항목만 모읍니다.
fn count_rows(scan_type: ScanType, snapshot: &ScanStatusSnapshot) -> Vec<ReportRow> {
    let mut rows = vec![ReportRow::new("Violations", snapshot.violations)];

    if scan_type.is_generated() {
        rows.push(ReportRow::new("Vulnerabilities", snapshot.vulnerabilities));
        rows.push(ReportRow::new(
            "Unknown Packages",
            snapshot.issues.unknown_packages,
        ));
        rows.push(ReportRow::new("Typosquats", snapshot.issues.typosquats));
        rows.push(ReportRow::new(
            "Substitutions",
            snapshot.issues.substitutions,
        ));
    }

    if scan_type == ScanType::Dast {
        rows.push(ReportRow::new(
            "Web Vulnerabilities",
            snapshot.issues.web_vulnerabilities,
        ));
    }

    if scan_type == ScanType::Sast {
        rows.push(ReportRow::new("Code Issues", snapshot.issues.code_issues));
    }

    rows
}

#[cfg(test)]
mod tests {
    use harborscan_core::types::IssueCounts;

    use super::*;

    fn context(scan_type: ScanType) -> ScanContext {
        ScanContext {
            scan_type,
            scan_report_url: "https://app.harborscan.io/reports/abc".to_owned(),
            ..Default::default()
        }
    }

    fn finished_snapshot() -> ScanStatusSnapshot {
        ScanStatusSnapshot {
            status: ScanStatus::Finished,
            is_complete: true,
            is_success: true,
            violations: 0,
            vulnerabilities: 3,
            issues: IssueCounts {
                unknown_packages: 1,
                typosquats: 0,
                substitutions: 2,
                web_vulnerabilities: 7,
                code_issues: 5,
            },
            errors: vec![],
        }
    }

    #[test]
    fn generated_scan_includes_package_rows() {
        let report = ScanReport::from_scan(&context(ScanType::Sca), &finished_snapshot());

        let labels: Vec<&str> = report.rows.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(
            labels,
            vec![
                "Violations",
                "Vulnerabilities",
                "Unknown Packages",
                "Typosquats",
                "Substitutions",
            ]
        );
    }

    #[test]
    fn generated_scan_keeps_zero_count_rows() {
        let report = ScanReport::from_scan(&context(ScanType::Sca), &finished_snapshot());

        let violations = report
            .rows
            .iter()
            .find(|r| r.label == "Violations")
            .unwrap();
        assert_eq!(violations.count, 0);

        let vulnerabilities = report
            .rows
            .iter()
            .find(|r| r.label == "Vulnerabilities")
            .unwrap();
        assert_eq!(vulnerabilities.count, 3);
    }

    #[test]
    fn dast_scan_reports_web_vulnerabilities_only() {
        let report = ScanReport::from_scan(&context(ScanType::Dast), &finished_snapshot());

        let labels: Vec<&str> = report.rows.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(labels, vec!["Violations", "Web Vulnerabilities"]);
        assert_eq!(report.rows[1].count, 7);
    }

    #[test]
    fn sast_scan_reports_code_issues_only() {
        let report = ScanReport::from_scan(&context(ScanType::Sast), &finished_snapshot());

        let labels: Vec<&str> = report.rows.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(labels, vec!["Violations", "Code Issues"]);
        assert_eq!(report.rows[1].count, 5);
    }

    #[test]
    fn headline_for_each_terminal_status() {
        assert_eq!(
            headline(ScanType::Sca, ScanStatus::Finished),
            "SCA scan passed"
        );
        assert_eq!(
            headline(ScanType::Csa, ScanStatus::FailedWithIssues),
            "CSA scan failed with issues"
        );
        assert_eq!(
            headline(ScanType::Dast, ScanStatus::Incomplete),
            "DAST scan did not complete"
        );
        assert_eq!(
            headline(ScanType::Sast, ScanStatus::Error),
            "SAST scan errored"
        );
    }

    #[test]
    fn headline_for_non_terminal_status_names_it() {
        assert_eq!(
            headline(ScanType::Sbom, ScanStatus::Running),
            "SBOM scan Running"
        );
    }

    #[test]
    fn text_rendering_pads_labels_to_fixed_width() {
        let report = ScanReport::from_scan(&context(ScanType::Dast), &finished_snapshot());
        let text = report.to_text();

        for line in text.lines().skip(1) {
            let value_column = line.rfind(' ').unwrap() + 1;
            assert_eq!(value_column, LABEL_COLUMN_WIDTH);
        }
    }

    #[test]
    fn text_rendering_ends_with_report_url() {
        let report = ScanReport::from_scan(&context(ScanType::Sca), &finished_snapshot());
        let text = report.to_text();

        let last = text.lines().last().unwrap();
        assert!(last.starts_with("Report:"));
        assert!(last.ends_with("https://app.harborscan.io/reports/abc"));
    }

    #[test]
    fn report_carries_server_errors() {
        let mut snapshot = finished_snapshot();
        snapshot.status = ScanStatus::Error;
        snapshot.is_success = false;
        snapshot.errors = vec!["analyzer crashed".to_owned()];

        let report = ScanReport::from_scan(&context(ScanType::Sca), &snapshot);
        assert_eq!(report.errors, vec!["analyzer crashed".to_owned()]);
        assert_eq!(report.headline, "SCA scan errored");
    }

    #[test]
    fn report_serializes_to_json() {
        let report = ScanReport::from_scan(&context(ScanType::Sca), &finished_snapshot());
        let json = serde_json::to_string(&report).unwrap();

        assert!(json.contains("\"headline\":\"SCA scan passed\""));
        let back: ScanReport = serde_json::from_str(&json).unwrap();
        assert_eq!(back, report);
    }
}
