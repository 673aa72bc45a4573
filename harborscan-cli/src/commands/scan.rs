//! `harborscan scan` command handler

use std::io::Write;
use std::path::Path;

use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use harborscan_core::config::HarborscanConfig;
use harborscan_core::types::ScanStatus;
use harborscan_engine::{
    HttpScanApi, LABEL_COLUMN_WIDTH, ReportRow, ScanEngineBuilder, ScanEngineConfig, ScanOutcome,
};

use crate::cli::ScanArgs;
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `scan` command.
pub async fn execute(
    args: ScanArgs,
    config_path: &Path,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let config = HarborscanConfig::load(config_path).await?;

    let mut engine_config = ScanEngineConfig::from_core(&config);
    apply_overrides(&mut engine_config, &args);

    let api = HttpScanApi::new(config.server.base_url.clone(), config.server.api_key.clone())?;

    // Ctrl-C stops the completion wait without touching the remote scan.
    let cancel = CancellationToken::new();
    spawn_interrupt_watcher(cancel.clone());

    let engine = ScanEngineBuilder::new(api)
        .config(engine_config)
        .cancel_token(cancel)
        .build()
        .map_err(|e| CliError::Scan(format!("failed to build scan engine: {}", e)))?;

    info!(
        project = %engine.config().project_name,
        source_dir = %engine.config().source_dir,
        "starting scan"
    );

    let outcome = engine.run_scan().await?;

    let report = build_run_report(engine.config(), &outcome);
    writer.render(&report)?;

    // Exit code 4 for a scan that reached an end state other than Finished
    if !outcome.snapshot.status.is_success() {
        return Err(CliError::ScanFailed(outcome.report.headline.clone()));
    }

    Ok(())
}

/// Overlay command line flags onto the file-derived engine config.
///
/// Absent flags leave the config value untouched; boolean flags only
/// ever enable a feature, never disable one the file turned on.
fn apply_overrides(config: &mut ScanEngineConfig, args: &ScanArgs) {
    if let Some(ref dir) = args.source_dir {
        config.source_dir = dir.display().to_string();
    }
    if let Some(ref branch) = args.branch {
        config.branch = branch.clone();
    }
    if let Some(ref commit) = args.commit {
        config.commit = commit.clone();
    }
    if args.hash_files {
        config.hash_files = true;
    }
    if args.export_report {
        config.export_report = true;
    }
}

/// Cancel the token when the process receives an interrupt signal.
fn spawn_interrupt_watcher(cancel: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, cancelling scan wait");
            cancel.cancel();
        }
    });
}

fn build_run_report(config: &ScanEngineConfig, outcome: &ScanOutcome) -> ScanRunReport {
    ScanRunReport {
        project: config.project_name.clone(),
        branch: config.branch.clone(),
        scan_type: outcome.context.scan_type.acronym().to_owned(),
        analysis_id: outcome.context.analysis_id.clone(),
        status: outcome.snapshot.status,
        headline: outcome.report.headline.clone(),
        rows: outcome.report.rows.clone(),
        errors: outcome.report.errors.clone(),
        report_url: outcome.report.report_url.clone(),
    }
}

/// Final scan result as shown to the user.
#[derive(Serialize)]
pub struct ScanRunReport {
    pub project: String,
    pub branch: String,
    pub scan_type: String,
    pub analysis_id: String,
    pub status: ScanStatus,
    pub headline: String,
    pub rows: Vec<ReportRow>,
    pub errors: Vec<String>,
    pub report_url: String,
}

impl Render for ScanRunReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(w, "Scan: {} ({})", self.project.bold(), self.scan_type)?;
        if !self.branch.is_empty() {
            writeln!(w, "Branch: {}", self.branch)?;
        }
        writeln!(w, "Analysis: {}", self.analysis_id)?;
        writeln!(w)?;

        let headline = match self.status {
            ScanStatus::Finished => self.headline.green().bold(),
            ScanStatus::FailedWithIssues => self.headline.red().bold(),
            ScanStatus::Incomplete => self.headline.yellow().bold(),
            ScanStatus::Error => self.headline.red().bold(),
            ScanStatus::Queued | ScanStatus::Running => self.headline.normal(),
        };
        writeln!(w, "{}", headline)?;

        for row in &self.rows {
            writeln!(
                w,
                "  {:<width$}{}",
                format!("{}:", row.label),
                row.count,
                width = LABEL_COLUMN_WIDTH
            )?;
        }

        for err in &self.errors {
            writeln!(w, "{} {}", "Error:".red(), err)?;
        }

        writeln!(w)?;
        writeln!(w, "Report: {}", self.report_url)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::path::PathBuf;

    fn sample_args() -> ScanArgs {
        ScanArgs {
            source_dir: None,
            branch: None,
            commit: None,
            hash_files: false,
            export_report: false,
        }
    }

    fn sample_report(status: ScanStatus, headline: &str) -> ScanRunReport {
        ScanRunReport {
            project: "storefront".to_owned(),
            branch: "main".to_owned(),
            scan_type: "SCA".to_owned(),
            analysis_id: "analysis-42".to_owned(),
            status,
            headline: headline.to_owned(),
            rows: vec![
                ReportRow {
                    label: "Vulnerabilities".to_owned(),
                    count: 3,
                },
                ReportRow {
                    label: "Policy Violations".to_owned(),
                    count: 0,
                },
            ],
            errors: Vec::new(),
            report_url: "https://app.harborscan.io/reports/analysis-42".to_owned(),
        }
    }

    #[test]
    fn test_apply_overrides_replaces_optional_fields() {
        let mut config = ScanEngineConfig {
            branch: "main".to_owned(),
            commit: "old".to_owned(),
            ..Default::default()
        };
        let args = ScanArgs {
            source_dir: Some(PathBuf::from("/workspace/app")),
            branch: Some("release/2.4".to_owned()),
            commit: Some("deadbeef".to_owned()),
            hash_files: false,
            export_report: false,
        };

        apply_overrides(&mut config, &args);

        assert_eq!(config.source_dir, "/workspace/app");
        assert_eq!(config.branch, "release/2.4");
        assert_eq!(config.commit, "deadbeef");
    }

    #[test]
    fn test_apply_overrides_keeps_config_when_flags_absent() {
        let mut config = ScanEngineConfig {
            source_dir: "/srv/checkout".to_owned(),
            branch: "develop".to_owned(),
            commit: "abc123".to_owned(),
            hash_files: true,
            export_report: true,
            ..Default::default()
        };

        apply_overrides(&mut config, &sample_args());

        assert_eq!(config.source_dir, "/srv/checkout");
        assert_eq!(config.branch, "develop");
        assert_eq!(config.commit, "abc123");
        assert!(config.hash_files, "absent flag should not disable");
        assert!(config.export_report, "absent flag should not disable");
    }

    #[test]
    fn test_apply_overrides_boolean_flags_enable_only() {
        let mut config = ScanEngineConfig::default();
        let args = ScanArgs {
            hash_files: true,
            export_report: true,
            ..sample_args()
        };

        apply_overrides(&mut config, &args);

        assert!(config.hash_files);
        assert!(config.export_report);
    }

    #[test]
    fn test_render_text_finished_scan() {
        let report = sample_report(ScanStatus::Finished, "SCA scan passed");

        let mut buffer = Vec::new();
        report
            .render_text(&mut buffer)
            .expect("text rendering should succeed");

        let output = String::from_utf8(buffer).expect("valid UTF-8");
        assert!(output.contains("Scan: storefront (SCA)"));
        assert!(output.contains("Branch: main"));
        assert!(output.contains("Analysis: analysis-42"));
        assert!(output.contains("SCA scan passed"));
        assert!(output.contains("Vulnerabilities:"));
        assert!(output.contains("Report: https://app.harborscan.io/reports/analysis-42"));
    }

    #[test]
    fn test_render_text_failed_scan_shows_errors() {
        let mut report = sample_report(ScanStatus::Error, "SCA scan did not complete");
        report.errors = vec!["analysis worker crashed".to_owned()];

        let mut buffer = Vec::new();
        report
            .render_text(&mut buffer)
            .expect("text rendering should succeed");

        let output = String::from_utf8(buffer).expect("valid UTF-8");
        assert!(output.contains("SCA scan did not complete"));
        assert!(output.contains("analysis worker crashed"));
    }

    #[test]
    fn test_render_text_omits_empty_branch() {
        let mut report = sample_report(ScanStatus::Finished, "SCA scan passed");
        report.branch = String::new();

        let mut buffer = Vec::new();
        report
            .render_text(&mut buffer)
            .expect("text rendering should succeed");

        let output = String::from_utf8(buffer).expect("valid UTF-8");
        assert!(!output.contains("Branch:"), "empty branch should be hidden");
    }

    #[test]
    fn test_render_text_row_alignment() {
        let report = sample_report(ScanStatus::Finished, "SCA scan passed");

        let mut buffer = Vec::new();
        report.render_text(&mut buffer).expect("should render");

        let output = String::from_utf8(buffer).expect("valid UTF-8");
        let row_line = output
            .lines()
            .find(|l| l.contains("Vulnerabilities:"))
            .expect("row line should exist");
        let count_col = row_line.rfind(' ').expect("padding between label and count");
        assert!(
            count_col >= LABEL_COLUMN_WIDTH,
            "label column should be padded to the shared width"
        );
    }

    #[test]
    fn test_json_serialization_carries_all_fields() {
        let report = sample_report(ScanStatus::FailedWithIssues, "SCA scan failed: 3 issues");

        let json = serde_json::to_string(&report).expect("JSON serialization should succeed");
        let parsed: serde_json::Value = serde_json::from_str(&json).expect("should parse JSON");

        assert_eq!(parsed["project"].as_str(), Some("storefront"));
        assert_eq!(parsed["status"].as_str(), Some("FailedWithIssues"));
        assert_eq!(parsed["headline"].as_str(), Some("SCA scan failed: 3 issues"));
        assert_eq!(
            parsed["rows"].as_array().expect("rows array").len(),
            2,
            "both rows should serialize"
        );
        assert_eq!(
            parsed["report_url"].as_str(),
            Some("https://app.harborscan.io/reports/analysis-42")
        );
    }
}
