//! `harborscan formats` command handler

use std::io::Write;
use std::path::Path;

use serde::Serialize;
use tracing::info;

use harborscan_core::config::HarborscanConfig;
use harborscan_engine::api::dto::ScanFileFormat;
use harborscan_engine::{HttpScanApi, ScanApi};

use crate::cli::FormatsArgs;
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `formats` command.
pub async fn execute(
    args: FormatsArgs,
    config_path: &Path,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let config = HarborscanConfig::load(config_path).await?;

    let api = HttpScanApi::new(config.server.base_url.clone(), config.server.api_key.clone())?;

    info!(client_id = %config.server.client_id, "fetching supported scan file formats");
    let formats = api
        .get_supported_scan_file_formats(&config.server.client_id)
        .await?;

    let report = build_formats_report(&formats, args.hashable);
    writer.render(&report)?;

    Ok(())
}

fn build_formats_report(formats: &[ScanFileFormat], include_hashable: bool) -> FormatsReport {
    let manifests = formats
        .iter()
        .map(|format| {
            let patterns = format
                .manifests
                .iter()
                .filter(|m| !m.is_lock_file)
                .map(|m| m.pattern.clone())
                .collect();
            let lock_files = format
                .manifests
                .iter()
                .filter(|m| m.is_lock_file)
                .map(|m| m.pattern.clone())
                .collect();
            ManifestFormatEntry {
                package_manager: format.package_manager.clone(),
                patterns,
                lock_files,
            }
        })
        .collect();

    let hashable = include_hashable.then(|| {
        formats
            .iter()
            .filter(|format| !format.hashable_files.is_empty())
            .map(|format| {
                let mut extensions = Vec::new();
                let mut algorithms = Vec::new();
                for hashable in &format.hashable_files {
                    extensions.extend(hashable.archive_file_extensions.iter().cloned());
                    for spec in &hashable.hash_algorithms {
                        algorithms.push(format!(
                            "{} ({}/{})",
                            spec.hash_algorithm, spec.buffer_encoding, spec.digest_encoding
                        ));
                    }
                }
                HashableFormatEntry {
                    package_manager: format.package_manager.clone(),
                    extensions,
                    algorithms,
                }
            })
            .collect()
    });

    FormatsReport {
        manifests,
        hashable,
    }
}

/// Supported manifest formats as reported by the scan server.
#[derive(Serialize)]
pub struct FormatsReport {
    pub manifests: Vec<ManifestFormatEntry>,
    /// Present only when `--hashable` is passed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hashable: Option<Vec<HashableFormatEntry>>,
}

#[derive(Serialize)]
pub struct ManifestFormatEntry {
    pub package_manager: String,
    pub patterns: Vec<String>,
    pub lock_files: Vec<String>,
}

#[derive(Serialize)]
pub struct HashableFormatEntry {
    pub package_manager: String,
    pub extensions: Vec<String>,
    pub algorithms: Vec<String>,
}

impl Render for FormatsReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(w, "{}", "Supported Manifest Formats".bold())?;

        if self.manifests.is_empty() {
            writeln!(w, "No supported formats returned by the server.")?;
            return Ok(());
        }

        writeln!(
            w,
            "{:<18} {:<38} Lock Files",
            "Package Manager", "Manifest Patterns"
        )?;
        writeln!(w, "{}", "-".repeat(80))?;

        for entry in &self.manifests {
            writeln!(
                w,
                "{:<18} {:<38} {}",
                entry.package_manager,
                entry.patterns.join(", "),
                entry.lock_files.join(", ")
            )?;
        }

        if let Some(ref hashable) = self.hashable {
            writeln!(w)?;
            writeln!(w, "{}", "Hashable Archives".bold())?;

            if hashable.is_empty() {
                writeln!(w, "No hashable archive formats returned by the server.")?;
                return Ok(());
            }

            writeln!(
                w,
                "{:<18} {:<28} Algorithms",
                "Package Manager", "Extensions"
            )?;
            writeln!(w, "{}", "-".repeat(80))?;

            for entry in hashable {
                writeln!(
                    w,
                    "{:<18} {:<28} {}",
                    entry.package_manager,
                    entry.extensions.join(", "),
                    entry.algorithms.join(", ")
                )?;
            }
        }

        Ok(())
    }
}
