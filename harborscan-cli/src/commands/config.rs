//! `harborscan config` command handler

use std::io::Write;
use std::path::Path;

use serde::Serialize;
use tracing::info;

use harborscan_core::config::HarborscanConfig;

use crate::cli::{ConfigAction, ConfigArgs};
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `config` command.
pub async fn execute(
    args: ConfigArgs,
    config_path: &Path,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    match args.action {
        ConfigAction::Validate => execute_validate(config_path, writer).await,
        ConfigAction::Show { section } => execute_show(config_path, section, writer).await,
    }
}

/// Load and validate the configuration file, reporting any errors.
///
/// # Errors
///
/// Returns `CliError::Config` if validation fails (missing fields,
/// invalid values, parse errors).
async fn execute_validate(config_path: &Path, writer: &OutputWriter) -> Result<(), CliError> {
    info!(path = %config_path.display(), "validating configuration");

    let result = HarborscanConfig::load(config_path).await;

    let report = match result {
        Ok(_) => ConfigValidationReport {
            source: config_path.display().to_string(),
            valid: true,
            errors: Vec::new(),
        },
        Err(e) => ConfigValidationReport {
            source: config_path.display().to_string(),
            valid: false,
            errors: vec![e.to_string()],
        },
    };

    writer.render(&report)?;

    if !report.valid {
        return Err(CliError::Config("configuration is invalid".to_owned()));
    }

    Ok(())
}

/// Load and display the effective configuration (file + defaults).
///
/// The API key is redacted before display.
///
/// # Errors
///
/// Returns `CliError::Config` if loading fails or `CliError::Command`
/// if the section name is unknown.
async fn execute_show(
    config_path: &Path,
    section: Option<String>,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    info!(path = %config_path.display(), "loading configuration");

    let mut config = HarborscanConfig::load(config_path).await?;
    redact_credentials(&mut config);

    let (section, views) = match section {
        None => (None, section_views(&config)?),
        Some(name) => {
            let views = match name.as_str() {
                "general" => section_views(&config.general)?,
                "server" => section_views(&config.server)?,
                "project" => section_views(&config.project)?,
                "scan" => section_views(&config.scan)?,
                _ => {
                    return Err(CliError::Command(format!(
                        "unknown section: {} (expected: general, server, project, scan)",
                        name
                    )));
                }
            };
            (Some(name), views)
        }
    };

    let report = ConfigReport {
        source: config_path.display().to_string(),
        section,
        config: views.1,
        config_toml: views.0,
    };

    writer.render(&report)?;

    Ok(())
}

/// TOML body for text rendering plus the structured value for JSON output.
fn section_views<T: Serialize>(value: &T) -> Result<(String, serde_json::Value), CliError> {
    let toml =
        toml::to_string_pretty(value).unwrap_or_else(|e| format!("(serialization error: {})", e));
    let json = serde_json::to_value(value)?;
    Ok((toml, json))
}

/// Mask the API key before display.
///
/// The key never needs to round-trip through `config show` output.
fn redact_credentials(config: &mut HarborscanConfig) {
    if !config.server.api_key.is_empty() {
        config.server.api_key = "***REDACTED***".to_owned();
    }
}

/// Configuration display report.
///
/// JSON output carries the structured `config` value; the TOML body is
/// text-only because embedding it in JSON would double-encode it.
#[derive(Serialize)]
pub struct ConfigReport {
    /// Configuration file path
    pub source: String,
    /// Optional section name (None = full config)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    /// Structured configuration (with redacted credentials)
    pub config: serde_json::Value,
    /// Serialized TOML configuration (with redacted credentials)
    #[serde(skip)]
    pub config_toml: String,
}

impl Render for ConfigReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        if let Some(ref section) = self.section {
            writeln!(
                w,
                "Configuration [{}] (source: {})",
                section.bold(),
                self.source
            )?;
        } else {
            writeln!(w, "Configuration (source: {})", self.source.bold())?;
        }

        writeln!(w)?;
        write!(w, "{}", self.config_toml)?;

        Ok(())
    }
}

/// Configuration validation report.
#[derive(Serialize)]
pub struct ConfigValidationReport {
    /// Configuration file path
    pub source: String,
    /// Whether the configuration is valid
    pub valid: bool,
    /// Validation error messages (empty if valid)
    pub errors: Vec<String>,
}

impl Render for ConfigValidationReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(w, "Configuration: {}", self.source.bold())?;

        if self.valid {
            writeln!(w, "  Status: {}", "VALID".green().bold())?;
        } else {
            writeln!(w, "  Status: {}", "INVALID".red().bold())?;
            for err in &self.errors {
                writeln!(w, "  Error: {}", err.red())?;
            }
        }

        Ok(())
    }
}
