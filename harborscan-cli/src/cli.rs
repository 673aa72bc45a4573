//! CLI argument parsing using clap derive API
//!
//! This module defines the command-line interface structure using clap's derive macros.
//! It is purely declarative with no side effects or I/O.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Harborscan -- dependency scan client for the Harborscan service.
///
/// Use `harborscan <COMMAND> --help` for subcommand details.
#[derive(Parser, Debug)]
#[command(name = "harborscan", version, about, long_about = None)]
pub struct Cli {
    /// Path to the harborscan.toml configuration file.
    #[arg(short, long, default_value = "harborscan.toml")]
    pub config: PathBuf,

    /// Override log level (trace, debug, info, warn, error).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Output format.
    #[arg(long, global = true, default_value = "text")]
    pub output: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Supported output formats.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table / text output.
    Text,
    /// Machine-readable JSON.
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a dependency scan and wait for the result.
    Scan(ScanArgs),

    /// List manifest formats supported by the scan server.
    Formats(FormatsArgs),

    /// Manage configuration.
    Config(ConfigArgs),
}

// ---- scan ----

/// Run a scan against the configured project and poll until it ends.
#[derive(Args, Debug)]
pub struct ScanArgs {
    /// Source directory to discover manifests in (overrides config).
    #[arg(long)]
    pub source_dir: Option<PathBuf>,

    /// Branch name to attach to the scan (overrides config).
    #[arg(long)]
    pub branch: Option<String>,

    /// Commit hash to attach to the scan (overrides config).
    #[arg(long)]
    pub commit: Option<String>,

    /// Generate hash manifests for archive files.
    #[arg(long)]
    pub hash_files: bool,

    /// Write the scan outcome as a JSON artifact in the output directory.
    #[arg(long)]
    pub export_report: bool,
}

// ---- formats ----

/// List the manifest formats the scan server accepts.
#[derive(Args, Debug)]
pub struct FormatsArgs {
    /// Include archive hashing rules in the listing.
    #[arg(long)]
    pub hashable: bool,
}

// ---- config ----

/// Manage harborscan configuration.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Validate the configuration file and report errors.
    Validate,
    /// Show the effective configuration (file + env overrides + defaults).
    Show {
        /// Show only a specific section (general, server, project, scan).
        #[arg(long)]
        section: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_parse_scan_defaults() {
        let args = Cli::try_parse_from(["harborscan", "scan"]);
        assert!(args.is_ok(), "should parse 'scan' subcommand");
        let cli = args.expect("parse succeeded");
        match cli.command {
            Commands::Scan(scan_args) => {
                assert!(scan_args.source_dir.is_none(), "source_dir should be None");
                assert!(scan_args.branch.is_none(), "branch should be None");
                assert!(!scan_args.hash_files, "hash_files should default to false");
                assert!(
                    !scan_args.export_report,
                    "export_report should default to false"
                );
            }
            _ => panic!("expected Scan command"),
        }
    }

    #[test]
    fn test_cli_parse_scan_with_source_dir() {
        let args = Cli::try_parse_from(["harborscan", "scan", "--source-dir", "/src/app"]);
        assert!(args.is_ok(), "should parse scan with source-dir");
        let cli = args.expect("parse succeeded");
        match cli.command {
            Commands::Scan(scan_args) => {
                assert_eq!(
                    scan_args.source_dir,
                    Some(std::path::PathBuf::from("/src/app")),
                    "source_dir should match"
                );
            }
            _ => panic!("expected Scan command"),
        }
    }

    #[test]
    fn test_cli_parse_scan_with_branch_and_commit() {
        let args = Cli::try_parse_from([
            "harborscan",
            "scan",
            "--branch",
            "release/1.4",
            "--commit",
            "4f2b9d1",
        ]);
        assert!(args.is_ok(), "should parse scan with branch and commit");
        let cli = args.expect("parse succeeded");
        match cli.command {
            Commands::Scan(scan_args) => {
                assert_eq!(scan_args.branch, Some("release/1.4".to_owned()));
                assert_eq!(scan_args.commit, Some("4f2b9d1".to_owned()));
            }
            _ => panic!("expected Scan command"),
        }
    }

    #[test]
    fn test_cli_parse_scan_hash_files_flag() {
        let args = Cli::try_parse_from(["harborscan", "scan", "--hash-files"]);
        assert!(args.is_ok(), "should parse scan with hash-files");
        let cli = args.expect("parse succeeded");
        match cli.command {
            Commands::Scan(scan_args) => {
                assert!(scan_args.hash_files, "hash_files should be true");
            }
            _ => panic!("expected Scan command"),
        }
    }

    #[test]
    fn test_cli_parse_scan_export_report_flag() {
        let args = Cli::try_parse_from(["harborscan", "scan", "--export-report"]);
        assert!(args.is_ok(), "should parse scan with export-report");
        let cli = args.expect("parse succeeded");
        match cli.command {
            Commands::Scan(scan_args) => {
                assert!(scan_args.export_report, "export_report should be true");
            }
            _ => panic!("expected Scan command"),
        }
    }

    #[test]
    fn test_cli_parse_formats_basic() {
        let args = Cli::try_parse_from(["harborscan", "formats"]);
        assert!(args.is_ok(), "should parse 'formats' subcommand");
        let cli = args.expect("parse succeeded");
        match cli.command {
            Commands::Formats(formats_args) => {
                assert!(
                    !formats_args.hashable,
                    "hashable should default to false"
                );
            }
            _ => panic!("expected Formats command"),
        }
    }

    #[test]
    fn test_cli_parse_formats_hashable() {
        let args = Cli::try_parse_from(["harborscan", "formats", "--hashable"]);
        assert!(args.is_ok(), "should parse formats with hashable flag");
        let cli = args.expect("parse succeeded");
        match cli.command {
            Commands::Formats(formats_args) => {
                assert!(formats_args.hashable, "hashable should be true");
            }
            _ => panic!("expected Formats command"),
        }
    }

    #[test]
    fn test_cli_parse_config_validate() {
        let args = Cli::try_parse_from(["harborscan", "config", "validate"]);
        assert!(args.is_ok(), "should parse 'config validate' subcommand");
        let cli = args.expect("parse succeeded");
        match cli.command {
            Commands::Config(config_args) => match config_args.action {
                ConfigAction::Validate => {}
                _ => panic!("expected Validate action"),
            },
            _ => panic!("expected Config command"),
        }
    }

    #[test]
    fn test_cli_parse_config_show() {
        let args = Cli::try_parse_from(["harborscan", "config", "show"]);
        assert!(args.is_ok(), "should parse 'config show' subcommand");
        let cli = args.expect("parse succeeded");
        match cli.command {
            Commands::Config(config_args) => match config_args.action {
                ConfigAction::Show { section } => {
                    assert!(section.is_none(), "section should be None");
                }
                _ => panic!("expected Show action"),
            },
            _ => panic!("expected Config command"),
        }
    }

    #[test]
    fn test_cli_parse_config_show_section() {
        let args = Cli::try_parse_from(["harborscan", "config", "show", "--section", "server"]);
        assert!(args.is_ok(), "should parse config show with section");
        let cli = args.expect("parse succeeded");
        match cli.command {
            Commands::Config(config_args) => match config_args.action {
                ConfigAction::Show { section } => {
                    assert_eq!(section, Some("server".to_owned()));
                }
                _ => panic!("expected Show action"),
            },
            _ => panic!("expected Config command"),
        }
    }

    #[test]
    fn test_cli_parse_custom_config_path() {
        let args = Cli::try_parse_from(["harborscan", "-c", "/custom/config.toml", "formats"]);
        assert!(args.is_ok(), "should parse with custom config path");
        let cli = args.expect("parse succeeded");
        assert_eq!(cli.config, std::path::PathBuf::from("/custom/config.toml"));
    }

    #[test]
    fn test_cli_parse_log_level() {
        let args = Cli::try_parse_from(["harborscan", "--log-level", "debug", "formats"]);
        assert!(args.is_ok(), "should parse with custom log level");
        let cli = args.expect("parse succeeded");
        assert_eq!(cli.log_level, Some("debug".to_owned()));
    }

    #[test]
    fn test_cli_parse_output_format_json() {
        let args = Cli::try_parse_from(["harborscan", "--output", "json", "formats"]);
        assert!(args.is_ok(), "should parse with json output format");
        let cli = args.expect("parse succeeded");
        match cli.output {
            OutputFormat::Json => {}
            _ => panic!("expected Json output format"),
        }
    }

    #[test]
    fn test_cli_parse_output_format_text() {
        let args = Cli::try_parse_from(["harborscan", "--output", "text", "formats"]);
        assert!(args.is_ok(), "should parse with text output format");
        let cli = args.expect("parse succeeded");
        match cli.output {
            OutputFormat::Text => {}
            _ => panic!("expected Text output format"),
        }
    }

    #[test]
    fn test_cli_parse_invalid_command_fails() {
        let args = Cli::try_parse_from(["harborscan", "invalid-command"]);
        assert!(args.is_err(), "should fail on invalid command");
    }

    #[test]
    fn test_cli_parse_missing_command_fails() {
        let args = Cli::try_parse_from(["harborscan"]);
        assert!(args.is_err(), "should fail when no command provided");
    }

    #[test]
    fn test_cli_verify_command_structure() {
        // Verify CLI command compiles and has expected structure
        let cmd = Cli::command();
        assert_eq!(cmd.get_name(), "harborscan");

        let subcommands: Vec<_> = cmd.get_subcommands().map(|s| s.get_name()).collect();
        assert!(
            subcommands.contains(&"scan"),
            "should have 'scan' subcommand"
        );
        assert!(
            subcommands.contains(&"formats"),
            "should have 'formats' subcommand"
        );
        assert!(
            subcommands.contains(&"config"),
            "should have 'config' subcommand"
        );
    }
}
