//! CLI-specific error types and exit code mapping

use harborscan_core::error::{ApiError, HarborscanError};
use harborscan_engine::EngineError;

/// CLI-specific error type.
///
/// Each variant carries enough context for a user-friendly message.
/// The `exit_code()` method maps errors to standard Unix exit codes.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Configuration loading or validation failure.
    #[error("configuration error: {0}")]
    Config(String),

    /// A subcommand-specific operation failed.
    #[error("{0}")]
    Command(String),

    /// JSON serialisation failed during output rendering.
    #[error("json output error: {0}")]
    JsonSerialize(#[from] serde_json::Error),

    /// IO error (file read, stdout write, etc.).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Wrapped domain error from harborscan-core.
    #[error("{0}")]
    Core(#[from] HarborscanError),

    /// Scan engine failure before a result was reached.
    #[error("scan error: {0}")]
    Scan(String),

    /// The scan ran to an end state other than passing.
    #[error("scan failed: {0}")]
    ScanFailed(String),
}

impl CliError {
    /// Map the error to a process exit code.
    ///
    /// | Code | Meaning                               |
    /// |------|---------------------------------------|
    /// | 0    | Success                               |
    /// | 1    | General / command error               |
    /// | 2    | Configuration error                   |
    /// | 4    | Scan ended without passing            |
    /// | 10   | IO error                              |
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) => 2,
            Self::Core(HarborscanError::Config(_)) => 2,
            Self::ScanFailed(_) => 4,
            Self::Io(_) => 10,
            Self::JsonSerialize(_) | Self::Command(_) | Self::Core(_) | Self::Scan(_) => 1,
        }
    }
}

impl From<EngineError> for CliError {
    fn from(e: EngineError) -> Self {
        Self::Scan(e.to_string())
    }
}

impl From<ApiError> for CliError {
    fn from(e: ApiError) -> Self {
        Self::Core(HarborscanError::Api(e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_code_config_error() {
        let err = CliError::Config("test error".to_owned());
        assert_eq!(err.exit_code(), 2, "config error should return exit code 2");
    }

    #[test]
    fn test_exit_code_core_config_error() {
        use harborscan_core::error::ConfigError;
        let err = CliError::Core(HarborscanError::Config(ConfigError::FileNotFound {
            path: "harborscan.toml".to_owned(),
        }));
        assert_eq!(
            err.exit_code(),
            2,
            "core config error should return exit code 2"
        );
    }

    #[test]
    fn test_exit_code_scan_failed() {
        let err = CliError::ScanFailed("SCA scan failed with issues".to_owned());
        assert_eq!(err.exit_code(), 4, "failed scan should return exit code 4");
    }

    #[test]
    fn test_exit_code_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = CliError::Io(io_err);
        assert_eq!(err.exit_code(), 10, "io error should return exit code 10");
    }

    #[test]
    fn test_exit_code_command_error() {
        let err = CliError::Command("test error".to_owned());
        assert_eq!(
            err.exit_code(),
            1,
            "command error should return exit code 1"
        );
    }

    #[test]
    fn test_exit_code_scan_engine_error() {
        let err = CliError::Scan("upload failed".to_owned());
        assert_eq!(err.exit_code(), 1, "engine error should return exit code 1");
    }

    #[test]
    fn test_exit_code_core_api_error() {
        use harborscan_core::error::ApiError;
        let err = CliError::Core(HarborscanError::Api(ApiError::Status {
            status: 500,
            message: "server error".to_owned(),
        }));
        assert_eq!(err.exit_code(), 1, "api error should return exit code 1");
    }

    #[test]
    fn test_error_display_config() {
        let err = CliError::Config("invalid TOML syntax".to_owned());
        let display_str = format!("{}", err);
        assert!(
            display_str.contains("configuration error"),
            "should include error context"
        );
        assert!(
            display_str.contains("invalid TOML syntax"),
            "should include error message"
        );
    }

    #[test]
    fn test_error_display_scan_failed() {
        let err = CliError::ScanFailed("SCA scan errored".to_owned());
        let display_str = format!("{}", err);
        assert!(display_str.contains("scan failed"));
        assert!(display_str.contains("SCA scan errored"));
    }

    #[test]
    fn test_from_engine_error() {
        let engine_err = EngineError::MissingParameter {
            field: "client_id".to_owned(),
        };
        let cli_err: CliError = engine_err.into();
        match cli_err {
            CliError::Scan(msg) => {
                assert!(msg.contains("client_id"), "should carry the field name");
            }
            _ => panic!("expected Scan error variant"),
        }
    }

    #[test]
    fn test_from_api_error() {
        let api_err = ApiError::Status {
            status: 401,
            message: "unauthorized".to_owned(),
        };
        let cli_err: CliError = api_err.into();
        match cli_err {
            CliError::Core(HarborscanError::Api(_)) => {}
            _ => panic!("expected Core(Api) error variant"),
        }
        let cli_err: CliError = ApiError::Decode {
            reason: "truncated body".to_owned(),
        }
        .into();
        assert_eq!(cli_err.exit_code(), 1, "api error should return exit code 1");
    }

    #[test]
    fn test_from_core_error() {
        use harborscan_core::error::ConfigError;
        let config_err = ConfigError::ParseFailed {
            reason: "bad toml".to_owned(),
        };
        let core_err = HarborscanError::Config(config_err);
        let cli_err: CliError = core_err.into();
        match cli_err {
            CliError::Core(_) => {}
            _ => panic!("expected Core error variant"),
        }
    }
}
