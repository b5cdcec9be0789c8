use colored::Colorize;
use profile_rollup_api::RollupError;
use std::fmt;
use std::process;

/// Exit codes for the CLI.
pub const EXIT_ERROR: i32 = 1;
pub const EXIT_USAGE: i32 = 2;

/// Unified error type for CLI operations.
pub enum CliError {
    /// Configuration, store or flow errors from the uploader.
    Rollup(RollupError),
    /// Unreadable or unparsable input.
    Input(String),
    /// The invocation ran and reported `UploadError`.
    Upload(String),
    /// Argument / usage errors.
    Usage(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Rollup(RollupError::Config(msg)) => write!(
                f,
                "{} {msg}\n  {} pass --bucket and credentials, or set PROFILE_ROLLUP_BUCKET, AWS_ACCESS_KEY_ID and AWS_SECRET_ACCESS_KEY",
                "error:".red().bold(),
                "help:".cyan().bold(),
            ),
            CliError::Rollup(e) => write!(f, "{} {e}", "error:".red().bold()),
            CliError::Input(msg) => write!(f, "{} {msg}", "error:".red().bold()),
            CliError::Upload(msg) => write!(f, "{} {msg}", "error:".red().bold()),
            CliError::Usage(msg) => write!(f, "{} {msg}", "error:".red().bold()),
        }
    }
}

impl fmt::Debug for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl From<RollupError> for CliError {
    fn from(e: RollupError) -> Self {
        CliError::Rollup(e)
    }
}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        CliError::Input(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Input(format!("JSON parse error: {e}"))
    }
}

/// Print error and exit with the appropriate code.
pub fn exit_with_error(err: CliError) -> ! {
    eprintln!("{err}");
    let code = match &err {
        CliError::Usage(_) => EXIT_USAGE,
        _ => EXIT_ERROR,
    };
    process::exit(code)
}

pub type CliResult<T> = std::result::Result<T, CliError>;
