//! Binary entry point for the apistub CLI.
//!
//! ## Usage
//!
//! ```bash
//! # Render a module descriptor as a JSON token document
//! apistub generate --input models.json
//!
//! # Plain text, including private members, written to a file
//! apistub generate --input models.json --format text --include-private --output models.txt
//!
//! # List what could not be rendered faithfully
//! apistub diagnostics --input models.json
//!
//! # Structured JSON logs on stderr
//! apistub --log-format json --log-level debug generate --input models.json
//! ```

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};

use apistub::cli::{run_diagnostics, run_generate};
use apistub::config::{CliOverrides, OutputFormat};
use apistub::error::{ApiStubError, OutputErrorCode};
use apistub::output::{emit_response, ErrorResponse};

// ============================================================================
// CLI Structure
// ============================================================================

/// Public API surface extraction.
///
/// Turns a module descriptor into a deterministic, diffable token stream.
#[derive(Parser, Debug)]
#[command(name = "apistub", version, about = "Public API surface extraction")]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,
    #[command(subcommand)]
    command: Command,
}

/// Global arguments shared by all subcommands.
#[derive(Parser, Debug)]
struct GlobalArgs {
    /// Log level for tracing output.
    #[arg(long, global = true, value_enum, default_value = "warn")]
    log_level: LogLevel,

    /// Format of log lines on stderr.
    #[arg(long, global = true, value_enum, default_value = "text")]
    log_format: LogFormat,

    /// Root namespace of the package (default: first segment of the module name).
    #[arg(long, global = true)]
    pkg_root: Option<String>,

    /// Keep members whose names start with an underscore.
    #[arg(long, global = true)]
    include_private: bool,
}

impl GlobalArgs {
    fn overrides(&self, format: Option<OutputFormat>) -> CliOverrides {
        CliOverrides {
            pkg_root: self.pkg_root.clone(),
            format,
            include_private: self.include_private.then_some(true),
        }
    }
}

/// Log level for tracing output.
#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    fn to_tracing_level(self) -> tracing::Level {
        match self {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

/// Log line format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    /// Human-readable lines.
    Text,
    /// One JSON object per event.
    Json,
}

/// CLI subcommands.
#[derive(Subcommand, Debug)]
enum Command {
    /// Build the declaration tree and render its token stream.
    Generate {
        /// Module descriptor (JSON).
        #[arg(long)]
        input: PathBuf,

        /// Output format (default: json, or the project config value).
        #[arg(long, value_enum)]
        format: Option<OutputFormat>,

        /// Write output here instead of stdout.
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Print the problems recorded on each node.
    Diagnostics {
        /// Module descriptor (JSON).
        #[arg(long)]
        input: PathBuf,
    },
}

// ============================================================================
// Main Entry Point
// ============================================================================

fn main() -> ExitCode {
    let cli = Cli::parse();

    init_tracing(cli.global.log_level, cli.global.log_format);

    match execute(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let error_code = OutputErrorCode::from(&err);
            let response = ErrorResponse::from_error(&err);

            // Errors go to stdout as JSON, logs stay on stderr
            let _ = emit_response(&response, &mut io::stdout());
            let _ = io::stdout().flush();

            ExitCode::from(error_code.code())
        }
    }
}

/// Initialize tracing subscriber.
fn init_tracing(level: LogLevel, format: LogFormat) {
    use tracing_subscriber::fmt::format::FmtSpan;
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.to_tracing_level().to_string()));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_span_events(FmtSpan::CLOSE)
        .with_target(false)
        .with_writer(io::stderr);

    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

/// Execute the CLI command.
fn execute(cli: Cli) -> Result<(), ApiStubError> {
    match cli.command {
        Command::Generate {
            input,
            format,
            output,
        } => execute_generate(&cli.global, &input, format, output.as_deref()),
        Command::Diagnostics { input } => execute_diagnostics(&cli.global, &input),
    }
}

// ============================================================================
// Command Executors
// ============================================================================

fn execute_generate(
    global: &GlobalArgs,
    input: &Path,
    format: Option<OutputFormat>,
    output: Option<&Path>,
) -> Result<(), ApiStubError> {
    let rendered = run_generate(input, &global.overrides(format))?;
    match output {
        Some(path) => {
            let mut text = rendered;
            if !text.ends_with('\n') {
                text.push('\n');
            }
            fs::write(path, text).map_err(|e| ApiStubError::io(path.display(), e))?;
            tracing::info!("wrote {}", path.display());
        }
        None => {
            let mut stdout = io::stdout();
            write!(stdout, "{}", rendered).map_err(|e| ApiStubError::io("<stdout>", e))?;
            if !rendered.ends_with('\n') {
                writeln!(stdout).map_err(|e| ApiStubError::io("<stdout>", e))?;
            }
        }
    }
    Ok(())
}

fn execute_diagnostics(global: &GlobalArgs, input: &Path) -> Result<(), ApiStubError> {
    let mut stdout = io::stdout();
    let count = run_diagnostics(input, &global.overrides(None), &mut stdout)?;
    tracing::debug!("{} diagnostic(s)", count);
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    mod cli_parsing {
        use super::*;

        #[test]
        fn parse_generate_defaults() {
            let cli = Cli::try_parse_from(["apistub", "generate", "--input", "m.json"]).unwrap();
            match cli.command {
                Command::Generate {
                    input,
                    format,
                    output,
                } => {
                    assert_eq!(input, PathBuf::from("m.json"));
                    assert_eq!(format, None);
                    assert_eq!(output, None);
                }
                _ => panic!("expected Generate"),
            }
            assert!(matches!(cli.global.log_level, LogLevel::Warn));
            assert_eq!(cli.global.log_format, LogFormat::Text);
            assert!(!cli.global.include_private);
        }

        #[test]
        fn parse_generate_all_flags() {
            let args = [
                "apistub",
                "--log-level",
                "debug",
                "generate",
                "--input",
                "m.json",
                "--format",
                "text",
                "--pkg-root",
                "azure",
                "--include-private",
                "--output",
                "out.txt",
            ];
            let cli = Cli::try_parse_from(args).unwrap();
            assert!(matches!(cli.global.log_level, LogLevel::Debug));
            assert_eq!(cli.global.pkg_root.as_deref(), Some("azure"));
            let overrides = cli.global.overrides(Some(OutputFormat::Text));
            assert_eq!(overrides.include_private, Some(true));
            match cli.command {
                Command::Generate { format, output, .. } => {
                    assert_eq!(format, Some(OutputFormat::Text));
                    assert_eq!(output, Some(PathBuf::from("out.txt")));
                }
                _ => panic!("expected Generate"),
            }
        }

        #[test]
        fn parse_diagnostics() {
            let args = ["apistub", "diagnostics", "--input", "m.json"];
            let cli = Cli::try_parse_from(args).unwrap();
            assert!(matches!(cli.command, Command::Diagnostics { .. }));
            assert_eq!(cli.global.overrides(None).include_private, None);
        }

        #[test]
        fn generate_requires_input() {
            assert!(Cli::try_parse_from(["apistub", "generate"]).is_err());
        }

        #[test]
        fn rejects_unknown_format() {
            let args = ["apistub", "generate", "--input", "m", "--format", "yaml"];
            assert!(Cli::try_parse_from(args).is_err());
        }

        #[test]
        fn parse_json_log_format() {
            let args = ["apistub", "--log-format=json", "generate", "--input", "m"];
            let cli = Cli::try_parse_from(args).unwrap();
            assert_eq!(cli.global.log_format, LogFormat::Json);
        }

        #[test]
        fn rejects_unknown_log_format() {
            let args = ["apistub", "--log-format=xml", "generate", "--input", "m"];
            assert!(Cli::try_parse_from(args).is_err());
        }
    }

    mod log_level {
        use super::*;

        #[test]
        fn maps_to_tracing_levels() {
            assert_eq!(LogLevel::Trace.to_tracing_level(), tracing::Level::TRACE);
            assert_eq!(LogLevel::Warn.to_tracing_level(), tracing::Level::WARN);
            assert_eq!(LogLevel::Error.to_tracing_level(), tracing::Level::ERROR);
        }
    }
}
