//! Output formatting for CLI commands
//!
//! Results go to stdout, warnings and debug lines to stderr. In JSON mode
//! every stdout line is one JSON document so it can be piped into `jq`.

use serde::Serialize;

use crate::storage::FormatPreference;

/// Output format selected with `--format`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl From<FormatPreference> for OutputFormat {
    fn from(preference: FormatPreference) -> Self {
        match preference {
            FormatPreference::Text => OutputFormat::Text,
            FormatPreference::Json => OutputFormat::Json,
        }
    }
}

/// Where a command's results and diagnostics are written
pub struct Output {
    format: OutputFormat,
    verbose: bool,
}

impl Output {
    pub fn new(format: OutputFormat, verbose: bool) -> Self {
        Self { format, verbose }
    }

    /// Reports a completed change to the catalog
    pub fn success(&self, message: &str) {
        match self.format {
            OutputFormat::Text => println!("{}", message),
            OutputFormat::Json => print_json(&serde_json::json!({
                "success": true,
                "message": message,
            })),
        }
    }

    /// Reports a problem that does not stop the command
    pub fn warn(&self, message: &str) {
        match self.format {
            OutputFormat::Text => eprintln!("Warning: {}", message),
            OutputFormat::Json => {
                if let Ok(json) = serde_json::to_string(&serde_json::json!({ "warning": message })) {
                    eprintln!("{}", json);
                }
            }
        }
    }

    /// Prints a command result as a single JSON document.
    ///
    /// Text rendering is left to the caller, which checks [`Output::is_json`].
    pub fn data<T: Serialize>(&self, data: &T) {
        print_json(data);
    }

    pub fn is_json(&self) -> bool {
        self.format == OutputFormat::Json
    }

    /// Debug line on stderr, only with `--verbose`
    pub fn verbose(&self, message: &str) {
        if self.verbose {
            eprintln!("[verbose] {}", message);
        }
    }

    /// Debug line tagged with the step that produced it, only with `--verbose`
    pub fn verbose_ctx(&self, context: &str, message: &str) {
        if self.verbose {
            eprintln!("[verbose:{}] {}", context, message);
        }
    }
}

fn print_json<T: Serialize + ?Sized>(data: &T) {
    if let Ok(json) = serde_json::to_string(data) {
        println!("{}", json);
    }
}
