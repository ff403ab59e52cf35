use crate::splitter::SplitOutcome;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SplitError {
    #[error("Input file not found: {}", .path.display())]
    MissingInput { path: PathBuf },

    #[error("Input file is empty: {}", .path.display())]
    EmptyInput { path: PathBuf },

    #[error("Could not decode {} with any candidate encoding ({})", .path.display(), .tried.join(", "))]
    UnreadableEncoding { path: PathBuf, tried: Vec<String> },

    #[error("Failed to write {}: {source}", .path.display())]
    WriteFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Output file already exists: {}", .path.display())]
    OutputExists { path: PathBuf },

    #[error("Failed to delete original {}: {source}", .path.display())]
    DeleteFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
        /// Set when both halves were already written.
        outcome: Option<Box<SplitOutcome>>,
    },

    #[error("Unknown encoding label: {label}")]
    UnknownEncoding { label: String },

    #[error("Encoding label {label} resolves to {encoding}, which cannot be written back")]
    UnsupportedEncoding { label: String, encoding: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("IO operation failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Operation was cancelled by user")]
    Cancelled,
}

impl SplitError {
    /// Missing and empty inputs are skips, not failures.
    pub fn is_skip(&self) -> bool {
        matches!(
            self,
            SplitError::MissingInput { .. } | SplitError::EmptyInput { .. }
        )
    }

    /// The halves that were written before the item failed, if any.
    pub fn written_outcome(&self) -> Option<&SplitOutcome> {
        match self {
            SplitError::DeleteFailure { outcome, .. } => outcome.as_deref(),
            _ => None,
        }
    }

    /// Short machine-readable name used in JSON reports.
    pub fn kind(&self) -> &'static str {
        match self {
            SplitError::MissingInput { .. } => "missing_input",
            SplitError::EmptyInput { .. } => "empty_input",
            SplitError::UnreadableEncoding { .. } => "unreadable_encoding",
            SplitError::WriteFailure { .. } => "write_failure",
            SplitError::OutputExists { .. } => "output_exists",
            SplitError::DeleteFailure { .. } => "delete_failure",
            SplitError::UnknownEncoding { .. } => "unknown_encoding",
            SplitError::UnsupportedEncoding { .. } => "unsupported_encoding",
            SplitError::Config { .. } => "config",
            SplitError::Io(_) => "io",
            SplitError::Cancelled => "cancelled",
        }
    }
}

pub trait UserFriendlyError {
    fn user_message(&self) -> String;
    fn suggestion(&self) -> Option<String>;
}

impl UserFriendlyError for SplitError {
    fn user_message(&self) -> String {
        match self {
            SplitError::MissingInput { path } => {
                format!("{} not found, skipping", path.display())
            }
            SplitError::EmptyInput { path } => {
                format!("{} has no header line, skipping", path.display())
            }
            SplitError::UnreadableEncoding { path, .. } => {
                format!("Could not read {}, skipping", path.display())
            }
            SplitError::WriteFailure { path, source } => {
                format!("Could not write {}: {}", path.display(), source)
            }
            SplitError::OutputExists { path } => {
                format!("Refusing to overwrite existing {}", path.display())
            }
            SplitError::DeleteFailure { path, source, .. } => {
                format!(
                    "Both halves were written but {} could not be deleted: {}",
                    path.display(),
                    source
                )
            }
            SplitError::UnknownEncoding { label } => {
                format!("Unknown encoding: {}", label)
            }
            SplitError::UnsupportedEncoding { label, encoding } => {
                format!("Encoding '{}' ({}) cannot be used for splitting", label, encoding)
            }
            SplitError::Config { message } => {
                format!("Configuration error: {}", message)
            }
            _ => self.to_string(),
        }
    }

    fn suggestion(&self) -> Option<String> {
        match self {
            SplitError::MissingInput { .. } => Some(
                "Check --directory and --pattern, or remove the tag from --tags.".to_string()
            ),
            SplitError::UnreadableEncoding { .. } => Some(
                "Add an encoding that fits the file with --encodings, or drop --strict to allow replacement characters.".to_string()
            ),
            SplitError::OutputExists { .. } => Some(
                "Remove the existing halves or run without --no-clobber.".to_string()
            ),
            SplitError::DeleteFailure { .. } => Some(
                "The original is still in place next to its halves. Close any program holding it open and delete it manually.".to_string()
            ),
            SplitError::UnknownEncoding { .. } | SplitError::UnsupportedEncoding { .. } => Some(
                "Use WHATWG encoding labels such as utf-8, windows-1252, iso-8859-15 or x-user-defined.".to_string()
            ),
            SplitError::Config { .. } => Some(
                "Check your configuration file syntax and ensure all required fields are present.".to_string()
            ),
            _ => None,
        }
    }
}

impl From<toml::de::Error> for SplitError {
    fn from(error: toml::de::Error) -> Self {
        SplitError::Config {
            message: error.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SplitError>;
