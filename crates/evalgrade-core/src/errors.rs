//! Error types for the grading pipeline.
//!
//! Only input loading and configuration can fail. Everything that goes wrong
//! while grading a single item is recorded in its report rows instead.

/// Errors raised while loading case inputs or building the pipeline.
#[derive(Debug, thiserror::Error)]
pub enum EvalError {
    /// A case file could not be read or written.
    #[error("i/o error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// A transcript line is not a valid turn object.
    #[error("invalid transcript entry on line {line}: {source}")]
    Transcript {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    /// The judge client could not be constructed.
    #[error("judge client error: {message}")]
    Client { message: String },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl EvalError {
    pub fn io(path: impl AsRef<std::path::Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().display().to_string(),
            source,
        }
    }
}

/// Configuration errors. Always fatal, detected before any judge call.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {message}")]
    Read { path: String, message: String },

    #[error("failed to parse config: {message}")]
    Parse { message: String },

    #[error("unsupported config version {found} (supported: {supported})")]
    UnsupportedVersion { found: u32, supported: u32 },

    #[error("invalid config: {message}")]
    Invalid { message: String },

    #[error("unknown aspect '{name}'")]
    UnknownAspect { name: String },

    #[error("no rubric registered for aspect '{aspect}' and item type '{item_type}'")]
    MissingRubric { aspect: String, item_type: String },
}

impl ConfigError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid {
            message: message.into(),
        }
    }
}

pub type Result<T, E = EvalError> = std::result::Result<T, E>;
