use checkvault_core_types::TickId;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type alias using ExError
pub type Result<T> = std::result::Result<T, ExError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Every failure a backup tick can hit is classified into one of these kinds.
/// The first four are the pipeline taxonomy that the scheduler reports on; the
/// rest cover configuration and coordination problems detected before or
/// around a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Pipeline taxonomy
    /// The store could not be opened or the principal was rejected
    StoreUnreachable,
    /// The native snapshot command failed or produced nothing
    ExportFailure,
    /// Directory creation, listing, deletion, or descriptor write failed
    Filesystem,
    /// Anything not classified above, including a panic inside a tick
    Unexpected,

    // Setup
    InvalidConfig,
    InvalidSchedule,
    AlreadyExists,

    // Coordination
    TickInProgress,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::StoreUnreachable => "ERR_STORE_UNREACHABLE",
            ExErrorKind::ExportFailure => "ERR_EXPORT_FAILURE",
            ExErrorKind::Filesystem => "ERR_FILESYSTEM",
            ExErrorKind::Unexpected => "ERR_UNEXPECTED",
            ExErrorKind::InvalidConfig => "ERR_INVALID_CONFIG",
            ExErrorKind::InvalidSchedule => "ERR_INVALID_SCHEDULE",
            ExErrorKind::AlreadyExists => "ERR_ALREADY_EXISTS",
            ExErrorKind::TickInProgress => "ERR_TICK_IN_PROGRESS",
        }
    }
}

/// Canonical structured error type
///
/// Carries a kind for programmatic handling plus the context an operator
/// needs to diagnose a failed tick from the logs alone.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    path: Option<PathBuf>,
    tick_id: Option<TickId>,
    message: String,
    source: Option<Box<ExError>>,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            path: None,
            tick_id: None,
            message: String::new(),
            source: None,
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add the filesystem path involved
    pub fn with_path(mut self, path: impl AsRef<Path>) -> Self {
        self.path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Add tick correlation
    pub fn with_tick_id(mut self, tick_id: TickId) -> Self {
        self.tick_id = Some(tick_id);
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Add source error
    pub fn with_source(mut self, source: ExError) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Get the error kind
    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    /// Get the operation context, if any
    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    /// Get the path context, if any
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Get the tick correlation, if any
    pub fn tick_id(&self) -> Option<&TickId> {
        self.tick_id.as_ref()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the source error, if any
    pub fn source_error(&self) -> Option<&ExError> {
        self.source.as_deref()
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(path) = &self.path {
            write!(f, " (path: {})", path.display())?;
        }
        if let Some(tick_id) = &self.tick_id {
            write!(f, " (tick_id: {})", tick_id)?;
        }
        if let Some(source) = &self.source {
            write!(f, "; caused by {}", source)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|s| s as &(dyn std::error::Error + 'static))
    }
}

// ========== End Error Facility ==========

/// Errors raised while loading or validating configuration
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Failed to load configuration: {reason}")]
    Load { reason: String },

    #[error("Invalid value for '{field}': {reason}")]
    InvalidField { field: String, reason: String },
}

impl From<ConfigError> for ExError {
    fn from(err: ConfigError) -> Self {
        let message = err.to_string();
        match err {
            ConfigError::Load { .. } => ExError::new(ExErrorKind::InvalidConfig)
                .with_op("config_load")
                .with_message(message),
            ConfigError::InvalidField { .. } => ExError::new(ExErrorKind::InvalidConfig)
                .with_op("config_validate")
                .with_message(message),
        }
    }
}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::Load {
            reason: err.to_string(),
        }
    }
}
