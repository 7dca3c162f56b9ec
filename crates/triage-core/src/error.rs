//! Error taxonomy for the simulation core.
//!
//! Field-level failures ([`FieldError`], [`FormErrors`]) are recovered locally
//! and shown next to the originating input. Storage corruption is recovered by
//! discarding the record. Unknown routes and guard violations are not errors
//! at all: they resolve to a well-defined route.

use std::fmt;

use thiserror::Error;

// ---------------------------------------------------------------------------
// Field-tagged errors
// ---------------------------------------------------------------------------

/// A failure tagged to one input field, for inline display.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Ordered collection of field errors produced by one form submission.
///
/// A field appears at most once; the first message recorded for it wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormErrors {
    entries: Vec<FieldError>,
}

impl FormErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an error for `field` unless one is already present.
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        if self.get(field).is_none() {
            self.entries.push(FieldError::new(field, message));
        }
    }

    /// Message recorded for `field`, if any.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.entries.iter()
    }

    /// `Ok(())` when nothing was recorded, otherwise `Err(self)`.
    pub fn into_result(self) -> Result<(), FormErrors> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl From<FieldError> for FormErrors {
    fn from(err: FieldError) -> Self {
        Self { entries: vec![err] }
    }
}

impl fmt::Display for FormErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, e) in self.entries.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{e}")?;
        }
        Ok(())
    }
}

impl std::error::Error for FormErrors {}

// ---------------------------------------------------------------------------
// Service errors
// ---------------------------------------------------------------------------

/// Errors returned by an [`AuthService`](crate::auth::AuthService).
#[derive(Debug, Error)]
pub enum AuthError {
    /// The service rejected one field (duplicate email, bad credentials).
    #[error("rejected: {0}")]
    Rejected(FieldError),
    /// Local validation failed before the service was consulted.
    #[error("invalid form: {0}")]
    Invalid(FormErrors),
    /// The user registry could not be read or written.
    #[error("user registry I/O: {0}")]
    Storage(#[from] std::io::Error),
}

impl AuthError {
    /// Field errors to show inline. Storage failures land on `fallback_field`
    /// with a generic retry message.
    pub fn form_errors(&self, fallback_field: &str, fallback_message: &str) -> FormErrors {
        match self {
            Self::Rejected(e) => FormErrors::from(e.clone()),
            Self::Invalid(errors) => errors.clone(),
            Self::Storage(_) => FormErrors::from(FieldError::new(fallback_field, fallback_message)),
        }
    }
}

/// The persisted result record is unreadable or incomplete.
#[derive(Debug, Error)]
pub enum SlotError {
    #[error("result record is corrupt: {0}")]
    Corrupt(String),
    #[error("result slot I/O: {0}")]
    Io(#[from] std::io::Error),
}

/// A chart cannot be mounted with the given inputs.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ChartError {
    #[error("chart needs at least 2 points, series has {0}")]
    TooFewPoints(usize),
    #[error("surface size must be positive, got {width}x{height}")]
    EmptySurface { width: f64, height: f64 },
}

/// Upload submission was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UploadError {
    #[error("invalid upload: {0}")]
    Invalid(FormErrors),
    #[error("an analysis is already running")]
    Busy,
}

/// Configuration file could not be loaded.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("cannot parse config {path}: {source}")]
    Parse {
        path: String,
        source: serde_json::Error,
    },
    #[error("invalid config value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}
