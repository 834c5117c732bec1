//! Error taxonomy for template loading and item generation.
//!
//! Grading has no error type: every grading function returns a result with a
//! feedback code instead.

use std::path::PathBuf;

/// Failures while loading the template store. All of them are fatal at startup.
#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
  #[error("cannot read template source {path}: {source}")]
  Io {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },
  #[error("cannot parse template file {path}: {message}")]
  Parse { path: PathBuf, message: String },
  #[error("template {template_id}: {reason}")]
  Schema { template_id: String, reason: String },
  #[error("template {template_id}: unsupported compute rule {compute:?}")]
  UnsupportedComputeRule { template_id: String, compute: String },
  #[error("duplicate template id {0}")]
  DuplicateTemplate(String),
  #[error("no templates found in {0}")]
  EmptyStore(PathBuf),
}

/// Failures of a single `generate_item` call. Nothing partial is ever returned.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GenerationError {
  #[error("template {0} not found")]
  TemplateNotFound(String),
  #[error("template schema error: {0}")]
  TemplateSchemaError(String),
  #[error("invalid geometry: {0}")]
  InvalidGeometry(String),
  #[error("division by zero: {0}")]
  DivisionByZero(String),
  #[error("missing parameter {0}")]
  MissingParam(String),
  #[error("invalid parameter {name}: {reason}")]
  InvalidParam { name: String, reason: String },
  #[error("arithmetic overflow while computing {0}")]
  Overflow(String),
  #[error("generated item failed validation: {0}")]
  ValidationFailed(String),
}

impl GenerationError {
  /// True when another seed may succeed where this one failed.
  pub fn is_retryable(&self) -> bool {
    matches!(
      self,
      GenerationError::InvalidGeometry(_)
        | GenerationError::DivisionByZero(_)
        | GenerationError::Overflow(_)
        | GenerationError::ValidationFailed(_)
    )
  }
}
