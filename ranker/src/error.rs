//! Error types for the player ranking pipeline.
//!
//! One error type per layer:
//!
//! - [`LoadError`] - Reading and typing the source file
//! - [`EngineError`] - Table operations (filter, derive, rank, project)
//! - [`SinkError`] - Writing the columnar output
//! - [`PipelineError`] - Top-level orchestration errors
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.

use std::path::PathBuf;
use thiserror::Error;

// =============================================================================
// Loader Errors
// =============================================================================

/// Errors while loading the source table.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The source could not be opened or read.
    #[error("Source unavailable '{}': {source}", path.display())]
    SourceUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Columns needed by later stages are absent.
    #[error("Schema mismatch, missing columns: {}", missing.join(", "))]
    SchemaMismatch { missing: Vec<String> },

    /// The delimited content could not be parsed.
    #[error("Malformed input at line {line}: {message}")]
    Malformed { line: u64, message: String },

    /// No header row (or no content at all).
    #[error("Source is empty")]
    EmptySource,
}

// =============================================================================
// Engine Errors
// =============================================================================

/// Errors raised by table operations.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A referenced column does not exist.
    #[error("Column missing: {0}")]
    ColumnMissing(String),

    /// A derived column would shadow an existing one.
    #[error("Column already exists: {0}")]
    DuplicateColumn(String),
}

// =============================================================================
// Sink Errors
// =============================================================================

/// Errors while persisting the output.
#[derive(Debug, Error)]
pub enum SinkError {
    /// The destination could not be written or published.
    #[error("Failed to write '{}': {message}", path.display())]
    SinkWriteError { path: PathBuf, message: String },
}

impl SinkError {
    pub fn write(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        SinkError::SinkWriteError {
            path: path.into(),
            message: message.to_string(),
        }
    }
}

// =============================================================================
// Pipeline Errors (top-level)
// =============================================================================

/// Top-level pipeline errors.
///
/// This is the error type returned by [`crate::transform::pipeline::run`].
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Loading failed.
    #[error("Load error: {0}")]
    Load(#[from] LoadError),

    /// A transformation stage failed.
    #[error("Stage '{stage}' failed: {source}")]
    Stage {
        stage: &'static str,
        #[source]
        source: EngineError,
    },

    /// Writing failed.
    #[error("Sink error: {0}")]
    Sink(#[from] SinkError),
}

impl PipelineError {
    /// Wrap an engine error with the name of the stage that raised it.
    pub fn stage(stage: &'static str) -> impl FnOnce(EngineError) -> PipelineError {
        move |source| PipelineError::Stage { stage, source }
    }
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for loading.
pub type LoadResult<T> = Result<T, LoadError>;

/// Result type for table operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Result type for the sink.
pub type SinkResult<T> = Result<T, SinkError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion_chain() {
        // LoadError -> PipelineError
        let load_err = LoadError::SchemaMismatch {
            missing: vec!["overall".into(), "potential".into()],
        };
        let pipeline_err: PipelineError = load_err.into();
        assert!(pipeline_err.to_string().contains("overall, potential"));

        // SinkError -> PipelineError
        let sink_err = SinkError::write("out/players.parquet", "permission denied");
        let pipeline_err: PipelineError = sink_err.into();
        assert!(pipeline_err.to_string().contains("permission denied"));
    }

    #[test]
    fn test_stage_error_names_stage() {
        let err = PipelineError::stage("project")(EngineError::ColumnMissing("age".into()));
        let msg = err.to_string();
        assert!(msg.contains("project"));
        assert!(msg.contains("age"));
    }
}
