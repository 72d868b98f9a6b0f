//! # Player Ranker - Football player ranking pipeline
//!
//! Player Ranker reads a delimited file of football player attributes, ranks
//! players by height within their position and by overall score within their
//! nationality, keeps the promising ones and writes the result as parquet.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   CSV File  │────▶│   Parser    │────▶│  Transform  │────▶│   Parquet   │
//! │  (ISO/UTF8) │     │ (auto-type) │     │ (rank+rule) │     │  (atomic)   │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use player_ranker::{run, PipelineConfig};
//!
//! fn main() {
//!     let output = run(&PipelineConfig::default()).unwrap();
//!     println!("Wrote {} players", output.report.counts.written);
//! }
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`models`] - Cell values, schema and column names
//! - [`table`] - Immutable in-memory table
//! - [`parser`] - Delimited file loading with type inference
//! - [`engine`] - Tabular engine trait, expressions and ranking
//! - [`sink`] - Parquet output
//! - [`transform`] - Rules and pipeline stages
//! - [`config`] - Run configuration
//! - [`logs`] - Pipeline logging

// Core modules
pub mod error;
pub mod models;
pub mod table;

// Input / output
pub mod parser;
pub mod sink;

// Engine
pub mod engine;

// Transformation
pub mod transform;

// Ambient
pub mod config;
pub mod logs;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{EngineError, LoadError, PipelineError, SinkError};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{columns, ColumnType, Field, Schema, Value};
pub use table::{Row, Table};

// =============================================================================
// Re-exports - Engine
// =============================================================================

pub use engine::{col, lit, Expr, InMemoryEngine, RankSpec, SortOrder, TabularEngine, TierTable};

// =============================================================================
// Re-exports - Loading and writing
// =============================================================================

pub use parser::{load_file, require_columns, LoadedSource, SourceOptions};
pub use sink::{write_parquet, SinkOptions};

// =============================================================================
// Re-exports - Pipeline
// =============================================================================

pub use config::PipelineConfig;
pub use transform::{
    player_rules, run, Pipeline, PipelineOutput, PipelineReport, RuleSet, StageCounts,
};
