//! High-level pipeline API.
//!
//! Each stage is a function from one table to a new table, run through a
//! [`TabularEngine`]. [`Pipeline::run`] chains them:
//!
//! ```text
//! load → clean → rank height by position → rank overall by nationality
//!      → potential_vs_overall → quality filter → project → write
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use player_ranker::{run, PipelineConfig};
//!
//! let output = run(&PipelineConfig::default())?;
//! println!("Kept {} players", output.report.counts.kept);
//! ```

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;

use super::rules;
use crate::config::PipelineConfig;
use crate::engine::{InMemoryEngine, RankSpec, TabularEngine};
use crate::error::{EngineResult, PipelineError, PipelineResult};
use crate::logs::{log_info, log_stage, log_success, log_warning};
use crate::models::{columns, Schema};
use crate::parser::{require_columns, SourceOptions};
use crate::table::Table;

/// Stage names used in logs and errors.
pub mod stage {
    pub const LOAD: &str = "load";
    pub const CLEAN: &str = "clean";
    pub const HEIGHT_BY_POSITION: &str = "cat_height_by_position";
    pub const PLAYER_CAT: &str = "player_cat";
    pub const RATIO: &str = "potential_vs_overall";
    pub const QUALITY: &str = "quality_filter";
    pub const PROJECT: &str = "project";
    pub const WRITE: &str = "write";
}

/// Row counts after each row-changing stage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StageCounts {
    pub loaded: usize,
    pub cleaned: usize,
    pub kept: usize,
    pub written: usize,
}

/// Summary of a completed run
#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub counts: StageCounts,
    /// Schema right after loading
    pub input_schema: Schema,
    /// Schema of the written table
    pub output_schema: Schema,
}

/// Result of a complete run
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub report: PipelineReport,
    /// The table that was written
    pub table: Table,
}

// =============================================================================
// Stages
// =============================================================================

/// Load the source and fail early if a column needed later is absent.
pub fn load<E: TabularEngine>(engine: &E, source: &SourceOptions) -> PipelineResult<Table> {
    let table = engine.load(source)?;
    require_columns(table.schema(), &columns::REQUIRED_INPUT)?;
    tracing::debug!("input schema:\n{}", table.schema().tree_string());
    log_stage(
        stage::LOAD,
        format!("Loaded {} rows from {}", table.num_rows(), source.path.display()),
    );
    Ok(table)
}

/// Drop rows without a team position, short name or overall score.
pub fn clean<E: TabularEngine>(engine: &E, table: &Table) -> EngineResult<Table> {
    let cleaned = engine.filter(table, &rules::clean_rule())?;
    let dropped = table.num_rows() - cleaned.num_rows();
    if dropped > 0 {
        log_warning(format!("{} rows missing identifying fields dropped", dropped));
    }
    log_stage(stage::CLEAN, format!("{} rows remain", cleaned.num_rows()));
    Ok(cleaned)
}

/// Row count per label of a rank column, e.g. `A=9, B=10, C=41`.
pub fn label_summary(table: &Table, spec: &RankSpec) -> EngineResult<String> {
    let values = table.column(&spec.output)?;
    let counts: Vec<String> = spec
        .tiers
        .labels()
        .into_iter()
        .map(|label| {
            let n = values.iter().filter(|v| v.as_str() == Some(label)).count();
            format!("{}={}", label, n)
        })
        .collect();
    Ok(counts.join(", "))
}

/// Add `cat_height_by_position`.
pub fn annotate_height_by_position<E: TabularEngine>(engine: &E, table: &Table) -> EngineResult<Table> {
    let spec = rules::height_by_position();
    let out = engine.rank_within_partition(table, &spec)?;
    log_stage(
        stage::HEIGHT_BY_POSITION,
        format!("Ranked height within team position ({})", label_summary(&out, &spec)?),
    );
    Ok(out)
}

/// Add `player_cat`.
pub fn annotate_player_cat<E: TabularEngine>(engine: &E, table: &Table) -> EngineResult<Table> {
    let spec = rules::player_cat_by_nationality();
    let out = engine.rank_within_partition(table, &spec)?;
    log_stage(
        stage::PLAYER_CAT,
        format!("Ranked overall within nationality ({})", label_summary(&out, &spec)?),
    );
    Ok(out)
}

/// Add `potential_vs_overall`.
pub fn add_potential_vs_overall<E: TabularEngine>(engine: &E, table: &Table) -> EngineResult<Table> {
    let out = engine.with_derived_column(
        table,
        columns::POTENTIAL_VS_OVERALL,
        &rules::potential_vs_overall(),
    )?;
    let nulls = out
        .column(columns::POTENTIAL_VS_OVERALL)?
        .iter()
        .filter(|v| v.is_null())
        .count();
    if nulls > 0 {
        log_warning(format!("{} rows have no ratio (potential null or zero)", nulls));
    }
    log_stage(stage::RATIO, "Computed overall / potential");
    Ok(out)
}

/// Keep rows passing the tier-dependent ratio rule.
pub fn quality_filter<E: TabularEngine>(engine: &E, table: &Table) -> EngineResult<Table> {
    let kept = engine.filter(table, &rules::quality_rule())?;
    log_stage(
        stage::QUALITY,
        format!("{} of {} rows kept", kept.num_rows(), table.num_rows()),
    );
    Ok(kept)
}

/// Select the output columns in their final order.
pub fn select_output<E: TabularEngine>(engine: &E, table: &Table) -> EngineResult<Table> {
    engine.project(table, &columns::OUTPUT)
}

/// Run every stage between load and write.
pub fn transform<E: TabularEngine>(engine: &E, loaded: &Table) -> PipelineResult<(Table, StageCounts)> {
    let cleaned = clean(engine, loaded).map_err(PipelineError::stage(stage::CLEAN))?;
    let by_height = annotate_height_by_position(engine, &cleaned)
        .map_err(PipelineError::stage(stage::HEIGHT_BY_POSITION))?;
    let by_cat = annotate_player_cat(engine, &by_height).map_err(PipelineError::stage(stage::PLAYER_CAT))?;
    let with_ratio = add_potential_vs_overall(engine, &by_cat).map_err(PipelineError::stage(stage::RATIO))?;
    let kept = quality_filter(engine, &with_ratio).map_err(PipelineError::stage(stage::QUALITY))?;
    let projected = select_output(engine, &kept).map_err(PipelineError::stage(stage::PROJECT))?;

    let counts = StageCounts {
        loaded: loaded.num_rows(),
        cleaned: cleaned.num_rows(),
        kept: kept.num_rows(),
        written: 0,
    };
    Ok((projected, counts))
}

// =============================================================================
// Orchestration
// =============================================================================

/// A configured pipeline over an engine.
pub struct Pipeline<E: TabularEngine> {
    engine: E,
    config: PipelineConfig,
}

impl<E: TabularEngine> Pipeline<E> {
    pub fn new(engine: E, config: PipelineConfig) -> Self {
        Self { engine, config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Load, transform and write. Nothing is written unless every stage succeeds.
    pub fn run(&self) -> PipelineResult<PipelineOutput> {
        let started_at = Utc::now();
        log_info(format!(
            "Ranking {} into {}",
            self.config.input_path.display(),
            self.config.output_path.display()
        ));

        let loaded = load(&self.engine, &self.config.source())?;
        let input_schema = loaded.schema().clone();
        let (table, mut counts) = transform(&self.engine, &loaded)?;

        let output_path = self.engine.write(&table, &self.config.sink())?;
        counts.written = table.num_rows();
        log_stage(stage::WRITE, format!("Wrote {} rows", counts.written));
        log_success(format!("Output published to {}", output_path.display()));

        Ok(PipelineOutput {
            report: PipelineReport {
                started_at,
                finished_at: Utc::now(),
                input_path: self.config.input_path.clone(),
                output_path,
                counts,
                input_schema,
                output_schema: table.schema().clone(),
            },
            table,
        })
    }
}

/// Run the pipeline with the in-memory engine.
pub fn run(config: &PipelineConfig) -> PipelineResult<PipelineOutput> {
    Pipeline::new(InMemoryEngine::new(), config.clone()).run()
}
