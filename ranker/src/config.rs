//! Pipeline configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::parser::SourceOptions;
use crate::sink::SinkOptions;

/// Default location of the players file.
pub const DEFAULT_INPUT_PATH: &str = "data/players_21.csv";

/// Default location of the parquet output.
pub const DEFAULT_OUTPUT_PATH: &str = "output/players.parquet";

/// Options for one pipeline run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Delimited input file
    pub input_path: PathBuf,

    /// Parquet destination
    pub output_path: PathBuf,

    /// First row holds column names
    pub header: bool,

    /// Infer numeric column types
    pub infer_schema: bool,

    /// Field delimiter (auto-detect if not specified)
    pub delimiter: Option<char>,

    /// Rows shown in the console preview (0 disables it)
    pub preview_rows: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            input_path: PathBuf::from(DEFAULT_INPUT_PATH),
            output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
            header: true,
            infer_schema: true,
            delimiter: None,
            preview_rows: 100,
        }
    }
}

impl PipelineConfig {
    pub fn source(&self) -> SourceOptions {
        SourceOptions {
            path: self.input_path.clone(),
            header: self.header,
            infer_schema: self.infer_schema,
            delimiter: self.delimiter,
        }
    }

    pub fn sink(&self) -> SinkOptions {
        SinkOptions::new(self.output_path.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PipelineConfig::default();
        assert!(config.header);
        assert!(config.infer_schema);
        assert_eq!(config.preview_rows, 100);
        assert_eq!(config.delimiter, None);
    }

    #[test]
    fn test_source_and_sink_follow_config() {
        let config = PipelineConfig {
            input_path: "in.csv".into(),
            output_path: "out/p.parquet".into(),
            header: false,
            delimiter: Some(';'),
            ..Default::default()
        };
        let source = config.source();
        assert!(!source.header);
        assert_eq!(source.delimiter, Some(';'));
        assert_eq!(config.sink().path, PathBuf::from("out/p.parquet"));
    }
}
