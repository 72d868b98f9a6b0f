//! Player Ranker CLI - Rank football players and write parquet
//!
//! # Main Commands
//!
//! ```bash
//! player-ranker run --input data/players_21.csv --output output/players.parquet
//! ```
//!
//! # Diagnostic Commands
//!
//! ```bash
//! player-ranker inspect data/players_21.csv   # Print schema and preview, no transformation
//! player-ranker rules                         # Show ranking and filter rules
//! ```

use clap::{Args, Parser, Subcommand};
use player_ranker::config::{DEFAULT_INPUT_PATH, DEFAULT_OUTPUT_PATH};
use player_ranker::logs::{init_tracing, log_error};
use player_ranker::{load_file, player_rules, run, PipelineConfig, SourceOptions};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "player-ranker")]
#[command(about = "Rank football players by position and nationality", long_about = None)]
struct Cli {
    /// Debug-level logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct ReadArgs {
    /// The input has no header row
    #[arg(long)]
    no_header: bool,

    /// Read every column as a string
    #[arg(long)]
    no_infer_schema: bool,

    /// CSV delimiter (auto-detect if not specified)
    #[arg(short, long)]
    delimiter: Option<char>,

    /// Number of rows to preview (0 disables the preview)
    #[arg(long, default_value = "100")]
    preview: usize,
}

#[derive(Subcommand)]
enum Commands {
    /// Full pipeline: CSV → ranked, filtered parquet
    Run {
        /// Input CSV file
        #[arg(short, long, default_value = DEFAULT_INPUT_PATH)]
        input: PathBuf,

        /// Output parquet file
        #[arg(short, long, default_value = DEFAULT_OUTPUT_PATH)]
        output: PathBuf,

        #[command(flatten)]
        read: ReadArgs,
    },

    /// Load a file and print its schema and first rows
    Inspect {
        /// Input CSV file
        input: PathBuf,

        #[command(flatten)]
        read: ReadArgs,
    },

    /// Show the ranking and filter rules as JSON
    Rules {
        /// One readable line per rule instead of JSON
        #[arg(long)]
        describe: bool,
    },
}

fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Run {
            input,
            output,
            read,
        } => cmd_run(input, output, read),

        Commands::Inspect { input, read } => cmd_inspect(input, read),

        Commands::Rules { describe } => cmd_rules(describe),
    };

    if let Err(e) = result {
        log_error(e.to_string());
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn cmd_run(
    input: PathBuf,
    output: PathBuf,
    read: ReadArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = PipelineConfig {
        input_path: input,
        output_path: output,
        header: !read.no_header,
        infer_schema: !read.no_infer_schema,
        delimiter: read.delimiter,
        preview_rows: read.preview,
    };

    eprintln!("Processing: {}", config.input_path.display());
    let result = run(&config)?;
    let report = &result.report;

    println!("{}", report.input_schema.tree_string());
    println!("{}", report.output_schema.tree_string());
    if config.preview_rows > 0 {
        println!("{}", result.table.preview(config.preview_rows));
    }

    eprintln!("   Loaded:  {} rows", report.counts.loaded);
    eprintln!("   Cleaned: {} rows", report.counts.cleaned);
    eprintln!("   Kept:    {} rows", report.counts.kept);
    eprintln!("   Output:  {}", report.output_path.display());
    eprintln!(
        "Done in {} ms",
        (report.finished_at - report.started_at).num_milliseconds()
    );
    Ok(())
}

fn cmd_inspect(input: PathBuf, read: ReadArgs) -> Result<(), Box<dyn std::error::Error>> {
    let options = SourceOptions {
        path: input,
        header: !read.no_header,
        infer_schema: !read.no_infer_schema,
        delimiter: read.delimiter,
    };
    let loaded = load_file(&options)?;

    eprintln!("   Encoding: {}", loaded.encoding);
    eprintln!("   Delimiter: '{}'", format_delimiter(loaded.delimiter));
    eprintln!("   Rows: {}", loaded.table.num_rows());

    println!("{}", loaded.table.schema().tree_string());
    if read.preview > 0 {
        println!("{}", loaded.table.preview(read.preview));
    }
    Ok(())
}

fn cmd_rules(describe: bool) -> Result<(), Box<dyn std::error::Error>> {
    let rules = player_rules();
    if describe {
        println!("{}", rules.describe());
    } else {
        println!("{}", rules.to_json()?);
    }
    Ok(())
}

fn format_delimiter(d: char) -> String {
    match d {
        '\t' => "\\t".to_string(),
        c => c.to_string(),
    }
}
