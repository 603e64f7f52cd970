use clap::{Parser, Subcommand};
use neopairs::config::{PerformanceConfig, PipelineConfig};
use neopairs::errors::{PipelineError, PipelineResult};
use neopairs::fragment::resolve_fragments;
use neopairs::pipeline;
use neopairs::types::PeptideLength;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "neopairs")]
#[command(about = "Generate self/neo peptide pairs around somatic missense mutations")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate peptide pairs for every tumor/gene group in a mutation table
    Generate {
        /// Primary peptide FASTA (supports gzip, bzip2, xz, zstd, and uncompressed)
        #[arg(short, long)]
        proteome: PathBuf,

        /// Secondary peptide FASTA, only used for ids missing from the primary one
        #[arg(long)]
        secondary: Vec<PathBuf>,

        /// Tab-delimited gene symbol to gene id table
        #[arg(short, long)]
        symbols: Option<PathBuf>,

        /// Tab-delimited mutation table ("-" reads stdin)
        #[arg(short, long)]
        mutations: PathBuf,

        /// Output file path (optional - will output to stdout if not provided)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Peptide lengths, comma-separated
        #[arg(short, long, value_delimiter = ',', default_value = "9")]
        lengths: Vec<usize>,

        /// Minimum cell fraction a mutation needs to be used
        #[arg(long, default_value = "0.0")]
        min_cell_fraction: f64,

        /// Worker threads (defaults to available parallelism)
        #[arg(short, long)]
        threads: Option<usize>,
    },
    /// Print the windows covering one position
    Fragments {
        /// 1-based residue position
        #[arg(long)]
        position: usize,

        /// Peptide length
        #[arg(long, default_value = "9")]
        length: usize,

        /// Length of the protein sequence
        #[arg(long)]
        sequence_length: usize,
    },
}

fn main() -> PipelineResult<()> {
    // logs go to stderr so pairs written to stdout stay clean
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Generate {
            proteome,
            secondary,
            symbols,
            mutations,
            output,
            lengths,
            min_cell_fraction,
            threads,
        } => {
            let mut config = PipelineConfig::new(proteome, mutations, &lengths, min_cell_fraction)?;
            config.secondary_proteomes = secondary;
            config.symbol_map = symbols;
            config.output = output;
            config.performance = PerformanceConfig { num_threads: threads };

            info!(
                "Peptide lengths: {}",
                config.peptide_lengths.iter().map(|l| l.to_string()).collect::<Vec<_>>().join(",")
            );
            info!("Minimum cell fraction: {}", config.min_cell_fraction);
            info!("Threads: {}", config.effective_thread_count());

            pipeline::run(&config)?;
        }
        Commands::Fragments { position, length, sequence_length } => {
            let length = PeptideLength::new(length).map_err(|message| {
                PipelineError::ConfigurationError { field: "length".to_string(), message }
            })?;
            for range in resolve_fragments(position, length.get(), sequence_length) {
                println!("{}\t{}", range.lower, range.upper);
            }
        }
    }

    Ok(())
}
