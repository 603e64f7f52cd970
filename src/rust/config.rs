use crate::errors::{PipelineError, PipelineResult};
use crate::types::{CellFraction, PeptideLength};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Peptide length used when none is configured.
pub const DEFAULT_PEPTIDE_LENGTH: usize = 9;

/// Configuration for one pair-generation run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Primary reference proteome (peptide FASTA)
    pub primary_proteome: PathBuf,
    /// Proteomes that only fill gaps in the primary one
    pub secondary_proteomes: Vec<PathBuf>,
    /// Optional gene symbol to gene id table
    pub symbol_map: Option<PathBuf>,
    /// Mutation table
    pub mutations: PathBuf,
    /// Output path, stdout when absent
    pub output: Option<PathBuf>,
    /// Peptide lengths to generate windows for
    pub peptide_lengths: Vec<PeptideLength>,
    /// Mutations below this cell fraction are ignored
    pub min_cell_fraction: CellFraction,
    /// Performance settings
    pub performance: PerformanceConfig,
}

/// Performance-related configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PerformanceConfig {
    /// Number of threads for parallel processing
    pub num_threads: Option<usize>,
}

fn config_error(field: &str, message: String) -> PipelineError {
    PipelineError::ConfigurationError { field: field.to_string(), message }
}

impl PipelineConfig {
    /// Create a new configuration with validated lengths and fraction
    pub fn new(
        primary_proteome: PathBuf,
        mutations: PathBuf,
        peptide_lengths: &[usize],
        min_cell_fraction: f64,
    ) -> PipelineResult<Self> {
        let peptide_lengths = peptide_lengths
            .iter()
            .map(|&length| PeptideLength::new(length))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| config_error("peptide_lengths", e))?;

        let min_cell_fraction = CellFraction::new(min_cell_fraction)
            .map_err(|e| config_error("min_cell_fraction", e))?;

        Ok(Self {
            primary_proteome,
            secondary_proteomes: Vec::new(),
            symbol_map: None,
            mutations,
            output: None,
            peptide_lengths,
            min_cell_fraction,
            performance: PerformanceConfig::default(),
        })
    }

    /// Validate the configuration
    pub fn validate(&self) -> PipelineResult<()> {
        if self.peptide_lengths.is_empty() {
            return Err(config_error(
                "peptide_lengths",
                "At least one peptide length is required".to_string(),
            ));
        }

        check_input("primary_proteome", &self.primary_proteome)?;
        for path in &self.secondary_proteomes {
            check_input("secondary_proteomes", path)?;
        }
        if let Some(path) = &self.symbol_map {
            check_input("symbol_map", path)?;
        }
        check_input("mutations", &self.mutations)?;

        if self.performance.num_threads == Some(0) {
            return Err(config_error(
                "num_threads",
                "Thread count must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Get the number of threads to use
    pub fn effective_thread_count(&self) -> usize {
        self.performance
            .num_threads
            .unwrap_or_else(|| std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1))
    }
}

// "-" reads stdin and is always accepted
fn check_input(field: &str, path: &Path) -> PipelineResult<()> {
    if path.as_os_str() != "-" && !path.is_file() {
        return Err(config_error(field, format!("Input file does not exist: {:?}", path)));
    }
    Ok(())
}

/// Configuration builder for runs with optional inputs
pub struct PipelineConfigBuilder {
    config: PipelineConfig,
}

impl PipelineConfigBuilder {
    /// Create a builder generating the default peptide length
    pub fn new(primary_proteome: PathBuf, mutations: PathBuf) -> PipelineResult<Self> {
        let config =
            PipelineConfig::new(primary_proteome, mutations, &[DEFAULT_PEPTIDE_LENGTH], 0.0)?;
        Ok(Self { config })
    }

    pub fn secondary_proteome(mut self, path: PathBuf) -> Self {
        self.config.secondary_proteomes.push(path);
        self
    }

    pub fn symbol_map(mut self, path: PathBuf) -> Self {
        self.config.symbol_map = Some(path);
        self
    }

    pub fn output(mut self, path: PathBuf) -> Self {
        self.config.output = Some(path);
        self
    }

    /// Replace the peptide lengths
    pub fn peptide_lengths(mut self, lengths: &[usize]) -> PipelineResult<Self> {
        self.config.peptide_lengths = lengths
            .iter()
            .map(|&length| PeptideLength::new(length))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| config_error("peptide_lengths", e))?;
        Ok(self)
    }

    pub fn min_cell_fraction(mut self, fraction: f64) -> PipelineResult<Self> {
        self.config.min_cell_fraction =
            CellFraction::new(fraction).map_err(|e| config_error("min_cell_fraction", e))?;
        Ok(self)
    }

    /// Set the number of threads
    pub fn num_threads(mut self, threads: usize) -> Self {
        self.config.performance.num_threads = Some(threads);
        self
    }

    /// Build the final configuration
    pub fn build(self) -> PipelineResult<PipelineConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn inputs() -> (TempDir, PathBuf, PathBuf) {
        let dir = TempDir::new().unwrap();
        let proteome = dir.path().join("proteome.fa");
        let mutations = dir.path().join("mutations.maf");
        fs::write(&proteome, ">P1 gene:G1 transcript:T1\nMPKLNSTF\n").unwrap();
        fs::write(&mutations, "Tumor_Sample_Barcode\tHugo_Symbol\tHGVSp_Short\n").unwrap();
        (dir, proteome, mutations)
    }

    #[test]
    fn test_config_creation() {
        let config = PipelineConfig::new(
            PathBuf::from("proteome.fa"),
            PathBuf::from("mutations.maf"),
            &[8, 9, 10],
            0.25,
        )
        .unwrap();

        let lengths: Vec<usize> = config.peptide_lengths.iter().map(|l| l.get()).collect();
        assert_eq!(lengths, vec![8, 9, 10]);
        assert_eq!(config.min_cell_fraction.get(), 0.25);
        assert!(config.output.is_none());
        assert!(config.secondary_proteomes.is_empty());
    }

    #[test]
    fn test_config_rejects_bad_values() {
        let err = PipelineConfig::new("p.fa".into(), "m.maf".into(), &[9, 0], 0.0).unwrap_err();
        assert!(matches!(err, PipelineError::ConfigurationError { ref field, .. } if field == "peptide_lengths"));

        let err = PipelineConfig::new("p.fa".into(), "m.maf".into(), &[51], 0.0).unwrap_err();
        assert!(matches!(err, PipelineError::ConfigurationError { .. }));

        let err = PipelineConfig::new("p.fa".into(), "m.maf".into(), &[9], 1.5).unwrap_err();
        assert!(matches!(err, PipelineError::ConfigurationError { ref field, .. } if field == "min_cell_fraction"));
    }

    #[test]
    fn test_validate_checks_inputs() {
        let (dir, proteome, mutations) = inputs();

        let config = PipelineConfig::new(proteome.clone(), mutations.clone(), &[9], 0.0).unwrap();
        assert!(config.validate().is_ok());

        let mut missing = config.clone();
        missing.symbol_map = Some(dir.path().join("absent.tsv"));
        assert!(missing.validate().is_err());

        let mut no_lengths = config.clone();
        no_lengths.peptide_lengths.clear();
        assert!(no_lengths.validate().is_err());

        let stdin = PipelineConfig::new(proteome, PathBuf::from("-"), &[9], 0.0).unwrap();
        assert!(stdin.validate().is_ok());
    }

    #[test]
    fn test_config_builder() {
        let (dir, proteome, mutations) = inputs();
        let config = PipelineConfigBuilder::new(proteome, mutations)
            .unwrap()
            .peptide_lengths(&[8, 11])
            .unwrap()
            .min_cell_fraction(0.5)
            .unwrap()
            .output(dir.path().join("pairs.tsv"))
            .num_threads(2)
            .build()
            .unwrap();

        assert_eq!(config.peptide_lengths.len(), 2);
        assert_eq!(config.min_cell_fraction.get(), 0.5);
        assert_eq!(config.performance.num_threads, Some(2));
        assert_eq!(config.effective_thread_count(), 2);
    }

    #[test]
    fn test_builder_defaults() {
        let (_dir, proteome, mutations) = inputs();
        let config = PipelineConfigBuilder::new(proteome, mutations).unwrap().build().unwrap();
        assert_eq!(config.peptide_lengths, vec![PeptideLength::new(DEFAULT_PEPTIDE_LENGTH).unwrap()]);
        assert_eq!(config.min_cell_fraction.get(), 0.0);
        assert!(config.effective_thread_count() >= 1);
    }
}
