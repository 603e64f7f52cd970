//! End-to-end run: load reference data, read mutations, generate and write pairs.

use tracing::info;

use crate::config::PipelineConfig;
use crate::database::ProteinDatabase;
use crate::engine::{PairGenerationEngine, PipelineContext};
use crate::errors::{PipelineError, PipelineResult};
use crate::io::open_output;
use crate::maf::read_mutations_file;
use crate::metrics::GenerationMetrics;
use crate::mutation_index::MutationIndex;
use crate::pair::write_pairs;
use crate::symbol_map::SymbolMap;

impl PipelineContext {
    /// Loads the proteomes and symbol map named by `config`.
    ///
    /// Any load error is fatal; an unset symbol map yields an empty one.
    pub fn load(config: &PipelineConfig) -> PipelineResult<Self> {
        let database =
            ProteinDatabase::load(&config.primary_proteome, &config.secondary_proteomes)?;
        let symbols = match &config.symbol_map {
            Some(path) => SymbolMap::load(path)?,
            None => SymbolMap::new(),
        };
        Ok(Self::new(database, symbols))
    }
}

/// Runs one pair-generation batch as described by `config`.
pub fn run(config: &PipelineConfig) -> PipelineResult<GenerationMetrics> {
    config.validate()?;

    let context = PipelineContext::load(config)?;
    let outcome = read_mutations_file(&config.mutations)?;
    let index: MutationIndex = outcome.mutations.into_iter().collect();
    info!(
        "Indexed {} mutations in {} tumor/gene groups across {} tumors",
        index.len(),
        index.group_count(),
        index.tumors().len()
    );

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.effective_thread_count())
        .build()
        .map_err(|e| PipelineError::ConfigurationError {
            field: "num_threads".to_string(),
            message: e.to_string(),
        })?;

    let engine = PairGenerationEngine::new(&context);
    let records = pool.install(|| {
        engine.generate_index_filtered(&index, &config.peptide_lengths, config.min_cell_fraction)
    });

    let writer = open_output(config.output.as_deref())?;
    write_pairs(writer, &records)?;
    if let Some(path) = &config.output {
        info!("Wrote {} pairs to {}", records.len(), path.display());
    }

    let metrics = engine.metrics();
    metrics.log_summary();
    Ok(metrics)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PipelineConfigBuilder;
    use crate::pair::read_pairs;
    use crate::tests::test_fixtures::{TEST_MUTATIONS_CONTENT, TEST_PROTEOME_CONTENT};
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_run_writes_sorted_pairs() {
        let dir = TempDir::new().unwrap();
        let proteome = dir.path().join("proteome.fa");
        let mutations = dir.path().join("mutations.maf");
        let output = dir.path().join("pairs.tsv");
        fs::write(&proteome, TEST_PROTEOME_CONTENT).unwrap();
        fs::write(&mutations, TEST_MUTATIONS_CONTENT).unwrap();

        let config = PipelineConfigBuilder::new(proteome, mutations)
            .unwrap()
            .min_cell_fraction(0.5)
            .unwrap()
            .output(output.clone())
            .num_threads(2)
            .build()
            .unwrap();
        let metrics = run(&config).unwrap();

        let records = read_pairs(fs::File::open(&output).unwrap()).unwrap();
        // KRAS G12D and TP53 E11K each give nine 9-mers; TCGA-02 falls below 0.5
        assert_eq!(records.len(), 18);
        assert_eq!(metrics.groups_processed, 2);
        assert_eq!(metrics.records_emitted, 18);

        assert_eq!(records[0].gene, "KRAS");
        assert_eq!((records[0].range.lower, records[0].range.upper), (4, 12));
        assert_eq!(records[0].self_peptide, "YKLVVVGAG");
        assert_eq!(records[0].neo_peptide, "YKLVVVGAD");
        assert_eq!(records[9].gene, "TP53");
        assert_eq!((records[9].range.lower, records[9].range.upper), (3, 11));
        assert!(records.iter().all(|r| r.tumor == "TCGA-01"));
    }

    #[test]
    fn test_run_fails_on_missing_proteome() {
        let dir = TempDir::new().unwrap();
        let mutations = dir.path().join("mutations.maf");
        fs::write(&mutations, TEST_MUTATIONS_CONTENT).unwrap();

        let config =
            PipelineConfig::new(dir.path().join("absent.fa"), mutations, &[9], 0.0).unwrap();
        assert!(matches!(run(&config), Err(PipelineError::ConfigurationError { .. })));
    }
}
