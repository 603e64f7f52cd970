use std::collections::BTreeSet;

use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::database::ProteinDatabase;
use crate::errors::{PipelineError, PipelineResult};
use crate::fragment::{resolve_fragments, FragmentRange};
use crate::metrics::{GenerationMetrics, MetricsCollector};
use crate::mutation::MutationGroup;
use crate::mutation_index::{GroupEntry, MutationIndex};
use crate::pair::PeptidePairRecord;
use crate::symbol_map::SymbolMap;
use crate::types::{CellFraction, PeptideLength};

/// Read-only reference data shared by every group worker.
///
/// Built once before generation starts; the engine only ever borrows it.
#[derive(Debug, Default)]
pub struct PipelineContext {
    pub database: ProteinDatabase,
    pub symbols: SymbolMap,
}

impl PipelineContext {
    pub fn new(database: ProteinDatabase, symbols: SymbolMap) -> Self {
        Self { database, symbols }
    }
}

/// Turns mutation groups into self/neo peptide pairs.
pub struct PairGenerationEngine<'a> {
    context: &'a PipelineContext,
    metrics: MetricsCollector,
}

impl<'a> PairGenerationEngine<'a> {
    pub fn new(context: &'a PipelineContext) -> Self {
        Self { context, metrics: MetricsCollector::new() }
    }

    /// Counters for every group this engine has seen so far.
    pub fn metrics(&self) -> GenerationMetrics {
        self.metrics.get_metrics()
    }

    /// Generates the pairs of one group, propagating any resolution error.
    ///
    /// Each distinct window is emitted once, however many (mutation, length)
    /// combinations produce it, in (lower, upper) order.
    pub fn try_generate(
        &self,
        group: &MutationGroup,
        lengths: &[PeptideLength],
    ) -> PipelineResult<Vec<PeptidePairRecord>> {
        let native = group.resolve_native(&self.context.database, &self.context.symbols)?;
        let mutated = group.mutate(native)?;

        let ranges: BTreeSet<FragmentRange> = group
            .mutations()
            .flat_map(move |mutation| {
                lengths.iter().flat_map(move |length| {
                    resolve_fragments(mutation.position(), length.get(), native.len())
                })
            })
            .collect();

        ranges
            .into_iter()
            .map(|range| {
                let window = |sequence: &str| {
                    range.extract(sequence).map(str::to_string).ok_or_else(|| {
                        PipelineError::OutOfRange { position: range.upper, length: sequence.len() }
                    })
                };
                Ok(PeptidePairRecord {
                    tumor: group.tumor().to_string(),
                    gene: group.gene().to_string(),
                    range,
                    self_peptide: window(native)?,
                    neo_peptide: window(&mutated)?,
                })
            })
            .collect()
    }

    /// Generates the pairs of one group. Failures are logged and counted and
    /// yield no records, so one bad group never stops a batch.
    pub fn generate(
        &self,
        group: &MutationGroup,
        lengths: &[PeptideLength],
    ) -> Vec<PeptidePairRecord> {
        match self.try_generate(group, lengths) {
            Ok(records) => {
                if records.is_empty() {
                    info!(
                        "{}/{}: no {:?}-residue window fits around {} mutation(s)",
                        group.tumor(),
                        group.gene(),
                        lengths.iter().map(PeptideLength::get).collect::<Vec<_>>(),
                        group.len()
                    );
                } else {
                    debug!("{}/{}: {} pairs", group.tumor(), group.gene(), records.len());
                }
                self.metrics.record_success(records.len() as u64);
                records
            }
            Err(e) => {
                warn!("Skipping {}/{}: {}", group.tumor(), group.gene(), e);
                self.metrics.record_skip(e.kind());
                Vec::new()
            }
        }
    }

    fn generate_entry(&self, entry: GroupEntry, lengths: &[PeptideLength]) -> Vec<PeptidePairRecord> {
        match entry.group {
            Ok(group) => self.generate(&group, lengths),
            Err(e) => {
                warn!("Skipping {}/{}: {}", entry.tumor, entry.gene, e);
                self.metrics.record_skip(e.kind());
                Vec::new()
            }
        }
    }

    fn generate_entries(
        &self,
        entries: Vec<GroupEntry>,
        lengths: &[PeptideLength],
    ) -> Vec<PeptidePairRecord> {
        let mut records: Vec<PeptidePairRecord> = entries
            .into_par_iter()
            .flat_map(|entry| self.generate_entry(entry, lengths))
            .collect();

        records.sort_by(|a, b| {
            a.tumor
                .cmp(&b.tumor)
                .then_with(|| a.gene.cmp(&b.gene))
                .then_with(|| a.range.cmp(&b.range))
        });
        records
    }

    /// Generates pairs for every (tumor, gene) group of `index`, sorted by
    /// tumor, gene and window.
    ///
    /// Groups are processed in parallel on the current rayon pool.
    pub fn generate_index(
        &self,
        index: &MutationIndex,
        lengths: &[PeptideLength],
    ) -> Vec<PeptidePairRecord> {
        self.generate_entries(index.group(), lengths)
    }

    /// Like [`PairGenerationEngine::generate_index`], after dropping
    /// mutations below `min_fraction`.
    pub fn generate_index_filtered(
        &self,
        index: &MutationIndex,
        lengths: &[PeptideLength],
        min_fraction: CellFraction,
    ) -> Vec<PeptidePairRecord> {
        self.generate_entries(index.group_filtered(min_fraction), lengths)
    }
}
