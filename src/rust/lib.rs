pub mod aminoacid;
pub mod config;
pub mod database;
pub mod engine;
pub mod errors;
pub mod fasta;
pub mod fragment;
pub mod io;
pub mod maf;
pub mod metrics;
pub mod mutation;
pub mod mutation_index;
pub mod pair;
pub mod pipeline;
pub mod protein;
pub mod symbol_map;
pub mod types;


pub use crate::config::{PipelineConfig, PipelineConfigBuilder};
pub use crate::database::ProteinDatabase;
pub use crate::engine::{PairGenerationEngine, PipelineContext};
pub use crate::errors::{PipelineError, PipelineResult};
pub use crate::fragment::{resolve_fragments, FragmentRange};
pub use crate::mutation::{Mutation, MutationGroup, ProteinChange};
pub use crate::mutation_index::MutationIndex;
pub use crate::pair::{PeptideKind, PeptidePairRecord};
pub use crate::symbol_map::SymbolMap;

#[cfg(feature = "python")]
mod python {
    use pyo3::exceptions::{PyRuntimeError, PyValueError};
    use pyo3::prelude::*;

    use crate::database::ProteinDatabase;
    use crate::engine::{PairGenerationEngine, PipelineContext};
    use crate::maf::read_mutations_file;
    use crate::mutation_index::MutationIndex;
    use crate::symbol_map::SymbolMap;
    use crate::types::{CellFraction, PeptideLength};

    type PairTuple = (String, String, usize, usize, String, String);

    fn runtime_error(e: crate::errors::PipelineError) -> PyErr {
        PyErr::new::<PyRuntimeError, _>(e.to_string())
    }

    /// Windows of `length` residues covering 1-based `position`, as (lower, upper) pairs.
    #[pyfunction]
    fn resolve_fragments(
        position: usize,
        length: usize,
        sequence_length: usize,
    ) -> PyResult<Vec<(usize, usize)>> {
        let length = PeptideLength::new(length).map_err(PyErr::new::<PyValueError, _>)?;
        Ok(crate::fragment::resolve_fragments(position, length.get(), sequence_length)
            .into_iter()
            .map(|range| (range.lower, range.upper))
            .collect())
    }

    /// Generates (tumor, gene, lower, upper, self, neo) tuples for a mutation table.
    #[pyfunction]
    #[pyo3(signature = (proteome, mutations, lengths, secondary=Vec::new(), symbols=None, min_cell_fraction=0.0))]
    fn generate_pairs(
        py: Python<'_>,
        proteome: String,
        mutations: String,
        lengths: Vec<usize>,
        secondary: Vec<String>,
        symbols: Option<String>,
        min_cell_fraction: f64,
    ) -> PyResult<Vec<PairTuple>> {
        let lengths = lengths
            .into_iter()
            .map(PeptideLength::new)
            .collect::<Result<Vec<_>, _>>()
            .map_err(PyErr::new::<PyValueError, _>)?;
        let min_cell_fraction =
            CellFraction::new(min_cell_fraction).map_err(PyErr::new::<PyValueError, _>)?;

        py.allow_threads(|| {
            let database = ProteinDatabase::load(&proteome, &secondary).map_err(runtime_error)?;
            let symbols = match &symbols {
                Some(path) => SymbolMap::load(path).map_err(runtime_error)?,
                None => SymbolMap::new(),
            };
            let context = PipelineContext::new(database, symbols);
            let index: MutationIndex =
                read_mutations_file(&mutations).map_err(runtime_error)?.mutations.into_iter().collect();

            let engine = PairGenerationEngine::new(&context);
            Ok(engine
                .generate_index_filtered(&index, &lengths, min_cell_fraction)
                .into_iter()
                .map(|r| (r.tumor, r.gene, r.range.lower, r.range.upper, r.self_peptide, r.neo_peptide))
                .collect())
        })
    }

    /// A Python module implemented in Rust.
    #[pymodule]
    fn neopairs(m: &Bound<'_, PyModule>) -> PyResult<()> {
        m.add_function(wrap_pyfunction!(resolve_fragments, m)?)?;
        m.add_function(wrap_pyfunction!(generate_pairs, m)?)?;
        Ok(())
    }
}
