use std::collections::{BTreeSet, HashMap};
use std::io::Read;
use std::path::Path;

use tracing::info;

use crate::errors::{PipelineError, PipelineResult, PipelineResultExt};
use crate::io::open_input;
use crate::protein::strip_version;

/// Many-to-many map from HUGO gene symbol to gene identifiers.
///
/// One symbol may name several loci, so lookups return a set.
#[derive(Debug, Clone, Default)]
pub struct SymbolMap {
    genes: HashMap<String, BTreeSet<String>>,
}

impl SymbolMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a tab-delimited table whose first two columns are symbol and gene id.
    pub fn load<P: AsRef<Path>>(path: P) -> PipelineResult<Self> {
        info!("Loading gene symbol map {}", path.as_ref().display());
        Self::from_reader(open_input(path)?)
    }

    pub fn from_reader<R: Read>(reader: R) -> PipelineResult<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .comment(Some(b'#'))
            .flexible(true)
            .has_headers(true)
            .from_reader(reader);

        let mut map = Self::new();
        for (row, result) in reader.records().enumerate() {
            let record = result?;
            let symbol = record.get(0).map(str::trim).unwrap_or_default();
            let gene_id = record.get(1).map(str::trim).unwrap_or_default();
            if symbol.is_empty() || gene_id.is_empty() {
                return Err(PipelineError::ParseError(
                    "symbol map rows need a symbol and a gene id".to_string(),
                ))
                .with_context(|| format!("symbol map row {}", row + 1));
            }
            map.insert(symbol, gene_id);
        }
        info!("Symbol map covers {} symbols", map.len());
        Ok(map)
    }

    pub fn insert(&mut self, symbol: &str, gene_id: &str) {
        self.genes.entry(symbol.to_string()).or_default().insert(strip_version(gene_id).to_string());
    }

    /// Gene ids for a symbol; empty when the symbol is unknown.
    pub fn get(&self, symbol: &str) -> BTreeSet<String> {
        self.genes.get(symbol).cloned().unwrap_or_default()
    }

    /// Number of distinct symbols.
    pub fn len(&self) -> usize {
        self.genes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.genes.is_empty()
    }
}

impl<'a> FromIterator<(&'a str, &'a str)> for SymbolMap {
    fn from_iter<T: IntoIterator<Item = (&'a str, &'a str)>>(iter: T) -> Self {
        let mut map = Self::new();
        for (symbol, gene_id) in iter {
            map.insert(symbol, gene_id);
        }
        map
    }
}
