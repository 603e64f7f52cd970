use std::collections::HashMap;
use std::path::Path;

use tracing::{debug, info};

use crate::errors::{PipelineError, PipelineResult};
use crate::fasta::FastaReader;
use crate::protein::{strip_version, ProteinRecord};

/// Reads every protein record from a (possibly compressed) peptide FASTA.
pub fn read_proteome<P: AsRef<Path>>(path: P) -> PipelineResult<Vec<ProteinRecord>> {
    let mut records = Vec::new();
    for fasta in FastaReader::open(path.as_ref())? {
        records.push(ProteinRecord::from_fasta(&fasta?)?);
    }
    Ok(records)
}

/// In-memory reference proteome indexed by protein, transcript, gene and symbol.
///
/// Records from the primary source must have globally unique protein and
/// transcript ids. Secondary sources only fill gaps: a secondary record is
/// admitted when neither of its ids is already present.
#[derive(Debug, Default)]
pub struct ProteinDatabase {
    records: Vec<ProteinRecord>,

    // protein id -> record slot
    by_protein: HashMap<String, usize>,

    // transcript id -> record slot
    by_transcript: HashMap<String, usize>,

    // gene id -> record slots, in load order
    by_gene: HashMap<String, Vec<usize>>,

    // gene symbol -> record slots, in load order
    by_symbol: HashMap<String, Vec<usize>>,

    // gene id -> gene symbol, only from records that declare one
    gene_symbols: HashMap<String, String>,
}

impl ProteinDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads the primary proteome file and then each secondary file in order.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use neopairs::database::ProteinDatabase;
    ///
    /// fn main() -> neopairs::errors::PipelineResult<()> {
    ///     let database = ProteinDatabase::load(
    ///         "Homo_sapiens.GRCh38.pep.all.fa.gz",
    ///         &["Homo_sapiens.GRCh37.pep.all.fa.gz"],
    ///     )?;
    ///     let kras = database.by_gene_symbol("KRAS");
    ///     println!("{} KRAS isoforms", kras.len());
    ///     Ok(())
    /// }
    /// ```
    pub fn load<P, S>(primary: P, secondaries: &[S]) -> PipelineResult<Self>
    where
        P: AsRef<Path>,
        S: AsRef<Path>,
    {
        info!("Loading primary proteome {}", primary.as_ref().display());
        let primary_records = read_proteome(primary)?;

        let mut secondary_records = Vec::with_capacity(secondaries.len());
        for path in secondaries {
            info!("Loading secondary proteome {}", path.as_ref().display());
            secondary_records.push(read_proteome(path)?);
        }

        Self::from_sources(primary_records, secondary_records)
    }

    /// Builds a database from already-parsed sources.
    pub fn from_sources<P, S, I>(primary: P, secondaries: I) -> PipelineResult<Self>
    where
        P: IntoIterator<Item = ProteinRecord>,
        S: IntoIterator<Item = ProteinRecord>,
        I: IntoIterator<Item = S>,
    {
        let mut database = Self::new();
        for record in primary {
            database.insert_primary(record)?;
        }
        let primary_count = database.len();

        for (source, records) in secondaries.into_iter().enumerate() {
            let mut admitted = 0;
            let mut skipped = 0;
            for record in records {
                if database.insert_secondary(record)? {
                    admitted += 1;
                } else {
                    skipped += 1;
                }
            }
            debug!(
                "Secondary proteome {}: admitted {} records, skipped {} already present",
                source + 1,
                admitted,
                skipped
            );
        }

        info!(
            "Protein database holds {} records ({} primary) across {} genes",
            database.len(),
            primary_count,
            database.by_gene.len()
        );
        Ok(database)
    }

    /// Inserts a record, failing on any protein or transcript id collision.
    ///
    /// The database is left unchanged when an error is returned.
    pub fn insert_primary(&mut self, record: ProteinRecord) -> PipelineResult<()> {
        if self.by_protein.contains_key(&record.protein_id) {
            return Err(PipelineError::DuplicateIdentifier {
                kind: "protein",
                id: record.protein_id,
            });
        }
        if self.by_transcript.contains_key(&record.transcript_id) {
            return Err(PipelineError::DuplicateIdentifier {
                kind: "transcript",
                id: record.transcript_id,
            });
        }
        if let Some(symbol) = &record.gene_symbol {
            if let Some(existing) = self.gene_symbols.get(&record.gene_id) {
                if existing != symbol {
                    return Err(PipelineError::ConflictingGeneSymbol {
                        gene_id: record.gene_id.clone(),
                        existing: existing.clone(),
                        conflicting: symbol.clone(),
                    });
                }
            }
        }

        let slot = self.records.len();
        self.by_protein.insert(record.protein_id.clone(), slot);
        self.by_transcript.insert(record.transcript_id.clone(), slot);
        self.by_gene.entry(record.gene_id.clone()).or_default().push(slot);
        if let Some(symbol) = &record.gene_symbol {
            self.by_symbol.entry(symbol.clone()).or_default().push(slot);
            self.gene_symbols.entry(record.gene_id.clone()).or_insert_with(|| symbol.clone());
        }
        self.records.push(record);
        Ok(())
    }

    /// Inserts a record only if neither its protein nor transcript id is known.
    ///
    /// Returns whether the record was admitted.
    pub fn insert_secondary(&mut self, record: ProteinRecord) -> PipelineResult<bool> {
        if self.by_protein.contains_key(&record.protein_id)
            || self.by_transcript.contains_key(&record.transcript_id)
        {
            return Ok(false);
        }
        self.insert_primary(record)?;
        Ok(true)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProteinRecord> + '_ {
        self.records.iter()
    }

    fn slots(&self, slots: Option<&Vec<usize>>) -> Vec<&ProteinRecord> {
        slots.map(|slots| slots.iter().map(|&slot| &self.records[slot]).collect()).unwrap_or_default()
    }

    pub fn by_protein_id(&self, protein_id: &str) -> Option<&ProteinRecord> {
        self.by_protein.get(strip_version(protein_id)).map(|&slot| &self.records[slot])
    }

    pub fn by_transcript_id(&self, transcript_id: &str) -> Option<&ProteinRecord> {
        self.by_transcript.get(strip_version(transcript_id)).map(|&slot| &self.records[slot])
    }

    pub fn by_gene_id(&self, gene_id: &str) -> Vec<&ProteinRecord> {
        self.slots(self.by_gene.get(strip_version(gene_id)))
    }

    pub fn by_gene_symbol(&self, symbol: &str) -> Vec<&ProteinRecord> {
        self.slots(self.by_symbol.get(symbol))
    }

    pub fn gene_symbol(&self, gene_id: &str) -> Option<&str> {
        self.gene_symbols.get(strip_version(gene_id)).map(String::as_str)
    }

    pub fn require_protein_id(&self, protein_id: &str) -> PipelineResult<&ProteinRecord> {
        self.by_protein_id(protein_id).ok_or_else(|| PipelineError::NotFound {
            kind: "protein id",
            id: protein_id.to_string(),
        })
    }

    pub fn require_transcript_id(&self, transcript_id: &str) -> PipelineResult<&ProteinRecord> {
        self.by_transcript_id(transcript_id).ok_or_else(|| PipelineError::NotFound {
            kind: "transcript id",
            id: transcript_id.to_string(),
        })
    }

    pub fn require_gene_symbol(&self, gene_id: &str) -> PipelineResult<&str> {
        self.gene_symbol(gene_id).ok_or_else(|| PipelineError::NotFound {
            kind: "gene id",
            id: gene_id.to_string(),
        })
    }
}
