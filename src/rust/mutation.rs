use std::cmp::Ordering;
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::aminoacid::{parse_standard_aa, residue_at};
use crate::database::ProteinDatabase;
use crate::errors::{PipelineError, PipelineResult};
use crate::protein::{strip_version, ProteinRecord};
use crate::symbol_map::SymbolMap;
use crate::types::{CellFraction, Position};

/// A single-residue substitution such as `p.K3A`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProteinChange {
    pub native: char,
    pub position: Position,
    pub mutated: char,
}

impl FromStr for ProteinChange {
    type Err = PipelineError;

    /// Parses `[p.]<native><position><mutated>` with single-letter codes.
    fn from_str(token: &str) -> PipelineResult<Self> {
        let trimmed = token.trim();
        let body = trimmed.strip_prefix("p.").unwrap_or(trimmed);
        let invalid = || PipelineError::ParseError(format!("Invalid protein change '{}'", token));

        let digits_start = body.find(|c: char| c.is_ascii_digit()).ok_or_else(invalid)?;
        let digits_end = body[digits_start..]
            .find(|c: char| !c.is_ascii_digit())
            .map(|offset| digits_start + offset)
            .ok_or_else(invalid)?;

        let native = parse_standard_aa(&body[..digits_start]).map_err(|_| invalid())?;
        let mutated = parse_standard_aa(&body[digits_end..]).map_err(|_| invalid())?;
        let position: usize = body[digits_start..digits_end].parse().map_err(|_| invalid())?;
        let position = Position::new(position).map_err(|_| invalid())?;

        Ok(Self { native, position, mutated })
    }
}

impl fmt::Display for ProteinChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "p.{}{}{}", self.native, self.position, self.mutated)
    }
}

/// One missense call in one tumor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mutation {
    pub tumor: String,
    pub gene: String,
    pub transcript: Option<String>,
    pub change: ProteinChange,
    pub cell_fraction: CellFraction,
}

impl Mutation {
    pub fn new(
        tumor: &str,
        gene: &str,
        transcript: Option<&str>,
        change: ProteinChange,
        cell_fraction: CellFraction,
    ) -> Self {
        Self {
            tumor: tumor.to_string(),
            gene: gene.to_string(),
            transcript: transcript.map(|t| strip_version(t).to_string()),
            change,
            cell_fraction,
        }
    }

    /// 1-based residue position.
    pub fn position(&self) -> usize {
        self.change.position.get()
    }

    pub fn native(&self) -> char {
        self.change.native
    }

    pub fn mutated(&self) -> char {
        self.change.mutated
    }

    /// True when `sequence` carries this mutation's native residue at its position.
    pub fn is_consistent_with(&self, sequence: &str) -> bool {
        residue_at(sequence, self.position()) == Some(self.native())
    }
}

impl fmt::Display for Mutation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.tumor, self.gene, self.change)
    }
}

/// All mutations of one gene in one tumor, unique by position.
#[derive(Debug, Clone, PartialEq)]
pub struct MutationGroup {
    tumor: String,
    gene: String,
    transcript: Option<String>,
    mutations: BTreeMap<usize, Mutation>,
}

impl MutationGroup {
    /// Builds a group from a non-empty collection sharing tumor, gene and transcript.
    ///
    /// Two calls at the same position keep the higher cell fraction. Equal
    /// fractions with the same mutated residue keep the first; equal
    /// fractions naming different residues cannot be resolved.
    pub fn new<I>(mutations: I) -> PipelineResult<Self>
    where
        I: IntoIterator<Item = Mutation>,
    {
        let mut iter = mutations.into_iter();
        let first = iter.next().ok_or_else(|| PipelineError::InconsistentGroup {
            message: "a mutation group needs at least one mutation".to_string(),
        })?;

        let mut group = Self {
            tumor: first.tumor.clone(),
            gene: first.gene.clone(),
            transcript: first.transcript.clone(),
            mutations: BTreeMap::new(),
        };
        group.insert(first)?;
        for mutation in iter {
            group.check_identity(&mutation)?;
            group.insert(mutation)?;
        }
        Ok(group)
    }

    fn check_identity(&self, mutation: &Mutation) -> PipelineResult<()> {
        if mutation.tumor != self.tumor {
            return Err(PipelineError::InconsistentGroup {
                message: format!("tumor {} does not match {}", mutation.tumor, self.tumor),
            });
        }
        if mutation.gene != self.gene {
            return Err(PipelineError::InconsistentGroup {
                message: format!("gene {} does not match {}", mutation.gene, self.gene),
            });
        }
        if mutation.transcript != self.transcript {
            return Err(PipelineError::InconsistentGroup {
                message: format!(
                    "transcript {} does not match {} for {}/{}",
                    mutation.transcript.as_deref().unwrap_or("<none>"),
                    self.transcript.as_deref().unwrap_or("<none>"),
                    self.tumor,
                    self.gene
                ),
            });
        }
        Ok(())
    }

    fn insert(&mut self, mutation: Mutation) -> PipelineResult<()> {
        let position = mutation.position();
        let Some(held) = self.mutations.get(&position) else {
            self.mutations.insert(position, mutation);
            return Ok(());
        };

        match mutation.cell_fraction.get().partial_cmp(&held.cell_fraction.get()) {
            Some(Ordering::Greater) => {
                debug!("{} supersedes {} on cell fraction", mutation, held);
                self.mutations.insert(position, mutation);
                Ok(())
            }
            Some(Ordering::Less) => Ok(()),
            _ if mutation.mutated() == held.mutated() => Ok(()),
            _ => Err(PipelineError::AmbiguousMutation {
                tumor: self.tumor.clone(),
                gene: self.gene.clone(),
                position,
                first: held.mutated(),
                second: mutation.mutated(),
            }),
        }
    }

    pub fn tumor(&self) -> &str {
        &self.tumor
    }

    pub fn gene(&self) -> &str {
        &self.gene
    }

    pub fn transcript(&self) -> Option<&str> {
        self.transcript.as_deref()
    }

    /// Member mutations in ascending position order.
    pub fn mutations(&self) -> impl Iterator<Item = &Mutation> + '_ {
        self.mutations.values()
    }

    pub fn mutation_at(&self, position: usize) -> Option<&Mutation> {
        self.mutations.get(&position)
    }

    pub fn len(&self) -> usize {
        self.mutations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mutations.is_empty()
    }

    /// Applies every member mutation to a copy of `native`.
    pub fn mutate(&self, native: &str) -> PipelineResult<String> {
        let mut residues = native.as_bytes().to_vec();
        for mutation in self.mutations.values() {
            let index = mutation.change.position.index();
            let Some(&found) = residues.get(index) else {
                return Err(PipelineError::OutOfRange {
                    position: mutation.position(),
                    length: residues.len(),
                });
            };
            if found as char != mutation.native() {
                return Err(PipelineError::ResidueMismatch {
                    position: mutation.position(),
                    expected: mutation.native(),
                    found: found as char,
                });
            }
            residues[index] = mutation.mutated() as u8;
        }
        String::from_utf8(residues).map_err(|e| PipelineError::ValidationError {
            message: format!("native sequence for {} is not ASCII: {}", self.gene, e),
        })
    }

    /// Finds the reference sequence this group's mutations were called against.
    ///
    /// With a transcript id the matching record is required. Otherwise every
    /// record reachable through the gene symbol, directly or via the symbol
    /// map, is a candidate and the first one whose residues agree with every
    /// declared native residue wins.
    pub fn resolve_native<'db>(
        &self,
        database: &'db ProteinDatabase,
        symbols: &SymbolMap,
    ) -> PipelineResult<&'db str> {
        if let Some(transcript) = &self.transcript {
            return database
                .by_transcript_id(transcript)
                .map(|record| record.sequence.as_str())
                .ok_or_else(|| PipelineError::UnmappedTranscript { transcript: transcript.clone() });
        }

        let candidates = self.candidates(database, symbols);
        if candidates.is_empty() {
            return Err(PipelineError::UnmappedGene { gene: self.gene.clone() });
        }

        candidates
            .iter()
            .copied()
            .find(|record| self.mutations.values().all(|m| m.is_consistent_with(&record.sequence)))
            .map(|record| {
                debug!("{}/{} resolved to {}", self.tumor, self.gene, record.protein_id);
                record.sequence.as_str()
            })
            .ok_or_else(|| PipelineError::NoConsistentNative {
                gene: self.gene.clone(),
                candidates: candidates.len(),
            })
    }

    fn candidates<'db>(
        &self,
        database: &'db ProteinDatabase,
        symbols: &SymbolMap,
    ) -> Vec<&'db ProteinRecord> {
        let mut seen = HashSet::new();
        let by_symbol = database.by_gene_symbol(&self.gene);
        let by_gene_id = symbols
            .get(&self.gene)
            .into_iter()
            .flat_map(|gene_id| database.by_gene_id(&gene_id));

        by_symbol
            .into_iter()
            .chain(by_gene_id)
            .filter(|record| seen.insert(record.protein_id.as_str()))
            .collect()
    }
}
