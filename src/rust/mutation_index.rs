use std::collections::{BTreeSet, HashMap};

use tracing::debug;

use crate::errors::PipelineResult;
use crate::mutation::{Mutation, MutationGroup};
use crate::types::CellFraction;

/// Composite (tumor, gene symbol) key.
pub type GroupKey = (String, String);

/// Outcome of building one group: the key is kept even when construction fails
/// so the caller can report which group was lost.
#[derive(Debug)]
pub struct GroupEntry {
    pub tumor: String,
    pub gene: String,
    pub group: PipelineResult<MutationGroup>,
}

/// Mutations indexed by (tumor, gene).
#[derive(Debug, Clone, Default)]
pub struct MutationIndex {
    mutations: HashMap<GroupKey, Vec<Mutation>>,
}

impl MutationIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, mutation: Mutation) {
        self.mutations
            .entry((mutation.tumor.clone(), mutation.gene.clone()))
            .or_default()
            .push(mutation);
    }

    /// Raw mutations recorded for one tumor and gene, in insertion order.
    pub fn get(&self, tumor: &str, gene: &str) -> &[Mutation] {
        self.mutations
            .get(&(tumor.to_string(), gene.to_string()))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn tumors(&self) -> BTreeSet<&str> {
        self.mutations.keys().map(|(tumor, _)| tumor.as_str()).collect()
    }

    /// Total number of raw mutations.
    pub fn len(&self) -> usize {
        self.mutations.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.mutations.is_empty()
    }

    /// Number of distinct (tumor, gene) pairs.
    pub fn group_count(&self) -> usize {
        self.mutations.len()
    }

    /// Builds one group per (tumor, gene), sorted by tumor then gene.
    pub fn group(&self) -> Vec<GroupEntry> {
        self.build_groups(|_| true)
    }

    /// Like [`MutationIndex::group`], keeping only mutations whose cell
    /// fraction reaches `min_fraction`. Groups left empty are omitted.
    pub fn group_filtered(&self, min_fraction: CellFraction) -> Vec<GroupEntry> {
        self.build_groups(|m| m.cell_fraction.get() >= min_fraction.get())
    }

    fn build_groups<F>(&self, keep: F) -> Vec<GroupEntry>
    where
        F: Fn(&Mutation) -> bool,
    {
        let mut keys: Vec<&GroupKey> = self.mutations.keys().collect();
        keys.sort();

        let mut entries = Vec::with_capacity(keys.len());
        for key in keys {
            let kept: Vec<Mutation> =
                self.mutations[key].iter().filter(|m| keep(m)).cloned().collect();
            if kept.is_empty() {
                debug!("{}/{}: no mutations pass the cell fraction filter", key.0, key.1);
                continue;
            }
            entries.push(GroupEntry {
                tumor: key.0.clone(),
                gene: key.1.clone(),
                group: MutationGroup::new(kept),
            });
        }
        entries
    }
}

impl FromIterator<Mutation> for MutationIndex {
    fn from_iter<T: IntoIterator<Item = Mutation>>(iter: T) -> Self {
        let mut index = Self::new();
        index.extend(iter);
        index
    }
}

impl Extend<Mutation> for MutationIndex {
    fn extend<T: IntoIterator<Item = Mutation>>(&mut self, iter: T) {
        for mutation in iter {
            self.add(mutation);
        }
    }
}
