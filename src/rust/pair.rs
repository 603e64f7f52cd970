use std::fmt;
use std::io::{Read, Write};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::{PipelineError, PipelineResult};
use crate::fragment::FragmentRange;

pub const PAIR_COLUMNS: [&str; 6] =
    ["TumorBarcode", "HugoSymbol", "RangeLower", "RangeUpper", "SelfPeptide", "NeoPeptide"];

/// Header line of the pair output, without a trailing newline.
pub const PAIR_HEADER: &str = "TumorBarcode\tHugoSymbol\tRangeLower\tRangeUpper\tSelfPeptide\tNeoPeptide";

/// Which side of a pair a peptide belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PeptideKind {
    /// Wild-type fragment
    SelfPeptide,
    /// Mutated fragment
    NeoPeptide,
}

/// A wild-type fragment and its mutated counterpart over one window.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PeptidePairRecord {
    pub tumor: String,
    pub gene: String,
    pub range: FragmentRange,
    pub self_peptide: String,
    pub neo_peptide: String,
}

impl PeptidePairRecord {
    pub fn peptide(&self, kind: PeptideKind) -> &str {
        match kind {
            PeptideKind::SelfPeptide => &self.self_peptide,
            PeptideKind::NeoPeptide => &self.neo_peptide,
        }
    }

    /// Number of residues that differ between the self and neo peptides.
    pub fn mismatches(&self) -> usize {
        self.self_peptide.bytes().zip(self.neo_peptide.bytes()).filter(|(a, b)| a != b).count()
    }
}

impl fmt::Display for PeptidePairRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\t{}\t{}\t{}\t{}\t{}",
            self.tumor,
            self.gene,
            self.range.lower,
            self.range.upper,
            self.self_peptide,
            self.neo_peptide
        )
    }
}

impl FromStr for PeptidePairRecord {
    type Err = PipelineError;

    fn from_str(line: &str) -> PipelineResult<Self> {
        let fields: Vec<&str> = line.trim_end_matches(['\r', '\n']).split('\t').collect();
        let [tumor, gene, lower, upper, self_peptide, neo_peptide] = fields[..] else {
            return Err(PipelineError::ParseError(format!(
                "pair line needs {} tab-separated fields, found {}",
                PAIR_COLUMNS.len(),
                fields.len()
            )));
        };
        PairRow {
            tumor: tumor.to_string(),
            gene: gene.to_string(),
            lower: lower.parse().map_err(|_| {
                PipelineError::ParseError(format!("invalid range lower bound '{}'", lower))
            })?,
            upper: upper.parse().map_err(|_| {
                PipelineError::ParseError(format!("invalid range upper bound '{}'", upper))
            })?,
            self_peptide: self_peptide.to_string(),
            neo_peptide: neo_peptide.to_string(),
        }
        .try_into()
    }
}

// Flat row shape used for the csv reader and writer
#[derive(Debug, Serialize, Deserialize)]
struct PairRow {
    #[serde(rename = "TumorBarcode")]
    tumor: String,
    #[serde(rename = "HugoSymbol")]
    gene: String,
    #[serde(rename = "RangeLower")]
    lower: usize,
    #[serde(rename = "RangeUpper")]
    upper: usize,
    #[serde(rename = "SelfPeptide")]
    self_peptide: String,
    #[serde(rename = "NeoPeptide")]
    neo_peptide: String,
}

impl From<&PeptidePairRecord> for PairRow {
    fn from(record: &PeptidePairRecord) -> Self {
        Self {
            tumor: record.tumor.clone(),
            gene: record.gene.clone(),
            lower: record.range.lower,
            upper: record.range.upper,
            self_peptide: record.self_peptide.clone(),
            neo_peptide: record.neo_peptide.clone(),
        }
    }
}

impl TryFrom<PairRow> for PeptidePairRecord {
    type Error = PipelineError;

    fn try_from(row: PairRow) -> PipelineResult<Self> {
        let range = FragmentRange::new(row.lower, row.upper)?;
        if row.self_peptide.len() != range.span() || row.neo_peptide.len() != range.span() {
            return Err(PipelineError::ValidationError {
                message: format!(
                    "peptides {}/{} do not span range {}",
                    row.self_peptide, row.neo_peptide, range
                ),
            });
        }
        Ok(Self {
            tumor: row.tumor,
            gene: row.gene,
            range,
            self_peptide: row.self_peptide,
            neo_peptide: row.neo_peptide,
        })
    }
}

/// Writes the header and one tab-delimited line per record.
pub fn write_pairs<W: Write>(writer: W, records: &[PeptidePairRecord]) -> PipelineResult<()> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .quote_style(csv::QuoteStyle::Never)
        .from_writer(writer);
    if records.is_empty() {
        writer.write_record(PAIR_COLUMNS)?;
    }
    for record in records {
        writer.serialize(PairRow::from(record))?;
    }
    writer.flush()?;
    Ok(())
}

/// Reads pair records written by [`write_pairs`].
pub fn read_pairs<R: Read>(reader: R) -> PipelineResult<Vec<PeptidePairRecord>> {
    let mut reader = csv::ReaderBuilder::new().delimiter(b'\t').quoting(false).from_reader(reader);
    let headers = reader.headers()?;
    if headers.iter().ne(PAIR_COLUMNS) {
        return Err(PipelineError::ParseError(format!(
            "unexpected pair header: {}",
            headers.iter().collect::<Vec<_>>().join("\t")
        )));
    }

    let mut records = Vec::new();
    for row in reader.deserialize::<PairRow>() {
        let record: PeptidePairRecord = row?.try_into()?;
        records.push(record);
    }
    Ok(records)
}
