//! Reader for MAF-style mutation tables.
//!
//! Malformed rows never abort a read. They are collected as [`RecordError`]s
//! next to the good mutations, and each one is logged as a warning, so the
//! core only ever sees well-formed [`Mutation`]s.

use std::io::Read;
use std::path::Path;

use tracing::{debug, info, warn};

use crate::errors::{PipelineError, PipelineResult};
use crate::io::open_input;
use crate::mutation::{Mutation, ProteinChange};
use crate::types::CellFraction;

pub const TUMOR_COLUMN: &str = "Tumor_Sample_Barcode";
pub const SYMBOL_COLUMN: &str = "Hugo_Symbol";
pub const TRANSCRIPT_COLUMN: &str = "Transcript_ID";
pub const CLASSIFICATION_COLUMN: &str = "Variant_Classification";
pub const MISSENSE_CLASSIFICATION: &str = "Missense_Mutation";
pub const PROTEIN_CHANGE_COLUMNS: [&str; 2] = ["HGVSp_Short", "Protein_Change"];
pub const CELL_FRACTION_COLUMNS: [&str; 2] = ["Cell_Fraction", "ccf"];

/// A rejected input row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordError {
    /// 1-based line number in the input, header included.
    pub line: u64,
    pub message: String,
}

/// Mutations read from a table together with the rows that were dropped.
#[derive(Debug, Default)]
pub struct MutationParseOutcome {
    pub mutations: Vec<Mutation>,
    pub errors: Vec<RecordError>,
    /// Rows skipped because they are not missense calls.
    pub skipped: usize,
}

struct Columns {
    tumor: usize,
    symbol: usize,
    change: usize,
    transcript: Option<usize>,
    cell_fraction: Option<usize>,
    classification: Option<usize>,
}

impl Columns {
    fn locate(headers: &csv::StringRecord) -> PipelineResult<Self> {
        let find = |name: &str| headers.iter().position(|h| h.trim() == name);
        let find_any = |names: &[&str]| names.iter().find_map(|name| find(name));
        let require = |name: &str, column: Option<usize>| {
            column.ok_or_else(|| {
                PipelineError::ParseError(format!("mutation table has no {} column", name))
            })
        };

        Ok(Self {
            tumor: require(TUMOR_COLUMN, find(TUMOR_COLUMN))?,
            symbol: require(SYMBOL_COLUMN, find(SYMBOL_COLUMN))?,
            change: require(PROTEIN_CHANGE_COLUMNS[0], find_any(&PROTEIN_CHANGE_COLUMNS))?,
            transcript: find(TRANSCRIPT_COLUMN),
            cell_fraction: find_any(&CELL_FRACTION_COLUMNS),
            classification: find(CLASSIFICATION_COLUMN),
        })
    }
}

/// Reads a (possibly compressed) mutation table from disk, or stdin for "-".
pub fn read_mutations_file<P: AsRef<Path>>(path: P) -> PipelineResult<MutationParseOutcome> {
    info!("Reading mutations from {}", path.as_ref().display());
    read_mutations(open_input(path)?)
}

/// Reads a tab-delimited mutation table with a header line.
///
/// Fails only when the header lacks a required column or the input itself
/// cannot be read.
pub fn read_mutations<R: Read>(reader: R) -> PipelineResult<MutationParseOutcome> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .comment(Some(b'#'))
        .flexible(true)
        .quoting(false)
        .from_reader(reader);

    let columns = Columns::locate(reader.headers()?)?;
    let mut outcome = MutationParseOutcome::default();

    for result in reader.records() {
        let record = match result {
            Ok(record) => record,
            Err(e) if matches!(e.kind(), csv::ErrorKind::Utf8 { .. }) => {
                let line = e.position().map(|p| p.line()).unwrap_or_default();
                warn!("Dropping mutation on line {}: {}", line, e);
                outcome.errors.push(RecordError { line, message: e.to_string() });
                continue;
            }
            Err(e) => return Err(e.into()),
        };
        let line = record.position().map(|p| p.line()).unwrap_or_default();

        if let Some(column) = columns.classification {
            let classification = record.get(column).unwrap_or_default().trim();
            if classification != MISSENSE_CLASSIFICATION {
                outcome.skipped += 1;
                continue;
            }
        }

        match parse_row(&record, &columns) {
            Ok(mutation) => outcome.mutations.push(mutation),
            Err(e) => {
                warn!("Dropping mutation on line {}: {}", line, e);
                outcome.errors.push(RecordError { line, message: e.to_string() });
            }
        }
    }

    debug!("Skipped {} non-missense rows", outcome.skipped);
    info!(
        "Read {} mutations, dropped {} malformed rows",
        outcome.mutations.len(),
        outcome.errors.len()
    );
    Ok(outcome)
}

fn required_field<'r>(
    record: &'r csv::StringRecord,
    index: usize,
    name: &str,
) -> PipelineResult<&'r str> {
    match record.get(index).map(str::trim) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(PipelineError::ParseError(format!("missing {}", name))),
    }
}

fn parse_row(record: &csv::StringRecord, columns: &Columns) -> PipelineResult<Mutation> {
    let tumor = required_field(record, columns.tumor, TUMOR_COLUMN)?;
    let symbol = required_field(record, columns.symbol, SYMBOL_COLUMN)?;
    let change: ProteinChange =
        required_field(record, columns.change, "protein change")?.parse()?;

    let transcript = columns
        .transcript
        .and_then(|index| record.get(index))
        .map(str::trim)
        .filter(|value| !value.is_empty());

    let cell_fraction = match columns.cell_fraction.and_then(|index| record.get(index)) {
        Some(value) if !value.trim().is_empty() => {
            let fraction: f64 = value.trim().parse().map_err(|_| {
                PipelineError::ParseError(format!("invalid cell fraction '{}'", value.trim()))
            })?;
            CellFraction::new(fraction).map_err(PipelineError::ParseError)?
        }
        _ => CellFraction::CLONAL,
    };

    Ok(Mutation::new(tumor, symbol, transcript, change, cell_fraction))
}
