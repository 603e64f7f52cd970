//! Streaming FASTA reader for reference proteomes.
//!
//! Each record keeps the header split in two: the `key` (first token after
//! `>`) and the free-text `comment` that follows it. Ensembl peptide files
//! carry their identifiers in that comment as `tag:value` tokens, which
//! [`crate::protein::ProteinRecord::from_fasta`] interprets.

use std::io::BufRead;
use std::path::Path;

use crate::errors::{PipelineError, PipelineResult};
use crate::io::open_input;

/// A FASTA record with its header split into key and comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FastaRecord {
    /// First whitespace-delimited token of the header.
    pub key: String,
    /// Remainder of the header line, trimmed.
    pub comment: String,
    /// Sequence with all line breaks and whitespace removed.
    pub sequence: String,
}

/// Sequential reader over any buffered source.
pub struct FastaReader<R: BufRead> {
    reader: R,
    line_buf: String,
    pending_header: Option<String>,
    line_number: usize,
}

impl FastaReader<Box<dyn BufRead>> {
    /// Opens a (possibly compressed) FASTA file, or stdin for "-".
    pub fn open<P: AsRef<Path>>(path: P) -> PipelineResult<Self> {
        Ok(Self::new(open_input(path)?))
    }
}

impl<R: BufRead> FastaReader<R> {
    pub fn new(reader: R) -> Self {
        Self { reader, line_buf: String::with_capacity(256), pending_header: None, line_number: 0 }
    }

    fn read_line(&mut self) -> PipelineResult<bool> {
        self.line_buf.clear();
        let read = self.reader.read_line(&mut self.line_buf)?;
        self.line_number += 1;
        Ok(read > 0)
    }

    /// Reads the next record, or `None` at end of input.
    pub fn read_next(&mut self) -> PipelineResult<Option<FastaRecord>> {
        let header = match self.pending_header.take() {
            Some(header) => header,
            None => loop {
                if !self.read_line()? {
                    return Ok(None);
                }
                let line = self.line_buf.trim();
                if line.is_empty() {
                    continue;
                }
                if let Some(header) = line.strip_prefix('>') {
                    break header.to_string();
                }
                return Err(PipelineError::FastaParsing(format!(
                    "line {}: sequence data before the first header",
                    self.line_number
                )));
            },
        };

        let (key, comment) = match header.split_once(char::is_whitespace) {
            Some((key, comment)) => (key.to_string(), comment.trim().to_string()),
            None => (header.trim().to_string(), String::new()),
        };
        if key.is_empty() {
            return Err(PipelineError::FastaParsing(format!(
                "line {}: header without an identifier",
                self.line_number
            )));
        }

        let mut sequence = String::new();
        while self.read_line()? {
            if let Some(next_header) = self.line_buf.trim_end().strip_prefix('>') {
                self.pending_header = Some(next_header.to_string());
                break;
            }
            sequence.extend(self.line_buf.chars().filter(|c| !c.is_whitespace()));
        }

        Ok(Some(FastaRecord { key, comment, sequence }))
    }
}

impl<R: BufRead> Iterator for FastaReader<R> {
    type Item = PipelineResult<FastaRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        self.read_next().transpose()
    }
}
