use serde::{Deserialize, Serialize};

use crate::aminoacid::validate_sequence;
use crate::errors::{PipelineError, PipelineResult};
use crate::fasta::FastaRecord;

/// Strips an Ensembl-style `.N` version suffix from an identifier.
///
/// Only a purely numeric suffix counts as a version, so ids that contain
/// dots for other reasons are left alone.
pub fn strip_version(id: &str) -> &str {
    match id.rsplit_once('.') {
        Some((base, version))
            if !base.is_empty()
                && !version.is_empty()
                && version.bytes().all(|b| b.is_ascii_digit()) =>
        {
            base
        }
        _ => id,
    }
}

// One reference protein, as read from a peptide FASTA
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProteinRecord {
    pub protein_id: String,
    pub transcript_id: String,
    pub gene_id: String,
    pub gene_symbol: Option<String>,
    pub biotype: Option<String>,
    pub sequence: String,
}

impl ProteinRecord {
    pub fn new(
        protein_id: &str,
        transcript_id: &str,
        gene_id: &str,
        gene_symbol: Option<&str>,
        biotype: Option<&str>,
        sequence: &str,
    ) -> Self {
        Self {
            protein_id: strip_version(protein_id).to_string(),
            transcript_id: strip_version(transcript_id).to_string(),
            gene_id: strip_version(gene_id).to_string(),
            gene_symbol: gene_symbol.map(str::to_string),
            biotype: biotype.map(str::to_string),
            sequence: sequence.to_string(),
        }
    }

    /// Builds a record from a FASTA entry whose comment carries
    /// `gene:`, `transcript:`, `gene_symbol:`, `gene_biotype:` and
    /// `transcript_biotype:` tokens. Unknown tokens are ignored.
    pub fn from_fasta(record: &FastaRecord) -> PipelineResult<Self> {
        let mut gene_id = None;
        let mut transcript_id = None;
        let mut gene_symbol = None;
        let mut gene_biotype = None;
        let mut transcript_biotype = None;

        for token in record.comment.split_whitespace() {
            let Some((tag, value)) = token.split_once(':') else {
                continue;
            };
            if value.is_empty() {
                continue;
            }
            match tag {
                "gene" => gene_id = Some(value),
                "transcript" => transcript_id = Some(value),
                "gene_symbol" => gene_symbol = Some(value),
                "gene_biotype" => gene_biotype = Some(value),
                "transcript_biotype" => transcript_biotype = Some(value),
                _ => {}
            }
        }

        let gene_id = gene_id.ok_or_else(|| {
            PipelineError::FastaParsing(format!("{}: header has no gene: tag", record.key))
        })?;
        let transcript_id = transcript_id.ok_or_else(|| {
            PipelineError::FastaParsing(format!("{}: header has no transcript: tag", record.key))
        })?;

        let sequence = record.sequence.strip_suffix('*').unwrap_or(&record.sequence);
        validate_sequence(sequence).map_err(|e| {
            PipelineError::FastaParsing(format!("{}: {}", record.key, e))
        })?;

        Ok(Self::new(
            &record.key,
            transcript_id,
            gene_id,
            gene_symbol,
            transcript_biotype.or(gene_biotype),
            sequence,
        ))
    }

    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fasta(key: &str, comment: &str, sequence: &str) -> FastaRecord {
        FastaRecord { key: key.to_string(), comment: comment.to_string(), sequence: sequence.to_string() }
    }

    #[test]
    fn test_strip_version() {
        assert_eq!(strip_version("ENSP00000451042.1"), "ENSP00000451042");
        assert_eq!(strip_version("ENST00000390559.12"), "ENST00000390559");
        assert_eq!(strip_version("ENSG00000211905"), "ENSG00000211905");
        assert_eq!(strip_version("ABC.x1"), "ABC.x1");
        assert_eq!(strip_version(".1"), ".1");
        assert_eq!(strip_version("ENSP1."), "ENSP1.");
    }

    #[test]
    fn test_from_ensembl_header() {
        let record = fasta(
            "ENSP00000256078.5",
            "pep chromosome:GRCh38:12:25205246:25250929:-1 gene:ENSG00000133703.14 \
             transcript:ENST00000256078.10 gene_biotype:protein_coding \
             transcript_biotype:protein_coding gene_symbol:KRAS description:KRAS proto-oncogene",
            "MTEYKLVVVGAGGVGKSALT*",
        );
        let protein = ProteinRecord::from_fasta(&record).unwrap();

        assert_eq!(protein.protein_id, "ENSP00000256078");
        assert_eq!(protein.transcript_id, "ENST00000256078");
        assert_eq!(protein.gene_id, "ENSG00000133703");
        assert_eq!(protein.gene_symbol.as_deref(), Some("KRAS"));
        assert_eq!(protein.biotype.as_deref(), Some("protein_coding"));
        assert_eq!(protein.sequence, "MTEYKLVVVGAGGVGKSALT");
    }

    #[test]
    fn test_biotype_falls_back_to_gene_biotype() {
        let record = fasta("P1", "gene:G1 transcript:T1 gene_biotype:IG_C_gene", "MPK");
        let protein = ProteinRecord::from_fasta(&record).unwrap();
        assert_eq!(protein.biotype.as_deref(), Some("IG_C_gene"));
        assert_eq!(protein.gene_symbol, None);
    }

    #[test]
    fn test_missing_tags_are_errors() {
        let err = ProteinRecord::from_fasta(&fasta("P1", "transcript:T1", "MPK")).unwrap_err();
        assert!(err.to_string().contains("no gene: tag"));

        let err = ProteinRecord::from_fasta(&fasta("P1", "gene:G1", "MPK")).unwrap_err();
        assert!(err.to_string().contains("no transcript: tag"));
    }

    #[test]
    fn test_invalid_residue_is_an_error() {
        let err =
            ProteinRecord::from_fasta(&fasta("P1", "gene:G1 transcript:T1", "MP1K")).unwrap_err();
        assert!(err.to_string().contains("Invalid amino acid '1'"));
    }
}
