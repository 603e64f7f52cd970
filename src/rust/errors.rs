use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Duplicate {kind} identifier in primary proteome: {id}")]
    DuplicateIdentifier { kind: &'static str, id: String },

    #[error("Gene {gene_id} already has symbol {existing}, refusing {conflicting}")]
    ConflictingGeneSymbol { gene_id: String, existing: String, conflicting: String },

    #[error("No protein record with {kind} {id}")]
    NotFound { kind: &'static str, id: String },

    #[error("Inconsistent mutation group: {message}")]
    InconsistentGroup { message: String },

    #[error(
        "Ambiguous mutations for {tumor}/{gene} at position {position}: {first} vs {second} with equal cell fraction"
    )]
    AmbiguousMutation { tumor: String, gene: String, position: usize, first: char, second: char },

    #[error("Residue mismatch at position {position}: expected '{expected}', found '{found}'")]
    ResidueMismatch { position: usize, expected: char, found: char },

    #[error("Position {position} is outside a sequence of length {length}")]
    OutOfRange { position: usize, length: usize },

    #[error("Transcript {transcript} is not present in the proteome")]
    UnmappedTranscript { transcript: String },

    #[error("Gene {gene} has no protein records")]
    UnmappedGene { gene: String },

    #[error("None of the {candidates} candidate proteins for {gene} match every native residue")]
    NoConsistentNative { gene: String, candidates: usize },

    #[error("Invalid amino acid '{0}' found at position {1}")]
    InvalidAminoAcid(char, usize),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("FASTA parsing error: {0}")]
    FastaParsing(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Anyhow error: {0}")]
    AnyhowError(#[from] anyhow::Error),

    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("Configuration error: {field} - {message}")]
    ConfigurationError { field: String, message: String },
}

impl PipelineError {
    /// Short stable name of the error variant, used to tally skipped groups.
    pub fn kind(&self) -> &'static str {
        match self {
            PipelineError::DuplicateIdentifier { .. } => "DuplicateIdentifier",
            PipelineError::ConflictingGeneSymbol { .. } => "ConflictingGeneSymbol",
            PipelineError::NotFound { .. } => "NotFound",
            PipelineError::InconsistentGroup { .. } => "InconsistentGroup",
            PipelineError::AmbiguousMutation { .. } => "AmbiguousMutation",
            PipelineError::ResidueMismatch { .. } => "ResidueMismatch",
            PipelineError::OutOfRange { .. } => "OutOfRange",
            PipelineError::UnmappedTranscript { .. } => "UnmappedTranscript",
            PipelineError::UnmappedGene { .. } => "UnmappedGene",
            PipelineError::NoConsistentNative { .. } => "NoConsistentNative",
            PipelineError::InvalidAminoAcid(..) => "InvalidAminoAcid",
            PipelineError::Io(_) => "Io",
            PipelineError::Csv(_) => "Csv",
            PipelineError::FastaParsing(_) => "FastaParsing",
            PipelineError::ParseError(_) => "ParseError",
            PipelineError::AnyhowError(_) => "Anyhow",
            PipelineError::ValidationError { .. } => "ValidationError",
            PipelineError::ConfigurationError { .. } => "ConfigurationError",
        }
    }
}

pub type PipelineResult<T> = Result<T, PipelineError>;

/// Extension trait for Result to add context
pub trait PipelineResultExt<T> {
    /// Add context to an error
    fn with_context<F>(self, f: F) -> PipelineResult<T>
    where
        F: FnOnce() -> String;

    /// Add context with a field name
    fn with_field_context(self, field: &str, message: &str) -> PipelineResult<T>;
}

impl<T, E> PipelineResultExt<T> for Result<T, E>
where
    E: Into<PipelineError>,
{
    fn with_context<F>(self, f: F) -> PipelineResult<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| {
            let context = f();
            match e.into() {
                PipelineError::ValidationError { message } => {
                    PipelineError::ValidationError { message: format!("{}: {}", context, message) }
                }
                PipelineError::ParseError(message) => {
                    PipelineError::ParseError(format!("{}: {}", context, message))
                }
                other => {
                    PipelineError::ValidationError { message: format!("{}: {}", context, other) }
                }
            }
        })
    }

    fn with_field_context(self, field: &str, message: &str) -> PipelineResult<T> {
        self.map_err(|e| PipelineError::ConfigurationError {
            field: field.to_string(),
            message: format!("{}: {}", message, e.into()),
        })
    }
}
