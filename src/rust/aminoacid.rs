use crate::errors::{PipelineError, PipelineResult};

/// The 20 natural amino acids, the only residues a missense call may name
pub const STANDARD_AA: [char; 20] = [
    'A', 'C', 'D', 'E', 'F', 'G', 'H', 'I', 'K', 'L', 'M', 'N', 'P', 'Q', 'R', 'S', 'T', 'V', 'W',
    'Y',
];

pub const SPECIAL_AA: [char; 4] = ['X', 'U', 'O', '*'];

/// Ambiguity codes that may appear in reference proteomes
pub const AMBIGUOUS_AA: [char; 3] = ['B', 'Z', 'J'];

/// Returns true for one of the 20 natural amino acids.
pub fn is_standard_aa(aa: char) -> bool {
    STANDARD_AA.contains(&aa)
}

/// Returns true for any residue code accepted in a reference sequence.
pub fn is_valid_aa(aa: char) -> bool {
    // Put the most common (99.9%) case, of the 20 standard amino acids first
    STANDARD_AA.contains(&aa) || SPECIAL_AA.contains(&aa) || AMBIGUOUS_AA.contains(&aa)
}

/// Parses a single-letter residue code, accepting only the natural alphabet.
pub fn parse_standard_aa(token: &str) -> PipelineResult<char> {
    let mut chars = token.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if is_standard_aa(c.to_ascii_uppercase()) => Ok(c.to_ascii_uppercase()),
        _ => Err(PipelineError::ParseError(format!("Not a natural amino acid code: '{}'", token))),
    }
}

/// Validates a reference protein sequence.
///
/// Every character must be a recognised residue code. Positions in the
/// error are 1-based.
pub fn validate_sequence(sequence: &str) -> PipelineResult<()> {
    for (i, c) in sequence.chars().enumerate() {
        if !is_valid_aa(c) {
            return Err(PipelineError::InvalidAminoAcid(c, i + 1));
        }
    }
    Ok(())
}

/// Residue at a 1-based position, if it lies inside the sequence.
pub fn residue_at(sequence: &str, position: usize) -> Option<char> {
    if position == 0 {
        return None;
    }
    sequence.as_bytes().get(position - 1).map(|&b| b as char)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::test_fixtures::{TEST_PROTEIN, TEST_PROTEIN_INVALID};

    #[test]
    fn test_valid_amino_acids() {
        for c in STANDARD_AA.iter() {
            assert!(is_valid_aa(*c));
            assert!(is_standard_aa(*c));
        }

        // Test ambiguous codes
        assert!(is_valid_aa('B'));
        assert!(is_valid_aa('Z'));
        assert!(is_valid_aa('J'));
        assert!(!is_standard_aa('B'));

        // Test special amino acids
        assert!(is_valid_aa('X'));
        assert!(is_valid_aa('U'));
        assert!(is_valid_aa('*'));
        assert!(!is_standard_aa('*'));

        // Test invalid characters
        assert!(!is_valid_aa('1'));
        assert!(!is_valid_aa('$'));
        assert!(!is_valid_aa('a'));
    }

    #[test]
    fn test_parse_standard_aa() {
        assert_eq!(parse_standard_aa("K").unwrap(), 'K');
        assert_eq!(parse_standard_aa("k").unwrap(), 'K');
        assert!(parse_standard_aa("").is_err());
        assert!(parse_standard_aa("KA").is_err());
        assert!(parse_standard_aa("*").is_err());
        assert!(parse_standard_aa("X").is_err());
    }

    #[test]
    fn test_sequence_validation() {
        assert!(validate_sequence(TEST_PROTEIN).is_ok());
        assert!(validate_sequence("ACDEFGHIKLMNPQRSTVWY").is_ok());
        assert!(validate_sequence("ACDEFXBZJU").is_ok());

        let result = validate_sequence(TEST_PROTEIN_INVALID);
        assert!(result.is_err());
        // Contains invalid character '1'
        assert!(result.unwrap_err().to_string().contains("Invalid amino acid '1'"));
    }

    #[test]
    fn test_residue_at() {
        assert_eq!(residue_at("MPKLNSTF", 1), Some('M'));
        assert_eq!(residue_at("MPKLNSTF", 3), Some('K'));
        assert_eq!(residue_at("MPKLNSTF", 8), Some('F'));
        assert_eq!(residue_at("MPKLNSTF", 9), None);
        assert_eq!(residue_at("MPKLNSTF", 0), None);
    }
}
