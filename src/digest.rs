//! Dedup keys for persisted questions.

use sha2::{Digest, Sha256};

/// Length of a digest in hex characters.
pub const DIGEST_LEN: usize = 64;

/// Digest of a question's text, used as its vault document key.
///
/// The text is trimmed and lowercased first, so the same question pasted with
/// different casing or surrounding whitespace maps to the same record.
pub fn question_digest(text: &str) -> String {
    let normalized = text.trim().to_lowercase();
    let hash = Sha256::digest(normalized.as_bytes());
    hash.iter().map(|b| format!("{:02x}", b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_case_and_surrounding_whitespace() {
        let a = question_digest("What SKU tier supports zone redundancy?");
        let b = question_digest("  what sku TIER supports zone redundancy?\n");
        assert_eq!(a, b);
    }

    #[test]
    fn distinct_questions_have_distinct_digests() {
        assert_ne!(
            question_digest("What is LRS?"),
            question_digest("What is ZRS?")
        );
    }

    #[test]
    fn output_is_fixed_width_lowercase_hex() {
        for input in ["", "a", "Some Longer Question With CAPS"] {
            let d = question_digest(input);
            assert_eq!(d.len(), DIGEST_LEN);
            assert!(d.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        }
    }

    #[test]
    fn matches_known_sha256() {
        // sha256("abc")
        assert_eq!(
            question_digest("  ABC "),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
