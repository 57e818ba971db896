//! Value normalization helpers used before comparison.

use crate::constants::sex::{FEMALE, MALE};

/// Synonym table mapping accepted sex tokens (lowercased) to canonical tokens.
const SEX_SYNONYMS: [(&str, &str); 4] = [
    ("male", MALE),
    ("female", FEMALE),
    (MALE, MALE),
    (FEMALE, FEMALE),
];

/// Canonicalize a requested sex token.
///
/// Matching is case-insensitive. Tokens outside the synonym table are
/// returned unchanged rather than rejected.
pub fn normalize_sex(token: &str) -> String {
    let lowered = token.to_lowercase();
    SEX_SYNONYMS
        .iter()
        .find(|(alias, _)| *alias == lowered)
        .map(|(_, canonical)| (*canonical).to_string())
        .unwrap_or_else(|| token.to_string())
}

/// Whether `token` is one of the canonical stored sex values.
pub fn is_canonical_sex(token: &str) -> bool {
    token == MALE || token == FEMALE
}
