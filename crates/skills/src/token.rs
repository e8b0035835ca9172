//! Token estimation utilities.
//!
//! Uses a character-based heuristic: ~4 characters per token, rounded to
//! the nearest whole token. This is an approximation of BPE tokenizers on
//! English text, not an exact count; budgets built on it are soft.

/// Estimate the token count for a string.
///
/// Heuristic: 1 token ≈ 4 characters (Unicode scalar values), rounded
/// half up. Any input, including the empty string, yields a defined value.
pub fn estimate_tokens(text: &str) -> usize {
    let chars = text.chars().count();
    (chars + 2) / 4
}
