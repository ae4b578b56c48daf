/// Characters assumed per LLM token.
pub const CHARS_PER_TOKEN: usize = 4;

/// Approximate token count: `ceil(chars / 4)`, counting Unicode scalar values.
///
/// This is a heuristic for sizing chunks and reporting totals, not the output
/// of a real tokenizer. Empty text is 0 tokens; any non-empty text is at least 1.
pub fn estimate_tokens(text: &str) -> usize {
    text.chars().count().div_ceil(CHARS_PER_TOKEN)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_up_per_four_chars() {
        assert_eq!(estimate_tokens(""), 0);
        assert_eq!(estimate_tokens("a"), 1);
        assert_eq!(estimate_tokens("abcd"), 1);
        assert_eq!(estimate_tokens("abcde"), 2);
        assert_eq!(estimate_tokens(&"x".repeat(400)), 100);
    }

    #[test]
    fn counts_chars_not_bytes() {
        // 4 chars, 8 bytes
        assert_eq!(estimate_tokens("éééé"), 1);
    }
}
