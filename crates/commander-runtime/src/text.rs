//! Text clipping for context digests and tool summaries.

/// Clip to at most `max_chars` characters, ending in `...` when shortened.
pub fn clip(text: &str, max_chars: usize) -> String {
    let text = text.trim();
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let keep = max_chars.saturating_sub(3);
    let mut clipped: String = text.chars().take(keep).collect();
    clipped.push_str("...");
    clipped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_text_untouched() {
        assert_eq!(clip("  hello ", 10), "hello");
    }

    #[test]
    fn test_clip_respects_limit() {
        let clipped = clip(&"x".repeat(500), 300);
        assert_eq!(clipped.chars().count(), 300);
        assert!(clipped.ends_with("..."));
    }

    #[test]
    fn test_clip_is_char_safe() {
        let clipped = clip(&"预算".repeat(20), 7);
        assert_eq!(clipped, "预算预算...");
    }
}
