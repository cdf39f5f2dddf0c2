//! **Text budget** — bound what the synthesizer is asked to speak.
//!
//! Long replies make TTS latency blow past any reasonable deadline, so the
//! audio channel gets at most `limit` characters plus an ellipsis. The display
//! channel is never routed through this module: the user always reads the full
//! reply even when they hear a shortened one.

/// Marker appended to speech text that was cut short.
pub const ELLIPSIS: char = '…';

/// Apply the speech character budget. Returns the text to hand to the
/// synthesizer and whether it was shortened. A `limit` of 0 disables the
/// budget. Cuts on `char` boundaries, so multi-byte text is never split
/// mid-character.
pub fn apply(text: &str, limit: usize) -> (String, bool) {
    if limit == 0 || text.chars().count() <= limit {
        return (text.to_string(), false);
    }
    let mut spoken: String = text.chars().take(limit).collect();
    spoken.push(ELLIPSIS);
    (spoken, true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_passes_through() {
        let (spoken, truncated) = apply("你好", 33);
        assert_eq!(spoken, "你好");
        assert!(!truncated);
    }

    #[test]
    fn text_at_limit_passes_through() {
        let text = "a".repeat(33);
        let (spoken, truncated) = apply(&text, 33);
        assert_eq!(spoken, text);
        assert!(!truncated);
    }

    #[test]
    fn long_text_is_cut_with_marker() {
        let text = "x".repeat(80);
        let (spoken, truncated) = apply(&text, 33);
        assert!(truncated);
        assert_eq!(spoken.chars().count(), 34); // 33 + ellipsis
        assert!(spoken.ends_with(ELLIPSIS));
        assert!(text.starts_with(spoken.trim_end_matches(ELLIPSIS)));
    }

    #[test]
    fn multibyte_text_cuts_on_char_boundary() {
        let text = "今日天氣很好我想去行山帶足水注意安全";
        let (spoken, truncated) = apply(text, 5);
        assert!(truncated);
        assert_eq!(spoken, "今日天氣很…");
    }

    #[test]
    fn zero_limit_disables_budget() {
        let text = "z".repeat(500);
        let (spoken, truncated) = apply(&text, 0);
        assert_eq!(spoken, text);
        assert!(!truncated);
    }
}
