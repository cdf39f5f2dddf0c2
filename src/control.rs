//! **Control signals** — reserved bracket tokens that toggle voice output.
//!
//! The assistant reserves the opening-bracket family (`（`, `(`, `[`) to switch
//! voice output on and the closing family (`）`, `)`, `]`) to switch it off.
//! A token counts only when the whole trimmed input is made of characters from
//! one family; brackets inside ordinary text are punctuation, not commands.

/// Outcome of scanning one input for a voice-output command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlSignal {
    /// Turn voice output on
    Enable,
    /// Turn voice output off
    Disable,
    /// Ordinary conversational text
    None,
}

/// The reserved token character sets. Both sets are configurable; the defaults
/// match the bracket families users can type (or dictate) on CJK and Latin
/// keyboards alike.
#[derive(Debug, Clone)]
pub struct ControlTokens {
    /// Characters whose standalone occurrence enables voice output.
    pub enable: Vec<char>,
    /// Characters whose standalone occurrence disables voice output.
    pub disable: Vec<char>,
}

impl Default for ControlTokens {
    fn default() -> Self {
        Self {
            enable: vec!['（', '(', '['],
            disable: vec!['）', ')', ']'],
        }
    }
}

/// Detects control signals in free text. Pure and total: every input maps to
/// exactly one [`ControlSignal`], never an error.
#[derive(Debug, Clone, Default)]
pub struct ControlParser {
    tokens: ControlTokens,
}

impl ControlParser {
    pub fn new(tokens: ControlTokens) -> Self {
        Self { tokens }
    }

    /// Classify one input. The trimmed input must be non-empty and consist
    /// entirely of characters from a single family to count as a command;
    /// everything else (including empty input) is `None`.
    pub fn parse(&self, input: &str) -> ControlSignal {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return ControlSignal::None;
        }
        if trimmed.chars().all(|c| self.tokens.enable.contains(&c)) {
            return ControlSignal::Enable;
        }
        if trimmed.chars().all(|c| self.tokens.disable.contains(&c)) {
            return ControlSignal::Disable;
        }
        ControlSignal::None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_tokens_are_commands() {
        let parser = ControlParser::default();
        assert_eq!(parser.parse("（"), ControlSignal::Enable);
        assert_eq!(parser.parse("("), ControlSignal::Enable);
        assert_eq!(parser.parse("["), ControlSignal::Enable);
        assert_eq!(parser.parse("）"), ControlSignal::Disable);
        assert_eq!(parser.parse(")"), ControlSignal::Disable);
        assert_eq!(parser.parse("]"), ControlSignal::Disable);
    }

    #[test]
    fn surrounding_whitespace_is_ignored() {
        let parser = ControlParser::default();
        assert_eq!(parser.parse("  （  "), ControlSignal::Enable);
        assert_eq!(parser.parse("\n)\n"), ControlSignal::Disable);
    }

    #[test]
    fn repeated_tokens_still_count() {
        let parser = ControlParser::default();
        assert_eq!(parser.parse("（（"), ControlSignal::Enable);
        assert_eq!(parser.parse("))"), ControlSignal::Disable);
    }

    #[test]
    fn embedded_brackets_are_not_commands() {
        let parser = ControlParser::default();
        assert_eq!(parser.parse("請幫我查天氣（今天）"), ControlSignal::None);
        assert_eq!(parser.parse("see (above)"), ControlSignal::None);
        assert_eq!(parser.parse("開語音（"), ControlSignal::None);
    }

    #[test]
    fn mixed_families_are_not_commands() {
        let parser = ControlParser::default();
        assert_eq!(parser.parse("()"), ControlSignal::None);
        assert_eq!(parser.parse("（）"), ControlSignal::None);
    }

    #[test]
    fn empty_input_is_none() {
        let parser = ControlParser::default();
        assert_eq!(parser.parse(""), ControlSignal::None);
        assert_eq!(parser.parse("   "), ControlSignal::None);
    }

    #[test]
    fn custom_tokens() {
        let parser = ControlParser::new(ControlTokens {
            enable: vec!['+'],
            disable: vec!['-'],
        });
        assert_eq!(parser.parse("+"), ControlSignal::Enable);
        assert_eq!(parser.parse("-"), ControlSignal::Disable);
        assert_eq!(parser.parse("（"), ControlSignal::None);
    }
}
