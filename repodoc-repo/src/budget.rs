//! Content budgeting
//!
//! Content is cut to a character cap before it is stored or sent anywhere.
//! The cut is a plain prefix with no marker, so a budgeted string may be
//! incomplete.

use repodoc_core::BudgetConfig;

/// Named budgets, each with its own cap
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Budget {
    /// Content kept on the file record
    Record,
    /// Excerpts collected for technology detection
    AiContext,
    /// Snippets re-embedded into the README prompt
    PromptSnippet,
}

#[derive(Debug, Clone)]
pub struct ContentBudgeter {
    config: BudgetConfig,
}

impl ContentBudgeter {
    pub fn new(config: BudgetConfig) -> Self {
        Self { config }
    }

    pub fn cap(&self, budget: Budget) -> usize {
        match budget {
            Budget::Record => self.config.record_cap,
            Budget::AiContext => self.config.ai_context_cap,
            Budget::PromptSnippet => self.config.prompt_snippet_cap,
        }
    }

    /// Prefix of `content` holding at most the budget's cap in characters
    pub fn apply<'a>(&self, content: &'a str, budget: Budget) -> &'a str {
        char_prefix(content, self.cap(budget))
    }
}

impl Default for ContentBudgeter {
    fn default() -> Self {
        Self::new(BudgetConfig::default())
    }
}

/// First `max_chars` characters of `content`, cut on a char boundary
pub fn char_prefix(content: &str, max_chars: usize) -> &str {
    match content.char_indices().nth(max_chars) {
        Some((byte_index, _)) => &content[..byte_index],
        None => content,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_caps_are_ordered() {
        let budgeter = ContentBudgeter::default();
        assert_eq!(budgeter.cap(Budget::Record), 2000);
        assert_eq!(budgeter.cap(Budget::AiContext), 1500);
        assert_eq!(budgeter.cap(Budget::PromptSnippet), 1000);
    }

    #[test]
    fn test_within_cap_is_unchanged() {
        let budgeter = ContentBudgeter::default();
        let content = "fn main() {}\n";
        assert_eq!(budgeter.apply(content, Budget::PromptSnippet), content);

        let exact = "x".repeat(1000);
        assert_eq!(budgeter.apply(&exact, Budget::PromptSnippet), exact);
    }

    #[test]
    fn test_truncation_is_a_true_prefix() {
        let budgeter = ContentBudgeter::default();
        let content: String = (0..5000).map(|i| char::from(b'a' + (i % 26) as u8)).collect();

        for budget in [Budget::Record, Budget::AiContext, Budget::PromptSnippet] {
            let capped = budgeter.apply(&content, budget);
            assert_eq!(capped.chars().count(), budgeter.cap(budget));
            assert!(content.starts_with(capped));
        }
    }

    #[test]
    fn test_budgeting_is_idempotent() {
        let budgeter = ContentBudgeter::default();
        let content = "line\n".repeat(900);
        let once = budgeter.apply(&content, Budget::AiContext);
        let twice = budgeter.apply(once, Budget::AiContext);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_counts_characters_not_bytes() {
        let content = "héllo wörld";
        assert_eq!(char_prefix(content, 2), "hé");
        assert_eq!(char_prefix(content, 7), "héllo w");
        assert_eq!(char_prefix("日本語テキスト", 3), "日本語");
        assert_eq!(char_prefix("", 10), "");
        assert_eq!(char_prefix("abc", 0), "");
    }
}
