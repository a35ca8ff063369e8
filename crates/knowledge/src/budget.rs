//! Greedy word-budget trimming.

use crate::types::Context;

/// Outcome of [`trim_to_budget`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrimOutcome {
    /// Longest prefix of the input that fits the budget
    pub kept: Vec<Context>,

    /// Everything from the first overflowing context onward
    pub dropped: Vec<Context>,

    /// Words across `kept`
    pub total_words: usize,
}

impl TrimOutcome {
    /// True when the very first context alone exceeded the budget.
    pub fn overflowed_at_start(&self) -> bool {
        self.kept.is_empty() && !self.dropped.is_empty()
    }

    /// Index of the first context that did not fit, if any.
    pub fn stopped_at(&self) -> Option<usize> {
        if self.dropped.is_empty() {
            None
        } else {
            Some(self.kept.len())
        }
    }
}

/// Keep contexts in order while the running word total stays within `budget`.
///
/// Stops at the first context that would overflow; later contexts are never
/// considered, even if they would fit on their own.
pub fn trim_to_budget(mut contexts: Vec<Context>, budget: usize) -> TrimOutcome {
    let mut total_words = 0usize;
    let mut split = contexts.len();

    for (index, context) in contexts.iter().enumerate() {
        let words = context.word_count();
        if total_words + words > budget {
            split = index;
            break;
        }
        total_words += words;
    }

    let dropped = contexts.split_off(split);

    TrimOutcome {
        kept: contexts,
        dropped,
        total_words,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(id: i64, words: usize) -> Context {
        Context::new(id, format!("Article {}", id), vec!["w"; words].join(" "))
    }

    #[test]
    fn test_everything_fits() {
        let outcome = trim_to_budget(vec![ctx(1, 100), ctx(2, 200)], 3500);
        assert_eq!(outcome.kept.len(), 2);
        assert_eq!(outcome.total_words, 300);
        assert_eq!(outcome.stopped_at(), None);
        assert!(!outcome.overflowed_at_start());
    }

    #[test]
    fn test_stops_at_first_overflow() {
        let contexts = (1..=10).map(|id| ctx(id, 2000)).collect();
        let outcome = trim_to_budget(contexts, 3500);
        assert_eq!(outcome.kept.len(), 1);
        assert_eq!(outcome.kept[0].article_id, 1);
        assert_eq!(outcome.total_words, 2000);
        assert_eq!(outcome.stopped_at(), Some(1));
    }

    #[test]
    fn test_later_small_context_is_not_reconsidered() {
        let outcome = trim_to_budget(vec![ctx(1, 3000), ctx(2, 1000), ctx(3, 10)], 3500);
        let ids: Vec<i64> = outcome.kept.iter().map(|c| c.article_id).collect();
        assert_eq!(ids, vec![1]);
        assert_eq!(outcome.dropped.len(), 2);
    }

    #[test]
    fn test_first_context_overflows() {
        let outcome = trim_to_budget(vec![ctx(1, 4000), ctx(2, 10)], 3500);
        assert!(outcome.kept.is_empty());
        assert!(outcome.overflowed_at_start());
        assert_eq!(outcome.stopped_at(), Some(0));
    }

    #[test]
    fn test_exact_budget_fits() {
        let outcome = trim_to_budget(vec![ctx(1, 1500), ctx(2, 2000)], 3500);
        assert_eq!(outcome.kept.len(), 2);
        assert_eq!(outcome.total_words, 3500);
    }

    #[test]
    fn test_trimming_is_idempotent() {
        let contexts = vec![ctx(1, 1000), ctx(2, 2000), ctx(3, 800)];
        let once = trim_to_budget(contexts, 3500);
        let twice = trim_to_budget(once.kept.clone(), 3500);
        assert_eq!(once.kept, twice.kept);
        assert_eq!(once.total_words, twice.total_words);
        assert!(twice.dropped.is_empty());
    }

    #[test]
    fn test_kept_is_prefix_of_input() {
        let contexts: Vec<Context> = vec![ctx(5, 10), ctx(9, 20), ctx(2, 5000), ctx(4, 1)];
        let outcome = trim_to_budget(contexts.clone(), 100);
        assert_eq!(outcome.kept[..], contexts[..outcome.kept.len()]);
        assert_eq!(outcome.dropped[..], contexts[outcome.kept.len()..]);
    }

    #[test]
    fn test_empty_input() {
        let outcome = trim_to_budget(Vec::new(), 3500);
        assert!(outcome.kept.is_empty());
        assert!(!outcome.overflowed_at_start());
        assert_eq!(outcome.total_words, 0);
    }
}
