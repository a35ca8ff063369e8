//! Whitespace word chunking.
//!
//! Words are maximal runs of non-whitespace characters. Chunks borrow from
//! the source text, so only the final context strings are allocated.

use std::str::SplitWhitespace;

/// Number of whitespace-separated words in `text`.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// First `max_words` words of `text`, re-joined with single spaces.
pub fn truncate_words(text: &str, max_words: usize) -> String {
    text.split_whitespace()
        .take(max_words)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Lazily split `text` into consecutive chunks of at most `max_words` words.
///
/// A zero `max_words` is treated as one. Each chunk is a slice of `text`
/// running from its first word to its last, so inner whitespace is kept.
pub fn chunk_words(text: &str, max_words: usize) -> Chunks<'_> {
    Chunks {
        text,
        words: text.split_whitespace(),
        max_words: max_words.max(1),
    }
}

/// Iterator returned by [`chunk_words`].
///
/// Cloning it restarts iteration from the current position.
#[derive(Debug, Clone)]
pub struct Chunks<'a> {
    text: &'a str,
    words: SplitWhitespace<'a>,
    max_words: usize,
}

impl<'a> Chunks<'a> {
    fn offset_of(&self, word: &str) -> usize {
        word.as_ptr() as usize - self.text.as_ptr() as usize
    }
}

impl<'a> Iterator for Chunks<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        let first = self.words.next()?;
        let start = self.offset_of(first);
        let mut end = start + first.len();

        for _ in 1..self.max_words {
            match self.words.next() {
                Some(word) => end = self.offset_of(word) + word.len(),
                None => break,
            }
        }

        Some(&self.text[start..end])
    }
}
