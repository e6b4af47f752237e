//! Text chunking strategies.
//!
//! This module provides the [`Chunker`] trait and two implementations:
//!
//! - [`RecursiveChunker`] - ends each chunk at the best available boundary
//!   (paragraph, then line, then sentence, then word)
//! - [`FixedSizeChunker`] - splits by character count only
//!
//! Both measure length in `char`s, never split inside a UTF-8 sequence, and
//! start every chunk after the first exactly `chunk_overlap` characters before
//! the end of its predecessor.

/// A strategy for splitting text into bounded, overlapping pieces.
pub trait Chunker: Send + Sync {
    /// Split `text` into chunks.
    ///
    /// Returns an empty `Vec` for empty input.
    fn split_text(&self, text: &str) -> Vec<String>;
}

/// Boundary levels, most preferred first. Separators within one level are
/// equally good; the latest match in the window wins.
const BOUNDARY_LEVELS: &[&[&str]] = &[&["\n\n"], &["\n"], &[". ", "! ", "? "], &[" "]];

/// Splits text into chunks of at most `chunk_size` characters, preferring to
/// end each chunk on a paragraph, line, sentence, or word boundary.
///
/// A boundary is only accepted if the chunk it produces is longer than the
/// overlap, so splitting always makes progress. When no boundary fits, the
/// chunk is cut at exactly `chunk_size` characters.
///
/// # Example
///
/// ```rust,ignore
/// use redrag_rag::{Chunker, RecursiveChunker};
///
/// let chunker = RecursiveChunker::new(1000, 200);
/// let chunks = chunker.split_text(&text);
/// ```
#[derive(Debug, Clone)]
pub struct RecursiveChunker {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl RecursiveChunker {
    /// Create a new `RecursiveChunker`.
    ///
    /// # Arguments
    ///
    /// * `chunk_size` - maximum number of characters per chunk
    /// * `chunk_overlap` - number of characters shared by consecutive chunks
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self { chunk_size, chunk_overlap }
    }
}

impl Chunker for RecursiveChunker {
    fn split_text(&self, text: &str) -> Vec<String> {
        split_windows(text, self.chunk_size, self.chunk_overlap, find_boundary)
    }
}

/// Splits text into fixed-size character windows with overlap.
#[derive(Debug, Clone)]
pub struct FixedSizeChunker {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl FixedSizeChunker {
    /// Create a new `FixedSizeChunker`.
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self { chunk_size, chunk_overlap }
    }
}

impl Chunker for FixedSizeChunker {
    fn split_text(&self, text: &str) -> Vec<String> {
        split_windows(text, self.chunk_size, self.chunk_overlap, |_, _, _| None)
    }
}

/// Walk `text` in windows of `chunk_size` chars. `pick_end` may choose an
/// earlier end inside `[min_end, max_end]`; otherwise the window is cut hard.
fn split_windows<F>(text: &str, chunk_size: usize, chunk_overlap: usize, pick_end: F) -> Vec<String>
where
    F: Fn(&[char], usize, usize) -> Option<usize>,
{
    let chars: Vec<char> = text.chars().collect();
    if chars.is_empty() {
        return Vec::new();
    }

    let size = chunk_size.max(1);
    let overlap = chunk_overlap.min(size - 1);

    let mut chunks = Vec::new();
    let mut start = 0;

    loop {
        if chars.len() - start <= size {
            chunks.push(chars[start..].iter().collect());
            break;
        }

        let max_end = start + size;
        let min_end = start + overlap + 1;
        let end = pick_end(&chars, min_end, max_end).unwrap_or(max_end);

        chunks.push(chars[start..end].iter().collect());
        start = end - overlap;
    }

    chunks
}

/// Find the end index (exclusive, just past the separator) of the best
/// boundary in `[min_end, max_end]`.
fn find_boundary(chars: &[char], min_end: usize, max_end: usize) -> Option<usize> {
    for level in BOUNDARY_LEVELS {
        let best = level
            .iter()
            .filter_map(|separator| last_separator_end(chars, separator, min_end, max_end))
            .max();
        if best.is_some() {
            return best;
        }
    }
    None
}

fn last_separator_end(chars: &[char], separator: &str, min_end: usize, max_end: usize) -> Option<usize> {
    let sep: Vec<char> = separator.chars().collect();
    let lowest = min_end.max(sep.len());
    (lowest..=max_end).rev().find(|&end| chars[end - sep.len()..end] == sep[..])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_produces_no_chunks() {
        assert!(RecursiveChunker::new(10, 2).split_text("").is_empty());
        assert!(FixedSizeChunker::new(10, 2).split_text("").is_empty());
    }

    #[test]
    fn short_text_is_a_single_chunk() {
        let chunks = RecursiveChunker::new(100, 20).split_text("Redis is fast.");
        assert_eq!(chunks, vec!["Redis is fast.".to_string()]);
    }

    #[test]
    fn prefers_paragraph_breaks_over_sentences() {
        let text = "First sentence. Second one.\n\nNext paragraph here.";
        let chunks = RecursiveChunker::new(35, 0).split_text(text);
        assert_eq!(chunks[0], "First sentence. Second one.\n\n");
        assert_eq!(chunks[1], "Next paragraph here.");
    }

    #[test]
    fn falls_back_to_sentence_then_word_boundaries() {
        let text = "One two three. Four five six seven eight";
        let chunks = RecursiveChunker::new(20, 0).split_text(text);
        assert_eq!(chunks[0], "One two three. ");

        let words = RecursiveChunker::new(10, 0).split_text("alpha beta gamma delta");
        assert_eq!(words[0], "alpha ");
    }

    #[test]
    fn hard_cuts_unbroken_text() {
        let chunks = RecursiveChunker::new(4, 1).split_text("abcdefghij");
        assert_eq!(chunks, vec!["abcd", "defg", "ghij"]);
    }

    #[test]
    fn fixed_size_ignores_boundaries() {
        let chunks = FixedSizeChunker::new(6, 2).split_text("ab cd ef gh");
        assert_eq!(chunks, vec!["ab cd ", "d ef g", " gh"]);
    }

    #[test]
    fn multibyte_text_is_split_on_char_boundaries() {
        let chunks = FixedSizeChunker::new(3, 1).split_text("日本語のテキスト");
        assert!(chunks.iter().all(|c| c.chars().count() <= 3));
        assert_eq!(chunks[0], "日本語");
        assert_eq!(chunks[1], "語のテ");
    }

    #[test]
    fn oversized_overlap_still_makes_progress() {
        let chunks = FixedSizeChunker::new(3, 10).split_text("abcdef");
        assert_eq!(chunks, vec!["abc", "bcd", "cde", "def"]);
    }
}
