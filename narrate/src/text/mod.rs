//! Text processing for narration: Markdown stripping, cleaning, and chunking.

pub mod chunker;
mod cleaner;
pub mod markdown;

pub use chunker::{DEFAULT_MAX_CHUNK_SIZE, split_text};
pub use markdown::markdown_to_plain_text;

/// A chunk of plain text ready for one speech request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextChunk {
    /// Ordinal within the document, starting at 1
    pub index: usize,
    /// The text content
    pub text: String,
}

impl TextChunk {
    /// Create a new text chunk.
    pub fn new(index: usize, text: String) -> Self {
        Self { index, text }
    }
}

/// Strip a Markdown document and split it into numbered chunks.
pub fn prepare_chunks(markdown: &str, max_chunk_size: usize) -> Vec<TextChunk> {
    let plain = markdown_to_plain_text(markdown);

    split_text(&plain, max_chunk_size)
        .into_iter()
        .enumerate()
        .map(|(i, text)| TextChunk::new(i + 1, text))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_chunk_creation() {
        let chunk = TextChunk::new(1, "Hello world".to_string());
        assert_eq!(chunk.index, 1);
        assert_eq!(chunk.text, "Hello world");
    }

    #[test]
    fn test_prepare_chunks_numbers_from_one() {
        let markdown = "# Title\n\nFirst sentence. Second sentence. Third sentence.";
        let chunks = prepare_chunks(markdown, 20);

        assert!(chunks.len() > 1);
        for (i, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.index, i + 1);
            assert!(chunk.text.chars().count() <= 20);
        }
        assert_eq!(chunks[0].text, "Title.");
    }

    #[test]
    fn test_prepare_chunks_empty_document() {
        assert!(prepare_chunks("", 4000).is_empty());
        assert!(prepare_chunks("---\n\n> \n", 4000).is_empty());
    }
}
