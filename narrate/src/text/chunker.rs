//! Sentence-packing chunker for speech requests.

use log::debug;

/// Default chunk budget in characters.
pub const DEFAULT_MAX_CHUNK_SIZE: usize = 4000;

/// Clause delimiters tried, in order, when one sentence exceeds the budget.
const DELIMITERS: &[&str] = &[";", ":", ",", " - "];

fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Greedy packer: joins pieces with single spaces while they fit in `max_size`.
///
/// A piece that is longer than `max_size` on its own is emitted unchanged, so
/// callers must re-split those.
struct Packer {
    max_size: usize,
    chunks: Vec<String>,
    current: String,
    current_len: usize,
}

impl Packer {
    fn new(max_size: usize) -> Self {
        Self {
            max_size,
            chunks: Vec::new(),
            current: String::new(),
            current_len: 0,
        }
    }

    fn push(&mut self, piece: &str) {
        let len = char_len(piece);
        let needed = if self.current.is_empty() {
            len
        } else {
            self.current_len + 1 + len
        };

        if needed <= self.max_size || self.current.is_empty() {
            if !self.current.is_empty() {
                self.current.push(' ');
            }
            self.current.push_str(piece);
            self.current_len = needed;
        } else {
            self.flush();
            self.current = piece.to_string();
            self.current_len = len;
        }
    }

    /// Emit pre-split pieces as chunks of their own.
    fn push_whole(&mut self, pieces: Vec<String>) {
        self.flush();
        self.chunks.extend(pieces.into_iter().filter(|p| !p.is_empty()));
    }

    fn flush(&mut self) {
        if !self.current.is_empty() {
            self.chunks.push(std::mem::take(&mut self.current));
        }
        self.current_len = 0;
    }

    fn finish(mut self) -> Vec<String> {
        self.flush();
        self.chunks
    }
}

/// Split plain text into chunks of at most `max_chunk_size` characters.
///
/// The text is split on `.`; each non-empty sentence is re-terminated with a
/// period and packed greedily into the current chunk. Sentences longer than the
/// budget are broken at clause delimiters, then words, then characters. A
/// budget of zero is treated as one.
pub fn split_text(text: &str, max_chunk_size: usize) -> Vec<String> {
    let max_size = max_chunk_size.max(1);
    let mut packer = Packer::new(max_size);

    for sentence in text.split('.') {
        let words: Vec<&str> = sentence.split_whitespace().collect();
        if words.is_empty() {
            continue;
        }
        let sentence = format!("{}.", words.join(" "));

        if char_len(&sentence) > max_size {
            packer.push_whole(split_long_sentence(&sentence, max_size, 0));
        } else {
            packer.push(&sentence);
        }
    }

    let chunks = packer.finish();
    debug!("Text split into {} chunks", chunks.len());
    chunks
}

/// Split one over-long sentence at natural break points.
///
/// `depth` indexes into [`DELIMITERS`]; past the last delimiter the sentence is
/// split on words.
fn split_long_sentence(sentence: &str, max_size: usize, depth: usize) -> Vec<String> {
    if char_len(sentence) <= max_size {
        return vec![sentence.to_string()];
    }

    let Some(delimiter) = DELIMITERS.get(depth) else {
        return split_on_words(sentence, max_size);
    };

    if !sentence.contains(delimiter) {
        return split_long_sentence(sentence, max_size, depth + 1);
    }

    let mut packer = Packer::new(max_size);
    for piece in pieces_with_delimiter(sentence, delimiter) {
        packer.push(&piece);
    }

    packer
        .finish()
        .into_iter()
        .flat_map(|chunk| split_long_sentence(&chunk, max_size, depth + 1))
        .collect()
}

/// Split on `delimiter`, keeping the delimiter at the end of each piece.
///
/// A spaced delimiter keeps its leading space, so ` - ` ends a piece as `word -`.
fn pieces_with_delimiter(sentence: &str, delimiter: &str) -> Vec<String> {
    let parts: Vec<&str> = sentence.split(delimiter).collect();
    let last = parts.len() - 1;
    let suffix = delimiter.trim_end();

    parts
        .iter()
        .enumerate()
        .filter_map(|(i, part)| {
            let part = part.trim();
            match (part.is_empty(), i == last) {
                (true, true) => None,
                (true, false) if suffix.trim().is_empty() => None,
                (true, false) => Some(suffix.trim().to_string()),
                (false, true) => Some(part.to_string()),
                (false, false) => Some(format!("{}{}", part, suffix)),
            }
        })
        .collect()
}

/// Split text on word boundaries; words longer than the budget are hard split.
fn split_on_words(text: &str, max_size: usize) -> Vec<String> {
    let mut packer = Packer::new(max_size);

    for word in text.split_whitespace() {
        if char_len(word) > max_size {
            packer.push_whole(hard_split(word, max_size));
        } else {
            packer.push(word);
        }
    }

    packer.finish()
}

/// Hard split text at exact character positions (last resort).
fn hard_split(text: &str, max_size: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    chars
        .chunks(max_size)
        .map(|c| c.iter().collect())
        .collect()
}
