const SHORT_TEXT_LIMIT: usize = 1000;
const MAX_CHUNK_SIZE: usize = 500;

/// Chunk geometry derived from the total length of a document.
///
/// Short documents (< 1000 characters) become a single chunk. Longer ones use a
/// tenth of their length capped at 500 characters, with a fifth of that as overlap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkingPolicy {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
}

impl ChunkingPolicy {
    pub fn for_text_length(text_len: usize) -> Self {
        let chunk_size = if text_len < SHORT_TEXT_LIMIT {
            text_len
        } else {
            MAX_CHUNK_SIZE.min(text_len / 10)
        };
        let chunk_overlap = if text_len < SHORT_TEXT_LIMIT {
            0
        } else {
            chunk_size / 5
        };

        Self {
            chunk_size: chunk_size.max(1),
            chunk_overlap,
        }
    }

    pub fn for_text(text: &str) -> Self {
        Self::for_text_length(text.chars().count())
    }
}
