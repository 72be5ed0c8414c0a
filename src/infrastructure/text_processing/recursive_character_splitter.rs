use std::ops::Range;

use async_trait::async_trait;

use crate::application::ports::{TextSplitter, TextSplitterError};
use crate::domain::{Chunk, ChunkingPolicy, SessionId};

/// Boundaries tried in order before falling back to hard character cuts.
const SEPARATORS: [&str; 4] = ["\n\n", "\n", ". ", " "];

/// Splits on the coarsest boundary that fits, then merges the pieces back
/// into chunks of at most `chunk_size` characters.
///
/// Separators stay attached to the piece they end, so the pieces tile the
/// input exactly and consecutive chunks always touch or overlap.
pub struct RecursiveCharacterSplitter {
    policy: Option<ChunkingPolicy>,
}

impl RecursiveCharacterSplitter {
    /// Sizes every split from the length of the text being split.
    pub fn adaptive() -> Self {
        Self { policy: None }
    }

    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self {
            policy: Some(ChunkingPolicy {
                chunk_size,
                chunk_overlap,
            }),
        }
    }

    fn policy_for(&self, text: &str) -> ChunkingPolicy {
        self.policy.unwrap_or_else(|| ChunkingPolicy::for_text(text))
    }
}

#[async_trait]
impl TextSplitter for RecursiveCharacterSplitter {
    async fn split(
        &self,
        text: &str,
        session_id: SessionId,
    ) -> Result<Vec<Chunk>, TextSplitterError> {
        let chars: Vec<char> = text.chars().collect();
        if chars.is_empty() {
            return Ok(Vec::new());
        }

        let policy = self.policy_for(text);
        if policy.chunk_size == 0 || policy.chunk_overlap >= policy.chunk_size {
            return Err(TextSplitterError::SplittingFailed(format!(
                "invalid chunk geometry: size {}, overlap {}",
                policy.chunk_size, policy.chunk_overlap
            )));
        }

        let separators: Vec<Vec<char>> = SEPARATORS.iter().map(|s| s.chars().collect()).collect();

        let mut pieces = Vec::new();
        split_pieces(
            &chars,
            0..chars.len(),
            &separators,
            policy.chunk_size,
            &mut pieces,
        );

        let chunks = merge_pieces(&pieces, policy)
            .into_iter()
            .map(|range| {
                let offset = range.start;
                Chunk::new(chars[range].iter().collect(), session_id, offset)
            })
            .collect::<Vec<_>>();

        tracing::debug!(
            chunk_size = policy.chunk_size,
            chunk_overlap = policy.chunk_overlap,
            chunk_count = chunks.len(),
            "Text split"
        );

        Ok(chunks)
    }
}

fn split_pieces(
    chars: &[char],
    range: Range<usize>,
    separators: &[Vec<char>],
    max_len: usize,
    out: &mut Vec<Range<usize>>,
) {
    if range.len() <= max_len {
        out.push(range);
        return;
    }

    let Some((sep_index, sep)) = separators
        .iter()
        .enumerate()
        .find(|(_, sep)| contains(&chars[range.clone()], sep))
    else {
        hard_cut(range, max_len, out);
        return;
    };

    let finer = &separators[sep_index + 1..];
    let mut start = range.start;
    let mut cursor = range.start;

    while cursor + sep.len() <= range.end {
        if chars[cursor..cursor + sep.len()] == sep[..] {
            let end = cursor + sep.len();
            split_pieces(chars, start..end, finer, max_len, out);
            start = end;
            cursor = end;
        } else {
            cursor += 1;
        }
    }

    if start < range.end {
        split_pieces(chars, start..range.end, finer, max_len, out);
    }
}

fn hard_cut(range: Range<usize>, max_len: usize, out: &mut Vec<Range<usize>>) {
    let mut start = range.start;
    while start < range.end {
        let end = (start + max_len).min(range.end);
        out.push(start..end);
        start = end;
    }
}

fn contains(haystack: &[char], needle: &[char]) -> bool {
    !needle.is_empty() && haystack.windows(needle.len()).any(|w| w == needle)
}

/// Greedy merge. Each new chunk re-opens with the trailing pieces of the
/// previous one that fit inside the overlap budget.
fn merge_pieces(pieces: &[Range<usize>], policy: ChunkingPolicy) -> Vec<Range<usize>> {
    let mut chunks = Vec::new();
    if pieces.is_empty() {
        return chunks;
    }

    let mut first = 0;
    let mut current_len = 0;

    for (index, piece) in pieces.iter().enumerate() {
        let piece_len = piece.len();

        if current_len + piece_len > policy.chunk_size && index > first {
            chunks.push(pieces[first].start..pieces[index - 1].end);

            let mut new_first = index;
            let mut carried = 0;
            while new_first > first + 1 {
                let candidate = pieces[new_first - 1].len();
                if carried + candidate > policy.chunk_overlap
                    || carried + candidate + piece_len > policy.chunk_size
                {
                    break;
                }
                carried += candidate;
                new_first -= 1;
            }

            first = new_first;
            current_len = carried;
        }

        current_len += piece_len;
    }

    chunks.push(pieces[first].start..pieces[pieces.len() - 1].end);
    chunks
}

