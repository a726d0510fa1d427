//! Merging and overlap utilities used by the chunking pipeline.

use tracing::warn;

use super::types::ChunkingConfig;

/// Length in characters (Unicode scalar values), the unit every size in the
/// chunker is measured in.
pub(crate) fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// The last `n` characters of `text`, or all of it when shorter.
pub(crate) fn tail_chars(text: &str, n: usize) -> &str {
    let len = char_len(text);
    if len <= n {
        return text;
    }
    match text.char_indices().nth(len - n) {
        Some((byte_idx, _)) => &text[byte_idx..],
        None => text,
    }
}

/// The first `n` characters of `text`, or all of it when shorter.
pub(crate) fn head_chars(text: &str, n: usize) -> &str {
    match text.char_indices().nth(n) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

/// Greedily join consecutive pieces with a single space while the result stays
/// within `chunk_size`, then drop merged chunks shorter than `min_chunk_size`.
///
/// The size filter only applies when more than one chunk was produced. If it
/// would remove every chunk, it is skipped and the merged chunks are kept.
pub(crate) fn merge_small_chunks(pieces: Vec<String>, config: &ChunkingConfig) -> Vec<String> {
    let mut merged: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for piece in pieces {
        let piece_len = char_len(&piece);
        let joined_len = if current.is_empty() {
            piece_len
        } else {
            current_len + 1 + piece_len
        };

        if joined_len <= config.chunk_size() {
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(&piece);
            current_len = joined_len;
        } else {
            if !current.is_empty() {
                merged.push(std::mem::take(&mut current));
            }
            current_len = piece_len;
            current = piece;
        }
    }
    if !current.is_empty() {
        merged.push(current);
    }

    if merged.len() <= 1 {
        return merged;
    }

    let min = config.min_chunk_size();
    let kept: Vec<String> = merged
        .iter()
        .filter(|c| char_len(c) >= min)
        .cloned()
        .collect();

    if kept.is_empty() {
        warn!(
            chunks = merged.len(),
            min_chunk_size = min,
            "every merged chunk is below min_chunk_size, keeping them all"
        );
        return merged;
    }
    kept
}

/// Prefix every chunk after the first with the trailing `overlap` characters
/// of its predecessor, cut forward to the first space so the carried text
/// starts on a word boundary.
pub(crate) fn add_overlap(chunks: Vec<String>, overlap: usize) -> Vec<String> {
    if overlap == 0 || chunks.len() <= 1 {
        return chunks;
    }

    let mut overlapped = Vec::with_capacity(chunks.len());
    for (i, chunk) in chunks.iter().enumerate() {
        if i == 0 {
            overlapped.push(chunk.clone());
            continue;
        }
        let carried = overlap_text(&chunks[i - 1], overlap);
        if carried.is_empty() {
            overlapped.push(chunk.clone());
        } else {
            overlapped.push(format!("{carried} {chunk}"));
        }
    }
    overlapped
}

/// Trailing context taken from `previous` for the next chunk.
pub(crate) fn overlap_text(previous: &str, overlap: usize) -> &str {
    let tail = tail_chars(previous, overlap);
    let tail = match tail.find(' ') {
        Some(idx) => &tail[idx + 1..],
        None => tail,
    };
    tail.trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(chunk_size: usize, overlap: usize, min: usize) -> ChunkingConfig {
        ChunkingConfig::with_sizes(chunk_size, overlap, min).unwrap()
    }

    fn strings(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn tail_and_head_respect_char_boundaries() {
        assert_eq!(tail_chars("héllo wörld", 5), "wörld");
        assert_eq!(tail_chars("abc", 10), "abc");
        assert_eq!(head_chars("héllo", 2), "hé");
        assert_eq!(head_chars("hé", 50), "hé");
    }

    #[test]
    fn merge_joins_with_single_space_within_limit() {
        let merged = merge_small_chunks(strings(&["aaaa", "bbbb", "cccccccc"]), &config(10, 0, 0));
        assert_eq!(merged, vec!["aaaa bbbb", "cccccccc"]);
    }

    #[test]
    fn merge_counts_the_joining_space() {
        // 5 + 1 + 5 = 11 would exceed the limit of 10.
        let merged = merge_small_chunks(strings(&["aaaaa", "bbbbb"]), &config(10, 0, 0));
        assert_eq!(merged, vec!["aaaaa", "bbbbb"]);
    }

    #[test]
    fn merge_drops_chunks_below_min_size() {
        let merged = merge_small_chunks(
            strings(&["a".repeat(9).as_str(), "b".repeat(9).as_str(), "ccc"]),
            &config(10, 0, 5),
        );
        assert_eq!(merged, vec!["a".repeat(9), "b".repeat(9)]);
    }

    #[test]
    fn merge_keeps_a_lone_small_chunk() {
        let merged = merge_small_chunks(strings(&["tiny"]), &config(100, 0, 50));
        assert_eq!(merged, vec!["tiny"]);
    }

    #[test]
    fn merge_keeps_everything_when_filter_would_empty_output() {
        let merged = merge_small_chunks(strings(&["a".repeat(6).as_str(), "b".repeat(6).as_str()]), &config(10, 0, 9));
        assert_eq!(merged, vec!["a".repeat(6), "b".repeat(6)]);
    }

    #[test]
    fn overlap_starts_on_word_boundary() {
        let out = add_overlap(strings(&["alpha beta gamma delta", "next chunk"]), 10);
        assert_eq!(out[0], "alpha beta gamma delta");
        assert_eq!(out[1], "delta next chunk");
    }

    #[test]
    fn overlap_without_spaces_keeps_raw_slice() {
        let out = add_overlap(strings(&["abcdefghij", "klm"]), 4);
        assert_eq!(out[1], "ghij klm");
    }

    #[test]
    fn overlap_tail_starting_with_space_keeps_first_word() {
        // The 6-char tail is " ab cd": cutting after its leading space keeps "ab".
        assert_eq!(overlap_text("xx ab cd", 6), "ab cd");
        let out = add_overlap(strings(&["xx ab cd", "ef"]), 6);
        assert_eq!(out[1], "ab cd ef");
    }

    #[test]
    fn overlap_uses_pre_overlap_predecessor() {
        let out = add_overlap(strings(&["one two", "three four", "five"]), 6);
        // Chunk 2 carries from "three four", not from the already-prefixed chunk 1.
        assert_eq!(out, vec!["one two", "two three four", "four five"]);
    }

    #[test]
    fn zero_overlap_or_single_chunk_is_identity() {
        let chunks = strings(&["a b", "c d"]);
        assert_eq!(add_overlap(chunks.clone(), 0), chunks);
        assert_eq!(add_overlap(strings(&["solo"]), 5), vec!["solo"]);
    }

    #[test]
    fn empty_overlap_adds_no_leading_space() {
        let out = add_overlap(strings(&["ends with space ", "next"]), 1);
        assert_eq!(out[1], "next");
    }
}
