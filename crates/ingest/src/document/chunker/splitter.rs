//! Separator-hierarchy recursive splitting.

use super::helpers::char_len;

/// Split `text` into pieces of at most `chunk_size` characters, preferring the
/// earliest separator in `separators` that occurs in the text.
///
/// Pieces that are still too large after splitting on one separator are split
/// again with the remaining, finer separators. The empty separator slices the
/// text into fixed-size runs and ends the recursion.
pub(crate) fn recursive_split(text: &str, separators: &[String], chunk_size: usize) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }
    if char_len(text) <= chunk_size {
        return vec![text.to_string()];
    }

    for (idx, sep) in separators.iter().enumerate() {
        if sep.is_empty() {
            return split_by_size(text, chunk_size);
        }
        if text.contains(sep.as_str()) {
            return split_on(text, sep, &separators[idx + 1..], chunk_size);
        }
    }

    split_by_size(text, chunk_size)
}

/// Split on one separator, greedily packing consecutive pieces back together
/// while they fit, and recursing into pieces that are too large on their own.
fn split_on(text: &str, sep: &str, finer: &[String], chunk_size: usize) -> Vec<String> {
    let splits: Vec<&str> = text.split(sep).collect();
    let last = splits.len().saturating_sub(1);

    let mut result = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for (i, split) in splits.iter().enumerate() {
        // Re-attach the separator so no content is lost; the final piece had none.
        let piece = if i < last {
            format!("{split}{sep}")
        } else {
            split.to_string()
        };
        let piece_len = char_len(&piece);

        if current_len + piece_len <= chunk_size {
            current.push_str(&piece);
            current_len += piece_len;
            continue;
        }

        flush(&mut result, &current);
        current.clear();
        current_len = 0;

        if piece_len > chunk_size {
            let sub_pieces = if finer.is_empty() {
                split_by_size(&piece, chunk_size)
            } else {
                recursive_split(&piece, finer, chunk_size)
            };
            result.extend(sub_pieces.into_iter().filter(|p| !p.trim().is_empty()));
        } else {
            current_len = piece_len;
            current = piece;
        }
    }

    flush(&mut result, &current);
    result
}

/// Push the trimmed buffer, skipping buffers that held only whitespace.
fn flush(result: &mut Vec<String>, buffer: &str) {
    let trimmed = buffer.trim();
    if !trimmed.is_empty() {
        result.push(trimmed.to_string());
    }
}

/// Slice `text` into runs of exactly `chunk_size` characters; the last run may
/// be shorter.
pub(crate) fn split_by_size(text: &str, chunk_size: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    chars
        .chunks(chunk_size.max(1))
        .map(|run| run.iter().collect())
        .collect()
}
