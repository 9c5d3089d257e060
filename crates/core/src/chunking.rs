#[derive(Debug, Clone, Copy)]
pub struct ChunkingConfig {
    pub chunk_size: usize,
    pub overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1_000,
            overlap: 100,
        }
    }
}

/// Splits `text` into overlapping chunks, preferring to cut at a paragraph
/// break, then a sentence break, then a plain space, as long as the break
/// falls in the second half of the window. The break delimiter stays with
/// the emitted chunk; chunks are trimmed before emission.
///
/// Indices are char positions, so multi-byte input never splits inside a
/// code point.
pub fn chunk_text(text: &str, config: ChunkingConfig) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    let chunk_size = config.chunk_size.max(1);

    let mut chunks = Vec::new();
    let mut start = 0usize;

    while start < chars.len() {
        let window_end = (start + chunk_size).min(chars.len());
        let end = if window_end < chars.len() {
            find_break(&chars, start, window_end, chunk_size)
        } else {
            window_end
        };

        let piece: String = chars[start..end].iter().collect();
        let trimmed = piece.trim();
        if !trimmed.is_empty() {
            chunks.push(trimmed.to_string());
        }

        // Degenerate configs (overlap >= chunk length) must still make
        // forward progress.
        let next = end.saturating_sub(config.overlap);
        start = if next > start { next } else { end };
    }

    chunks
}

fn find_break(chars: &[char], start: usize, window_end: usize, chunk_size: usize) -> usize {
    let floor = start + chunk_size / 2;

    if let Some(index) = rfind_pair(chars, floor, window_end, '\n', '\n') {
        return index + 2;
    }
    if let Some(index) = rfind_pair(chars, floor, window_end, '.', ' ') {
        return index + 1;
    }
    for index in (floor..window_end).rev() {
        if chars[index] == ' ' {
            return index + 1;
        }
    }

    window_end
}

fn rfind_pair(chars: &[char], floor: usize, end: usize, first: char, second: char) -> Option<usize> {
    let upper = end.saturating_sub(1);
    (floor..upper)
        .rev()
        .find(|&index| chars[index] == first && chars[index + 1] == second)
}
