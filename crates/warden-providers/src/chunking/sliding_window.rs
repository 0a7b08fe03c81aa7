use warden_domain::ports::Tokenizer;

/// Splits `content` into overlapping line-aligned windows of at most
/// `max_chunk_tokens` tokens each, with `overlap_tokens` of trailing
/// context carried into the next window. Returns `(text, start_line,
/// end_line)` triples, both 1-based and relative to the start of
/// `content`.
///
/// Splits never occur mid-line: a window always ends on a line boundary.
pub fn sliding_window_segments(
    content: &str,
    tokenizer: &dyn Tokenizer,
    max_chunk_tokens: u32,
    overlap_tokens: u32,
) -> Vec<(String, u32, u32)> {
    let lines: Vec<&str> = content.lines().collect();
    if lines.is_empty() {
        return Vec::new();
    }

    let mut segments = Vec::new();
    let mut start_idx = 0usize;

    while start_idx < lines.len() {
        let mut end_idx = start_idx;
        let mut token_count = 0u32;
        while end_idx < lines.len() {
            let line_tokens = tokenizer.count_tokens(lines[end_idx]) as u32 + 1; // +1 for the newline
            if end_idx > start_idx && token_count + line_tokens > max_chunk_tokens {
                break;
            }
            token_count += line_tokens;
            end_idx += 1;
        }
        // guarantee progress even for a single line exceeding the budget
        if end_idx == start_idx {
            end_idx = start_idx + 1;
        }

        let text = lines[start_idx..end_idx].join("\n");
        segments.push((text, start_idx as u32 + 1, end_idx as u32));

        if end_idx >= lines.len() {
            break;
        }

        // walk back from end_idx to carry overlap_tokens of trailing context
        let mut overlap_count = 0u32;
        let mut overlap_start = end_idx;
        while overlap_start > start_idx {
            let candidate = overlap_start - 1;
            let line_tokens = tokenizer.count_tokens(lines[candidate]) as u32 + 1;
            if overlap_count + line_tokens > overlap_tokens {
                break;
            }
            overlap_count += line_tokens;
            overlap_start = candidate;
        }
        start_idx = overlap_start.max(start_idx + 1);
    }

    segments
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::HeuristicTokenizer;

    #[test]
    fn single_short_line_yields_one_segment() {
        let tokenizer = HeuristicTokenizer::new();
        let segments = sliding_window_segments("hello world", &tokenizer, 100, 10);
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0], ("hello world".to_string(), 1, 1));
    }

    #[test]
    fn long_content_splits_into_multiple_overlapping_segments() {
        let tokenizer = HeuristicTokenizer::new();
        let content = (0..200).map(|i| format!("line number {i} of test content")).collect::<Vec<_>>().join("\n");
        let segments = sliding_window_segments(&content, &tokenizer, 50, 10);
        assert!(segments.len() > 1);
        for (_, start, end) in &segments {
            assert!(start <= end);
        }
    }

    #[test]
    fn progress_is_always_made() {
        let tokenizer = HeuristicTokenizer::new();
        let content = "a\n".repeat(500);
        let segments = sliding_window_segments(&content, &tokenizer, 1, 0);
        assert!(!segments.is_empty());
    }
}
