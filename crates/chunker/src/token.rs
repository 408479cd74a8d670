use crate::chunk::Chunk;
use crate::config::Strategy;
use crate::strategy::{ChunkingContext, ChunkingStrategy};
use once_cell::sync::Lazy;
use tiktoken_rs::{cl100k_base, CoreBPE};

static ENCODING: Lazy<CoreBPE> =
    Lazy::new(|| cl100k_base().expect("failed to load cl100k_base tokenizer"));

/// Slides a BPE token window across the file.
///
/// Each decoded window is located back in the source with a forward substring
/// search so spans never regress onto an earlier duplicate. A window that
/// cannot be located (lossy decode) stops chunk production for the file
/// instead of emitting misaligned spans.
pub struct TokenChunking;

struct Parameters {
    chunk_size: usize,
    overlap_tokens: usize,
    min_chars: usize,
    max_chunks: usize,
}

impl TokenChunking {
    fn parameters(context: &ChunkingContext<'_>) -> Parameters {
        let config = context.config;
        let min_chars = config
            .token
            .min_chunk_chars
            .max(config.token.min_chunk_length_to_embed);
        let chunk_size = if context.strategy == Strategy::Semantic {
            config.semantic.chunk_size_tokens.max(1)
        } else {
            config.token.chunk_size_tokens.max(1)
        };
        Parameters {
            chunk_size,
            overlap_tokens: config.overlap_tokens,
            min_chars,
            max_chunks: config.token.max_num_chunks,
        }
    }
}

impl ChunkingStrategy for TokenChunking {
    fn chunk(&self, context: &ChunkingContext<'_>) -> Vec<Chunk> {
        let content = context.file.content();
        if content.trim().is_empty() {
            return Vec::new();
        }
        let parameters = Self::parameters(context);
        let tokens = ENCODING.encode_with_special_tokens(content);
        if tokens.is_empty() {
            return Vec::new();
        }
        let overlap = parameters
            .overlap_tokens
            .min(parameters.chunk_size.saturating_sub(1));
        let step = (parameters.chunk_size - overlap).max(1);

        let mut chunks = Vec::new();
        let mut start = 0usize;
        let mut search_from = 0usize;
        let mut previous_end_line = 0usize;

        while start < tokens.len() && chunks.len() < parameters.max_chunks {
            let end = (start + parameters.chunk_size).min(tokens.len());
            let Ok(decoded) = ENCODING.decode(tokens[start..end].to_vec()) else {
                break;
            };
            let chunk_text = decoded.trim();
            if chunk_text.len() >= parameters.min_chars {
                let Some(char_start) = find_forward(content, chunk_text, search_from) else {
                    break;
                };
                let char_end = (char_start + chunk_text.len()).min(content.len());
                let (line_start, line_end) =
                    context.file.line_index().range_for_span(char_start, char_end);
                let overlap_lines = if previous_end_line > 0 {
                    (previous_end_line + 1).saturating_sub(line_start)
                } else {
                    0
                };
                let ast_metadata = context
                    .file
                    .ast_context()
                    .and_then(|ctx| ctx.symbol_for_range(line_start, line_end))
                    .cloned();
                if let Some(chunk) = Chunk::from_parts(
                    chunk_text,
                    line_start,
                    line_end,
                    context.file.language(),
                    Some(context.file.parent_symbol_resolver()),
                    overlap_lines,
                    ast_metadata,
                ) {
                    chunks.push(chunk);
                    search_from = char_start + 1;
                    previous_end_line = line_end;
                }
            }
            if end >= tokens.len() {
                break;
            }
            start += step;
        }
        chunks
    }
}

/// Forward substring search starting at (or just after) a byte position
fn find_forward(content: &str, needle: &str, from: usize) -> Option<usize> {
    if needle.is_empty() {
        return None;
    }
    let mut from = from.min(content.len());
    while from < content.len() && !content.is_char_boundary(from) {
        from += 1;
    }
    content.get(from..)?.find(needle).map(|index| index + from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ChunkingConfig;
    use crate::file::ChunkableFile;

    fn token_config(size: usize, overlap: usize, min_chars: usize) -> ChunkingConfig {
        let mut config = ChunkingConfig::default();
        config.strategy = Strategy::Token;
        config.token.chunk_size_tokens = size;
        config.token.min_chunk_chars = min_chars;
        config.token.min_chunk_length_to_embed = 0;
        config.overlap_tokens = overlap;
        config
    }

    fn words(count: usize) -> String {
        (0..count)
            .map(|i| format!("word{i}"))
            .collect::<Vec<_>>()
            .join(" ")
    }

    #[test]
    fn sliding_windows_overlap() {
        // ~50 tokens of plain words, windows of 20 with 5 tokens of overlap.
        let content = words(25);
        let token_count = ENCODING.encode_with_special_tokens(&content).len();
        assert!(token_count >= 40, "expected a multi-window file");

        let file = ChunkableFile::without_ast("/repo/w.txt", "w.txt", None, &content);
        let config = token_config(20, 5, 1);
        let context = ChunkingContext::new(&file, &config, Strategy::Token);
        let chunks = TokenChunking.chunk(&context);

        assert!(chunks.len() >= 3);
        // Every decoded window is a substring of the source, found after the
        // previous window's match position.
        let mut last = 0usize;
        for chunk in &chunks {
            let position = content.find(&chunk.text).expect("window text in source");
            assert!(position >= last || position == 0);
            last = position;
        }
    }

    #[test]
    fn respects_max_chunk_cap() {
        let content = words(200);
        let file = ChunkableFile::without_ast("/repo/w.txt", "w.txt", None, &content);
        let mut config = token_config(10, 0, 1);
        config.token.max_num_chunks = 3;
        let context = ChunkingContext::new(&file, &config, Strategy::Token);
        let chunks = TokenChunking.chunk(&context);
        assert_eq!(chunks.len(), 3);
    }

    #[test]
    fn short_windows_are_discarded() {
        let content = "tiny";
        let file = ChunkableFile::without_ast("/repo/t.txt", "t.txt", None, content);
        let config = token_config(20, 0, 100);
        let context = ChunkingContext::new(&file, &config, Strategy::Token);
        assert!(TokenChunking.chunk(&context).is_empty());
    }

    #[test]
    fn empty_content_produces_nothing() {
        let file = ChunkableFile::without_ast("/repo/e.txt", "e.txt", None, "");
        let config = token_config(20, 5, 1);
        let context = ChunkingContext::new(&file, &config, Strategy::Token);
        assert!(TokenChunking.chunk(&context).is_empty());
    }

    #[test]
    fn line_spans_follow_the_window() {
        let content = (0..30)
            .map(|i| format!("statement_number_{i}();"))
            .collect::<Vec<_>>()
            .join("\n");
        let file = ChunkableFile::without_ast("/repo/l.rs", "l.rs", Some("rust".to_string()), &content);
        let config = token_config(40, 10, 1);
        let context = ChunkingContext::new(&file, &config, Strategy::Token);
        let chunks = TokenChunking.chunk(&context);

        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.line_start <= chunk.line_end);
        }
        for pair in chunks.windows(2) {
            assert!(pair[1].line_start >= pair[0].line_start);
            let expected = (pair[0].line_end + 1).saturating_sub(pair[1].line_start);
            assert_eq!(pair[1].overlap_lines, expected);
        }
    }

    #[test]
    fn overlap_lines_match_span_arithmetic() {
        let content = words(60).replace(' ', "\n");
        let file = ChunkableFile::without_ast("/repo/v.txt", "v.txt", None, &content);
        let config = token_config(30, 10, 1);
        let context = ChunkingContext::new(&file, &config, Strategy::Token);
        let chunks = TokenChunking.chunk(&context);
        assert!(!chunks.is_empty());
        assert_eq!(chunks[0].overlap_lines, 0);
    }
}
