use crate::chunk::Chunk;
use crate::config::Strategy;
use crate::line::LineChunking;
use crate::strategy::{emit_chunk, ChunkingContext, ChunkingStrategy};
use coderag_ast::detect_symbol;

const SUPPORTED_LANGUAGES: &[&str] = &[
    "java",
    "kotlin",
    "javascript",
    "typescript",
    "python",
    "go",
    "rust",
    "ruby",
    "php",
    "csharp",
    "cpp",
];

/// Aligns chunk boundaries with declarations and doc-comment starts.
///
/// A new chunk is forced when a declaration is detected, or when a
/// doc-comment boundary appears after the buffer has reached a minimum size;
/// the configured line cap remains as a backstop. Unsupported languages and
/// empty results fall back to the LINE strategy.
pub struct SemanticChunking;

impl SemanticChunking {
    fn supports_language(language: Option<&str>) -> bool {
        language
            .map(|tag| SUPPORTED_LANGUAGES.contains(&tag.to_lowercase().as_str()))
            .unwrap_or(false)
    }

    fn build_chunks(&self, context: &ChunkingContext<'_>) -> Vec<Chunk> {
        let lines = context.file.lines();
        if lines.is_empty() {
            return Vec::new();
        }
        let overlap = context.config.overlap_lines;
        let max_lines = context.config.line.max_lines.max(1);
        let min_chunk_lines = (max_lines / 5).clamp(4, 32);

        let mut chunks = Vec::new();
        let mut buffer: Vec<String> = Vec::new();
        let mut chunk_start_line = 1usize;
        let mut overlap_from_previous = 0usize;

        for (index, line) in lines.iter().enumerate() {
            if should_start_new_chunk(line, context.file.language(), buffer.len(), min_chunk_lines)
            {
                overlap_from_previous =
                    emit_chunk(&mut chunks, &buffer, chunk_start_line, context, overlap_from_previous);
                let preserved = overlap.min(buffer.len());
                buffer = buffer.split_off(buffer.len() - preserved);
                chunk_start_line = index + 1 - preserved;
                overlap_from_previous = preserved;
            }

            buffer.push(line.clone());
            if buffer.len() >= max_lines {
                overlap_from_previous =
                    emit_chunk(&mut chunks, &buffer, chunk_start_line, context, overlap_from_previous);
                let preserved = overlap.min(buffer.len());
                buffer = buffer.split_off(buffer.len() - preserved);
                chunk_start_line = index + 2 - preserved;
                overlap_from_previous = preserved;
            }
        }
        emit_chunk(&mut chunks, &buffer, chunk_start_line, context, overlap_from_previous);
        chunks
    }

    fn fallback(&self, context: &ChunkingContext<'_>) -> Vec<Chunk> {
        let line_context =
            ChunkingContext::new(context.file, context.config, Strategy::Line);
        LineChunking.chunk(&line_context)
    }
}

impl ChunkingStrategy for SemanticChunking {
    fn chunk(&self, context: &ChunkingContext<'_>) -> Vec<Chunk> {
        if !context.config.semantic.enabled
            || !Self::supports_language(context.file.language())
        {
            log::debug!(
                "semantic chunking unavailable for {}, using line strategy",
                context.file.relative_path()
            );
            return self.fallback(context);
        }
        let chunks = self.build_chunks(context);
        if chunks.is_empty() {
            return self.fallback(context);
        }
        chunks
    }
}

fn should_start_new_chunk(
    line: &str,
    language: Option<&str>,
    current_lines: usize,
    min_chunk_lines: usize,
) -> bool {
    if detect_symbol(line).is_some() {
        return true;
    }
    if current_lines < min_chunk_lines {
        return false;
    }
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return false;
    }
    let normalized = language.map(str::to_lowercase).unwrap_or_default();
    if is_doc_comment_boundary(trimmed, &normalized) {
        return true;
    }
    if normalized.starts_with("python") {
        return trimmed.starts_with("# ") || trimmed.starts_with("##");
    }
    false
}

fn is_doc_comment_boundary(trimmed: &str, language: &str) -> bool {
    if trimmed.starts_with("/**") || trimmed.starts_with("/*!") || trimmed.starts_with("///") {
        return true;
    }
    if language == "ruby" && trimmed.starts_with("=begin") {
        return true;
    }
    if language == "python" && (trimmed.starts_with("\"\"\"") || trimmed.starts_with("'''")) {
        return true;
    }
    false
}
