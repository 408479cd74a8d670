use crate::chunk::Chunk;
use crate::config::Strategy;
use crate::strategy::{emit_chunk, ChunkingContext, ChunkingStrategy};

/// Packs lines into chunks bounded by a line count and a UTF-8 byte budget.
///
/// BYTE mode widens the byte budget and removes the line cap; both modes
/// carry the configured line overlap into the next chunk and record it on
/// that next chunk, not the one just flushed.
pub struct LineChunking;

struct Parameters {
    max_lines: usize,
    max_bytes: usize,
    overlap_lines: usize,
}

impl LineChunking {
    fn parameters(context: &ChunkingContext<'_>) -> Parameters {
        let config = context.config;
        if context.strategy == Strategy::Byte {
            return Parameters {
                max_lines: usize::MAX,
                max_bytes: config.byte.max_bytes.max(512),
                overlap_lines: config.overlap_lines,
            };
        }
        Parameters {
            max_lines: config.line.max_lines.max(1),
            max_bytes: config.line.max_bytes.max(256),
            overlap_lines: config.overlap_lines,
        }
    }
}

impl ChunkingStrategy for LineChunking {
    fn chunk(&self, context: &ChunkingContext<'_>) -> Vec<Chunk> {
        let lines = context.file.lines();
        if lines.is_empty() {
            return Vec::new();
        }
        let parameters = Self::parameters(context);
        let mut chunks = Vec::new();
        let mut buffer: Vec<String> = Vec::new();
        let mut chunk_start_line = 1usize;
        let mut bytes_budget = 0usize;
        let mut overlap_from_previous = 0usize;

        for (line_number, line) in lines.iter().enumerate().map(|(i, l)| (i + 1, l)) {
            let line_bytes = line.len();
            let newline_bytes = usize::from(!buffer.is_empty());
            let would_exceed_lines = buffer.len() >= parameters.max_lines;
            let would_exceed_bytes = !buffer.is_empty()
                && bytes_budget + line_bytes + newline_bytes > parameters.max_bytes;
            if would_exceed_lines || would_exceed_bytes {
                overlap_from_previous =
                    emit_chunk(&mut chunks, &buffer, chunk_start_line, context, overlap_from_previous);
                let preserved = parameters.overlap_lines.min(buffer.len());
                buffer = buffer.split_off(buffer.len() - preserved);
                chunk_start_line = line_number - preserved;
                bytes_budget = recompute_bytes(&buffer);
                overlap_from_previous = preserved;
            }
            if !buffer.is_empty() {
                bytes_budget += 1;
            }
            buffer.push(line.clone());
            bytes_budget += line_bytes;
        }
        emit_chunk(&mut chunks, &buffer, chunk_start_line, context, overlap_from_previous);
        chunks
    }
}

fn recompute_bytes(lines: &[String]) -> usize {
    if lines.is_empty() {
        return 0;
    }
    let content: usize = lines.iter().map(String::len).sum();
    content + lines.len() - 1
}
