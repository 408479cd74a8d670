use crate::chunk::Chunk;
use crate::config::{ChunkingConfig, Strategy};
use crate::file::ChunkableFile;
use crate::line::LineChunking;
use crate::semantic::SemanticChunking;
use crate::token::TokenChunking;

/// Read-only parameter bundle passed into every strategy call
pub struct ChunkingContext<'a> {
    pub file: &'a ChunkableFile,
    pub config: &'a ChunkingConfig,
    pub strategy: Strategy,
}

impl<'a> ChunkingContext<'a> {
    pub fn new(file: &'a ChunkableFile, config: &'a ChunkingConfig, strategy: Strategy) -> Self {
        Self {
            file,
            config,
            strategy,
        }
    }
}

/// Common contract for all chunking strategies.
///
/// Implementations never mutate the input file, return an empty list for
/// empty content, and produce deterministic boundaries for identical input.
pub trait ChunkingStrategy {
    fn chunk(&self, context: &ChunkingContext<'_>) -> Vec<Chunk>;
}

/// Flush the buffered lines into a chunk.
///
/// Returns the `overlap_lines` value to carry forward: the overlap is
/// recorded on the chunk being emitted, and the caller owes the *next* chunk
/// whatever tail it preserves.
pub(crate) fn emit_chunk(
    target: &mut Vec<Chunk>,
    buffer: &[String],
    chunk_start_line: usize,
    context: &ChunkingContext<'_>,
    overlap_from_previous: usize,
) -> usize {
    if buffer.is_empty() {
        return overlap_from_previous;
    }
    let text = buffer.join("\n");
    let chunk_end_line = chunk_start_line + buffer.len() - 1;
    let ast_metadata = context
        .file
        .ast_context()
        .and_then(|ctx| ctx.symbol_for_range(chunk_start_line, chunk_end_line))
        .cloned();
    if let Some(chunk) = Chunk::from_parts(
        &text,
        chunk_start_line,
        chunk_end_line,
        context.file.language(),
        Some(context.file.parent_symbol_resolver()),
        overlap_from_previous,
        ast_metadata,
    ) {
        target.push(chunk);
    }
    0
}

/// Dispatches to the strategy selected by configuration.
pub struct Chunker {
    config: ChunkingConfig,
    line: LineChunking,
    token: TokenChunking,
    semantic: SemanticChunking,
}

impl Chunker {
    pub fn new(config: ChunkingConfig) -> Self {
        config
            .validate()
            .expect("invalid chunking configuration provided");
        Self {
            config,
            line: LineChunking,
            token: TokenChunking,
            semantic: SemanticChunking,
        }
    }

    pub fn config(&self) -> &ChunkingConfig {
        &self.config
    }

    /// Chunk with the configured strategy
    pub fn chunk(&self, file: &ChunkableFile) -> Vec<Chunk> {
        self.chunk_with_strategy(file, self.config.strategy)
    }

    /// Chunk with an explicit strategy override
    pub fn chunk_with_strategy(&self, file: &ChunkableFile, strategy: Strategy) -> Vec<Chunk> {
        let context = ChunkingContext::new(file, &self.config, strategy);
        match strategy {
            Strategy::Line | Strategy::Byte => self.line.chunk(&context),
            Strategy::Token => self.token.chunk(&context),
            Strategy::Semantic => {
                if self.config.semantic.enabled {
                    self.semantic.chunk(&context)
                } else {
                    let fallback = ChunkingContext::new(file, &self.config, Strategy::Line);
                    self.line.chunk(&fallback)
                }
            }
        }
    }
}

impl Default for Chunker {
    fn default() -> Self {
        Self::new(ChunkingConfig::default())
    }
}
