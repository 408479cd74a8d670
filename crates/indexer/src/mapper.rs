use coderag_chunker::Chunk;
use coderag_retrieval::{keys, Document};

/// Stable document id: identity for downstream storage is the pair of
/// namespace and content hash.
pub fn document_id(namespace: &str, chunk: &Chunk) -> String {
    format!("{namespace}:{}", chunk.hash)
}

/// Map a chunk to a retrieval document with the full metadata key set.
pub fn to_document(
    namespace: &str,
    relative_path: &str,
    chunk_index: usize,
    chunk: &Chunk,
) -> Document {
    let mut document = Document::new(document_id(namespace, chunk), chunk.text.clone(), None)
        .with_metadata(keys::NAMESPACE, namespace)
        .with_metadata(keys::FILE_PATH, relative_path)
        .with_metadata(keys::CHUNK_INDEX, chunk_index as i64)
        .with_metadata(keys::CHUNK_HASH, chunk.hash.clone())
        .with_metadata(keys::LINE_START, chunk.line_start as i64)
        .with_metadata(keys::LINE_END, chunk.line_end as i64);
    if let Some(language) = &chunk.language {
        document = document.with_metadata(keys::LANGUAGE, language.clone());
    }
    if let Some(parent) = &chunk.parent_symbol {
        document = document.with_metadata(keys::PARENT_SYMBOL, parent.clone());
    }
    if let Some(ast) = &chunk.ast_metadata {
        document = document
            .with_metadata(keys::SYMBOL_FQN, ast.symbol_fqn.clone())
            .with_metadata(keys::SYMBOL_KIND, ast.kind.clone())
            .with_metadata(keys::SYMBOL_VISIBILITY, ast.visibility.clone());
    }
    document
}
