use crate::config::IndexerConfig;
use crate::error::{IndexerError, Result};
use crate::graph::SymbolGraphBuilder;
use crate::mapper::to_document;
use crate::scanner::{read_utf8, RepoScanner};
use crate::stats::IndexStats;
use crate::store::{EmbeddingStore, SymbolGraphStore};
use coderag_ast::{AstConfig, AstExtractor};
use coderag_chunker::{detect_language, ChunkableFile, Chunker, ChunkingConfig};
use coderag_retrieval::Document;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

struct FileOutcome {
    chunks: usize,
    skipped: bool,
}

impl FileOutcome {
    fn skipped() -> Self {
        Self {
            chunks: 0,
            skipped: true,
        }
    }
}

/// Indexes a repository checkout into the embedding store and keeps the
/// symbol graph in sync.
///
/// Files are chunked concurrently up to `max_concurrency`; each file is
/// independent, so the only shared mutable state is the namespace-wide
/// seen-hash set. The cancellation flag is honored between files.
pub struct RepoIndexer {
    config: IndexerConfig,
    chunker: Arc<Chunker>,
    extractor: Arc<AstExtractor>,
    store: Arc<dyn EmbeddingStore>,
    graph_store: Arc<dyn SymbolGraphStore>,
}

impl RepoIndexer {
    pub fn new(
        config: IndexerConfig,
        chunking: ChunkingConfig,
        ast: AstConfig,
        store: Arc<dyn EmbeddingStore>,
        graph_store: Arc<dyn SymbolGraphStore>,
    ) -> Self {
        Self {
            config,
            chunker: Arc::new(Chunker::new(chunking)),
            extractor: Arc::new(AstExtractor::new(ast)),
            store,
            graph_store,
        }
    }

    pub fn config(&self) -> &IndexerConfig {
        &self.config
    }

    /// Index every eligible file under `root` into `namespace`.
    pub async fn index_repository(
        &self,
        root: &Path,
        namespace: &str,
        cancel: Arc<AtomicBool>,
    ) -> Result<IndexStats> {
        if !root.is_dir() {
            return Err(IndexerError::InvalidPath(root.display().to_string()));
        }
        let started = Instant::now();
        let files = RepoScanner::new(self.config.ignore_directories.clone()).scan(root);
        log::info!(
            "indexing {} files into namespace {namespace} (concurrency {})",
            files.len(),
            self.config.max_concurrency
        );

        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrency.max(1)));
        let seen_hashes: Arc<Mutex<HashSet<String>>> = Arc::new(Mutex::new(HashSet::new()));
        let mut tasks = JoinSet::new();

        for path in files {
            if cancel.load(Ordering::SeqCst) {
                log::info!("indexing cancelled for namespace {namespace}");
                break;
            }
            let permit = Arc::clone(&semaphore)
                .acquire_owned()
                .await
                .map_err(|err| IndexerError::Task(err.to_string()))?;
            let chunker = Arc::clone(&self.chunker);
            let extractor = Arc::clone(&self.extractor);
            let store = Arc::clone(&self.store);
            let graph_store = Arc::clone(&self.graph_store);
            let seen = Arc::clone(&seen_hashes);
            let root = root.to_path_buf();
            let namespace = namespace.to_string();
            tasks.spawn(async move {
                let _permit = permit;
                index_file(chunker, extractor, store, graph_store, root, path, namespace, seen)
                    .await
            });
        }

        let mut stats = IndexStats::default();
        while let Some(joined) = tasks.join_next().await {
            let outcome = joined.map_err(|err| IndexerError::Task(err.to_string()))??;
            if outcome.skipped {
                stats.skipped += 1;
            } else {
                stats.files += 1;
                stats.chunks += outcome.chunks;
            }
        }
        stats.time_ms = started.elapsed().as_millis() as u64;
        log::info!("indexed namespace {namespace}: {stats}");
        Ok(stats)
    }
}

#[allow(clippy::too_many_arguments)]
async fn index_file(
    chunker: Arc<Chunker>,
    extractor: Arc<AstExtractor>,
    store: Arc<dyn EmbeddingStore>,
    graph_store: Arc<dyn SymbolGraphStore>,
    root: PathBuf,
    path: PathBuf,
    namespace: String,
    seen_hashes: Arc<Mutex<HashSet<String>>>,
) -> Result<FileOutcome> {
    let Some(content) = read_utf8(&path) else {
        return Ok(FileOutcome::skipped());
    };
    let relative = path
        .strip_prefix(&root)
        .unwrap_or(&path)
        .to_string_lossy()
        .replace('\\', "/");
    let language = detect_language(&path);

    let supplier_content = content.clone();
    let supplier_language = language.clone();
    let supplier_relative = relative.clone();
    let supplier_extractor = Arc::clone(&extractor);
    let file = ChunkableFile::new(
        path.clone(),
        relative.clone(),
        language,
        &content,
        Box::new(move || {
            supplier_language.as_deref().map(|lang| {
                supplier_extractor.parse(&supplier_content, Some(lang), &supplier_relative, true)
            })
        }),
    );

    let chunks = chunker.chunk(&file);
    if chunks.is_empty() {
        return Ok(FileOutcome::skipped());
    }

    let documents: Vec<Document> = {
        let mut seen = seen_hashes.lock().expect("seen-hash set poisoned");
        chunks
            .iter()
            .enumerate()
            .filter(|(_, chunk)| {
                if seen.insert(chunk.hash.clone()) {
                    true
                } else {
                    log::debug!(
                        "chunk already indexed, skipping (namespace={namespace}, file={relative})"
                    );
                    false
                }
            })
            .map(|(index, chunk)| to_document(&namespace, &relative, index, chunk))
            .collect()
    };
    if documents.is_empty() {
        return Ok(FileOutcome::skipped());
    }
    let stored = documents.len();
    store.add(documents).await?;

    let edges = SymbolGraphBuilder::edges_for_file(&relative, &chunks);
    if !edges.is_empty() {
        graph_store.replace_file(&namespace, &relative, edges).await?;
    }
    Ok(FileOutcome {
        chunks: stored,
        skipped: false,
    })
}
