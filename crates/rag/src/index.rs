//! Per-document embedding index with cosine similarity search.
//!
//! Each document id owns an independent slot, so operations on different
//! documents never contend. Mutations on one id are serialized by a per-slot
//! async write gate held across the embedding call; the std locks only guard
//! pointer swaps and are never held across an await.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use docqa_chunker::{chunk_text, Chunk, ChunkingConfig};
use docqa_core::Config;
use docqa_llm::{EmbedMode, Embedder};

// ── Snapshots ─────────────────────────────────────────────────

/// Immutable snapshot of one indexed document: chunks plus the embedding
/// matrix (one row per chunk), the config it was chunked with, and when.
pub struct DocumentIndex {
    pub chunks: Vec<Chunk>,
    pub embeddings: Vec<Vec<f32>>,
    pub config: ChunkingConfig,
    pub indexed_at: DateTime<Utc>,
}

/// One retrieval hit: the chunk and its similarity to the query.
#[derive(Debug, Clone)]
pub struct SearchResult {
    pub chunk: Chunk,
    pub score: f32,
}

#[derive(Debug, Serialize)]
pub struct IndexStats {
    pub document_count: usize,
    pub total_chunks: usize,
    pub documents: Vec<DocumentStats>,
}

#[derive(Debug, Serialize)]
pub struct DocumentStats {
    pub document_id: String,
    pub chunk_count: usize,
    pub indexed_at: DateTime<Utc>,
    pub config: ChunkingConfig,
}

// ── Index ─────────────────────────────────────────────────────

/// Per-document slot: the current snapshot plus a write gate that serializes
/// mutations on this id.
struct Slot {
    data: RwLock<Option<Arc<DocumentIndex>>>,
    write_gate: Mutex<()>,
}

impl Slot {
    fn empty() -> Self {
        Self {
            data: RwLock::new(None),
            write_gate: Mutex::new(()),
        }
    }
}

/// In-memory retrieval index over independently managed documents.
pub struct RetrievalIndex {
    embedder: Arc<dyn Embedder>,
    config: ChunkingConfig,
    top_k: usize,
    slots: RwLock<HashMap<String, Arc<Slot>>>,
}

impl RetrievalIndex {
    pub fn new(embedder: Arc<dyn Embedder>, config: ChunkingConfig, top_k: usize) -> Self {
        Self {
            embedder,
            config,
            top_k,
            slots: RwLock::new(HashMap::new()),
        }
    }

    /// Build with the retrieval-tuned chunking profile, sized from env config.
    pub fn from_config(embedder: Arc<dyn Embedder>, config: &Config) -> Self {
        let chunking = ChunkingConfig {
            target_size: config.rag.chunk_size,
            overlap_size: config.rag.chunk_overlap,
            ..ChunkingConfig::retrieval_profile()
        };
        Self::new(embedder, chunking, config.rag.top_k)
    }

    /// How many results `search` should return when the caller has no
    /// preference of its own.
    pub fn top_k(&self) -> usize {
        self.top_k
    }

    /// Chunk, embed, and index a document, replacing any prior index for the
    /// same id in one swap. Returns the number of chunks indexed; 0 means the
    /// document was not indexed (nothing to chunk, or the embedder failed)
    /// and any previous index for the id is left untouched.
    pub async fn add_document(
        &self,
        document_id: &str,
        text: &str,
        metadata: HashMap<String, Value>,
    ) -> usize {
        let mut chunks = chunk_text(text, document_id, &self.config);
        if chunks.is_empty() {
            warn!(document_id, "no chunks produced, document not indexed");
            return 0;
        }
        for chunk in &mut chunks {
            chunk
                .metadata
                .extend(metadata.iter().map(|(k, v)| (k.clone(), v.clone())));
        }

        let slot = self.slot(document_id);
        let _gate = slot.write_gate.lock().await;

        let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
        let embeddings = match self.embedder.embed(&texts, EmbedMode::Document).await {
            Ok(rows) => rows,
            Err(e) => {
                warn!(document_id, error = %e, "embedding failed, document not indexed");
                return 0;
            }
        };

        let count = chunks.len();
        let snapshot = DocumentIndex {
            chunks,
            embeddings,
            config: self.config.clone(),
            indexed_at: Utc::now(),
        };
        let replaced = {
            let mut data = slot.data.write().expect("slot lock poisoned");
            data.replace(Arc::new(snapshot)).is_some()
        };
        if replaced {
            info!(document_id, chunks = count, "document re-indexed");
        } else {
            info!(document_id, chunks = count, "document indexed");
        }
        count
    }

    /// Drop a document's index. Idempotent; returns whether anything was
    /// removed.
    pub async fn remove_document(&self, document_id: &str) -> bool {
        let Some(slot) = self.lookup(document_id) else {
            return false;
        };
        let _gate = slot.write_gate.lock().await;
        let removed = slot
            .data
            .write()
            .expect("slot lock poisoned")
            .take()
            .is_some();
        if removed {
            info!(document_id, "document removed from index");
        }
        removed
    }

    pub fn has_document(&self, document_id: &str) -> bool {
        self.snapshot(document_id).is_some()
    }

    /// Top-k chunks of one document by cosine similarity to the query.
    /// Empty when the document is not indexed or the query embedding fails.
    /// Ties are broken by ascending chunk index.
    pub async fn search(&self, document_id: &str, query: &str, k: usize) -> Vec<SearchResult> {
        let Some(index) = self.snapshot(document_id) else {
            debug!(document_id, "search against unindexed document");
            return Vec::new();
        };

        let query_vec = match self.embedder.embed(&[query], EmbedMode::Query).await {
            Ok(mut rows) if !rows.is_empty() => rows.swap_remove(0),
            Ok(_) => {
                warn!(document_id, "embedder returned no query vector");
                return Vec::new();
            }
            Err(e) => {
                warn!(document_id, error = %e, "query embedding failed");
                return Vec::new();
            }
        };

        let mut scored: Vec<SearchResult> = index
            .embeddings
            .iter()
            .zip(&index.chunks)
            .map(|(row, chunk)| SearchResult {
                chunk: chunk.clone(),
                score: cosine_similarity(&query_vec, row),
            })
            .collect();
        scored.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.chunk.index.cmp(&b.chunk.index))
        });
        scored.truncate(k);
        scored
    }

    pub fn stats(&self) -> IndexStats {
        let slots: Vec<(String, Arc<Slot>)> = {
            let map = self.slots.read().expect("slots lock poisoned");
            map.iter().map(|(k, v)| (k.clone(), Arc::clone(v))).collect()
        };

        let mut documents = Vec::new();
        for (document_id, slot) in slots {
            let data = slot.data.read().expect("slot lock poisoned").clone();
            if let Some(index) = data {
                documents.push(DocumentStats {
                    document_id,
                    chunk_count: index.chunks.len(),
                    indexed_at: index.indexed_at,
                    config: index.config.clone(),
                });
            }
        }
        documents.sort_by(|a, b| a.document_id.cmp(&b.document_id));

        IndexStats {
            document_count: documents.len(),
            total_chunks: documents.iter().map(|d| d.chunk_count).sum(),
            documents,
        }
    }

    /// Get or create the slot for an id. The outer lock is held only for the
    /// map access.
    fn slot(&self, document_id: &str) -> Arc<Slot> {
        if let Some(slot) = self
            .slots
            .read()
            .expect("slots lock poisoned")
            .get(document_id)
        {
            return Arc::clone(slot);
        }
        let mut slots = self.slots.write().expect("slots lock poisoned");
        Arc::clone(
            slots
                .entry(document_id.to_string())
                .or_insert_with(|| Arc::new(Slot::empty())),
        )
    }

    fn lookup(&self, document_id: &str) -> Option<Arc<Slot>> {
        let slots = self.slots.read().expect("slots lock poisoned");
        slots.get(document_id).map(Arc::clone)
    }

    fn snapshot(&self, document_id: &str) -> Option<Arc<DocumentIndex>> {
        self.lookup(document_id)
            .and_then(|slot| slot.data.read().expect("slot lock poisoned").clone())
    }
}

/// Cosine similarity; a zero-norm vector on either side scores 0, never NaN.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}
