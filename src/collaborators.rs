//! External collaborators named in SPEC_FULL.md §1/§2 but owned by other
//! systems. Expressed as traits, the way the teacher models the OCR
//! backend boundary (`crates/foiacquire-analysis/src/ocr/backend.rs`'s
//! `OcrBackendType`/`OcrError`) rather than the download/scrape pipeline
//! it sits behind: the core depends on the trait, never the concrete
//! system. Reference implementations here back the CLI and tests only —
//! they are not a production Gateway, AuthorityOracle, blob store, or
//! embedding service.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CollaboratorError {
    #[error("blob store I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("embedder unavailable")]
    EmbedderUnavailable,
    #[error("unsupported embedding dimension: {0}")]
    UnsupportedDimension(usize),
}

pub type Result<T> = std::result::Result<T, CollaboratorError>;

/// Takes a byte stream, returns an opaque handle the core stores but never
/// interprets (spec §1: "the core only stores handles").
pub trait BlobStore: Send + Sync {
    fn put(&self, content: &[u8]) -> Result<String>;
    fn get(&self, handle: &str) -> Result<Vec<u8>>;
}

/// `canRead/canWrite/canDelete(principal, object)` permission surface
/// (spec §1). `object` is an opaque id (document id, corpus id, ...); this
/// core never inspects the principal model itself.
pub trait AuthorityOracle: Send + Sync {
    fn can_read(&self, principal: Option<&str>, object: &str) -> bool;
    fn can_write(&self, principal: Option<&str>, object: &str) -> bool;
    fn can_delete(&self, principal: Option<&str>, object: &str) -> bool;
}

/// Text → vector. Only the dimension is load-bearing for the core (§4.5.4
/// picks a search strategy based on it); the values themselves are opaque.
pub trait Embedder: Send + Sync {
    fn embed(&self, text: &str) -> Result<Vec<f32>>;
}

/// Supported embedding dimensions for native vector search (§4.5.4); any
/// other dimension falls back to a plain `LIMIT top_k` scan.
pub const SUPPORTED_EMBEDDING_DIMENSIONS: [usize; 4] = [384, 768, 1536, 3072];

#[derive(Debug, Clone)]
pub struct ScoredAnnotationId {
    pub annotation_id: String,
    pub similarity_score: f32,
}

/// Top-k cosine search over a pre-filtered row set (§4.5.4). The filtered
/// set of candidate annotation ids is computed by `QueryPlane` using the
/// same version-aware predicates as a plain annotation query; this trait
/// only ranks within that set.
pub trait VectorIndex: Send + Sync {
    fn search_by_embedding(
        &self,
        candidate_annotation_ids: &[String],
        query: &[f32],
        top_k: usize,
    ) -> Result<Vec<ScoredAnnotationId>>;
}

/// In-memory `BlobStore` keyed by content hash, backing the CLI and tests.
/// Not a reference implementation of any real storage backend.
pub struct InMemoryBlobStore {
    inner: std::sync::Mutex<std::collections::HashMap<String, Vec<u8>>>,
}

impl InMemoryBlobStore {
    pub fn new() -> Self {
        Self { inner: std::sync::Mutex::new(std::collections::HashMap::new()) }
    }
}

impl Default for InMemoryBlobStore {
    fn default() -> Self {
        Self::new()
    }
}

impl BlobStore for InMemoryBlobStore {
    fn put(&self, content: &[u8]) -> Result<String> {
        let handle = crate::hash::sha256_hex(content);
        self.inner.lock().expect("blob store mutex poisoned").insert(handle.clone(), content.to_vec());
        Ok(handle)
    }

    fn get(&self, handle: &str) -> Result<Vec<u8>> {
        self.inner
            .lock()
            .expect("blob store mutex poisoned")
            .get(handle)
            .cloned()
            .ok_or_else(|| CollaboratorError::Io(std::io::Error::new(std::io::ErrorKind::NotFound, handle)))
    }
}

/// Permission oracle that allows everything. Used by the CLI, where the
/// caller is assumed to already be authorized by virtue of filesystem
/// access to the corpus database.
pub struct AllowAllAuthority;

impl AuthorityOracle for AllowAllAuthority {
    fn can_read(&self, _principal: Option<&str>, _object: &str) -> bool {
        true
    }
    fn can_write(&self, _principal: Option<&str>, _object: &str) -> bool {
        true
    }
    fn can_delete(&self, _principal: Option<&str>, _object: &str) -> bool {
        true
    }
}
