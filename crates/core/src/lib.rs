pub mod config;
pub mod embeddings;
pub mod error;
pub mod fusion;
pub mod index;
pub mod ingest;
pub mod judge;
pub mod models;
pub mod orchestrator;
pub mod persistence;
pub mod signals;
pub mod store;
pub mod stores;
pub mod text;
pub mod traits;

pub use config::{Credentials, JudgeSettings, ScreeningConfig};
pub use embeddings::{
    cosine_similarity, CharacterNgramEmbedder, Embedder, DEFAULT_EMBEDDING_DIMENSIONS,
};
pub use error::{BackendError, ConfigError, IngestError, Result, ScreeningError};
pub use fusion::{fuse, rank, FusionWeights};
pub use index::EmbeddingIndex;
pub use ingest::{
    discover_resume_files, load_resume_folder, read_text_document, ResumeLoadReport, SkippedFile,
};
pub use judge::{HttpJudgeBackend, Judgment, Provider, StructuredJudgeClient};
pub use models::{
    BatchFailure, BatchReport, Collection, DegradeReason, FailureKind, JudgmentVerdict, Metadata,
    Recommendation, ResumeInput, ScreeningResult,
};
pub use orchestrator::ScreeningOrchestrator;
pub use persistence::{JsonLinesSink, ScreeningRecord};
pub use signals::{experience_years, extract_skills, SKILL_VOCABULARY};
pub use store::{NearestHit, StoredRecord, UpsertOutcome};
pub use stores::{FileVectorStore, MemoryVectorStore};
pub use text::{content_id, normalize, Document};
pub use traits::{JudgeBackend, ResultSink, VectorStore};
