use crate::models::Collection;
use crate::persistence::ScreeningRecord;
use crate::store::{NearestHit, StoredRecord, UpsertOutcome};
use crate::{BackendError, ScreeningError};
use async_trait::async_trait;

/// `upsert` must be atomic per id: two concurrent upserts of the same id and
/// model tag leave exactly one record and report `Inserted` at most once.
#[async_trait]
pub trait VectorStore: Send + Sync {
    async fn upsert(
        &self,
        collection: Collection,
        record: StoredRecord,
    ) -> Result<UpsertOutcome, ScreeningError>;

    async fn get(&self, collection: Collection, id: &str)
        -> Result<Option<StoredRecord>, ScreeningError>;

    async fn nearest(
        &self,
        collection: Collection,
        query: &[f32],
        k: usize,
    ) -> Result<Vec<NearestHit>, ScreeningError>;

    async fn len(&self, collection: Collection) -> Result<usize, ScreeningError>;

    async fn clear(&self, collection: Collection) -> Result<(), ScreeningError>;
}

#[async_trait]
pub trait JudgeBackend: Send + Sync {
    fn name(&self) -> &str;

    async fn generate_structured_judgment(
        &self,
        system_instruction: &str,
        user_instruction: &str,
    ) -> Result<String, BackendError>;
}

#[async_trait]
pub trait ResultSink: Send + Sync {
    async fn persist(&self, record: &ScreeningRecord) -> Result<(), ScreeningError>;
}
