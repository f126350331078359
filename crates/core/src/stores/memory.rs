use crate::embeddings::cosine_similarity;
use crate::models::Collection;
use crate::store::{NearestHit, StoredRecord, UpsertOutcome};
use crate::traits::VectorStore;
use crate::ScreeningError;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

#[derive(Debug, Clone, Default)]
pub(crate) struct CollectionData {
    records: Vec<StoredRecord>,
    positions: HashMap<String, usize>,
}

impl CollectionData {
    pub(crate) fn from_records(records: Vec<StoredRecord>) -> Self {
        let mut data = Self::default();
        for record in records {
            data.apply(record);
        }
        data
    }

    pub(crate) fn records(&self) -> &[StoredRecord] {
        &self.records
    }

    pub(crate) fn apply(&mut self, record: StoredRecord) -> UpsertOutcome {
        match self.positions.get(&record.id) {
            Some(&position) if self.records[position].model_tag == record.model_tag => {
                UpsertOutcome::Unchanged
            }
            Some(&position) => {
                self.records[position] = record;
                UpsertOutcome::Replaced
            }
            None => {
                self.positions.insert(record.id.clone(), self.records.len());
                self.records.push(record);
                UpsertOutcome::Inserted
            }
        }
    }

    fn get(&self, id: &str) -> Option<&StoredRecord> {
        self.positions.get(id).map(|&position| &self.records[position])
    }

    fn nearest(&self, query: &[f32], k: usize) -> Vec<NearestHit> {
        let mut hits = self
            .records
            .iter()
            .map(|record| NearestHit {
                id: record.id.clone(),
                text: record.text.clone(),
                metadata: record.metadata.clone(),
                distance: 1.0 - cosine_similarity(query, &record.vector),
            })
            .collect::<Vec<_>>();

        hits.sort_by(|left, right| left.distance.total_cmp(&right.distance));
        hits.truncate(k);
        hits
    }
}

#[derive(Debug, Default)]
pub struct MemoryVectorStore {
    resumes: RwLock<CollectionData>,
    job_descriptions: RwLock<CollectionData>,
}

impl MemoryVectorStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_parts(resumes: CollectionData, job_descriptions: CollectionData) -> Self {
        Self {
            resumes: RwLock::new(resumes),
            job_descriptions: RwLock::new(job_descriptions),
        }
    }

    pub(crate) fn slot(&self, collection: Collection) -> &RwLock<CollectionData> {
        match collection {
            Collection::Resumes => &self.resumes,
            Collection::JobDescriptions => &self.job_descriptions,
        }
    }
}

#[async_trait]
impl VectorStore for MemoryVectorStore {
    async fn upsert(
        &self,
        collection: Collection,
        record: StoredRecord,
    ) -> Result<UpsertOutcome, ScreeningError> {
        Ok(self.slot(collection).write().await.apply(record))
    }

    async fn get(
        &self,
        collection: Collection,
        id: &str,
    ) -> Result<Option<StoredRecord>, ScreeningError> {
        Ok(self.slot(collection).read().await.get(id).cloned())
    }

    async fn nearest(
        &self,
        collection: Collection,
        query: &[f32],
        k: usize,
    ) -> Result<Vec<NearestHit>, ScreeningError> {
        Ok(self.slot(collection).read().await.nearest(query, k))
    }

    async fn len(&self, collection: Collection) -> Result<usize, ScreeningError> {
        Ok(self.slot(collection).read().await.records.len())
    }

    async fn clear(&self, collection: Collection) -> Result<(), ScreeningError> {
        *self.slot(collection).write().await = CollectionData::default();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Metadata;
    use std::sync::Arc;

    fn record(id: &str, vector: Vec<f32>, tag: &str) -> StoredRecord {
        StoredRecord {
            id: id.to_string(),
            vector,
            model_tag: tag.to_string(),
            text: format!("text of {id}"),
            metadata: Metadata::new(),
        }
    }

    #[test]
    fn loaded_records_keep_id_lookup() {
        let mut data = CollectionData::from_records(vec![
            record("a", vec![1.0, 0.0], "m1"),
            record("b", vec![0.0, 1.0], "m1"),
        ]);

        assert_eq!(data.get("b").map(|stored| stored.id.as_str()), Some("b"));
        assert_eq!(
            data.apply(record("a", vec![0.5, 0.5], "m1")),
            UpsertOutcome::Unchanged
        );
        assert_eq!(data.records().len(), 2);
    }

    #[tokio::test]
    async fn repeated_upsert_is_a_no_op() {
        let store = MemoryVectorStore::new();
        let first = store
            .upsert(Collection::Resumes, record("a", vec![1.0, 0.0], "m1"))
            .await
            .unwrap();
        let second = store
            .upsert(Collection::Resumes, record("a", vec![0.0, 1.0], "m1"))
            .await
            .unwrap();

        assert_eq!(first, UpsertOutcome::Inserted);
        assert_eq!(second, UpsertOutcome::Unchanged);
        assert_eq!(store.len(Collection::Resumes).await.unwrap(), 1);
        let stored = store.get(Collection::Resumes, "a").await.unwrap().unwrap();
        assert_eq!(stored.vector, vec![1.0, 0.0]);
    }

    #[tokio::test]
    async fn new_model_tag_replaces_vector() {
        let store = MemoryVectorStore::new();
        store
            .upsert(Collection::Resumes, record("a", vec![1.0, 0.0], "m1"))
            .await
            .unwrap();
        let outcome = store
            .upsert(Collection::Resumes, record("a", vec![0.0, 1.0], "m2"))
            .await
            .unwrap();

        assert_eq!(outcome, UpsertOutcome::Replaced);
        assert_eq!(store.len(Collection::Resumes).await.unwrap(), 1);
        let stored = store.get(Collection::Resumes, "a").await.unwrap().unwrap();
        assert_eq!(stored.model_tag, "m2");
    }

    #[tokio::test]
    async fn concurrent_identical_upserts_store_one_record() {
        let store = Arc::new(MemoryVectorStore::new());
        let mut handles = Vec::new();
        for _ in 0..16 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store
                    .upsert(Collection::Resumes, record("same", vec![0.5, 0.5], "m1"))
                    .await
                    .unwrap()
            }));
        }

        let mut inserted = 0;
        for handle in handles {
            if handle.await.unwrap() == UpsertOutcome::Inserted {
                inserted += 1;
            }
        }

        assert_eq!(inserted, 1);
        assert_eq!(store.len(Collection::Resumes).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn nearest_orders_by_ascending_distance() {
        let store = MemoryVectorStore::new();
        store
            .upsert(Collection::Resumes, record("far", vec![0.0, 1.0], "m"))
            .await
            .unwrap();
        store
            .upsert(Collection::Resumes, record("near", vec![1.0, 0.1], "m"))
            .await
            .unwrap();
        store
            .upsert(Collection::Resumes, record("exact", vec![1.0, 0.0], "m"))
            .await
            .unwrap();

        let hits = store
            .nearest(Collection::Resumes, &[1.0, 0.0], 2)
            .await
            .unwrap();
        let ids = hits.iter().map(|hit| hit.id.as_str()).collect::<Vec<_>>();
        assert_eq!(ids, vec!["exact", "near"]);
        assert!(hits[0].distance.abs() < 1e-9);
    }

    #[tokio::test]
    async fn nearest_handles_small_and_empty_collections() {
        let store = MemoryVectorStore::new();
        let empty = store
            .nearest(Collection::Resumes, &[1.0, 0.0], 5)
            .await
            .unwrap();
        assert!(empty.is_empty());

        store
            .upsert(Collection::Resumes, record("only", vec![1.0, 0.0], "m"))
            .await
            .unwrap();
        let hits = store
            .nearest(Collection::Resumes, &[1.0, 0.0], 5)
            .await
            .unwrap();
        assert_eq!(hits.len(), 1);
    }

    #[tokio::test]
    async fn clearing_one_collection_keeps_the_other() {
        let store = MemoryVectorStore::new();
        store
            .upsert(Collection::Resumes, record("r", vec![1.0], "m"))
            .await
            .unwrap();
        store
            .upsert(Collection::JobDescriptions, record("j", vec![1.0], "m"))
            .await
            .unwrap();

        store.clear(Collection::Resumes).await.unwrap();

        assert_eq!(store.len(Collection::Resumes).await.unwrap(), 0);
        assert_eq!(store.len(Collection::JobDescriptions).await.unwrap(), 1);
    }
}
