use crate::models::Collection;
use crate::store::{NearestHit, StoredRecord, UpsertOutcome};
use crate::stores::memory::{CollectionData, MemoryVectorStore};
use crate::traits::VectorStore;
use crate::ScreeningError;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

pub struct FileVectorStore {
    dir: PathBuf,
    inner: MemoryVectorStore,
}

impl FileVectorStore {
    pub async fn open(dir: impl AsRef<Path>) -> Result<Self, ScreeningError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir).await?;

        let resumes = load_collection(&dir, Collection::Resumes).await?;
        let job_descriptions = load_collection(&dir, Collection::JobDescriptions).await?;
        info!(
            dir = %dir.display(),
            resumes = resumes.records().len(),
            job_descriptions = job_descriptions.records().len(),
            "opened embedding store"
        );

        Ok(Self {
            dir,
            inner: MemoryVectorStore::from_parts(resumes, job_descriptions),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

fn snapshot_path(dir: &Path, collection: Collection) -> PathBuf {
    dir.join(format!("{}.json", collection.name()))
}

async fn load_collection(
    dir: &Path,
    collection: Collection,
) -> Result<CollectionData, ScreeningError> {
    let path = snapshot_path(dir, collection);
    if !fs::try_exists(&path).await? {
        return Ok(CollectionData::default());
    }

    let bytes = fs::read(&path).await?;
    let records: Vec<StoredRecord> = serde_json::from_slice(&bytes).map_err(|error| {
        ScreeningError::Store(format!("corrupt snapshot {}: {error}", path.display()))
    })?;
    Ok(CollectionData::from_records(records))
}

// Rewrites the whole collection on every change, so a batch of N new
// resumes costs O(N^2) bytes written.
async fn save_collection(
    dir: &Path,
    collection: Collection,
    data: &CollectionData,
) -> Result<(), ScreeningError> {
    let path = snapshot_path(dir, collection);
    let tmp_path = dir.join(format!("{}.json.tmp", collection.name()));
    let bytes = serde_json::to_vec(data.records())?;

    fs::write(&tmp_path, &bytes).await?;
    fs::rename(&tmp_path, &path).await?;
    debug!(collection = %collection, bytes = bytes.len(), "saved snapshot");
    Ok(())
}

#[async_trait]
impl VectorStore for FileVectorStore {
    async fn upsert(
        &self,
        collection: Collection,
        record: StoredRecord,
    ) -> Result<UpsertOutcome, ScreeningError> {
        let mut data = self.inner.slot(collection).write().await;
        let mut next = data.clone();
        let outcome = next.apply(record);
        if outcome != UpsertOutcome::Unchanged {
            // Memory only changes once the snapshot is on disk.
            save_collection(&self.dir, collection, &next).await?;
            *data = next;
        }
        Ok(outcome)
    }

    async fn get(
        &self,
        collection: Collection,
        id: &str,
    ) -> Result<Option<StoredRecord>, ScreeningError> {
        self.inner.get(collection, id).await
    }

    async fn nearest(
        &self,
        collection: Collection,
        query: &[f32],
        k: usize,
    ) -> Result<Vec<NearestHit>, ScreeningError> {
        self.inner.nearest(collection, query, k).await
    }

    async fn len(&self, collection: Collection) -> Result<usize, ScreeningError> {
        self.inner.len(collection).await
    }

    async fn clear(&self, collection: Collection) -> Result<(), ScreeningError> {
        let mut data = self.inner.slot(collection).write().await;
        let empty = CollectionData::default();
        save_collection(&self.dir, collection, &empty).await?;
        *data = empty;
        Ok(())
    }
}
