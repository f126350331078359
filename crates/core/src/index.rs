use crate::embeddings::{cosine_similarity, CharacterNgramEmbedder, Embedder};
use crate::models::{Collection, Metadata};
use crate::store::{scalar_safe_metadata, NearestHit, StoredRecord, UpsertOutcome};
use crate::text::{normalize, Document};
use crate::traits::VectorStore;
use crate::ScreeningError;
use tracing::debug;

pub struct EmbeddingIndex<S> {
    store: S,
    embedder: Box<dyn Embedder>,
}

impl<S> EmbeddingIndex<S>
where
    S: VectorStore,
{
    pub fn new(store: S, embedder: impl Embedder + 'static) -> Self {
        Self {
            store,
            embedder: Box::new(embedder),
        }
    }

    pub fn with_default_embedder(store: S) -> Self {
        Self::new(store, CharacterNgramEmbedder::default())
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn model_tag(&self) -> String {
        self.embedder.model_tag()
    }

    pub fn embed(&self, text: &str) -> Result<Vec<f32>, ScreeningError> {
        let vector = self.embedder.embed(text)?;
        if vector.len() != self.embedder.dimensions() {
            return Err(ScreeningError::Embedding(format!(
                "embedder returned {} dimensions, expected {}",
                vector.len(),
                self.embedder.dimensions()
            )));
        }
        Ok(vector)
    }

    pub async fn upsert(
        &self,
        collection: Collection,
        document_id: &str,
        vector: Vec<f32>,
        text: &str,
        metadata: &Metadata,
    ) -> Result<UpsertOutcome, ScreeningError> {
        let record = StoredRecord {
            id: document_id.to_string(),
            vector,
            model_tag: self.model_tag(),
            text: text.to_string(),
            metadata: scalar_safe_metadata(metadata),
        };
        let outcome = self.store.upsert(collection, record).await?;
        debug!(%collection, id = document_id, ?outcome, "upsert");
        Ok(outcome)
    }

    pub async fn index_document(
        &self,
        collection: Collection,
        document: &Document,
        metadata: &Metadata,
    ) -> Result<Vec<f32>, ScreeningError> {
        let model_tag = self.model_tag();
        if let Some(existing) = self.store.get(collection, &document.id).await? {
            if existing.model_tag == model_tag {
                return Ok(existing.vector);
            }
        }

        let vector = self.embed(&document.normalized_text)?;
        self.upsert(
            collection,
            &document.id,
            vector.clone(),
            &document.raw_text,
            metadata,
        )
        .await?;
        Ok(vector)
    }

    pub fn similarity(&self, text_a: &str, text_b: &str) -> Result<f64, ScreeningError> {
        let left = self.embed(text_a)?;
        let right = self.embed(text_b)?;
        Ok(cosine_similarity(&left, &right))
    }

    pub async fn query_nearest(
        &self,
        collection: Collection,
        query_text: &str,
        k: usize,
    ) -> Result<Vec<NearestHit>, ScreeningError> {
        if k == 0 {
            return Ok(Vec::new());
        }
        let query = self.embed(&normalize(query_text))?;
        self.store.nearest(collection, &query, k).await
    }

    pub async fn len(&self, collection: Collection) -> Result<usize, ScreeningError> {
        self.store.len(collection).await
    }

    pub async fn clear(&self, collection: Collection) -> Result<(), ScreeningError> {
        self.store.clear(collection).await
    }
}
