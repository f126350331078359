use crate::config::ScreeningConfig;
use crate::embeddings::cosine_similarity;
use crate::fusion::{rank, FusionWeights};
use crate::index::EmbeddingIndex;
use crate::judge::{HttpJudgeBackend, StructuredJudgeClient};
use crate::models::{
    BatchFailure, BatchReport, Collection, FailureKind, Metadata, ResumeInput, ScreeningResult,
};
use crate::persistence::ScreeningRecord;
use crate::signals::{experience_years, extract_skills};
use crate::store::NearestHit;
use crate::text::Document;
use crate::traits::{JudgeBackend, ResultSink, VectorStore};
use crate::{ConfigError, ScreeningError};
use chrono::Utc;
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{info, warn};

const UNKNOWN_FILENAME: &str = "unknown";

struct Worker<S, B> {
    index: Arc<EmbeddingIndex<S>>,
    judge: Arc<StructuredJudgeClient<B>>,
    fusion: FusionWeights,
    sink: Option<Arc<dyn ResultSink>>,
}

impl<S, B> Clone for Worker<S, B> {
    fn clone(&self) -> Self {
        Self {
            index: Arc::clone(&self.index),
            judge: Arc::clone(&self.judge),
            fusion: self.fusion,
            sink: self.sink.clone(),
        }
    }
}

impl<S, B> Worker<S, B>
where
    S: VectorStore,
    B: JudgeBackend,
{
    async fn index_job(&self, job_description: &str) -> Result<(Document, Vec<f32>), ScreeningError> {
        let job = Document::new(job_description);
        let mut metadata = Metadata::new();
        metadata.insert(
            "indexed_at".to_string(),
            Value::String(Utc::now().to_rfc3339()),
        );
        let vector = self
            .index
            .index_document(Collection::JobDescriptions, &job, &metadata)
            .await?;
        Ok((job, vector))
    }

    async fn score(
        &self,
        job: &Document,
        job_vector: &[f32],
        resume: ResumeInput,
    ) -> Result<ScreeningResult, ScreeningError> {
        let filename = resume.filename().unwrap_or(UNKNOWN_FILENAME).to_string();
        let document = Document::new(resume.text);

        let resume_vector = self
            .index
            .index_document(Collection::Resumes, &document, &resume.metadata)
            .await?;
        let vector_similarity = cosine_similarity(job_vector, &resume_vector);

        let judgment = self
            .judge
            .judge(
                &job.normalized_text,
                &document.normalized_text,
                vector_similarity * 100.0,
            )
            .await;
        let (verdict, degraded) = judgment.into_parts();

        let result = ScreeningResult {
            resume_id: document.id,
            filename,
            score: self.fusion.fuse(verdict.overall_score, vector_similarity),
            vector_similarity,
            ai_score: verdict.overall_score,
            strengths: verdict.strengths,
            weaknesses: verdict.weaknesses,
            matched_requirements: verdict.matched_requirements,
            missing_requirements: verdict.missing_requirements,
            recommendation: verdict.recommendation,
            reasoning: verdict.reasoning,
            matched_skills: extract_skills(&document.normalized_text),
            experience_years: experience_years(&document.normalized_text),
            rank: None,
            model_used: self.judge.backend_name().to_string(),
            degraded,
            metadata: resume.metadata,
        };

        if let Some(sink) = &self.sink {
            let record = ScreeningRecord::from_result(&job.id, &result);
            if let Err(error) = sink.persist(&record).await {
                warn!(resume_id = %result.resume_id, %error, "failed to persist screening result");
            }
        }

        Ok(result)
    }
}

pub struct ScreeningOrchestrator<S, B> {
    worker: Worker<S, B>,
    max_concurrency: usize,
}

impl<S> ScreeningOrchestrator<S, HttpJudgeBackend>
where
    S: VectorStore + 'static,
{
    pub fn from_config(store: S, config: &ScreeningConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let backend = HttpJudgeBackend::new(&config.judge, &config.credentials)?;
        let judge = StructuredJudgeClient::new(backend, config.judge.timeout);
        Ok(
            Self::new(EmbeddingIndex::with_default_embedder(store), judge)
                .with_fusion(config.fusion)
                .with_max_concurrency(config.max_concurrency),
        )
    }
}

impl<S, B> ScreeningOrchestrator<S, B>
where
    S: VectorStore + 'static,
    B: JudgeBackend + 'static,
{
    pub fn new(index: EmbeddingIndex<S>, judge: StructuredJudgeClient<B>) -> Self {
        Self {
            worker: Worker {
                index: Arc::new(index),
                judge: Arc::new(judge),
                fusion: FusionWeights::default(),
                sink: None,
            },
            max_concurrency: crate::config::DEFAULT_MAX_CONCURRENCY,
        }
    }

    pub fn with_fusion(mut self, fusion: FusionWeights) -> Self {
        self.worker.fusion = fusion;
        self
    }

    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency.max(1);
        self
    }

    pub fn with_sink(mut self, sink: Arc<dyn ResultSink>) -> Self {
        self.worker.sink = Some(sink);
        self
    }

    pub fn index(&self) -> &EmbeddingIndex<S> {
        &self.worker.index
    }

    pub async fn screen_one(
        &self,
        job_description: &str,
        resume_text: &str,
        resume_metadata: Option<Metadata>,
    ) -> Result<ScreeningResult, ScreeningError> {
        let (job, job_vector) = self.worker.index_job(job_description).await?;
        let resume = ResumeInput {
            text: resume_text.to_string(),
            metadata: resume_metadata.unwrap_or_default(),
        };
        self.worker.score(&job, &job_vector, resume).await
    }

    pub async fn screen_many(
        &self,
        job_description: &str,
        resumes: Vec<ResumeInput>,
    ) -> Result<BatchReport, ScreeningError> {
        self.screen_many_until(job_description, resumes, std::future::pending())
            .await
    }

    /// Like [`Self::screen_many`], but stops when `shutdown` resolves. Results
    /// finished by then are kept and ranked; the rest are reported as cancelled.
    pub async fn screen_many_until<F>(
        &self,
        job_description: &str,
        resumes: Vec<ResumeInput>,
        shutdown: F,
    ) -> Result<BatchReport, ScreeningError>
    where
        F: Future<Output = ()>,
    {
        let (job, job_vector) = self.worker.index_job(job_description).await?;
        let job = Arc::new(job);
        let job_vector = Arc::new(job_vector);
        let total = resumes.len();
        info!(job_id = %job.id, resumes = total, concurrency = self.max_concurrency, "screening batch");

        let filenames = resumes
            .iter()
            .enumerate()
            .map(|(index, resume)| {
                resume
                    .filename()
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("resume #{}", index + 1))
            })
            .collect::<Vec<_>>();

        let semaphore = Arc::new(Semaphore::new(self.max_concurrency));
        let mut tasks = JoinSet::new();
        for (index, resume) in resumes.into_iter().enumerate() {
            let worker = self.worker.clone();
            let job = Arc::clone(&job);
            let job_vector = Arc::clone(&job_vector);
            let semaphore = Arc::clone(&semaphore);
            tasks.spawn(async move {
                let outcome = match semaphore.acquire_owned().await {
                    Ok(_permit) => worker.score(&job, &job_vector, resume).await,
                    Err(error) => Err(ScreeningError::Task(error.to_string())),
                };
                (index, outcome)
            });
        }

        let mut outcomes: Vec<Option<Result<ScreeningResult, ScreeningError>>> =
            (0..total).map(|_| None).collect();
        let mut cancelled = false;
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                biased;
                joined = tasks.join_next() => match joined {
                    None => break,
                    Some(Ok((index, outcome))) => outcomes[index] = Some(outcome),
                    Some(Err(error)) if error.is_cancelled() => {}
                    Some(Err(error)) => warn!(%error, "screening task panicked"),
                },
                () = &mut shutdown, if !cancelled => {
                    cancelled = true;
                    warn!(job_id = %job.id, "screening batch cancelled");
                    tasks.abort_all();
                }
            }
        }

        let mut results = Vec::new();
        let mut failures = Vec::new();
        for (index, (outcome, filename)) in outcomes.into_iter().zip(filenames).enumerate() {
            match outcome {
                Some(Ok(result)) => results.push(result),
                Some(Err(error)) => {
                    warn!(index, filename = %filename, %error, "resume could not be scored");
                    failures.push(BatchFailure {
                        index: Some(index),
                        filename,
                        kind: failure_kind(&error),
                        reason: error.to_string(),
                    });
                }
                None if cancelled => failures.push(BatchFailure {
                    index: Some(index),
                    filename,
                    kind: FailureKind::Cancelled,
                    reason: "batch cancelled before this resume was scored".to_string(),
                }),
                None => failures.push(BatchFailure {
                    index: Some(index),
                    filename,
                    kind: FailureKind::Other,
                    reason: "screening task did not complete".to_string(),
                }),
            }
        }

        let results = rank(results);
        info!(
            job_id = %job.id,
            ranked = results.len(),
            failed = failures.len(),
            cancelled,
            "screening batch finished"
        );

        Ok(BatchReport {
            job_id: job.id.clone(),
            results,
            failures,
            cancelled,
        })
    }

    pub async fn search_similar_resumes(
        &self,
        job_description: &str,
        top_k: usize,
    ) -> Result<Vec<NearestHit>, ScreeningError> {
        self.worker
            .index
            .query_nearest(Collection::Resumes, job_description, top_k)
            .await
    }
}

fn failure_kind(error: &ScreeningError) -> FailureKind {
    match error {
        ScreeningError::Embedding(_) => FailureKind::Embedding,
        ScreeningError::Store(_) | ScreeningError::Io(_) | ScreeningError::Serialization(_) => {
            FailureKind::Store
        }
        ScreeningError::InputFormat { .. } => FailureKind::InputFormat,
        ScreeningError::Config(_) | ScreeningError::Task(_) => FailureKind::Other,
    }
}
