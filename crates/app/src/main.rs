use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};
use resume_screen_core::{
    content_id, load_resume_folder, read_text_document, BatchFailure, BatchReport, Collection,
    Credentials, EmbeddingIndex, FileVectorStore, FusionWeights, JsonLinesSink, Provider,
    ScreeningConfig, ScreeningOrchestrator,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "resume-screen", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Directory holding the persisted embedding collections.
    #[arg(long, default_value = "./screening_store")]
    store_dir: PathBuf,

    /// Judge provider: openai, gpt, claude, anthropic, gemini or google.
    #[arg(long, env = "SCREENING_MODEL", default_value = "openai")]
    model: String,

    /// Model name override for the selected provider.
    #[arg(long)]
    judge_model: Option<String>,

    /// Base URL override for the judge API.
    #[arg(long)]
    judge_base_url: Option<String>,

    /// Seconds to wait for a single judge reply.
    #[arg(long, default_value = "60")]
    timeout_secs: u64,

    /// Resumes scored at once.
    #[arg(long, default_value = "4")]
    concurrency: usize,

    /// Weight of the judge score in the final score.
    #[arg(long, default_value = "0.7")]
    ai_weight: f64,

    /// Weight of the vector score in the final score.
    #[arg(long, default_value = "0.3")]
    vector_weight: f64,

    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    openai_api_key: Option<String>,

    #[arg(long, env = "ANTHROPIC_API_KEY", hide_env_values = true)]
    anthropic_api_key: Option<String>,

    #[arg(long, env = "GOOGLE_API_KEY", hide_env_values = true)]
    google_api_key: Option<String>,
}

#[derive(Subcommand)]
enum Command {
    /// Score every resume in a folder against a job description.
    Screen {
        /// Job description file (.txt, .md or .text).
        #[arg(long)]
        job: PathBuf,
        /// Folder searched recursively for resumes.
        #[arg(long)]
        resumes: PathBuf,
        /// Print the full report as JSON.
        #[arg(long, default_value_t = false)]
        json: bool,
        /// Append one JSON line per scored resume to this file.
        #[arg(long)]
        results_log: Option<PathBuf>,
    },
    /// List stored resumes closest to a job description.
    Similar {
        #[arg(long)]
        job: PathBuf,
        #[arg(long, default_value = "5")]
        top_k: usize,
    },
    /// Remove stored embeddings.
    Clear {
        #[arg(long, value_enum, default_value = "all")]
        collection: CollectionArg,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum CollectionArg {
    Resumes,
    JobDescriptions,
    All,
}

impl CollectionArg {
    fn collections(self) -> Vec<Collection> {
        match self {
            CollectionArg::Resumes => vec![Collection::Resumes],
            CollectionArg::JobDescriptions => vec![Collection::JobDescriptions],
            CollectionArg::All => Collection::ALL.to_vec(),
        }
    }
}

impl Cli {
    fn screening_config(&self) -> anyhow::Result<ScreeningConfig> {
        let provider = self.model.parse::<Provider>()?;
        let credentials = Credentials {
            openai_api_key: self.openai_api_key.clone(),
            anthropic_api_key: self.anthropic_api_key.clone(),
            google_api_key: self.google_api_key.clone(),
        };

        let mut config = ScreeningConfig::new(provider, credentials);
        config.judge.model = self.judge_model.clone();
        config.judge.base_url = self.judge_base_url.clone();
        config.judge.timeout = Duration::from_secs(self.timeout_secs);
        config.fusion = FusionWeights::new(self.ai_weight, self.vector_weight)?;
        config.max_concurrency = self.concurrency;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let app_version = env!("CARGO_PKG_VERSION");

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(fmt::layer())
        .init();

    let cli = Cli::parse();
    info!(
        version = app_version,
        started_at = %Utc::now().to_rfc3339(),
        "resume-screen boot"
    );

    let store = FileVectorStore::open(&cli.store_dir).await?;

    match &cli.command {
        Command::Screen {
            job,
            resumes,
            json,
            results_log,
        } => {
            let config = cli.screening_config()?;
            let job_description = read_text_document(job)?;
            let loaded = load_resume_folder(resumes)?;

            for skipped in &loaded.skipped_files {
                warn!(path = %skipped.path.display(), reason = %skipped.reason, "skipped resume");
            }
            let skipped = loaded
                .skipped_files
                .into_iter()
                .map(BatchFailure::from)
                .collect::<Vec<_>>();

            let mut report = if loaded.resumes.is_empty() {
                BatchReport {
                    job_id: content_id(&job_description),
                    ..BatchReport::default()
                }
            } else {
                let mut orchestrator = ScreeningOrchestrator::from_config(store, &config)?;
                if let Some(path) = results_log {
                    orchestrator = orchestrator.with_sink(Arc::new(JsonLinesSink::new(path)));
                }

                info!(
                    job = %job.display(),
                    resumes = loaded.resumes.len(),
                    provider = %config.judge.provider,
                    "screening"
                );
                let shutdown = async {
                    if let Err(error) = tokio::signal::ctrl_c().await {
                        warn!(%error, "unable to listen for ctrl-c");
                        std::future::pending::<()>().await;
                    }
                };
                orchestrator
                    .screen_many_until(&job_description, loaded.resumes, shutdown)
                    .await?
            };
            report.failures.extend(skipped);

            if *json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_report(&report);
            }
        }
        Command::Similar { job, top_k } => {
            let job_description = read_text_document(job)?;
            let index = EmbeddingIndex::with_default_embedder(store);
            let hits = index
                .query_nearest(Collection::Resumes, &job_description, *top_k)
                .await?;

            if hits.is_empty() {
                println!("no stored resumes; run `screen` first");
            }
            for (position, hit) in hits.iter().enumerate() {
                let filename = hit
                    .metadata
                    .get("filename")
                    .and_then(|value| value.as_str())
                    .unwrap_or("unknown");
                println!(
                    "{:>3}. distance={:.4} id={} file={}",
                    position + 1,
                    hit.distance,
                    hit.id,
                    filename
                );
            }
        }
        Command::Clear { collection } => {
            let index = EmbeddingIndex::with_default_embedder(store);
            for collection in collection.collections() {
                index.clear(collection).await?;
                println!("cleared {collection}");
            }
        }
    }

    Ok(())
}

fn print_report(report: &BatchReport) {
    println!("job: {}", report.job_id);
    println!(
        "{:>4}  {:<32} {:>7} {:>8} {:>7} {:<6} {:>6} {:>6}",
        "rank", "file", "score", "ai", "vector", "rec", "skills", "years"
    );
    for result in &report.results {
        println!(
            "{:>4}  {:<32} {:>7.2} {:>8.2} {:>7.3} {:<6} {:>6} {:>6.1}{}",
            result.rank.unwrap_or_default(),
            truncate(&result.filename, 32),
            result.score,
            result.ai_score,
            result.vector_similarity,
            result.recommendation.as_str(),
            result.matched_skills.len(),
            result.experience_years,
            if result.degraded.is_some() { "  (degraded)" } else { "" }
        );
    }

    for failure in &report.failures {
        println!("failed: {} [{:?}] {}", failure.filename, failure.kind, failure.reason);
    }
    if report.cancelled {
        println!("batch cancelled; partial results shown");
    }
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut shortened = text.chars().take(width.saturating_sub(3)).collect::<String>();
    shortened.push_str("...");
    shortened
}
