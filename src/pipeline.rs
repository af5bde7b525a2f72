use serde::Serialize;
use tracing::{error, info};

use crate::archive::write_archive;
use crate::config::PipelineConfig;
use crate::error::HarvestError;
use crate::fetch::{Fetcher, PostsTransport, RequestFailure};
use crate::source::load_records;
use crate::store::{InsertSummary, persist_posts};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "message", rename_all = "lowercase")]
pub enum StepOutcome {
    Done,
    Failed(String),
}

impl StepOutcome {
    pub fn is_done(&self) -> bool {
        matches!(self, StepOutcome::Done)
    }
}

#[derive(Debug, Serialize)]
pub struct RunReport {
    pub started_at: String,
    pub records: usize,
    pub posts: usize,
    pub request_failures: Vec<RequestFailure>,
    pub archive: StepOutcome,
    pub store: StepOutcome,
    pub inserted: Option<InsertSummary>,
}

impl RunReport {
    /// True when every request, the archive and the store all succeeded.
    pub fn is_complete(&self) -> bool {
        self.request_failures.is_empty() && self.archive.is_done() && self.store.is_done()
    }
}

pub struct Pipeline<T: PostsTransport> {
    config: PipelineConfig,
    fetcher: Fetcher<T>,
}

impl<T: PostsTransport> Pipeline<T> {
    pub fn new(config: PipelineConfig, transport: T) -> Self {
        Self {
            config,
            fetcher: Fetcher::new(transport),
        }
    }

    pub fn fetcher(&self) -> &Fetcher<T> {
        &self.fetcher
    }

    /// Runs load, fetch, archive and store in sequence.
    ///
    /// Only a missing or malformed source file is returned as an error, and
    /// in that case nothing else has been touched. Every later failure is
    /// logged and recorded in the [`RunReport`].
    pub fn run(&self) -> Result<RunReport, HarvestError> {
        let started_at = chrono::Utc::now().to_rfc3339();

        let records = match load_records(&self.config.source_path) {
            Ok(records) => records,
            Err(err) => {
                error!("{err}");
                return Err(err);
            }
        };

        let outcome = self.fetcher.fetch_all(&records);
        let posts = outcome.posts;

        let archive = match write_archive(&posts, &self.config.archive_path) {
            Ok(()) => {
                info!("saved {} posts to {}", posts.len(), self.config.archive_path);
                StepOutcome::Done
            }
            Err(err) => {
                error!("{err}");
                StepOutcome::Failed(err.to_string())
            }
        };

        let (store, inserted) = match persist_posts(&posts, &self.config.database_path) {
            Ok(summary) => {
                info!(
                    "stored {} posts into {} ({} new, {} already present)",
                    posts.len(),
                    self.config.database_path,
                    summary.inserted,
                    summary.skipped
                );
                (StepOutcome::Done, Some(summary))
            }
            Err(err) => {
                error!("{err}");
                (StepOutcome::Failed(err.to_string()), None)
            }
        };

        Ok(RunReport {
            started_at,
            records: records.len(),
            posts: posts.len(),
            request_failures: outcome.failures,
            archive,
            store,
            inserted,
        })
    }
}
