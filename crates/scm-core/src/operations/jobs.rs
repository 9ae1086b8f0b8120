// ── Job status, listing, and waiting ──

use std::time::Duration;

use scm_api::{FetchResponse, Page};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::OperationsService;
use crate::error::CoreError;

pub(crate) const JOBS_ENDPOINT: &str = "/config/operations/v1/jobs";

/// Page size used by [`OperationsService::list_all_jobs`].
pub const DEFAULT_JOB_PAGE_LIMIT: u32 = 200;

/// Default interval between job status polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// Default deadline for a job to reach a terminal state.
pub const DEFAULT_JOB_TIMEOUT: Duration = Duration::from_secs(300);

/// Coarse job state, parsed from `status_str` or `job_status`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum JobStatus {
    Pending,
    Active,
    Finished,
    Failed,
    Unknown(String),
}

impl JobStatus {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "PEND" => Self::Pending,
            "ACT" => Self::Active,
            "FIN" => Self::Finished,
            "FAIL" => Self::Failed,
            other => Self::Unknown(other.to_owned()),
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Finished | Self::Failed)
    }
}

/// A job record as returned by the jobs endpoints.
///
/// Most fields are strings on the wire, including `percent`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_str: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_i: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result_str: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result_i: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_result: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_ts: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_ts: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_update: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_str: Option<String>,
}

impl Job {
    /// State reported by `status_str` or `job_status`.
    ///
    /// A terminal value in either field wins, then a recognised one, then
    /// whatever was sent. A job with neither field counts as pending.
    pub fn status(&self) -> JobStatus {
        let reported: Vec<JobStatus> = [self.status_str.as_deref(), self.job_status.as_deref()]
            .into_iter()
            .flatten()
            .map(JobStatus::parse)
            .collect();

        reported
            .iter()
            .find(|s| s.is_terminal())
            .or_else(|| reported.iter().find(|s| !matches!(s, JobStatus::Unknown(_))))
            .or_else(|| reported.first())
            .cloned()
            .unwrap_or(JobStatus::Pending)
    }

    pub fn is_terminal(&self) -> bool {
        self.status().is_terminal()
    }

    /// Finished without a `FAIL` result in `result_str` or `job_result`.
    pub fn succeeded(&self) -> bool {
        self.status() == JobStatus::Finished
            && self.result_str.as_deref() != Some("FAIL")
            && self.job_result.as_deref() != Some("FAIL")
    }

    /// Completion percentage, when the server reported a parseable one.
    pub fn percent(&self) -> Option<u8> {
        self.percent.as_deref()?.trim().parse().ok()
    }

    /// Top-level jobs have no parent or the parent id `"0"`.
    pub fn is_top_level(&self) -> bool {
        self.parent_id.as_deref().is_none_or(|p| p.is_empty() || p == "0")
    }
}

/// Which part of the job tree a listing should keep.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobParent {
    TopLevel,
    ChildrenOf(String),
}

impl JobParent {
    fn matches(&self, job: &Job) -> bool {
        match self {
            Self::TopLevel => job.is_top_level(),
            Self::ChildrenOf(parent) => job.parent_id.as_deref() == Some(parent.as_str()),
        }
    }
}

/// Deadline, poll interval, and optional cancellation for a job wait.
#[derive(Debug, Clone)]
pub struct WaitOptions {
    pub timeout: Duration,
    pub interval: Duration,
    pub cancel: Option<CancellationToken>,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_JOB_TIMEOUT,
            interval: DEFAULT_POLL_INTERVAL,
            cancel: None,
        }
    }
}

impl WaitOptions {
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn cancel(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Reject a zero poll interval or deadline.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.interval.is_zero() {
            return Err(CoreError::validation("job poll interval must be greater than zero"));
        }
        if self.timeout.is_zero() {
            return Err(CoreError::validation("job timeout must be greater than zero"));
        }
        Ok(())
    }
}

impl OperationsService {
    /// Current state of one job.
    pub async fn get_job_status(&self, job_id: &str) -> Result<Job, CoreError> {
        if job_id.trim().is_empty() {
            return Err(CoreError::validation("job_id cannot be empty"));
        }
        let response: FetchResponse<Job> = self
            .api
            .get(&format!("{JOBS_ENDPOINT}/{job_id}"))
            .await
            .map_err(|e| CoreError::from(e).for_entity("Job", job_id))?;

        response
            .into_candidates()
            .into_iter()
            .next()
            .ok_or_else(|| CoreError::NotFound {
                entity_type: "Job".into(),
                identifier: job_id.to_owned(),
                code: None,
                details: None,
            })
    }

    /// One page of the job list.
    ///
    /// The `parent` restriction is applied to the returned page; `total`,
    /// `limit`, and `offset` are passed through as the server reported them.
    pub async fn list_jobs(
        &self,
        limit: u32,
        offset: u64,
        parent: Option<&JobParent>,
    ) -> Result<Page<Job>, CoreError> {
        if limit == 0 {
            return Err(CoreError::validation("limit must be greater than 0"));
        }
        let mut page: Page<Job> = self.api.list_page(JOBS_ENDPOINT, offset, limit, &[]).await?;
        if let Some(parent) = parent {
            page.data.retain(|job| parent.matches(job));
        }
        Ok(page)
    }

    /// Every job, paginated with the usual stop conditions.
    pub async fn list_all_jobs(&self, parent: Option<&JobParent>) -> Result<Vec<Job>, CoreError> {
        let api = &self.api;
        let mut jobs: Vec<Job> = api
            .paginate_all(DEFAULT_JOB_PAGE_LIMIT, |offset, limit| async move {
                api.list_page(JOBS_ENDPOINT, offset, limit, &[]).await
            })
            .await?;
        if let Some(parent) = parent {
            jobs.retain(|job| parent.matches(job));
        }
        Ok(jobs)
    }

    /// Poll a job until it reaches `FIN` or `FAIL`.
    ///
    /// A failed job is returned as a value. Errors only on request failure,
    /// on deadline expiry, or when `options.cancel` fires.
    pub async fn wait_for_job(&self, job_id: &str, options: &WaitOptions) -> Result<Job, CoreError> {
        options.validate()?;
        let cancel = options.cancel.clone().unwrap_or_default();

        let poll = async {
            loop {
                let job = self.get_job_status(job_id).await?;
                debug!(
                    job_id,
                    status = ?job.status(),
                    percent = job.percent(),
                    "polled job"
                );
                if job.is_terminal() {
                    return Ok::<_, CoreError>(job);
                }
                tokio::time::sleep(options.interval).await;
            }
        };

        let outcome = tokio::select! {
            biased;
            () = cancel.cancelled() => {
                return Err(CoreError::Cancelled { job_id: job_id.to_owned() });
            }
            outcome = tokio::time::timeout(options.timeout, poll) => outcome,
        };

        let job = outcome.map_err(|_| CoreError::JobTimeout {
            job_id: job_id.to_owned(),
            waited: options.timeout,
        })??;
        info!(
            job_id,
            result = job.result_str.as_deref().unwrap_or("-"),
            "job reached terminal state"
        );
        Ok(job)
    }
}
