// ── Operational endpoints: commit and jobs ──
//
// A commit is asynchronous on the server: the push returns a job id, and
// completion is observed by re-querying the job until it is `FIN` or `FAIL`.

pub mod commit;
pub mod jobs;

use std::sync::Arc;

use scm_api::ApiClient;

pub use commit::{COMMIT_DESCRIPTION_MAX_LEN, CommitOutcome, CommitRequest, CommitResponse};
pub use jobs::{
    DEFAULT_JOB_PAGE_LIMIT, DEFAULT_JOB_TIMEOUT, DEFAULT_POLL_INTERVAL, Job, JobParent, JobStatus,
    WaitOptions,
};

/// Commit submission, job status, and job listing.
#[derive(Clone)]
pub struct OperationsService {
    api: Arc<ApiClient>,
    defaults: WaitOptions,
}

impl OperationsService {
    pub fn new(api: Arc<ApiClient>, defaults: WaitOptions) -> Self {
        Self { api, defaults }
    }

    /// Wait options derived from the client configuration.
    pub fn default_wait_options(&self) -> WaitOptions {
        self.defaults.clone()
    }
}
