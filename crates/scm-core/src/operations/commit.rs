// ── Candidate configuration push ──

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::OperationsService;
use super::jobs::{Job, WaitOptions};
use crate::error::CoreError;

pub(crate) const COMMIT_ENDPOINT: &str = "/config/operations/v1/config-versions/candidate:push";

pub const COMMIT_DESCRIPTION_MAX_LEN: usize = 255;

/// Body of a commit request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommitRequest {
    pub folders: Vec<String>,
    /// Admin e-mail addresses, or `"all"`.
    pub admin: Vec<String>,
    pub description: String,
}

impl CommitRequest {
    pub fn new<F, A, S>(folders: F, admin: A, description: impl Into<String>) -> Self
    where
        F: IntoIterator<Item = S>,
        A: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            folders: folders.into_iter().map(Into::into).collect(),
            admin: admin.into_iter().map(Into::into).collect(),
            description: description.into(),
        }
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if self.folders.is_empty() {
            return Err(CoreError::validation("at least one folder is required"));
        }
        if self.folders.iter().any(|f| f.trim().is_empty()) {
            return Err(CoreError::validation("folder names cannot be empty"));
        }
        if self.admin.is_empty() {
            return Err(CoreError::validation("at least one admin is required"));
        }
        if let Some(bad) = self.admin.iter().find(|a| !is_admin(a)) {
            return Err(CoreError::validation(format!(
                "admin '{bad}' must be an e-mail address or 'all'"
            )));
        }
        if self.description.trim().is_empty() {
            return Err(CoreError::validation("description cannot be empty"));
        }
        if self.description.chars().count() > COMMIT_DESCRIPTION_MAX_LEN {
            return Err(CoreError::validation(format!(
                "description exceeds {COMMIT_DESCRIPTION_MAX_LEN} characters"
            )));
        }
        Ok(())
    }
}

fn is_admin(value: &str) -> bool {
    value == "all" || is_email(value)
}

/// `local@domain.tld`, no whitespace, exactly one `@`.
fn is_email(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain
            .split_once('.')
            .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
        && !domain.ends_with('.')
}

/// Server acknowledgement of a commit.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CommitResponse {
    pub success: bool,
    pub job_id: String,
    #[serde(default)]
    pub message: String,
}

/// Result of [`OperationsService::commit_and_wait`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitOutcome {
    pub response: CommitResponse,
    /// Terminal job state; `None` when the server did not accept the commit.
    pub job: Option<Job>,
}

impl OperationsService {
    /// Push the candidate configuration of `folders`.
    ///
    /// Returns as soon as the server has accepted the job.
    pub async fn commit(&self, request: &CommitRequest) -> Result<CommitResponse, CoreError> {
        request.validate()?;
        let response: CommitResponse = self.api.post(COMMIT_ENDPOINT, request).await?;
        info!(
            job_id = %response.job_id,
            success = response.success,
            folders = ?request.folders,
            "commit submitted"
        );
        Ok(response)
    }

    /// Commit, then wait for the job with `options`.
    pub async fn commit_and_wait(
        &self,
        request: &CommitRequest,
        options: &WaitOptions,
    ) -> Result<CommitOutcome, CoreError> {
        options.validate()?;
        let response = self.commit(request).await?;
        if !response.success {
            warn!(message = %response.message, "commit not accepted, not waiting");
            return Ok(CommitOutcome {
                response,
                job: None,
            });
        }
        let job = self.wait_for_job(&response.job_id, options).await?;
        Ok(CommitOutcome {
            response,
            job: Some(job),
        })
    }
}
