use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, LOCATION};
use serde::Deserialize;
use tracing::{info, warn};

use crate::arena::ArenaPayload;
use crate::config::Credentials;
use crate::error::{Result, SchedulerError};

/// The reference behavior had no per-request timeout; this bound keeps a
/// stalled connection from hanging the whole run.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Outcome of one creation attempt, in slot order within a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreationResult {
    /// The arena exists; `url` feeds the next slot's description.
    Created { url: String },
    /// The server said no (non-2xx). Handled, non-fatal; the chain link
    /// does not advance.
    Rejected { status: u16, body: String },
    /// Dry-run mode, no request sent.
    DryRun,
    /// Transport or response-decode fault. Recorded by the orchestrator,
    /// never returned by a client directly.
    TransportFailed { detail: String },
}

/// Seam between the orchestrator and the platform. Implementations return
/// `Err` only for transport-level faults; API rejections come back as
/// [`CreationResult::Rejected`].
#[async_trait]
pub trait ArenaApi: Send + Sync {
    async fn create_arena(&self, payload: &ArenaPayload) -> Result<CreationResult>;
}

/// Response schema for a successful tournament creation.
#[derive(Debug, Deserialize)]
struct CreatedTournament {
    id: String,
}

pub struct LichessClient {
    http: reqwest::Client,
    server: String,
    credentials: Credentials,
    dry_run: bool,
}

impl LichessClient {
    pub fn new(server: &str, credentials: Credentials, dry_run: bool) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(SchedulerError::ClientBuild)?;
        Ok(Self {
            http,
            server: server.trim_end_matches('/').to_string(),
            credentials,
            dry_run,
        })
    }

    /// URL of a created tournament: the `id` from the decoded body wins,
    /// the `Location` header is the fallback.
    fn tournament_url(&self, body: &str, location: Option<String>) -> Result<String> {
        if let Ok(created) = serde_json::from_str::<CreatedTournament>(body) {
            return Ok(format!("{}/tournament/{}", self.server, created.id));
        }
        location.ok_or_else(|| SchedulerError::MalformedResponse {
            body: body.to_string(),
        })
    }
}

#[async_trait]
impl ArenaApi for LichessClient {
    async fn create_arena(&self, payload: &ArenaPayload) -> Result<CreationResult> {
        info!(%payload, "creating arena");

        if self.dry_run {
            info!("dry run, not sending request");
            return Ok(CreationResult::DryRun);
        }

        let url = format!("{}/api/tournament", self.server);
        let response = self
            .http
            .post(&url)
            .bearer_auth(self.credentials.token())
            .header(ACCEPT, "application/json")
            .form(&payload.fields())
            .send()
            .await
            .map_err(|source| SchedulerError::Http {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        let location = response
            .headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_string());
        let body = response
            .text()
            .await
            .map_err(|source| SchedulerError::ResponseBody {
                url: url.clone(),
                source,
            })?;

        if !status.is_success() {
            warn!(status = status.as_u16(), %body, "arena creation rejected");
            return Ok(CreationResult::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let tournament_url = self.tournament_url(&body, location)?;
        info!(url = %tournament_url, "arena created");
        Ok(CreationResult::Created {
            url: tournament_url,
        })
    }
}
