//! `TickTick` client implementing the snapshot source port.

use crate::sync::domain::{SourceTask, TaskSource};
use crate::sync::ports::{CompletionOutcome, SnapshotSource, SourceError, SourceResult};
use crate::ticktick::config::TicktickConfig;
use crate::ticktick::credentials::SessionCache;
use crate::ticktick::transport::{
    HttpRequest, HttpResponse, HttpTransport, RetryPolicy, with_retry,
};
use crate::ticktick::wire::{self, BatchResponse, SignOnResponse};
use async_trait::async_trait;
use chrono::TimeDelta;
use mockable::Clock;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

const SIGNON_TIMEOUT: Duration = Duration::from_secs(15);
const BATCH_TIMEOUT: Duration = Duration::from_secs(20);
const COMPLETE_TIMEOUT: Duration = Duration::from_secs(20);

/// Hours a freshly signed-on session token stays cached.
const SIGNON_TOKEN_TTL_HOURS: i64 = 12;
/// Hours a static token stays cached before being re-read.
const STATIC_TOKEN_TTL_HOURS: i64 = 6;

/// Client for the `TickTick` sync and open APIs.
///
/// Sessions are cached across calls; sign-on happens lazily when no fresh
/// token is available. The transport is generic so tests can script
/// responses.
#[derive(Debug)]
pub struct TicktickClient<T, C> {
    config: TicktickConfig,
    transport: Arc<T>,
    session: SessionCache<C>,
    retry: RetryPolicy,
}

impl<T, C> TicktickClient<T, C>
where
    T: HttpTransport,
    C: Clock + Send + Sync,
{
    /// Creates a client over the given transport and clock.
    #[must_use]
    pub fn new(config: TicktickConfig, transport: Arc<T>, clock: Arc<C>) -> Self {
        let retry = RetryPolicy::new(config.max_attempts(), config.retry_delay());
        Self {
            session: SessionCache::new(clock),
            config,
            transport,
            retry,
        }
    }

    /// Returns a usable session token, signing on when the cache is stale.
    async fn session_token(&self) -> SourceResult<String> {
        if let Some(token) = self.session.fresh_token() {
            return Ok(token);
        }

        if let Some(token) = self.config.static_token() {
            self.session
                .store(token, TimeDelta::hours(STATIC_TOKEN_TTL_HOURS));
            return Ok(token.to_owned());
        }

        let (Some(username), Some(password)) = (self.config.username(), self.config.password())
        else {
            return Err(SourceError::Unconfigured(
                "no static token and no sign-on credentials are set".to_owned(),
            ));
        };

        info!("signing on to the sync api");
        let request = HttpRequest::post(self.config.signon_url())
            .with_header("User-Agent", self.config.user_agent())
            .with_header("X-Device", self.config.x_device())
            .with_json(json!({ "username": username, "password": password }))
            .with_timeout(SIGNON_TIMEOUT);
        let response = self
            .execute_with_retry("sync sign-on", request)
            .await
            .map_err(SourceError::Network)?;

        if !response.is_success() {
            return Err(SourceError::Auth(format!(
                "sign-on failed with status {}: {}",
                response.status(),
                truncate_for_error(response.body())
            )));
        }

        let parsed: SignOnResponse = serde_json::from_str(response.body()).map_err(|err| {
            SourceError::Payload(format!("sign-on response was not valid JSON: {err}"))
        })?;
        let token = parsed
            .token
            .as_deref()
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| {
                SourceError::Auth("sign-on response did not contain a token".to_owned())
            })?
            .to_owned();

        self.session
            .store(&token, TimeDelta::hours(SIGNON_TOKEN_TTL_HOURS));
        Ok(token)
    }

    async fn fetch(&self) -> SourceResult<Vec<SourceTask>> {
        let token = self.session_token().await?;

        info!("fetching snapshot from the sync api");
        let request = HttpRequest::get(self.config.batch_url())
            .with_header("User-Agent", self.config.user_agent())
            .with_header("X-Device", self.config.x_device())
            .with_header("Cookie", format!("t={token}"))
            .with_timeout(BATCH_TIMEOUT);
        let response = self
            .execute_with_retry("fetch sync batch", request)
            .await
            .map_err(SourceError::Network)?;

        if !response.is_success() {
            return Err(SourceError::Api {
                status: response.status(),
                detail: truncate_for_error(response.body()),
            });
        }

        let batch: BatchResponse = serde_json::from_str(response.body()).map_err(|err| {
            SourceError::Payload(format!("batch response was not valid JSON: {err}"))
        })?;
        let tasks = wire::normalize(&batch, self.config.inbox_name());
        info!(count = tasks.len(), "snapshot fetched");
        Ok(tasks)
    }

    /// Completes a task, preferring the open API and falling back to the
    /// sync API.
    ///
    /// Success on either path confirms the completion outright; failure
    /// details from both paths are aggregated into the unconfirmed
    /// message.
    async fn complete(&self, project_id: &str, external_id: &str) -> CompletionOutcome {
        let mut failures = Vec::new();

        if let Some(access_token) = self.config.access_token() {
            let request = HttpRequest::post(self.config.open_complete_url(project_id, external_id))
                .with_header("Authorization", format!("Bearer {access_token}"))
                .with_json(json!({}))
                .with_timeout(COMPLETE_TIMEOUT);
            match self.execute_completion("complete task open/v1", request).await {
                Ok(()) => return CompletionOutcome::confirmed(),
                Err(detail) => failures.push(format!("open/v1: {detail}")),
            }
        } else {
            failures.push("open/v1: TICKTICK_ACCESS_TOKEN is not configured".to_owned());
        }

        let token = match self.session_token().await {
            Ok(token) => token,
            Err(err) => {
                failures.push(format!("sync/v2: {err}"));
                return CompletionOutcome::unconfirmed(unconfirmed_message(&failures));
            }
        };

        let request = HttpRequest::post(self.config.sync_complete_url(project_id, external_id))
            .with_header("User-Agent", self.config.user_agent())
            .with_header("X-Device", self.config.x_device())
            .with_header("Cookie", format!("t={token}"))
            .with_json(json!({}))
            .with_timeout(COMPLETE_TIMEOUT);
        match self.execute_completion("complete task sync/v2", request).await {
            Ok(()) => CompletionOutcome::confirmed(),
            Err(detail) => {
                failures.push(format!("sync/v2: {detail}"));
                CompletionOutcome::unconfirmed(unconfirmed_message(&failures))
            }
        }
    }

    async fn execute_completion(
        &self,
        operation: &str,
        request: HttpRequest,
    ) -> Result<(), String> {
        let response = self.execute_with_retry(operation, request).await?;
        if response.is_success() {
            Ok(())
        } else {
            Err(format!(
                "status {}: {}",
                response.status(),
                truncate_for_error(response.body())
            ))
        }
    }

    async fn execute_with_retry(
        &self,
        operation: &str,
        request: HttpRequest,
    ) -> Result<HttpResponse, String> {
        with_retry(self.retry, operation, || {
            let request = request.clone();
            let transport = Arc::clone(&self.transport);
            async move { transport.execute(request).await }
        })
        .await
        .map_err(|err| err.to_string())
    }
}

#[async_trait]
impl<T, C> SnapshotSource for TicktickClient<T, C>
where
    T: HttpTransport,
    C: Clock + Send + Sync,
{
    fn source(&self) -> TaskSource {
        TaskSource::Ticktick
    }

    fn auth_hint(&self) -> Option<String> {
        self.config.auth_setup_hint()
    }

    async fn fetch_snapshot(&self) -> SourceResult<Vec<SourceTask>> {
        self.fetch().await
    }

    async fn complete_task(&self, project_id: &str, external_id: &str) -> CompletionOutcome {
        self.complete(project_id, external_id).await
    }
}

fn unconfirmed_message(failures: &[String]) -> String {
    format!(
        "the source did not confirm completion ({})",
        failures.join(" | ")
    )
}

fn truncate_for_error(body: &str) -> String {
    const MAX_LEN: usize = 200;
    if body.chars().count() <= MAX_LEN {
        body.to_owned()
    } else {
        format!("{}...", body.chars().take(MAX_LEN).collect::<String>())
    }
}
