//! Configuration for the `TickTick` snapshot source.
//!
//! All settings come from `TICKTICK_*` environment variables. Credentials
//! are optional at construction time: a config without them is valid and
//! reports a setup hint instead of failing, so that embedders can surface
//! the hint to end users.

use crate::sync::ports::SourceError;
use serde_json::json;
use std::fmt;
use std::time::Duration;
use uuid::Uuid;

const DEFAULT_SYNC_BASE_URL: &str = "https://api.ticktick.com/api/v2";
const DEFAULT_OPEN_BASE_URL: &str = "https://api.ticktick.com/open/v1";
const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (rv:145.0) Firefox/145.0";
const DEFAULT_INBOX_NAME: &str = "Inbox";
const DEFAULT_MAX_ATTEMPTS: u32 = 3;
const DEFAULT_RETRY_DELAY_MS: u64 = 500;

const AUTH_SETUP_HINT: &str = "TickTick Sync API is not configured. Set TICKTICK_SYNC_USERNAME \
     and TICKTICK_SYNC_PASSWORD (recommended), or set TICKTICK_SYNC_TOKEN.";

/// Settings for the `TickTick` client.
#[derive(Clone)]
pub struct TicktickConfig {
    sync_base_url: String,
    open_base_url: String,
    user_agent: String,
    x_device: String,
    inbox_name: String,
    static_token: Option<String>,
    username: Option<String>,
    password: Option<String>,
    access_token: Option<String>,
    max_attempts: u32,
    retry_delay: Duration,
}

impl fmt::Debug for TicktickConfig {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("TicktickConfig")
            .field("sync_base_url", &self.sync_base_url)
            .field("open_base_url", &self.open_base_url)
            .field("user_agent", &self.user_agent)
            .field("x_device", &self.x_device)
            .field("inbox_name", &self.inbox_name)
            .field("static_token", &self.static_token.as_ref().map(|_| "<redacted>"))
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
            .field("max_attempts", &self.max_attempts)
            .field("retry_delay", &self.retry_delay)
            .finish()
    }
}

impl Default for TicktickConfig {
    fn default() -> Self {
        Self {
            sync_base_url: DEFAULT_SYNC_BASE_URL.to_owned(),
            open_base_url: DEFAULT_OPEN_BASE_URL.to_owned(),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            x_device: default_x_device(),
            inbox_name: DEFAULT_INBOX_NAME.to_owned(),
            static_token: None,
            username: None,
            password: None,
            access_token: None,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            retry_delay: Duration::from_millis(DEFAULT_RETRY_DELAY_MS),
        }
    }
}

impl TicktickConfig {
    /// Creates a config with default endpoints and no credentials.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads the config from `TICKTICK_*` environment variables.
    ///
    /// Missing credentials are not an error; [`auth_setup_hint`] reports
    /// them instead. Malformed numeric settings are.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Unconfigured`] when a numeric variable does
    /// not parse.
    ///
    /// [`auth_setup_hint`]: Self::auth_setup_hint
    pub fn from_env() -> Result<Self, SourceError> {
        let mut config = Self::default();
        if let Some(value) = env_setting("TICKTICK_SYNC_BASE_URL") {
            config.sync_base_url = value;
        }
        if let Some(value) = env_setting("TICKTICK_OPEN_BASE_URL") {
            config.open_base_url = value;
        }
        if let Some(value) = env_setting("TICKTICK_SYNC_USER_AGENT") {
            config.user_agent = value;
        }
        if let Some(value) = env_setting("TICKTICK_SYNC_X_DEVICE") {
            config.x_device = value;
        }
        if let Some(value) = env_setting("TICKTICK_INBOX_NAME") {
            config.inbox_name = value;
        }
        config.static_token = env_setting("TICKTICK_SYNC_TOKEN");
        config.username = env_setting("TICKTICK_SYNC_USERNAME");
        config.password = env_setting("TICKTICK_SYNC_PASSWORD");
        config.access_token = env_setting("TICKTICK_ACCESS_TOKEN");
        if let Some(raw) = env_setting("TICKTICK_MAX_ATTEMPTS") {
            config.max_attempts = raw.parse::<u32>().map_err(|_| {
                SourceError::Unconfigured(
                    "TICKTICK_MAX_ATTEMPTS must be an unsigned integer".to_owned(),
                )
            })?;
        }
        if let Some(raw) = env_setting("TICKTICK_RETRY_DELAY_MS") {
            let millis = raw.parse::<u64>().map_err(|_| {
                SourceError::Unconfigured(
                    "TICKTICK_RETRY_DELAY_MS must be an unsigned integer".to_owned(),
                )
            })?;
            config.retry_delay = Duration::from_millis(millis);
        }
        Ok(config)
    }

    /// Sets the sync API base URL.
    #[must_use]
    pub fn with_sync_base_url(mut self, url: impl Into<String>) -> Self {
        self.sync_base_url = url.into();
        self
    }

    /// Sets the open API base URL.
    #[must_use]
    pub fn with_open_base_url(mut self, url: impl Into<String>) -> Self {
        self.open_base_url = url.into();
        self
    }

    /// Sets the user agent sent with sync API requests.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Sets the `X-Device` header payload sent with sync API requests.
    #[must_use]
    pub fn with_x_device(mut self, x_device: impl Into<String>) -> Self {
        self.x_device = x_device.into();
        self
    }

    /// Sets the display name given to the inbox pseudo-project.
    #[must_use]
    pub fn with_inbox_name(mut self, name: impl Into<String>) -> Self {
        self.inbox_name = name.into();
        self
    }

    /// Sets a static sync API token, bypassing sign-on.
    #[must_use]
    pub fn with_static_token(mut self, token: impl Into<String>) -> Self {
        self.static_token = Some(token.into());
        self
    }

    /// Sets the sign-on credentials for the sync API.
    #[must_use]
    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    /// Sets the OAuth access token for the open API.
    #[must_use]
    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    /// Sets the retry attempt ceiling for transient transport failures.
    #[must_use]
    pub const fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Sets the base delay between retry attempts.
    #[must_use]
    pub const fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Returns the setup hint when no usable sync credentials are
    /// configured.
    ///
    /// Credentials are usable when a static token is present, or when both
    /// username and password are.
    #[must_use]
    pub fn auth_setup_hint(&self) -> Option<String> {
        let has_static_token = self.static_token.is_some();
        let has_sign_on = self.username.is_some() && self.password.is_some();
        if has_static_token || has_sign_on {
            return None;
        }
        Some(AUTH_SETUP_HINT.to_owned())
    }

    /// Returns the sign-on endpoint.
    #[must_use]
    pub fn signon_url(&self) -> String {
        format!("{}/user/signon?wc=true&remember=true", self.sync_base_url)
    }

    /// Returns the snapshot batch endpoint.
    #[must_use]
    pub fn batch_url(&self) -> String {
        format!("{}/batch/check/0", self.sync_base_url)
    }

    /// Returns the sync API completion endpoint for a task.
    #[must_use]
    pub fn sync_complete_url(&self, project_id: &str, external_id: &str) -> String {
        format!(
            "{}/project/{project_id}/task/{external_id}/complete",
            self.sync_base_url
        )
    }

    /// Returns the open API completion endpoint for a task.
    #[must_use]
    pub fn open_complete_url(&self, project_id: &str, external_id: &str) -> String {
        format!(
            "{}/project/{project_id}/task/{external_id}/complete",
            self.open_base_url
        )
    }

    /// Returns the user agent sent with sync API requests.
    #[must_use]
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// Returns the `X-Device` header payload.
    #[must_use]
    pub fn x_device(&self) -> &str {
        &self.x_device
    }

    /// Returns the display name given to the inbox pseudo-project.
    #[must_use]
    pub fn inbox_name(&self) -> &str {
        &self.inbox_name
    }

    /// Returns the static sync token, if configured.
    #[must_use]
    pub fn static_token(&self) -> Option<&str> {
        self.static_token.as_deref()
    }

    /// Returns the sign-on username, if configured.
    #[must_use]
    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    /// Returns the sign-on password, if configured.
    #[must_use]
    pub fn password(&self) -> Option<&str> {
        self.password.as_deref()
    }

    /// Returns the OAuth access token for the open API, if configured.
    #[must_use]
    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    /// Returns the retry attempt ceiling.
    #[must_use]
    pub const fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Returns the base delay between retry attempts.
    #[must_use]
    pub const fn retry_delay(&self) -> Duration {
        self.retry_delay
    }
}

/// Reads an environment variable, treating unset and blank the same way.
fn env_setting(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}

fn default_x_device() -> String {
    json!({
        "platform": "web",
        "version": 6430,
        "id": Uuid::new_v4().simple().to_string(),
    })
    .to_string()
}
