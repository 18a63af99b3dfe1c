//! Session token caching for the `TickTick` sync API.

use chrono::{DateTime, TimeDelta, Utc};
use mockable::Clock;
use std::sync::{Arc, Mutex};

/// Tokens within this margin of expiry are treated as already expired, so
/// a token never goes stale mid-request.
const EXPIRY_SAFETY_SECS: i64 = 60;

/// Cached session token with its expiry deadline.
#[derive(Debug, Clone)]
struct CachedSession {
    token: String,
    expires_at: DateTime<Utc>,
}

/// Clock-driven cache for sync API session tokens.
///
/// Shared between fetch and completion flows so that one sign-on serves
/// both until the token nears expiry.
#[derive(Debug)]
pub struct SessionCache<C> {
    clock: Arc<C>,
    state: Mutex<Option<CachedSession>>,
}

impl<C: Clock> SessionCache<C> {
    /// Creates an empty cache driven by the given clock.
    #[must_use]
    pub fn new(clock: Arc<C>) -> Self {
        Self {
            clock,
            state: Mutex::new(None),
        }
    }

    /// Returns the cached token when it is still comfortably fresh.
    #[must_use]
    pub fn fresh_token(&self) -> Option<String> {
        let guard = self
            .state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        guard.as_ref().and_then(|session| {
            let remaining = session.expires_at - self.clock.utc();
            (remaining > TimeDelta::seconds(EXPIRY_SAFETY_SECS))
                .then(|| session.token.clone())
        })
    }

    /// Stores a token valid for the given lifetime from now.
    pub fn store(&self, token: impl Into<String>, lifetime: TimeDelta) {
        let session = CachedSession {
            token: token.into(),
            expires_at: self.clock.utc() + lifetime,
        };
        let mut guard = self
            .state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        *guard = Some(session);
    }
}
