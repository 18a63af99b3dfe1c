//! Shared environment guards for integration tests.

use std::env;
use std::ffi::OsString;
use std::sync::{Mutex, MutexGuard, OnceLock};

static ENV_MUTEX: OnceLock<Mutex<()>> = OnceLock::new();

/// Environment variables read by the `TickTick` configuration.
const TICKTICK_VARS: [&str; 11] = [
    "TICKTICK_SYNC_BASE_URL",
    "TICKTICK_OPEN_BASE_URL",
    "TICKTICK_SYNC_USER_AGENT",
    "TICKTICK_SYNC_X_DEVICE",
    "TICKTICK_INBOX_NAME",
    "TICKTICK_SYNC_TOKEN",
    "TICKTICK_SYNC_USERNAME",
    "TICKTICK_SYNC_PASSWORD",
    "TICKTICK_ACCESS_TOKEN",
    "TICKTICK_MAX_ATTEMPTS",
    "TICKTICK_RETRY_DELAY_MS",
];

/// Guard that applies a scoped environment variable update.
///
/// Construction clears every `TickTick` variable first, so each test
/// sees only the variables it sets. Previous values are restored on
/// drop.
pub struct EnvVarGuard {
    previous: Vec<(String, Option<OsString>)>,
    _lock: MutexGuard<'static, ()>,
}

impl EnvVarGuard {
    /// Sets the given `TickTick` variables for the guard lifetime.
    pub fn ticktick(changes: &[(&str, &str)]) -> Self {
        let lock = env_lock();
        let mut previous = Vec::with_capacity(TICKTICK_VARS.len() + changes.len());

        for key in TICKTICK_VARS {
            previous.push((key.to_owned(), env::var_os(key)));
            unsafe {
                // SAFETY: the global mutex serializes environment mutations in tests.
                env::remove_var(key);
            }
        }
        for (key, value) in changes {
            if !TICKTICK_VARS.contains(key) {
                previous.push(((*key).to_owned(), env::var_os(key)));
            }
            unsafe {
                // SAFETY: the global mutex serializes environment mutations in tests.
                env::set_var(key, value);
            }
        }

        Self {
            previous,
            _lock: lock,
        }
    }
}

impl Drop for EnvVarGuard {
    fn drop(&mut self) {
        for (key, value) in self.previous.drain(..) {
            unsafe {
                // SAFETY: the global mutex serializes environment mutations in tests.
                match value {
                    Some(previous) => env::set_var(&key, &previous),
                    None => env::remove_var(&key),
                }
            }
        }
    }
}

fn env_lock() -> MutexGuard<'static, ()> {
    ENV_MUTEX
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner)
}
