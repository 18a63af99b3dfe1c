//! Environment-driven configuration tests for the `TickTick` source.
//!
//! Each test scopes its `TICKTICK_*` variables with an [`EnvVarGuard`]
//! so tests stay independent of the ambient environment and of each
//! other.

mod test_helpers;

use std::time::Duration;

use rstest::rstest;
use taskmirror::sync::ports::SourceError;
use taskmirror::ticktick::TicktickConfig;
use test_helpers::EnvVarGuard;

/// Tests that an empty environment yields the builder defaults.
#[rstest]
fn empty_environment_yields_the_defaults() {
    let _guard = EnvVarGuard::ticktick(&[]);

    let config = TicktickConfig::from_env().expect("defaults should load");

    assert_eq!(
        config.batch_url(),
        "https://api.ticktick.com/api/v2/batch/check/0"
    );
    assert_eq!(config.inbox_name(), "Inbox");
    assert_eq!(config.max_attempts(), 3);
    assert_eq!(config.retry_delay(), Duration::from_millis(500));
    assert!(config.static_token().is_none());
    assert!(
        config.auth_setup_hint().is_some(),
        "missing credentials should produce a setup hint"
    );
}

/// Tests that each variable overrides its setting.
#[rstest]
fn variables_override_each_setting() {
    let _guard = EnvVarGuard::ticktick(&[
        ("TICKTICK_SYNC_BASE_URL", "https://sync.test/v2"),
        ("TICKTICK_OPEN_BASE_URL", "https://open.test/v1"),
        ("TICKTICK_SYNC_USER_AGENT", "agent under test"),
        ("TICKTICK_SYNC_X_DEVICE", "{\"platform\":\"test\"}"),
        ("TICKTICK_INBOX_NAME", "Todo"),
        ("TICKTICK_ACCESS_TOKEN", "at-token-1"),
        ("TICKTICK_MAX_ATTEMPTS", "5"),
        ("TICKTICK_RETRY_DELAY_MS", "250"),
    ]);

    let config = TicktickConfig::from_env().expect("overrides should load");

    assert_eq!(config.batch_url(), "https://sync.test/v2/batch/check/0");
    assert_eq!(
        config.open_complete_url("p", "t"),
        "https://open.test/v1/project/p/task/t/complete"
    );
    assert_eq!(config.user_agent(), "agent under test");
    assert_eq!(config.x_device(), "{\"platform\":\"test\"}");
    assert_eq!(config.inbox_name(), "Todo");
    assert_eq!(config.access_token(), Some("at-token-1"));
    assert_eq!(config.max_attempts(), 5);
    assert_eq!(config.retry_delay(), Duration::from_millis(250));
}

/// Tests that sign-on credentials from the environment satisfy the auth
/// check.
#[rstest]
fn credentials_satisfy_the_auth_check() {
    let _guard = EnvVarGuard::ticktick(&[
        ("TICKTICK_SYNC_USERNAME", "user@example.test"),
        ("TICKTICK_SYNC_PASSWORD", "pw-secret-2"),
    ]);

    let config = TicktickConfig::from_env().expect("credentials should load");

    assert!(config.auth_setup_hint().is_none());
    assert_eq!(config.username(), Some("user@example.test"));
    assert_eq!(config.password(), Some("pw-secret-2"));
}

/// Tests that a username without a password keeps the setup hint.
#[rstest]
fn username_without_password_keeps_the_hint() {
    let _guard = EnvVarGuard::ticktick(&[("TICKTICK_SYNC_USERNAME", "user@example.test")]);

    let config = TicktickConfig::from_env().expect("config should load");

    assert!(config.auth_setup_hint().is_some());
}

/// Tests that token values are trimmed and blank values ignored.
#[rstest]
fn token_values_are_trimmed_and_blank_values_ignored() {
    let _guard = EnvVarGuard::ticktick(&[
        ("TICKTICK_SYNC_TOKEN", "  st-token-1  "),
        ("TICKTICK_SYNC_USERNAME", "   "),
    ]);

    let config = TicktickConfig::from_env().expect("config should load");

    assert_eq!(config.static_token(), Some("st-token-1"));
    assert!(config.username().is_none());
    assert!(
        config.auth_setup_hint().is_none(),
        "a static token alone satisfies the auth check"
    );
}

/// Tests that a non-numeric attempt count is rejected.
#[rstest]
fn invalid_max_attempts_is_rejected() {
    let _guard = EnvVarGuard::ticktick(&[("TICKTICK_MAX_ATTEMPTS", "three")]);

    let err = TicktickConfig::from_env().expect_err("parse should fail");

    assert_eq!(
        err,
        SourceError::Unconfigured("TICKTICK_MAX_ATTEMPTS must be an unsigned integer".to_owned())
    );
}

/// Tests that a non-numeric retry delay is rejected.
#[rstest]
fn invalid_retry_delay_is_rejected() {
    let _guard = EnvVarGuard::ticktick(&[("TICKTICK_RETRY_DELAY_MS", "fast")]);

    let err = TicktickConfig::from_env().expect_err("parse should fail");

    assert_eq!(
        err,
        SourceError::Unconfigured("TICKTICK_RETRY_DELAY_MS must be an unsigned integer".to_owned())
    );
}
