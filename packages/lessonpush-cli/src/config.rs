use anyhow::{Context, Result};
use lessonpush_core::PushConfig;
use std::path::PathBuf;

const DEFAULT_STORE: &str = ".lessonpush/store.json";

/// Builds the push config from the environment; `.env` is loaded by the caller.
pub(crate) fn push_config_from_env(server_override: Option<String>) -> Result<PushConfig> {
    let mut config = PushConfig::default();

    if let Some(server) = server_override.or_else(|| std::env::var("LESSONPUSH_SERVER_URL").ok()) {
        config.server_url = server;
    }
    if let Ok(platform) = std::env::var("LESSONPUSH_PLATFORM") {
        config.platform = platform;
    }
    if let Ok(timeout_text) = std::env::var("LESSONPUSH_TOKEN_TIMEOUT_MS") {
        config.token_fetch_timeout_ms = parse_timeout_ms(&timeout_text)?;
    }

    Ok(config)
}

fn parse_timeout_ms(text: &str) -> Result<u64> {
    text.trim()
        .parse()
        .with_context(|| format!("invalid LESSONPUSH_TOKEN_TIMEOUT_MS: {text}"))
}

pub(crate) fn store_path(store_override: Option<PathBuf>) -> PathBuf {
    store_override
        .or_else(|| std::env::var("LESSONPUSH_STORE").ok().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_STORE))
}
