//! Settings loading with deep merge and environment variable overrides.
//!
//! Loading flow:
//! 1. Start with compiled [`PlanboardSettings::default()`]
//! 2. If `~/.planboard/settings.json` exists, deep-merge user values over defaults
//! 3. Apply environment variable overrides (highest priority)
//!
//! Deep merge rules:
//! - Objects are merged recursively (source overrides target per-key)
//! - Arrays and primitives are replaced entirely by source
//! - Null values in source are skipped (preserving target)

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::debug;

use crate::errors::Result;
use crate::types::PlanboardSettings;

/// Per-user data directory (`~/.planboard`).
pub fn planboard_dir() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
    PathBuf::from(home).join(".planboard")
}

/// Resolve the path to the settings file (`~/.planboard/settings.json`).
pub fn settings_path() -> PathBuf {
    planboard_dir().join("settings.json")
}

/// Load settings from the default path with env var overrides.
pub fn load_settings() -> Result<PlanboardSettings> {
    load_settings_from_path(&settings_path())
}

/// Load settings from a specific path with env var overrides.
///
/// If the file does not exist, returns defaults. If the file contains
/// invalid JSON, returns an error.
pub fn load_settings_from_path(path: &Path) -> Result<PlanboardSettings> {
    let defaults = serde_json::to_value(PlanboardSettings::default())?;

    let merged = if path.exists() {
        debug!(?path, "loading settings from file");
        let content = std::fs::read_to_string(path)?;
        let user: Value = serde_json::from_str(&content)?;
        deep_merge(defaults, user)
    } else {
        debug!(?path, "settings file not found, using defaults");
        defaults
    };

    let mut settings: PlanboardSettings = serde_json::from_value(merged)?;
    apply_env_overrides(&mut settings);
    Ok(settings)
}

/// Recursive deep merge of two JSON values.
pub fn deep_merge(target: Value, source: Value) -> Value {
    match (target, source) {
        (Value::Object(mut target_map), Value::Object(source_map)) => {
            for (key, source_val) in source_map {
                if source_val.is_null() {
                    continue;
                }
                let merged = if let Some(target_val) = target_map.remove(&key) {
                    deep_merge(target_val, source_val)
                } else {
                    source_val
                };
                let _ = target_map.insert(key, merged);
            }
            Value::Object(target_map)
        }
        (_, source) => source,
    }
}

/// Apply `PLANBOARD_*` environment variable overrides.
pub fn apply_env_overrides(settings: &mut PlanboardSettings) {
    apply_overrides(settings, |name| std::env::var(name).ok());
}

/// Apply overrides from an arbitrary variable lookup.
///
/// Empty values are treated as unset. Out-of-range numbers are ignored with
/// a warning (the file/default value stays in effect).
pub fn apply_overrides<F>(settings: &mut PlanboardSettings, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let read = |name: &str| lookup(name).filter(|v| !v.is_empty());

    if let Some(v) = read("PLANBOARD_CLIENT_ID") {
        settings.auth.client_id = v;
    }
    if let Some(v) = read("PLANBOARD_TENANT_ID") {
        settings.auth.tenant_id = v;
    }
    if let Some(v) = read("PLANBOARD_AUTHORITY") {
        settings.auth.authority = v;
    }
    if let Some(v) = read("PLANBOARD_GRAPH_URL") {
        settings.graph.base_url = v;
    }
    if let Some(v) = read("PLANBOARD_REQUEST_TIMEOUT_MS") {
        match parse_u64_range(&v, 1000, 600_000) {
            Some(ms) => settings.graph.request_timeout_ms = ms,
            None => {
                tracing::warn!(key = "PLANBOARD_REQUEST_TIMEOUT_MS", value = %v, "invalid u64 env var, ignoring");
            }
        }
    }
    if let Some(v) = read("PLANBOARD_LOG_LEVEL") {
        settings.logging.level = v;
    }
}

/// Parse a string as a `u64` within a range.
pub fn parse_u64_range(val: &str, min: u64, max: u64) -> Option<u64> {
    let n: u64 = val.parse().ok()?;
    (n >= min && n <= max).then_some(n)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
