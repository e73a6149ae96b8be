//! # planboard-settings
//!
//! Configuration with layered sources.
//!
//! Settings are loaded from three layers (in priority order):
//! 1. **Compiled defaults**: [`PlanboardSettings::default()`]
//! 2. **User file**: `~/.planboard/settings.json` (deep-merged over defaults)
//! 3. **Environment variables**: `PLANBOARD_*` overrides (highest priority)
//!
//! Unlike a long-running server, each CLI invocation loads its own settings;
//! there is no process-global instance.

#![deny(unsafe_code)]

pub mod errors;
pub mod loader;
pub mod types;

pub use errors::{Result, SettingsError};
pub use loader::{
    apply_env_overrides, apply_overrides, deep_merge, load_settings, load_settings_from_path,
    planboard_dir, settings_path,
};
pub use types::{AuthSettings, GraphSettings, LoggingSettings, PlanboardSettings};
