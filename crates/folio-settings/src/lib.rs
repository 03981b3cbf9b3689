//! # folio-settings
//!
//! Configuration for the folio dashboard, loaded from three layers (in
//! priority order):
//! 1. **Compiled defaults**: [`FolioSettings::default()`]
//! 2. **Settings file**: `~/.folio/settings.json` by default, merged per key
//!    over the defaults; a missing file is not an error
//! 3. **Environment variables**: `FOLIO_*`, with `__` separating nested keys
//!    (`FOLIO_SERVER__PORT=8080`, `FOLIO_GENERATOR__MAX_DELTA=25`)
//!
//! The merged result is validated before it is returned.

#![deny(unsafe_code)]

pub mod errors;
pub mod loader;
pub mod types;

pub use errors::{Result, SettingsError};
pub use loader::{ENV_PREFIX, figment, load_settings_from_path, settings_path};
pub use types::{AuthSettings, FolioSettings, GeneratorSettings, LoggingSettings, ServerSettings};
