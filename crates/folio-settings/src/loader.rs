//! Settings loading.
//!
//! Loading flow:
//! 1. Start with compiled [`FolioSettings::default()`]
//! 2. Merge the JSON settings file over the defaults, key by key
//! 3. Merge `FOLIO_*` environment variables (highest priority)
//! 4. Validate the result

use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Json, Serialized};
use tracing::debug;

use crate::errors::Result;
use crate::types::FolioSettings;

/// Prefix for environment overrides.
pub const ENV_PREFIX: &str = "FOLIO_";

/// Resolve the path to the settings file (`~/.folio/settings.json`).
pub fn settings_path() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
    PathBuf::from(home).join(".folio").join("settings.json")
}

/// Load settings from a specific path with env var overrides.
///
/// A missing file yields defaults plus env overrides. A file with invalid
/// JSON, a value of the wrong type, or a value that fails validation is an
/// error.
pub fn load_settings_from_path(path: &Path) -> Result<FolioSettings> {
    if path.exists() {
        debug!(?path, "loading settings from file");
    } else {
        debug!(?path, "settings file not found, using defaults");
    }

    let settings: FolioSettings = figment(path).extract()?;
    settings.validate()?;
    Ok(settings)
}

/// The layered provider stack, exposed so callers can add their own layers
/// before extracting.
pub fn figment(path: &Path) -> Figment {
    Figment::from(Serialized::defaults(FolioSettings::default()))
        .merge(Json::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::SettingsError;
    use figment::Jail;

    #[test]
    fn settings_path_under_home() {
        let path = settings_path();
        assert!(path.ends_with(".folio/settings.json"));
    }

    #[test]
    fn missing_file_yields_defaults() {
        Jail::expect_with(|jail| {
            let path = jail.directory().join("absent.json");
            let settings = load_settings_from_path(&path).unwrap();
            assert_eq!(settings, FolioSettings::default());
            Ok(())
        });
    }

    #[test]
    fn file_values_override_defaults() {
        Jail::expect_with(|jail| {
            let _ = jail.create_file(
                "settings.json",
                r#"{
                    "server": { "port": 8080, "host": "0.0.0.0" },
                    "generator": { "interval_secs": 2 }
                }"#,
            )?;
            let path = jail.directory().join("settings.json");
            let settings = load_settings_from_path(&path).unwrap();
            assert_eq!(settings.server.port, 8080);
            assert_eq!(settings.server.host, "0.0.0.0");
            assert_eq!(settings.generator.interval_secs, 2);
            // untouched keys keep their defaults
            assert_eq!(settings.generator.max_delta, 50.0);
            assert_eq!(settings.auth.username, "admin");
            Ok(())
        });
    }

    #[test]
    fn env_overrides_file() {
        Jail::expect_with(|jail| {
            let _ = jail.create_file("settings.json", r#"{ "server": { "port": 8080 } }"#)?;
            jail.set_env("FOLIO_SERVER__PORT", "9090");
            jail.set_env("FOLIO_GENERATOR__MAX_DELTA", "12.5");
            jail.set_env("FOLIO_AUTH__USERNAME", "operator");
            let path = jail.directory().join("settings.json");
            let settings = load_settings_from_path(&path).unwrap();
            assert_eq!(settings.server.port, 9090);
            assert_eq!(settings.generator.max_delta, 12.5);
            assert_eq!(settings.auth.username, "operator");
            Ok(())
        });
    }

    #[test]
    fn numeric_env_values_fill_string_settings() {
        Jail::expect_with(|jail| {
            jail.set_env("FOLIO_AUTH__PASSWORD", "123456");
            jail.set_env("FOLIO_AUTH__USERNAME", "true");
            let path = jail.directory().join("absent.json");
            let settings = load_settings_from_path(&path).unwrap();
            assert_eq!(settings.auth.password, "123456");
            assert_eq!(settings.auth.username, "true");
            Ok(())
        });
    }

    #[test]
    fn invalid_json_is_an_error() {
        Jail::expect_with(|jail| {
            let _ = jail.create_file("settings.json", "{ not json")?;
            let path = jail.directory().join("settings.json");
            let err = load_settings_from_path(&path).unwrap_err();
            assert!(matches!(err, SettingsError::Load(_)));
            Ok(())
        });
    }

    #[test]
    fn wrong_type_is_an_error() {
        Jail::expect_with(|jail| {
            let _ = jail.create_file("settings.json", r#"{ "server": { "port": "http" } }"#)?;
            let path = jail.directory().join("settings.json");
            assert!(load_settings_from_path(&path).is_err());
            Ok(())
        });
    }

    #[test]
    fn loaded_values_are_validated() {
        Jail::expect_with(|jail| {
            jail.set_env("FOLIO_GENERATOR__INTERVAL_SECS", "0");
            let path = jail.directory().join("absent.json");
            let err = load_settings_from_path(&path).unwrap_err();
            assert!(matches!(err, SettingsError::InvalidValue(_)));
            Ok(())
        });
    }

    #[test]
    fn unrelated_env_vars_ignored() {
        Jail::expect_with(|jail| {
            jail.set_env("FOLIO_UNKNOWN_KEY", "whatever");
            jail.set_env("SERVER__PORT", "1");
            let path = jail.directory().join("absent.json");
            let settings = load_settings_from_path(&path).unwrap();
            assert_eq!(settings.server.port, 5000);
            Ok(())
        });
    }
}
