use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::data::roles::RoleCatalog;
use crate::data::source::DEFAULT_TIMEOUT_SECS;

/// Workbook the dashboard reads when nothing else is configured.
pub const DEFAULT_SOURCE_URL: &str = "https://github.com/LeScott2406/SBModels/raw/refs/heads/main/Updated_Data_With_Models_and_Percentiles_Optimized_v4.xlsx";

/// Startup settings, read from the environment (a `.env` file is honoured).
///
/// | Env Var                 | Default                |
/// |-------------------------|------------------------|
/// | `SB_SOURCE_URL`         | [`DEFAULT_SOURCE_URL`] |
/// | `SB_FETCH_TIMEOUT_SECS` | `30`                   |
/// | `ROLE_CATALOG`          | built-in catalog       |
#[derive(Debug, Clone)]
pub struct Settings {
    /// URL (or local path) of the player sheet.
    pub source: String,
    pub fetch_timeout: Duration,
    /// Optional JSON role catalog replacing the built-in one.
    pub role_catalog_path: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            source: DEFAULT_SOURCE_URL.to_string(),
            fetch_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            role_catalog_path: None,
        }
    }
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let source = non_empty("SB_SOURCE_URL").unwrap_or(defaults.source);

        let fetch_timeout = match non_empty("SB_FETCH_TIMEOUT_SECS") {
            Some(raw) => Duration::from_secs(
                raw.trim()
                    .parse()
                    .with_context(|| format!("SB_FETCH_TIMEOUT_SECS must be whole seconds, got {raw:?}"))?,
            ),
            None => defaults.fetch_timeout,
        };

        let role_catalog_path = non_empty("ROLE_CATALOG").map(PathBuf::from);

        Ok(Self {
            source,
            fetch_timeout,
            role_catalog_path,
        })
    }

    /// The configured catalog, or the built-in one.
    pub fn role_catalog(&self) -> Result<RoleCatalog> {
        match &self.role_catalog_path {
            Some(path) => RoleCatalog::from_json_file(path),
            None => Ok(RoleCatalog::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn settings(vars: &[(&str, &str)]) -> Result<Settings> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Settings::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let s = settings(&[]).unwrap();
        assert_eq!(s.source, DEFAULT_SOURCE_URL);
        assert_eq!(s.fetch_timeout, Duration::from_secs(30));
        assert!(s.role_catalog_path.is_none());
        assert_eq!(s.role_catalog().unwrap(), RoleCatalog::default());
    }

    #[test]
    fn overrides_are_read() {
        let s = settings(&[
            ("SB_SOURCE_URL", "https://example.com/players.csv"),
            ("SB_FETCH_TIMEOUT_SECS", " 5 "),
            ("ROLE_CATALOG", "roles.json"),
        ])
        .unwrap();
        assert_eq!(s.source, "https://example.com/players.csv");
        assert_eq!(s.fetch_timeout, Duration::from_secs(5));
        assert_eq!(s.role_catalog_path, Some(PathBuf::from("roles.json")));
    }

    #[test]
    fn bad_timeout_is_rejected() {
        let err = settings(&[("SB_FETCH_TIMEOUT_SECS", "soon")]).unwrap_err();
        assert!(err.to_string().contains("SB_FETCH_TIMEOUT_SECS"));
    }

    #[test]
    fn missing_catalog_file_is_reported() {
        let s = settings(&[("ROLE_CATALOG", "/no/such/roles.json")]).unwrap();
        assert!(s.role_catalog().is_err());
    }
}
