use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use taxport_core::CategoryMapper;
use taxport_export::DEFAULT_COMPANY_NAME;
use taxport_import::DEFAULT_EXCLUDED_ACCOUNTS;

/// Optional user settings, read from `config.toml`.
///
/// ```toml
/// company_name = "Acme LLC"
/// excluded_accounts = ["Owner Investment / Drawings"]
///
/// [categories]
/// "Cloud Services" = "Office Expenses"
///
/// [export_codes]
/// "Cloud Services" = 278
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub company_name: Option<String>,
    pub excluded_accounts: Option<Vec<String>>,
    pub categories: BTreeMap<String, String>,
    pub export_codes: BTreeMap<String, u32>,
}

impl Config {
    pub fn parse(text: &str) -> Result<Self> {
        toml::from_str(text).context("Invalid configuration")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("In config file {}", path.display()))
    }

    /// `~/.config/taxport/config.toml` or the platform equivalent.
    pub fn default_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "taxport", "taxport")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// An explicit path must exist; the default location is optional.
    pub fn discover(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        match Self::default_path() {
            Some(path) if path.is_file() => {
                tracing::debug!(path = %path.display(), "Loading config");
                Self::load(&path)
            }
            _ => Ok(Self::default()),
        }
    }

    pub fn company_name(&self) -> &str {
        self.company_name.as_deref().unwrap_or(DEFAULT_COMPANY_NAME)
    }

    pub fn excluded_accounts(&self) -> Vec<String> {
        match &self.excluded_accounts {
            Some(accounts) => accounts.clone(),
            None => DEFAULT_EXCLUDED_ACCOUNTS.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Built-in tables with this file's entries layered on top.
    pub fn mapper(&self) -> Result<CategoryMapper> {
        CategoryMapper::builtin()
            .with_overrides(&self.categories, &self.export_codes)
            .context("Invalid [categories] entry in configuration")
    }
}
