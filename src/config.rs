// src/config.rs

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::{env, fs, net::IpAddr, path::Path};

use crate::fetch::DataSource;

/// Header names accepted as the key column, checked in this order.
pub const DEFAULT_KEY_CANDIDATES: &[&str] = &["template", "template id", "template_id", "id"];
pub const DEFAULT_KEY_TOKEN: &str = "template";
pub const DEFAULT_ID_TOKEN: &str = "id";
/// Last column of the "Template Details" section.
pub const DEFAULT_SECTION_BOUNDARY: &str = "OUT_CHN";
/// Last column of the left half of "Template Details".
pub const DEFAULT_SUB_BOUNDARY: &str = "HPX Shutdown";
pub const DEFAULT_PRIMARY_LABEL: &str = "Template Details";
pub const DEFAULT_SECONDARY_LABEL: &str = "Cloud Details";

/// Domain configuration for the lookup pipeline. Built-in defaults, optionally
/// overridden from YAML. Never read from the environment by the core.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LookupConfig {
    pub key: KeyConfig,
    pub grouping: GroupingConfig,
}

/// Key-column detection settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyConfig {
    pub candidates: Vec<String>,
    pub key_token: String,
    pub id_token: String,
}

impl Default for KeyConfig {
    fn default() -> Self {
        Self {
            candidates: DEFAULT_KEY_CANDIDATES.iter().map(|s| s.to_string()).collect(),
            key_token: DEFAULT_KEY_TOKEN.to_string(),
            id_token: DEFAULT_ID_TOKEN.to_string(),
        }
    }
}

/// Display grouping settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupingConfig {
    /// Header that closes the primary section.
    pub section_boundary: String,
    /// Header that closes the first half of the primary section. `None` keeps
    /// the primary section in one group.
    pub sub_boundary: Option<String>,
    pub primary_label: String,
    pub secondary_label: String,
}

impl Default for GroupingConfig {
    fn default() -> Self {
        Self {
            section_boundary: DEFAULT_SECTION_BOUNDARY.to_string(),
            sub_boundary: Some(DEFAULT_SUB_BOUNDARY.to_string()),
            primary_label: DEFAULT_PRIMARY_LABEL.to_string(),
            secondary_label: DEFAULT_SECONDARY_LABEL.to_string(),
        }
    }
}

impl LookupConfig {
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        serde_yaml::from_str(text).context("parsing lookup config YAML")
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading lookup config {:?}", path))?;
        Self::from_yaml_str(&text).with_context(|| format!("in {:?}", path))
    }
}

/// Process settings for the HTTP binary.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub source: DataSource,
    pub bind: IpAddr,
    pub port: u16,
    pub lookup: LookupConfig,
}

impl AppConfig {
    pub const DEFAULT_SOURCE: &'static str = "templates.csv";
    pub const DEFAULT_PORT: u16 = 8000;

    /// Read `TEMPLATES_CSV`, `PORT`, `BIND_ADDR` and `LOOKUP_CONFIG` from the environment.
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Same as [`AppConfig::from_env`] over an arbitrary variable lookup.
    pub fn from_vars<F>(var: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let source_str = var("TEMPLATES_CSV").unwrap_or_else(|| Self::DEFAULT_SOURCE.to_string());
        let source: DataSource = source_str
            .parse()
            .with_context(|| format!("invalid TEMPLATES_CSV {:?}", source_str))?;

        let port = match var("PORT") {
            Some(p) => p
                .trim()
                .parse::<u16>()
                .map_err(|e| anyhow!("invalid PORT {:?}: {}", p, e))?,
            None => Self::DEFAULT_PORT,
        };

        let bind = match var("BIND_ADDR") {
            Some(a) => a
                .trim()
                .parse::<IpAddr>()
                .map_err(|e| anyhow!("invalid BIND_ADDR {:?}: {}", a, e))?,
            None => IpAddr::from([127, 0, 0, 1]),
        };

        let lookup = match var("LOOKUP_CONFIG").filter(|p| !p.trim().is_empty()) {
            Some(path) => LookupConfig::from_yaml_file(path.trim())?,
            None => LookupConfig::default(),
        };

        Ok(Self {
            source,
            bind,
            port,
            lookup,
        })
    }
}
