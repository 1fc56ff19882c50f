// src/fetch/mod.rs

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Local};
use reqwest::{header::LAST_MODIFIED, Client};
use std::{
    fmt, io,
    path::{Path, PathBuf},
    str::FromStr,
};
use tokio::fs;
use tracing::{debug, info};
use url::Url;

use crate::process::parse_csv_bytes;
use crate::schema::Dataset;

/// Where the CSV lives: a local file or an http(s) URL (e.g. a published sheet export).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    File(PathBuf),
    Url(Url),
}

impl FromStr for DataSource {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(anyhow!("empty data source"));
        }
        let lower = s.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            let url = Url::parse(s).with_context(|| format!("parsing URL {:?}", s))?;
            Ok(DataSource::Url(url))
        } else {
            Ok(DataSource::File(PathBuf::from(s)))
        }
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::File(p) => write!(f, "{}", p.display()),
            DataSource::Url(u) => write!(f, "{}", u),
        }
    }
}

impl DataSource {
    /// Short name for display: the file name, or the last URL path segment.
    pub fn display_name(&self) -> String {
        match self {
            DataSource::File(p) => p
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| p.display().to_string()),
            DataSource::Url(u) => u
                .path_segments()
                .and_then(|mut segments| segments.next_back())
                .filter(|name| !name.is_empty())
                .map(str::to_string)
                .unwrap_or_else(|| u.host_str().unwrap_or("remote").to_string()),
        }
    }

    /// Read the whole source and parse it into a fresh [`Snapshot`].
    #[tracing::instrument(level = "debug", skip(self, client), fields(source = %self))]
    pub async fn load(&self, client: &Client) -> Result<Snapshot> {
        let (bytes, modified) = match self {
            DataSource::File(path) => read_file(path).await?,
            DataSource::Url(url) => download(client, url).await?,
        };
        let dataset = parse_csv_bytes(&bytes)
            .with_context(|| format!("parsing CSV from {}", self))?;
        debug!(
            headers = dataset.headers.len(),
            rows = dataset.rows.len(),
            "loaded snapshot"
        );
        Ok(Snapshot {
            dataset,
            name: self.display_name(),
            modified,
        })
    }
}

/// One read of the data source.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub dataset: Dataset,
    pub name: String,
    pub modified: Option<DateTime<Local>>,
}

impl Snapshot {
    /// `"YYYY-MM-DD HH:MM"` local time, or `"—"` when unknown.
    pub fn updated_label(&self) -> String {
        self.modified
            .map(|ts| ts.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "—".to_string())
    }
}

async fn read_file(path: &Path) -> Result<(Vec<u8>, Option<DateTime<Local>>)> {
    let bytes = fs::read(path)
        .await
        .with_context(|| format!("reading CSV {:?}", path))?;
    let modified = fs::metadata(path)
        .await
        .and_then(|m| m.modified())
        .ok()
        .map(DateTime::<Local>::from);
    Ok((bytes, modified))
}

async fn download(client: &Client, url: &Url) -> Result<(Vec<u8>, Option<DateTime<Local>>)> {
    info!(url = %url, "fetching CSV");
    let resp = client
        .get(url.as_str())
        .send()
        .await
        .with_context(|| format!("requesting {}", url))?
        .error_for_status()
        .with_context(|| format!("fetching {}", url))?;
    let modified = resp
        .headers()
        .get(LAST_MODIFIED)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| DateTime::parse_from_rfc2822(v).ok())
        .map(|ts| ts.with_timezone(&Local));
    let bytes = resp
        .bytes()
        .await
        .with_context(|| format!("reading body of {}", url))?;
    Ok((bytes.to_vec(), modified))
}

/// True when the error chain bottoms out in a missing file.
pub fn is_not_found(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        cause
            .downcast_ref::<io::Error>()
            .map_or(false, |e| e.kind() == io::ErrorKind::NotFound)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_source() -> Result<()> {
        assert_eq!(
            "data/templates.csv".parse::<DataSource>()?,
            DataSource::File(PathBuf::from("data/templates.csv"))
        );
        let src: DataSource = " HTTPS://example.com/export/sheet.csv ".parse()?;
        assert!(matches!(src, DataSource::Url(_)));
        assert_eq!(src.display_name(), "sheet.csv");
        assert!("   ".parse::<DataSource>().is_err());
        assert!("http://".parse::<DataSource>().is_err());
        Ok(())
    }

    #[test]
    fn test_display_name() -> Result<()> {
        let src: DataSource = "/srv/data/templates.csv".parse()?;
        assert_eq!(src.display_name(), "templates.csv");
        let src: DataSource = "https://example.com/".parse()?;
        assert_eq!(src.display_name(), "example.com");
        Ok(())
    }

    #[tokio::test]
    async fn test_load_file() -> Result<()> {
        let mut tmp = NamedTempFile::new()?;
        write!(tmp, "\u{feff}Template ID,Notes\nT-1,first\nT-2,second\n")?;

        let src = DataSource::File(tmp.path().to_path_buf());
        let snap = src.load(&Client::new()).await?;
        assert_eq!(snap.dataset.headers, vec!["Template ID", "Notes"]);
        assert_eq!(snap.dataset.rows.len(), 2);
        assert!(snap.modified.is_some());
        assert_ne!(snap.updated_label(), "—");
        Ok(())
    }

    #[tokio::test]
    async fn test_missing_file_is_not_found() {
        let src = DataSource::File(PathBuf::from("/nonexistent/dir/templates.csv"));
        let err = src.load(&Client::new()).await.unwrap_err();
        assert!(is_not_found(&err));
    }

    #[test]
    fn test_other_errors_are_not_not_found() {
        assert!(!is_not_found(&anyhow!("boom")));
    }
}
