//! Dataset provider and image location resolution
//!
//! The dataset is a JSON file on disk or behind an `http(s)://` URL. Image
//! references inside it are relative to wherever the dataset came from.

use crate::domain::{Dataset, ImageRef};
use crate::error::{ArchflashError, Result};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

const FETCH_TIMEOUT: Duration = Duration::from_secs(15);

/// Where the dataset JSON lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatasetSource {
    File(PathBuf),
    Url(String),
}

impl DatasetSource {
    pub fn is_remote(&self) -> bool {
        matches!(self, DatasetSource::Url(_))
    }
}

impl FromStr for DatasetSource {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim();
        Ok(if is_http_url(s) {
            DatasetSource::Url(s.to_string())
        } else {
            DatasetSource::File(PathBuf::from(s))
        })
    }
}

impl fmt::Display for DatasetSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatasetSource::File(path) => write!(f, "{}", path.display()),
            DatasetSource::Url(url) => f.write_str(url),
        }
    }
}

fn is_http_url(s: &str) -> bool {
    let lower = s.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// `v=<millis>` query parameter that defeats HTTP caches for one process run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheBuster(i64);

impl CacheBuster {
    /// Stamps the current time; call once at startup
    pub fn now() -> Self {
        Self(chrono::Utc::now().timestamp_millis())
    }

    pub fn fixed(version: i64) -> Self {
        Self(version)
    }

    pub fn version(&self) -> i64 {
        self.0
    }

    /// Appends the version parameter, keeping any existing query and fragment
    pub fn apply(&self, url: &str) -> String {
        let (base, fragment) = match url.find('#') {
            Some(i) => url.split_at(i),
            None => (url, ""),
        };
        let separator = if base.contains('?') { '&' } else { '?' };
        format!("{}{}v={}{}", base, separator, self.0, fragment)
    }
}

/// Parses dataset JSON text
pub fn parse_dataset(text: &str) -> Result<Dataset> {
    serde_json::from_str(text)
        .map_err(|e| ArchflashError::DatasetUnavailable(format!("invalid dataset JSON: {}", e)))
}

/// Fetches and parses the dataset. Remote URLs carry the cache buster.
///
/// # Errors
/// Any I/O, network, HTTP status or parse failure becomes
/// [`ArchflashError::DatasetUnavailable`].
pub async fn fetch_dataset(source: &DatasetSource, buster: CacheBuster) -> Result<Dataset> {
    let text = match source {
        DatasetSource::File(path) => std::fs::read_to_string(path)
            .map_err(|e| ArchflashError::DatasetUnavailable(format!("{}: {}", source, e)))?,
        DatasetSource::Url(url) => fetch_text(&buster.apply(url))
            .await
            .map_err(|e| ArchflashError::DatasetUnavailable(format!("{}: {}", source, e)))?,
    };

    let dataset = parse_dataset(&text)?;
    tracing::info!(
        %source,
        categories = dataset.categories.len(),
        images = dataset.image_count(),
        "dataset loaded"
    );
    Ok(dataset)
}

async fn fetch_text(url: &str) -> reqwest::Result<String> {
    let client = reqwest::Client::builder().timeout(FETCH_TIMEOUT).build()?;
    client.get(url).send().await?.error_for_status()?.text().await
}

/// A fetchable image: a local file or a remote URL
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ImageLocation {
    Path(PathBuf),
    Url(String),
}

impl fmt::Display for ImageLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageLocation::Path(path) => write!(f, "{}", path.display()),
            ImageLocation::Url(url) => f.write_str(url),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Base {
    Dir(PathBuf),
    /// Directory URL, always ending in `/`
    Url(String),
}

/// Turns dataset-relative [`ImageRef`]s into [`ImageLocation`]s
#[derive(Debug, Clone)]
pub struct ImageResolver {
    base: Base,
    buster: CacheBuster,
}

impl ImageResolver {
    /// Resolves against the directory of `source`
    pub fn for_source(source: &DatasetSource, buster: CacheBuster) -> Self {
        let base = match source {
            DatasetSource::File(path) => Base::Dir(
                path.parent()
                    .map(Path::to_path_buf)
                    .unwrap_or_default(),
            ),
            DatasetSource::Url(url) => Base::Url(url_directory(url)),
        };
        Self { base, buster }
    }

    /// Relative references join the dataset's base; absolute paths and
    /// absolute URLs are kept. Every remote URL gets the cache buster.
    pub fn resolve(&self, image: &ImageRef) -> ImageLocation {
        let raw = image.raw().replace('\\', "/");
        if is_http_url(&raw) {
            return ImageLocation::Url(self.buster.apply(&raw));
        }

        let mut relative = raw.as_str();
        while let Some(stripped) = relative.strip_prefix("./") {
            relative = stripped;
        }

        match &self.base {
            Base::Url(dir) => {
                let joined = match relative.strip_prefix('/') {
                    Some(rooted) => format!("{}/{}", url_origin(dir), rooted),
                    None => format!("{}{}", dir, relative),
                };
                ImageLocation::Url(self.buster.apply(&joined))
            }
            Base::Dir(dir) => {
                let path = Path::new(relative);
                if path.is_absolute() {
                    ImageLocation::Path(path.to_path_buf())
                } else {
                    ImageLocation::Path(dir.join(path))
                }
            }
        }
    }
}

fn authority_start(url: &str) -> usize {
    url.find("://").map(|i| i + 3).unwrap_or(0)
}

fn url_directory(url: &str) -> String {
    let url = match url.find(|c: char| c == '?' || c == '#') {
        Some(cut) => &url[..cut],
        None => url,
    };
    let start = authority_start(url);
    match url[start..].rfind('/') {
        Some(i) => url[..start + i + 1].to_string(),
        None => format!("{}/", url),
    }
}

fn url_origin(url: &str) -> &str {
    let start = authority_start(url);
    match url[start..].find('/') {
        Some(i) => &url[..start + i],
        None => url,
    }
}
