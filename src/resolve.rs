//! Turning image references into readable local files.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Duration;

use tempfile::TempPath;

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

const TIMEOUT: Duration = Duration::from_secs(5);

/// A local file ready to be read. When the file was downloaded it is owned by
/// this value and removed from disk when the value drops.
#[derive(Debug)]
pub struct ResolvedImage {
    path: PathBuf,
    temp: Option<TempPath>,
}

impl ResolvedImage {
    /// A reference used as-is; nothing to clean up.
    pub fn verbatim(reference: &str) -> Self {
        Self {
            path: PathBuf::from(reference),
            temp: None,
        }
    }

    pub fn temporary(temp: TempPath) -> Self {
        Self {
            path: temp.to_path_buf(),
            temp: Some(temp),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_temporary(&self) -> bool {
        self.temp.is_some()
    }
}

/// Maps an image URL or path to a local file. Never fails: anything that cannot
/// be fetched comes back verbatim.
pub trait ImageResolver {
    fn resolve(&self, reference: &str) -> ResolvedImage;
}

/// Downloads `http`/`https` references into temp files; treats everything else
/// as a local path. The HTTP client is built on the first remote reference.
pub struct HttpImageResolver {
    client: OnceLock<Option<reqwest::blocking::Client>>,
}

impl Default for HttpImageResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpImageResolver {
    pub fn new() -> Self {
        Self {
            client: OnceLock::new(),
        }
    }

    fn client(&self) -> Option<&reqwest::blocking::Client> {
        self.client
            .get_or_init(|| {
                reqwest::blocking::Client::builder()
                    .timeout(TIMEOUT)
                    .user_agent(USER_AGENT)
                    .build()
                    .map_err(|e| log::warn!("HTTP client unavailable, remote images disabled: {e}"))
                    .ok()
            })
            .as_ref()
    }

    fn download(&self, client: &reqwest::blocking::Client, url: &str) -> Result<TempPath, String> {
        let response = client
            .get(url)
            .send()
            .map_err(|e| format!("request failed: {e}"))?;
        if !response.status().is_success() {
            return Err(format!("HTTP {}", response.status()));
        }
        let body = response
            .bytes()
            .map_err(|e| format!("reading body: {e}"))?;

        let mut file = tempfile::Builder::new()
            .prefix("mdtree.img.")
            .tempfile()
            .map_err(|e| format!("creating temp file: {e}"))?;
        file.write_all(&body)
            .map_err(|e| format!("writing temp file: {e}"))?;
        Ok(file.into_temp_path())
    }
}

/// True for references that name an `http` or `https` resource.
pub(crate) fn is_remote(reference: &str) -> bool {
    reqwest::Url::parse(reference)
        .map(|u| matches!(u.scheme(), "http" | "https"))
        .unwrap_or(false)
}

impl ImageResolver for HttpImageResolver {
    fn resolve(&self, reference: &str) -> ResolvedImage {
        if !is_remote(reference) {
            return ResolvedImage::verbatim(reference);
        }
        let Some(client) = self.client() else {
            return ResolvedImage::verbatim(reference);
        };
        let t0 = std::time::Instant::now();
        match self.download(client, reference) {
            Ok(temp) => {
                log::debug!(
                    "Fetched {reference} in {:.1}ms",
                    t0.elapsed().as_secs_f64() * 1000.0
                );
                ResolvedImage::temporary(temp)
            }
            Err(e) => {
                log::warn!("Image fetch failed for {reference}: {e}");
                ResolvedImage::verbatim(reference)
            }
        }
    }
}
