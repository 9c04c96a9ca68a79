//! Load-failure recovery for exercise images
//!
//! When an image fails to load, the candidates from
//! [`Resolver::fallback_candidates`] are probed one at a time, off screen.
//! The first one that loads replaces the image source. If none does, the
//! image is hidden and a text label derived from the file name is shown.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use super::{Deployment, Resolver, is_fully_qualified};

/// Pause between failed probes
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(100);

const PLACEHOLDER_LABEL: &str = "Exercício";

/// Loads an image somewhere it isn't shown and reports whether it worked
#[async_trait]
pub trait ImageProbe: Send + Sync {
    async fn probe(&self, src: &str) -> bool;
}

/// Probe against a directory holding the deployed site
pub struct LocalAssetProbe {
    site_root: PathBuf,
    deployment: Deployment,
}

impl LocalAssetProbe {
    pub fn new(site_root: impl Into<PathBuf>, deployment: Deployment) -> Self {
        Self {
            site_root: site_root.into(),
            deployment,
        }
    }

    /// File backing `src`, if it maps into the site directory
    fn file_for(&self, src: &str) -> Option<PathBuf> {
        let mut path = src.trim_start_matches('/');
        if let Some(prefix) = self.deployment.prefix() {
            let marker = format!("{}/", prefix);
            path = path.strip_prefix(&marker).unwrap_or(path);
        }
        if path.is_empty() || path.split('/').any(|s| s == "..") {
            return None;
        }
        Some(self.site_root.join(path))
    }
}

#[async_trait]
impl ImageProbe for LocalAssetProbe {
    async fn probe(&self, src: &str) -> bool {
        if src.to_lowercase().starts_with("data:") {
            return true;
        }
        // offline: remote images never load
        if is_fully_qualified(src) {
            return false;
        }
        let Some(file) = self.file_for(src) else {
            return false;
        };
        tokio::fs::metadata(&file)
            .await
            .map(|m| m.is_file())
            .unwrap_or(false)
    }
}

/// Displayed image element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageHandle {
    src: String,
    error_handler: bool,
    placeholder: Option<String>,
}

impl ImageHandle {
    /// Image showing `src` with the failure handler attached
    pub fn new(src: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            error_handler: true,
            placeholder: None,
        }
    }

    pub fn src(&self) -> &str {
        &self.src
    }

    pub fn has_error_handler(&self) -> bool {
        self.error_handler
    }

    /// Hidden once the text placeholder has taken its place
    pub fn is_hidden(&self) -> bool {
        self.placeholder.is_some()
    }

    pub fn placeholder(&self) -> Option<&str> {
        self.placeholder.as_deref()
    }
}

/// Ordered candidates with a cursor on the one being tried
#[derive(Debug, Clone)]
pub struct FallbackChain {
    candidates: Vec<String>,
    cursor: usize,
}

impl FallbackChain {
    pub fn new(candidates: Vec<String>) -> Self {
        Self { candidates, cursor: 0 }
    }

    pub fn candidates(&self) -> &[String] {
        &self.candidates
    }

    /// Candidate under the cursor, `None` once exhausted
    pub fn current(&self) -> Option<&str> {
        self.candidates.get(self.cursor).map(String::as_str)
    }

    /// Reject the current candidate and move to the next
    pub fn advance(&mut self) -> Option<&str> {
        if self.cursor < self.candidates.len() {
            self.cursor += 1;
        }
        self.current()
    }

    pub fn is_exhausted(&self) -> bool {
        self.cursor >= self.candidates.len()
    }

    /// Candidates tried so far, including the current one
    pub fn attempted(&self) -> &[String] {
        let end = (self.cursor + 1).min(self.candidates.len());
        &self.candidates[..end]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recovery {
    /// The handle was already recovered or given up on
    Skipped,
    /// Source replaced by a candidate that loaded
    Recovered(String),
    /// Nothing loaded; the image was hidden behind this label
    Placeholder(String),
}

/// Handle a load failure on `handle`, whose source came from `original_raw`
pub async fn recover<P: ImageProbe + ?Sized>(
    resolver: &Resolver,
    handle: &mut ImageHandle,
    original_raw: Option<&str>,
    probe: &P,
    retry_delay: Duration,
) -> Recovery {
    if !handle.error_handler {
        return Recovery::Skipped;
    }
    handle.error_handler = false;
    warn!("Failed to load image {}", handle.src);

    let mut chain = FallbackChain::new(resolver.fallback_candidates(&handle.src));
    debug!("{} fallback candidates for {}", chain.candidates().len(), handle.src);
    while let Some(candidate) = chain.current().map(str::to_string) {
        debug!("Trying fallback image {}", candidate);
        if probe.probe(&candidate).await {
            info!("Image {} replaced by {}", handle.src, candidate);
            handle.src = candidate.clone();
            return Recovery::Recovered(candidate);
        }
        chain.advance();
        if !chain.is_exhausted() {
            tokio::time::sleep(retry_delay).await;
        }
    }

    let label = placeholder_label(original_raw.unwrap_or(&handle.src));
    warn!(
        "No image available for {} after {} attempts, showing \"{}\"",
        handle.src,
        chain.attempted().len(),
        label
    );
    handle.placeholder = Some(label.clone());
    Recovery::Placeholder(label)
}

/// Readable label from an image reference ("peito/supino-reto.gif" -> "supino reto")
pub fn placeholder_label(raw: &str) -> String {
    let decoded = urlencoding::decode(raw)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| raw.to_string());
    let name = decoded
        .split(['?', '#'])
        .next()
        .unwrap_or_default()
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default();
    let stem = match name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => name,
    };
    let label = stem
        .split(|c: char| c == '-' || c == '_' || c.is_whitespace())
        .filter(|w| !w.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    if label.is_empty() {
        PLACEHOLDER_LABEL.to_string()
    } else {
        label
    }
}
