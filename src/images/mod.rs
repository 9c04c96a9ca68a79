//! Image paths - maps exercise image references to loadable paths
//!
//! References in the catalog and in stored workouts were written by hand
//! over several revisions, so they come in every shape: bare file names,
//! category subpaths, site-root paths, full URLs, stray `%20`s and spaces.
//! [`Resolver::resolve`] turns any of them into one canonical path for the
//! current [`Deployment`]; [`fallback`] takes over when that path fails to load.

pub mod fallback;

pub use fallback::{FallbackChain, ImageHandle, ImageProbe, LocalAssetProbe, Recovery, recover};

/// Hosts that serve the app under a `/<repo>/` path prefix
pub const PATH_PREFIXED_HOST_SUFFIX: &str = ".github.io";

/// Exercise images, relative to the deployment root
pub const IMAGE_DIR: &str = "assets/img";
/// Top-level assets directory, relative to the deployment root
pub const ASSETS_DIR: &str = "assets";
pub const PLACEHOLDER_FILE: &str = "assets/default-exercise.gif";
/// Directory under [`IMAGE_DIR`] tried when the category folder lacks the file
pub const FALLBACK_CATEGORY: &str = "geral";
pub const DEFAULT_EXTENSION: &str = "gif";

const IMAGE_EXTENSIONS: &[&str] = &["gif", "png", "jpg", "jpeg", "webp", "svg"];
const QUALIFIED_PREFIXES: &[&str] = &["http://", "https://", "data:", "blob:", "//"];

/// Where the app is served from
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Deployment {
    prefix: Option<String>,
}

impl Deployment {
    /// Served from the site root
    pub fn local() -> Self {
        Self::default()
    }

    /// Served under `/<prefix>/`
    pub fn prefixed(prefix: &str) -> Self {
        let prefix = prefix.trim_matches('/');
        Self {
            prefix: (!prefix.is_empty()).then(|| prefix.to_string()),
        }
    }

    /// Detect from the page host name and path (`user.github.io` + `/repo/index.html` -> `/repo/`)
    pub fn detect(host: &str, page_path: &str) -> Self {
        if !host.to_lowercase().ends_with(PATH_PREFIXED_HOST_SUFFIX) {
            return Self::local();
        }
        match page_path.split('/').find(|s| !s.is_empty()) {
            // a first segment with a dot is a file at the root ("/index.html")
            Some(segment) if !segment.contains('.') => Self::prefixed(segment),
            _ => Self::local(),
        }
    }

    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    /// Root path with trailing separator: `/` or `/<prefix>/`
    pub fn root(&self) -> String {
        match &self.prefix {
            Some(prefix) => format!("/{}/", prefix),
            None => "/".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Resolver {
    deployment: Deployment,
}

impl Resolver {
    pub fn new(deployment: Deployment) -> Self {
        Self { deployment }
    }

    pub fn deployment(&self) -> &Deployment {
        &self.deployment
    }

    /// Directory relative references are joined to, with trailing separator
    pub fn base_dir(&self) -> String {
        format!("{}{}/", self.deployment.root(), IMAGE_DIR)
    }

    pub fn placeholder(&self) -> String {
        format!("{}{}", self.deployment.root(), PLACEHOLDER_FILE)
    }

    /// Canonical path for a raw image reference. Never empty.
    pub fn resolve(&self, raw: Option<&str>) -> String {
        let Some(raw) = raw.map(str::trim).filter(|r| !r.is_empty()) else {
            return self.placeholder();
        };
        if is_fully_qualified(raw) {
            return raw.to_string();
        }

        let site_rooted = raw.starts_with('/') || raw.starts_with('\\');
        let mut relative = normalize(raw);
        if relative.is_empty() {
            return self.placeholder();
        }
        if !has_image_extension(&relative) {
            relative.push('.');
            relative.push_str(DEFAULT_EXTENSION);
        }

        if site_rooted && let Some(path) = self.rerooted(&relative) {
            return path;
        }
        format!("{}{}", self.base_dir(), relative)
    }

    /// Site-root references that already point into the assets tree keep their place in it
    fn rerooted(&self, relative: &str) -> Option<String> {
        let assets = format!("{}/", ASSETS_DIR);
        // `relative` is case-folded; the root keeps the deployment's own case
        if let Some(prefix) = self.deployment.prefix() {
            let marker = format!("{}/", prefix.to_lowercase());
            if let Some(rest) = relative.strip_prefix(&marker)
                && rest.starts_with(&assets)
            {
                return Some(format!("{}{}", self.deployment.root(), rest));
            }
        }
        relative
            .starts_with(&assets)
            .then(|| format!("{}{}", self.deployment.root(), relative))
    }

    /// Ordered candidates to try after `failed` did not load, without repeats
    pub fn fallback_candidates(&self, failed: &str) -> Vec<String> {
        let steps = [
            case_variant(failed),
            Some(self.strip_deployment_prefix(failed)),
            bare_filename(failed).map(|name| format!("{}{}/{}", self.base_dir(), FALLBACK_CATEGORY, name)),
            Some(self.placeholder()),
        ];

        let mut candidates: Vec<String> = Vec::with_capacity(steps.len());
        for candidate in steps.into_iter().flatten() {
            if candidate != failed && !candidates.contains(&candidate) {
                candidates.push(candidate);
            }
        }
        candidates
    }

    /// Root-relative form of `path` with the deployment prefix removed
    fn strip_deployment_prefix(&self, path: &str) -> String {
        let path = match url::Url::parse(path) {
            Ok(url) if url.has_host() => url.path().to_string(),
            _ => path.to_string(),
        };
        match self.deployment.prefix() {
            Some(prefix) => {
                let marker = format!("/{}/", prefix);
                match path.strip_prefix(&marker) {
                    Some(rest) => format!("/{}", rest),
                    None => path,
                }
            }
            None => path,
        }
    }
}

/// Absolute URL or inline data, used as-is
pub fn is_fully_qualified(raw: &str) -> bool {
    let lower = raw.to_lowercase();
    QUALIFIED_PREFIXES.iter().any(|p| lower.starts_with(p))
}

/// Decode `%20` style escapes, turn whitespace runs into hyphens, unify and
/// collapse separators, case-fold. The result has no leading separator.
pub fn normalize(raw: &str) -> String {
    let decoded = urlencoding::decode(raw)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| raw.to_string());
    let hyphenated = decoded.split_whitespace().collect::<Vec<_>>().join("-");
    let unified = hyphenated.replace('\\', "/").to_lowercase();
    unified
        .split('/')
        .filter(|s| !s.is_empty() && *s != ".")
        .collect::<Vec<_>>()
        .join("/")
}

pub fn has_image_extension(path: &str) -> bool {
    let name = path.rsplit('/').next().unwrap_or(path);
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => {
            IMAGE_EXTENSIONS.iter().any(|e| e.eq_ignore_ascii_case(ext))
        }
        _ => false,
    }
}

/// Lowercased path when it has uppercase letters, otherwise the path with an
/// uppercase extension (assets exported as `.GIF`)
fn case_variant(path: &str) -> Option<String> {
    let lower = path.to_lowercase();
    if lower.starts_with("data:") {
        return None;
    }
    if lower != path {
        return Some(lower);
    }
    let name_start = path.rfind('/').map_or(0, |i| i + 1);
    let dot = path[name_start..].rfind('.')? + name_start;
    Some(format!("{}{}", &path[..dot], path[dot..].to_uppercase()))
}

/// Last path segment without query or fragment, lowercased, with an image extension
fn bare_filename(path: &str) -> Option<String> {
    if path.to_lowercase().starts_with("data:") {
        return None;
    }
    let path = path.split(['?', '#']).next().unwrap_or(path);
    let name = path.rsplit('/').next().filter(|n| !n.is_empty())?;
    let mut name = name.to_lowercase();
    if !has_image_extension(&name) {
        name.push('.');
        name.push_str(DEFAULT_EXTENSION);
    }
    Some(name)
}
