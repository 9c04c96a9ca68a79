//! Runtime configuration

use std::path::PathBuf;
use std::time::Duration;

use crate::images::fallback::DEFAULT_RETRY_DELAY;
use crate::images::{Deployment, LocalAssetProbe, Resolver};

pub const DEFAULT_DB_PATH: &str = "nexttreino.db";
pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PAGE_PATH: &str = "/";
pub const DEFAULT_SITE_ROOT: &str = ".";

#[derive(Debug, Clone)]
pub struct Config {
    pub db_path: String,
    /// Where the app is served from, detected from host and page path
    pub deployment: Deployment,
    /// Directory holding the deployed site, used to check images locally
    pub site_root: PathBuf,
    pub retry_delay: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self::new(DEFAULT_DB_PATH, DEFAULT_HOST, DEFAULT_PAGE_PATH, DEFAULT_SITE_ROOT)
    }
}

impl Config {
    pub fn new(db_path: &str, host: &str, page_path: &str, site_root: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.to_string(),
            deployment: Deployment::detect(host, page_path),
            site_root: site_root.into(),
            retry_delay: DEFAULT_RETRY_DELAY,
        }
    }

    pub fn resolver(&self) -> Resolver {
        Resolver::new(self.deployment.clone())
    }

    pub fn probe(&self) -> LocalAssetProbe {
        LocalAssetProbe::new(self.site_root.clone(), self.deployment.clone())
    }
}
