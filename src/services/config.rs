//! Gallery configuration
//!
//! All settings have built-in defaults; the CLI may override them with flags.
//! Nothing is read from files or persisted.

use anyhow::{Context, Result, ensure};
use tokio::time::Duration;
use url::Url;

use crate::github::GitHubClient;
use crate::github::client::DEFAULT_BASE_URI;
use crate::services::deploy::{DEFAULT_PAGES_DOMAIN, DeployOverride, DeployUrlResolver};
use crate::services::fetch::RepositoryFetcher;
use crate::types::AccountName;

/// Account whose repositories are shown by default
pub const DEFAULT_ACCOUNT: &str = "ARrow0809";

/// Default time between listing requests
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Debug, Clone)]
pub struct GalleryConfig {
    pub account: AccountName,
    pub base_uri: Url,
    pub refresh_interval: Duration,
    /// `None` keeps the HTTP transport defaults
    pub request_timeout: Option<Duration>,
    pub deploy_override: Option<DeployOverride>,
    pub pages_domain: String,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            account: AccountName::from(DEFAULT_ACCOUNT),
            base_uri: Url::parse(DEFAULT_BASE_URI).expect("default base URI is a valid URL"),
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
            request_timeout: None,
            deploy_override: Some(DeployOverride::default()),
            pages_domain: DEFAULT_PAGES_DOMAIN.to_string(),
        }
    }
}

impl GalleryConfig {
    pub fn with_account<T: Into<String>>(mut self, account: T) -> Self {
        self.account = AccountName::new(account);
        self
    }

    pub fn with_base_uri(mut self, base_uri: &str) -> Result<Self> {
        self.base_uri =
            Url::parse(base_uri).with_context(|| format!("Invalid base URI: {}", base_uri))?;
        Ok(self)
    }

    pub fn with_refresh_interval(mut self, refresh_interval: Duration) -> Self {
        self.refresh_interval = refresh_interval;
        self
    }

    pub fn with_request_timeout(mut self, request_timeout: Option<Duration>) -> Self {
        self.request_timeout = request_timeout;
        self
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(
            !self.account.as_str().trim().is_empty(),
            "Account name must not be empty"
        );
        ensure!(
            matches!(self.base_uri.scheme(), "http" | "https"),
            "Base URI must use http or https: {}",
            self.base_uri
        );
        ensure!(
            !self.refresh_interval.is_zero(),
            "Refresh interval must be greater than zero"
        );
        Ok(())
    }

    pub fn client(&self) -> Result<GitHubClient> {
        GitHubClient::new(
            self.base_uri.as_str().trim_end_matches('/'),
            self.request_timeout,
        )
    }

    pub fn fetcher(&self) -> Result<RepositoryFetcher<GitHubClient>> {
        self.validate()?;
        Ok(RepositoryFetcher::new(self.client()?, self.account.clone()))
    }

    pub fn deploy_resolver(&self) -> DeployUrlResolver {
        DeployUrlResolver::new(self.account.clone())
            .with_override(self.deploy_override.clone())
            .with_pages_domain(self.pages_domain.clone())
    }
}
