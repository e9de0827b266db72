//! Deploy URL resolution
//!
//! A repository may have a live, published version. The link is taken from the
//! repository homepage when set, from a fixed per-name override, or from the
//! account's static pages host when pages are enabled.

use crate::types::{AccountName, Repository};

/// Repository whose deployment lives outside GitHub Pages
pub const DEFAULT_OVERRIDE_REPOSITORY: &str = "my-Portfolio";

/// Where [`DEFAULT_OVERRIDE_REPOSITORY`] is deployed
pub const DEFAULT_OVERRIDE_URL: &str = "https://service-886406686150.us-west1.run.app/";

/// Static hosting domain used for pages-enabled repositories
pub const DEFAULT_PAGES_DOMAIN: &str = "github.io";

/// A fixed deploy URL for one repository name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployOverride {
    pub repository_name: String,
    pub url: String,
}

impl Default for DeployOverride {
    fn default() -> Self {
        Self {
            repository_name: DEFAULT_OVERRIDE_REPOSITORY.to_string(),
            url: DEFAULT_OVERRIDE_URL.to_string(),
        }
    }
}

/// Resolves the optional deploy URL shown next to a repository
#[derive(Debug, Clone)]
pub struct DeployUrlResolver {
    account: AccountName,
    deploy_override: Option<DeployOverride>,
    pages_domain: String,
}

impl DeployUrlResolver {
    /// Resolver with the built-in override and pages domain
    pub fn new(account: AccountName) -> Self {
        Self {
            account,
            deploy_override: Some(DeployOverride::default()),
            pages_domain: DEFAULT_PAGES_DOMAIN.to_string(),
        }
    }

    pub fn with_override(mut self, deploy_override: Option<DeployOverride>) -> Self {
        self.deploy_override = deploy_override;
        self
    }

    pub fn with_pages_domain<T: Into<String>>(mut self, pages_domain: T) -> Self {
        self.pages_domain = pages_domain.into();
        self
    }

    /// Homepage first, then the name override, then the pages URL
    pub fn resolve(&self, repository: &Repository) -> Option<String> {
        if let Some(homepage) = repository.homepage.as_deref().filter(|h| !h.is_empty()) {
            return Some(homepage.to_string());
        }

        if let Some(deploy_override) = &self.deploy_override {
            if repository.name == deploy_override.repository_name {
                return Some(deploy_override.url.clone());
            }
        }

        if repository.has_pages {
            return Some(format!(
                "https://{}.{}/{}/",
                self.account.as_str().to_lowercase(),
                self.pages_domain,
                repository.name
            ));
        }

        None
    }
}
