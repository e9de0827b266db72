use std::future::Future;

use anyhow::{Context, Result};
use octocrab::Octocrab;
use serde::Serialize;
use tokio::time::Duration;
use tracing::{debug, info, warn};

use crate::github::error::FetchError;
use crate::types::{AccountName, RepositorySet};

/// Public GitHub REST API
pub const DEFAULT_BASE_URI: &str = "https://api.github.com";

/// The listing endpoint caps a single page at 100 items
pub const LISTING_PER_PAGE: u8 = 100;

/// Sort order requested from the listing endpoint
pub const LISTING_SORT: &str = "updated";

/// Successful answer of the listing endpoint
#[derive(Debug, Clone, PartialEq)]
pub enum ListingResponse {
    /// A JSON array of repositories
    Repositories(RepositorySet),
    /// Any other JSON value; carries no new data
    NotAList(serde_json::Value),
}

/// Source of repository listings, one request per call.
///
/// [`GitHubClient`] is the production implementation; the fetcher only
/// depends on this trait so polling can run against any source.
pub trait RepositoryLister: Send + Sync + 'static {
    fn list_repositories(
        &self,
        account: &AccountName,
    ) -> impl Future<Output = std::result::Result<ListingResponse, FetchError>> + Send;
}

#[derive(Debug, Serialize)]
struct ListingParams {
    sort: &'static str,
    per_page: u8,
}

#[derive(Clone)]
pub struct GitHubClient {
    pub(crate) client: octocrab::Octocrab,
}

impl GitHubClient {
    /// Build an unauthenticated client against `base_uri`.
    ///
    /// Without `timeout` the transport defaults apply.
    pub fn new(base_uri: &str, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = Octocrab::builder()
            .base_uri(base_uri)
            .with_context(|| format!("Invalid GitHub API base URI: {}", base_uri))?;

        if let Some(timeout_duration) = timeout {
            let connection_timeout = if timeout_duration < Duration::from_secs(10) {
                std::cmp::max(timeout_duration, Duration::from_secs(1))
            } else {
                Duration::from_secs(30)
            };

            let read_write_timeout = std::cmp::max(timeout_duration, Duration::from_secs(1));

            builder = builder
                .set_connect_timeout(Some(connection_timeout))
                .set_read_timeout(Some(read_write_timeout))
                .set_write_timeout(Some(read_write_timeout));
        }

        let client = builder.build().context("Failed to build GitHub client")?;

        Ok(Self { client })
    }

    /// Fetches one page of an account's public repositories, most recently
    /// updated first.
    ///
    /// Issues `GET /users/{account}/repos?sort=updated&per_page=100` without
    /// authentication.
    ///
    /// # Returns
    ///
    /// - [`ListingResponse::Repositories`] when the body is a JSON array whose
    ///   elements all decode as repositories
    /// - [`ListingResponse::NotAList`] when the body is valid JSON of any other
    ///   shape
    ///
    /// # Errors
    ///
    /// Error statuses, transport failures, non-JSON bodies and array elements
    /// that are not repositories are returned as a classified [`FetchError`].
    pub async fn list_user_repositories(
        &self,
        account: &AccountName,
    ) -> std::result::Result<ListingResponse, FetchError> {
        let route = format!("/users/{}/repos", urlencoding::encode(account.as_str()));
        let params = ListingParams {
            sort: LISTING_SORT,
            per_page: LISTING_PER_PAGE,
        };

        let start_time = std::time::Instant::now();
        let body: serde_json::Value = self
            .client
            .get(&route, Some(&params))
            .await
            .map_err(FetchError::from_octocrab_error)?;
        debug!("Listing request for {} took {:?}", account, start_time.elapsed());

        match body {
            serde_json::Value::Array(_) => {
                let repositories: RepositorySet = serde_json::from_value(body).map_err(|e| {
                    FetchError::Parse(format!("Failed to decode repository list: {}", e))
                })?;
                info!(
                    "Fetched {} repositories for {}",
                    repositories.len(),
                    account
                );
                Ok(ListingResponse::Repositories(repositories))
            }
            other => {
                warn!("Listing response for {} is not a list", account);
                Ok(ListingResponse::NotAList(other))
            }
        }
    }
}

impl RepositoryLister for GitHubClient {
    async fn list_repositories(
        &self,
        account: &AccountName,
    ) -> std::result::Result<ListingResponse, FetchError> {
        self.list_user_repositories(account).await
    }
}
