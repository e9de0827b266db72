pub mod client;
pub mod error;

pub use client::{GitHubClient, ListingResponse, RepositoryLister};
pub use error::FetchError;
