pub mod config;
pub mod deploy;
pub mod fetch;
pub mod transform;

pub use config::GalleryConfig;
pub use deploy::{DeployOverride, DeployUrlResolver};
pub use fetch::{GallerySnapshot, PollerHandle, RefreshOutcome, RepositoryFetcher};
