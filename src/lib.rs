/// Output formatting utilities for Markdown and JSON representations of the gallery
pub mod formatter;

/// GitHub REST client for the public repository listing
pub mod github;

/// Fetcher, view transform, deploy URL resolution and configuration
pub mod services;

/// Core type definitions and domain models used throughout the library
pub mod types;
