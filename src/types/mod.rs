//! Core type definitions
//!
//! Repository records as delivered by the listing endpoint, and the view
//! selection / grouped presentation types derived from them.

pub mod repository;
pub mod view;

pub use repository::*;
pub use view::*;
