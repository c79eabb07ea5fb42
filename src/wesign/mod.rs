//! WeSign REST API client.
//!
//! - [`client`]: session handling and one method per upstream endpoint
//! - [`models`]: records returned by the API
//! - [`requests`]: request bodies, with the upstream's mixed casing pinned
//! - [`session`]: token storage
//! - [`error`]: error taxonomy for upstream calls

pub mod client;
pub mod error;
pub mod models;
pub mod requests;
pub mod session;

pub use client::{LoginOutcome, WeSignClient};
pub use error::{ApiError, ApiResult};
pub use session::SessionTokens;
