pub mod catalog;
pub mod client;
pub mod error;

pub use client::ApiClient;
pub use error::{ApiError, ApiResult, FALLBACK_MESSAGE};
