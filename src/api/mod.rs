//! REST API client module for the Questify backend.
//!
//! This module provides the `ApiClient` for authenticating and managing
//! quest cards, plus the `ApiError` taxonomy its callers classify errors
//! with.
//!
//! The backend uses short-lived JWT bearer tokens; expired tokens are
//! renewed transparently inside `dispatch` (see `refresh`).

pub mod client;
pub mod error;
mod refresh;

pub use client::{ApiClient, ApiRequest, DEFAULT_BASE_URL};
pub use error::ApiError;
