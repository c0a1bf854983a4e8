//! Client library for the Questify quest-tracking API.
//!
//! Questify organizes personal tasks and challenges ("quests") into Today,
//! Tomorrow, and Done buckets. This crate handles everything between a UI
//! and the backend:
//!
//! - `api::ApiClient`: authenticated request dispatch with transparent
//!   single-flight session refresh, plus typed card and auth operations
//! - `auth::Session`: the persisted access/refresh/sid credential and
//!   session lifecycle events
//! - `models`: wire types for cards and auth responses
//! - `dashboard`: pure grouping of cards into display sections
//! - `config`: backend URL and storage locations
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use questify_client::{ApiClient, Config, Session};
//!
//! # async fn run() -> anyhow::Result<()> {
//! let config = Config::load()?;
//! let session = Arc::new(Session::new(config.session_dir()?));
//! session.restore()?;
//!
//! let client = ApiClient::with_base_url(config.base_url(), Arc::clone(&session))?;
//! if !session.is_logged_in() {
//!     client.login("mary@example.com", "hunter2").await?;
//! }
//! let cards = client.fetch_cards().await?;
//! let groups = questify_client::dashboard::group_cards(&cards, questify_client::dashboard::local_today());
//! println!("{} quests due today", groups.today.len());
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod auth;
pub mod config;
pub mod dashboard;
pub mod models;

pub use api::{ApiClient, ApiError, ApiRequest};
pub use auth::{Credential, Session, SessionEvent};
pub use config::Config;
pub use dashboard::{group_cards, DashboardGroups};
pub use models::{Card, CardKind, CardStatus, Category, Difficulty, EditCard, NewCard};
