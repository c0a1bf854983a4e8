//! Authentication module for managing the login session.
//!
//! This module provides:
//! - `Credential`: the access/refresh/sid token triple
//! - `Session`: persisted session state plus lifecycle event notifications
//!
//! The session survives restarts via a `session.json` file; the API client
//! reads the access token from here on every request it sends.

pub mod session;

pub use session::{Credential, Session, SessionEvent};
