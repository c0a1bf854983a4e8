//! Data models for Questify entities.
//!
//! This module contains the wire types exchanged with the Questify backend:
//!
//! - `Card` and its enums: quest cards with difficulty, category, and status
//! - `NewCard`, `EditCard`: request payloads for card mutations
//! - Auth responses: `LoginResponse`, `RefreshResponse`, `RegisterResponse`

pub mod auth;
pub mod card;

pub use auth::{LoginResponse, RefreshResponse, RegisterResponse, UserData};
pub use card::{Card, CardKind, CardStatus, CardsResponse, Category, Difficulty, EditCard, NewCard};
