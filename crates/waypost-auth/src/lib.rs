//! Authentication and session core for Waypost.
//!
//! This crate provides:
//! - `AuthClient`: Login, registration, and logout against the identity
//!   endpoints, plus bearer headers for authenticated requests
//! - `SessionState`: The process-wide in-memory session shared by clones
//! - `TokenStore`: The durable copy of the session under the data directory
//! - `AuthConfig`: Endpoint and data-directory configuration
//!
//! A session committed by login survives restarts: `AuthClient::new` reads
//! the token store and restores it without touching the network.

pub mod client;
pub mod config;
pub mod error;
pub mod session;
pub mod store;

pub use client::{AuthClient, LoginResponse};
pub use config::AuthConfig;
pub use error::{AuthError, AuthResult};
pub use session::{Session, SessionState};
pub use store::TokenStore;
