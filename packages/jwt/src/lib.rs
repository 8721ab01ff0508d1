//! JWT announce gate for a BitTorrent tracker.
//!
//! This crate provides a tracker middleware hook that fails an announce
//! unless the client presents a valid JSON Web Token for the swarm:
//! - RS256 signatures checked against a JWK Set fetched over HTTP
//! - Standard `iss`/`aud` claims plus an `infohash` claim binding the token
//!   to one swarm
//! - Keys rotated in the background with lock-free swaps
//! - Validation failures reported to clients as one opaque error
//!
//! ```no_run
//! use std::time::Duration;
//! use tracker_jwt::{Config, Hook, JwtHook};
//!
//! # async fn example() -> Result<(), tracker_jwt::HookError> {
//! let hook = JwtHook::start(Config::new(
//!     "tracker.example",
//!     "swarm-1",
//!     "https://auth.example/.well-known/jwks.json",
//!     Duration::from_secs(300),
//! ))
//! .await?;
//!
//! // ... hook.handle_announce(&req)? on every announce ...
//!
//! hook.stop().await;
//! # Ok(())
//! # }
//! ```

pub(crate) mod algorithms;
mod config;
mod error;
mod futures;
mod hook;
pub mod jwks;
mod keystore;
mod request;
mod rotation;
mod token;
mod traits;
pub mod validator;

pub use config::{Config, DEFAULT_FETCH_TIMEOUT};
pub use error::*;
pub use futures::{StopFuture, Stopped};
pub use hook::{JwtHook, JWT_PARAM};
pub use jwks::{KeyFetcher, VerificationKey};
pub use keystore::{KeySet, KeyStore};
pub use request::{AnnounceRequest, InfoHash, Params, ScrapeRequest, INFO_HASH_LEN};
pub use rotation::{RotationScheduler, RotationState};
pub use token::{Claims, Header, Token};
pub use traits::Hook;
pub use validator::{validate, ValidationContext};
