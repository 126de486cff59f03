//! # launchpad-auth
//!
//! Identity side of the Launchpad backend.
//!
//! ## Modules
//!
//! - [`session`] - OIDC access tokens and sessions
//! - [`directory`] - Interface to the authoritative user directory
//! - [`error`] - Error types for directory and session operations

pub mod directory;
pub mod error;
pub mod session;

pub use directory::UserDirectory;
pub use error::{AuthError, AuthResult};
pub use session::{AccessToken, OidcSession};
