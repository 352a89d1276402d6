//! Session management and API client for the Clea administration dashboard.
//!
//! The [`SessionManager`] owns the staff member's authentication state,
//! reconciling credentials persisted in a [`CredentialStore`] with the
//! server, while the [`endpoints`] module exposes the individual API calls
//! used by the dashboard's screens.

#![forbid(unsafe_code)]

#[cfg(test)]
#[macro_use]
extern crate pretty_assertions;

mod config;
pub mod endpoints;
pub mod messages;
mod session;
mod store;
mod user;
pub mod validation;

pub use config::Config;
pub use endpoints::{AuthError, EndpointError, HttpTransport, Transport};
pub use session::{LoggedIn, SessionManager, SessionState};
pub use store::{CredentialStore, FileStore, MemoryStore, Slot, StoreError};
pub use user::{Credentials, User};

/// The default user agent to use when communicating with the Clea server.
pub const DEFAULT_USER_AGENT: &str =
    concat!(env!("CARGO_PKG_NAME"), "-", env!("CARGO_PKG_VERSION"));

/// The production Clea backend.
pub const DEFAULT_API_URL: &str =
    "https://clea-admin-backend-cdczc5fthtbnayc2.polandcentral-01.azurewebsites.net";
