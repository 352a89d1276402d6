//! The Clea API's endpoints.

mod email_verification;
mod login;
mod password;
mod profile;
mod register;
pub mod resources;
mod transport;
mod verify_token;

#[cfg(test)]
pub(crate) mod mock;

pub use email_verification::{resend_verification, verify_email, EmailVerified};
pub use login::{login, LoginGranted};
pub use password::{forgot_password, reset_password};
pub use profile::profile;
pub use register::{register, Registered, Registration};
pub use transport::{HttpTransport, Method, Request, Response, Transport};
pub use verify_token::verify_token;

use crate::messages;
use serde_derive::Deserialize;

/// Typical endpoint errors.
#[derive(Debug, thiserror::Error)]
pub enum EndpointError {
    /// The HTTP client encountered an error.
    #[error("Unable to send the request")]
    HttpClient(#[from] reqwest::Error),
    #[error("Unable to reach the server")]
    Connection(#[from] std::io::Error),
    #[error("Invalid URL")]
    BadUrl(#[from] url::ParseError),
    /// The server sent back something that wasn't the JSON we expected.
    #[error("Unable to parse the response")]
    ResponseParse(#[from] serde_json::Error),
}

/// The ways an account-related request can fail.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The server rejected the request, e.g. because of a bad password.
    #[error("{message}")]
    Rejected { message: String },
    /// The account exists, but its email address hasn't been confirmed yet.
    #[error(transparent)]
    NeedsVerification(#[from] VerificationRequired),
    /// We couldn't talk to the server.
    #[error("{}", messages::CONNECTION_ERROR)]
    Transport(#[from] EndpointError),
}

impl AuthError {
    pub(crate) fn rejected<S: Into<String>>(message: S) -> Self {
        AuthError::Rejected {
            message: message.into(),
        }
    }

    /// The message to show the user.
    pub fn message(&self) -> &str {
        match self {
            AuthError::Rejected { message } => message,
            AuthError::NeedsVerification(v) => &v.message,
            AuthError::Transport(_) => messages::CONNECTION_ERROR,
        }
    }

    pub fn verification_required(&self) -> Option<&VerificationRequired> {
        match self {
            AuthError::NeedsVerification(v) => Some(v),
            _ => None,
        }
    }
}

/// The user needs to click the link in their verification email before
/// they can log in.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{message}")]
pub struct VerificationRequired {
    /// The address a new verification email can be sent to.
    pub email: String,
    pub message: String,
}

/// The parts of an error response we care about.
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Reply {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    requires_verification: Option<bool>,
    #[serde(default)]
    email: Option<String>,
}

fn interpret_rejection(reply: Reply, submitted_email: &str) -> AuthError {
    let Reply {
        message,
        requires_verification,
        email,
    } = reply;
    let message = message.unwrap_or_else(|| messages::GENERIC_ERROR.to_string());

    if requires_verification.unwrap_or(false) {
        let email = email.unwrap_or_else(|| submitted_email.to_string());
        return AuthError::NeedsVerification(VerificationRequired {
            email,
            message,
        });
    }

    AuthError::Rejected { message }
}

/// Turn caller-supplied text into a single URL path segment.
///
/// Returns `None` for anything that would resolve to a different path
/// (`""`, `"."` and `".."`).
fn path_segment(raw: &str) -> Option<String> {
    match raw {
        "" | "." | ".." => None,
        _ => Some(urlencoding::encode(raw).into_owned()),
    }
}

/// Read a JSON reply which may be missing entirely (e.g. a `204 No Content`).
fn optional_reply(response: &Response) -> Result<Reply, EndpointError> {
    if response.body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Reply::default());
    }

    response.json().map_err(EndpointError::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verification_flag_wins_over_plain_rejection() {
        let reply = Reply {
            message: Some(String::from("Potwierdź email")),
            requires_verification: Some(true),
            email: None,
        };

        let got = interpret_rejection(reply, "a@b.com");

        let v = got.verification_required().unwrap();
        assert_eq!(v.email, "a@b.com");
        assert_eq!(got.message(), "Potwierdź email");
    }

    #[test]
    fn rejection_without_a_message_gets_a_fallback() {
        let got = interpret_rejection(Reply::default(), "a@b.com");

        assert!(matches!(got, AuthError::Rejected { .. }));
        assert_eq!(got.message(), messages::GENERIC_ERROR);
    }

    #[test]
    fn path_segments_are_escaped() {
        assert_eq!(path_segment("abc-123").as_deref(), Some("abc-123"));
        assert_eq!(path_segment("a?b").as_deref(), Some("a%3Fb"));
        assert_eq!(path_segment("../admin").as_deref(), Some("..%2Fadmin"));
        assert_eq!(path_segment("x#y z").as_deref(), Some("x%23y%20z"));

        for dots in &["", ".", ".."] {
            assert_eq!(path_segment(dots), None);
        }
    }

    #[test]
    fn transport_failures_use_the_generic_message() {
        let inner = std::io::Error::new(
            std::io::ErrorKind::ConnectionRefused,
            "refused",
        );
        let got = AuthError::from(EndpointError::from(inner));

        assert_eq!(got.message(), messages::CONNECTION_ERROR);
        assert_eq!(got.to_string(), messages::CONNECTION_ERROR);
    }
}
