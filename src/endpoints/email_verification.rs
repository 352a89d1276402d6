use super::{AuthError, EndpointError, Request, Transport};
use crate::{messages, Credentials, User};
use serde_derive::{Deserialize, Serialize};

/// Confirm an email address using the token from a verification link.
///
/// When the server also issues [`Credentials`], hand them to
/// [`crate::SessionManager::adopt_credentials()`] to log the user in.
pub async fn verify_email<T>(
    transport: &T,
    token: &str,
) -> Result<EmailVerified, AuthError>
where
    T: Transport + ?Sized,
{
    let token = token.trim();
    if token.is_empty() {
        return Err(AuthError::rejected(messages::MISSING_VERIFICATION_TOKEN));
    }

    let token = match super::path_segment(token) {
        Some(token) => token,
        None => {
            log::warn!("Refusing to verify with a malformed token");
            return Err(AuthError::rejected(messages::EMAIL_VERIFICATION_FAILED));
        },
    };

    let request = Request::get(format!("api/auth/verify-email/{}", token));
    let response = transport.request(request).await?;
    let doc: VerifyEmailResponse =
        response.json().map_err(EndpointError::from)?;

    if !response.is_success() {
        let message = doc
            .message
            .unwrap_or_else(|| messages::EMAIL_VERIFICATION_FAILED.to_string());
        log::warn!("Email verification failed: {}", message);
        return Err(AuthError::Rejected { message });
    }

    let credentials = match (doc.token, doc.user) {
        (Some(token), Some(user)) => Some(Credentials { token, user }),
        _ => None,
    };

    Ok(EmailVerified {
        message: doc.message,
        credentials,
    })
}

/// Ask the server to send another verification email.
pub async fn resend_verification<T>(
    transport: &T,
    email: &str,
) -> Result<Option<String>, AuthError>
where
    T: Transport + ?Sized,
{
    let request = Request::post("api/auth/resend-verification")
        .json(&EmailData { email })
        .map_err(EndpointError::from)?;
    let response = transport.request(request).await?;
    let reply = super::optional_reply(&response)?;

    if response.is_success() {
        log::info!("Sent another verification email to {}", email);
        Ok(reply.message)
    } else {
        Err(AuthError::rejected(reply.message.unwrap_or_else(|| {
            messages::RESEND_VERIFICATION_FAILED.to_string()
        })))
    }
}

/// The user's email address has been confirmed.
#[derive(Debug, Clone, PartialEq)]
pub struct EmailVerified {
    pub message: Option<String>,
    /// Credentials for an immediate login, if the server issued any.
    pub credentials: Option<Credentials>,
}

#[derive(Debug, Copy, Clone, Serialize)]
pub(super) struct EmailData<'a> {
    pub(super) email: &'a str,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
struct VerifyEmailResponse {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    user: Option<User>,
}
