use super::{AuthError, EndpointError, Request, Transport};
use serde_derive::{Deserialize, Serialize};

/// Create a new staff account.
///
/// This never logs the user in. The server emails them a verification link
/// and the account only becomes usable once [`super::verify_email()`] has
/// been called with the token from that link.
pub async fn register<T>(
    transport: &T,
    registration: &Registration,
) -> Result<Registered, AuthError>
where
    T: Transport + ?Sized,
{
    let request = Request::post("api/auth/register")
        .json(registration)
        .map_err(EndpointError::from)?;

    let response = transport.request(request).await?;

    if !response.is_success() {
        let reply = super::optional_reply(&response)?;
        let err = super::interpret_rejection(reply, &registration.email);
        log::warn!("Registration failed for {}: {}", registration.email, err);
        return Err(err);
    }

    let doc: RegisterResponse = response.json().map_err(EndpointError::from)?;
    log::info!("Registered {}", registration.email);

    Ok(Registered {
        message: doc.message,
        requires_verification: doc.requires_verification.unwrap_or(false),
        email: doc.email,
    })
}

/// The details needed to create an account.
#[derive(Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for Registration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registration")
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// The server accepted a [`Registration`].
#[derive(Debug, Clone, PartialEq)]
pub struct Registered {
    pub message: Option<String>,
    /// Does the user need to confirm their email address before logging in?
    pub requires_verification: bool,
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RegisterResponse {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    requires_verification: Option<bool>,
    #[serde(default)]
    email: Option<String>,
}
