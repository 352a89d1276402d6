use super::{AuthError, EndpointError, Request, Transport};
use crate::{messages, User};

/// Fetch the latest profile for whoever owns `token`.
pub async fn profile<T>(transport: &T, token: &str) -> Result<User, AuthError>
where
    T: Transport + ?Sized,
{
    let request = Request::get("api/auth/profile").bearer(token);
    let response = transport.request(request).await?;

    if !response.is_success() {
        log::warn!("Fetching the profile failed with {}", response.status);
        return Err(AuthError::rejected(messages::PROFILE_REFRESH_FAILED));
    }

    response.json().map_err(|e| EndpointError::from(e).into())
}
