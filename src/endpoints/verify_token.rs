use super::{EndpointError, Request, Transport};

/// Ask the server whether a bearer token is still valid.
pub async fn verify_token<T>(
    transport: &T,
    token: &str,
) -> Result<bool, EndpointError>
where
    T: Transport + ?Sized,
{
    let request = Request::get("api/auth/verify-token").bearer(token);
    let response = transport.request(request).await?;

    log::debug!("Token verification returned {}", response.status);

    Ok(response.is_success())
}
