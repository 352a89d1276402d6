use super::{
    email_verification::EmailData, AuthError, EndpointError, Request,
    Transport,
};
use crate::messages;
use serde_derive::Serialize;

/// Email the user a link they can use to pick a new password.
pub async fn forgot_password<T>(
    transport: &T,
    email: &str,
) -> Result<Option<String>, AuthError>
where
    T: Transport + ?Sized,
{
    let request = Request::post("api/auth/forgot-password")
        .json(&EmailData { email })
        .map_err(EndpointError::from)?;

    send(transport, request).await
}

/// Set a new password using the token from a password reset link.
///
/// See [`crate::validation::validate_new_password()`] for the checks to run
/// before calling this.
pub async fn reset_password<T>(
    transport: &T,
    token: &str,
    new_password: &str,
) -> Result<Option<String>, AuthError>
where
    T: Transport + ?Sized,
{
    let data = ResetData {
        token,
        new_password,
    };
    let request = Request::post("api/auth/reset-password")
        .json(&data)
        .map_err(EndpointError::from)?;

    send(transport, request).await
}

async fn send<T>(
    transport: &T,
    request: Request,
) -> Result<Option<String>, AuthError>
where
    T: Transport + ?Sized,
{
    let response = transport.request(request).await?;
    let reply = super::optional_reply(&response)?;

    if response.is_success() {
        Ok(reply.message)
    } else {
        let message = reply
            .message
            .unwrap_or_else(|| messages::GENERIC_ERROR.to_string());
        Err(AuthError::Rejected { message })
    }
}

#[derive(Copy, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct ResetData<'a> {
    token: &'a str,
    new_password: &'a str,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endpoints::mock::MockTransport;
    use serde_json::json;

    #[tokio::test]
    async fn reset_sends_the_token_and_password() {
        let transport = MockTransport::new()
            .reply(200, json!({ "message": "Hasło zmienione" }));

        let got = reset_password(&transport, "R1", "s3cretpass").await.unwrap();

        assert_eq!(got.as_deref(), Some("Hasło zmienione"));
        assert_eq!(transport.requests()[0].path, "api/auth/reset-password");
        assert_eq!(
            transport.requests()[0].body,
            Some(json!({ "token": "R1", "newPassword": "s3cretpass" }))
        );
    }

    #[tokio::test]
    async fn unknown_email_is_reported_verbatim() {
        let transport = MockTransport::new()
            .reply(404, json!({ "message": "Nie znaleziono użytkownika" }));

        let got = forgot_password(&transport, "x@y.z").await.unwrap_err();

        assert_eq!(got.message(), "Nie znaleziono użytkownika");
    }

    #[tokio::test]
    async fn network_failure() {
        let transport = MockTransport::new().unreachable();

        let got = forgot_password(&transport, "x@y.z").await.unwrap_err();

        assert!(matches!(got, AuthError::Transport(_)));
        assert_eq!(got.message(), messages::CONNECTION_ERROR);
    }
}
