use super::{AuthError, EndpointError, Request, Transport};
use crate::{Credentials, User};
use serde_derive::{Deserialize, Serialize};

/// Authenticate with the Clea server and get a new set of [`Credentials`].
pub async fn login<T>(
    transport: &T,
    email: &str,
    password: &str,
) -> Result<LoginGranted, AuthError>
where
    T: Transport + ?Sized,
{
    let data = Data { email, password };
    let request = Request::post("api/auth/login")
        .json(&data)
        .map_err(EndpointError::from)?;

    let response = transport.request(request).await?;

    if !response.is_success() {
        let reply = super::optional_reply(&response)?;
        let err = super::interpret_rejection(reply, email);
        log::warn!("Login failed for {}: {}", email, err);
        return Err(err);
    }

    let doc: LoginResponse = response.json().map_err(EndpointError::from)?;
    log::info!("Logged in as {}", doc.user.email);

    Ok(LoginGranted {
        credentials: Credentials {
            token: doc.token,
            user: doc.user,
        },
        message: doc.message,
    })
}

/// A successful login.
#[derive(Debug, Clone, PartialEq)]
pub struct LoginGranted {
    pub credentials: Credentials,
    pub message: Option<String>,
}

#[derive(Debug, Copy, Clone, Serialize)]
struct Data<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
struct LoginResponse {
    token: String,
    user: User,
    #[serde(default)]
    message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endpoints::{mock::MockTransport, Method};
    use serde_json::json;

    #[tokio::test]
    async fn happy_login() {
        let transport = MockTransport::new().reply(
            200,
            json!({
                "message": "Zalogowano",
                "token": "T2",
                "user": { "id": "u2", "firstName": "A", "email": "a@b.com" },
            }),
        );

        let got = login(&transport, "a@b.com", "pw").await.unwrap();

        assert_eq!(got.credentials.token, "T2");
        assert_eq!(got.credentials.user.id, "u2");
        assert_eq!(got.message.as_deref(), Some("Zalogowano"));
        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method, Method::Post);
        assert_eq!(requests[0].path, "api/auth/login");
        assert_eq!(
            requests[0].body,
            Some(json!({ "email": "a@b.com", "password": "pw" }))
        );
        assert_eq!(requests[0].bearer, None);
    }

    #[tokio::test]
    async fn bad_password_is_rejected() {
        let transport = MockTransport::new()
            .reply(401, json!({ "message": "Nieprawidłowe hasło" }));

        let got = login(&transport, "a@b.com", "nope").await.unwrap_err();

        match got {
            AuthError::Rejected { message } => {
                assert_eq!(message, "Nieprawidłowe hasło")
            },
            other => panic!("Unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn html_error_page_is_a_transport_failure() {
        let transport =
            MockTransport::new().reply_raw(502, "<html>Bad Gateway</html>");

        let got = login(&transport, "a@b.com", "pw").await.unwrap_err();

        assert!(matches!(
            got,
            AuthError::Transport(EndpointError::ResponseParse(_))
        ));
    }
}
