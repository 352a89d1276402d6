use super::EndpointError;
use crate::Config;
use async_trait::async_trait;
use reqwest::Client;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::sync::Arc;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> reqwest::Method {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

/// A single request to the Clea API.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub method: Method,
    /// The path relative to the API's base URL (e.g. `api/auth/login`).
    pub path: String,
    pub bearer: Option<String>,
    pub body: Option<Value>,
}

impl Request {
    pub fn new<P: Into<String>>(method: Method, path: P) -> Self {
        Request {
            method,
            path: path.into(),
            bearer: None,
            body: None,
        }
    }

    pub fn get<P: Into<String>>(path: P) -> Self { Request::new(Method::Get, path) }

    pub fn post<P: Into<String>>(path: P) -> Self {
        Request::new(Method::Post, path)
    }

    pub fn put<P: Into<String>>(path: P) -> Self { Request::new(Method::Put, path) }

    pub fn delete<P: Into<String>>(path: P) -> Self {
        Request::new(Method::Delete, path)
    }

    /// Authenticate the request with a bearer token.
    pub fn bearer<S: Into<String>>(self, token: S) -> Self {
        Request {
            bearer: Some(token.into()),
            ..self
        }
    }

    /// Send a JSON body.
    pub fn json<B: Serialize + ?Sized>(
        self,
        body: &B,
    ) -> Result<Self, serde_json::Error> {
        let body = serde_json::to_value(body)?;

        Ok(Request {
            body: Some(body),
            ..self
        })
    }
}

/// The server's response.
///
/// A non-2xx status is a perfectly normal response, it's up to the caller to
/// decide what it means.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub status: u16,
    pub body: Vec<u8>,
}

impl Response {
    pub fn new<B: Into<Vec<u8>>>(status: u16, body: B) -> Self {
        Response {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool { (200..300).contains(&self.status) }

    /// Parse the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }
}

/// Something which can exchange [`Request`]s and [`Response`]s with the Clea
/// API.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn request(&self, request: Request) -> Result<Response, EndpointError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn request(&self, request: Request) -> Result<Response, EndpointError> {
        (**self).request(request).await
    }
}

/// A [`Transport`] which sends requests over HTTP using [`reqwest`].
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(config: &Config) -> Result<Self, EndpointError> {
        let mut builder = Client::builder().user_agent(&config.user_agent);
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        HttpTransport::with_client(client, &config.api_url)
    }

    pub fn with_client(
        client: Client,
        base_url: &str,
    ) -> Result<Self, EndpointError> {
        // make sure the URL is usable before any requests go out
        let base_url = url::Url::parse(base_url)?;

        Ok(HttpTransport {
            client,
            base_url: base_url.as_str().trim_end_matches('/').to_string(),
        })
    }

    fn url_for(&self, path: &str) -> Result<url::Url, url::ParseError> {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        url::Url::parse(&url)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn request(&self, request: Request) -> Result<Response, EndpointError> {
        let url = self.url_for(&request.path)?;

        log::debug!("Sending a {:?} request to {}", request.method, url);
        log::trace!("Payload: {:#?}", request.body);

        let mut builder = self.client.request(request.method.into(), url);
        if let Some(token) = &request.bearer {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        log::trace!("Headers: {:#?}", response.headers());

        let body = response.bytes().await?;
        log::trace!("Response ({}): {}", status, String::from_utf8_lossy(&body));

        Ok(Response::new(status, body.to_vec()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn paths_are_joined_onto_the_base_url() {
        let transport =
            HttpTransport::with_client(Client::new(), "http://localhost:5000/")
                .unwrap();

        let got = transport.url_for("/api/auth/login").unwrap();

        assert_eq!(got.as_str(), "http://localhost:5000/api/auth/login");
    }

    #[test]
    fn reject_an_invalid_base_url() {
        let got = HttpTransport::with_client(Client::new(), "not a url");

        assert!(matches!(got, Err(EndpointError::BadUrl(_))));
    }

    #[test]
    fn build_an_authenticated_json_request() {
        let got = Request::post("api/articles")
            .bearer("T1")
            .json(&json!({ "title": "Retinol" }))
            .unwrap();

        assert_eq!(got.method, Method::Post);
        assert_eq!(got.bearer.as_deref(), Some("T1"));
        assert_eq!(got.body, Some(json!({ "title": "Retinol" })));
    }

    #[test]
    fn only_2xx_is_success() {
        assert!(Response::new(204, Vec::new()).is_success());
        assert!(!Response::new(301, Vec::new()).is_success());
        assert!(!Response::new(401, Vec::new()).is_success());
    }
}
