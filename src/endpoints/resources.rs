//! CRUD access to the dashboard's management domains.
//!
//! Payloads are passed through as raw JSON, interpreting them is the
//! caller's business.

use super::{EndpointError, Request, Response, Transport};
use crate::messages;
use serde_json::Value;
use std::{fmt, str::FromStr};

/// A collection of records the dashboard manages.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Resource {
    Articles,
    Products,
    Ingredients,
    TagConflicts,
}

impl Resource {
    pub const ALL: [Resource; 4] = [
        Resource::Articles,
        Resource::Products,
        Resource::Ingredients,
        Resource::TagConflicts,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Resource::Articles => "articles",
            Resource::Products => "products",
            Resource::Ingredients => "ingredients",
            Resource::TagConflicts => "tag-conflicts",
        }
    }

    fn collection(self) -> String { format!("api/{}", self.name()) }

    fn item(self, id: &str) -> Result<String, ResourceError> {
        let id = super::path_segment(id)
            .ok_or_else(|| ResourceError::BadId(id.to_string()))?;

        Ok(format!("api/{}/{}", self.name(), id))
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Resource {
    type Err = UnknownResource;

    fn from_str(s: &str) -> Result<Resource, Self::Err> {
        Resource::ALL
            .iter()
            .copied()
            .find(|r| r.name() == s)
            .ok_or_else(|| UnknownResource(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("\"{0}\" isn't one of articles, products, ingredients, or tag-conflicts")]
pub struct UnknownResource(String);

/// Possible errors when working with a [`Resource`].
#[derive(Debug, thiserror::Error)]
pub enum ResourceError {
    #[error("Unable to talk to the server")]
    Transport(#[from] EndpointError),
    #[error("The server responded with {}: {}", status, message)]
    Rejected { status: u16, message: String },
    #[error("\"{0}\" isn't a valid id")]
    BadId(String),
}

/// Fetch every record in a collection.
pub async fn list<T>(
    transport: &T,
    resource: Resource,
    bearer: Option<&str>,
) -> Result<Vec<Value>, ResourceError>
where
    T: Transport + ?Sized,
{
    let request = authenticate(Request::get(resource.collection()), bearer);
    let response = send(transport, request).await?;

    response.json().map_err(|e| EndpointError::from(e).into())
}

pub async fn get<T>(
    transport: &T,
    resource: Resource,
    id: &str,
    bearer: Option<&str>,
) -> Result<Value, ResourceError>
where
    T: Transport + ?Sized,
{
    let request = authenticate(Request::get(resource.item(id)?), bearer);
    let response = send(transport, request).await?;

    body_or_null(&response)
}

pub async fn create<T>(
    transport: &T,
    resource: Resource,
    payload: &Value,
    bearer: Option<&str>,
) -> Result<Value, ResourceError>
where
    T: Transport + ?Sized,
{
    let request = Request::post(resource.collection())
        .json(payload)
        .map_err(EndpointError::from)?;
    let response = send(transport, authenticate(request, bearer)).await?;
    log::info!("Created a new entry in {}", resource);

    body_or_null(&response)
}

pub async fn update<T>(
    transport: &T,
    resource: Resource,
    id: &str,
    payload: &Value,
    bearer: Option<&str>,
) -> Result<Value, ResourceError>
where
    T: Transport + ?Sized,
{
    let request = Request::put(resource.item(id)?)
        .json(payload)
        .map_err(EndpointError::from)?;
    let response = send(transport, authenticate(request, bearer)).await?;
    log::info!("Updated {} in {}", id, resource);

    body_or_null(&response)
}

pub async fn delete<T>(
    transport: &T,
    resource: Resource,
    id: &str,
    bearer: Option<&str>,
) -> Result<(), ResourceError>
where
    T: Transport + ?Sized,
{
    let request = authenticate(Request::delete(resource.item(id)?), bearer);
    send(transport, request).await?;
    log::info!("Deleted {} from {}", id, resource);

    Ok(())
}

/// Every tag currently used by an ingredient.
pub async fn ingredient_tags<T>(
    transport: &T,
    bearer: Option<&str>,
) -> Result<Vec<String>, ResourceError>
where
    T: Transport + ?Sized,
{
    let request = authenticate(Request::get("api/ingredients/tags"), bearer);
    let response = send(transport, request).await?;

    response.json().map_err(|e| EndpointError::from(e).into())
}

fn authenticate(request: Request, bearer: Option<&str>) -> Request {
    match bearer {
        Some(token) => request.bearer(token),
        None => request,
    }
}

async fn send<T>(
    transport: &T,
    request: Request,
) -> Result<Response, ResourceError>
where
    T: Transport + ?Sized,
{
    let response = transport.request(request).await?;

    if response.is_success() {
        return Ok(response);
    }

    let message = super::optional_reply(&response)
        .ok()
        .and_then(|reply| reply.message)
        .unwrap_or_else(|| messages::GENERIC_ERROR.to_string());
    log::warn!("Request failed with {}: {}", response.status, message);

    Err(ResourceError::Rejected {
        status: response.status,
        message,
    })
}

fn body_or_null(response: &Response) -> Result<Value, ResourceError> {
    if response.body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }

    response.json().map_err(|e| EndpointError::from(e).into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endpoints::{mock::MockTransport, Method};
    use serde_json::json;

    #[test]
    fn resource_names_round_trip() {
        for resource in Resource::ALL.iter().copied() {
            let got: Resource = resource.name().parse().unwrap();
            assert_eq!(got, resource);
        }

        assert!("users".parse::<Resource>().is_err());
    }

    #[tokio::test]
    async fn list_products() {
        let transport = MockTransport::new().reply(
            200,
            json!([{ "_id": "p1", "name": "Krem" }, { "_id": "p2" }]),
        );

        let got = list(&transport, Resource::Products, None).await.unwrap();

        assert_eq!(got.len(), 2);
        assert_eq!(got[0]["name"], json!("Krem"));
        assert_eq!(transport.requests()[0].path, "api/products");
    }

    #[tokio::test]
    async fn payloads_are_passed_through_untouched() {
        let payload = json!({
            "tag1": "retinol",
            "tag2": "vitamin-c",
            "conflictLevel": "high",
        });
        let transport = MockTransport::new().reply(200, payload.clone());

        let got = update(
            &transport,
            Resource::TagConflicts,
            "c1",
            &payload,
            Some("T1"),
        )
        .await
        .unwrap();

        assert_eq!(got, payload);
        let requests = transport.requests();
        let request = &requests[0];
        assert_eq!(request.method, Method::Put);
        assert_eq!(request.path, "api/tag-conflicts/c1");
        assert_eq!(request.body.as_ref(), Some(&payload));
        assert_eq!(request.bearer.as_deref(), Some("T1"));
    }

    #[tokio::test]
    async fn failed_delete_keeps_the_status() {
        let transport = MockTransport::new()
            .reply(403, json!({ "message": "Brak uprawnień" }));

        let got = delete(&transport, Resource::Articles, "a1", Some("T1"))
            .await
            .unwrap_err();

        match got {
            ResourceError::Rejected { status, message } => {
                assert_eq!(status, 403);
                assert_eq!(message, "Brak uprawnień");
            },
            other => panic!("Unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn ids_are_escaped_before_hitting_the_wire() {
        let transport = MockTransport::new()
            .reply(200, json!({ "_id": "a?b" }))
            .reply_raw(204, "");

        get(&transport, Resource::Products, "a?b", None).await.unwrap();
        delete(&transport, Resource::Articles, "x/y", Some("T1"))
            .await
            .unwrap();

        let requests = transport.requests();
        assert_eq!(requests[0].path, "api/products/a%3Fb");
        assert_eq!(requests[1].path, "api/articles/x%2Fy");
    }

    #[tokio::test]
    async fn dot_ids_are_refused_without_a_request() {
        let transport = MockTransport::new();

        for id in &["", ".", ".."] {
            let got = delete(&transport, Resource::Products, id, Some("T1"))
                .await
                .unwrap_err();
            match got {
                ResourceError::BadId(bad) => assert_eq!(bad, *id),
                other => panic!("Unexpected error: {:?}", other),
            }
        }

        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn empty_create_response_is_null() {
        let transport = MockTransport::new().reply_raw(201, "");

        let got = create(&transport, Resource::Ingredients, &json!({}), None)
            .await
            .unwrap();

        assert_eq!(got, Value::Null);
    }

    #[tokio::test]
    async fn fetch_ingredient_tags() {
        let transport =
            MockTransport::new().reply(200, json!(["retinol", "aha"]));

        let got = ingredient_tags(&transport, None).await.unwrap();

        assert_eq!(got, vec![String::from("retinol"), String::from("aha")]);
        assert_eq!(transport.requests()[0].path, "api/ingredients/tags");
    }
}
