use serde_derive::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A staff member's profile, as returned by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// A base64-encoded image. This can be quite large, so it is never
    /// written to the credential store.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_image_data: Option<String>,
    /// Any other fields the server sent, passed through untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl User {
    /// A copy of this profile with the avatar removed.
    pub fn without_avatar(&self) -> User {
        User {
            avatar_image_data: None,
            ..self.clone()
        }
    }

    /// The JSON document written to the credential store's `user` slot.
    pub(crate) fn to_stored_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.without_avatar())
    }
}

/// A bearer token and the user it was issued to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Credentials {
    pub token: String,
    pub user: User,
}
