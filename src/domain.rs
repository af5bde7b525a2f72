use serde::{Deserialize, Serialize};

/// One row of the user roster. Only `id` is required; the descriptive
/// columns are carried along when present.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SourceRecord {
    pub id: i64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl SourceRecord {
    pub fn new(id: i64) -> Self {
        Self {
            id,
            name: None,
            username: None,
            email: None,
        }
    }
}

/// A post as returned by the API. Field order matches the wire format and
/// the archive layout: `userId, id, title, body`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    #[serde(rename = "userId")]
    pub user_id: i64,
    pub id: i64,
    pub title: String,
    pub body: String,
}

impl Post {
    pub fn new(user_id: i64, id: i64, title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            user_id,
            id,
            title: title.into(),
            body: body.into(),
        }
    }
}
