use std::{collections::HashMap, str::FromStr};

use axum::{
    extract::{FromRequestParts, Path, Query},
    http::request::Parts,
};
use bson::oid::ObjectId;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use time::OffsetDateTime;

use crate::error::Error;

pub fn parse_object_id(id: &str) -> Result<ObjectId, Error> {
    ObjectId::from_str(id).map_err(|err| Error::InvalidId(err.to_string()))
}

/// Document identifier.
///
/// Stored as a native ObjectId, written as a hex string to human readable
/// formats such as JSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DocumentId(pub ObjectId);

impl DocumentId {
    pub fn to_hex(&self) -> String {
        self.0.to_hex()
    }
}

impl From<ObjectId> for DocumentId {
    fn from(value: ObjectId) -> Self {
        Self(value)
    }
}

impl From<DocumentId> for ObjectId {
    fn from(value: DocumentId) -> Self {
        value.0
    }
}

impl From<DocumentId> for bson::Bson {
    fn from(value: DocumentId) -> Self {
        value.0.into()
    }
}

impl std::ops::Deref for DocumentId {
    type Target = ObjectId;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl std::fmt::Display for DocumentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl PartialEq<ObjectId> for DocumentId {
    fn eq(&self, other: &ObjectId) -> bool {
        self.0 == *other
    }
}

impl Serialize for DocumentId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if serializer.is_human_readable() {
            serializer.serialize_str(&self.0.to_hex())
        } else {
            self.0.serialize(serializer)
        }
    }
}

impl<'de> Deserialize<'de> for DocumentId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        if deserializer.is_human_readable() {
            let s = String::deserialize(deserializer)?;
            s.parse().map(Self).map_err(serde::de::Error::custom)
        } else {
            ObjectId::deserialize(deserializer).map(Self)
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Timestamp(#[serde(with = "time::serde::rfc3339")] pub OffsetDateTime);

#[derive(Deserialize)]
struct IdQuery {
    id: Option<String>,
}

/// Raw hex identifier. An `id` query parameter wins over the `:id` path
/// segment, so `/bid/{_id}?id=<hex>` style links keep working.
#[derive(Debug, Clone)]
pub struct IdParam(pub String);

#[axum::async_trait]
impl<S> FromRequestParts<S> for IdParam
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let from_path = Path::<HashMap<String, String>>::from_request_parts(parts, state)
            .await
            .ok()
            .and_then(|Path(mut params)| params.remove("id"));

        let from_query = Query::<IdQuery>::from_request_parts(parts, state)
            .await
            .ok()
            .and_then(|Query(query)| query.id);

        from_query
            .filter(|id| !id.is_empty())
            .or(from_path)
            .filter(|id| !id.is_empty())
            .map(Self)
            .ok_or(Error::MissingParameter("id"))
    }
}
