//! Entity schemas stored in the marketplace database.

use std::{fmt, str::FromStr};

use bson::oid::ObjectId;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::error::Error;

pub mod job;
pub mod market;
pub mod profile;
pub mod user;

pub use job::{GpsCoordinate, Job, JobStatus, Point, QuestionAnswer, Status, StatusChange};
pub use market::{Bid, Payment, Review};
pub use profile::{Balance, Client, Education, RoleProfile, ServiceProvider};
pub use user::{User, UserType};

/// Every collection the gateway serves. Doubles as the allowlist for
/// clearing a collection.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum CollectionName {
    Review,
    Bid,
    Payment,
    User,
    Client,
    ServiceProvider,
    Job,
    Point,
    QuestionAnswer,
}

impl CollectionName {
    pub const ALL: [CollectionName; 9] = [
        Self::Review,
        Self::Bid,
        Self::Payment,
        Self::User,
        Self::Client,
        Self::ServiceProvider,
        Self::Job,
        Self::Point,
        Self::QuestionAnswer,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Review => "review",
            Self::Bid => "bid",
            Self::Payment => "payment",
            Self::User => "user",
            Self::Client => "client",
            Self::ServiceProvider => "serviceProvider",
            Self::Job => "job",
            Self::Point => "point",
            Self::QuestionAnswer => "questionAnswer",
        }
    }
}

impl fmt::Display for CollectionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CollectionName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|it| it.as_str() == s)
            .ok_or_else(|| Error::UnknownCollection(s.to_string()))
    }
}

/// Capability of carrying a database assigned identifier.
pub trait Identifiable {
    fn id(&self) -> Option<ObjectId>;

    fn assign_id(&mut self, id: ObjectId);
}

/// An entity stored in its own collection.
pub trait Resource:
    Identifiable + Serialize + DeserializeOwned + Send + Sync + Unpin + 'static
{
    const COLLECTION: CollectionName;
}

macro_rules! impl_resource {
    ($($ty:ty => $collection:ident),+ $(,)?) => {
        $(
            impl $crate::model::Identifiable for $ty {
                fn id(&self) -> Option<::bson::oid::ObjectId> {
                    self.id.map(Into::into)
                }

                fn assign_id(&mut self, id: ::bson::oid::ObjectId) {
                    self.id = Some(id.into());
                }
            }

            impl $crate::model::Resource for $ty {
                const COLLECTION: $crate::model::CollectionName =
                    $crate::model::CollectionName::$collection;
            }
        )+
    };
}

impl_resource! {
    User => User,
    Client => Client,
    ServiceProvider => ServiceProvider,
    Job => Job,
    Bid => Bid,
    Review => Review,
    Payment => Payment,
    Point => Point,
    QuestionAnswer => QuestionAnswer,
}
