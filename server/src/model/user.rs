use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::util::DocumentId;

static PHONE_NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^0[0-9]{10}$").unwrap());
static NID: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]{13}$").unwrap());

#[derive(Serialize, Deserialize, Validate, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct User {
    #[serde(rename = "_id", alias = "id", skip_serializing_if = "Option::is_none")]
    pub id: Option<DocumentId>,

    pub user_id: i64,

    #[validate(length(min = 1))]
    pub name: String,

    #[validate(custom = "validate_phone_number")]
    pub phone_number: String,

    #[validate(custom = "validate_nid")]
    pub nid: String,

    pub birthdate: String,
    pub father_name: String,
    pub mother_name: String,
    pub user_type: UserType,
}

impl User {
    /// Stored keys of a user, used to route partial updates of a profile.
    pub const FIELDS: [&'static str; 8] = [
        "userId",
        "name",
        "phoneNumber",
        "nid",
        "birthdate",
        "fatherName",
        "motherName",
        "userType",
    ];
}

fn validate_phone_number(phone_number: &str) -> Result<(), ValidationError> {
    if phone_number.is_empty() || PHONE_NUMBER.is_match(phone_number) {
        Ok(())
    } else {
        Err(ValidationError::new("phone_number"))
    }
}

fn validate_nid(nid: &str) -> Result<(), ValidationError> {
    if nid.is_empty() || NID.is_match(nid) {
        Ok(())
    } else {
        Err(ValidationError::new("nid"))
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum UserType {
    #[default]
    Client,
    ServiceProvider,
}

impl UserType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Client => "client",
            Self::ServiceProvider => "serviceProvider",
        }
    }
}

impl fmt::Display for UserType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
