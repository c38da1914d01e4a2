use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{user::User, Resource, UserType};
use crate::util::DocumentId;

/// A role specific profile wrapping the user it was created for. The profile
/// document shares its `_id` with the user document.
pub trait RoleProfile: Resource {
    const ROLE: UserType;

    fn user(&self) -> &User;

    fn user_mut(&mut self) -> &mut User;
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Client {
    #[serde(rename = "_id", alias = "id", skip_serializing_if = "Option::is_none")]
    pub id: Option<DocumentId>,

    pub user: User,
    pub location: String,
}

impl RoleProfile for Client {
    const ROLE: UserType = UserType::Client;

    fn user(&self) -> &User {
        &self.user
    }

    fn user_mut(&mut self) -> &mut User {
        &mut self.user
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ServiceProvider {
    #[serde(rename = "_id", alias = "id", skip_serializing_if = "Option::is_none")]
    pub id: Option<DocumentId>,

    pub user: User,
    pub skill: String,
    pub location: String,
    pub education: Education,

    #[serde(rename = "verifiedByporichoy")]
    pub verified_by_porichoy: bool,

    pub balance: Balance,
}

impl RoleProfile for ServiceProvider {
    const ROLE: UserType = UserType::ServiceProvider;

    fn user(&self) -> &User {
        &self.user
    }

    fn user_mut(&mut self) -> &mut User {
        &mut self.user
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Education {
    pub level: String,
    pub institute: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Balance {
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::ServiceProvider;
    use crate::model::UserType;

    #[test]
    fn test_service_provider_wire_format() {
        let json = serde_json::json!({
            "user": { "name": "Provider", "userType": "serviceProvider" },
            "skill": "plumbing",
            "education": { "level": "hsc", "institute": "Dhaka College" },
            "verifiedByporichoy": true,
            "balance": { "amount": 12.5 }
        });

        let provider: ServiceProvider = serde_json::from_value(json).unwrap();
        assert_eq!(provider.user.user_type, UserType::ServiceProvider);
        assert!(provider.verified_by_porichoy);
        assert_eq!(provider.balance.amount, Decimal::new(125, 1));
        assert_eq!(provider.location, "");

        let out = serde_json::to_value(&provider).unwrap();
        assert_eq!(out["balance"]["amount"], 12.5);
        assert!(out.get("_id").is_none());
    }
}
