use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::util::{DocumentId, Timestamp};

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Bid {
    #[serde(rename = "_id", alias = "id", skip_serializing_if = "Option::is_none")]
    pub id: Option<DocumentId>,

    pub description: String,

    #[serde(rename = "t_time")]
    pub time: String,

    #[serde(with = "rust_decimal::serde::float")]
    pub bid_amount: Decimal,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub posted_time: Option<Timestamp>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Review {
    #[serde(rename = "_id", alias = "id", skip_serializing_if = "Option::is_none")]
    pub id: Option<DocumentId>,

    pub review: String,
    pub timelines: f64,
    pub quality: f64,
    pub communication: f64,
    pub behavior: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Payment {
    #[serde(rename = "_id", alias = "id", skip_serializing_if = "Option::is_none")]
    pub id: Option<DocumentId>,

    #[serde(rename = "sp_id")]
    pub sp_id: String,

    #[serde(with = "rust_decimal::serde::float")]
    pub balance: Decimal,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub cashin_date: Option<Timestamp>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_job: Option<Timestamp>,
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::{Bid, Payment};

    #[test]
    fn test_bid_wire_format() {
        let bid: Bid = serde_json::from_value(serde_json::json!({
            "description": "Bid 1 description",
            "t_time": "3 days",
            "bidAmount": 100,
            "postedTime": "2024-03-01T10:30:00Z"
        }))
        .unwrap();

        assert_eq!(bid.time, "3 days");
        assert_eq!(bid.bid_amount, Decimal::from(100));
        assert!(bid.posted_time.is_some());

        let out = serde_json::to_value(&bid).unwrap();
        assert_eq!(out["t_time"], "3 days");
        assert_eq!(out["bidAmount"], 100.0);
    }

    #[test]
    fn test_payment_optional_dates() {
        let payment: Payment =
            serde_json::from_value(serde_json::json!({ "sp_id": "sp-1", "balance": 20.25 }))
                .unwrap();

        assert_eq!(payment.sp_id, "sp-1");
        assert_eq!(payment.balance, Decimal::new(2025, 2));

        let out = serde_json::to_value(&payment).unwrap();
        assert!(out.get("cashinDate").is_none());
        assert!(out.get("firstJob").is_none());
    }
}
