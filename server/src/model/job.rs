use serde::{Deserialize, Serialize};

use super::{
    market::{Bid, Review},
    profile::{Client, ServiceProvider},
};
use crate::util::{DocumentId, Timestamp};

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    Pending,
    Accepted,
    Rejected,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    #[default]
    JobPosted,
    BidAccepted,
    JobStarted,
    Ban,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StatusChange {
    PostingTime,
    AcceptanceTime,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq)]
#[serde(default)]
pub struct GpsCoordinate {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Point {
    #[serde(rename = "_id", alias = "id", skip_serializing_if = "Option::is_none")]
    pub id: Option<DocumentId>,

    pub title: String,
    pub address: String,
    pub gps: Vec<GpsCoordinate>,
    pub contact_person: String,
    pub contact_person_phone_number: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct QuestionAnswer {
    #[serde(rename = "_id", alias = "id", skip_serializing_if = "Option::is_none")]
    pub id: Option<DocumentId>,

    pub questions: Vec<String>,
    pub answers: Vec<String>,
    pub service_provider_details: ServiceProvider,
}

/// A posted job. Client, provider and bids are embedded copies, not
/// references.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Job {
    #[serde(rename = "_id", alias = "id", skip_serializing_if = "Option::is_none")]
    pub id: Option<DocumentId>,

    pub title: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub posted: Option<Timestamp>,

    pub budget: String,
    pub description: String,
    pub clients: Client,
    pub service_providers: ServiceProvider,
    pub status: Status,
    pub job_status: JobStatus,
    pub status_change: Vec<StatusChange>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub point: Vec<Point>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub question_answer: Vec<QuestionAnswer>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub bid: Vec<Bid>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub review: Option<Review>,
}

#[cfg(test)]
mod tests {
    use super::{Job, JobStatus, Status, StatusChange};

    #[test]
    fn test_job_enums_on_the_wire() {
        let job: Job = serde_json::from_value(serde_json::json!({
            "title": "Fix the sink",
            "budget": "500",
            "status": "accepted",
            "jobStatus": "bid_accepted",
            "statusChange": ["posting_time", "acceptance_time"],
            "bid": [{ "description": "cheap", "bidAmount": 450 }]
        }))
        .unwrap();

        assert_eq!(job.status, Status::Accepted);
        assert_eq!(job.job_status, JobStatus::BidAccepted);
        assert_eq!(
            job.status_change,
            vec![StatusChange::PostingTime, StatusChange::AcceptanceTime]
        );
        assert_eq!(job.bid.len(), 1);
        assert!(job.review.is_none());

        let out = serde_json::to_value(&job).unwrap();
        assert_eq!(out["jobStatus"], "bid_accepted");
        assert!(out.get("point").is_none());
        assert!(out.get("review").is_none());
    }
}
