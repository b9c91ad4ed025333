//! Step tracking for participants

use crate::api::client::ApiClient;
use crate::api::models::{FundsDistribution, ParticipantDashboard, Registration, TotalSteps};
use crate::error::Result;
use serde_json::json;

pub struct StepsApi<'a> {
    client: &'a ApiClient,
}

impl ApiClient {
    pub fn steps(&self) -> StepsApi<'_> {
        StepsApi { client: self }
    }
}

impl StepsApi<'_> {
    /// Add `steps` to a participant's count; returns the updated registration
    pub async fn update_steps(&self, participant_id: &str, steps: i64) -> Result<Registration> {
        let body = Some(json!({ "steps": steps }));
        self.client
            .post(&format!("/steps/{}", participant_id), body)
            .await
    }

    pub async fn participant_dashboard(&self, participant_id: &str) -> Result<ParticipantDashboard> {
        self.client
            .get(&format!("/participant/{}/dashboard", participant_id))
            .await
    }

    pub async fn total_steps(&self) -> Result<TotalSteps> {
        self.client.get("/total-steps").await
    }

    pub async fn funds_distribution(&self) -> Result<FundsDistribution> {
        self.client.get("/funds-distribution").await
    }
}
