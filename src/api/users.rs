//! User administration (`/users`) and newsletters (`/newsletter`)

use crate::api::client::{to_body, ApiClient};
use crate::api::models::{Newsletter, Page, User};
use crate::error::Result;
use serde::Serialize;
use serde_json::json;

pub struct UsersApi<'a> {
    client: &'a ApiClient,
}

pub struct NewsletterApi<'a> {
    client: &'a ApiClient,
}

impl ApiClient {
    pub fn users(&self) -> UsersApi<'_> {
        UsersApi { client: self }
    }

    pub fn newsletter(&self) -> NewsletterApi<'_> {
        NewsletterApi { client: self }
    }
}

impl UsersApi<'_> {
    pub async fn list(&self, page: Page) -> Result<Vec<User>> {
        self.client.get_with("/users", page.query()).await
    }

    pub async fn get(&self, id: &str) -> Result<User> {
        self.client.get(&format!("/users/{}", id)).await
    }

    pub async fn update<B: Serialize + ?Sized>(
        &self,
        id: &str,
        data: &B,
    ) -> Result<serde_json::Value> {
        self.client.put(&format!("/users/{}", id), data).await
    }

    pub async fn delete(&self, id: &str) -> Result<serde_json::Value> {
        self.client.delete(&format!("/users/{}", id)).await
    }

    pub async fn assign_role(&self, user_id: &str, role_id: &str) -> Result<serde_json::Value> {
        let body = Some(json!({ "role_id": role_id }));
        self.client
            .post(&format!("/users/{}/roles", user_id), body)
            .await
    }

    pub async fn remove_role(&self, user_id: &str, role_id: &str) -> Result<serde_json::Value> {
        self.client
            .delete(&format!("/users/{}/roles/{}", user_id, role_id))
            .await
    }
}

impl NewsletterApi<'_> {
    pub async fn list(&self, page: Page) -> Result<Vec<Newsletter>> {
        self.client.get_with("/newsletter", page.query()).await
    }

    pub async fn get(&self, id: &str) -> Result<Newsletter> {
        self.client.get(&format!("/newsletter/{}", id)).await
    }

    pub async fn create<B: Serialize + ?Sized>(&self, data: &B) -> Result<serde_json::Value> {
        self.client.post("/newsletter", to_body(data)?).await
    }

    pub async fn update<B: Serialize + ?Sized>(
        &self,
        id: &str,
        data: &B,
    ) -> Result<serde_json::Value> {
        self.client.put(&format!("/newsletter/{}", id), data).await
    }

    pub async fn delete(&self, id: &str) -> Result<serde_json::Value> {
        self.client.delete(&format!("/newsletter/{}", id)).await
    }

    /// Queue the newsletter for delivery
    pub async fn send(&self, id: &str) -> Result<serde_json::Value> {
        log::info!("Sending newsletter {}", id);
        self.client
            .post(&format!("/newsletter/{}/send", id), None)
            .await
    }
}
