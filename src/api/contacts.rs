//! Contact form submissions (`/contact`) and event registrations (`/aanmelding`)
//!
//! Both are inboxes with the same shape: paged listing, lookup, a status or
//! role filter, updates, deletion and replies.

use crate::api::client::ApiClient;
use crate::api::models::{Contact, Page, Registration};
use crate::error::Result;
use serde::Serialize;
use serde_json::json;

pub struct ContactsApi<'a> {
    client: &'a ApiClient,
}

pub struct RegistrationsApi<'a> {
    client: &'a ApiClient,
}

impl ApiClient {
    pub fn contacts(&self) -> ContactsApi<'_> {
        ContactsApi { client: self }
    }

    pub fn registrations(&self) -> RegistrationsApi<'_> {
        RegistrationsApi { client: self }
    }
}

impl ContactsApi<'_> {
    pub async fn list(&self, page: Page) -> Result<Vec<Contact>> {
        self.client.get_with("/contact", page.query()).await
    }

    pub async fn get(&self, id: &str) -> Result<Contact> {
        self.client.get(&format!("/contact/{}", id)).await
    }

    pub async fn filter_by_status(&self, status: &str) -> Result<Vec<Contact>> {
        self.client.get(&format!("/contact/status/{}", status)).await
    }

    pub async fn update<B: Serialize + ?Sized>(
        &self,
        id: &str,
        data: &B,
    ) -> Result<serde_json::Value> {
        self.client.put(&format!("/contact/{}", id), data).await
    }

    pub async fn delete(&self, id: &str) -> Result<serde_json::Value> {
        self.client.delete(&format!("/contact/{}", id)).await
    }

    pub async fn add_reply(&self, id: &str, message: &str) -> Result<serde_json::Value> {
        let body = Some(json!({ "bericht": message }));
        self.client
            .post(&format!("/contact/{}/antwoord", id), body)
            .await
    }
}

impl RegistrationsApi<'_> {
    pub async fn list(&self, page: Page) -> Result<Vec<Registration>> {
        self.client.get_with("/aanmelding", page.query()).await
    }

    pub async fn get(&self, id: &str) -> Result<Registration> {
        self.client.get(&format!("/aanmelding/{}", id)).await
    }

    pub async fn filter_by_role(&self, role: &str) -> Result<Vec<Registration>> {
        self.client.get(&format!("/aanmelding/rol/{}", role)).await
    }

    pub async fn update<B: Serialize + ?Sized>(
        &self,
        id: &str,
        data: &B,
    ) -> Result<serde_json::Value> {
        self.client.put(&format!("/aanmelding/{}", id), data).await
    }

    pub async fn delete(&self, id: &str) -> Result<serde_json::Value> {
        self.client.delete(&format!("/aanmelding/{}", id)).await
    }

    pub async fn add_reply(&self, id: &str, message: &str) -> Result<serde_json::Value> {
        let body = Some(json!({ "bericht": message }));
        self.client
            .post(&format!("/aanmelding/{}/antwoord", id), body)
            .await
    }
}
