//! Resource models returned by the API
//!
//! Field names follow the server's JSON. Everything that the server may leave
//! out is defaulted so older or newer servers still parse.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// `limit`/`offset` paging for admin listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub limit: u32,
    pub offset: u32,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            limit: 50,
            offset: 0,
        }
    }
}

impl Page {
    pub fn new(limit: u32, offset: u32) -> Self {
        Self { limit, offset }
    }

    pub(crate) fn query(&self) -> Vec<(String, String)> {
        vec![
            ("limit".to_string(), self.limit.to_string()),
            ("offset".to_string(), self.offset.to_string()),
        ]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginUser {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub naam: String,
    #[serde(default)]
    pub rol: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub user: Option<LoginUser>,
}

/// A plain `{"message": ...}` acknowledgement
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub success: Option<bool>,
}

/// A reply sent to a contact or registration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reply {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub tekst: String,
    #[serde(default)]
    pub verzonden_op: Option<DateTime<Utc>>,
    #[serde(default)]
    pub verzonden_door: String,
    #[serde(default)]
    pub email_verzonden: bool,
}

/// A contact form submission
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub id: String,
    #[serde(default)]
    pub naam: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub bericht: String,
    /// `nieuw`, `in_behandeling`, `beantwoord` or `gesloten`
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub beantwoord: bool,
    #[serde(default)]
    pub notities: Option<String>,
    #[serde(default)]
    pub antwoorden: Vec<Reply>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// An event registration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    pub id: String,
    #[serde(default)]
    pub naam: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub telefoon: String,
    #[serde(default)]
    pub rol: String,
    #[serde(default)]
    pub afstand: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub steps: Option<u64>,
    #[serde(default)]
    pub antwoorden: Vec<Reply>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Album {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub cover_photo_id: Option<String>,
    #[serde(default)]
    pub visible: bool,
    #[serde(default)]
    pub order_number: i32,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Photo {
    pub id: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub thumbnail_url: String,
    #[serde(default)]
    pub alt_text: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub visible: bool,
    #[serde(default)]
    pub cloudinary_folder: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Query filters for the public photo listing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PhotoFilter {
    pub year: Option<i32>,
    pub title: Option<String>,
}

impl PhotoFilter {
    pub fn year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub(crate) fn query(&self) -> Vec<(String, String)> {
        let mut query = Vec::new();
        if let Some(year) = self.year.filter(|y| *y != 0) {
            query.push(("year".to_string(), year.to_string()));
        }
        if let Some(title) = self.title.as_deref().filter(|t| !t.is_empty()) {
            query.push(("title".to_string(), title.to_string()));
        }
        query
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Video {
    pub id: String,
    #[serde(default)]
    pub video_id: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub thumbnail_url: String,
    #[serde(default)]
    pub visible: bool,
    #[serde(default)]
    pub order_number: i32,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sponsor {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub logo_url: String,
    #[serde(default)]
    pub website_url: String,
    #[serde(default)]
    pub order_number: i32,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub visible: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub naam: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub rol: String,
    #[serde(default)]
    pub is_actief: bool,
    #[serde(default)]
    pub laatste_login: Option<DateTime<Utc>>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Newsletter {
    pub id: String,
    #[serde(default)]
    pub subject: String,
    /// HTML body
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub sent_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub batch_id: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantDashboard {
    #[serde(default)]
    pub steps: i64,
    #[serde(default)]
    pub route: String,
    #[serde(default, rename = "allocatedFunds")]
    pub allocated_funds: i64,
    #[serde(default)]
    pub naam: String,
    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TotalSteps {
    #[serde(default)]
    pub total_steps: i64,
}

/// Funds per route, in euros
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FundsDistribution {
    #[serde(default, rename = "totalX")]
    pub total: i64,
    #[serde(default)]
    pub routes: BTreeMap<String, i64>,
}

/// Service health; only `status` is relied on, the rest is kept verbatim
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(flatten)]
    pub details: serde_json::Map<String, serde_json::Value>,
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}
