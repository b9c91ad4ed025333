//! Typed access to the API's resources
//!
//! [`ApiClient`] issues the requests; resource groups are borrowed from it,
//! e.g. `client.contacts().list(Page::default())`.

pub mod auth;
pub mod client;
pub mod contacts;
pub mod media;
pub mod models;
pub mod steps;
pub mod users;

pub use auth::AuthApi;
pub use client::{ApiClient, UnauthorizedHook};
pub use contacts::{ContactsApi, RegistrationsApi};
pub use media::{AlbumsApi, PhotosApi, SponsorsApi, VideosApi};
pub use models::{
    Album, Contact, FundsDistribution, HealthStatus, LoginResponse, LoginUser, MessageResponse,
    Newsletter, Page, ParticipantDashboard, Photo, PhotoFilter, Registration, Reply, Sponsor,
    TotalSteps, User, Video,
};
pub use steps::StepsApi;
pub use users::{NewsletterApi, UsersApi};
