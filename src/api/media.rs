//! Public site content: albums, photos, videos and sponsors
//!
//! Each has a public listing of visible items and a paged admin listing
//! under `/admin`.

use crate::api::client::{to_body, ApiClient};
use crate::api::models::{Album, Page, Photo, PhotoFilter, Sponsor, Video};
use crate::error::Result;
use serde::Serialize;

pub struct AlbumsApi<'a> {
    client: &'a ApiClient,
}

pub struct PhotosApi<'a> {
    client: &'a ApiClient,
}

pub struct VideosApi<'a> {
    client: &'a ApiClient,
}

pub struct SponsorsApi<'a> {
    client: &'a ApiClient,
}

impl ApiClient {
    pub fn albums(&self) -> AlbumsApi<'_> {
        AlbumsApi { client: self }
    }

    pub fn photos(&self) -> PhotosApi<'_> {
        PhotosApi { client: self }
    }

    pub fn videos(&self) -> VideosApi<'_> {
        VideosApi { client: self }
    }

    pub fn sponsors(&self) -> SponsorsApi<'_> {
        SponsorsApi { client: self }
    }
}

/// Create, update and delete against one collection path
async fn create<B: Serialize + ?Sized>(
    client: &ApiClient,
    collection: &str,
    data: &B,
) -> Result<serde_json::Value> {
    client.post(collection, to_body(data)?).await
}

async fn update<B: Serialize + ?Sized>(
    client: &ApiClient,
    collection: &str,
    id: &str,
    data: &B,
) -> Result<serde_json::Value> {
    client.put(&format!("{}/{}", collection, id), data).await
}

async fn delete(client: &ApiClient, collection: &str, id: &str) -> Result<serde_json::Value> {
    client.delete(&format!("{}/{}", collection, id)).await
}

impl AlbumsApi<'_> {
    pub async fn list_public(&self) -> Result<Vec<Album>> {
        self.client.get("/albums").await
    }

    pub async fn list_all(&self, page: Page) -> Result<Vec<Album>> {
        self.client.get_with("/albums/admin", page.query()).await
    }

    pub async fn get(&self, id: &str) -> Result<Album> {
        self.client.get(&format!("/albums/{}", id)).await
    }

    pub async fn photos(&self, id: &str) -> Result<Vec<Photo>> {
        self.client.get(&format!("/albums/{}/photos", id)).await
    }

    pub async fn create<B: Serialize + ?Sized>(&self, data: &B) -> Result<serde_json::Value> {
        create(self.client, "/albums", data).await
    }

    pub async fn update<B: Serialize + ?Sized>(
        &self,
        id: &str,
        data: &B,
    ) -> Result<serde_json::Value> {
        update(self.client, "/albums", id, data).await
    }

    pub async fn delete(&self, id: &str) -> Result<serde_json::Value> {
        delete(self.client, "/albums", id).await
    }
}

impl PhotosApi<'_> {
    /// Visible photos, optionally narrowed by year and title
    pub async fn list_public(&self, filter: &PhotoFilter) -> Result<Vec<Photo>> {
        self.client.get_with("/photos", filter.query()).await
    }

    pub async fn list_all(&self, page: Page) -> Result<Vec<Photo>> {
        self.client.get_with("/photos/admin", page.query()).await
    }

    pub async fn create<B: Serialize + ?Sized>(&self, data: &B) -> Result<serde_json::Value> {
        create(self.client, "/photos", data).await
    }

    pub async fn update<B: Serialize + ?Sized>(
        &self,
        id: &str,
        data: &B,
    ) -> Result<serde_json::Value> {
        update(self.client, "/photos", id, data).await
    }

    pub async fn delete(&self, id: &str) -> Result<serde_json::Value> {
        delete(self.client, "/photos", id).await
    }
}

impl VideosApi<'_> {
    pub async fn list_public(&self) -> Result<Vec<Video>> {
        self.client.get("/videos").await
    }

    pub async fn list_all(&self, page: Page) -> Result<Vec<Video>> {
        self.client.get_with("/videos/admin", page.query()).await
    }

    pub async fn create<B: Serialize + ?Sized>(&self, data: &B) -> Result<serde_json::Value> {
        create(self.client, "/videos", data).await
    }

    pub async fn update<B: Serialize + ?Sized>(
        &self,
        id: &str,
        data: &B,
    ) -> Result<serde_json::Value> {
        update(self.client, "/videos", id, data).await
    }

    pub async fn delete(&self, id: &str) -> Result<serde_json::Value> {
        delete(self.client, "/videos", id).await
    }
}

impl SponsorsApi<'_> {
    pub async fn list_public(&self) -> Result<Vec<Sponsor>> {
        self.client.get("/sponsors").await
    }

    pub async fn list_all(&self, page: Page) -> Result<Vec<Sponsor>> {
        self.client.get_with("/sponsors/admin", page.query()).await
    }

    pub async fn create<B: Serialize + ?Sized>(&self, data: &B) -> Result<serde_json::Value> {
        create(self.client, "/sponsors", data).await
    }

    pub async fn update<B: Serialize + ?Sized>(
        &self,
        id: &str,
        data: &B,
    ) -> Result<serde_json::Value> {
        update(self.client, "/sponsors", id, data).await
    }

    pub async fn delete(&self, id: &str) -> Result<serde_json::Value> {
        delete(self.client, "/sponsors", id).await
    }
}
