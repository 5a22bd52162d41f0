//! Outfit collections, served through the authenticated client.

use super::models::{lenient_timestamp, ApiResponse};
use crate::error::AuthError;
use crate::http::{ApiClient, ApiRequest};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const COLLECTIONS_PATH: &str = "/collections";

/// A user-curated group of outfits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collection {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, alias = "is_public")]
    pub is_public: bool,
    #[serde(default, alias = "thumbnail_url")]
    pub thumbnail_url: Option<String>,
    #[serde(alias = "user_id")]
    pub user_id: String,
    #[serde(default, alias = "created_at", deserialize_with = "lenient_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, alias = "updated_at", deserialize_with = "lenient_timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCollectionRequest {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_public: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
}

impl CreateCollectionRequest {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            is_public: None,
            thumbnail_url: None,
        }
    }
}

/// Partial update; only the fields that are set are sent.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCollectionRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_public: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
}

#[derive(Clone)]
pub struct CollectionsApi {
    client: Arc<ApiClient>,
}

impl CollectionsApi {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    pub async fn create(
        &self,
        request: &CreateCollectionRequest,
    ) -> Result<ApiResponse<Collection>, AuthError> {
        self.client
            .send(ApiRequest::post(COLLECTIONS_PATH).json(request)?)
            .await
    }

    /// Collections owned by the signed-in user.
    pub async fn list(&self) -> Result<ApiResponse<Vec<Collection>>, AuthError> {
        self.client.send(ApiRequest::get(COLLECTIONS_PATH)).await
    }

    /// Public collections. Zero or absent `limit`/`offset` are left to the
    /// server's defaults.
    pub async fn list_public(
        &self,
        limit: Option<u32>,
        offset: Option<u32>,
    ) -> Result<ApiResponse<Vec<Collection>>, AuthError> {
        let mut request = ApiRequest::get(format!("{COLLECTIONS_PATH}/public"));
        if let Some(limit) = limit.filter(|&n| n > 0) {
            request = request.query("limit", limit);
        }
        if let Some(offset) = offset.filter(|&n| n > 0) {
            request = request.query("offset", offset);
        }
        self.client.send(request).await
    }

    pub async fn get(&self, id: &str) -> Result<ApiResponse<Collection>, AuthError> {
        self.client
            .send(ApiRequest::get(format!("{COLLECTIONS_PATH}/{id}")))
            .await
    }

    pub async fn update(
        &self,
        id: &str,
        request: &UpdateCollectionRequest,
    ) -> Result<ApiResponse<Collection>, AuthError> {
        self.client
            .send(ApiRequest::patch(format!("{COLLECTIONS_PATH}/{id}")).json(request)?)
            .await
    }

    /// The delete endpoint may answer without a `data` field.
    pub async fn delete(
        &self,
        id: &str,
    ) -> Result<ApiResponse<Option<serde_json::Value>>, AuthError> {
        self.client
            .send(ApiRequest::delete(format!("{COLLECTIONS_PATH}/{id}")))
            .await
    }
}
