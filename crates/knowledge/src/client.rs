//! HTTP client for the knowledge service.

use async_trait::async_trait;
use parley_config::KnowledgeConfig;
use parley_core::{BackendError, KnowledgeSource, SessionId};
use serde::Serialize;
use serde_json::{Map, Value};
use std::time::Duration;
use tracing::{debug, warn};

use crate::records::{AssetUpdate, LocationUpdate, NewLocation, SpaceUpdate};

pub struct KnowledgeClient {
    base_url: String,
    user_id: String,
    client: reqwest::Client,
}

impl KnowledgeClient {
    pub fn new(
        base_url: impl Into<String>,
        user_id: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BackendError::NotConfigured(format!("HTTP client: {e}")))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            user_id: user_id.into(),
            client,
        })
    }

    pub fn from_config(config: &KnowledgeConfig) -> Result<Self, BackendError> {
        Self::new(
            &config.api_url,
            &config.user_id,
            Duration::from_secs(config.timeout_secs),
        )
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    async fn post(&self, path: &str, body: &Value) -> Result<Value, BackendError> {
        let url = format!("{}/{}", self.base_url, path);
        debug!(%url, "Knowledge request");

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    BackendError::Timeout(e.to_string())
                } else {
                    BackendError::Network(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(BackendError::ApiError {
                status_code: status.as_u16(),
                message,
            });
        }

        response
            .json()
            .await
            .map_err(|e| BackendError::MalformedResponse(e.to_string()))
    }

    /// POST a record payload and turn the outcome into a status line.
    async fn record_operation<T: Serialize>(
        &self,
        path: &str,
        id_field: Option<(&str, &str)>,
        payload: &T,
        success: &str,
        failure: &str,
    ) -> String {
        let mut body = match serde_json::to_value(payload) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        };
        if let Some((field, id)) = id_field {
            body.insert(field.into(), Value::String(id.into()));
        }
        body.insert("user_id".into(), Value::String(self.user_id.clone()));

        match self.post(path, &Value::Object(body)).await {
            Ok(data) => data
                .get("message")
                .and_then(Value::as_str)
                .filter(|m| !m.is_empty())
                .unwrap_or(success)
                .to_string(),
            Err(e) => {
                warn!(operation = path, error = %e, "Knowledge record operation failed");
                failure.to_string()
            }
        }
    }

    pub async fn create_location(&self, location: &NewLocation) -> String {
        self.record_operation(
            "create-location",
            None,
            location,
            "Location created successfully.",
            "Failed to create location.",
        )
        .await
    }

    pub async fn create_space(&self, space_name: &str) -> String {
        self.record_operation(
            "create-space",
            None,
            &serde_json::json!({ "space_name": space_name }),
            "Space created successfully.",
            "Failed to create space.",
        )
        .await
    }

    pub async fn edit_location(&self, location_id: &str, update: &LocationUpdate) -> String {
        self.record_operation(
            "edit-location",
            Some(("location_id", location_id)),
            update,
            "Location updated successfully.",
            "Failed to update location.",
        )
        .await
    }

    pub async fn edit_space(&self, space_id: &str, update: &SpaceUpdate) -> String {
        self.record_operation(
            "edit-space",
            Some(("space_id", space_id)),
            update,
            "Space updated successfully.",
            "Failed to update space.",
        )
        .await
    }

    pub async fn edit_asset(&self, asset_id: &str, update: &AssetUpdate) -> String {
        self.record_operation(
            "edit-asset",
            Some(("asset_id", asset_id)),
            update,
            "Asset updated successfully.",
            "Failed to update asset.",
        )
        .await
    }
}

#[async_trait]
impl KnowledgeSource for KnowledgeClient {
    fn name(&self) -> &str {
        "knowledge"
    }

    async fn search(&self, query: &str, k: usize) -> Result<Vec<String>, BackendError> {
        let body = serde_json::json!({
            "query": query,
            "k": k,
            "user_id": self.user_id,
        });
        let data = self.post("search", &body).await?;

        Ok(data
            .get("results")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(|v| v.as_str().map(String::from))
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn enhanced_response(
        &self,
        message: &str,
        session_id: &SessionId,
        use_augmentation: bool,
    ) -> Result<String, BackendError> {
        let body = serde_json::json!({
            "message": message,
            "session_id": session_id.as_str(),
            "user_id": self.user_id,
            "use_rag": use_augmentation,
        });
        let data = self.post("enhanced-response", &body).await?;

        data.get("response")
            .and_then(Value::as_str)
            .filter(|r| !r.trim().is_empty())
            .map(String::from)
            .ok_or_else(|| BackendError::MalformedResponse("missing `response` field".into()))
    }

    async fn store_conversation(
        &self,
        user_message: &str,
        ai_response: &str,
        session_id: &SessionId,
    ) -> Result<(), BackendError> {
        let body = serde_json::json!({
            "user_message": user_message,
            "ai_response": ai_response,
            "session_id": session_id.as_str(),
            "user_id": self.user_id,
        });
        self.post("store-conversation", &body).await.map(|_| ())
    }
}
