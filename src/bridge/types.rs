//! Request and response bodies of the asset API.

use serde::{Deserialize, Serialize};

/// Message returned when `CreateAsset` commits.
pub const ASSET_CREATED: &str = "Asset created successfully";

/// Body of `POST /assets`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CreateAssetRequest {
    pub id: String,
    pub value: AssetValue,
}

/// Asset value as sent by the caller: a string, or any other JSON value.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum AssetValue {
    Text(String),
    Json(serde_json::Value),
}

impl AssetValue {
    /// Chaincode argument form: strings pass through, anything else is
    /// compact JSON text.
    pub fn to_argument(&self) -> String {
        match self {
            AssetValue::Text(text) => text.clone(),
            AssetValue::Json(value) => value.to_string(),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, AssetValue::Json(serde_json::Value::Null))
    }
}

impl CreateAssetRequest {
    /// Reject requests the chaincode should never see.
    pub fn validate(&self) -> Result<(), String> {
        if self.id.is_empty() {
            return Err("id must not be empty".to_string());
        }
        if self.value.is_null() {
            return Err("value is required".to_string());
        }
        Ok(())
    }
}

/// `{"message": ...}` success body.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct MessageResponse {
    pub message: String,
}
