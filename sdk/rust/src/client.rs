//! Client for the fabric asset bridge REST API.

use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
struct CreateAssetBody<'a, V: Serialize> {
    id: &'a str,
    value: V,
}

#[derive(Debug, Deserialize)]
struct MessageBody {
    message: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// Status, `x-request-id` and body of one bridge response.
#[derive(Debug, Clone)]
pub struct BridgeResponse {
    pub status: u16,
    pub request_id: Option<String>,
    pub body: String,
}

impl BridgeResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// `message` field of a `{"message": ...}` body.
    pub fn message(&self) -> Option<String> {
        serde_json::from_str::<MessageBody>(&self.body).ok().map(|b| b.message)
    }

    /// `error` field of a `{"error": ...}` body.
    pub fn error(&self) -> Option<String> {
        serde_json::from_str::<ErrorBody>(&self.body).ok().map(|b| b.error)
    }

    /// Parse the body as JSON.
    pub fn json<T: for<'de> Deserialize<'de>>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_str(&self.body)
    }
}

pub struct BridgeClient {
    client: Client,
    base_url: Url,
}

impl BridgeClient {
    /// Client for the bridge at `base_url`, e.g. `http://localhost:3000`.
    pub fn new(base_url: &str) -> Result<Self, url::ParseError> {
        let base_url = Url::parse(base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(url::ParseError::RelativeUrlWithCannotBeABaseBase);
        }
        Ok(Self {
            client: Client::new(),
            base_url,
        })
    }

    /// Base URL with `segments` appended, each percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// `POST /assets` with `{"id", "value"}`. `value` may be any JSON value.
    pub async fn create_asset<V: Serialize>(
        &self,
        id: &str,
        value: V,
    ) -> Result<BridgeResponse, reqwest::Error> {
        let resp = self
            .client
            .post(self.endpoint(&["assets"]))
            .json(&CreateAssetBody { id, value })
            .send()
            .await?;
        Self::collect(resp).await
    }

    /// `POST /assets` with an arbitrary body sent as `application/json`.
    pub async fn create_asset_raw(&self, body: &str) -> Result<BridgeResponse, reqwest::Error> {
        let resp = self
            .client
            .post(self.endpoint(&["assets"]))
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body.to_string())
            .send()
            .await?;
        Self::collect(resp).await
    }

    /// `GET /assets/{id}`
    pub async fn read_asset(&self, id: &str) -> Result<BridgeResponse, reqwest::Error> {
        self.get(&["assets", id]).await
    }

    /// `GET /assets`
    pub async fn list_assets(&self) -> Result<BridgeResponse, reqwest::Error> {
        self.get(&["assets"]).await
    }

    /// `GET /health`
    pub async fn health(&self) -> Result<BridgeResponse, reqwest::Error> {
        self.get(&["health"]).await
    }

    async fn get(&self, segments: &[&str]) -> Result<BridgeResponse, reqwest::Error> {
        let resp = self.client.get(self.endpoint(segments)).send().await?;
        Self::collect(resp).await
    }

    async fn collect(resp: reqwest::Response) -> Result<BridgeResponse, reqwest::Error> {
        let status = resp.status().as_u16();
        let request_id = resp
            .headers()
            .get("x-request-id")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = resp.text().await?;
        Ok(BridgeResponse {
            status,
            request_id,
            body,
        })
    }
}
