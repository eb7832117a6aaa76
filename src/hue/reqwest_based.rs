use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use crate::hue::model::{BridgeAddress, HubClient, HubError, LightState, LightsSnapshot};

#[derive(Deserialize)]
struct ApiErrorBody {
    #[serde(rename = "type")]
    error_type: i32,
    description: String,
}

// The bridge answers 200 OK and reports failures in the body.
#[derive(Deserialize)]
#[serde(untagged)]
enum LightsResponse {
    Lights(LightsSnapshot),
    Errors(Vec<ResponseItem>),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ResponseItem {
    Error { error: ApiErrorBody },
    Success { success: Value },
}

fn first_error(items: &[ResponseItem]) -> Option<HubError> {
    items.iter().find_map(|item| match item {
        ResponseItem::Error { error } => Some(HubError::Api(format!(
            "{} (type {})",
            error.description, error.error_type
        ))),
        ResponseItem::Success { .. } => None,
    })
}

// Request URLs carry the bridge username.
fn redacted(err: reqwest::Error) -> HubError {
    HubError::Network(err.without_url())
}

pub struct ReqwestBased {
    client: reqwest::Client,
}

impl ReqwestBased {
    pub fn new() -> Result<ReqwestBased, HubError> {
        let client = reqwest::Client::builder().build()?;
        Ok(ReqwestBased { client })
    }

    fn checked(what: &str, resp: reqwest::Response) -> Result<reqwest::Response, HubError> {
        if resp.status().is_success() {
            Ok(resp)
        } else {
            Err(HubError::Status {
                what: what.to_string(),
                status: resp.status(),
            })
        }
    }
}

#[async_trait]
impl HubClient for ReqwestBased {
    async fn lights(&self, bridge: &BridgeAddress) -> Result<LightsSnapshot, HubError> {
        let url = bridge.lights_url();
        tracing::info!("GET lights from {}", bridge.ip);
        let resp = self.client.get(&url).send().await.map_err(redacted)?;
        let resp = Self::checked("GET lights", resp)?;

        match resp.json::<LightsResponse>().await.map_err(redacted)? {
            LightsResponse::Lights(lights) => Ok(lights),
            LightsResponse::Errors(items) => Err(first_error(&items)
                .unwrap_or_else(|| HubError::Api("unexpected lights response".to_string()))),
        }
    }

    async fn set_state(
        &self,
        bridge: &BridgeAddress,
        light_id: &str,
        state: &LightState,
    ) -> Result<(), HubError> {
        let url = bridge.state_url(light_id);
        tracing::debug!("PUT {:?} to light {} on {}", state, light_id, bridge.ip);
        let resp = self
            .client
            .put(&url)
            .json(state)
            .send()
            .await
            .map_err(redacted)?;
        let resp = Self::checked(&format!("PUT light {light_id}"), resp)?;

        let items: Vec<ResponseItem> = resp.json().await.map_err(redacted)?;
        match first_error(&items) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}
