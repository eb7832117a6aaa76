use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::color::Hsv;

/// Firmware the lights are driven through speaks the v1 REST API over plain HTTP.
pub const SCHEME: &str = "http";

/// Raw `GET /lights` body, keyed by light id. Persisted as-is so setup can be replayed offline.
pub type LightsSnapshot = Map<String, Value>;

#[derive(Clone, PartialEq, Eq)]
pub struct BridgeAddress {
    pub ip: String,
    pub username: String,
}

impl BridgeAddress {
    pub fn new(ip: impl Into<String>, username: impl Into<String>) -> BridgeAddress {
        BridgeAddress {
            ip: ip.into(),
            username: username.into(),
        }
    }

    pub fn lights_url(&self) -> String {
        format!("{SCHEME}://{}/api/{}/lights", self.ip, self.username)
    }

    pub fn state_url(&self, light_id: &str) -> String {
        format!("{}/{light_id}/state", self.lights_url())
    }
}

impl std::fmt::Debug for BridgeAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BridgeAddress")
            .field("ip", &self.ip)
            .field("username", &"***REDACTED***")
            .finish()
    }
}

/// Body of `PUT /lights/{id}/state`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LightState {
    pub on: bool,
    pub hue: u16,
    pub sat: u8,
    pub bri: u8,
}

impl From<Hsv> for LightState {
    fn from(hsv: Hsv) -> Self {
        LightState {
            on: hsv.bri != 0,
            hue: hsv.hue,
            sat: hsv.sat,
            bri: hsv.bri,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct Control {
    colorgamut: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
struct Capabilities {
    #[serde(default)]
    control: Control,
}

/// The part of a light entry the controller cares about.
#[derive(Debug, Deserialize)]
pub struct LightMetadata {
    pub name: String,
    #[serde(default)]
    capabilities: Capabilities,
}

impl LightMetadata {
    /// Color capable lights advertise a gamut under `capabilities.control.colorgamut`.
    pub fn supports_color(&self) -> bool {
        self.capabilities.control.colorgamut.is_some()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum HubError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("bridge answered {what} with HTTP {status}")]
    Status {
        what: String,
        status: reqwest::StatusCode,
    },
    #[error("API error: {0}")]
    Api(String),
}

#[async_trait]
pub trait HubClient {
    async fn lights(&self, bridge: &BridgeAddress) -> Result<LightsSnapshot, HubError>;

    async fn set_state(
        &self,
        bridge: &BridgeAddress,
        light_id: &str,
        state: &LightState,
    ) -> Result<(), HubError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn urls_follow_v1_layout() {
        let bridge = BridgeAddress::new("10.0.0.2", "user");
        assert_eq!(bridge.lights_url(), "http://10.0.0.2/api/user/lights");
        assert_eq!(bridge.state_url("4"), "http://10.0.0.2/api/user/lights/4/state");
    }

    #[test]
    fn bridge_debug_redacts_username() {
        let debug_str = format!("{:?}", BridgeAddress::new("10.0.0.2", "secret_user_123"));
        assert!(debug_str.contains("10.0.0.2"));
        assert!(!debug_str.contains("secret_user_123"));
    }

    #[test]
    fn color_support_follows_gamut() {
        let color: LightMetadata = serde_json::from_value(json!({
            "name": "Hue color lamp",
            "capabilities": {"control": {"colorgamuttype": "C", "colorgamut": [[0.69, 0.3], [0.17, 0.7], [0.15, 0.06]]}}
        }))
        .unwrap();
        let white: LightMetadata = serde_json::from_value(json!({
            "name": "Hue white lamp",
            "capabilities": {"control": {"mindimlevel": 5000, "maxlumen": 800}}
        }))
        .unwrap();
        let bare: LightMetadata = serde_json::from_value(json!({"name": "plug"})).unwrap();

        assert!(color.supports_color());
        assert!(!white.supports_color());
        assert!(!bare.supports_color());
    }

    #[test]
    fn state_is_off_only_at_zero_brightness() {
        let off = LightState::from(Hsv { hue: 0, sat: 0, bri: 0 });
        let on = LightState::from(Hsv { hue: 0, sat: 0, bri: 1 });
        assert!(!off.on);
        assert!(on.on);
        assert_eq!(
            serde_json::to_value(on).unwrap(),
            json!({"on": true, "hue": 0, "sat": 0, "bri": 1})
        );
    }
}
