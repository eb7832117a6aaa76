use async_trait::async_trait;
use serde_json::json;

use crate::hue::model::{BridgeAddress, HubClient, HubError, LightState, LightsSnapshot};

/// Bridge stand-in for running without hardware. Reports three color lights and a white one.
pub struct Dummy;

impl Dummy {
    pub fn sample_lights() -> LightsSnapshot {
        let color = json!({"control": {"colorgamuttype": "C", "colorgamut": [[0.6915, 0.3083], [0.17, 0.7], [0.1532, 0.0475]]}});
        let white = json!({"control": {"mindimlevel": 5000, "maxlumen": 800}});

        (0..4)
            .map(|n| {
                let capabilities = if n < 3 { color.clone() } else { white.clone() };
                (
                    n.to_string(),
                    json!({"name": format!("light{n}"), "capabilities": capabilities}),
                )
            })
            .collect()
    }
}

#[async_trait]
impl HubClient for Dummy {
    async fn lights(&self, bridge: &BridgeAddress) -> Result<LightsSnapshot, HubError> {
        tracing::info!("GET lights from {}", bridge.ip);
        Ok(Self::sample_lights())
    }

    async fn set_state(
        &self,
        bridge: &BridgeAddress,
        light_id: &str,
        state: &LightState,
    ) -> Result<(), HubError> {
        tracing::info!("PUT {:?} to light {} on {}", state, light_id, bridge.ip);
        Ok(())
    }
}

#[cfg(test)]
pub use recording::{Recording, Stalled};
