use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::hue::model::{BridgeAddress, LightsSnapshot};
use crate::midi::model::MidiChannel;
use crate::midi::registry::inmem::RoutingTable;

/// Everything setup decided, in the shape it is persisted in.
#[derive(Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    pub ip: String,
    pub credential: String,
    pub midi_channel: MidiChannel,
    pub metadata: LightsSnapshot,
    pub routing_table: RoutingTable,
}

impl Config {
    pub fn bridge(&self) -> BridgeAddress {
        BridgeAddress::new(self.ip.clone(), self.credential.clone())
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("ip", &self.ip)
            .field("credential", &"***REDACTED***")
            .field("midi_channel", &self.midi_channel)
            .field("metadata", &self.metadata.len())
            .field("routing_table", &self.routing_table)
            .finish()
    }
}

// Files written by older versions used `username` and `parameterMap`.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredConfig {
    ip: Option<String>,
    #[serde(alias = "username")]
    credential: Option<String>,
    midi_channel: Option<MidiChannel>,
    metadata: Option<LightsSnapshot>,
    #[serde(alias = "parameterMap")]
    routing_table: Option<RoutingTable>,
}

impl TryFrom<StoredConfig> for Config {
    type Error = ConfigError;

    fn try_from(stored: StoredConfig) -> Result<Self, Self::Error> {
        Ok(Config {
            ip: stored.ip.ok_or(ConfigError::Incomplete("ip"))?,
            credential: stored.credential.ok_or(ConfigError::Incomplete("credential"))?,
            midi_channel: stored
                .midi_channel
                .ok_or(ConfigError::Incomplete("midiChannel"))?,
            metadata: stored.metadata.ok_or(ConfigError::Incomplete("metadata"))?,
            routing_table: stored
                .routing_table
                .ok_or(ConfigError::Incomplete("routingTable"))?,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("config is missing `{0}`")]
    Incomplete(&'static str),
}

pub fn load_from_json<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let conf_file = std::fs::File::open(path)?;
    let stored: StoredConfig = serde_json::from_reader(std::io::BufReader::new(conf_file))?;
    stored.try_into()
}

pub fn save_to_json<P: AsRef<Path>>(config: &Config, path: P) -> Result<(), ConfigError> {
    let json = serde_json::to_string_pretty(config)?;
    std::fs::write(path, json)?;
    Ok(())
}
