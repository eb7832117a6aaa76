use std::path::PathBuf;

use clap::Parser;

use crate::setup::Overrides;

const CONFIG_FILE: &str = "hue_config.json";
const LOCAL_CONFIG_FILE: &str = "config-local.json";
const LOCAL_FABRIC: &str = "LOCAL";

/// Drive Hue lights from a MIDI controller.
#[derive(Debug, Parser)]
#[command(name = "midi_hue", version)]
pub struct Cli {
    /// Where the setup result is read from and written to.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Bridge address. Asked for during setup when missing.
    #[arg(long, env = "HUB_IP")]
    pub hub_ip: Option<String>,

    /// Bridge username. Asked for during setup when missing.
    #[arg(long, env = "HUB_USERNAME")]
    pub username: Option<String>,

    /// Index of the MIDI input port. Asked for when missing.
    #[arg(long)]
    pub port: Option<usize>,

    /// Talk to an in-process fake bridge instead of real hardware.
    #[arg(long)]
    pub local: bool,

    #[arg(long, env = "FABRIC", hide = true)]
    pub fabric: Option<String>,

    /// Shift pure grays towards a warmer white before sending them.
    #[arg(long)]
    pub warm_white: bool,

    /// Default log level; RUST_LOG takes precedence.
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

impl Cli {
    pub fn is_local(&self) -> bool {
        self.local || self.fabric.as_deref() == Some(LOCAL_FABRIC)
    }

    pub fn config_path(&self) -> PathBuf {
        match &self.config {
            Some(path) => path.clone(),
            None if self.is_local() => PathBuf::from(LOCAL_CONFIG_FILE),
            None => PathBuf::from(CONFIG_FILE),
        }
    }

    pub fn overrides(&self) -> Overrides {
        Overrides {
            hub_ip: self.hub_ip.clone(),
            username: self.username.clone(),
        }
    }
}
