//! One-shot startup sequence: reuse the persisted config, or discover lights on the bridge
//! and ask the operator which controllers drive them.

pub mod prompt;

use std::path::{Path, PathBuf};

use crate::configuration::{self, Config, ConfigError};
use crate::fixture::FixtureRegistry;
use crate::hue::model::{BridgeAddress, HubClient, HubError};
use crate::midi::model::{DataByte, MidiChannel};
use crate::midi::registry::inmem::RoutingTable;
use crate::midi::registry::model::{Parameter, ParameterBinding};
use prompt::{ask_until, PromptError, Prompter};

const OVERWRITE_ANSWER: &str = "yes";

#[derive(Debug, thiserror::Error)]
pub enum SetupError {
    #[error("there was an error fetching Hue system metadata: {0}")]
    Discovery(#[source] HubError),
    #[error(transparent)]
    Prompt(#[from] PromptError),
}

/// Values that skip their prompt when present.
#[derive(Clone, Debug, Default)]
pub struct Overrides {
    pub hub_ip: Option<String>,
    pub username: Option<String>,
}

/// What setup hands over to the dispatcher.
#[derive(Debug)]
pub struct Session {
    pub config: Config,
    pub fixtures: FixtureRegistry,
}

pub struct Setup<'a, P: Prompter + ?Sized> {
    hub: &'a (dyn HubClient + Send + Sync),
    prompter: &'a mut P,
    config_path: PathBuf,
    overrides: Overrides,
}

impl<'a, P: Prompter + ?Sized> Setup<'a, P> {
    pub fn new(
        hub: &'a (dyn HubClient + Send + Sync),
        prompter: &'a mut P,
        config_path: impl AsRef<Path>,
        overrides: Overrides,
    ) -> Setup<'a, P> {
        Setup {
            hub,
            prompter,
            config_path: config_path.as_ref().to_path_buf(),
            overrides,
        }
    }

    pub async fn run(mut self) -> Result<Session, SetupError> {
        match self.load() {
            Some(config) if !self.wants_overwrite()? => Ok(self.reuse(config)),
            _ => self.init().await,
        }
    }

    fn load(&self) -> Option<Config> {
        match configuration::load_from_json(&self.config_path) {
            Ok(config) => Some(config),
            Err(ConfigError::Io(err)) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!("no config found at {:?}, re-initializing", self.config_path);
                None
            }
            Err(err) => {
                tracing::warn!(
                    "could not use config at {:?}, re-initializing: {}",
                    self.config_path,
                    err
                );
                None
            }
        }
    }

    fn wants_overwrite(&mut self) -> Result<bool, PromptError> {
        let answer = self
            .prompter
            .ask("loaded config from file--would you like to overwrite? (yes/no): ")?;
        Ok(answer == OVERWRITE_ANSWER)
    }

    fn reuse(self, config: Config) -> Session {
        let fixtures = FixtureRegistry::build(&config.metadata);
        for binding in config.routing_table.dangling(|id| fixtures.contains(id)) {
            tracing::warn!(
                "config binds {} of unknown light {}",
                binding.parameter,
                binding.fixture_id
            );
        }
        tracing::info!(
            "reusing config for {} lights on MIDI channel {}",
            fixtures.len(),
            config.midi_channel
        );
        Session { config, fixtures }
    }

    async fn init(self) -> Result<Session, SetupError> {
        let Setup {
            hub,
            prompter,
            config_path,
            overrides,
        } = self;

        let ip = match non_empty(overrides.hub_ip) {
            Some(ip) => ip,
            None => prompter.ask("enter IP address of Hue Hub: ")?,
        };
        let credential = match non_empty(overrides.username) {
            Some(username) => username,
            None => prompter.ask("enter username for Hue: ")?,
        };
        let midi_channel = ask_until(
            &mut *prompter,
            &format!(
                "enter MIDI channel [{}-{}] for lights: ",
                MidiChannel::MIN,
                MidiChannel::MAX
            ),
            |answer| answer.parse().ok().and_then(MidiChannel::from_u8),
        )?;

        let bridge = BridgeAddress::new(ip, credential);
        let metadata = hub.lights(&bridge).await.map_err(SetupError::Discovery)?;
        let fixtures = FixtureRegistry::build(&metadata);
        tracing::info!("found {} color lights", fixtures.len());

        let mut routing_table = RoutingTable::new();
        for (id, fixture) in fixtures.iter() {
            for parameter in Parameter::ALL {
                let controller = ask_until(
                    &mut *prompter,
                    &format!(
                        "enter CC number for light {}-intensity {}: ",
                        parameter, fixture.name
                    ),
                    |answer| answer.parse().ok().and_then(DataByte::from_u8),
                )?;
                routing_table.bind(controller, ParameterBinding::new(id.clone(), parameter));
            }
        }

        let config = Config {
            ip: bridge.ip,
            credential: bridge.username,
            midi_channel,
            metadata,
            routing_table,
        };

        tracing::info!("writing config to {:?}", config_path);
        if let Err(err) = configuration::save_to_json(&config, &config_path) {
            tracing::error!("could not save config to {:?}: {}", config_path, err);
        }

        Ok(Session { config, fixtures })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::Fixture;
    use crate::hue::stubs::{Dummy, Recording};
    use prompt::Scripted;
    use tempfile::TempDir;

    fn cc(n: u8) -> DataByte {
        DataByte::from_u8(n).unwrap()
    }

    fn overrides() -> Overrides {
        Overrides {
            hub_ip: Some("10.0.0.2".to_string()),
            username: Some("user".to_string()),
        }
    }

    // Channel 2, then R/G/B for lights 0, 1 and 2. Lights 0 and 1 share CC 10 for red.
    fn init_answers() -> Vec<&'static str> {
        vec!["2", "10", "11", "12", "10", "21", "22", "30", "31", "32"]
    }

    #[tokio::test]
    async fn init_discovers_binds_and_persists() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        let hub = Recording::with_lights(Dummy::sample_lights());
        let mut prompter = Scripted::new(init_answers());

        let session = Setup::new(&hub, &mut prompter, &path, overrides())
            .run()
            .await
            .unwrap();

        assert_eq!(hub.gets(), 1);
        assert_eq!(prompter.remaining(), 0);
        assert_eq!(session.config.ip, "10.0.0.2");
        assert_eq!(session.config.credential, "user");
        assert_eq!(session.config.midi_channel.as_u8(), 2);
        assert_eq!(session.fixtures.len(), 3);
        assert_eq!(
            session.config.routing_table.bindings_for(cc(10)),
            &[
                ParameterBinding::new("0", Parameter::R),
                ParameterBinding::new("1", Parameter::R),
            ]
        );
        assert_eq!(
            session.config.routing_table.bindings_for(cc(32)),
            &[ParameterBinding::new("2", Parameter::B)]
        );
        assert_eq!(
            prompter.asked[1],
            "enter CC number for light R-intensity light0: "
        );
        assert_eq!(
            prompter.asked[3],
            "enter CC number for light B-intensity light0: "
        );

        let persisted = configuration::load_from_json(&path).unwrap();
        assert_eq!(persisted, session.config);
    }

    #[tokio::test]
    async fn missing_overrides_are_prompted() {
        let dir = TempDir::new().unwrap();
        let hub = Recording::with_lights(Dummy::sample_lights());
        let mut answers = vec!["10.0.0.9", "operator"];
        answers.extend(init_answers());
        let mut prompter = Scripted::new(answers);
        let overrides = Overrides {
            hub_ip: Some(String::new()),
            username: None,
        };

        let session = Setup::new(&hub, &mut prompter, dir.path().join("c.json"), overrides)
            .run()
            .await
            .unwrap();

        assert_eq!(prompter.asked[0], "enter IP address of Hue Hub: ");
        assert_eq!(prompter.asked[1], "enter username for Hue: ");
        assert_eq!(session.config.bridge(), BridgeAddress::new("10.0.0.9", "operator"));
    }

    #[tokio::test]
    async fn invalid_channel_and_controller_are_asked_again() {
        let dir = TempDir::new().unwrap();
        let hub = Recording::with_lights(Dummy::sample_lights());
        let mut answers = vec!["0", "seventeen", "17", "16", "128", "-1"];
        answers.extend(&init_answers()[1..]);
        let mut prompter = Scripted::new(answers);

        let session = Setup::new(&hub, &mut prompter, dir.path().join("c.json"), overrides())
            .run()
            .await
            .unwrap();

        assert_eq!(session.config.midi_channel.as_u8(), 16);
        assert_eq!(prompter.asked[0], prompter.asked[3]);
        assert_eq!(prompter.asked[4], prompter.asked[6]);
        assert_eq!(
            session.config.routing_table.bindings_for(cc(10)).len(),
            2
        );
    }

    #[tokio::test]
    async fn discovery_failure_aborts_without_writing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        let hub = Recording::unreachable();
        let mut prompter = Scripted::new(["1"]);

        let result = Setup::new(&hub, &mut prompter, &path, overrides()).run().await;

        match result {
            Err(err @ SetupError::Discovery(_)) => {
                assert!(err
                    .to_string()
                    .starts_with("there was an error fetching Hue system metadata"));
            }
            other => panic!("Expected discovery failure, got {other:?}"),
        }
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn persist_failure_keeps_session() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing").join("config.json");
        let hub = Recording::with_lights(Dummy::sample_lights());
        let mut prompter = Scripted::new(init_answers());

        let session = Setup::new(&hub, &mut prompter, &path, overrides())
            .run()
            .await
            .unwrap();

        assert_eq!(session.fixtures.len(), 3);
        assert!(!path.exists());
    }

    async fn with_saved_config(answer: &str) -> (Session, Session, Recording) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        let first_hub = Recording::with_lights(Dummy::sample_lights());
        let mut prompter = Scripted::new(init_answers());
        let first = Setup::new(&first_hub, &mut prompter, &path, overrides())
            .run()
            .await
            .unwrap();

        let hub = Recording::with_lights(Dummy::sample_lights());
        let mut answers = vec![answer];
        if answer == OVERWRITE_ANSWER {
            answers.extend(init_answers());
        }
        let mut prompter = Scripted::new(answers);
        let second = Setup::new(&hub, &mut prompter, &path, overrides())
            .run()
            .await
            .unwrap();

        assert_eq!(
            prompter.asked[0],
            "loaded config from file--would you like to overwrite? (yes/no): "
        );
        (first, second, hub)
    }

    #[tokio::test]
    async fn reuse_rebuilds_registry_without_network() {
        let (first, second, hub) = with_saved_config("no").await;

        assert_eq!(hub.gets(), 0);
        assert_eq!(second.config, first.config);
        assert_eq!(second.fixtures, first.fixtures);
        assert!(second
            .fixtures
            .iter()
            .all(|(_, f)| (f.r, f.g, f.b) == (127, 127, 127)));
        assert_eq!(second.fixtures.get("2"), Some(&Fixture::new("light2")));
    }

    #[tokio::test]
    async fn overwrite_answer_is_case_sensitive() {
        let (_, _, hub) = with_saved_config("Yes").await;
        assert_eq!(hub.gets(), 0);

        let (_, _, hub) = with_saved_config("yes").await;
        assert_eq!(hub.gets(), 1);
    }

    #[tokio::test]
    async fn incomplete_config_skips_overwrite_question() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"ip": "10.0.0.2", "midiChannel": 1}"#).unwrap();
        let hub = Recording::with_lights(Dummy::sample_lights());
        let mut prompter = Scripted::new(init_answers());

        Setup::new(&hub, &mut prompter, &path, overrides())
            .run()
            .await
            .unwrap();

        assert_eq!(hub.gets(), 1);
        assert!(prompter.asked[0].starts_with("enter MIDI channel"));
        assert!(configuration::load_from_json(&path).is_ok());
    }

    #[tokio::test]
    async fn malformed_config_is_treated_as_absent() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "][").unwrap();
        let hub = Recording::with_lights(Dummy::sample_lights());
        let mut prompter = Scripted::new(init_answers());

        let session = Setup::new(&hub, &mut prompter, &path, overrides())
            .run()
            .await
            .unwrap();

        assert_eq!(hub.gets(), 1);
        assert_eq!(session.fixtures.len(), 3);
    }
}
