use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::task::JoinSet;

use crate::color::{rgb_to_hsv, warm_white};
use crate::extensions::option::OptionExt;
use crate::fixture::{Fixture, FixtureRegistry};
use crate::hue::model::{HubClient, HubError, LightState};
use crate::midi::model::{ControlChange, DataByte, MidiChannel, MidiEvent, ProgramChange};
use crate::midi::registry::model::Parameter;
use crate::setup::Session;

pub type DispatcherHubClient = Arc<dyn HubClient + Send + Sync + 'static>;

/// Program number that triggers a broadcast whatever channel it arrives on.
const BROADCAST_ANY_CHANNEL: u8 = 0;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DispatchError {
    #[error("hue handler not initialized")]
    NotInitialized,
    #[error("no lights to control")]
    NoFixtures,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Assignment {
    pub fixture_id: String,
    pub parameter: Parameter,
    pub value: u8,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Broadcast {
    pub states: BTreeMap<String, LightState>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Ignored {
    OtherChannel(MidiChannel),
    UnmappedController(DataByte),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Fixture channels changed, in binding order.
    Routed(Vec<Assignment>),
    Broadcast(Broadcast),
    Ignored(Ignored),
}

/// Applies MIDI events to the fixtures of a session and pushes them to the bridge.
pub struct EventDispatcher {
    hub: DispatcherHubClient,
    session: Option<Session>,
    warm_white: bool,
    deliveries: JoinSet<Vec<String>>,
}

impl EventDispatcher {
    pub fn new(hub: DispatcherHubClient, warm_white: bool) -> EventDispatcher {
        EventDispatcher {
            hub,
            session: None,
            warm_white,
            deliveries: JoinSet::new(),
        }
    }

    pub fn with_session(
        hub: DispatcherHubClient,
        session: Session,
        warm_white: bool,
    ) -> EventDispatcher {
        let mut dispatcher = EventDispatcher::new(hub, warm_white);
        dispatcher.initialize(session);
        dispatcher
    }

    pub fn initialize(&mut self, session: Session) {
        self.session = Some(session);
    }

    pub fn fixtures(&self) -> Option<&FixtureRegistry> {
        self.session.as_ref().map(|session| &session.fixtures)
    }

    pub fn handle(&mut self, event: MidiEvent) -> Result<DispatchOutcome, DispatchError> {
        match event {
            MidiEvent::ControlChange(cc) => self.handle_control_change(&cc),
            MidiEvent::ProgramChange(pc) => self.handle_program_change(&pc),
        }
    }

    pub fn handle_control_change(
        &mut self,
        event: &ControlChange,
    ) -> Result<DispatchOutcome, DispatchError> {
        let Session { config, fixtures } = ready(self.session.as_mut())?;

        if event.channel != config.midi_channel {
            return Ok(DispatchOutcome::Ignored(Ignored::OtherChannel(event.channel)));
        }

        let bindings = Some(config.routing_table.bindings_for(event.controller))
            .filter(|bindings| !bindings.is_empty())
            .inspect_none(|| tracing::debug!("no lights bound to CC {}", event.controller));
        let Some(bindings) = bindings else {
            return Ok(DispatchOutcome::Ignored(Ignored::UnmappedController(
                event.controller,
            )));
        };

        let value = event.value.as_u8();
        let mut assignments = Vec::with_capacity(bindings.len());
        for binding in bindings {
            let Some(previous) = fixtures
                .get(&binding.fixture_id)
                .map(|fixture| fixture.channel(binding.parameter))
            else {
                tracing::warn!(
                    "CC {} is bound to unknown light {}",
                    event.controller,
                    binding.fixture_id
                );
                continue;
            };
            fixtures.set(&binding.fixture_id, binding.parameter, value);
            tracing::info!(
                "setting {} for light {} from {} to {}",
                binding.parameter,
                binding.fixture_id,
                previous,
                value
            );
            assignments.push(Assignment {
                fixture_id: binding.fixture_id.clone(),
                parameter: binding.parameter,
                value,
            });
        }
        tracing::debug!("{:?}", event);

        Ok(DispatchOutcome::Routed(assignments))
    }

    /// Starts pushing every light's color to the bridge and returns the states being sent.
    /// The requests run in the background; see [`EventDispatcher::flush`].
    pub fn handle_program_change(
        &mut self,
        event: &ProgramChange,
    ) -> Result<DispatchOutcome, DispatchError> {
        let Session { config, fixtures } = ready(self.session.as_ref())?;

        if event.channel != config.midi_channel && event.number.as_u8() != BROADCAST_ANY_CHANNEL {
            return Ok(DispatchOutcome::Ignored(Ignored::OtherChannel(event.channel)));
        }
        tracing::debug!("{:?}", event);

        let bridge = config.bridge();
        let mut broadcast = Broadcast::default();
        let mut requests = JoinSet::new();
        for (id, fixture) in fixtures.iter() {
            let state = self.light_state(fixture);
            broadcast.states.insert(id.to_string(), state);

            let hub = self.hub.clone();
            let bridge = bridge.clone();
            let id = id.to_string();
            requests.spawn(async move {
                let result = hub.set_state(&bridge, &id, &state).await;
                (id, result)
            });
        }

        while let Some(finished) = self.deliveries.try_join_next() {
            if let Err(err) = finished {
                tracing::error!("light update batch failed: {}", err);
            }
        }
        self.deliveries.spawn(deliver(requests));

        Ok(DispatchOutcome::Broadcast(broadcast))
    }

    /// Waits for the light updates still in flight. Returns the ids whose update failed.
    pub async fn flush(&mut self) -> Vec<String> {
        let mut failed = Vec::new();
        while let Some(finished) = self.deliveries.join_next().await {
            match finished {
                Ok(ids) => failed.extend(ids),
                Err(err) => tracing::error!("light update batch failed: {}", err),
            }
        }
        failed.sort();
        failed
    }

    fn light_state(&self, fixture: &Fixture) -> LightState {
        let (r, g, b) = (fixture.r as f64, fixture.g as f64, fixture.b as f64);
        let (r, g, b) = if self.warm_white {
            warm_white(r, g, b)
        } else {
            (r, g, b)
        };
        rgb_to_hsv(r, g, b).into()
    }
}

async fn deliver(mut requests: JoinSet<(String, Result<(), HubError>)>) -> Vec<String> {
    let mut failed = Vec::new();
    while let Some(joined) = requests.join_next().await {
        match joined {
            Ok((id, Ok(()))) => tracing::info!("light {} updated", id),
            Ok((id, Err(err))) => {
                tracing::error!("updating light {} failed: {}", id, err);
                failed.push(id);
            }
            Err(err) => tracing::error!("light update task failed: {}", err),
        }
    }
    failed
}

fn ready<S>(session: Option<S>) -> Result<S, DispatchError>
where
    S: std::ops::Deref<Target = Session>,
{
    let session = session.to_result(|| DispatchError::NotInitialized)?;
    if session.fixtures.is_empty() {
        return Err(DispatchError::NoFixtures);
    }
    Ok(session)
}
