use crate::midi::controller::{forward, EventSender};

#[derive(Debug, thiserror::Error)]
pub enum ListenError {
    #[error("MIDI init error: {0}")]
    Init(#[from] midir::InitError),
    #[error("please connect a midi device and restart application")]
    NoPorts,
    #[error("no MIDI input port with index {0}")]
    InvalidPort(usize),
    #[error("Couldn't connect to {port}: {reason}")]
    Connect { port: String, reason: String },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PortInfo {
    pub index: usize,
    pub name: String,
}

/// Live input connection. Events flow for as long as this value is alive.
pub struct MidirBased {
    pub port_name: String,
    _connection: midir::MidiInputConnection<()>,
}

impl MidirBased {
    pub fn ports(client_name: &str) -> Result<Vec<PortInfo>, ListenError> {
        let midi_in = midir::MidiInput::new(client_name)?;
        let ports = midi_in
            .ports()
            .iter()
            .enumerate()
            .map(|(index, port)| PortInfo {
                index,
                name: midi_in
                    .port_name(port)
                    .unwrap_or_else(|_| format!("Unknown Device {index}")),
            })
            .collect();
        Ok(ports)
    }

    pub fn connect(
        client_name: &str,
        port_index: usize,
        sender: EventSender,
    ) -> Result<MidirBased, ListenError> {
        let midi_in = midir::MidiInput::new(client_name)?;
        let ports = midi_in.ports();
        let port = ports
            .get(port_index)
            .ok_or(ListenError::InvalidPort(port_index))?;
        let port_name = midi_in
            .port_name(port)
            .unwrap_or_else(|_| format!("Unknown Device {port_index}"));

        let connection = midi_in
            .connect(
                port,
                &format!("{client_name}-in"),
                move |_timestamp, bytes, _| {
                    forward(bytes, &sender);
                },
                (),
            )
            .map_err(|err| ListenError::Connect {
                port: port_name.clone(),
                reason: err.to_string(),
            })?;

        Ok(MidirBased {
            port_name,
            _connection: connection,
        })
    }
}
