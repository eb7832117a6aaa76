pub mod midir;
#[cfg(test)]
pub mod stubs;

use crate::midi::model::MidiEvent;

pub type EventSender = async_channel::Sender<MidiEvent>;
pub type EventReceiver = async_channel::Receiver<MidiEvent>;

/// Decodes one raw message and queues it for dispatch. Messages the lights don't react to are dropped.
pub fn forward(bytes: &[u8], sender: &EventSender) -> bool {
    match MidiEvent::from_bytes(bytes) {
        Some(event) => {
            tracing::trace!("MIDI in {:02X?} -> {:?}", bytes, event);
            // Unbounded, so this only fails once the dispatcher is gone.
            match sender.try_send(event) {
                Ok(()) => true,
                Err(err) => {
                    tracing::warn!("dropping {:?}: event queue closed", err.into_inner());
                    false
                }
            }
        }
        None => false,
    }
}
