use crate::midi::controller::{forward, EventSender};

/// Plays back raw messages as if a controller had sent them.
pub struct Replay(Vec<Vec<u8>>);

impl Replay {
    pub fn new<I>(messages: I) -> Replay
    where
        I: IntoIterator<Item = Vec<u8>>,
    {
        Replay(messages.into_iter().collect())
    }

    /// Returns how many messages were queued.
    pub fn play(&self, sender: &EventSender) -> usize {
        self.0
            .iter()
            .filter(|bytes| forward(bytes, sender))
            .count()
    }
}
