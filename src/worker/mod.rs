use tokio::spawn;
use tokio::task::JoinHandle;

use crate::dispatcher::{DispatchOutcome, EventDispatcher};
use crate::midi::controller::EventReceiver;

/// Handle of the task that owns the dispatcher. Resolves to it once the event queue closes.
pub struct Worker(pub JoinHandle<EventDispatcher>);

impl Worker {
    pub fn start_worker(mut dispatcher: EventDispatcher, events: EventReceiver) -> Worker {
        Worker(spawn(async move {
            while let Ok(event) = events.recv().await {
                // A failed event must not take the listener down with it.
                match dispatcher.handle(event) {
                    Ok(DispatchOutcome::Ignored(reason)) => tracing::debug!("ignored: {:?}", reason),
                    Ok(DispatchOutcome::Routed(assignments)) => {
                        tracing::debug!("{} channel(s) updated", assignments.len())
                    }
                    Ok(DispatchOutcome::Broadcast(broadcast)) => {
                        tracing::info!("sending {} light states", broadcast.states.len())
                    }
                    Err(err) => tracing::error!("{}: {:?}", err, event),
                }
            }
            dispatcher
        }))
    }
}
