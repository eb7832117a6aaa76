mod cli;
mod color;
mod configuration;
mod dispatcher;
mod extensions;
mod fixture;
mod hue;
mod logging;
mod midi;
mod setup;
mod worker;

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;

use crate::cli::Cli;
use crate::dispatcher::{DispatcherHubClient, EventDispatcher};
use crate::hue::reqwest_based::ReqwestBased;
use crate::hue::stubs::Dummy;
use crate::midi::controller::midir::{ListenError, MidirBased};
use crate::setup::prompt::{ask_until, Prompter, Terminal};
use crate::setup::Setup;
use crate::worker::Worker;

const CLIENT_NAME: &str = "midi_hue";
/// How long pending light updates may take once Ctrl-C was pressed.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

fn select_port<P: Prompter>(cli: &Cli, prompter: &mut P) -> anyhow::Result<usize> {
    let ports = MidirBased::ports(CLIENT_NAME)?;
    for port in &ports {
        println!("{} : {}", port.index, port.name);
    }
    let last = ports.len().checked_sub(1).ok_or(ListenError::NoPorts)?;

    match cli.port {
        Some(index) => Ok(index),
        None => Ok(ask_until(
            prompter,
            &format!("select port [0-{last}]: "),
            |answer| answer.parse::<usize>().ok().filter(|index| *index <= last),
        )?),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(&cli.log_level)?;

    let hub: DispatcherHubClient = if cli.is_local() {
        tracing::info!("local debugging session detected");
        Arc::new(Dummy)
    } else {
        Arc::new(ReqwestBased::new()?)
    };

    let mut terminal = Terminal;
    let session = Setup::new(hub.as_ref(), &mut terminal, cli.config_path(), cli.overrides())
        .run()
        .await?;
    let dispatcher = EventDispatcher::with_session(hub.clone(), session, cli.warm_white);

    let port = select_port(&cli, &mut terminal)?;
    let (sender, receiver) = async_channel::unbounded();
    let input = MidirBased::connect(CLIENT_NAME, port, sender)?;
    let worker = Worker::start_worker(dispatcher, receiver);
    tracing::info!("listening for MIDI from {}", input.port_name);

    tokio::signal::ctrl_c().await?;
    tracing::info!("shutting down");
    // Closing the input closes the queue, which lets the worker finish.
    drop(input);
    match worker.0.await {
        Ok(mut dispatcher) => {
            if tokio::time::timeout(SHUTDOWN_GRACE, dispatcher.flush()).await.is_err() {
                tracing::warn!("giving up on light updates the bridge never answered");
            }
        }
        Err(err) => tracing::error!("event worker stopped abnormally: {}", err),
    }

    Ok(())
}
