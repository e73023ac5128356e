//! This example schedules a ping/pong pair that keep each other alive: each ping schedules a pong 20 ms of simulation
//! time later, and each pong schedules the next ping 80 ms after that. The time machine paces them against real time,
//! pauses halfway through to show that the simulation resumes where it left off, then stops.
//!
//! Pass the path of a TOML file to override the time machine configuration, e.g.
//!
//! ```toml
//! speed = 2.0
//! event_capacity = 16
//! cycle_time_ms = 1
//! ```
//!
//! Set `RUST_LOG=sima=debug` to see the driver's state transitions.

use sima::{Scheduler, TimeMachine, TimeMachineConfig};
use std::thread::sleep;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

fn ping(scheduler: Scheduler) {
    println!("{} : Ping!", scheduler.t());
    let next = scheduler.clone();
    scheduler.schedule(20.0, move || pong(next));
}

fn pong(scheduler: Scheduler) {
    println!("{} : Pong!", scheduler.t());
    let next = scheduler.clone();
    scheduler.schedule(80.0, move || ping(next));
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => TimeMachineConfig::load(path)?,
        None => TimeMachineConfig::default(),
    };
    tracing::info!(?config, "starting the time machine");

    let machine = TimeMachine::from_config(&config);
    let scheduler = machine.scheduler();
    machine.schedule(0.0, move || ping(scheduler));

    machine.start()?;
    sleep(Duration::from_millis(500));
    machine.pause()?;
    tracing::info!(t = machine.t(), "paused");
    sleep(Duration::from_millis(500));
    machine.resume()?;
    tracing::info!(t = machine.t(), "resumed");
    sleep(Duration::from_millis(500));
    machine.stop()?;

    println!("stopped at simulation time {} ms", machine.t());
    Ok(())
}
