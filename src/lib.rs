//! # Overview
//!
//! sima is a discrete-event simulation engine. Clients schedule zero-argument actions at an offset from the current
//! simulation time, and a [`TimeMachine`] executes them in strict time order, either as fast as possible or paced to
//! wall-clock time at a configurable speed, with live pause, resume and stop control.
//!
//! Two constructs make up the engine:
//!
//! * The [`EventQueue`] is a binary min-heap of `(time, action)` pairs, usable on its own with any [`SimTime`]. Ties
//!   between equal times are broken by insertion order.
//! * The [`TimeMachine`] owns one queue and the simulation clock. Driven by [`TimeMachine::step()`], it executes one
//!   event per call and ignores real time, which makes a run fully reproducible. Once [`started`], a dedicated driver
//!   thread takes over the queue and executes each event when `real time elapsed × speed` passes its time. Pauses are
//!   excluded from the elapsed real time, so a resumed simulation continues exactly where it left off.
//!
//! ```
//! use std::sync::{Arc, Mutex};
//! use sima::TimeMachine;
//!
//! let machine = TimeMachine::new(1.0, 16, 10);
//! let log = Arc::new(Mutex::new(Vec::new()));
//! for dt in [30.0, 10.0, 20.0] {
//!     let log = Arc::clone(&log);
//!     let scheduler = machine.scheduler();
//!     machine.schedule(dt, move || log.lock().unwrap().push(scheduler.t()));
//! }
//!
//! while machine.step() {}
//! assert_eq!(vec![10.0, 20.0, 30.0], *log.lock().unwrap());
//! ```
//!
//! # Logging
//!
//! sima reports clamped inputs, rejected control requests and driver lifecycle through [`tracing`]. It never installs a
//! subscriber; attach one in your binary to see these messages.
//!
//! [`started`]: TimeMachine::start
//! [`tracing`]: https://docs.rs/tracing

mod config;
mod error;
mod events;
mod generic_parameters;
mod time_machine;

pub use config::{ConfigError, TimeMachineConfig};
pub use error::{Error, Result};
pub use events::{Action, Event, EventQueue};
pub use generic_parameters::SimTime;
pub use time_machine::{Scheduler, State, TimeMachine, MIN_SPEED};
