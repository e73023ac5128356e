mod clock;
mod command;
mod driver;
mod pacing;
mod scheduler;
mod state;

pub use scheduler::Scheduler;
pub use state::State;

use crate::{Error, TimeMachineConfig};
use clock::Clock;
use command::{Command, Request};
use driver::Driver;

use crossbeam_channel::{bounded, Sender};
use ordered_float::OrderedFloat;
use std::fmt::Formatter;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, error, trace, warn};

/// Simulation time in ms, as ordered inside the event queue.
pub(crate) type Millis = OrderedFloat<f64>;

/// The smallest accepted speed. Lower values, including zero and negative speeds, are raised to it.
pub const MIN_SPEED: f64 = 0.01;

/// A discrete-event simulation clock that executes scheduled actions in strict time order.
///
/// Clients schedule zero-argument actions at an offset from the current simulation time, then either
///
/// * call [`step()`] in a loop to execute the whole simulation as fast as possible, ignoring real time entirely, or
/// * call [`start()`] to hand the event queue to a dedicated driver thread, which executes each event once
///   `real time elapsed × speed` has passed its simulation time, and which honours [`pause()`], [`resume()`],
///   [`set_speed()`] and [`stop()`] while it runs.
///
/// Simulation time is measured in milliseconds and only advances when an event executes, to that event's time.
///
/// # Threading
///
/// The driver thread is the only thread that mutates the queue and the clock once the machine has started. Everything
/// else communicates with it through two channels: a bounded submission channel for new events, and a rendezvous
/// channel for control requests. Every control method blocks until the driver has applied or rejected the request, so
/// once a call returns `Ok(())` the new state is already in effect. [`t()`], [`state()`] and [`speed()`] are lock-free
/// snapshot reads.
///
/// The driver wakes once per cycle (the `cycle_time_ms` given at construction) to drain submissions, apply requests
/// and execute due events, so the cycle time bounds how quickly requests are honoured.
///
/// # Usage contract
///
/// Actions run synchronously on the driver thread. A slow or blocking action stalls pacing and request handling until
/// it returns. Actions must not call the control methods of their own machine; such calls are refused with
/// [`Error::Reentrant`]. To schedule from inside an action, capture a [`Scheduler`] from [`scheduler()`] rather than
/// the machine itself.
///
/// Within one action, schedule no more events than `event_capacity`. The submission channel is drained only between
/// actions, so an action that overfills it blocks forever: under [`step()`] the stepping thread hangs, and on a
/// started machine the driver thread hangs and every later control call, [`stop()`] included, never returns.
///
/// [`step()`]: TimeMachine::step
/// [`start()`]: TimeMachine::start
/// [`pause()`]: TimeMachine::pause
/// [`resume()`]: TimeMachine::resume
/// [`set_speed()`]: TimeMachine::set_speed
/// [`stop()`]: TimeMachine::stop
/// [`t()`]: TimeMachine::t
/// [`state()`]: TimeMachine::state
/// [`speed()`]: TimeMachine::speed
/// [`scheduler()`]: TimeMachine::scheduler
pub struct TimeMachine {
    scheduler: Scheduler,
    clock: Arc<Clock>,
    commands: Sender<Request>,
    /// Present until [`start()`](TimeMachine::start) moves it onto the driver thread.
    driver: Mutex<Option<Driver>>,
    driver_thread: Mutex<Option<JoinHandle<()>>>,
}

impl TimeMachine {
    /// Create an idle machine with an empty queue.
    ///
    /// * `speed` is the ratio of simulation time to real time while running; values below [`MIN_SPEED`] are raised to
    ///   it.
    /// * `event_capacity` bounds the submission channel. It should cover the events scheduled before the first
    ///   [`step()`] or cycle, and the largest burst scheduled within a single cycle. Zero is raised to one.
    /// * `cycle_time_ms` is the real time between two wake-ups of the driver loop. Zero is raised to one.
    ///
    /// [`step()`]: TimeMachine::step
    pub fn new(speed: f64, event_capacity: usize, cycle_time_ms: u64) -> Self {
        let speed = clamp_speed(speed);
        let event_capacity = if event_capacity == 0 {
            warn!("event capacity must be at least 1; using 1");
            1
        } else {
            event_capacity
        };
        let cycle_time_ms = if cycle_time_ms == 0 {
            warn!("cycle time must be at least 1 ms; using 1 ms");
            1
        } else {
            cycle_time_ms
        };

        let clock = Arc::new(Clock::new(speed));
        let (submit, submissions) = bounded(event_capacity);
        let (commands, command_receiver) = bounded(0);
        let driver = Driver::new(
            submissions,
            command_receiver,
            Arc::clone(&clock),
            Duration::from_millis(cycle_time_ms),
        );

        Self {
            scheduler: Scheduler::new(Arc::clone(&clock), submit),
            clock,
            commands,
            driver: Mutex::new(Some(driver)),
            driver_thread: Mutex::new(None),
        }
    }

    /// Create an idle machine from a [`TimeMachineConfig`].
    pub fn from_config(config: &TimeMachineConfig) -> Self {
        Self::new(config.speed, config.event_capacity, config.cycle_time_ms)
    }

    /// The current simulation time in ms: the time of the most recently executed event.
    pub fn t(&self) -> f64 {
        self.clock.t()
    }

    /// The current lifecycle state.
    pub fn state(&self) -> State {
        self.clock.state()
    }

    /// The current ratio of simulation time to real time.
    pub fn speed(&self) -> f64 {
        self.clock.speed()
    }

    /// Get a handle that schedules onto this machine. See [`Scheduler`].
    pub fn scheduler(&self) -> Scheduler {
        self.scheduler.clone()
    }

    /// Schedule `action` to execute `dt` ms after the current simulation time. See [`Scheduler::schedule()`].
    pub fn schedule<F>(&self, dt: f64, action: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.scheduler.schedule(dt, action);
    }

    /// Execute the earliest scheduled event, if any, ignoring real time.
    ///
    /// Advances [`t()`] to the event's time, runs its action, then collects the events that action scheduled so that
    /// chained scheduling works without a driver thread. Returns `true` if an event was executed and `false` if the
    /// queue was empty, which makes `while machine.step() {}` run a simulation to completion.
    ///
    /// Once the machine has been started the queue belongs to the driver thread, and this method does nothing.
    ///
    /// [`t()`]: TimeMachine::t
    pub fn step(&self) -> bool {
        let next = match self.lock_driver().as_mut() {
            Some(driver) => driver.take_next(),
            None => {
                warn!(state = %self.state(), "step ignored: the driver loop owns the event queue");
                return false;
            },
        };
        let Some(event) = next else {
            return false;
        };

        trace!(t = event.time().into_inner(), "executing event");
        event.execute();
        if let Some(driver) = self.lock_driver().as_mut() {
            driver.drain_submissions();
        }
        true
    }

    /// Hand the event queue to a new driver thread and begin executing events against real time.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidTransition`] unless the machine is [`Idle`]. Returns [`Error::Disconnected`] if the
    /// driver thread could not be launched, in which case the machine is left [`Stopped`].
    ///
    /// [`Idle`]: State::Idle
    /// [`Stopped`]: State::Stopped
    pub fn start(&self) -> crate::Result {
        let driver = self.lock_driver().take();
        let Some(driver) = driver else {
            // a concurrent start took the driver and has not published Running yet
            let state = match self.state() {
                State::Idle => State::Running,
                state => state,
            };
            return Err(self.rejected(Command::Start, state));
        };

        let (started, started_ack) = bounded(1);
        let spawned = thread::Builder::new()
            .name("time-machine".into())
            .spawn(move || driver.run(started));
        match spawned {
            Ok(handle) => *self.lock_driver_thread() = Some(handle),
            Err(spawn_error) => {
                error!(error = %spawn_error, "failed to launch the time machine driver thread");
                self.clock.set_state(State::Stopped);
                return Err(Error::Disconnected);
            },
        }

        started_ack.recv().unwrap_or(Err(Error::Disconnected))
    }

    /// Hold back due events until [`resume()`](TimeMachine::resume). Real time spent paused does not count towards
    /// the simulation budget.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidTransition`] unless the machine is [`Running`](State::Running).
    pub fn pause(&self) -> crate::Result {
        self.request(Command::Pause)
    }

    /// Continue a paused machine exactly where it left off.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidTransition`] unless the machine is [`Paused`](State::Paused).
    pub fn resume(&self) -> crate::Result {
        self.request(Command::Resume)
    }

    /// Halt the driver loop permanently and wait for its thread to exit. Events still queued are never executed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidTransition`] unless the machine is [`Running`] or [`Paused`].
    ///
    /// [`Running`]: State::Running
    /// [`Paused`]: State::Paused
    pub fn stop(&self) -> crate::Result {
        let outcome = self.request(Command::Stop);
        if outcome.is_ok() {
            self.join_driver_thread();
        }
        outcome
    }

    /// Change the ratio of simulation time to real time. Speeds below [`MIN_SPEED`] are raised to it, with a warning.
    ///
    /// The new speed applies to the whole active real time elapsed so far, not only to the time after the change.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidTransition`] if the machine is [`Stopped`](State::Stopped).
    pub fn set_speed(&self, speed: f64) -> crate::Result {
        self.request(Command::SetSpeed(clamp_speed(speed)))
    }

    /// Submit `command` to the driver loop and wait for its verdict.
    fn request(&self, command: Command) -> crate::Result {
        if self.clock.is_driver_thread() {
            let error = Error::Reentrant {
                command: command.name(),
            };
            warn!(%error, "rejected control request");
            return Err(error);
        }

        // no driver loop is listening in these states
        match self.state() {
            State::Idle => return self.apply_idle(command),
            State::Stopped => return Err(self.rejected(command, State::Stopped)),
            State::Running | State::Paused => {},
        }

        let (reply, outcome) = bounded(1);
        if self.commands.send(Request { command, reply }).is_err() {
            warn!(command = command.name(), "time machine driver loop has exited");
            return Err(Error::Disconnected);
        }
        outcome.recv().unwrap_or(Err(Error::Disconnected))
    }

    fn apply_idle(&self, command: Command) -> crate::Result {
        match command {
            Command::SetSpeed(speed) => {
                self.clock.set_speed(speed);
                debug!(speed, "speed changed");
                Ok(())
            },
            _ => Err(self.rejected(command, State::Idle)),
        }
    }

    fn rejected(&self, command: Command, state: State) -> Error {
        let error = Error::InvalidTransition {
            command: command.name(),
            state,
        };
        warn!(%error, "rejected control request");
        error
    }

    fn join_driver_thread(&self) {
        let handle = self.lock_driver_thread().take();
        if let Some(handle) = handle {
            if handle.join().is_err() {
                warn!("time machine driver thread panicked");
            }
        }
    }

    fn lock_driver(&self) -> MutexGuard<'_, Option<Driver>> {
        self.driver.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_driver_thread(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        self.driver_thread.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for TimeMachine {
    fn default() -> Self {
        Self::from_config(&TimeMachineConfig::default())
    }
}

impl std::fmt::Debug for TimeMachine {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        f.debug_struct("TimeMachine")
            .field("t", &self.t())
            .field("state", &self.state())
            .field("speed", &self.speed())
            .finish_non_exhaustive()
    }
}

impl std::fmt::Display for TimeMachine {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "TimeMachine {} at time {} ms, speed {}", self.state(), self.t(), self.speed())
    }
}

fn clamp_speed(speed: f64) -> f64 {
    if speed >= MIN_SPEED {
        speed
    } else {
        warn!(speed, min = MIN_SPEED, "speed below minimum; clamping");
        MIN_SPEED
    }
}
