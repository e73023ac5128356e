use super::clock::Clock;
use super::Millis;
use crate::Event;

use crossbeam_channel::{Sender, TrySendError};
use ordered_float::OrderedFloat;
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Cloneable handle for scheduling events on a [`TimeMachine`] from any thread.
///
/// Actions usually capture a [`Scheduler`] so they can schedule their successors, which is how a simulation keeps
/// itself alive:
///
/// ```
/// use sima::{Scheduler, TimeMachine};
///
/// fn tick(scheduler: Scheduler, remaining: u32) {
///     if remaining > 0 {
///         let next = scheduler.clone();
///         scheduler.schedule(10.0, move || tick(next, remaining - 1));
///     }
/// }
///
/// let machine = TimeMachine::new(1.0, 8, 10);
/// tick(machine.scheduler(), 3);
/// while machine.step() {}
/// assert_eq!(30.0, machine.t());
/// ```
///
/// A handle holds no reference to the machine's control channel, so handles captured by queued actions do not keep a
/// dropped machine's driver loop alive.
///
/// [`TimeMachine`]: crate::TimeMachine
#[derive(Debug, Clone)]
pub struct Scheduler {
    clock: Arc<Clock>,
    submissions: Sender<Event<Millis>>,
}

impl Scheduler {
    pub(super) fn new(clock: Arc<Clock>, submissions: Sender<Event<Millis>>) -> Self {
        Self { clock, submissions }
    }

    /// Schedule `action` to execute `dt` ms of simulation time after the current simulation time.
    ///
    /// A negative or NaN `dt` is treated as `0.0`, with a warning. The event is submitted through the machine's
    /// bounded submission channel: if the channel is full this call blocks until the driver drains it. Nobody drains
    /// it when the caller is an action, whether driven by [`step()`] or running on the driver thread of a started
    /// machine: the call then blocks forever, and a started machine stops answering control requests, [`stop()`]
    /// included. Size the capacity for the largest burst a single action schedules.
    ///
    /// Events scheduled after the machine has stopped are dropped.
    ///
    /// [`step()`]: crate::TimeMachine::step
    /// [`stop()`]: crate::TimeMachine::stop
    pub fn schedule<F>(&self, dt: f64, action: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let time = self.clock.t() + clamp_delay(dt);
        let event = Event::new(OrderedFloat(time), action);

        let event = match self.submissions.try_send(event) {
            Ok(()) => return,
            Err(TrySendError::Full(event)) => {
                if self.blocks_driver() {
                    error!(
                        capacity = ?self.submissions.capacity(),
                        "event submission channel is full and the caller is the driver thread itself; \
                         the time machine is deadlocked"
                    );
                } else {
                    warn!(
                        capacity = ?self.submissions.capacity(),
                        "event submission channel is full; blocking until the driver drains it"
                    );
                }
                event
            },
            Err(TrySendError::Disconnected(_)) => {
                debug!(time, "time machine has stopped; dropping scheduled event");
                return;
            },
        };
        if self.submissions.send(event).is_err() {
            debug!(time, "time machine has stopped; dropping scheduled event");
        }
    }

    /// The current simulation time in ms.
    pub fn t(&self) -> f64 {
        self.clock.t()
    }

    /// Whether a blocking send from this thread would wait on itself to drain the channel.
    fn blocks_driver(&self) -> bool {
        self.clock.is_driver_thread()
    }
}

fn clamp_delay(dt: f64) -> f64 {
    if dt >= 0.0 {
        dt
    } else {
        warn!(dt, "negative delay; scheduling at the current simulation time instead");
        0.0
    }
}
