use super::clock::Clock;
use super::command::{Command, Request};
use super::pacing::Pacing;
use super::{Millis, State};
use crate::{Event, EventQueue};

use crossbeam_channel::{Receiver, Sender, TryRecvError};
use std::ops::ControlFlow;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, trace, warn};

/// Sole owner of the event queue.
///
/// Before the machine starts, the [`Driver`] sits in the [`TimeMachine`] and serves [`step()`] calls. Starting the
/// machine moves it onto the driver thread, where [`run()`] keeps it until the loop exits.
///
/// [`TimeMachine`]: crate::TimeMachine
/// [`step()`]: crate::TimeMachine::step
/// [`run()`]: Driver::run
#[derive(Debug)]
pub(super) struct Driver {
    queue: EventQueue<Millis>,
    submissions: Receiver<Event<Millis>>,
    commands: Receiver<Request>,
    clock: Arc<Clock>,
    cycle_time: Duration,
}

impl Driver {
    pub fn new(
        submissions: Receiver<Event<Millis>>,
        commands: Receiver<Request>,
        clock: Arc<Clock>,
        cycle_time: Duration,
    ) -> Self {
        Self {
            queue: EventQueue::new(),
            submissions,
            commands,
            clock,
            cycle_time,
        }
    }

    /// Move every event currently waiting in the submission channel into the queue without blocking.
    pub fn drain_submissions(&mut self) -> usize {
        let mut drained = 0;
        while let Ok(event) = self.submissions.try_recv() {
            self.queue.add(event);
            drained += 1;
        }
        drained
    }

    /// Pop the earliest event and advance the clock to its time, leaving execution to the caller.
    ///
    /// An event computed from a clock reading that went stale before it was drained may be earlier than the current
    /// time. It still executes, but the clock never moves backwards.
    pub fn take_next(&mut self) -> Option<Event<Millis>> {
        self.drain_submissions();
        let event = self.queue.next()?;
        let time = event.time().into_inner();
        let now = self.clock.t();
        if time >= now {
            self.clock.set_t(time);
        } else {
            debug!(time, t = now, "event submitted behind the clock; executing at current time");
        }
        Some(event)
    }

    /// Execute the earliest event, then collect whatever it scheduled. Returns whether an event ran.
    pub fn step(&mut self) -> bool {
        match self.take_next() {
            Some(event) => {
                trace!(t = event.time().into_inner(), "executing event");
                event.execute();
                self.drain_submissions();
                true
            },
            None => false,
        }
    }

    /// Drive the simulation against real time until stopped.
    ///
    /// Marks the machine [`Running`] and anchors the real-time origin, then acknowledges through `started` before
    /// entering the cycle loop. Each cycle drains submissions, applies pending commands and executes every event whose
    /// time is below the simulation budget.
    ///
    /// [`Running`]: State::Running
    pub fn run(mut self, started: Sender<crate::Result>) {
        let _stopped = MarkStoppedOnExit(Arc::clone(&self.clock));
        self.clock.mark_driver_thread();

        let ticker = crossbeam_channel::tick(self.cycle_time);
        let mut pacing = Pacing::new(Instant::now());
        self.clock.set_state(State::Running);
        debug!(
            speed = self.clock.speed(),
            cycle_time_ms = self.cycle_time.as_millis() as u64,
            pending = self.queue.len(),
            "time machine started"
        );
        let _ = started.send(Ok(()));

        while let Ok(now) = ticker.recv() {
            self.drain_submissions();
            if self.drain_commands(now, &mut pacing).is_break() {
                break;
            }
            if self.clock.state() != State::Running {
                continue;
            }

            let budget = pacing.budget(now, self.clock.speed());
            while self.queue.peek_time().is_some_and(|next| next.into_inner() < budget) {
                self.step();
            }
        }
        debug!(t = self.clock.t(), pending = self.queue.len(), "time machine driver loop exited");
    }

    fn drain_commands(&mut self, now: Instant, pacing: &mut Pacing) -> ControlFlow<()> {
        loop {
            match self.commands.try_recv() {
                Ok(Request { command, reply }) => {
                    let outcome = self.apply(command, now, pacing);
                    let stopping = outcome.is_ok() && command == Command::Stop;
                    let _ = reply.send(outcome);
                    if stopping {
                        return ControlFlow::Break(());
                    }
                },
                Err(TryRecvError::Empty) => return ControlFlow::Continue(()),
                Err(TryRecvError::Disconnected) => {
                    debug!("time machine handle dropped; stopping driver loop");
                    return ControlFlow::Break(());
                },
            }
        }
    }

    fn apply(&mut self, command: Command, now: Instant, pacing: &mut Pacing) -> crate::Result {
        let from = self.clock.state();
        let to = from.transition(command).map_err(|error| {
            warn!(%error, "rejected control request");
            error
        })?;

        match command {
            Command::Pause => pacing.pause(now),
            Command::Resume => pacing.resume(now),
            Command::SetSpeed(speed) => {
                self.clock.set_speed(speed);
                debug!(speed, "speed changed");
            },
            Command::Start | Command::Stop => {},
        }
        if from != to {
            self.clock.set_state(to);
            debug!(%from, %to, t = self.clock.t(), "time machine transition");
        }
        Ok(())
    }
}

/// Publishes [`State::Stopped`] when the driver thread leaves [`Driver::run()`], whether by `stop`, by the machine
/// being dropped, or by an action panicking.
struct MarkStoppedOnExit(Arc<Clock>);

impl Drop for MarkStoppedOnExit {
    fn drop(&mut self) {
        self.0.set_state(State::Stopped);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::bounded;
    use ordered_float::OrderedFloat;
    use std::sync::Mutex;

    struct Harness {
        driver: Driver,
        submit: Sender<Event<Millis>>,
        _commands: Sender<Request>,
        clock: Arc<Clock>,
    }

    fn harness() -> Harness {
        let (submit, submissions) = bounded(16);
        let (commands_tx, commands) = bounded(0);
        let clock = Arc::new(Clock::new(1.0));
        let driver = Driver::new(submissions, commands, Arc::clone(&clock), Duration::from_millis(1));
        Harness {
            driver,
            submit,
            _commands: commands_tx,
            clock,
        }
    }

    #[test]
    fn step_drains_submissions_before_popping() {
        let mut harness = harness();
        let log = Arc::new(Mutex::new(Vec::new()));
        for time in [30.0, 10.0, 20.0] {
            let log = Arc::clone(&log);
            harness
                .submit
                .send(Event::new(OrderedFloat(time), move || log.lock().unwrap().push(time)))
                .unwrap();
        }

        while harness.driver.step() {}

        assert_eq!(vec![10.0, 20.0, 30.0], *log.lock().unwrap());
        assert_eq!(30.0, harness.clock.t());
    }

    #[test]
    fn step_on_empty_queue_leaves_clock_alone() {
        let mut harness = harness();
        harness.clock.set_t(42.0);
        assert!(!harness.driver.step());
        assert_eq!(42.0, harness.clock.t());
    }

    #[test]
    fn apply_mutates_only_on_valid_transitions() {
        let mut harness = harness();
        let origin = Instant::now();
        let mut pacing = Pacing::new(origin);
        harness.clock.set_state(State::Running);

        assert_eq!(Ok(()), harness.driver.apply(Command::Pause, origin, &mut pacing));
        assert_eq!(State::Paused, harness.clock.state());
        assert!(harness.driver.apply(Command::Pause, origin, &mut pacing).is_err());
        assert_eq!(State::Paused, harness.clock.state());

        assert_eq!(Ok(()), harness.driver.apply(Command::SetSpeed(4.0), origin, &mut pacing));
        assert_eq!(4.0, harness.clock.speed());
        assert_eq!(State::Paused, harness.clock.state());

        let later = origin + Duration::from_millis(40);
        assert_eq!(Ok(()), harness.driver.apply(Command::Resume, later, &mut pacing));
        assert_eq!(State::Running, harness.clock.state());
        assert_eq!(Duration::ZERO, pacing.active_real_time(later));
    }
}
