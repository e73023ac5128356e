use super::State;
use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};
use std::sync::OnceLock;
use std::thread::{self, ThreadId};

/// Snapshot of the time machine's clock, published for lock-free reads from any thread.
///
/// Once the machine has started, only the driver thread writes here. Before that, the thread calling
/// [`TimeMachine::step()`](crate::TimeMachine::step) writes `t` and callers of `set_speed` write `speed`.
#[derive(Debug)]
pub(crate) struct Clock {
    /// Simulation time in ms, stored as `f64` bits.
    t: AtomicU64,
    /// Simulation ms per real ms, stored as `f64` bits.
    speed: AtomicU64,
    state: AtomicU8,
    driver_thread: OnceLock<ThreadId>,
}

impl Clock {
    pub fn new(speed: f64) -> Self {
        Self {
            t: AtomicU64::new(0.0_f64.to_bits()),
            speed: AtomicU64::new(speed.to_bits()),
            state: AtomicU8::new(State::Idle as u8),
            driver_thread: OnceLock::new(),
        }
    }

    pub fn t(&self) -> f64 {
        f64::from_bits(self.t.load(Ordering::Acquire))
    }

    pub fn set_t(&self, t: f64) {
        self.t.store(t.to_bits(), Ordering::Release);
    }

    pub fn speed(&self) -> f64 {
        f64::from_bits(self.speed.load(Ordering::Acquire))
    }

    pub fn set_speed(&self, speed: f64) {
        self.speed.store(speed.to_bits(), Ordering::Release);
    }

    pub fn state(&self) -> State {
        State::from_repr(self.state.load(Ordering::Acquire))
    }

    pub fn set_state(&self, state: State) {
        self.state.store(state as u8, Ordering::Release);
    }

    /// Record the calling thread as the driver thread. Only the first call has any effect.
    pub fn mark_driver_thread(&self) {
        let _ = self.driver_thread.set(thread::current().id());
    }

    pub fn is_driver_thread(&self) -> bool {
        self.driver_thread.get() == Some(&thread::current().id())
    }
}
