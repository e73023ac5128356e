#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Check whether two floats have a relative difference of at most 5e-5 times the smaller value.
#[macro_export]
macro_rules! assert_floats_near_equal {
    ($val1:expr, $val2:expr, $msg:expr) => {{
        let a: f64 = $val1;
        let b: f64 = $val2;
        let diff = (a - b).abs();
        let relative_diff = if a.abs() < b.abs() { diff / a.abs() } else { diff / b.abs() };
        assert!(relative_diff < 0.00005, "{}: {} vs {}", $msg, a, b);
    }};
}

/// Route library logs to the test harness. Set `RUST_LOG` to see them.
pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Shared record of the simulation times at which actions ran.
#[derive(Clone, Default)]
pub struct Record(Arc<Mutex<Vec<f64>>>);

impl Record {
    pub fn push(&self, t: f64) {
        self.0.lock().unwrap().push(t);
    }

    pub fn times(&self) -> Vec<f64> {
        self.0.lock().unwrap().clone()
    }

    pub fn len(&self) -> usize {
        self.0.lock().unwrap().len()
    }

    pub fn contains(&self, t: f64) -> bool {
        self.0.lock().unwrap().contains(&t)
    }
}

/// Poll `condition` every millisecond until it holds or `timeout` elapses. Returns whether it held.
pub fn wait_for(timeout: Duration, condition: impl Fn() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(1));
    }
    condition()
}

pub fn assert_non_decreasing(times: &[f64]) {
    for pair in times.windows(2) {
        assert!(pair[0] <= pair[1], "events executed out of order: {} before {}", pair[0], pair[1]);
    }
}
