use std::time::{Duration, Instant};

/// Real-time bookkeeping of the driver loop.
///
/// Time spent paused accumulates into `paused_offset` and is excluded from the elapsed real time, so a resumed machine
/// continues from where it paused instead of jumping ahead to catch up.
#[derive(Debug, Clone)]
pub(super) struct Pacing {
    started_at: Instant,
    paused_at: Option<Instant>,
    paused_offset: Duration,
}

impl Pacing {
    pub fn new(started_at: Instant) -> Self {
        Self {
            started_at,
            paused_at: None,
            paused_offset: Duration::ZERO,
        }
    }

    pub fn pause(&mut self, now: Instant) {
        self.paused_at = Some(now);
    }

    pub fn resume(&mut self, now: Instant) {
        if let Some(paused_at) = self.paused_at.take() {
            self.paused_offset += now.saturating_duration_since(paused_at);
        }
    }

    /// Real time elapsed since start, excluding every completed pause.
    pub fn active_real_time(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.started_at)
            .saturating_sub(self.paused_offset)
    }

    /// Simulation time in ms that real time has caught up with at `speed`. Events strictly earlier than the budget are
    /// due.
    pub fn budget(&self, now: Instant, speed: f64) -> f64 {
        as_millis_f64(self.active_real_time(now)) * speed
    }
}

fn as_millis_f64(duration: Duration) -> f64 {
    duration.as_nanos() as f64 / 1_000_000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(millis: u64) -> Duration {
        Duration::from_millis(millis)
    }

    #[test]
    fn budget_scales_with_speed() {
        let origin = Instant::now();
        let pacing = Pacing::new(origin);
        assert_eq!(0.0, pacing.budget(origin, 2.0));
        assert_eq!(200.0, pacing.budget(origin + ms(100), 2.0));
        assert_eq!(50.0, pacing.budget(origin + ms(100), 0.5));
    }

    #[test]
    fn pauses_are_excluded_from_budget() {
        let origin = Instant::now();
        let mut pacing = Pacing::new(origin);
        pacing.pause(origin + ms(100));
        pacing.resume(origin + ms(150));
        assert_eq!(ms(150), pacing.active_real_time(origin + ms(200)));

        pacing.pause(origin + ms(300));
        pacing.resume(origin + ms(400));
        assert_eq!(150.0, pacing.budget(origin + ms(300), 1.0), "offset should accumulate across pauses");
        assert_eq!(ms(250), pacing.active_real_time(origin + ms(400)));
    }

    #[test]
    fn resume_without_pause_changes_nothing() {
        let origin = Instant::now();
        let mut pacing = Pacing::new(origin);
        pacing.resume(origin + ms(50));
        assert_eq!(ms(80), pacing.active_real_time(origin + ms(80)));
    }
}
