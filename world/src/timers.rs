//! Wall-clock timers that gate the periodic effects of a level.

use std::time::Duration;

use crate::config::GameConfig;

/// Periodic timer anchored on its first observation.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Cadence {
    interval: Duration,
    last: Option<Duration>,
}

impl Cadence {
    pub(crate) const fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: None,
        }
    }

    pub(crate) fn reset(&mut self) {
        self.last = None;
    }

    /// Reports whether the interval elapsed, restarting the period when it did.
    pub(crate) fn fire(&mut self, now: Duration) -> bool {
        let Some(last) = self.last else {
            self.last = Some(now);
            return false;
        };
        if now.saturating_sub(last) < self.interval {
            return false;
        }
        self.last = Some(now);
        true
    }
}

/// Rate limiter that starts ready.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Cooldown {
    period: Duration,
    last: Option<Duration>,
}

impl Cooldown {
    pub(crate) const fn new(period: Duration) -> Self {
        Self { period, last: None }
    }

    pub(crate) fn reset(&mut self) {
        self.last = None;
    }

    pub(crate) fn try_trigger(&mut self, now: Duration) -> bool {
        if let Some(last) = self.last {
            if now.saturating_sub(last) < self.period {
                return false;
            }
        }
        self.last = Some(now);
        true
    }
}

/// Every timer owned by a running level.
#[derive(Clone, Copy, Debug)]
pub(crate) struct GameClock {
    pub(crate) auto_step: Cadence,
    pub(crate) wall_rise: Cadence,
    pub(crate) shot: Cooldown,
}

impl GameClock {
    pub(crate) fn new(config: &GameConfig) -> Self {
        Self {
            auto_step: Cadence::new(config.auto_step_interval()),
            wall_rise: Cadence::new(config.rise_interval()),
            shot: Cooldown::new(config.shot_cooldown()),
        }
    }

    pub(crate) fn reset(&mut self) {
        self.auto_step.reset();
        self.wall_rise.reset();
        self.shot.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    #[test]
    fn cadence_anchors_on_first_tick() {
        let mut cadence = Cadence::new(ms(500));
        assert!(!cadence.fire(ms(10_000)));
        assert!(!cadence.fire(ms(10_499)));
        assert!(cadence.fire(ms(10_500)));
    }

    #[test]
    fn cadence_restarts_from_the_firing_tick() {
        let mut cadence = Cadence::new(ms(500));
        let _ = cadence.fire(ms(0));
        assert!(cadence.fire(ms(730)));
        assert!(!cadence.fire(ms(1_000)));
        assert!(cadence.fire(ms(1_230)));
    }

    #[test]
    fn reset_requires_a_new_anchor() {
        let mut cadence = Cadence::new(ms(100));
        let _ = cadence.fire(ms(0));
        cadence.reset();
        assert!(!cadence.fire(ms(5_000)));
    }

    #[test]
    fn cooldown_starts_ready_and_blocks_rapid_fire() {
        let mut cooldown = Cooldown::new(ms(200));
        assert!(cooldown.try_trigger(ms(50)));
        assert!(!cooldown.try_trigger(ms(249)));
        assert!(cooldown.try_trigger(ms(250)));
    }
}
