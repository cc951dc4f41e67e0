//! The pluggable trigger abstraction [`RateLimiterWorker`](crate::RateLimiterWorker) uses to
//! re-arm its weight-reset loop (spec §6, §9: "a fixed-delay, periodic, and cron-style trigger
//! must all be accepted").

use std::fmt;
use std::time::Instant;

/// Threads the last-scheduled and last-actually-completed reset instants through successive
/// [`Trigger::next_execution`] calls, per spec §6.
#[derive(Debug, Clone, Copy, Default)]
pub struct TriggerContext {
    /// The instant the most recent reset was armed for.
    pub last_scheduled: Option<Instant>,
    /// The instant the most recent reset actually fired.
    pub last_completed: Option<Instant>,
}

/// A black box that, given the context of prior firings, returns the next firing instant, or
/// `None` to stop re-arming.
pub trait Trigger: Send + Sync {
    /// The next instant this trigger should fire, or `None` if it has no more firings.
    fn next_execution(&self, ctx: &TriggerContext) -> Option<Instant>;
}

/// Next execution is `delay` after the previous one *completed* (or `delay` from now, for the
/// first firing) — a trigger that never overlaps itself even if a reset handler runs long.
#[derive(Debug, Clone, Copy)]
pub struct FixedDelayTrigger {
    /// Delay after the previous firing completed.
    pub delay: std::time::Duration,
}

impl Trigger for FixedDelayTrigger {
    fn next_execution(&self, ctx: &TriggerContext) -> Option<Instant> {
        let base = ctx.last_completed.unwrap_or_else(Instant::now);
        Some(base + self.delay)
    }
}

/// Next execution is `period` after the previous one was *scheduled* — a trigger that catches up
/// to a fixed cadence even if an individual firing ran slow.
#[derive(Debug, Clone, Copy)]
pub struct PeriodicTrigger {
    /// Period between scheduled firings.
    pub period: std::time::Duration,
}

impl Trigger for PeriodicTrigger {
    fn next_execution(&self, ctx: &TriggerContext) -> Option<Instant> {
        let base = ctx.last_scheduled.unwrap_or_else(Instant::now);
        Some(base + self.period)
    }
}

/// A thin wrapper over a caller-supplied "next fire after this instant" function, rather than
/// vendoring a cron expression parser: no cron-parsing crate is part of this workspace's
/// dependency stack, and the spec treats the trigger as a pluggable black box, not a feature this
/// library implements. Callers wanting real cron syntax plug in a crate like `cron` or `saffron`
/// and adapt its "next occurrence" query to this closure shape.
pub struct CronTrigger {
    next_fn: Box<dyn Fn(Instant) -> Option<Instant> + Send + Sync>,
}

impl CronTrigger {
    /// Wrap `next_fn`, called with the previous scheduled instant (or "now" for the first
    /// firing) to produce the next one.
    pub fn new(next_fn: impl Fn(Instant) -> Option<Instant> + Send + Sync + 'static) -> Self {
        Self {
            next_fn: Box::new(next_fn),
        }
    }
}

impl fmt::Debug for CronTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CronTrigger").finish_non_exhaustive()
    }
}

impl Trigger for CronTrigger {
    fn next_execution(&self, ctx: &TriggerContext) -> Option<Instant> {
        let base = ctx.last_scheduled.unwrap_or_else(Instant::now);
        (self.next_fn)(base)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn fixed_delay_uses_last_completed() {
        let trigger = FixedDelayTrigger {
            delay: Duration::from_millis(100),
        };
        let completed = Instant::now();
        let ctx = TriggerContext {
            last_scheduled: Some(completed - Duration::from_millis(50)),
            last_completed: Some(completed),
        };
        assert_eq!(trigger.next_execution(&ctx), Some(completed + Duration::from_millis(100)));
    }

    #[test]
    fn periodic_uses_last_scheduled() {
        let trigger = PeriodicTrigger {
            period: Duration::from_millis(100),
        };
        let scheduled = Instant::now();
        let ctx = TriggerContext {
            last_scheduled: Some(scheduled),
            last_completed: Some(scheduled + Duration::from_millis(80)),
        };
        assert_eq!(trigger.next_execution(&ctx), Some(scheduled + Duration::from_millis(100)));
    }

    #[test]
    fn cron_trigger_delegates_to_closure() {
        let trigger = CronTrigger::new(|from| Some(from + Duration::from_secs(1)));
        let now = Instant::now();
        let ctx = TriggerContext {
            last_scheduled: Some(now),
            last_completed: None,
        };
        assert_eq!(trigger.next_execution(&ctx), Some(now + Duration::from_secs(1)));
    }
}
