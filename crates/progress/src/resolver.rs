//! Current iteration resolution.

use chrono::{Duration, NaiveDateTime, NaiveTime};
use sprintdigest_core::{IterationDef, IterationId, Time};
use tracing::{debug, warn};

/// Default iteration length in days.
pub const DEFAULT_ITERATION_DAYS: u32 = 14;

/// The time span covered by an iteration. Both bounds are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IterationWindow {
    /// Midnight of the start date
    pub start: NaiveDateTime,

    /// Midnight of the start date plus the iteration length
    pub end: NaiveDateTime,
}

impl IterationWindow {
    /// Whether `at` falls inside the window.
    pub fn contains(&self, at: NaiveDateTime) -> bool {
        self.start <= at && at <= self.end
    }
}

/// Resolves which iteration is active at a given time.
#[derive(Debug, Clone, Copy)]
pub struct IterationResolver {
    length_days: u32,
}

impl IterationResolver {
    /// Resolver for iterations of the given length.
    pub fn with_length(length_days: u32) -> Self {
        Self { length_days }
    }

    /// Compute the window of an iteration.
    ///
    /// An end past the representable calendar leaves the window open-ended.
    pub fn window(&self, iteration: &IterationDef) -> IterationWindow {
        let start = iteration.start_date.and_time(NaiveTime::MIN);
        let end = start
            .checked_add_signed(Duration::days(i64::from(self.length_days)))
            .unwrap_or(NaiveDateTime::MAX);
        IterationWindow { start, end }
    }

    /// Find the iteration active at `now`.
    ///
    /// When several windows contain `now`, the one that started last wins;
    /// equal start dates keep the first in input order.
    pub fn resolve<'a>(&self, iterations: &'a [IterationDef], now: Time) -> Option<&'a IterationDef> {
        let at = now.naive_utc();
        let mut current: Option<&IterationDef> = None;
        let mut matches = 0usize;

        for iteration in iterations {
            if !self.window(iteration).contains(at) {
                continue;
            }
            matches += 1;
            debug!("Iteration {} contains {}", iteration.id, at);

            match current {
                Some(best) if best.start_date >= iteration.start_date => {}
                _ => current = Some(iteration),
            }
        }

        if matches > 1 {
            if let Some(chosen) = current {
                warn!(
                    "{} iterations overlap at {}; using {} (latest start {})",
                    matches, at, chosen.id, chosen.start_date
                );
            }
        }

        current
    }
}

impl Default for IterationResolver {
    fn default() -> Self {
        Self::with_length(DEFAULT_ITERATION_DAYS)
    }
}

/// Resolve the current iteration id with the default 14-day length.
pub fn resolve_current(iterations: &[IterationDef], now: Time) -> Option<IterationId> {
    IterationResolver::default()
        .resolve(iterations, now)
        .map(|iteration| iteration.id.clone())
}
