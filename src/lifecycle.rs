//! Order lifecycle
//!
//! An order's status is a pure function of the time elapsed since it was placed. The
//! [`StatusTimeline`] maps elapsed time to a status and an estimate of minutes remaining; the
//! [`OrderTracker`] remembers the last status it reported so callers see every step exactly once
//! and never see a status go backwards. Rebuilding a tracker from the placement time picks up
//! where the old one left off.

use jiff::{SignedDuration, Timestamp};
use smallvec::SmallVec;
use thiserror::Error;
use tracing::info;

use crate::orders::{OrderId, OrderStatus};

/// Invalid timeline definitions.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LifecycleError {
    /// The timeline must list each status exactly once.
    #[error("timeline needs one step per status, got {0}")]
    StepCount(usize),

    /// Steps must follow status order.
    #[error("step {index} is {found}, expected {expected}")]
    OutOfOrder {
        /// Position in the timeline
        index: usize,
        /// Status expected at this position
        expected: OrderStatus,
        /// Status found
        found: OrderStatus,
    },

    /// The first step must be reached immediately.
    #[error("timeline must start at offset zero")]
    NonZeroStart,

    /// Offsets must strictly increase.
    #[error("{status} must come strictly after {previous}")]
    NonIncreasingOffset {
        /// Earlier status
        previous: OrderStatus,
        /// Offending status
        status: OrderStatus,
    },

    /// Estimates may not go up as the order progresses.
    #[error("minutes remaining may not increase at {status}")]
    IncreasingEstimate {
        /// Offending status
        status: OrderStatus,
    },
}

/// When a status is reached, relative to placement, and the estimate shown from then on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimelineStep {
    /// Status entered at this step
    pub status: OrderStatus,

    /// Time after placement at which the status is entered
    pub offset: SignedDuration,

    /// Estimated minutes until delivery while in this status
    pub minutes_remaining: u32,
}

impl TimelineStep {
    /// Create a step `offset_secs` seconds after placement.
    pub const fn new(status: OrderStatus, offset_secs: i64, minutes_remaining: u32) -> Self {
        Self {
            status,
            offset: SignedDuration::from_secs(offset_secs),
            minutes_remaining,
        }
    }
}

/// One step per status, in order, with strictly increasing offsets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusTimeline {
    steps: [TimelineStep; 5],
}

impl Default for StatusTimeline {
    /// The compressed demo timeline: delivered 25 seconds after placement.
    fn default() -> Self {
        Self {
            steps: [
                TimelineStep::new(OrderStatus::Pending, 0, 45),
                TimelineStep::new(OrderStatus::Confirmed, 2, 45),
                TimelineStep::new(OrderStatus::Preparing, 8, 30),
                TimelineStep::new(OrderStatus::Ready, 15, 15),
                TimelineStep::new(OrderStatus::Delivered, 25, 0),
            ],
        }
    }
}

impl StatusTimeline {
    /// Build a timeline from its steps.
    ///
    /// # Errors
    ///
    /// Returns a [`LifecycleError`] unless there is exactly one step per status in order,
    /// starting at zero, with strictly increasing offsets and non-increasing estimates.
    pub fn new(steps: impl Into<Vec<TimelineStep>>) -> Result<Self, LifecycleError> {
        let steps: Vec<TimelineStep> = steps.into();
        let count = steps.len();

        let steps: [TimelineStep; 5] = steps
            .try_into()
            .map_err(|_steps: Vec<TimelineStep>| LifecycleError::StepCount(count))?;

        for (index, (step, expected)) in steps.iter().zip(OrderStatus::ALL).enumerate() {
            if step.status != expected {
                return Err(LifecycleError::OutOfOrder {
                    index,
                    expected,
                    found: step.status,
                });
            }
        }

        let [first, ..] = &steps;

        if !first.offset.is_zero() {
            return Err(LifecycleError::NonZeroStart);
        }

        for pair in steps.windows(2) {
            let [previous, step] = pair else { continue };

            if step.offset <= previous.offset {
                return Err(LifecycleError::NonIncreasingOffset {
                    previous: previous.status,
                    status: step.status,
                });
            }

            if step.minutes_remaining > previous.minutes_remaining {
                return Err(LifecycleError::IncreasingEstimate {
                    status: step.status,
                });
            }
        }

        Ok(Self { steps })
    }

    /// Steps in status order.
    pub fn steps(&self) -> &[TimelineStep] {
        &self.steps
    }

    /// The step for `status`.
    pub fn step(&self, status: OrderStatus) -> &TimelineStep {
        let [pending, confirmed, preparing, ready, delivered] = &self.steps;

        match status {
            OrderStatus::Pending => pending,
            OrderStatus::Confirmed => confirmed,
            OrderStatus::Preparing => preparing,
            OrderStatus::Ready => ready,
            OrderStatus::Delivered => delivered,
        }
    }

    /// The latest step reached after `elapsed`. Negative durations map to the first step.
    pub fn step_at(&self, elapsed: SignedDuration) -> &TimelineStep {
        let [first, ..] = &self.steps;

        self.steps
            .iter()
            .rev()
            .find(|step| step.offset <= elapsed)
            .unwrap_or(first)
    }

    /// Status after `elapsed`.
    pub fn status_at(&self, elapsed: SignedDuration) -> OrderStatus {
        self.step_at(elapsed).status
    }

    /// Time from placement to delivery.
    pub fn duration(&self) -> SignedDuration {
        self.step(OrderStatus::Delivered).offset
    }
}

/// A status change reported by [`OrderTracker::observe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    /// Status before the change
    pub from: OrderStatus,

    /// Status after the change
    pub to: OrderStatus,

    /// When the new status was reached according to the timeline
    pub at: Timestamp,

    /// Estimate from the new status onwards
    pub minutes_remaining: u32,
}

/// Display data for the current status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    /// Current status
    pub status: OrderStatus,

    /// Zero-based index of the current step
    pub step: usize,

    /// Number of steps
    pub steps: usize,

    /// Completion, 0 to 100
    pub percent: u8,

    /// Headline for the current status
    pub headline: &'static str,

    /// Estimated minutes until delivery
    pub minutes_remaining: u32,
}

/// Follows one order along its timeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderTracker {
    order: OrderId,
    placed_at: Timestamp,
    timeline: StatusTimeline,
    current: OrderStatus,
}

impl OrderTracker {
    /// Start tracking a freshly placed order. The status starts at pending.
    pub fn new(order: OrderId, placed_at: Timestamp, timeline: StatusTimeline) -> Self {
        Self {
            order,
            placed_at,
            timeline,
            current: OrderStatus::Pending,
        }
    }

    /// Rebuild a tracker for an order placed earlier, as of `now`.
    pub fn resume(
        order: OrderId,
        placed_at: Timestamp,
        timeline: StatusTimeline,
        now: Timestamp,
    ) -> Self {
        let mut tracker = Self::new(order, placed_at, timeline);
        let target = tracker.timeline.status_at(now.duration_since(placed_at));

        tracker.current = target;
        tracker
    }

    /// Advance to the status implied by `now`, returning one transition per step crossed.
    ///
    /// A clock that moves backwards never moves the status back.
    pub fn observe(&mut self, now: Timestamp) -> SmallVec<[Transition; 4]> {
        let target = self
            .timeline
            .status_at(now.duration_since(self.placed_at));

        let mut transitions = SmallVec::new();

        while self.current < target {
            let Some(next) = self.current.next() else {
                break;
            };

            let step = self.timeline.step(next);
            let at = self.placed_at.checked_add(step.offset).unwrap_or(now);

            info!(
                order = %self.order,
                from = %self.current,
                to = %next,
                minutes_remaining = step.minutes_remaining,
                "order status advanced"
            );

            transitions.push(Transition {
                from: self.current,
                to: next,
                at,
                minutes_remaining: step.minutes_remaining,
            });

            self.current = next;
        }

        transitions
    }

    /// Order being tracked
    pub fn order(&self) -> OrderId {
        self.order
    }

    /// When the order was placed
    pub fn placed_at(&self) -> Timestamp {
        self.placed_at
    }

    /// Timeline in use
    pub fn timeline(&self) -> &StatusTimeline {
        &self.timeline
    }

    /// Last status reported
    pub fn status(&self) -> OrderStatus {
        self.current
    }

    /// Whether the order has been delivered.
    pub fn is_delivered(&self) -> bool {
        self.current == OrderStatus::Delivered
    }

    /// When the next status is due, if any.
    pub fn next_change_at(&self) -> Option<Timestamp> {
        let next = self.current.next()?;

        self.placed_at
            .checked_add(self.timeline.step(next).offset)
            .ok()
    }

    /// Display data for the current status.
    pub fn progress(&self) -> Progress {
        let step = self.current.index();
        let steps = OrderStatus::ALL.len();
        let last = steps.saturating_sub(1).max(1);

        Progress {
            status: self.current,
            step,
            steps,
            percent: u8::try_from(step * 100 / last).unwrap_or(100),
            headline: self.current.headline(),
            minutes_remaining: self.timeline.step(self.current).minutes_remaining,
        }
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    fn placed_at() -> Result<Timestamp, jiff::Error> {
        "2026-10-19T18:00:00Z".parse()
    }

    fn after(secs: i64) -> Result<Timestamp, jiff::Error> {
        placed_at()?.checked_add(SignedDuration::from_secs(secs))
    }

    #[test]
    fn default_timeline_is_valid() -> TestResult {
        let timeline = StatusTimeline::default();

        assert_eq!(StatusTimeline::new(timeline.steps().to_vec())?, timeline);
        assert_eq!(timeline.duration(), SignedDuration::from_secs(25));

        Ok(())
    }

    #[test]
    fn status_at_follows_offsets() {
        let timeline = StatusTimeline::default();

        let at = |secs| timeline.status_at(SignedDuration::from_secs(secs));

        assert_eq!(at(-5), OrderStatus::Pending);
        assert_eq!(at(0), OrderStatus::Pending);
        assert_eq!(at(1), OrderStatus::Pending);
        assert_eq!(at(2), OrderStatus::Confirmed);
        assert_eq!(at(9), OrderStatus::Preparing);
        assert_eq!(at(15), OrderStatus::Ready);
        assert_eq!(at(3600), OrderStatus::Delivered);
    }

    #[test]
    fn new_rejects_wrong_step_count() {
        let steps: Vec<TimelineStep> =
            StatusTimeline::default().steps().iter().take(4).copied().collect();

        assert_eq!(StatusTimeline::new(steps), Err(LifecycleError::StepCount(4)));
    }

    #[test]
    fn new_rejects_out_of_order_statuses() {
        let mut steps = StatusTimeline::default().steps().to_vec();
        steps.swap(1, 2);

        assert!(matches!(
            StatusTimeline::new(steps),
            Err(LifecycleError::OutOfOrder { index: 1, .. })
        ));
    }

    #[test]
    fn new_rejects_non_zero_start() {
        let mut steps = StatusTimeline::default().steps().to_vec();

        if let Some(first) = steps.first_mut() {
            first.offset = SignedDuration::from_secs(1);
        }

        assert_eq!(StatusTimeline::new(steps), Err(LifecycleError::NonZeroStart));
    }

    #[test]
    fn new_rejects_repeated_offsets() {
        let steps = vec![
            TimelineStep::new(OrderStatus::Pending, 0, 45),
            TimelineStep::new(OrderStatus::Confirmed, 2, 45),
            TimelineStep::new(OrderStatus::Preparing, 2, 30),
            TimelineStep::new(OrderStatus::Ready, 15, 15),
            TimelineStep::new(OrderStatus::Delivered, 25, 0),
        ];

        assert_eq!(
            StatusTimeline::new(steps),
            Err(LifecycleError::NonIncreasingOffset {
                previous: OrderStatus::Confirmed,
                status: OrderStatus::Preparing,
            })
        );
    }

    #[test]
    fn new_rejects_rising_estimates() {
        let steps = vec![
            TimelineStep::new(OrderStatus::Pending, 0, 45),
            TimelineStep::new(OrderStatus::Confirmed, 2, 50),
            TimelineStep::new(OrderStatus::Preparing, 8, 30),
            TimelineStep::new(OrderStatus::Ready, 15, 15),
            TimelineStep::new(OrderStatus::Delivered, 25, 0),
        ];

        assert_eq!(
            StatusTimeline::new(steps),
            Err(LifecycleError::IncreasingEstimate {
                status: OrderStatus::Confirmed,
            })
        );
    }

    #[test]
    fn observe_reports_each_step_once_in_order() -> TestResult {
        let mut tracker =
            OrderTracker::new(OrderId::generate(), placed_at()?, StatusTimeline::default());

        let mut seen = vec![tracker.status()];

        for secs in [0, 1, 3, 3, 10, 16, 30, 60] {
            seen.extend(tracker.observe(after(secs)?).iter().map(|t| t.to));
        }

        assert_eq!(seen, OrderStatus::ALL);
        assert!(tracker.is_delivered());
        assert_eq!(tracker.progress().minutes_remaining, 0);

        Ok(())
    }

    #[test]
    fn observe_never_skips_a_status() -> TestResult {
        let mut tracker =
            OrderTracker::new(OrderId::generate(), placed_at()?, StatusTimeline::default());

        let transitions = tracker.observe(after(20)?);

        let pairs: Vec<(OrderStatus, OrderStatus)> =
            transitions.iter().map(|t| (t.from, t.to)).collect();

        assert_eq!(
            pairs,
            [
                (OrderStatus::Pending, OrderStatus::Confirmed),
                (OrderStatus::Confirmed, OrderStatus::Preparing),
                (OrderStatus::Preparing, OrderStatus::Ready),
            ]
        );
        assert_eq!(
            transitions.last().map(|t| t.minutes_remaining),
            Some(15)
        );
        assert_eq!(transitions.first().map(|t| t.at), Some(after(2)?));

        Ok(())
    }

    #[test]
    fn observe_ignores_clock_going_backwards() -> TestResult {
        let mut tracker =
            OrderTracker::new(OrderId::generate(), placed_at()?, StatusTimeline::default());

        tracker.observe(after(16)?);

        assert!(tracker.observe(after(1)?).is_empty());
        assert_eq!(tracker.status(), OrderStatus::Ready);

        Ok(())
    }

    #[test]
    fn resume_derives_status_from_elapsed_time() -> TestResult {
        let order = OrderId::generate();
        let mut live = OrderTracker::new(order, placed_at()?, StatusTimeline::default());
        live.observe(after(9)?);

        let resumed =
            OrderTracker::resume(order, placed_at()?, StatusTimeline::default(), after(9)?);

        assert_eq!(resumed, live);
        assert_eq!(resumed.next_change_at(), Some(after(15)?));

        Ok(())
    }

    #[test]
    fn progress_percent_and_estimates() -> TestResult {
        let mut tracker =
            OrderTracker::new(OrderId::generate(), placed_at()?, StatusTimeline::default());

        let pending = tracker.progress();
        tracker.observe(after(8)?);
        let preparing = tracker.progress();

        assert_eq!((pending.percent, pending.minutes_remaining), (0, 45));
        assert_eq!(pending.headline, "Order Received");
        assert_eq!((preparing.percent, preparing.minutes_remaining), (50, 30));
        assert_eq!(preparing.headline, "Preparing Your Order");
        assert_eq!(preparing.step, 2);
        assert_eq!(tracker.next_change_at(), Some(after(15)?));

        Ok(())
    }
}
