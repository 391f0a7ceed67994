use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Tracks follow actions inside a rolling time window
///
/// This structure caps how many follow actions may happen in any window of
/// `window` length, e.g. 20 per hour. Timestamps older than the window are
/// pruned lazily on every query.
#[derive(Debug, Clone)]
pub struct FollowWindow {
    /// Maximum number of actions allowed inside one window
    pub capacity: u32,

    /// Length of the rolling window
    pub window: Duration,

    /// Timestamps of actions still inside the window, oldest first
    history: VecDeque<Instant>,

    /// Total number of actions recorded since creation
    pub total_actions: u64,
}

impl FollowWindow {
    /// Creates a new, empty window
    pub fn new(capacity: u32, window: Duration) -> Self {
        Self {
            capacity,
            window,
            history: VecDeque::new(),
            total_actions: 0,
        }
    }

    fn prune(&mut self, now: Instant) {
        while let Some(&oldest) = self.history.front() {
            if now.saturating_duration_since(oldest) >= self.window {
                self.history.pop_front();
            } else {
                break;
            }
        }
    }

    /// Checks if another action fits in the window at `now`
    pub fn can_act(&mut self, now: Instant) -> bool {
        self.prune(now);
        (self.history.len() as u64) < u64::from(self.capacity)
    }

    /// Records that an action happened at `now`
    pub fn record_action(&mut self, now: Instant) {
        self.prune(now);
        self.history.push_back(now);
        self.total_actions += 1;
    }

    /// Returns the number of actions still allowed in the current window
    pub fn remaining(&mut self, now: Instant) -> u32 {
        self.prune(now);
        self.capacity
            .saturating_sub(u32::try_from(self.history.len()).unwrap_or(u32::MAX))
    }

    /// Calculates the time until the next action is allowed
    ///
    /// Returns None if an action can be taken now, or the duration to wait otherwise.
    pub fn time_until_available(&mut self, now: Instant) -> Option<Duration> {
        if self.can_act(now) {
            return None;
        }

        // Full window: the oldest entry has to age out first.
        let Some(&oldest) = self.history.front() else {
            return Some(self.window);
        };
        let elapsed = now.saturating_duration_since(oldest);
        Some(self.window.saturating_sub(elapsed))
    }
}
