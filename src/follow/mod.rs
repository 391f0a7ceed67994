//! Follow queue for discovered social profiles
//!
//! The browser automation that actually follows a profile lives outside this
//! crate behind [`FollowDriver`]. This module decides which profiles to
//! visit, paces the actions and enforces the rolling-window cap.

use crate::config::FollowConfig;
use crate::scanner::{Platform, SiteRecord};
use crate::state::FollowWindow;
use rand::Rng;
use std::collections::HashSet;
use std::time::{Duration, Instant};
use thiserror::Error;
use url::Url;

/// Errors raised by a follow driver
#[derive(Debug, Error)]
pub enum FollowError {
    /// One profile could not be followed; the queue moves on
    #[error("Failed to follow {url}: {message}")]
    Action { url: String, message: String },

    /// The driver itself is unusable; the queue stops
    #[error("Follow driver unavailable: {0}")]
    Driver(String),
}

/// Something that can follow a profile (a browser session, in practice)
#[allow(async_fn_in_trait)]
pub trait FollowDriver {
    /// Opens `profile` and follows it
    async fn follow(&mut self, profile: &Url) -> Result<(), FollowError>;
}

/// Dry-run driver: logs and remembers every profile it was asked to follow
#[derive(Debug, Default)]
pub struct LoggingDriver {
    pub followed: Vec<Url>,
}

impl FollowDriver for LoggingDriver {
    async fn follow(&mut self, profile: &Url) -> Result<(), FollowError> {
        tracing::info!("Would follow {}", profile);
        self.followed.push(profile.clone());
        Ok(())
    }
}

/// Rolling-window cap on follow actions
#[derive(Debug, Clone)]
pub struct FollowLimiter {
    window: FollowWindow,
}

impl FollowLimiter {
    /// At most `capacity` actions in any `window`
    pub fn new(capacity: u32, window: Duration) -> Self {
        Self {
            window: FollowWindow::new(capacity, window),
        }
    }

    pub fn from_config(config: &FollowConfig) -> Self {
        Self::new(config.max_per_window, Duration::from_secs(config.window_secs))
    }

    /// Takes a slot if one is free
    pub fn try_acquire(&mut self) -> bool {
        let now = Instant::now();
        if !self.window.can_act(now) {
            return false;
        }
        self.window.record_action(now);
        true
    }

    /// How long until a slot frees up; None when one is free now
    pub fn wait_time(&mut self) -> Option<Duration> {
        self.window.time_until_available(Instant::now())
    }

    pub fn remaining(&mut self) -> u32 {
        self.window.remaining(Instant::now())
    }

    pub fn total_actions(&self) -> u64 {
        self.window.total_actions
    }
}

/// Pacing and overflow behavior of the follow queue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FollowOptions {
    pub min_delay: Duration,
    pub max_delay: Duration,

    /// Sleep until the window frees up instead of deferring the rest
    pub wait_for_window: bool,
}

impl FollowOptions {
    pub fn from_config(config: &FollowConfig) -> Self {
        Self {
            min_delay: Duration::from_millis(config.min_delay_ms),
            max_delay: Duration::from_millis(config.max_delay_ms),
            wait_for_window: config.wait_for_window,
        }
    }

    /// Random delay in `min_delay..=max_delay`
    pub fn next_delay(&self) -> Duration {
        let min = self.min_delay.as_millis() as u64;
        let max = self.max_delay.as_millis() as u64;
        if max <= min {
            return self.min_delay;
        }
        Duration::from_millis(rand::rng().random_range(min..=max))
    }
}

impl Default for FollowOptions {
    fn default() -> Self {
        Self::from_config(&FollowConfig::default())
    }
}

/// Outcome of one pass over the follow queue
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FollowSummary {
    pub followed: Vec<Url>,

    /// Profiles whose follow action failed, with the reason
    pub failed: Vec<(Url, String)>,

    /// Profiles left untouched because the window was full
    pub deferred: Vec<Url>,
}

impl FollowSummary {
    pub fn attempted(&self) -> usize {
        self.followed.len() + self.failed.len()
    }
}

/// Profiles of `platform` across records, first occurrence wins
pub fn follow_targets(records: &[SiteRecord], platform: Platform) -> Vec<Url> {
    let mut seen = HashSet::new();

    records
        .iter()
        .flat_map(|record| record.social_for(platform))
        .filter(|url| seen.insert(url.as_str().to_string()))
        .cloned()
        .collect()
}

/// Follows each target through `driver`, respecting the limiter
///
/// Every attempt, successful or not, uses a limiter slot. A randomized
/// delay separates consecutive attempts.
///
/// # Returns
///
/// * `Ok(FollowSummary)` - The queue was processed (possibly partially deferred)
/// * `Err(FollowError::Driver)` - The driver became unusable
pub async fn run_follow_queue<D: FollowDriver>(
    driver: &mut D,
    targets: &[Url],
    limiter: &mut FollowLimiter,
    options: &FollowOptions,
) -> Result<FollowSummary, FollowError> {
    let mut summary = FollowSummary::default();
    let total = targets.len();

    for (idx, target) in targets.iter().enumerate() {
        if let Some(wait) = limiter.wait_time() {
            if !options.wait_for_window {
                tracing::warn!(
                    "Follow limit reached; deferring {} remaining profiles",
                    total - idx
                );
                summary.deferred.extend(targets[idx..].iter().cloned());
                break;
            }

            tracing::info!("Follow limit reached; waiting {}s", wait.as_secs());
            tokio::time::sleep(wait).await;
        }

        if summary.attempted() > 0 {
            tokio::time::sleep(options.next_delay()).await;
        }

        if !limiter.try_acquire() {
            summary.deferred.extend(targets[idx..].iter().cloned());
            break;
        }

        tracing::info!("[{}/{}] Following {}", idx + 1, total, target);

        match driver.follow(target).await {
            Ok(()) => summary.followed.push(target.clone()),
            Err(FollowError::Action { message, .. }) => {
                tracing::warn!("Failed to follow {}: {}", target, message);
                summary.failed.push((target.clone(), message));
            }
            Err(e) => return Err(e),
        }
    }

    tracing::info!(
        "Follow queue done: {} followed, {} failed, {} deferred",
        summary.followed.len(),
        summary.failed.len(),
        summary.deferred.len()
    );

    Ok(summary)
}
