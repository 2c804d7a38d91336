//! Minute/day window counters with lazy reset.

use std::time::Duration;

use tokio::time::Instant;

use super::quota::ModelQuota;

pub(crate) const MINUTE: Duration = Duration::from_secs(60);
pub(crate) const DAY: Duration = Duration::from_secs(24 * 60 * 60);

/// Read-only view of one model's current window counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WindowUsage {
    pub tokens_this_minute: u64,
    pub requests_this_minute: u64,
    pub tokens_today: u64,
}

/// Which quota refused admission, and when its window reopens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Refusal {
    Minute(Instant),
    Day(Instant),
}

impl Refusal {
    pub(crate) fn deadline(&self) -> Instant {
        match self {
            Self::Minute(at) | Self::Day(at) => *at,
        }
    }
}

/// Per-model consumption state. Counters are monotone within a window and
/// reset lazily on the first access past the boundary; each reset advances
/// the boundary one full window length from now.
#[derive(Debug, Clone)]
pub(crate) struct RateWindow {
    tokens_this_minute: u64,
    requests_this_minute: u64,
    tokens_today: u64,
    minute_resets_at: Instant,
    day_resets_at: Instant,
}

impl RateWindow {
    pub(crate) fn new(now: Instant) -> Self {
        Self {
            tokens_this_minute: 0,
            requests_this_minute: 0,
            tokens_today: 0,
            minute_resets_at: now + MINUTE,
            day_resets_at: now + DAY,
        }
    }

    pub(crate) fn roll(&mut self, now: Instant) {
        if now >= self.minute_resets_at {
            self.tokens_this_minute = 0;
            self.requests_this_minute = 0;
            self.minute_resets_at = now + MINUTE;
        }
        if now >= self.day_resets_at {
            self.tokens_today = 0;
            self.day_resets_at = now + DAY;
        }
    }

    /// Would admitting `estimated_tokens` plus one request stay within the
    /// quota? Returns the blocking factor's reopen time when it would not.
    /// When both windows refuse, the nearer deadline wins so the caller never
    /// oversleeps.
    pub(crate) fn check(&self, quota: &ModelQuota, estimated_tokens: u64) -> Option<Refusal> {
        let minute_blocked = self.tokens_this_minute + estimated_tokens > quota.tokens_per_minute
            || self.requests_this_minute + 1 > quota.requests_per_minute;
        let day_blocked = quota
            .tokens_per_day
            .is_some_and(|cap| self.tokens_today + estimated_tokens > cap);

        match (minute_blocked, day_blocked) {
            (false, false) => None,
            (true, false) => Some(Refusal::Minute(self.minute_resets_at)),
            (false, true) => Some(Refusal::Day(self.day_resets_at)),
            (true, true) => {
                if self.minute_resets_at <= self.day_resets_at {
                    Some(Refusal::Minute(self.minute_resets_at))
                } else {
                    Some(Refusal::Day(self.day_resets_at))
                }
            }
        }
    }

    pub(crate) fn admit(&mut self, estimated_tokens: u64) {
        self.tokens_this_minute += estimated_tokens;
        self.requests_this_minute += 1;
        self.tokens_today += estimated_tokens;
    }

    /// Record tokens consumed beyond the admitted estimate.
    pub(crate) fn add_overrun(&mut self, tokens: u64) {
        self.tokens_this_minute += tokens;
        self.tokens_today += tokens;
    }

    pub(crate) fn usage(&self) -> WindowUsage {
        WindowUsage {
            tokens_this_minute: self.tokens_this_minute,
            requests_this_minute: self.requests_this_minute,
            tokens_today: self.tokens_today,
        }
    }
}
