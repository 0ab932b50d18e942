//! Fixed-window rate limiting with lockouts for auth flows.
//!
//! Each identifier (usually `"<action>:<client-ip>"`) tracks an attempt
//! count inside a fixed window. Exhausting the window triggers a lockout;
//! a successful action resets its identifier. The store is process-local
//! and sits behind a trait so multi-instance deployments can inject a
//! shared, atomically-updatable backend instead.
//!
//! Limiter failures fail OPEN: a broken limiter must never turn into its
//! own denial of service.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

/// Attempt budget for one action: `max_attempts` per `window_minutes`,
/// then locked for `lockout_minutes`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RateLimitPolicy {
    pub max_attempts: u32,
    pub window_minutes: u64,
    pub lockout_minutes: u64,
}

/// Sign-in attempts per client IP.
pub const SIGNIN_POLICY: RateLimitPolicy = RateLimitPolicy {
    max_attempts: 10,
    window_minutes: 15,
    lockout_minutes: 30,
};

/// Sign-up attempts per client IP.
pub const SIGNUP_POLICY: RateLimitPolicy = RateLimitPolicy {
    max_attempts: 5,
    window_minutes: 15,
    lockout_minutes: 30,
};

/// Project creation attempts per client IP.
pub const CREATE_PROJECT_POLICY: RateLimitPolicy = RateLimitPolicy {
    max_attempts: 10,
    window_minutes: 15,
    lockout_minutes: 30,
};

/// Project listing is read-only and gets a wider budget.
pub const LIST_PROJECTS_POLICY: RateLimitPolicy = RateLimitPolicy {
    max_attempts: 50,
    window_minutes: 15,
    lockout_minutes: 30,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RateLimitDecision {
    Allowed { remaining: u32 },
    Limited { lockout_minutes_remaining: u64 },
}

impl RateLimitDecision {
    #[must_use]
    pub const fn is_allowed(self) -> bool {
        matches!(self, Self::Allowed { .. })
    }
}

pub trait RateLimiter: Send + Sync {
    /// Register an attempt for `identifier` and decide whether it may proceed.
    fn check(&self, identifier: &str, policy: RateLimitPolicy) -> RateLimitDecision;

    /// Force-clear an identifier, e.g. after a successful sign-in.
    /// Clearing an unknown identifier is a no-op.
    fn reset(&self, identifier: &str);

    /// Drop records whose window has expired and whose lockout (if any) has
    /// passed. Purely a memory-reclamation pass; correctness never depends
    /// on it running.
    fn sweep(&self);
}

/// Limiter that allows everything; used in wiring tests.
#[derive(Clone, Debug, Default)]
pub struct NoopRateLimiter;

impl RateLimiter for NoopRateLimiter {
    fn check(&self, _identifier: &str, policy: RateLimitPolicy) -> RateLimitDecision {
        RateLimitDecision::Allowed {
            remaining: policy.max_attempts,
        }
    }

    fn reset(&self, _identifier: &str) {}

    fn sweep(&self) {}
}

#[derive(Clone, Debug)]
struct RateLimitRecord {
    attempts: u32,
    window_reset_at: i64,
    lockout_until: Option<i64>,
}

/// Process-local limiter backed by a mutex-guarded map.
///
/// Every check/reset/sweep holds the map lock for its whole operation, so
/// concurrent requests for one identifier cannot both observe a
/// below-limit count and slip past the budget.
#[derive(Default)]
pub struct MemoryRateLimiter {
    store: Mutex<HashMap<String, RateLimitRecord>>,
}

impl MemoryRateLimiter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Decide at an explicit instant. The trait method supplies wall-clock
    /// time; tests drive this directly.
    pub fn check_at(
        &self,
        identifier: &str,
        policy: RateLimitPolicy,
        now: i64,
    ) -> RateLimitDecision {
        // A poisoned lock means a panic elsewhere; fail open rather than
        // turning the limiter into a second outage.
        let Ok(mut store) = self.store.lock() else {
            return RateLimitDecision::Allowed {
                remaining: policy.max_attempts,
            };
        };

        if let Some(record) = store.get(identifier).cloned() {
            if let Some(lockout_until) = record.lockout_until {
                if lockout_until > now {
                    return RateLimitDecision::Limited {
                        lockout_minutes_remaining: minutes_remaining(lockout_until, now),
                    };
                }
                // Lockout served; start over with a fresh window.
                store.insert(identifier.to_string(), fresh_record(policy, now));
                return RateLimitDecision::Allowed {
                    remaining: policy.max_attempts.saturating_sub(1),
                };
            }

            // A request arriving exactly at the reset instant counts as a
            // fresh window.
            if now >= record.window_reset_at {
                store.insert(identifier.to_string(), fresh_record(policy, now));
                return RateLimitDecision::Allowed {
                    remaining: policy.max_attempts.saturating_sub(1),
                };
            }

            if record.attempts >= policy.max_attempts {
                store.insert(
                    identifier.to_string(),
                    RateLimitRecord {
                        attempts: record.attempts.saturating_add(1),
                        window_reset_at: record.window_reset_at,
                        lockout_until: Some(now + minutes_to_seconds(policy.lockout_minutes)),
                    },
                );
                return RateLimitDecision::Limited {
                    lockout_minutes_remaining: policy.lockout_minutes,
                };
            }

            let attempts = record.attempts.saturating_add(1);
            store.insert(
                identifier.to_string(),
                RateLimitRecord {
                    attempts,
                    window_reset_at: record.window_reset_at,
                    lockout_until: None,
                },
            );
            return RateLimitDecision::Allowed {
                remaining: policy.max_attempts.saturating_sub(attempts),
            };
        }

        store.insert(identifier.to_string(), fresh_record(policy, now));
        RateLimitDecision::Allowed {
            remaining: policy.max_attempts.saturating_sub(1),
        }
    }

    fn sweep_at(&self, now: i64) {
        let Ok(mut store) = self.store.lock() else {
            return;
        };
        store.retain(|_, record| {
            let window_active = record.window_reset_at > now;
            let lockout_active = record.lockout_until.is_some_and(|until| until > now);
            window_active || lockout_active
        });
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.store.lock().map(|store| store.len()).unwrap_or(0)
    }
}

impl RateLimiter for MemoryRateLimiter {
    fn check(&self, identifier: &str, policy: RateLimitPolicy) -> RateLimitDecision {
        self.check_at(identifier, policy, now_unix_seconds())
    }

    fn reset(&self, identifier: &str) {
        if let Ok(mut store) = self.store.lock() {
            store.remove(identifier);
        }
    }

    fn sweep(&self) {
        self.sweep_at(now_unix_seconds());
    }
}

fn fresh_record(policy: RateLimitPolicy, now: i64) -> RateLimitRecord {
    RateLimitRecord {
        attempts: 1,
        window_reset_at: now + minutes_to_seconds(policy.window_minutes),
        lockout_until: None,
    }
}

fn minutes_to_seconds(minutes: u64) -> i64 {
    i64::try_from(minutes.saturating_mul(60)).unwrap_or(i64::MAX)
}

/// Remaining lockout, rounded up to whole minutes.
fn minutes_remaining(lockout_until: i64, now: i64) -> u64 {
    let seconds = lockout_until.saturating_sub(now).max(0);
    u64::try_from(seconds.saturating_add(59) / 60).unwrap_or(0)
}

fn now_unix_seconds() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_secs()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}
