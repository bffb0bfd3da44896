//! Timer reconciliation.
//!
//! Derives the session's current state from its persisted markers and the
//! wall clock. This is the single source of truth for remaining time and
//! accrued coins; nothing else keeps a running counter.

use uuid::Uuid;

use crate::storage::MiningConfig;

use super::session::{settle_key, MiningSession};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActiveSession {
    pub id: Option<Uuid>,
    pub start_ms: i64,
    pub end_ms: i64,
    pub elapsed_ms: u64,
    pub remaining_ms: u64,
    /// Coins accrued by this session so far.
    pub accrued: f64,
}

/// A session that has run its course and is ready to be credited.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SettledSession {
    pub id: Option<Uuid>,
    pub start_ms: i64,
    /// Time actually mined, never more than the effective duration.
    pub duration_ms: u64,
    pub earned: f64,
}

impl SettledSession {
    pub fn settle_key(&self) -> String {
        settle_key(self.id, self.start_ms)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Reconciliation {
    Idle,
    Active(ActiveSession),
    Expired(SettledSession),
}

#[derive(Debug, Clone, Copy)]
pub struct Reconciler {
    base_duration_ms: u64,
    rate_per_second: f64,
}

impl Reconciler {
    pub fn new(base_duration_ms: u64, rate_per_second: f64) -> Self {
        Self {
            base_duration_ms,
            rate_per_second,
        }
    }

    pub fn from_config(config: &MiningConfig) -> Self {
        Self::new(config.base_duration_ms(), config.rate_per_second())
    }

    pub fn base_duration_ms(&self) -> u64 {
        self.base_duration_ms
    }

    /// Coins earned for `duration_ms` of mining.
    pub fn earned_for(&self, duration_ms: u64) -> f64 {
        (duration_ms as f64 / 1000.0) * self.rate_per_second
    }

    pub fn reconcile(&self, session: Option<&MiningSession>, now_ms: i64) -> Reconciliation {
        let Some(session) = session else {
            return Reconciliation::Idle;
        };

        let end_ms = session.effective_end_ms(self.base_duration_ms);
        if end_ms.saturating_sub(now_ms) <= 0 {
            let duration_ms = session.effective_duration_ms(self.base_duration_ms);
            return Reconciliation::Expired(SettledSession {
                id: session.id,
                start_ms: session.start_ms,
                duration_ms,
                earned: self.earned_for(duration_ms),
            });
        }

        let elapsed_ms = session.elapsed_ms(self.base_duration_ms, now_ms);
        Reconciliation::Active(ActiveSession {
            id: session.id,
            start_ms: session.start_ms,
            end_ms,
            elapsed_ms,
            remaining_ms: session.remaining_ms(self.base_duration_ms, now_ms),
            accrued: self.earned_for(elapsed_ms),
        })
    }

    /// Settle an active session early, crediting only the elapsed part.
    pub fn settle_early(&self, session: &MiningSession, now_ms: i64) -> SettledSession {
        let duration_ms = session.elapsed_ms(self.base_duration_ms, now_ms);
        SettledSession {
            id: session.id,
            start_ms: session.start_ms,
            duration_ms,
            earned: self.earned_for(duration_ms),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: u64 = 180_000;
    const RATE: f64 = 1.0 / 180.0;

    fn reconciler() -> Reconciler {
        Reconciler::new(BASE, RATE)
    }

    #[test]
    fn no_session_is_idle() {
        assert_eq!(reconciler().reconcile(None, 5), Reconciliation::Idle);
    }

    #[test]
    fn midway_session_is_active() {
        let session = MiningSession::new(0);
        match reconciler().reconcile(Some(&session), 60_000) {
            Reconciliation::Active(active) => {
                assert_eq!(active.remaining_ms, 120_000);
                assert_eq!(active.elapsed_ms, 60_000);
                assert_eq!(active.end_ms, 180_000);
                assert!((active.accrued - 60.0 * RATE).abs() < 1e-12);
            }
            other => panic!("expected active, got {other:?}"),
        }
    }

    #[test]
    fn expires_exactly_at_end() {
        let session = MiningSession::new(0);
        match reconciler().reconcile(Some(&session), 180_000) {
            Reconciliation::Expired(settled) => {
                assert_eq!(settled.duration_ms, BASE);
                assert!((settled.earned - 1.0).abs() < 1e-9);
            }
            other => panic!("expected expired, got {other:?}"),
        }
    }

    #[test]
    fn long_absence_credits_only_the_duration() {
        let session = MiningSession::new(0);
        let week = 7 * 24 * 60 * 60 * 1000;
        match reconciler().reconcile(Some(&session), week) {
            Reconciliation::Expired(settled) => assert_eq!(settled.duration_ms, BASE),
            other => panic!("expected expired, got {other:?}"),
        }
    }

    #[test]
    fn boosted_session_credits_boosted_duration() {
        let session = MiningSession {
            id: None,
            start_ms: 0,
            boosted_end_ms: Some(7_200_000),
        };
        match reconciler().reconcile(Some(&session), 7_200_001) {
            Reconciliation::Expired(settled) => {
                assert_eq!(settled.duration_ms, 7_200_000);
                assert!((settled.earned - 7_200.0 * RATE).abs() < 1e-9);
            }
            other => panic!("expected expired, got {other:?}"),
        }
    }

    #[test]
    fn clock_moved_back_keeps_remaining_bounded() {
        let session = MiningSession::new(1_000_000);
        match reconciler().reconcile(Some(&session), 0) {
            Reconciliation::Active(active) => {
                assert_eq!(active.remaining_ms, BASE);
                assert_eq!(active.accrued, 0.0);
            }
            other => panic!("expected active, got {other:?}"),
        }
    }

    #[test]
    fn settle_early_credits_elapsed_part() {
        let session = MiningSession::new(0);
        let settled = reconciler().settle_early(&session, 90_000);
        assert_eq!(settled.duration_ms, 90_000);
        assert!((settled.earned - 0.5).abs() < 1e-9);
    }
}
