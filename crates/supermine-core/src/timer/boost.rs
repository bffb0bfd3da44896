//! Session time boosts.
//!
//! A boost extends the remaining time of the active session, or starts a new
//! session when none is running. Remaining time never exceeds the cap and a
//! boost never shortens a session.

use serde::{Deserialize, Serialize};

use crate::error::Rejection;

use super::reconciler::ActiveSession;
use super::session::{clamp_i64, MiningSession};

/// `max(current, min(current + delta, cap))`.
pub fn extend_remaining(current_ms: u64, delta_ms: u64, cap_ms: u64) -> u64 {
    current_ms.max(current_ms.saturating_add(delta_ms).min(cap_ms))
}

/// What paid for a boost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BoostSource {
    Ad,
    Coins { package: usize, cost: u64 },
}

/// Outcome of planning a boost, ready to persist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoostPlan {
    pub session: MiningSession,
    pub previous_remaining_ms: u64,
    pub remaining_ms: u64,
    /// True when the boost started a fresh session.
    pub started: bool,
}

impl BoostPlan {
    pub fn added_ms(&self) -> u64 {
        self.remaining_ms - self.previous_remaining_ms
    }

    pub fn end_ms(&self) -> i64 {
        self.session.boosted_end_ms.unwrap_or(self.session.start_ms)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct BoostExtender {
    cap_ms: u64,
}

impl BoostExtender {
    pub fn new(cap_ms: u64) -> Self {
        Self { cap_ms }
    }

    /// Plan a boost of `delta_ms` against the current session, if any.
    ///
    /// The new end is measured from `max(now, start)`, so a clock running
    /// behind the session start still yields an end after the start.
    /// Configuration validation keeps `delta_ms` positive.
    ///
    /// # Errors
    /// [`Rejection::BoostCapReached`] when remaining time already sits at
    /// the cap, since the boost would be paid for and change nothing.
    pub fn plan(
        &self,
        active: Option<&ActiveSession>,
        delta_ms: u64,
        now_ms: i64,
    ) -> Result<BoostPlan, Rejection> {
        let current = active.map_or(0, |a| a.remaining_ms);
        if current >= self.cap_ms {
            return Err(Rejection::BoostCapReached {
                cap_ms: self.cap_ms,
            });
        }

        let remaining_ms = extend_remaining(current, delta_ms, self.cap_ms);
        let (session, started) = match active {
            Some(a) => {
                let from = now_ms.max(a.start_ms);
                (
                    MiningSession {
                        id: a.id,
                        start_ms: a.start_ms,
                        boosted_end_ms: Some(from.saturating_add(clamp_i64(remaining_ms))),
                    },
                    false,
                )
            }
            None => {
                let mut session = MiningSession::new(now_ms);
                session.boosted_end_ms = Some(now_ms.saturating_add(clamp_i64(remaining_ms)));
                (session, true)
            }
        };

        Ok(BoostPlan {
            session,
            previous_remaining_ms: current,
            remaining_ms,
            started,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MIN: u64 = 60_000;
    const CAP: u64 = 120 * MIN;

    fn active(start_ms: i64, remaining_ms: u64) -> ActiveSession {
        ActiveSession {
            id: None,
            start_ms,
            end_ms: start_ms + remaining_ms as i64,
            elapsed_ms: 0,
            remaining_ms,
            accrued: 0.0,
        }
    }

    #[test]
    fn extend_clamps_to_cap() {
        assert_eq!(extend_remaining(100 * MIN, 30 * MIN, CAP), CAP);
        assert_eq!(extend_remaining(10 * MIN, 30 * MIN, CAP), 40 * MIN);
    }

    #[test]
    fn extend_never_shortens() {
        // Remaining above a lowered cap stays where it is.
        assert_eq!(extend_remaining(150 * MIN, 30 * MIN, CAP), 150 * MIN);
    }

    #[test]
    fn boost_without_session_starts_one() {
        let plan = BoostExtender::new(CAP).plan(None, 30 * MIN, 1_000).unwrap();
        assert!(plan.started);
        assert_eq!(plan.session.start_ms, 1_000);
        assert_eq!(plan.remaining_ms, 30 * MIN);
        assert_eq!(plan.end_ms(), 1_000 + (30 * MIN) as i64);
    }

    #[test]
    fn boost_keeps_original_start() {
        let a = active(0, 100 * MIN);
        let plan = BoostExtender::new(CAP).plan(Some(&a), 30 * MIN, 5 * MIN as i64).unwrap();
        assert!(!plan.started);
        assert_eq!(plan.session.start_ms, 0);
        assert_eq!(plan.remaining_ms, CAP);
        assert_eq!(plan.added_ms(), 20 * MIN);
        assert_eq!(plan.end_ms(), (5 * MIN + CAP) as i64);
    }

    #[test]
    fn boost_with_clock_behind_start_ends_after_start() {
        let a = active(10 * MIN as i64, 3 * MIN);
        let plan = BoostExtender::new(CAP).plan(Some(&a), 60 * MIN, 0).unwrap();
        assert_eq!(plan.remaining_ms, 63 * MIN);
        assert_eq!(plan.end_ms(), (10 * MIN + 63 * MIN) as i64);
        assert_eq!(plan.session.effective_duration_ms(3 * MIN), 63 * MIN);
    }

    #[test]
    fn boost_keeps_session_id() {
        let session = MiningSession::new(0);
        let a = ActiveSession {
            id: session.id,
            ..active(0, 3 * MIN)
        };
        let plan = BoostExtender::new(CAP).plan(Some(&a), 30 * MIN, 0).unwrap();
        assert_eq!(plan.session.id, session.id);
        assert!(BoostExtender::new(CAP).plan(None, 30 * MIN, 0).unwrap().session.id.is_some());
    }

    #[test]
    fn boost_at_cap_is_rejected() {
        let a = active(0, CAP);
        assert_eq!(
            BoostExtender::new(CAP).plan(Some(&a), 30 * MIN, 0),
            Err(Rejection::BoostCapReached { cap_ms: CAP })
        );
    }
}
