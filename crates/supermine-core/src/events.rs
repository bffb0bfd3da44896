use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::engine::SessionStatus;
use crate::ledger::{BalanceLedger, ConversionRecord};
use crate::rewards::{DailyStreak, RewardSource};
use crate::timer::{BoostSource, CooldownStatus};

/// Every successful engine command produces an Event.
/// The CLI prints them; a UI would render them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    SessionStarted {
        start_ms: i64,
        end_ms: i64,
        duration_ms: u64,
        at: DateTime<Utc>,
    },
    /// Session time extended, or a session started by a boost.
    SessionBoosted {
        source: BoostSource,
        added_ms: u64,
        remaining_ms: u64,
        end_ms: i64,
        started: bool,
        at: DateTime<Utc>,
    },
    /// Periodic progress while mining.
    SessionTick {
        remaining_ms: u64,
        session_accrued: f64,
        mined_display: f64,
        at: DateTime<Utc>,
    },
    SessionFinalized {
        start_ms: i64,
        duration_ms: u64,
        earned: f64,
        mined_total: f64,
        /// False when an earlier, interrupted finalize already credited it.
        credited: bool,
        at: DateTime<Utc>,
    },
    RewardGranted {
        source: RewardSource,
        amount: u64,
        point_balance: f64,
        at: DateTime<Utc>,
    },
    CoinsConverted {
        record: ConversionRecord,
        converted_total: f64,
        at: DateTime<Utc>,
    },
    HashrateBoosted {
        hashrate: u32,
        max: u32,
        at: DateTime<Utc>,
    },
    AccountImported {
        ledger: BalanceLedger,
        day_index: u8,
        at: DateTime<Utc>,
    },
    LedgerCleared {
        at: DateTime<Utc>,
    },
    StateSnapshot {
        session: SessionStatus,
        ledger: BalanceLedger,
        hashrate: u32,
        daily: DailyStreak,
        cooldowns: Vec<CooldownStatus>,
        at: DateTime<Utc>,
    },
}

impl Event {
    /// Progress or completion event for a reconciled session. Idle has none.
    pub fn from_status(status: &SessionStatus, at: DateTime<Utc>) -> Option<Event> {
        match *status {
            SessionStatus::Idle { .. } => None,
            SessionStatus::Active {
                remaining_ms,
                session_accrued,
                mined_display,
                ..
            } => Some(Event::SessionTick {
                remaining_ms,
                session_accrued,
                mined_display,
                at,
            }),
            SessionStatus::Finalized {
                start_ms,
                duration_ms,
                earned,
                mined_total,
                credited,
            } => Some(Event::SessionFinalized {
                start_ms,
                duration_ms,
                earned,
                mined_total,
                credited,
                at,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_are_tagged_by_type() {
        let event = Event::LedgerCleared { at: Utc::now() };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "LedgerCleared");
    }

    #[test]
    fn idle_status_has_no_event() {
        let status = SessionStatus::Idle { mined_total: 1.0 };
        assert!(Event::from_status(&status, Utc::now()).is_none());
    }

    #[test]
    fn active_status_becomes_tick() {
        let status = SessionStatus::Active {
            start_ms: 0,
            end_ms: 10,
            remaining_ms: 4,
            session_accrued: 0.5,
            mined_display: 2.5,
        };
        match Event::from_status(&status, Utc::now()) {
            Some(Event::SessionTick { remaining_ms, .. }) => assert_eq!(remaining_ms, 4),
            other => panic!("expected tick, got {other:?}"),
        }
    }
}
