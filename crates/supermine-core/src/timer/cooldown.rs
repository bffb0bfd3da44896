//! Cooldown gates for repeatable bonus actions.
//!
//! A gate is a pure check against a reference timestamp. It never writes;
//! the caller records `now` as the new reference after the action succeeds.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::storage::keys;

/// Actions gated by a cooldown window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CooldownKind {
    MysteryBox,
    TimeBoostAd,
    HashrateAd,
    DailyBonus,
    /// Locks a fully flipped card board until it resets.
    FlipReset,
}

impl CooldownKind {
    pub const ALL: [CooldownKind; 5] = [
        CooldownKind::MysteryBox,
        CooldownKind::TimeBoostAd,
        CooldownKind::HashrateAd,
        CooldownKind::DailyBonus,
        CooldownKind::FlipReset,
    ];

    /// Store key holding the reference timestamp.
    pub fn key(self) -> &'static str {
        match self {
            CooldownKind::MysteryBox => keys::COOLDOWN_MYSTERY_BOX,
            CooldownKind::TimeBoostAd => keys::COOLDOWN_TIME_BOOST_AD,
            CooldownKind::HashrateAd => keys::COOLDOWN_HASHRATE_AD,
            CooldownKind::DailyBonus => keys::COOLDOWN_DAILY_BONUS,
            CooldownKind::FlipReset => keys::COOLDOWN_FLIP_RESET,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CooldownKind::MysteryBox => "mystery box",
            CooldownKind::TimeBoostAd => "time boost ad",
            CooldownKind::HashrateAd => "hashrate boost ad",
            CooldownKind::DailyBonus => "daily bonus",
            CooldownKind::FlipReset => "flip board",
        }
    }
}

impl fmt::Display for CooldownKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// True if no reference exists or `now - reference >= window_ms`.
pub fn is_available(reference_ms: Option<i64>, window_ms: u64, now_ms: i64) -> bool {
    remaining_ms(reference_ms, window_ms, now_ms) == 0
}

/// Time left until the gate opens, clamped to `[0, window_ms]`.
pub fn remaining_ms(reference_ms: Option<i64>, window_ms: u64, now_ms: i64) -> u64 {
    let Some(reference_ms) = reference_ms else {
        return 0;
    };
    let elapsed = now_ms.saturating_sub(reference_ms).max(0) as u64;
    window_ms.saturating_sub(elapsed)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CooldownStatus {
    pub kind: CooldownKind,
    pub available: bool,
    pub remaining_ms: u64,
    pub reference_ms: Option<i64>,
}

#[derive(Debug, Clone, Copy)]
pub struct CooldownGate {
    kind: CooldownKind,
    window_ms: u64,
}

impl CooldownGate {
    pub fn new(kind: CooldownKind, window_ms: u64) -> Self {
        Self { kind, window_ms }
    }

    pub fn window_ms(&self) -> u64 {
        self.window_ms
    }

    pub fn status(&self, reference_ms: Option<i64>, now_ms: i64) -> CooldownStatus {
        let remaining_ms = remaining_ms(reference_ms, self.window_ms, now_ms);
        CooldownStatus {
            kind: self.kind,
            available: remaining_ms == 0,
            remaining_ms,
            reference_ms,
        }
    }

    /// `Ok(())` when open, otherwise the rejection to hand back.
    pub fn check(
        &self,
        reference_ms: Option<i64>,
        now_ms: i64,
    ) -> Result<(), crate::error::Rejection> {
        let status = self.status(reference_ms, now_ms);
        if status.available {
            Ok(())
        } else {
            Err(crate::error::Rejection::CooldownActive {
                kind: self.kind,
                remaining_ms: status.remaining_ms,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const THREE_HOURS: u64 = 3 * 60 * 60 * 1000;

    #[test]
    fn absent_reference_is_available() {
        assert!(is_available(None, THREE_HOURS, 0));
    }

    #[test]
    fn mystery_box_boundary_is_inclusive() {
        assert!(!is_available(Some(0), THREE_HOURS, 0));
        assert!(!is_available(Some(0), THREE_HOURS, 10_799_999));
        assert!(is_available(Some(0), THREE_HOURS, 10_800_000));
    }

    #[test]
    fn remaining_counts_down() {
        assert_eq!(remaining_ms(Some(1_000), 5_000, 2_000), 4_000);
        assert_eq!(remaining_ms(Some(1_000), 5_000, 60_000), 0);
    }

    #[test]
    fn reference_in_the_future_caps_at_window() {
        assert_eq!(remaining_ms(Some(100_000), 5_000, 0), 5_000);
    }

    #[test]
    fn gate_check_reports_kind() {
        let gate = CooldownGate::new(CooldownKind::DailyBonus, 10);
        assert!(gate.check(None, 0).is_ok());
        assert_eq!(
            gate.check(Some(0), 4),
            Err(crate::error::Rejection::CooldownActive {
                kind: CooldownKind::DailyBonus,
                remaining_ms: 6,
            })
        );
    }

    #[test]
    fn keys_are_distinct() {
        let mut keys: Vec<_> = CooldownKind::ALL.iter().map(|k| k.key()).collect();
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), CooldownKind::ALL.len());
    }
}
