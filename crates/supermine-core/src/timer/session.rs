//! Persisted mining session markers.
//!
//! A session is nothing more than a start timestamp plus an optional boosted
//! end. Everything else (remaining time, accrued coins) is derived from those
//! two numbers and the current time. A random id tells apart sessions that
//! happen to start in the same millisecond.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::storage::{keys, KvWrite};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    Idle,
    Active,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MiningSession {
    /// Absent only for markers written without one.
    pub id: Option<Uuid>,
    pub start_ms: i64,
    /// Overrides `start_ms + base_duration` once a boost has been applied.
    pub boosted_end_ms: Option<i64>,
}

impl MiningSession {
    pub fn new(start_ms: i64) -> Self {
        Self {
            id: Some(Uuid::new_v4()),
            start_ms,
            boosted_end_ms: None,
        }
    }

    /// Build from stored markers. No start means no session.
    pub fn from_markers(
        start_ms: Option<i64>,
        boosted_end_ms: Option<i64>,
        id: Option<Uuid>,
    ) -> Option<Self> {
        start_ms.map(|start_ms| Self {
            id,
            start_ms,
            boosted_end_ms,
        })
    }

    pub fn settle_key(&self) -> String {
        settle_key(self.id, self.start_ms)
    }

    /// A boosted end before the start is corrupt and ignored.
    pub fn effective_end_ms(&self, base_duration_ms: u64) -> i64 {
        match self.boosted_end_ms {
            Some(end) if end >= self.start_ms => end,
            _ => self.start_ms.saturating_add(clamp_i64(base_duration_ms)),
        }
    }

    pub fn effective_duration_ms(&self, base_duration_ms: u64) -> u64 {
        self.effective_end_ms(base_duration_ms)
            .saturating_sub(self.start_ms)
            .max(0) as u64
    }

    /// Elapsed time, clamped to `[0, effective_duration]`.
    pub fn elapsed_ms(&self, base_duration_ms: u64, now_ms: i64) -> u64 {
        let elapsed = now_ms.saturating_sub(self.start_ms).max(0) as u64;
        elapsed.min(self.effective_duration_ms(base_duration_ms))
    }

    /// Remaining time, clamped to `[0, effective_duration]`.
    pub fn remaining_ms(&self, base_duration_ms: u64, now_ms: i64) -> u64 {
        let end = self.effective_end_ms(base_duration_ms);
        let remaining = end.saturating_sub(now_ms).max(0) as u64;
        remaining.min(self.effective_duration_ms(base_duration_ms))
    }

    pub fn marker_writes(&self) -> Vec<KvWrite> {
        let boosted = match self.boosted_end_ms {
            Some(end) => KvWrite::set(keys::BOOSTED_END, end),
            None => KvWrite::Remove(keys::BOOSTED_END),
        };
        let id = match self.id {
            Some(id) => KvWrite::set(keys::SESSION_ID, id),
            None => KvWrite::Remove(keys::SESSION_ID),
        };
        vec![KvWrite::set(keys::SESSION_START, self.start_ms), boosted, id]
    }

    pub fn clear_writes() -> Vec<KvWrite> {
        vec![
            KvWrite::Remove(keys::SESSION_START),
            KvWrite::Remove(keys::BOOSTED_END),
            KvWrite::Remove(keys::SESSION_ID),
        ]
    }
}

/// Identifies one session for the settled marker.
pub(crate) fn settle_key(id: Option<Uuid>, start_ms: i64) -> String {
    match id {
        Some(id) => id.to_string(),
        None => start_ms.to_string(),
    }
}

pub(crate) fn clamp_i64(ms: u64) -> i64 {
    i64::try_from(ms).unwrap_or(i64::MAX)
}

/// The last credited session and how much of it was credited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettledMarker {
    pub session: String,
    pub duration_ms: u64,
}

impl SettledMarker {
    pub fn encode(&self) -> String {
        format!("{}/{}", self.session, self.duration_ms)
    }

    /// Corrupt or legacy values read as absent.
    pub fn parse(raw: Option<&str>) -> Option<Self> {
        let (session, duration) = raw?.trim().rsplit_once('/')?;
        Some(Self {
            session: session.to_string(),
            duration_ms: duration.parse().ok()?,
        })
    }
}

/// Parse a stored session id. Anything unparsable is absent.
pub fn parse_session_id(raw: Option<&str>) -> Option<Uuid> {
    raw?.trim().parse().ok()
}

/// Parse a stored epoch-millisecond value. Anything unparsable is absent.
pub fn parse_timestamp(raw: Option<&str>) -> Option<i64> {
    let raw = raw?.trim();
    if let Ok(ms) = raw.parse::<i64>() {
        return Some(ms);
    }
    raw.parse::<f64>()
        .ok()
        .filter(|ms| ms.is_finite() && ms.abs() < i64::MAX as f64)
        .map(|ms| ms as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: u64 = 180_000;

    #[test]
    fn effective_end_prefers_boost() {
        let mut session = MiningSession::new(1_000);
        assert_eq!(session.effective_end_ms(BASE), 181_000);
        session.boosted_end_ms = Some(3_601_000);
        assert_eq!(session.effective_end_ms(BASE), 3_601_000);
        assert_eq!(session.effective_duration_ms(BASE), 3_600_000);
    }

    #[test]
    fn boosted_end_before_start_is_ignored() {
        let session = MiningSession {
            id: None,
            start_ms: 10_000,
            boosted_end_ms: Some(5_000),
        };
        assert_eq!(session.effective_end_ms(BASE), 190_000);
    }

    #[test]
    fn remaining_never_negative_or_above_duration() {
        let session = MiningSession::new(100_000);
        assert_eq!(session.remaining_ms(BASE, 10_000_000), 0);
        // Clock moved backwards before the start.
        assert_eq!(session.remaining_ms(BASE, 0), BASE);
        assert_eq!(session.elapsed_ms(BASE, 0), 0);
    }

    #[test]
    fn marker_writes_clear_stale_boost() {
        let session = MiningSession::new(5);
        let writes = session.marker_writes();
        assert_eq!(writes[0], KvWrite::set(keys::SESSION_START, 5));
        assert_eq!(writes[1], KvWrite::Remove(keys::BOOSTED_END));
        assert_eq!(writes[2], KvWrite::set(keys::SESSION_ID, session.id.unwrap()));
    }

    #[test]
    fn same_millisecond_sessions_have_distinct_keys() {
        assert_ne!(MiningSession::new(5).settle_key(), MiningSession::new(5).settle_key());
        let legacy = MiningSession::from_markers(Some(5), None, None).unwrap();
        assert_eq!(legacy.settle_key(), "5");
    }

    #[test]
    fn settled_marker_roundtrips_and_rejects_garbage() {
        let marker = SettledMarker {
            session: "abc".to_string(),
            duration_ms: 90_000,
        };
        assert_eq!(SettledMarker::parse(Some(&marker.encode())), Some(marker));
        assert_eq!(SettledMarker::parse(Some("1700000000000")), None);
        assert_eq!(SettledMarker::parse(Some("abc/soon")), None);
        assert_eq!(SettledMarker::parse(None), None);
    }

    #[test]
    fn huge_base_duration_saturates() {
        let session = MiningSession::new(0);
        assert_eq!(session.effective_end_ms(u64::MAX), i64::MAX);
    }

    #[test]
    fn parse_timestamp_tolerates_garbage() {
        assert_eq!(parse_timestamp(Some("1700000000000")), Some(1_700_000_000_000));
        assert_eq!(parse_timestamp(Some(" 42 ")), Some(42));
        assert_eq!(parse_timestamp(Some("1.5e3")), Some(1_500));
        assert_eq!(parse_timestamp(Some("NaN")), None);
        assert_eq!(parse_timestamp(Some("yesterday")), None);
        assert_eq!(parse_timestamp(None), None);
    }
}
