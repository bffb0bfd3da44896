use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::MiningEngine;
use crate::clock::{self, Clock};
use crate::error::Rejection;
use crate::events::Event;
use crate::rewards::RewardOutcome;
use crate::storage::{keys, KvStore, KvWrite};
use crate::timer::{
    parse_session_id, BoostExtender, BoostSource, CooldownKind, MiningSession, Reconciliation,
    SessionState, SettledMarker, SettledSession,
};

/// Session state as seen by one reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SessionStatus {
    Idle {
        mined_total: f64,
    },
    Active {
        start_ms: i64,
        end_ms: i64,
        remaining_ms: u64,
        session_accrued: f64,
        /// Ledger total plus what this session has accrued so far.
        mined_display: f64,
    },
    /// The session ended during this reconciliation and was credited.
    Finalized {
        start_ms: i64,
        duration_ms: u64,
        earned: f64,
        mined_total: f64,
        credited: bool,
    },
}

impl SessionStatus {
    pub fn state(&self) -> SessionState {
        match self {
            SessionStatus::Active { .. } => SessionState::Active,
            _ => SessionState::Idle,
        }
    }

    pub fn remaining_ms(&self) -> u64 {
        match self {
            SessionStatus::Active { remaining_ms, .. } => *remaining_ms,
            _ => 0,
        }
    }
}

impl<S: KvStore, C: Clock> MiningEngine<S, C> {
    /// Re-derive the session from its persisted markers.
    ///
    /// Writes nothing while the session is active. An expired session is
    /// finalized here, exactly once.
    pub fn reconcile(&self) -> SessionStatus {
        let now = self.now_ms();
        let session = self.load_session();
        if let Some(settled) = session.as_ref().and_then(|s| self.already_settled(s)) {
            return self.finalize_or_idle(settled);
        }
        match self.reconciler.reconcile(session.as_ref(), now) {
            Reconciliation::Idle => SessionStatus::Idle {
                mined_total: self.ledger().mined_total,
            },
            Reconciliation::Active(active) => {
                debug!(
                    remaining_ms = active.remaining_ms,
                    accrued = active.accrued,
                    "session active"
                );
                SessionStatus::Active {
                    start_ms: active.start_ms,
                    end_ms: active.end_ms,
                    remaining_ms: active.remaining_ms,
                    session_accrued: active.accrued,
                    mined_display: self.ledger().mined_total + active.accrued,
                }
            }
            Reconciliation::Expired(settled) => self.finalize_or_idle(settled),
        }
    }

    /// Start a session. Returns `Ok(None)` if one is already running.
    ///
    /// # Errors
    /// [`Rejection::StorageUnavailable`] if the markers cannot be written.
    pub fn start_session(&self) -> Result<Option<Event>, Rejection> {
        if let SessionStatus::Active { .. } = self.reconcile() {
            return Ok(None);
        }

        let now = self.now_ms();
        let session = MiningSession::new(now);
        self.commit("start_session", &session.marker_writes())?;

        let duration_ms = self.reconciler.base_duration_ms();
        let end_ms = session.effective_end_ms(duration_ms);
        info!(start_ms = now, end_ms, "session started");
        Ok(Some(Event::SessionStarted {
            start_ms: now,
            end_ms,
            duration_ms,
            at: clock::at(now),
        }))
    }

    /// End the running session now, crediting the elapsed part.
    /// Returns `Ok(None)` if nothing was running.
    ///
    /// # Errors
    /// [`Rejection::StorageUnavailable`] if the credit cannot be written.
    pub fn cancel_session(&self) -> Result<Option<Event>, Rejection> {
        let now = self.now_ms();
        let Some(session) = self.load_session() else {
            return Ok(None);
        };
        let settled = match self.already_settled(&session) {
            Some(settled) => settled,
            None => match self.reconciler.reconcile(Some(&session), now) {
                Reconciliation::Idle => return Ok(None),
                Reconciliation::Active(_) => self.reconciler.settle_early(&session, now),
                Reconciliation::Expired(settled) => settled,
            },
        };
        let status = self.finalize(settled)?;
        info!(start_ms = session.start_ms, "session cancelled");
        Ok(Event::from_status(&status, clock::at(now)))
    }

    /// Extend the session by the ad reward, gated by the time-boost-ad cooldown.
    ///
    /// # Errors
    /// `CooldownActive`, `RewardFailed`, `BoostCapReached` or
    /// `StorageUnavailable`.
    pub fn boost_with_ad(&self, outcome: RewardOutcome) -> Result<Event, Rejection> {
        let now = self.now_ms();
        let kind = CooldownKind::TimeBoostAd;
        self.gate(kind).check(self.cooldown_reference(kind, now), now)?;
        outcome.into_result().inspect_err(|r| {
            warn!(error = %r, "time boost ad did not complete");
        })?;

        self.apply_boost(
            BoostSource::Ad,
            self.config.boost.ad_extension_ms(),
            vec![KvWrite::set(kind.key(), now)],
            now,
        )
    }

    /// Buy session time with points.
    ///
    /// # Errors
    /// `UnknownPackage`, `InsufficientBalance`, `BoostCapReached` or
    /// `StorageUnavailable`. The balance is untouched on any of them.
    pub fn boost_with_package(&self, index: usize) -> Result<Event, Rejection> {
        let package = self
            .config
            .boost
            .packages
            .get(index)
            .cloned()
            .ok_or(Rejection::UnknownPackage { index })?;

        let now = self.now_ms();
        let mut ledger = self.ledger();
        ledger.debit(package.cost as f64)?;

        self.apply_boost(
            BoostSource::Coins {
                package: index,
                cost: package.cost,
            },
            package.extension_secs.saturating_mul(1000),
            vec![KvWrite::set(keys::POINTS, ledger.point_balance)],
            now,
        )
    }

    fn apply_boost(
        &self,
        source: BoostSource,
        delta_ms: u64,
        extra: Vec<KvWrite>,
        now: i64,
    ) -> Result<Event, Rejection> {
        let mut session = self.load_session();
        if let Some(settled) = session.as_ref().and_then(|s| self.already_settled(s)) {
            self.finalize(settled)?;
            session = None;
        }
        let active = match self.reconciler.reconcile(session.as_ref(), now) {
            Reconciliation::Active(active) => Some(active),
            Reconciliation::Expired(settled) => {
                self.finalize(settled)?;
                None
            }
            Reconciliation::Idle => None,
        };

        let plan = BoostExtender::new(self.config.boost.cap_ms()).plan(active.as_ref(), delta_ms, now)?;
        let mut writes = plan.session.marker_writes();
        writes.extend(extra);
        self.commit("boost", &writes)?;

        info!(
            ?source,
            added_ms = plan.added_ms(),
            remaining_ms = plan.remaining_ms,
            started = plan.started,
            "session boosted"
        );
        Ok(Event::SessionBoosted {
            source,
            added_ms: plan.added_ms(),
            remaining_ms: plan.remaining_ms,
            end_ms: plan.end_ms(),
            started: plan.started,
            at: clock::at(now),
        })
    }

    pub(super) fn load_session(&self) -> Option<MiningSession> {
        MiningSession::from_markers(
            self.read_timestamp(keys::SESSION_START),
            self.read_timestamp(keys::BOOSTED_END),
            parse_session_id(self.read_or_default(keys::SESSION_ID).as_deref()),
        )
    }

    fn settled_marker(&self) -> Option<SettledMarker> {
        SettledMarker::parse(self.read_or_default(keys::SETTLED).as_deref())
    }

    /// The credited part of `session` if it was already credited and only
    /// its markers are left behind.
    fn already_settled(&self, session: &MiningSession) -> Option<SettledSession> {
        let marker = self.settled_marker().filter(|m| m.session == session.settle_key())?;
        Some(SettledSession {
            id: session.id,
            start_ms: session.start_ms,
            duration_ms: marker.duration_ms,
            earned: self.reconciler.earned_for(marker.duration_ms),
        })
    }

    fn finalize_or_idle(&self, settled: SettledSession) -> SessionStatus {
        match self.finalize(settled) {
            Ok(status) => status,
            // Markers are still in place; the next reconcile retries.
            Err(_) => SessionStatus::Idle {
                mined_total: self.ledger().mined_total,
            },
        }
    }

    /// Credit a settled session, then clear its markers.
    ///
    /// The credit and the settled marker land in one batch. If clearing the
    /// markers fails, the next call sees the settled marker and only clears.
    fn finalize(&self, settled: SettledSession) -> Result<SessionStatus, Rejection> {
        let mut ledger = self.ledger();
        let key = settled.settle_key();
        let already_credited = self.settled_marker().is_some_and(|m| m.session == key);

        if !already_credited {
            ledger.credit_mined(settled.earned);
            let marker = SettledMarker {
                session: key,
                duration_ms: settled.duration_ms,
            };
            self.commit(
                "finalize_credit",
                &[
                    KvWrite::set(keys::MINED, ledger.mined_total),
                    KvWrite::Set(keys::SETTLED, marker.encode()),
                ],
            )?;
        }

        if self
            .commit("finalize_clear", &MiningSession::clear_writes())
            .is_err()
        {
            debug!(start_ms = settled.start_ms, "session markers left for next reconcile");
        }

        info!(
            start_ms = settled.start_ms,
            duration_ms = settled.duration_ms,
            earned = settled.earned,
            credited = !already_credited,
            "session finalized"
        );
        Ok(SessionStatus::Finalized {
            start_ms: settled.start_ms,
            duration_ms: settled.duration_ms,
            earned: settled.earned,
            mined_total: ledger.mined_total,
            credited: !already_credited,
        })
    }
}
