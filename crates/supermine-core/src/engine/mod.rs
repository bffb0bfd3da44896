//! Mining engine.
//!
//! [`MiningEngine`] ties a [`KvStore`], a [`Clock`] and a [`Config`]
//! together and exposes every user-facing command.
//!
//! ## Conventions
//!
//! - Commands return an [`Event`] on success or a [`Rejection`]. A rejection
//!   means nothing was written.
//! - Each command persists through a single [`KvStore::apply`] batch.
//!   Finalizing a session is the one exception: it credits first, then
//!   clears the markers, and the settled marker makes a repeated credit a
//!   no-op.
//! - Failed reads degrade to safe defaults (idle session, open gate, zero
//!   balance) and are logged. Failed writes surface as
//!   [`Rejection::StorageUnavailable`].
//!
//! ```ignore
//! let engine = MiningEngine::new(Database::open()?, SystemClock, Config::load()?);
//! engine.start_session()?;
//! let status = engine.reconcile(); // call again on every tick or launch
//! ```

mod account;
mod rewards;
mod session;

pub use session::SessionStatus;

use tracing::{debug, warn};

use crate::clock::{self, Clock, SystemClock};
use crate::error::{Rejection, StorageError};
use crate::events::Event;
use crate::ledger::BalanceLedger;
use crate::rewards::{mystery_box_reference, DailyStreak, Hashrate};
use crate::storage::{keys, Config, KvStore, KvWrite};
use crate::timer::{parse_timestamp, CooldownGate, CooldownKind, CooldownStatus, Reconciler};

pub struct MiningEngine<S, C = SystemClock> {
    store: S,
    clock: C,
    config: Config,
    reconciler: Reconciler,
}

impl<S: KvStore, C: Clock> MiningEngine<S, C> {
    pub fn new(store: S, clock: C, config: Config) -> Self {
        let reconciler = Reconciler::from_config(&config.mining);
        Self {
            store,
            clock,
            config,
            reconciler,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn now_ms(&self) -> i64 {
        self.clock.now_ms()
    }

    pub fn ledger(&self) -> BalanceLedger {
        BalanceLedger::from_raw(
            self.read_or_default(keys::POINTS).as_deref(),
            self.read_or_default(keys::MINED).as_deref(),
            self.read_or_default(keys::CONVERTED).as_deref(),
        )
    }

    pub fn hashrate(&self) -> Hashrate {
        Hashrate::parse(
            self.read_or_default(keys::HASHRATE).as_deref(),
            &self.config.hashrate,
        )
    }

    pub fn daily_streak(&self) -> DailyStreak {
        DailyStreak {
            day_index: DailyStreak::parse_index(self.read_or_default(keys::DAILY_DAY_INDEX).as_deref()),
            last_claim_ms: self.read_timestamp(keys::COOLDOWN_DAILY_BONUS),
        }
    }

    pub fn cooldown(&self, kind: CooldownKind) -> CooldownStatus {
        let now = self.now_ms();
        self.gate(kind).status(self.cooldown_reference(kind, now), now)
    }

    pub fn cooldowns(&self) -> Vec<CooldownStatus> {
        CooldownKind::ALL.iter().map(|&kind| self.cooldown(kind)).collect()
    }

    /// Full state after reconciling the session.
    pub fn snapshot(&self) -> Event {
        let session = self.reconcile();
        Event::StateSnapshot {
            session,
            ledger: self.ledger(),
            hashrate: self.hashrate().current,
            daily: self.daily_streak(),
            cooldowns: self.cooldowns(),
            at: clock::at(self.now_ms()),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Record the first launch time if it is not yet known.
    /// Returns true when this call recorded it.
    ///
    /// # Errors
    /// [`Rejection::StorageUnavailable`] if the write fails.
    pub fn record_launch(&self) -> Result<bool, Rejection> {
        match self.store.get(keys::FIRST_LAUNCH) {
            Ok(Some(_)) => Ok(false),
            Ok(None) => {
                let now = self.now_ms();
                self.commit("record_launch", &[KvWrite::set(keys::FIRST_LAUNCH, now)])?;
                debug!(first_launch = now, "first launch recorded");
                Ok(true)
            }
            Err(e) => {
                warn!(error = %e, "could not read first launch");
                Ok(false)
            }
        }
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn gate(&self, kind: CooldownKind) -> CooldownGate {
        CooldownGate::new(kind, self.config.cooldowns.window_ms(kind))
    }

    fn cooldown_reference(&self, kind: CooldownKind, now: i64) -> Option<i64> {
        if kind != CooldownKind::MysteryBox {
            return self.read_timestamp(kind.key());
        }
        // An unrecorded launch counts as launching now.
        let launch = match self.store.get(keys::FIRST_LAUNCH) {
            Ok(None) => Some(now),
            Ok(Some(raw)) => parse_timestamp(Some(raw.as_str())),
            Err(e) => {
                warn!(error = %e, "could not read first launch");
                None
            }
        };
        mystery_box_reference(self.read_timestamp(kind.key()), launch)
    }

    fn read_or_default(&self, key: &'static str) -> Option<String> {
        match self.store.get(key) {
            Ok(value) => value,
            Err(e) => {
                warn!(key, error = %e, "store read failed, using default");
                None
            }
        }
    }

    fn read_timestamp(&self, key: &'static str) -> Option<i64> {
        parse_timestamp(self.read_or_default(key).as_deref())
    }

    fn commit(&self, op: &'static str, writes: &[KvWrite]) -> Result<(), Rejection> {
        self.store.apply(writes).map_err(|e: StorageError| {
            warn!(op, error = %e, "store write failed");
            Rejection::from(e)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::storage::MemoryStore;

    fn engine(now: i64) -> MiningEngine<MemoryStore, ManualClock> {
        MiningEngine::new(MemoryStore::new(), ManualClock::new(now), Config::default())
    }

    #[test]
    fn fresh_engine_is_empty() {
        let engine = engine(0);
        assert_eq!(engine.ledger(), BalanceLedger::default());
        assert_eq!(engine.hashrate().current, 30);
        assert_eq!(engine.daily_streak().day_index, 0);
    }

    #[test]
    fn record_launch_only_once() {
        let engine = engine(1_000);
        assert!(engine.record_launch().unwrap());
        engine.clock().advance(5_000);
        assert!(!engine.record_launch().unwrap());
        assert_eq!(
            engine.store().get(keys::FIRST_LAUNCH).unwrap().as_deref(),
            Some("1000")
        );
    }

    #[test]
    fn unreadable_store_fails_open() {
        let store = MemoryStore::new();
        store.set(keys::COOLDOWN_DAILY_BONUS, "0").unwrap();
        store.set(keys::POINTS, "500").unwrap();
        store.set_fail_reads(true);
        let engine = MiningEngine::new(store, ManualClock::new(1), Config::default());
        assert!(engine.cooldown(CooldownKind::DailyBonus).available);
        assert!(engine.cooldown(CooldownKind::MysteryBox).available);
        assert_eq!(engine.ledger().point_balance, 0.0);
    }

    #[test]
    fn corrupt_reference_fails_open() {
        let engine = engine(10);
        engine.store().set(keys::COOLDOWN_TIME_BOOST_AD, "soon").unwrap();
        assert!(engine.cooldown(CooldownKind::TimeBoostAd).available);
    }

    #[test]
    fn snapshot_lists_every_cooldown() {
        match engine(0).snapshot() {
            Event::StateSnapshot { cooldowns, .. } => assert_eq!(cooldowns.len(), 5),
            other => panic!("expected snapshot, got {other:?}"),
        }
    }
}
