//! Foreground accrual loop.
//!
//! Re-runs reconciliation on a fixed period while a session is active. The
//! loop never accumulates anything itself: each tick is a fresh derivation
//! from the persisted markers, so stopping it at any point loses nothing.

use std::future::Future;
use std::time::Duration;

use tokio::time::{interval, MissedTickBehavior};
use tracing::debug;

use crate::clock::Clock;
use crate::engine::{MiningEngine, SessionStatus};
use crate::storage::{KvStore, MiningConfig};

/// Why [`AccrualLoop::run`] returned.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LoopExit {
    /// No session was running.
    Idle,
    /// The session ended and was credited.
    Finalized(SessionStatus),
    /// The shutdown future fired first. The session keeps running.
    Cancelled,
}

#[derive(Debug, Clone, Copy)]
pub struct AccrualLoop {
    period: Duration,
}

impl AccrualLoop {
    pub fn new(period: Duration) -> Self {
        Self { period }
    }

    pub fn from_config(config: &MiningConfig) -> Self {
        Self::new(Duration::from_millis(config.tick_ms))
    }

    /// Drive the session until it ends or `shutdown` resolves.
    ///
    /// Reconciles once before the first tick. `on_tick` sees every status,
    /// including the final one.
    pub async fn run<S, C, F, Sd>(
        &self,
        engine: &MiningEngine<S, C>,
        mut on_tick: F,
        shutdown: Sd,
    ) -> LoopExit
    where
        S: KvStore,
        C: Clock,
        F: FnMut(&SessionStatus),
        Sd: Future<Output = ()>,
    {
        let status = engine.reconcile();
        on_tick(&status);
        if let Some(exit) = Self::exit_for(status) {
            return exit;
        }

        let mut ticker = interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately.
        ticker.tick().await;
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                biased;
                _ = &mut shutdown => {
                    debug!("accrual loop cancelled");
                    return LoopExit::Cancelled;
                }
                _ = ticker.tick() => {
                    let status = engine.reconcile();
                    on_tick(&status);
                    if let Some(exit) = Self::exit_for(status) {
                        debug!(?exit, "accrual loop finished");
                        return exit;
                    }
                }
            }
        }
    }

    fn exit_for(status: SessionStatus) -> Option<LoopExit> {
        match status {
            SessionStatus::Active { .. } => None,
            SessionStatus::Idle { .. } => Some(LoopExit::Idle),
            finalized @ SessionStatus::Finalized { .. } => Some(LoopExit::Finalized(finalized)),
        }
    }
}
