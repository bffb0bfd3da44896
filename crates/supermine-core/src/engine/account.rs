use tracing::info;

use super::{MiningEngine, SessionStatus};
use crate::clock::{self, Clock};
use crate::error::Rejection;
use crate::events::Event;
use crate::ledger::{parse_history, push_history, BalanceLedger, ConversionRecord};
use crate::rewards::DailyStreak;
use crate::storage::{keys, KvStore, KvWrite};
use crate::sync::{RemoteAccount, SyncPayload};

impl<S: KvStore, C: Clock> MiningEngine<S, C> {
    /// Convert the whole point balance.
    ///
    /// # Errors
    /// `BelowConversionThreshold` or `StorageUnavailable`.
    pub fn convert(&self) -> Result<Event, Rejection> {
        let now = self.now_ms();
        let conversion = self.ledger().plan_conversion(&self.config.conversion)?;
        let record = ConversionRecord::new(&conversion, clock::at(now));
        let history = push_history(self.conversion_history(), record.clone());
        let encoded = serde_json::to_string(&history).map_err(|e| Rejection::StorageUnavailable {
            message: e.to_string(),
        })?;

        self.commit(
            "convert",
            &[
                KvWrite::set(keys::POINTS, conversion.after.point_balance),
                KvWrite::set(keys::CONVERTED, conversion.after.converted_total),
                KvWrite::Set(keys::CONVERSIONS, encoded),
            ],
        )?;
        info!(
            coins = conversion.coins,
            converted = conversion.converted,
            "points converted"
        );
        Ok(Event::CoinsConverted {
            record,
            converted_total: conversion.after.converted_total,
            at: clock::at(now),
        })
    }

    /// Conversion history, newest first.
    pub fn conversion_history(&self) -> Vec<ConversionRecord> {
        parse_history(self.read_or_default(keys::CONVERSIONS).as_deref())
    }

    /// Overwrite local balances with the backend's on login.
    ///
    /// # Errors
    /// `StorageUnavailable` if the batch cannot be written.
    pub fn import_remote(&self, account: &RemoteAccount) -> Result<Event, Rejection> {
        let mut ledger = BalanceLedger {
            converted_total: self.ledger().converted_total,
            ..BalanceLedger::default()
        };
        ledger.credit_points(account.coin);
        ledger.credit_mined(account.mine);
        let day_index = account.daily_reward % DailyStreak::DAYS;

        self.commit(
            "import_remote",
            &[
                KvWrite::set(keys::POINTS, ledger.point_balance),
                KvWrite::set(keys::MINED, ledger.mined_total),
                KvWrite::set(keys::DAILY_DAY_INDEX, day_index),
            ],
        )?;
        info!(points = ledger.point_balance, mined = ledger.mined_total, day_index, "account imported");
        Ok(Event::AccountImported {
            ledger,
            day_index,
            at: clock::at(self.now_ms()),
        })
    }

    /// Local state for the backend. Reconciles first so a just-expired
    /// session is included in `mine`.
    pub fn sync_payload(&self, user_id: u64) -> SyncPayload {
        let status = self.reconcile();
        let ledger = self.ledger();
        SyncPayload {
            user_id,
            is_active: u8::from(matches!(status, SessionStatus::Active { .. })),
            coin: ledger.point_balance,
            mine: ledger.mined_total,
            converted: ledger.converted_total,
            daily_reward: self.daily_streak().day_index,
        }
    }

    /// Forget the signed-in account's balances.
    ///
    /// # Errors
    /// `StorageUnavailable` if the batch cannot be written.
    pub fn logout(&self) -> Result<Event, Rejection> {
        self.commit(
            "logout",
            &[
                KvWrite::Remove(keys::POINTS),
                KvWrite::Remove(keys::MINED),
                KvWrite::Remove(keys::CONVERTED),
                KvWrite::Remove(keys::CONVERSIONS),
                KvWrite::Remove(keys::DAILY_DAY_INDEX),
            ],
        )?;
        info!("ledger cleared");
        Ok(Event::LedgerCleared {
            at: clock::at(self.now_ms()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::storage::{Config, MemoryStore};

    fn engine() -> MiningEngine<MemoryStore, ManualClock> {
        MiningEngine::new(MemoryStore::new(), ManualClock::new(0), Config::default())
    }

    #[test]
    fn import_then_export() {
        let engine = engine();
        engine
            .import_remote(&RemoteAccount {
                coin: 3000.0,
                mine: 12.0,
                daily_reward: 9,
            })
            .unwrap();
        let payload = engine.sync_payload(42);
        assert_eq!(payload.user_id, 42);
        assert_eq!(payload.is_active, 0);
        assert_eq!(payload.coin, 3000.0);
        assert_eq!(payload.mine, 12.0);
        assert_eq!(payload.daily_reward, 2);
    }

    #[test]
    fn import_drops_negative_values() {
        let engine = engine();
        engine
            .import_remote(&RemoteAccount {
                coin: -5.0,
                mine: f64::NAN,
                daily_reward: 0,
            })
            .unwrap();
        assert_eq!(engine.ledger(), BalanceLedger::default());
    }

    #[test]
    fn convert_records_history() {
        let engine = engine();
        engine.store().set(keys::POINTS, "2500").unwrap();
        engine.convert().unwrap();
        let history = engine.conversion_history();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].coins, 2500.0);
        assert_eq!(engine.ledger().point_balance, 0.0);
        assert!((engine.ledger().converted_total - 0.15).abs() < 1e-12);
    }

    #[test]
    fn logout_clears_ledger() {
        let engine = engine();
        engine.store().set(keys::POINTS, "2600").unwrap();
        engine.convert().unwrap();
        engine.logout().unwrap();
        assert_eq!(engine.ledger(), BalanceLedger::default());
        assert!(engine.conversion_history().is_empty());
    }
}
