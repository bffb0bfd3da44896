//! Coin balances and point conversion.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Rejection;
use crate::storage::ConversionConfig;

/// Conversion history keeps at most this many records, newest first.
pub const HISTORY_LIMIT: usize = 50;

/// The user's three balances. All values are finite and non-negative.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BalanceLedger {
    /// Spendable coins from rewards and imports.
    pub point_balance: f64,
    /// Lifetime coins credited by finished mining sessions.
    pub mined_total: f64,
    /// Lifetime converted amount.
    pub converted_total: f64,
}

impl BalanceLedger {
    pub fn from_raw(points: Option<&str>, mined: Option<&str>, converted: Option<&str>) -> Self {
        Self {
            point_balance: parse_amount(points),
            mined_total: parse_amount(mined),
            converted_total: parse_amount(converted),
        }
    }

    pub fn can_afford(&self, cost: f64) -> bool {
        self.point_balance >= cost
    }

    /// Deduct `cost` from the point balance.
    ///
    /// # Errors
    /// [`Rejection::InsufficientBalance`] when the balance is short.
    pub fn debit(&mut self, cost: f64) -> Result<(), Rejection> {
        if !self.can_afford(cost) {
            return Err(Rejection::InsufficientBalance {
                required: cost,
                available: self.point_balance,
            });
        }
        self.point_balance = sanitize(self.point_balance - cost);
        Ok(())
    }

    pub fn credit_points(&mut self, amount: f64) {
        self.point_balance = sanitize(self.point_balance + amount);
    }

    pub fn credit_mined(&mut self, amount: f64) {
        self.mined_total = sanitize(self.mined_total + amount);
    }

    /// Convert the whole point balance at `terms.rate`.
    ///
    /// # Errors
    /// [`Rejection::BelowConversionThreshold`] below `terms.minimum_coins`.
    pub fn plan_conversion(&self, terms: &ConversionConfig) -> Result<Conversion, Rejection> {
        let minimum = terms.minimum_coins as f64;
        if self.point_balance < minimum {
            return Err(Rejection::BelowConversionThreshold {
                minimum,
                available: self.point_balance,
            });
        }
        let converted = self.point_balance * terms.rate;
        Ok(Conversion {
            coins: self.point_balance,
            converted,
            after: BalanceLedger {
                point_balance: 0.0,
                converted_total: sanitize(self.converted_total + converted),
                ..*self
            },
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Conversion {
    pub coins: f64,
    pub converted: f64,
    pub after: BalanceLedger,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionRecord {
    pub id: Uuid,
    pub at: DateTime<Utc>,
    pub coins: f64,
    pub converted: f64,
}

impl ConversionRecord {
    pub fn new(conversion: &Conversion, at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            at,
            coins: conversion.coins,
            converted: conversion.converted,
        }
    }
}

/// Prepend `record`, dropping the oldest entries beyond [`HISTORY_LIMIT`].
pub fn push_history(mut history: Vec<ConversionRecord>, record: ConversionRecord) -> Vec<ConversionRecord> {
    history.insert(0, record);
    history.truncate(HISTORY_LIMIT);
    history
}

/// Decode stored history. Corrupt JSON reads as empty.
pub fn parse_history(raw: Option<&str>) -> Vec<ConversionRecord> {
    raw.and_then(|json| serde_json::from_str(json).ok())
        .unwrap_or_default()
}

/// Parse a stored balance. Garbage, negatives and non-finite values read as 0.
pub fn parse_amount(raw: Option<&str>) -> f64 {
    raw.and_then(|s| s.trim().parse::<f64>().ok())
        .map(sanitize)
        .unwrap_or(0.0)
}

fn sanitize(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn terms() -> ConversionConfig {
        ConversionConfig {
            rate: 0.00006,
            minimum_coins: 2500,
        }
    }

    #[test]
    fn parse_amount_sanitizes() {
        assert_eq!(parse_amount(Some("12.5")), 12.5);
        assert_eq!(parse_amount(Some("-3")), 0.0);
        assert_eq!(parse_amount(Some("inf")), 0.0);
        assert_eq!(parse_amount(Some("NaN")), 0.0);
        assert_eq!(parse_amount(Some("lots")), 0.0);
        assert_eq!(parse_amount(None), 0.0);
    }

    #[test]
    fn debit_refuses_overdraft() {
        let mut ledger = BalanceLedger {
            point_balance: 100.0,
            ..Default::default()
        };
        assert_eq!(
            ledger.debit(250.0),
            Err(Rejection::InsufficientBalance {
                required: 250.0,
                available: 100.0
            })
        );
        assert_eq!(ledger.point_balance, 100.0);
        ledger.debit(100.0).unwrap();
        assert_eq!(ledger.point_balance, 0.0);
    }

    #[test]
    fn conversion_below_minimum_is_rejected() {
        let ledger = BalanceLedger {
            point_balance: 2499.0,
            ..Default::default()
        };
        assert!(matches!(
            ledger.plan_conversion(&terms()),
            Err(Rejection::BelowConversionThreshold { .. })
        ));
    }

    #[test]
    fn zero_minimum_allows_converting_an_empty_balance() {
        let terms = ConversionConfig {
            minimum_coins: 0,
            ..terms()
        };
        let conversion = BalanceLedger::default().plan_conversion(&terms).unwrap();
        assert_eq!(conversion.coins, 0.0);
        assert_eq!(conversion.converted, 0.0);
        assert_eq!(conversion.after, BalanceLedger::default());
    }

    #[test]
    fn conversion_at_exact_minimum_is_allowed() {
        let ledger = BalanceLedger {
            point_balance: 2500.0,
            ..Default::default()
        };
        assert!(ledger.plan_conversion(&terms()).is_ok());
    }

    #[test]
    fn conversion_zeroes_points_and_accumulates() {
        let ledger = BalanceLedger {
            point_balance: 3000.0,
            mined_total: 4.0,
            converted_total: 1.0,
        };
        let conversion = ledger.plan_conversion(&terms()).unwrap();
        assert!((conversion.converted - 0.18).abs() < 1e-12);
        assert_eq!(conversion.after.point_balance, 0.0);
        assert_eq!(conversion.after.mined_total, 4.0);
        assert!((conversion.after.converted_total - 1.18).abs() < 1e-12);
    }

    #[test]
    fn history_is_capped_newest_first() {
        let conversion = Conversion {
            coins: 1.0,
            converted: 1.0,
            after: BalanceLedger::default(),
        };
        let mut history = Vec::new();
        for _ in 0..HISTORY_LIMIT + 5 {
            history = push_history(history, ConversionRecord::new(&conversion, Utc::now()));
        }
        let newest = ConversionRecord::new(&conversion, Utc::now());
        let id = newest.id;
        history = push_history(history, newest);
        assert_eq!(history.len(), HISTORY_LIMIT);
        assert_eq!(history[0].id, id);
    }

    #[test]
    fn corrupt_history_reads_empty() {
        assert!(parse_history(Some("{not json")).is_empty());
        assert!(parse_history(None).is_empty());
    }
}
