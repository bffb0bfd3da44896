use rand::Rng;
use tracing::{info, warn};

use super::MiningEngine;
use crate::clock::{self, Clock};
use crate::error::Rejection;
use crate::events::Event;
use crate::rewards::{draw, FlipBoard, RewardOutcome, RewardSource};
use crate::storage::{keys, KvStore, KvWrite};
use crate::timer::CooldownKind;

impl<S: KvStore, C: Clock> MiningEngine<S, C> {
    /// Open the mystery box.
    ///
    /// The box first opens one window after first launch. If the launch was
    /// never recorded, this records it and reports the full window.
    ///
    /// # Errors
    /// `CooldownActive` or `StorageUnavailable`.
    pub fn claim_mystery_box<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Event, Rejection> {
        let kind = CooldownKind::MysteryBox;
        let gate = self.gate(kind);
        if self.record_launch()? {
            return Err(Rejection::CooldownActive {
                kind,
                remaining_ms: gate.window_ms(),
            });
        }

        let now = self.now_ms();
        gate.check(self.cooldown_reference(kind, now), now)?;

        let rewards = &self.config.rewards;
        let amount = draw(rng, rewards.mystery_box_min, rewards.mystery_box_max);
        self.grant(
            "claim_mystery_box",
            RewardSource::MysteryBox,
            amount,
            vec![KvWrite::set(kind.key(), now)],
            now,
        )
    }

    /// Claim today's slot of the seven-day streak.
    ///
    /// # Errors
    /// `CooldownActive` or `StorageUnavailable`.
    pub fn claim_daily(&self) -> Result<Event, Rejection> {
        let kind = CooldownKind::DailyBonus;
        let now = self.now_ms();
        let streak = self.daily_streak();
        self.gate(kind).check(streak.last_claim_ms, now)?;

        let amount = streak.reward(&self.config.rewards.daily);
        self.grant(
            "claim_daily",
            RewardSource::DailyBonus {
                day_index: streak.day_index,
            },
            amount,
            vec![
                KvWrite::set(keys::DAILY_DAY_INDEX, streak.next_index()),
                KvWrite::set(kind.key(), now),
            ],
            now,
        )
    }

    /// Current board. A locked board whose window has passed reads as fresh.
    pub fn flip_board(&self) -> FlipBoard {
        let cards = self.config.rewards.flip_cards;
        let board = FlipBoard::parse(self.read_or_default(keys::FLIP_BOARD).as_deref(), cards);
        if board.is_complete() && self.cooldown(CooldownKind::FlipReset).available {
            return FlipBoard::fresh(cards);
        }
        board
    }

    /// Flip card `index`.
    ///
    /// # Errors
    /// `CooldownActive` while the board is locked, `InvalidCard`,
    /// `CardAlreadyFlipped` or `StorageUnavailable`.
    pub fn flip_card<R: Rng + ?Sized>(&self, index: usize, rng: &mut R) -> Result<Event, Rejection> {
        let kind = CooldownKind::FlipReset;
        let now = self.now_ms();
        let cards = self.config.rewards.flip_cards;
        let mut board = FlipBoard::parse(self.read_or_default(keys::FLIP_BOARD).as_deref(), cards);
        let mut writes = Vec::new();

        if board.is_complete() {
            self.gate(kind).check(self.read_timestamp(kind.key()), now)?;
            board = FlipBoard::fresh(cards);
            writes.push(KvWrite::Remove(kind.key()));
            info!("flip board reset");
        }

        board.check_flip(index)?;
        let amount = draw(rng, self.config.rewards.flip_min, self.config.rewards.flip_max);
        board.flip(index, amount)?;

        if board.is_complete() {
            writes.push(KvWrite::set(kind.key(), now));
        }
        let encoded = serde_json::to_string(&board).map_err(|e| Rejection::StorageUnavailable {
            message: e.to_string(),
        })?;
        writes.push(KvWrite::Set(keys::FLIP_BOARD, encoded));

        self.grant("flip_card", RewardSource::FlipCard { index }, amount, writes, now)
    }

    /// Raise the displayed hashrate after a completed ad.
    ///
    /// # Errors
    /// `CooldownActive`, `HashrateMaxed`, `RewardFailed` or
    /// `StorageUnavailable`.
    pub fn boost_hashrate(&self, outcome: RewardOutcome) -> Result<Event, Rejection> {
        let kind = CooldownKind::HashrateAd;
        let now = self.now_ms();
        self.gate(kind).check(self.read_timestamp(kind.key()), now)?;
        let next = self.hashrate().boosted(self.config.hashrate.step)?;
        outcome.into_result().inspect_err(|r| {
            warn!(error = %r, "hashrate ad did not complete");
        })?;

        self.commit(
            "boost_hashrate",
            &[
                KvWrite::set(keys::HASHRATE, next.current),
                KvWrite::set(kind.key(), now),
            ],
        )?;
        info!(hashrate = next.current, max = next.max, "hashrate boosted");
        Ok(Event::HashrateBoosted {
            hashrate: next.current,
            max: next.max,
            at: clock::at(now),
        })
    }

    /// Credit `amount` points together with the program's own writes.
    fn grant(
        &self,
        op: &'static str,
        source: RewardSource,
        amount: u64,
        mut writes: Vec<KvWrite>,
        now: i64,
    ) -> Result<Event, Rejection> {
        let mut ledger = self.ledger();
        ledger.credit_points(amount as f64);
        writes.push(KvWrite::set(keys::POINTS, ledger.point_balance));
        self.commit(op, &writes)?;

        info!(?source, amount, point_balance = ledger.point_balance, "reward granted");
        Ok(Event::RewardGranted {
            source,
            amount,
            point_balance: ledger.point_balance,
            at: clock::at(now),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::storage::{Config, MemoryStore};
    use rand::SeedableRng;
    use rand_pcg::Pcg64;

    const HOUR: i64 = 60 * 60 * 1000;

    fn engine() -> MiningEngine<MemoryStore, ManualClock> {
        MiningEngine::new(MemoryStore::new(), ManualClock::new(0), Config::default())
    }

    #[test]
    fn first_mystery_box_check_records_launch() {
        let engine = engine();
        let mut rng = Pcg64::seed_from_u64(1);
        assert_eq!(
            engine.claim_mystery_box(&mut rng).err(),
            Some(Rejection::CooldownActive {
                kind: CooldownKind::MysteryBox,
                remaining_ms: 3 * HOUR as u64,
            })
        );
        engine.clock().set(3 * HOUR);
        assert!(engine.claim_mystery_box(&mut rng).is_ok());
        let points = engine.ledger().point_balance;
        assert!((10.0..=200.0).contains(&points));
    }

    #[test]
    fn daily_claim_advances_day() {
        let engine = engine();
        engine.claim_daily().unwrap();
        assert_eq!(engine.ledger().point_balance, 100.0);
        assert_eq!(engine.daily_streak().day_index, 1);
        assert!(engine.claim_daily().is_err());
    }

    #[test]
    fn flip_rejects_locked_board() {
        let engine = engine();
        let mut rng = Pcg64::seed_from_u64(3);
        for i in 0..4 {
            engine.flip_card(i, &mut rng).unwrap();
        }
        assert!(matches!(
            engine.flip_card(0, &mut rng),
            Err(Rejection::CooldownActive {
                kind: CooldownKind::FlipReset,
                ..
            })
        ));
    }

    #[test]
    fn hashrate_needs_completed_ad() {
        let engine = engine();
        assert!(engine.boost_hashrate(RewardOutcome::failed("skipped")).is_err());
        assert_eq!(engine.hashrate().current, 30);
        engine.boost_hashrate(RewardOutcome::Completed).unwrap();
        assert_eq!(engine.hashrate().current, 40);
    }
}
