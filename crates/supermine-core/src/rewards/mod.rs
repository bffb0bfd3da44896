//! Bonus reward programs.
//!
//! Each program pairs a cooldown gate with a reward rule. The types here are
//! pure; [`crate::engine::MiningEngine`] reads and persists them.

mod daily;
mod flip;
mod hashrate;
mod mystery_box;

pub use daily::DailyStreak;
pub use flip::{FlipBoard, FlipCard};
pub use hashrate::Hashrate;
pub use mystery_box::mystery_box_reference;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::Rejection;

/// Result of a reward-granting action such as watching an ad.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RewardOutcome {
    Completed,
    Failed { reason: String },
}

impl RewardOutcome {
    pub fn failed(reason: impl Into<String>) -> Self {
        RewardOutcome::Failed {
            reason: reason.into(),
        }
    }

    /// # Errors
    /// [`Rejection::RewardFailed`] when the action did not complete.
    pub fn into_result(self) -> Result<(), Rejection> {
        match self {
            RewardOutcome::Completed => Ok(()),
            RewardOutcome::Failed { reason } => Err(Rejection::RewardFailed { message: reason }),
        }
    }
}

/// Where granted points came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RewardSource {
    MysteryBox,
    DailyBonus { day_index: u8 },
    FlipCard { index: usize },
}

/// Uniform draw in `[min, max]`.
pub fn draw<R: Rng + ?Sized>(rng: &mut R, min: u64, max: u64) -> u64 {
    if min >= max {
        return min;
    }
    rng.gen_range(min..=max)
}
