use clap::Subcommand;
use serde_json::json;

use super::{open_engine, print_json, rng, CliResult};

#[derive(Subcommand)]
pub enum RewardAction {
    /// Cooldowns, daily streak and hashrate
    Status,
    /// Open the mystery box
    MysteryBox {
        /// Seed the reward draw
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Claim the daily bonus
    Daily,
    /// Flip a card on the Flip & Win board
    Flip {
        /// Card index, starting at 0
        index: usize,
        /// Seed the reward draw
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Show the Flip & Win board
    Board,
}

pub fn run(action: RewardAction) -> CliResult {
    let engine = open_engine()?;

    match action {
        RewardAction::Status => {
            let hashrate = engine.hashrate();
            print_json(&json!({
                "cooldowns": engine.cooldowns(),
                "daily": engine.daily_streak(),
                "hashrate": hashrate.current,
                "hashrate_max": hashrate.max,
            }))?;
        }
        RewardAction::MysteryBox { seed } => {
            let mut rng = rng(seed);
            print_json(&engine.claim_mystery_box(rng.as_mut())?)?;
        }
        RewardAction::Daily => print_json(&engine.claim_daily()?)?,
        RewardAction::Flip { index, seed } => {
            let mut rng = rng(seed);
            print_json(&engine.flip_card(index, rng.as_mut())?)?;
        }
        RewardAction::Board => {
            let board = engine.flip_board();
            print_json(&json!({
                "cards": board.cards,
                "opened": board.opened_count(),
                "total_won": board.total_won(),
                "lock": engine.cooldown(supermine_core::CooldownKind::FlipReset),
            }))?;
        }
    }
    Ok(())
}
