pub mod account;
pub mod boost;
pub mod config;
pub mod ledger;
pub mod mine;
pub mod reward;

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use serde::Serialize;
use supermine_core::{Clock, Config, Database, KvStore, MiningEngine, RewardOutcome, SystemClock};

pub type CliResult = Result<(), Box<dyn std::error::Error>>;

/// Open the engine over the on-disk store and config.
pub fn open_engine() -> Result<MiningEngine<Database, SystemClock>, Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let engine = MiningEngine::new(Database::open()?, SystemClock, config);
    note_launch(&engine);
    Ok(engine)
}

/// Record the first launch. Read-only commands still run when this fails.
pub fn note_launch<S: KvStore, C: Clock>(engine: &MiningEngine<S, C>) {
    if let Err(e) = engine.record_launch() {
        tracing::warn!(error = %e, "could not record first launch");
    }
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> CliResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Seeded RNG when a seed is given, else the thread RNG.
pub fn rng(seed: Option<u64>) -> Box<dyn RngCore> {
    match seed {
        Some(seed) => Box::new(StdRng::seed_from_u64(seed)),
        None => Box::new(rand::thread_rng()),
    }
}

/// There is no ad network here; `--ad-failed` simulates an aborted ad.
pub fn ad_outcome(failed: Option<String>) -> RewardOutcome {
    match failed {
        Some(reason) => RewardOutcome::failed(reason),
        None => RewardOutcome::Completed,
    }
}
