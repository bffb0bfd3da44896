//! # SuperMine Core Library
//!
//! Core logic for the SuperMine mining simulation: a timed mining session
//! that accrues coins, boosts that extend it, cooldown-gated bonus rewards,
//! and a ledger with point conversion. The `supermine-cli` binary is a thin
//! layer over this crate.
//!
//! ## Architecture
//!
//! - **Timer**: session markers, a pure reconciler that derives remaining
//!   time and earnings from "now", cooldown gates, the boost extender, and
//!   an async accrual loop that re-reconciles on every tick
//! - **Engine**: [`MiningEngine`], the façade every command goes through
//! - **Storage**: a string key-value store (SQLite or in-memory) and the
//!   TOML configuration
//! - **Rewards / Ledger / Sync**: bonus programs, balances and the backend
//!   account boundary
//!
//! ## Key Components
//!
//! - [`MiningEngine`]: commands and queries over a [`KvStore`]
//! - [`Reconciler`]: single source of truth for session progress
//! - [`Database`]: SQLite-backed store
//! - [`Config`]: application configuration management

pub mod clock;
pub mod engine;
pub mod error;
pub mod events;
pub mod ledger;
pub mod rewards;
pub mod storage;
pub mod sync;
pub mod timer;

pub use clock::{Clock, ManualClock, SystemClock};
pub use engine::{MiningEngine, SessionStatus};
pub use error::{ConfigError, CoreError, Rejection, StorageError, ValidationError};
pub use events::Event;
pub use ledger::{BalanceLedger, ConversionRecord};
pub use rewards::{DailyStreak, FlipBoard, RewardOutcome, RewardSource};
pub use storage::{Config, Database, KvStore, KvWrite, MemoryStore};
pub use sync::{RemoteAccount, SyncPayload};
pub use timer::{AccrualLoop, CooldownKind, LoopExit, MiningSession, Reconciler, SessionState};
