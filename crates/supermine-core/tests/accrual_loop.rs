//! Accrual loop tests on tokio's paused clock.
//!
//! The engine's `ManualClock` is advanced from the tick callback so wall
//! time and tokio time move together.

use std::time::Duration;

use supermine_core::storage::{keys, MiningConfig};
use supermine_core::{
    AccrualLoop, Config, KvStore, LoopExit, ManualClock, MemoryStore, MiningEngine, SessionStatus,
};

const START: i64 = 1_700_000_000_000;

fn engine() -> MiningEngine<MemoryStore, ManualClock> {
    let config = Config {
        mining: MiningConfig {
            base_duration_secs: 5,
            coins_per_session: 1.0,
            tick_ms: 1_000,
        },
        ..Config::default()
    };
    MiningEngine::new(MemoryStore::new(), ManualClock::new(START), config)
}

#[tokio::test(start_paused = true)]
async fn test_loop_finalizes_exactly_once() {
    let engine = engine();
    engine.start_session().unwrap();
    let clock = engine.clock().clone();
    let mut seen = Vec::new();

    let exit = AccrualLoop::from_config(&engine.config().mining)
        .run(
            &engine,
            |status| {
                seen.push(*status);
                clock.advance(1_000);
            },
            std::future::pending(),
        )
        .await;

    assert!(matches!(exit, LoopExit::Finalized(SessionStatus::Finalized { credited: true, .. })));
    // One reconcile before the first tick, then one per second.
    assert_eq!(seen.len(), 6);
    let finalized = seen
        .iter()
        .filter(|s| matches!(s, SessionStatus::Finalized { .. }))
        .count();
    assert_eq!(finalized, 1);
    assert!((engine.ledger().mined_total - 1.0).abs() < 1e-9);
    assert!(!engine.store().contains(keys::SESSION_START));
}

#[tokio::test(start_paused = true)]
async fn test_ticks_write_nothing() {
    let engine = engine();
    engine.start_session().unwrap();
    let writes = engine.store().write_count();
    let clock = engine.clock().clone();
    let mut remaining = Vec::new();

    AccrualLoop::new(Duration::from_millis(1_000))
        .run(
            &engine,
            |status| {
                if let SessionStatus::Active { remaining_ms, .. } = status {
                    remaining.push(*remaining_ms);
                }
                clock.advance(1_000);
            },
            std::future::pending(),
        )
        .await;

    assert_eq!(remaining, vec![5_000, 4_000, 3_000, 2_000, 1_000]);
    // Credit batch plus marker clear.
    assert_eq!(engine.store().write_count(), writes + 2);
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_leaves_session_running() {
    let engine = engine();
    engine.start_session().unwrap();
    let clock = engine.clock().clone();
    let mut ticks = 0;

    let exit = AccrualLoop::new(Duration::from_millis(1_000))
        .run(
            &engine,
            |_| {
                ticks += 1;
                clock.advance(1_000);
            },
            tokio::time::sleep(Duration::from_millis(2_500)),
        )
        .await;

    assert_eq!(exit, LoopExit::Cancelled);
    assert_eq!(ticks, 3);
    assert_eq!(engine.reconcile().remaining_ms(), 2_000);
    assert_eq!(engine.ledger().mined_total, 0.0);
    assert!(engine.store().get(keys::SESSION_START).unwrap().is_some());
}

#[tokio::test(start_paused = true)]
async fn test_idle_engine_returns_immediately() {
    let engine = engine();
    let exit = AccrualLoop::new(Duration::from_millis(1_000))
        .run(&engine, |_| {}, std::future::pending())
        .await;
    assert_eq!(exit, LoopExit::Idle);
}

#[tokio::test(start_paused = true)]
async fn test_expired_while_away_finalizes_before_first_tick() {
    let engine = engine();
    engine.start_session().unwrap();
    engine.clock().advance(60_000);

    let exit = AccrualLoop::new(Duration::from_millis(1_000))
        .run(&engine, |_| {}, std::future::pending())
        .await;
    assert!(matches!(exit, LoopExit::Finalized(_)));
    assert!((engine.ledger().mined_total - 1.0).abs() < 1e-9);
}
