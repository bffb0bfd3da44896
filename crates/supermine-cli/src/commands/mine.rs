use clap::Subcommand;
use supermine_core::{clock, AccrualLoop, Clock, Event, LoopExit};

use super::{open_engine, print_json, CliResult};

#[derive(Subcommand)]
pub enum MineAction {
    /// Start a mining session
    Start,
    /// Print the reconciled state as JSON
    Status,
    /// Follow the running session until it finishes (Ctrl-C to detach)
    Watch,
    /// End the session now, crediting the elapsed part
    Cancel,
}

pub fn run(action: MineAction) -> CliResult {
    let engine = open_engine()?;

    match action {
        MineAction::Start => match engine.start_session()? {
            Some(event) => print_json(&event)?,
            None => print_json(&engine.snapshot())?,
        },
        MineAction::Status => print_json(&engine.snapshot())?,
        MineAction::Watch => {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()?;
            let accrual = AccrualLoop::from_config(&engine.config().mining);
            let exit = runtime.block_on(accrual.run(
                &engine,
                |status| {
                    let at = clock::at(engine.clock().now_ms());
                    if let Some(event) = Event::from_status(status, at) {
                        if let Ok(line) = serde_json::to_string(&event) {
                            println!("{line}");
                        }
                    }
                },
                async {
                    if let Err(e) = tokio::signal::ctrl_c().await {
                        tracing::warn!(error = %e, "could not listen for Ctrl-C");
                        std::future::pending::<()>().await;
                    }
                },
            ));
            match exit {
                LoopExit::Idle => print_json(&engine.snapshot())?,
                LoopExit::Cancelled => tracing::info!("detached; the session keeps running"),
                LoopExit::Finalized(_) => {}
            }
        }
        MineAction::Cancel => match engine.cancel_session()? {
            Some(event) => print_json(&event)?,
            None => print_json(&engine.snapshot())?,
        },
    }
    Ok(())
}
