use clap::Subcommand;

use super::{open_engine, print_json, CliResult};

#[derive(Subcommand)]
pub enum LedgerAction {
    /// Print balances as JSON
    Show,
    /// Convert the whole point balance
    Convert,
    /// Print conversion history, newest first
    History {
        /// Maximum number of records
        #[arg(long)]
        limit: Option<usize>,
    },
}

pub fn run(action: LedgerAction) -> CliResult {
    let engine = open_engine()?;

    match action {
        LedgerAction::Show => {
            // Settle an expired session so mined_total is current.
            engine.reconcile();
            print_json(&engine.ledger())?;
        }
        LedgerAction::Convert => print_json(&engine.convert()?)?,
        LedgerAction::History { limit } => {
            let mut history = engine.conversion_history();
            if let Some(limit) = limit {
                history.truncate(limit);
            }
            print_json(&history)?;
        }
    }
    Ok(())
}
