use clap::Subcommand;
use supermine_core::RemoteAccount;

use super::{open_engine, print_json, CliResult};

#[derive(Subcommand)]
pub enum AccountAction {
    /// Replace local balances with the backend's
    Import {
        /// Account JSON as returned by the backend, e.g. '{"coin":10,"mine":2,"daily_reward":1}'
        #[arg(long, conflicts_with_all = ["coin", "mine", "daily_reward"])]
        json: Option<String>,
        #[arg(long, default_value_t = 0.0)]
        coin: f64,
        #[arg(long, default_value_t = 0.0)]
        mine: f64,
        #[arg(long, default_value_t = 0)]
        daily_reward: u8,
    },
    /// Print the sync payload for the backend
    Export {
        #[arg(long)]
        user_id: u64,
    },
    /// Clear local balances
    Logout,
}

pub fn run(action: AccountAction) -> CliResult {
    let engine = open_engine()?;

    match action {
        AccountAction::Import {
            json,
            coin,
            mine,
            daily_reward,
        } => {
            let account = match json {
                Some(json) => serde_json::from_str::<RemoteAccount>(&json)?,
                None => RemoteAccount {
                    coin,
                    mine,
                    daily_reward,
                },
            };
            print_json(&engine.import_remote(&account)?)?;
        }
        AccountAction::Export { user_id } => print_json(&engine.sync_payload(user_id))?,
        AccountAction::Logout => print_json(&engine.logout()?)?,
    }
    Ok(())
}
