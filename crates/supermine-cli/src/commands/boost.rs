use clap::Subcommand;
use serde_json::json;

use super::{ad_outcome, open_engine, print_json, CliResult};

#[derive(Subcommand)]
pub enum BoostAction {
    /// Extend the mining session (starts one if idle)
    Time {
        /// Pay with a rewarded ad
        #[arg(long, conflicts_with = "package", required_unless_present = "package")]
        ad: bool,
        /// Pay with coins, using the package at this index
        #[arg(long)]
        package: Option<usize>,
        /// Simulate an ad that did not complete
        #[arg(long, value_name = "REASON", requires = "ad")]
        ad_failed: Option<String>,
    },
    /// Raise the displayed hashrate with a rewarded ad
    Hashrate {
        /// Simulate an ad that did not complete
        #[arg(long, value_name = "REASON")]
        ad_failed: Option<String>,
    },
    /// List boost packages
    Packages,
}

pub fn run(action: BoostAction) -> CliResult {
    let engine = open_engine()?;

    match action {
        BoostAction::Time {
            package: Some(index),
            ..
        } => print_json(&engine.boost_with_package(index)?)?,
        BoostAction::Time { ad_failed, .. } => {
            print_json(&engine.boost_with_ad(ad_outcome(ad_failed))?)?
        }
        BoostAction::Hashrate { ad_failed } => {
            print_json(&engine.boost_hashrate(ad_outcome(ad_failed))?)?
        }
        BoostAction::Packages => {
            let boost = &engine.config().boost;
            let packages: Vec<_> = boost
                .packages
                .iter()
                .enumerate()
                .map(|(index, p)| {
                    json!({
                        "index": index,
                        "cost": p.cost,
                        "extension_secs": p.extension_secs,
                    })
                })
                .collect();
            print_json(&json!({
                "ad_extension_secs": boost.ad_extension_secs,
                "cap_secs": boost.cap_secs,
                "packages": packages,
            }))?;
        }
    }
    Ok(())
}
