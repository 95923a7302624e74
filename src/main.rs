use anyhow::{Context, Result};
use clap::Parser;
use log::error;

use polymarket_auto_redeem::adapters::polymarket::{PolymarketApi, ScriptRedeemer};
use polymarket_auto_redeem::config::{Args, Config, Credentials};
use polymarket_auto_redeem::services::redeem_orchestrator::Termination;
use polymarket_auto_redeem::services::redemption_service::redeem_single;
use polymarket_auto_redeem::services::startup::{start, start_and_run};
use polymarket_auto_redeem::utils::clock::TokioClock;
use polymarket_auto_redeem::utils::logging::init_logging;

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();
    let args = Args::parse();

    let config = match Config::load(&args.config) {
        Ok(config) => config,
        Err(e) => {
            error!("Configuration error: {:#}", e);
            std::process::exit(1);
        }
    };
    let api = PolymarketApi::new(&config.polymarket)?;
    let redeemer = ScriptRedeemer::new(config.redeem.command.clone(), config.redeem.script_path.clone());

    if args.redeem {
        let condition_id = args
            .condition_id
            .context("--condition-id is required with --redeem")?;
        if start(Credentials::from_env(), &api).await.is_err() {
            std::process::exit(1);
        }
        redeem_single(&redeemer, &condition_id, args.neg_risk).await?;
        return Ok(());
    }

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    match start_and_run(Credentials::from_env(), api, redeemer, TokioClock, shutdown).await {
        Termination::Interrupted => Ok(()),
        Termination::Faulted(_) | Termination::Halted(_) => std::process::exit(1),
    }
}
