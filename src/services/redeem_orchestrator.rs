use crate::domain::ledger::RedemptionLedger;
use crate::models::Position;
use crate::services::discovery_service::{PositionFetcher, PositionSource};
use crate::services::redemption_service::RedeemExecutor;
use crate::utils::clock::Clock;
use anyhow::Result;
use log::{debug, error, info, warn};
use std::future::Future;
use std::time::Duration;

/// Pause between two redemptions of the same batch.
pub const REDEEM_THROTTLE: Duration = Duration::from_secs(2);
/// Pause between poll cycles.
pub const POLL_INTERVAL: Duration = Duration::from_secs(1);
/// Idle cycles only log every Nth time.
const HEARTBEAT_EVERY: u64 = 10;
const RULE_WIDTH: usize = 80;

/// What one poll cycle saw and did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleReport {
    pub cycle: u64,
    pub redeemable: usize,
    pub attempted: usize,
    pub redeemed: usize,
    /// Set on the idle cycles that logged the periodic status line.
    pub heartbeat: bool,
}

/// Why the loop stopped.
#[derive(Debug)]
pub enum Termination {
    Interrupted,
    Faulted(anyhow::Error),
    /// Startup failed; no cycle ran.
    Halted(anyhow::Error),
}

/// Poll → dedupe → redeem loop for one proxy wallet.
pub struct RedeemLoop<S, E, C> {
    fetcher: PositionFetcher<S>,
    executor: E,
    clock: C,
    wallet: String,
    ledger: RedemptionLedger,
    cycle: u64,
}

impl<S, E, C> RedeemLoop<S, E, C>
where
    S: PositionSource,
    E: RedeemExecutor,
    C: Clock,
{
    pub fn new(fetcher: PositionFetcher<S>, executor: E, clock: C, wallet: String) -> Self {
        Self {
            fetcher,
            executor,
            clock,
            wallet,
            ledger: RedemptionLedger::new(),
            cycle: 0,
        }
    }

    pub fn ledger(&self) -> &RedemptionLedger {
        &self.ledger
    }

    pub fn cycles(&self) -> u64 {
        self.cycle
    }

    /// Polls until `shutdown` resolves or a cycle fails. Shutdown is checked before every
    /// cycle and while a cycle is in flight; an interrupted cycle is dropped as is.
    pub async fn run<F>(&mut self, shutdown: F) -> Termination
    where
        F: Future<Output = ()>,
    {
        info!("Checking every {}s for new positions...", POLL_INTERVAL.as_secs());
        info!("Processed so far: {}", self.ledger.len());
        info!("{}", "=".repeat(RULE_WIDTH));

        tokio::pin!(shutdown);
        loop {
            let step = tokio::select! {
                biased;
                _ = &mut shutdown => None,
                result = self.tick() => Some(result),
            };
            match step {
                None => {
                    info!("Loop interrupted by user");
                    self.log_summary();
                    return Termination::Interrupted;
                }
                Some(Err(e)) => {
                    error!("Fatal error: {:#}", e);
                    error!("{:?}", e);
                    return Termination::Faulted(e);
                }
                Some(Ok(())) => {}
            }
        }
    }

    async fn tick(&mut self) -> Result<()> {
        self.run_cycle().await?;
        self.clock.sleep(POLL_INTERVAL).await;
        Ok(())
    }

    /// One fetch and the redemptions it triggers, without the trailing poll pause.
    pub async fn run_cycle(&mut self) -> Result<CycleReport> {
        self.cycle += 1;
        let redeemable = self.fetcher.redeemable_positions(&self.wallet).await;
        if let Some(p) = redeemable.iter().find(|p| p.condition_id.is_empty()) {
            anyhow::bail!("Redeemable position without conditionId (title: {:?})", p.title);
        }

        let fresh: Vec<&Position> = redeemable
            .iter()
            .filter(|p| !self.ledger.contains(&p.condition_id))
            .collect();
        let mut report = CycleReport {
            cycle: self.cycle,
            redeemable: redeemable.len(),
            attempted: 0,
            redeemed: 0,
            heartbeat: false,
        };

        if fresh.is_empty() {
            if self.cycle % HEARTBEAT_EVERY == 0 {
                report.heartbeat = true;
                info!(
                    "No new redeemable positions (total: {}, processed: {})",
                    redeemable.len(),
                    self.ledger.len()
                );
            }
            return Ok(report);
        }

        info!("{} new redeemable position(s) found!", fresh.len());
        for position in fresh {
            // Same condition can appear once per held outcome.
            if self.ledger.contains(&position.condition_id) {
                debug!("Condition {}... already redeemed in this batch", position.short_id());
                continue;
            }
            log_position(position);

            let outcome = self
                .executor
                .execute(&position.condition_id, position.negative_risk)
                .await;
            report.attempted += 1;
            if outcome.is_success() {
                self.ledger.add(&position.condition_id);
                report.redeemed += 1;
                info!("Condition {}... marked as processed", position.short_id());
            } else {
                warn!(
                    "Condition {}... NOT processed (will be retried)",
                    position.short_id()
                );
            }
            info!("{}", "-".repeat(RULE_WIDTH));

            self.clock.sleep(REDEEM_THROTTLE).await;
        }
        Ok(report)
    }

    fn log_summary(&self) {
        info!("Summary:");
        info!("   Total redeems executed: {}", self.ledger.len());
        info!("   Processed condition IDs:");
        for condition_id in self.ledger.iter() {
            info!("     - {}", condition_id);
        }
    }
}

fn log_position(position: &Position) {
    info!("New position:");
    info!("   Title: {}", or_na(&position.title));
    info!("   Outcome: {}", or_na(&position.outcome));
    info!("   Size: {}", position.size);
    info!("   Value: ${:.2}", position.current_value);
    info!("   Condition ID: {}", position.condition_id);
}

fn or_na(value: &str) -> &str {
    if value.is_empty() {
        "N/A"
    } else {
        value
    }
}
