use crate::models::{short_id, RedeemOutcome};
use anyhow::Result;
use async_trait::async_trait;
use log::info;

/// Performs the redemption for one condition. Implementations report every problem
/// through the returned outcome instead of an error.
#[async_trait]
pub trait RedeemExecutor: Send + Sync {
    async fn execute(&self, condition_id: &str, neg_risk: bool) -> RedeemOutcome;
}

/// One-shot `--redeem` mode: redeem a single condition outside the loop.
pub async fn redeem_single<E>(
    executor: &E,
    condition_id: &str,
    neg_risk: bool,
) -> Result<RedeemOutcome>
where
    E: RedeemExecutor + ?Sized,
{
    let condition_id = condition_id.trim();
    if condition_id.is_empty() {
        anyhow::bail!("condition id must not be empty");
    }
    info!("Manual redeem for {} (negRisk={})", condition_id, neg_risk);
    let outcome = executor.execute(condition_id, neg_risk).await;
    if !outcome.is_success() {
        anyhow::bail!("Redeem for {}... did not succeed: {:?}", short_id(condition_id), outcome);
    }
    Ok(outcome)
}
