use crate::models::Position;
use anyhow::Result;
use async_trait::async_trait;
use log::error;

/// Anything that can list the positions held by a wallet.
#[async_trait]
pub trait PositionSource: Send + Sync {
    async fn fetch_positions(&self, wallet: &str) -> Result<Vec<Position>>;
}

/// Turns a `PositionSource` into the loop's view of the world: the redeemable positions,
/// or nothing at all when the source fails. A failed fetch is retried on the next cycle.
pub struct PositionFetcher<S> {
    source: S,
}

impl<S: PositionSource> PositionFetcher<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    pub async fn redeemable_positions(&self, wallet: &str) -> Vec<Position> {
        match self.source.fetch_positions(wallet).await {
            Ok(positions) => positions.into_iter().filter(|p| p.redeemable).collect(),
            Err(e) => {
                error!("Error fetching positions: {:#}", e);
                Vec::new()
            }
        }
    }
}
