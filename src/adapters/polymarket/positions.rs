use crate::adapters::polymarket::PolymarketApi;
use crate::models::Position;
use crate::services::discovery_service::PositionSource;
use anyhow::Result;
use async_trait::async_trait;

#[async_trait]
impl PositionSource for PolymarketApi {
    async fn fetch_positions(&self, wallet: &str) -> Result<Vec<Position>> {
        self.get_positions(wallet).await
    }
}
