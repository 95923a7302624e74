use crate::adapters::polymarket::{AuthenticatedAccount, PolymarketApi};
use crate::config::Credentials;
use crate::services::startup::AccountValidator;
use anyhow::Result;
use async_trait::async_trait;

#[async_trait]
impl AccountValidator for PolymarketApi {
    async fn validate(&self, credentials: &Credentials) -> Result<AuthenticatedAccount> {
        self.authenticate(credentials).await
    }
}
