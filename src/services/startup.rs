//! Starting state: secrets, account check, then hand-off to the poll loop.

use crate::api::AuthenticatedAccount;
use crate::config::Credentials;
use crate::services::discovery_service::{PositionFetcher, PositionSource};
use crate::services::redeem_orchestrator::{RedeemLoop, Termination};
use crate::services::redemption_service::RedeemExecutor;
use crate::utils::clock::Clock;
use anyhow::Result;
use async_trait::async_trait;
use log::{error, info};
use std::future::Future;

/// Confirms that the credentials can act for the proxy wallet.
#[async_trait]
pub trait AccountValidator: Send + Sync {
    async fn validate(&self, credentials: &Credentials) -> Result<AuthenticatedAccount>;
}

/// Checks the secrets and the account. Nothing is fetched or redeemed here; on error the
/// reason has already been logged.
pub async fn start<V>(credentials: Result<Credentials>, validator: &V) -> Result<AuthenticatedAccount>
where
    V: AccountValidator + ?Sized,
{
    info!("Starting automatic redeem loop...");
    let credentials = credentials.map_err(|e| {
        error!("Configuration error: {:#}", e);
        e
    })?;
    let account = validator.validate(&credentials).await.map_err(|e| {
        error!("Authentication error: {:#}", e);
        e
    })?;
    info!("Client authenticated");
    info!("Main wallet: {}", account.signer_address);
    info!("Proxy wallet: {}", account.proxy_wallet);
    Ok(account)
}

/// Runs `start` and, once the account is confirmed, polls with `api` until `shutdown`.
pub async fn start_and_run<A, E, C, F>(
    credentials: Result<Credentials>,
    api: A,
    executor: E,
    clock: C,
    shutdown: F,
) -> Termination
where
    A: AccountValidator + PositionSource,
    E: RedeemExecutor,
    C: Clock,
    F: Future<Output = ()>,
{
    let account = match start(credentials, &api).await {
        Ok(account) => account,
        Err(e) => return Termination::Halted(e),
    };
    let mut redeem_loop = RedeemLoop::new(
        PositionFetcher::new(api),
        executor,
        clock,
        account.proxy_wallet,
    );
    redeem_loop.run(shutdown).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{PRIVATE_KEY_ENV, PROXY_WALLET_ENV};
    use crate::models::{Position, RedeemOutcome};
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    /// Counts every call that would reach the network.
    #[derive(Clone, Default)]
    struct CountingApi {
        reject_auth: bool,
        validations: Arc<AtomicUsize>,
        fetches: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl AccountValidator for CountingApi {
        async fn validate(&self, credentials: &Credentials) -> Result<AuthenticatedAccount> {
            self.validations.fetch_add(1, Ordering::SeqCst);
            if self.reject_auth {
                anyhow::bail!("Failed to authenticate with CLOB API");
            }
            Ok(AuthenticatedAccount {
                signer_address: "0xsigner".to_string(),
                proxy_wallet: credentials.proxy_wallet.clone(),
            })
        }
    }

    #[async_trait]
    impl PositionSource for CountingApi {
        async fn fetch_positions(&self, _wallet: &str) -> Result<Vec<Position>> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            Ok(Vec::new())
        }
    }

    #[derive(Clone, Default)]
    struct CountingExecutor(Arc<AtomicUsize>);

    #[async_trait]
    impl RedeemExecutor for CountingExecutor {
        async fn execute(&self, _condition_id: &str, _neg_risk: bool) -> RedeemOutcome {
            self.0.fetch_add(1, Ordering::SeqCst);
            RedeemOutcome::Success { tx_hints: vec![] }
        }
    }

    struct NoWait;

    #[async_trait]
    impl Clock for NoWait {
        async fn sleep(&self, _duration: Duration) {
            tokio::task::yield_now().await;
        }
    }

    fn env(pairs: &[(&str, &str)]) -> Result<Credentials> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Credentials::from_lookup(|key| map.get(key).cloned())
    }

    #[tokio::test]
    async fn missing_proxy_wallet_halts_before_any_request() {
        let api = CountingApi::default();
        let executor = CountingExecutor::default();

        let termination = start_and_run(
            env(&[(PRIVATE_KEY_ENV, "0xkey")]),
            api.clone(),
            executor.clone(),
            NoWait,
            std::future::pending(),
        )
        .await;

        match termination {
            Termination::Halted(e) => assert!(e.to_string().contains(PROXY_WALLET_ENV)),
            other => panic!("expected halt, got {:?}", other),
        }
        assert_eq!(api.validations.load(Ordering::SeqCst), 0);
        assert_eq!(api.fetches.load(Ordering::SeqCst), 0);
        assert_eq!(executor.0.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn rejected_account_halts_without_fetching() {
        let api = CountingApi {
            reject_auth: true,
            ..CountingApi::default()
        };

        let termination = start_and_run(
            env(&[(PRIVATE_KEY_ENV, "0xkey"), (PROXY_WALLET_ENV, "0xproxy")]),
            api.clone(),
            CountingExecutor::default(),
            NoWait,
            std::future::pending(),
        )
        .await;

        assert!(matches!(termination, Termination::Halted(_)));
        assert_eq!(api.validations.load(Ordering::SeqCst), 1);
        assert_eq!(api.fetches.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn confirmed_account_enters_the_loop() {
        let api = CountingApi::default();

        // Shutdown is already resolved: the loop starts and stops before its first cycle.
        let termination = start_and_run(
            env(&[(PRIVATE_KEY_ENV, "0xkey"), (PROXY_WALLET_ENV, "0xproxy")]),
            api.clone(),
            CountingExecutor::default(),
            NoWait,
            std::future::ready(()),
        )
        .await;

        assert!(matches!(termination, Termination::Interrupted));
        assert_eq!(api.validations.load(Ordering::SeqCst), 1);
        assert_eq!(api.fetches.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn start_returns_the_validated_account() {
        let api = CountingApi::default();
        let account = start(
            env(&[(PRIVATE_KEY_ENV, "0xkey"), (PROXY_WALLET_ENV, "0xproxy")]),
            &api,
        )
        .await
        .unwrap();
        assert_eq!(account.proxy_wallet, "0xproxy");
        assert_eq!(account.signer_address, "0xsigner");
        assert_eq!(api.fetches.load(Ordering::SeqCst), 0);
    }
}
