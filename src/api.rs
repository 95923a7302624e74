use crate::config::{Credentials, PolymarketConfig};
use crate::models::Position;
use anyhow::{Context, Result};
use log::{info, warn};
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use serde_json::Value;
use std::str::FromStr;
use std::time::Duration;

use alloy::primitives::Address as AlloyAddress;
use alloy::signers::local::LocalSigner;
use alloy::signers::Signer as _;
use polymarket_client_sdk::clob::types::SignatureType;
use polymarket_client_sdk::clob::{Client as ClobClient, Config as ClobConfig};
use polymarket_client_sdk::POLYGON;

const HTTP_TIMEOUT_SECS: u64 = 10;
/// Positions smaller than this are not returned by the data API.
pub const POSITION_SIZE_THRESHOLD: &str = "0.01";
pub const POSITION_LIMIT: &str = "500";

pub struct PolymarketApi {
    client: Client,
    data_api_url: String,
    clob_url: String,
    signature_type: u8,
}

/// Addresses confirmed by a successful CLOB authentication.
#[derive(Debug, Clone)]
pub struct AuthenticatedAccount {
    pub signer_address: String,
    pub proxy_wallet: String,
}

impl PolymarketApi {
    pub fn new(config: &PolymarketConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self {
            client,
            data_api_url: config.data_api_url.trim_end_matches('/').to_string(),
            clob_url: config.clob_api_url.clone(),
            signature_type: config.signature_type,
        })
    }

    /// Derives CLOB API credentials for the signer. The resulting client is dropped: this only
    /// proves the key and proxy wallet are usable before the loop starts.
    pub async fn authenticate(&self, credentials: &Credentials) -> Result<AuthenticatedAccount> {
        let signer = LocalSigner::from_str(&credentials.private_key)
            .context("Failed to create signer from private key. Ensure PK is a valid hex string.")?
            .with_chain_id(Some(POLYGON));

        let funder_address = AlloyAddress::from_str(&credentials.proxy_wallet).with_context(|| {
            format!(
                "Failed to parse proxy wallet address: {}. Ensure it's a valid Ethereum address.",
                credentials.proxy_wallet
            )
        })?;

        let sig_type = match self.signature_type {
            1 => SignatureType::Proxy,
            2 => SignatureType::GnosisSafe,
            0 => {
                warn!("Proxy wallet is set but signature_type is EOA. Defaulting to Proxy.");
                SignatureType::Proxy
            }
            n => anyhow::bail!(
                "Invalid signature_type: {}. Must be 0 (EOA), 1 (Proxy), or 2 (GnosisSafe)",
                n
            ),
        };

        info!(
            "Using proxy wallet: {} (signature type: {:?})",
            credentials.proxy_wallet, sig_type
        );
        let _client = ClobClient::new(&self.clob_url, ClobConfig::default())
            .context("Failed to create CLOB client")?
            .authentication_builder(&signer)
            .funder(funder_address)
            .signature_type(sig_type)
            .authenticate()
            .await
            .context("Failed to authenticate with CLOB API. Check PK and BROWSER_ADDRESS.")?;

        Ok(AuthenticatedAccount {
            signer_address: signer.address().to_string(),
            proxy_wallet: credentials.proxy_wallet.clone(),
        })
    }

    /// All positions held by `wallet`, in the order the data API returns them.
    pub async fn get_positions(&self, wallet: &str) -> Result<Vec<Position>> {
        let url = format!("{}/positions", self.data_api_url);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("user", wallet),
                ("sizeThreshold", POSITION_SIZE_THRESHOLD),
                ("limit", POSITION_LIMIT),
            ])
            .header(CONTENT_TYPE, "application/json")
            .send()
            .await
            .context("Failed to fetch positions")?;
        if !response.status().is_success() {
            anyhow::bail!("Data API returned {} for positions", response.status());
        }
        let rows: Vec<Value> = response
            .json()
            .await
            .context("Failed to parse positions response")?;

        // One unreadable row must not hide the rest of the batch.
        let mut positions = Vec::with_capacity(rows.len());
        for (index, row) in rows.into_iter().enumerate() {
            match serde_json::from_value::<Position>(row) {
                Ok(position) => positions.push(position),
                Err(e) => warn!("Skipping unreadable position at index {}: {}", index, e),
            }
        }
        Ok(positions)
    }
}
