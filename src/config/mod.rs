use anyhow::{Context, Result};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Environment variable holding the signing private key.
pub const PRIVATE_KEY_ENV: &str = "PK";
/// Environment variable holding the proxy wallet whose positions are redeemed.
pub const PROXY_WALLET_ENV: &str = "BROWSER_ADDRESS";

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    #[arg(short, long, default_value = "config.json")]
    pub config: PathBuf,

    /// Redeem a single condition and exit instead of running the loop.
    #[arg(long)]
    pub redeem: bool,

    #[arg(long, requires = "redeem")]
    pub condition_id: Option<String>,

    #[arg(long, requires = "redeem")]
    pub neg_risk: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub polymarket: PolymarketConfig,
    #[serde(default)]
    pub redeem: RedeemConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolymarketConfig {
    #[serde(default = "default_data_api_url")]
    pub data_api_url: String,
    #[serde(default = "default_clob_api_url")]
    pub clob_api_url: String,
    /// 0 = EOA, 1 = Polymarket proxy, 2 = Gnosis Safe.
    #[serde(default = "default_signature_type")]
    pub signature_type: u8,
}

/// External redemption action: `<command> <script_path> <conditionId> <negRisk>`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedeemConfig {
    #[serde(default = "default_redeem_command")]
    pub command: String,
    /// Relative paths are resolved against the config file's directory.
    #[serde(default = "default_redeem_script")]
    pub script_path: PathBuf,
}

fn default_data_api_url() -> String {
    "https://data-api.polymarket.com".to_string()
}
fn default_clob_api_url() -> String {
    "https://clob.polymarket.com".to_string()
}
fn default_signature_type() -> u8 {
    1
}
fn default_redeem_command() -> String {
    "ts-node".to_string()
}
fn default_redeem_script() -> PathBuf {
    PathBuf::from("reedem-service/examples/proxyWallet/redeem.ts")
}

impl Default for RedeemConfig {
    fn default() -> Self {
        Self {
            command: default_redeem_command(),
            script_path: default_redeem_script(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            polymarket: PolymarketConfig {
                data_api_url: default_data_api_url(),
                clob_api_url: default_clob_api_url(),
                signature_type: default_signature_type(),
            },
            redeem: RedeemConfig::default(),
        }
    }
}

impl Config {
    /// Reads the JSON config at `path`, writing the defaults there first if it does not exist.
    pub fn load(path: &PathBuf) -> Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            serde_json::from_str(&content)
                .with_context(|| format!("Invalid config file {}", path.display()))?
        } else {
            let config = Config::default();
            let content = serde_json::to_string_pretty(&config)?;
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write default config to {}", path.display()))?;
            config
        };
        if let Some(base) = path.parent() {
            config.redeem.script_path = resolve_relative(base, &config.redeem.script_path);
        }
        Ok(config)
    }
}

fn resolve_relative(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() || base.as_os_str().is_empty() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

/// Secrets read from the environment; never stored in the config file.
#[derive(Clone)]
pub struct Credentials {
    pub private_key: String,
    pub proxy_wallet: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("private_key", &"<redacted>")
            .field("proxy_wallet", &self.proxy_wallet)
            .finish()
    }
}

impl Credentials {
    /// Loads `.env` (if present) and reads both secrets from the process environment.
    pub fn from_env() -> Result<Self> {
        let _ = dotenv::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        match (read(PRIVATE_KEY_ENV), read(PROXY_WALLET_ENV)) {
            (Some(private_key), Some(proxy_wallet)) => Ok(Self {
                private_key,
                proxy_wallet,
            }),
            _ => anyhow::bail!(
                "{} and {} must be set in the environment or .env",
                PRIVATE_KEY_ENV,
                PROXY_WALLET_ENV
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn reads_both_secrets() {
        let creds = Credentials::from_lookup(lookup(&[
            (PRIVATE_KEY_ENV, "0xkey"),
            (PROXY_WALLET_ENV, " 0xproxy "),
        ]))
        .unwrap();
        assert_eq!(creds.private_key, "0xkey");
        assert_eq!(creds.proxy_wallet, "0xproxy");
    }

    #[test]
    fn missing_wallet_address_is_a_configuration_error() {
        let err = Credentials::from_lookup(lookup(&[(PRIVATE_KEY_ENV, "0xkey")])).unwrap_err();
        assert!(err.to_string().contains(PROXY_WALLET_ENV));
    }

    #[test]
    fn empty_private_key_is_rejected() {
        assert!(Credentials::from_lookup(lookup(&[
            (PRIVATE_KEY_ENV, "  "),
            (PROXY_WALLET_ENV, "0xproxy"),
        ]))
        .is_err());
    }

    #[test]
    fn debug_output_redacts_private_key() {
        let creds = Credentials {
            private_key: "0xsecret".into(),
            proxy_wallet: "0xproxy".into(),
        };
        let shown = format!("{:?}", creds);
        assert!(!shown.contains("0xsecret"));
        assert!(shown.contains("0xproxy"));
    }

    #[test]
    fn missing_config_file_is_created_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let config = Config::load(&path).unwrap();
        assert!(path.exists());
        assert_eq!(config.polymarket.data_api_url, "https://data-api.polymarket.com");
        assert_eq!(config.polymarket.signature_type, 1);
        assert_eq!(config.redeem.command, "ts-node");
        assert_eq!(
            config.redeem.script_path,
            dir.path().join("reedem-service/examples/proxyWallet/redeem.ts")
        );
    }

    #[test]
    fn partial_config_fills_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{"polymarket": {"data_api_url": "http://localhost:9000"},
                "redeem": {"command": "node", "script_path": "/opt/redeem.js"}}"#,
        )
        .unwrap();
        let config = Config::load(&path).unwrap();
        assert_eq!(config.polymarket.data_api_url, "http://localhost:9000");
        assert_eq!(config.polymarket.clob_api_url, "https://clob.polymarket.com");
        assert_eq!(config.redeem.command, "node");
        assert_eq!(config.redeem.script_path, PathBuf::from("/opt/redeem.js"));
    }
}
