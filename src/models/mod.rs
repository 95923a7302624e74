use crate::domain::redeem_output::preview;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::str::FromStr;
use std::time::Duration;

/// A wallet position as reported by the Polymarket data API `/positions` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Position {
    #[serde(rename = "conditionId", default, deserialize_with = "null_as_default")]
    pub condition_id: String,
    #[serde(rename = "negativeRisk", default, deserialize_with = "null_as_default")]
    pub negative_risk: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub redeemable: bool,
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub outcome: String,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub size: Decimal,
    #[serde(rename = "currentValue", default, deserialize_with = "lenient_decimal")]
    pub current_value: Decimal,
}

impl Position {
    /// First 16 characters of the condition id, for compact log lines.
    pub fn short_id(&self) -> &str {
        short_id(&self.condition_id)
    }
}

pub fn short_id(condition_id: &str) -> &str {
    preview(condition_id, 16)
}

fn null_as_default<'de, D, T>(d: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(d)?.unwrap_or_default())
}

// Display-only fields: anything that is not a usable value reads as the default.

fn lenient_string<'de, D>(d: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(d)? {
        Value::String(s) => s,
        _ => String::new(),
    })
}

fn lenient_decimal<'de, D>(d: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    let text = match Value::deserialize(d)? {
        Value::Number(n) => n.to_string(),
        Value::String(s) => s,
        _ => return Ok(Decimal::ZERO),
    };
    let text = text.trim();
    Ok(Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .unwrap_or(Decimal::ZERO))
}

/// Result of one redemption attempt. Only `Success` marks a condition as processed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RedeemOutcome {
    /// Exit code zero. `tx_hints` are output lines that look like they carry a
    /// transaction hash; informational only.
    Success { tx_hints: Vec<String> },
    Failure { exit_code: i32, stderr: String },
    Timeout { after: Duration },
    ExecutionError(String),
}

impl RedeemOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, RedeemOutcome::Success { .. })
    }
}
