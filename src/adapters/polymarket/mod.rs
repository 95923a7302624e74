pub mod auth;
pub mod positions;
pub mod redeem;

pub use crate::api::{AuthenticatedAccount, PolymarketApi};
pub use redeem::ScriptRedeemer;
