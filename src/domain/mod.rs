pub mod ledger;
pub mod redeem_output;
