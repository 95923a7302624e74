//! Polls the Polymarket data API for redeemable positions of a proxy wallet and redeems
//! each newly seen condition once per run.

pub mod adapters;
pub mod api;
pub mod config;
pub mod domain;
pub mod models;
pub mod services;
pub mod utils;
