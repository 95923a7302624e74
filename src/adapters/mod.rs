pub mod polymarket;
