pub mod discovery_service;
pub mod redeem_orchestrator;
pub mod redemption_service;
pub mod startup;
