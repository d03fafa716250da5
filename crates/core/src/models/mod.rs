pub mod asset;
pub mod enriched;
pub mod holding;
pub mod portfolio;
pub mod quote;
pub mod settings;
