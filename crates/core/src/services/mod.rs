pub mod aggregation_service;
pub mod enrichment_service;
pub mod refresh_service;
