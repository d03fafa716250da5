pub mod traits;

// Quote source implementations
pub mod sheets;
pub mod yahoo;
