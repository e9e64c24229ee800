// Domain-specific error types
pub mod errors;

// Game metadata from external catalogs
pub mod game;

// Feature registry and vectors
pub mod ml;

// Horizons, decisions and prediction results
pub mod prediction;

// Port interfaces
pub mod ports;
