pub mod traits;

// Ledger store implementations
pub mod memory;
pub mod rest;
