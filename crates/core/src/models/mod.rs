pub mod account;
pub mod analysis;
pub mod budget;
pub mod cash_flow;
pub mod context;
pub mod data_point;
pub mod forecast;
pub mod safe_spend;
pub mod settings;
pub mod subscription;
pub mod transaction;
pub mod trend;
