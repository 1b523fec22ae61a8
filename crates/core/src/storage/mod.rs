pub mod encryption;
pub mod secret_cache;
