use thiserror::Error;

/// Unified error type for the entire ledger-insights-core library.
///
/// Only the IO-touching layers (ledger stores, secret handling, settings)
/// produce these. The numeric services never fail; they degrade to defaults.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Ledger Store / Network ──────────────────────────────────────
    #[error("Ledger store error ({store}): {message}")]
    Store {
        store: String,
        message: String,
    },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Account not found for user: {0}")]
    AccountNotFound(String),

    // ── Secrets ─────────────────────────────────────────────────────
    #[error("Missing credential: {0}")]
    MissingCredential(String),

    #[error("Encryption failed: {0}")]
    Encryption(String),

    #[error("Decryption failed — wrong password or corrupted secret")]
    Decryption,

    // ── Configuration / Validation ──────────────────────────────────
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Validation failed: {0}")]
    ValidationError(String),

    // ── Serialization ───────────────────────────────────────────────
    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    // ── Advisory consumer ───────────────────────────────────────────
    #[error("Advisory generation failed: {0}")]
    Advisory(String),
}

// ── Conversion helpers (From impls) ─────────────────────────────────

impl From<serde_json::Error> for CoreError {
    fn from(e: serde_json::Error) -> Self {
        CoreError::Deserialization(e.to_string())
    }
}

impl From<reqwest::Error> for CoreError {
    fn from(e: reqwest::Error) -> Self {
        // Filters in the query string carry user ids; keep them out of messages.
        let msg = e.to_string();
        let sanitized = if let Some(idx) = msg.find('?') {
            format!("{}?<query redacted>", &msg[..idx])
        } else {
            msg
        };
        CoreError::Network(sanitized)
    }
}

impl From<aes_gcm::Error> for CoreError {
    fn from(_: aes_gcm::Error) -> Self {
        CoreError::Decryption
    }
}
