use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::RwLock;
use tracing::debug;

use crate::errors::CoreError;
use crate::models::settings::{InsightsSettings, MAX_SECRET_TTL_SECS};

use super::encryption::SealedSecret;

struct CachedSecret {
    value: String,
    expires_at: DateTime<Utc>,
}

/// Short-lived, explicitly owned cache of decrypted credentials.
///
/// Shared (behind an `Arc`) with whichever component needs a credential.
/// Entries expire after the configured TTL and can be dropped at any time
/// with [`SecretCache::invalidate`].
pub struct SecretCache {
    ttl: Duration,
    entries: RwLock<HashMap<String, CachedSecret>>,
}

impl std::fmt::Debug for SecretCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretCache")
            .field("ttl_secs", &self.ttl.num_seconds())
            .field("entries", &self.len())
            .finish()
    }
}

impl SecretCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// TTL from `secret_ttl_secs`, capped at [`MAX_SECRET_TTL_SECS`] for
    /// settings that skipped validation.
    pub fn from_settings(settings: &InsightsSettings) -> Self {
        let secs = settings.secret_ttl_secs.clamp(0, MAX_SECRET_TTL_SECS);
        Self::new(Duration::try_seconds(secs).unwrap_or_else(Duration::zero))
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Cache a plaintext secret, valid for one TTL from now.
    pub fn insert(&self, key: &str, value: impl Into<String>) {
        self.insert_at(key, value, Utc::now());
    }

    /// Cache a plaintext secret, valid for one TTL from `now`.
    pub fn insert_at(&self, key: &str, value: impl Into<String>, now: DateTime<Utc>) {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.insert(
            key.to_string(),
            CachedSecret {
                value: value.into(),
                expires_at: now
                    .checked_add_signed(self.ttl)
                    .unwrap_or(DateTime::<Utc>::MAX_UTC),
            },
        );
    }

    /// Decrypt a sealed secret and cache the plaintext under `key`.
    pub fn unseal_into(&self, key: &str, sealed: &SealedSecret, password: &str) -> Result<(), CoreError> {
        let plaintext = sealed.open(password)?;
        self.insert(key, plaintext);
        debug!(key, "Unsealed secret into cache");
        Ok(())
    }

    /// The cached secret, if present and not expired.
    pub fn get(&self, key: &str) -> Option<String> {
        self.get_at(key, Utc::now())
    }

    pub fn get_at(&self, key: &str, now: DateTime<Utc>) -> Option<String> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries
            .get(key)
            .filter(|s| s.expires_at > now)
            .map(|s| s.value.clone())
    }

    /// Drop one secret. Returns `true` if it was cached.
    pub fn invalidate(&self, key: &str) -> bool {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        let removed = entries.remove(key).is_some();
        if removed {
            debug!(key, "Invalidated cached secret");
        }
        removed
    }

    /// Remove every entry expired at `now`. Returns the number removed.
    pub fn purge_expired_at(&self, now: DateTime<Utc>) -> usize {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        let before = entries.len();
        entries.retain(|_, s| s.expires_at > now);
        before - entries.len()
    }

    pub fn purge_expired(&self) -> usize {
        self.purge_expired_at(Utc::now())
    }

    pub fn clear(&self) {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.clear();
    }

    /// Number of entries held, expired ones included until purged.
    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
