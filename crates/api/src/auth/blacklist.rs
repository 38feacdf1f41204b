//! In-memory blacklist of revoked session tokens
//!
//! Tracks tokens that must be rejected even though their signature and expiry
//! would otherwise accept them (post-logout revocation). Entries are pruned
//! lazily on read and by a periodic background sweep, which bounds memory
//! growth from tokens that are revoked but never queried again.
//!
//! The blacklist is per-process and non-persistent: a server restart or
//! horizontal scale-out loses all revocations. Deployments that need shared
//! revocation state should back this with an external expiring store.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;

/// Minimal claim set needed to schedule an entry's removal
#[derive(Debug, Deserialize)]
struct ExpClaims {
    exp: i64,
}

/// An explicitly constructed, injectable revocation list with a
/// `start()`/`stop()` lifecycle. Handles are cheap to clone and share one
/// underlying map.
#[derive(Clone)]
pub struct TokenBlacklist {
    entries: Arc<RwLock<HashMap<String, i64>>>,
    sweep_interval: Duration,
    sweeper: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl TokenBlacklist {
    pub fn new(sweep_interval: Duration) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            sweep_interval,
            sweeper: Arc::new(Mutex::new(None)),
        }
    }

    /// Revoke a token until its natural expiry
    ///
    /// The expiry is read from the token without re-verifying the signature;
    /// callers revoke tokens that already passed verification at the HTTP
    /// boundary. A token that cannot even be decoded is rejected. Idempotent.
    pub async fn add(&self, token: &str) -> Result<(), BlacklistError> {
        let exp = decode_expiry(token)?;

        let mut entries = self.entries.write().await;
        entries.insert(token.to_string(), exp);
        tracing::debug!(entries = entries.len(), "Token added to blacklist");
        Ok(())
    }

    /// Whether a token is currently revoked
    ///
    /// Returns `true` only while the stored expiry is still in the future.
    /// Entries whose expiry has passed are removed on read, in addition to
    /// the periodic sweep.
    pub async fn has(&self, token: &str) -> bool {
        let now = OffsetDateTime::now_utc().unix_timestamp();

        // Fast path under the read lock; every authenticated request lands
        // here, so only a stale hit pays for the write lock below
        {
            let entries = self.entries.read().await;
            match entries.get(token) {
                Some(&exp) if exp > now => return true,
                None => return false,
                Some(_) => {}
            }
        }

        let mut entries = self.entries.write().await;
        // Re-check after reacquiring: the token may have been re-added or
        // already pruned between the locks
        match entries.get(token) {
            Some(&exp) if exp > now => true,
            Some(_) => {
                entries.remove(token);
                false
            }
            None => false,
        }
    }

    /// Number of tracked entries, expired or not
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Spawn the periodic sweep task. No-op if already running.
    pub fn start(&self) {
        let mut sweeper = match self.sweeper.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if sweeper.is_some() {
            return;
        }

        let entries = Arc::clone(&self.entries);
        let sweep_interval = self.sweep_interval;
        *sweeper = Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval(sweep_interval);
            // The first tick fires immediately; skip it so a freshly started
            // blacklist does not sweep before anything is inserted
            interval.tick().await;

            loop {
                interval.tick().await;
                let now = OffsetDateTime::now_utc().unix_timestamp();

                let mut entries = entries.write().await;
                let before = entries.len();
                entries.retain(|_, &mut exp| exp > now);
                let removed = before - entries.len();

                if removed > 0 {
                    tracing::debug!(removed, remaining = entries.len(), "Blacklist sweep");
                }
            }
        }));
    }

    /// Deterministically halt the sweep task
    ///
    /// Required for clean shutdown and test teardown; a live sweep task keeps
    /// the runtime from terminating promptly.
    pub fn stop(&self) {
        let mut sweeper = match self.sweeper.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(handle) = sweeper.take() {
            handle.abort();
        }
    }
}

/// Read the `exp` claim without verifying the signature
fn decode_expiry(token: &str) -> Result<i64, BlacklistError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    // Already-expired tokens are still decodable; they simply never match
    // in `has` and get pruned
    validation.validate_exp = false;

    decode::<ExpClaims>(token, &DecodingKey::from_secret(&[]), &validation)
        .map(|data| data.claims.exp)
        .map_err(|_| BlacklistError::MalformedToken)
}

#[derive(Debug, thiserror::Error)]
pub enum BlacklistError {
    #[error("Token could not be decoded")]
    MalformedToken,
}
