use std::collections::HashMap;
use std::sync::RwLock;

use chrono::Utc;

/// Store of tokens invalidated before their natural expiry.
///
/// Keyed by the token's `jti`. Implementations backed by a shared expiring
/// store make revocation survive restarts and span instances.
pub trait RevocationList: Send + Sync + 'static {
    /// Mark a token as revoked until `expires_at` (Unix timestamp).
    ///
    /// Returns `true` only for the call that added the entry; revoking the
    /// same token again has no further effect and returns `false`. The check
    /// and the insert are one atomic step, so exactly one of several
    /// concurrent callers sees `true`.
    fn revoke(&self, token_id: &str, expires_at: i64) -> bool;

    /// Check whether a token has been revoked.
    fn is_revoked(&self, token_id: &str) -> bool;
}

/// Process-local revocation list.
///
/// Entries are dropped once the token they describe has expired, since an
/// expired token fails verification on its own. Not shared across instances.
#[derive(Debug, Default)]
pub struct InMemoryRevocationList {
    entries: RwLock<HashMap<String, i64>>,
}

impl InMemoryRevocationList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tracked revocations.
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl RevocationList for InMemoryRevocationList {
    fn revoke(&self, token_id: &str, expires_at: i64) -> bool {
        let now = Utc::now().timestamp();
        let mut entries = self
            .entries
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        entries.retain(|_, exp| *exp >= now);
        entries.insert(token_id.to_string(), expires_at).is_none()
    }

    fn is_revoked(&self, token_id: &str) -> bool {
        self.entries
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .contains_key(token_id)
    }
}
