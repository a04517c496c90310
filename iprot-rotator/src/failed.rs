use ahash::RandomState;
use iprot_core::telemetry::tracing;
use iprot_utils::time::now_unix_ms;
use parking_lot::RwLock;
use std::{collections::HashMap, net::IpAddr};

/// An address in the failed set, together with the moment it becomes valid again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FailedAddress {
    address: IpAddr,
    expires_at_ms: i64,
}

impl FailedAddress {
    /// The failed address.
    #[must_use]
    pub const fn address(&self) -> IpAddr {
        self.address
    }

    /// Unix timestamp, in milliseconds, at which the address is valid again.
    #[must_use]
    pub const fn expires_at_ms(&self) -> i64 {
        self.expires_at_ms
    }
}

/// Concurrent set of failed addresses, each with its own expiry.
///
/// Absence from the set is validity. Expired entries are not swept
/// in the background, they are evicted lazily once observed by
/// [`FailedAddresses::is_valid`].
#[derive(Debug, Default)]
pub struct FailedAddresses {
    entries: RwLock<HashMap<IpAddr, i64, RandomState>>,
}

impl FailedAddresses {
    /// Create a new, empty [`FailedAddresses`] set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert the address, overwriting the expiry of an existing entry.
    pub fn insert(&self, address: IpAddr, expires_at_ms: i64) {
        self.entries.write().insert(address, expires_at_ms);
    }

    /// Remove the address, returning `true` if it was present.
    pub fn remove(&self, address: IpAddr) -> bool {
        self.entries.write().remove(&address).is_some()
    }

    /// Remove all addresses, returning how many were present.
    pub fn clear(&self) -> usize {
        let mut entries = self.entries.write();
        let n = entries.len();
        entries.clear();
        n
    }

    /// Returns `true` if the address is not (or no longer) failed.
    pub fn is_valid(&self, address: IpAddr) -> bool {
        self.is_valid_at(address, now_unix_ms())
    }

    pub(crate) fn is_valid_at(&self, address: IpAddr, now_ms: i64) -> bool {
        let Some(expires_at_ms) = self.entries.read().get(&address).copied() else {
            return true;
        };
        if expires_at_ms > now_ms {
            tracing::debug!(%address, expires_at_ms, "address is failed");
            return false;
        }

        // the entry may have been refreshed since it was read
        let mut entries = self.entries.write();
        match entries.get(&address).copied() {
            Some(expires_at_ms) if expires_at_ms > now_ms => {
                tracing::debug!(%address, expires_at_ms, "address is failed");
                false
            }
            Some(expires_at_ms) => {
                entries.remove(&address);
                tracing::debug!(%address, expires_at_ms, "failed address expired");
                true
            }
            None => true,
        }
    }

    /// Number of tracked addresses, expired entries not yet evicted included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Point-in-time snapshot of the tracked addresses.
    ///
    /// May contain addresses whose expiry passed but that were not yet evicted.
    #[must_use]
    pub fn addresses(&self) -> Vec<IpAddr> {
        self.entries.read().keys().copied().collect()
    }

    /// Point-in-time snapshot of the tracked addresses and their expiry.
    #[must_use]
    pub fn entries(&self) -> Vec<FailedAddress> {
        self.entries
            .read()
            .iter()
            .map(|(address, expires_at_ms)| FailedAddress {
                address: *address,
                expires_at_ms: *expires_at_ms,
            })
            .collect()
    }
}
