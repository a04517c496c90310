use crate::{DnsResolver, HostEntry};
use iprot_net::address::AddressFamily;
use iprot_utils::macros::error::static_str_error;
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, net::IpAddr};

#[derive(Debug, Clone, Default)]
/// In-memory dns, mapping host names to a fixed list of addresses.
///
/// Useful as a static overwrite of the system resolver, and in tests.
/// Host names are matched case-insensitively.
pub struct InMemoryDns {
    map: HashMap<String, Vec<IpAddr>>,
}

impl InMemoryDns {
    /// Create a new, empty [`InMemoryDns`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a host to IP address mapping to the [`InMemoryDns`].
    ///
    /// Existing mappings will be overwritten.
    pub fn insert(&mut self, host: impl AsRef<str>, addresses: Vec<IpAddr>) -> &mut Self {
        self.map.insert(host.as_ref().to_ascii_lowercase(), addresses);
        self
    }

    /// Extend the [`InMemoryDns`] with the given mappings.
    ///
    /// Existing mappings will be overwritten.
    pub fn extend<S: AsRef<str>>(
        &mut self,
        mappings: impl IntoIterator<Item = (S, Vec<IpAddr>)>,
    ) -> &mut Self {
        for (host, addresses) in mappings {
            self.insert(host, addresses);
        }
        self
    }
}

impl<'de> Deserialize<'de> for InMemoryDns {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let map = HashMap::<String, Vec<IpAddr>>::deserialize(deserializer)?;
        let mut dns = Self::new();
        dns.extend(map);
        Ok(dns)
    }
}

impl Serialize for InMemoryDns {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.map.serialize(serializer)
    }
}

static_str_error! {
    #[doc = "domain not mapped in memory"]
    pub struct DomainNotMappedError;
}

impl DnsResolver for InMemoryDns {
    type Error = DomainNotMappedError;

    async fn resolve(
        &self,
        host: String,
        family: Option<AddressFamily>,
    ) -> Result<HostEntry, Self::Error> {
        let addresses: Vec<_> = self
            .map
            .get(&host.to_ascii_lowercase())
            .ok_or(DomainNotMappedError)?
            .iter()
            .copied()
            .filter(|addr| family.is_none_or(|family| family.matches(addr)))
            .collect();
        if addresses.is_empty() {
            return Err(DomainNotMappedError);
        }
        Ok(HostEntry::new(host, addresses))
    }
}
