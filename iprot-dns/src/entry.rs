use iprot_net::address::AddressFamily;
use serde::{Deserialize, Serialize};
use std::net::IpAddr;

/// The result of a successful host lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostEntry {
    host_name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    aliases: Vec<String>,
    addresses: Vec<IpAddr>,
}

impl HostEntry {
    /// Create a new [`HostEntry`] without aliases.
    pub fn new(host_name: impl Into<String>, addresses: Vec<IpAddr>) -> Self {
        Self {
            host_name: host_name.into(),
            aliases: Vec::new(),
            addresses,
        }
    }

    /// Attach aliases to this [`HostEntry`].
    #[must_use]
    pub fn with_aliases(mut self, aliases: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.aliases = aliases.into_iter().map(Into::into).collect();
        self
    }

    /// The (canonical) host name that was resolved.
    #[must_use]
    pub fn host_name(&self) -> &str {
        &self.host_name
    }

    #[must_use]
    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    /// The resolved addresses, in resolver order.
    #[must_use]
    pub fn addresses(&self) -> &[IpAddr] {
        &self.addresses
    }

    /// Consume the entry, returning its addresses.
    #[must_use]
    pub fn into_addresses(self) -> Vec<IpAddr> {
        self.addresses
    }

    /// Addresses of the given family, in resolver order.
    pub fn addresses_of(&self, family: AddressFamily) -> impl Iterator<Item = IpAddr> + '_ {
        self.addresses
            .iter()
            .copied()
            .filter(move |addr| family.matches(addr))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn addresses_of_family() {
        let entry = HostEntry::new(
            "example.com",
            vec!["127.0.0.1".parse().unwrap(), "::1".parse().unwrap()],
        )
        .with_aliases(["www.example.com"]);
        assert_eq!(entry.host_name(), "example.com");
        assert_eq!(entry.aliases(), ["www.example.com".to_owned()]);
        assert_eq!(
            entry.addresses_of(AddressFamily::IPv6).collect::<Vec<_>>(),
            vec!["::1".parse::<IpAddr>().unwrap()]
        );
    }

    #[test]
    fn serde_skips_empty_aliases() {
        let entry = HostEntry::new("localhost", vec!["127.0.0.1".parse().unwrap()]);
        let json = serde_json::to_string(&entry).unwrap();
        assert_eq!(json, r#"{"host_name":"localhost","addresses":["127.0.0.1"]}"#);
        assert_eq!(serde_json::from_str::<HostEntry>(&json).unwrap(), entry);
    }
}
