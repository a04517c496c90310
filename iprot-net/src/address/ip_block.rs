use super::{AddressBlock, AddressFamily, IndexOutOfRangeError, InvalidCidrError};
use ipnet::{IpNet, Ipv4Net, Ipv6Net};
use iprot_utils::U256;
use serde::{Deserialize, Serialize};
use std::{
    fmt,
    iter::FusedIterator,
    net::{IpAddr, Ipv4Addr, Ipv6Addr},
    str::FromStr,
};

/// A single CIDR block, viewed as the ordered list of its usable addresses.
///
/// Usability follows common host-assignment rules:
///
/// - IPv4 with a prefix of `/30` or shorter excludes the network
///   and broadcast addresses, so `192.168.0.0/24` holds 254 addresses
///   starting at `192.168.0.1`;
/// - IPv4 `/31` (point-to-point) holds both addresses, `/32` holds one;
/// - IPv6 has no broadcast, every address of the block is usable.
///
/// Host bits of the literal are truncated: `192.168.1.1/24`
/// describes the same block as `192.168.1.0/24`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IpBlock {
    net: IpNet,
    first: u128,
    count: U256,
}

impl IpBlock {
    /// Create a new [`IpBlock`] for the given network.
    pub fn new(net: impl Into<IpNet>) -> Self {
        let net = net.into().trunc();
        let (first, count) = match net {
            IpNet::V4(net) => {
                let network = u128::from(net.network().to_bits());
                match net.prefix_len() {
                    32 => (network, U256::one()),
                    31 => (network, U256::from(2u64)),
                    prefix => {
                        let total = U256::one() << (32 - u32::from(prefix));
                        (network + 1, total - U256::from(2u64))
                    }
                }
            }
            IpNet::V6(net) => {
                let host_bits = 128 - u32::from(net.prefix_len());
                (net.network().to_bits(), U256::one() << host_bits)
            }
        };
        Self { net, first, count }
    }

    /// The (truncated) network this block was created from.
    #[must_use]
    pub const fn network(&self) -> IpNet {
        self.net
    }

    /// Number of usable addresses in this block.
    #[must_use]
    pub const fn count(&self) -> U256 {
        self.count
    }

    /// The [`AddressFamily`] of this block.
    #[must_use]
    pub const fn address_family(&self) -> AddressFamily {
        match self.net {
            IpNet::V4(_) => AddressFamily::IPv4,
            IpNet::V6(_) => AddressFamily::IPv6,
        }
    }

    /// Usable address at the given zero-based index.
    pub fn get(&self, index: U256) -> Result<IpAddr, IndexOutOfRangeError> {
        if index >= self.count {
            return Err(IndexOutOfRangeError::new(index, self.count));
        }
        // first + count never exceeds the family's address space
        Ok(self.addr_from_bits(self.first + index.low_u128()))
    }

    /// Index of the given address within this block,
    /// `None` if it is not one of its usable addresses.
    #[must_use]
    pub fn index_of(&self, addr: IpAddr) -> Option<U256> {
        let bits = match (self.net, addr) {
            (IpNet::V4(_), IpAddr::V4(addr)) => u128::from(addr.to_bits()),
            (IpNet::V6(_), IpAddr::V6(addr)) => addr.to_bits(),
            _ => return None,
        };
        let offset = U256::from(bits.checked_sub(self.first)?);
        (offset < self.count).then_some(offset)
    }

    /// Returns `true` if the address is one of the usable addresses of this block.
    #[must_use]
    pub fn contains(&self, addr: IpAddr) -> bool {
        self.index_of(addr).is_some()
    }

    /// Iterate over the usable addresses of this block, in index order.
    #[must_use]
    pub const fn iter(&self) -> IpBlockIter {
        IpBlockIter {
            block: *self,
            next: self.first,
            remaining: self.count,
        }
    }

    fn addr_from_bits(&self, bits: u128) -> IpAddr {
        match self.net {
            IpNet::V4(_) => IpAddr::V4(Ipv4Addr::from_bits(bits as u32)),
            IpNet::V6(_) => IpAddr::V6(Ipv6Addr::from_bits(bits)),
        }
    }
}

impl AddressBlock for IpBlock {
    #[inline]
    fn count(&self) -> U256 {
        self.count
    }

    #[inline]
    fn get(&self, index: U256) -> Result<IpAddr, IndexOutOfRangeError> {
        Self::get(self, index)
    }

    #[inline]
    fn address_family(&self) -> AddressFamily {
        Self::address_family(self)
    }
}

impl From<IpNet> for IpBlock {
    fn from(net: IpNet) -> Self {
        Self::new(net)
    }
}

impl From<Ipv4Net> for IpBlock {
    fn from(net: Ipv4Net) -> Self {
        Self::new(net)
    }
}

impl From<Ipv6Net> for IpBlock {
    fn from(net: Ipv6Net) -> Self {
        Self::new(net)
    }
}

impl FromStr for IpBlock {
    type Err = InvalidCidrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_from(s)
    }
}

impl TryFrom<&str> for IpBlock {
    type Error = InvalidCidrError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        value
            .trim()
            .parse::<IpNet>()
            .map(Self::new)
            .map_err(|err| InvalidCidrError::new(value, err))
    }
}

impl TryFrom<String> for IpBlock {
    type Error = InvalidCidrError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::try_from(value.as_str())
    }
}

impl fmt::Display for IpBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.net, f)
    }
}

impl Serialize for IpBlock {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for IpBlock {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = <std::borrow::Cow<'de, str>>::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

impl IntoIterator for IpBlock {
    type Item = IpAddr;
    type IntoIter = IpBlockIter;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl IntoIterator for &IpBlock {
    type Item = IpAddr;
    type IntoIter = IpBlockIter;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over the usable addresses of an [`IpBlock`],
/// created by [`IpBlock::iter`].
#[derive(Debug, Clone)]
pub struct IpBlockIter {
    block: IpBlock,
    next: u128,
    remaining: U256,
}

impl Iterator for IpBlockIter {
    type Item = IpAddr;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining.is_zero() {
            return None;
        }
        let addr = self.block.addr_from_bits(self.next);
        self.next = self.next.wrapping_add(1);
        self.remaining -= U256::one();
        Some(addr)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.remaining > U256::from(usize::MAX) {
            (usize::MAX, None)
        } else {
            let n = self.remaining.as_usize();
            (n, Some(n))
        }
    }
}

impl FusedIterator for IpBlockIter {}
