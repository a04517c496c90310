use super::AddressFamily;
use iprot_utils::U256;
use std::{fmt, net::IpAddr, sync::Arc};

/// Number of addresses in an IPv6 `/64` block, `2^64`.
pub const IPV6_BLOCK_64_SIZE: U256 = U256([0, 1, 0, 0]);

/// A finite, dense, ordered space of usable IP addresses.
///
/// Every index in `[0, count)` maps to exactly one address,
/// which is what allows rotation policies to pick addresses by
/// drawing a uniformly random index.
pub trait AddressBlock {
    /// Number of usable addresses in this space.
    fn count(&self) -> U256;

    /// Address at the given zero-based index.
    ///
    /// Fails with [`IndexOutOfRangeError`] when `index >= self.count()`.
    fn get(&self, index: U256) -> Result<IpAddr, IndexOutOfRangeError>;

    /// The [`AddressFamily`] shared by all addresses in this space.
    fn address_family(&self) -> AddressFamily;
}

impl<B: AddressBlock + ?Sized> AddressBlock for &B {
    #[inline]
    fn count(&self) -> U256 {
        (**self).count()
    }

    #[inline]
    fn get(&self, index: U256) -> Result<IpAddr, IndexOutOfRangeError> {
        (**self).get(index)
    }

    #[inline]
    fn address_family(&self) -> AddressFamily {
        (**self).address_family()
    }
}

impl<B: AddressBlock + ?Sized> AddressBlock for Arc<B> {
    #[inline]
    fn count(&self) -> U256 {
        (**self).count()
    }

    #[inline]
    fn get(&self, index: U256) -> Result<IpAddr, IndexOutOfRangeError> {
        (**self).get(index)
    }

    #[inline]
    fn address_family(&self) -> AddressFamily {
        (**self).address_family()
    }
}

/// Error returned when indexing past the end of an [`AddressBlock`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexOutOfRangeError {
    index: U256,
    count: U256,
}

impl IndexOutOfRangeError {
    pub(crate) const fn new(index: U256, count: U256) -> Self {
        Self { index, count }
    }

    /// The index that was requested.
    #[must_use]
    pub const fn index(&self) -> U256 {
        self.index
    }

    /// The number of addresses in the indexed block.
    #[must_use]
    pub const fn count(&self) -> U256 {
        self.count
    }
}

impl fmt::Display for IndexOutOfRangeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "address index {} out of range for block of {} addresses",
            self.index, self.count
        )
    }
}

impl std::error::Error for IndexOutOfRangeError {}

/// Error returned when a CIDR literal cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidCidrError {
    input: String,
    source: ipnet::AddrParseError,
}

impl InvalidCidrError {
    pub(crate) fn new(input: impl Into<String>, source: ipnet::AddrParseError) -> Self {
        Self {
            input: input.into(),
            source,
        }
    }

    /// The literal that failed to parse.
    #[must_use]
    pub fn input(&self) -> &str {
        &self.input
    }
}

impl fmt::Display for InvalidCidrError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid CIDR literal '{}'", self.input)
    }
}

impl std::error::Error for InvalidCidrError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}
