use serde::{Deserialize, Serialize};
use std::{fmt, net::IpAddr};

/// The address family of an IP address, block or lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AddressFamily {
    /// Internet Protocol version 4, corresponding to `AF_INET`.
    IPv4,
    /// Internet Protocol version 6, corresponding to `AF_INET6`.
    IPv6,
}

impl AddressFamily {
    /// Returns the [`AddressFamily`] of the given [`IpAddr`].
    #[must_use]
    pub const fn of(addr: &IpAddr) -> Self {
        match addr {
            IpAddr::V4(_) => Self::IPv4,
            IpAddr::V6(_) => Self::IPv6,
        }
    }

    /// Returns `true` if the [`IpAddr`] belongs to this family.
    #[must_use]
    pub const fn matches(self, addr: &IpAddr) -> bool {
        matches!(
            (self, addr),
            (Self::IPv4, IpAddr::V4(_)) | (Self::IPv6, IpAddr::V6(_))
        )
    }
}

impl From<IpAddr> for AddressFamily {
    fn from(addr: IpAddr) -> Self {
        Self::of(&addr)
    }
}

impl From<AddressFamily> for socket2::Domain {
    fn from(family: AddressFamily) -> Self {
        match family {
            AddressFamily::IPv4 => Self::IPV4,
            AddressFamily::IPv6 => Self::IPV6,
        }
    }
}

impl fmt::Display for AddressFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IPv4 => f.write_str("IPv4"),
            Self::IPv6 => f.write_str("IPv6"),
        }
    }
}
