//! Address spaces of local (egress) IP addresses.
//!
//! An [`IpBlock`] wraps a single CIDR block, a [`MultiIpBlock`] composes
//! several blocks of the same [`AddressFamily`] into one logical space.
//! Both implement [`AddressBlock`], which is what rotation policies index into.

#[doc(inline)]
pub use ipnet::{IpNet, Ipv4Net, Ipv6Net};

mod family;
#[doc(inline)]
pub use family::AddressFamily;

mod block;
#[doc(inline)]
pub use block::{AddressBlock, IPV6_BLOCK_64_SIZE, IndexOutOfRangeError, InvalidCidrError};

mod ip_block;
#[doc(inline)]
pub use ip_block::{IpBlock, IpBlockIter};

mod multi_ip_block;
#[doc(inline)]
pub use multi_ip_block::{MultiIpBlock, MultiIpBlockError};
