//! Failure-aware rotation of local (egress) IP addresses.
//!
//! `iprot` hands out source addresses for outbound connections from a pool
//! described as one or more CIDR blocks, and keeps addresses that recently
//! failed out of rotation until their retention period expires.
//!
//! | module | content |
//! |-|-|
//! | [`net`] | [`IpBlock`](net::address::IpBlock) ⸱ [`MultiIpBlock`](net::address::MultiIpBlock) ⸱ [`SocketFactory`](net::socket::SocketFactory) |
//! | [`dns`] | [`DnsResolver`](dns::DnsResolver) ⸱ [`NativeDns`](dns::NativeDns) ⸱ [`InMemoryDns`](dns::InMemoryDns) |
//! | [`rotator`] | [`Rotator`](rotator::Rotator) ⸱ [`AddressSelector`](rotator::AddressSelector) |
//! | [`utils`] | [`U256`](utils::U256) ⸱ [random big-integer ranges](utils::rng) |
//! | [`error`] | [`BoxError`](error::BoxError) ⸱ [`OpaqueError`](error::OpaqueError) |
//!
//! # Example
//!
//! ```
//! use iprot::{
//!     net::address::MultiIpBlock,
//!     rotator::{NoValidAddressError, Rotator, SelectContext},
//!     utils::rng::RngU256Ext,
//! };
//! use rand::rng;
//!
//! let pool = MultiIpBlock::try_from_cidrs(["192.168.0.0/24", "192.168.1.0/28"]).unwrap();
//! let rotator = Rotator::new(pool, |ctx: &SelectContext<'_, MultiIpBlock>| {
//!     let block = ctx.block();
//!     for _ in 0..16 {
//!         let index = rng().random_u256_range(0.into(), block.count()).unwrap();
//!         let address = block.get(index).unwrap();
//!         if ctx.is_valid(address) {
//!             return Ok(address);
//!         }
//!     }
//!     Err(NoValidAddressError::new())
//! });
//!
//! let address = rotator.get_address().unwrap();
//! rotator.add_failed_address(address);
//! assert!(!rotator.is_valid_address(address));
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![cfg_attr(
    not(test),
    warn(clippy::print_stdout, clippy::dbg_macro),
    deny(clippy::unwrap_used, clippy::expect_used)
)]

#[doc(inline)]
pub use ::iprot_core::error;

#[doc(inline)]
pub use ::iprot_core::telemetry;

#[doc(inline)]
pub use ::iprot_utils as utils;

#[cfg(feature = "net")]
#[cfg_attr(docsrs, doc(cfg(feature = "net")))]
#[doc(inline)]
pub use ::iprot_net as net;

#[cfg(feature = "dns")]
#[cfg_attr(docsrs, doc(cfg(feature = "dns")))]
#[doc(inline)]
pub use ::iprot_dns as dns;

#[cfg(feature = "rotator")]
#[cfg_attr(docsrs, doc(cfg(feature = "rotator")))]
#[doc(inline)]
pub use ::iprot_rotator as rotator;
