//! Failure-aware rotation over a pool of local (egress) IP addresses.
//!
//! A [`Rotator`] owns an [`AddressBlock`] and a set of addresses
//! that recently failed. Which address is handed out next is decided
//! by an [`AddressSelector`], a policy that can consult the failed set
//! through its [`SelectContext`]. Failed addresses become eligible
//! again once their retention period expires, or when removed explicitly.
//!
//! # iprot
//!
//! Crate used by the end-user `iprot` crate and `iprot` crate authors alike.
//!
//! [`AddressBlock`]: iprot_net::address::AddressBlock

#![cfg_attr(docsrs, feature(doc_cfg))]
#![cfg_attr(
    not(test),
    warn(clippy::print_stdout, clippy::dbg_macro),
    deny(clippy::unwrap_used, clippy::expect_used)
)]

mod failed;
#[doc(inline)]
pub use failed::{FailedAddress, FailedAddresses};

mod selector;
#[doc(inline)]
pub use selector::{AddressSelector, NoValidAddressError, SelectContext};

mod rotator;
#[doc(inline)]
pub use rotator::{DEFAULT_FAILED_ADDRESS_TTL, ResolveHostError, Rotator};

#[doc(no_inline)]
pub use tokio_util::sync::CancellationToken;
