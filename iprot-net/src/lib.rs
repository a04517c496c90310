//! iprot network types and utilities.
//!
//! - [`address`]: CIDR blocks as dense, randomly indexable address spaces;
//! - [`socket`]: construction of the sockets an egress address is bound to.
//!
//! # iprot
//!
//! Crate used by the end-user `iprot` crate and `iprot` crate authors alike.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![cfg_attr(
    not(test),
    warn(clippy::print_stdout, clippy::dbg_macro),
    deny(clippy::unwrap_used, clippy::expect_used)
)]

pub mod address;
pub mod socket;
