//! utilities crate for iprot
//!
//! `iprot-utils` contains utilities used by `iprot`,
//! not really being part of one of the other crates, or used
//! by plenty of other crates.
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

#[doc(hidden)]
#[macro_use]
pub mod macros;

pub mod rng;
pub mod time;

/// 256-bit unsigned integer used for address counts and indices.
///
/// Wide enough to hold the size of any IPv6 block (`2^128` for `::/0`)
/// as well as the sum of many of them.
#[doc(inline)]
pub use ::primitive_types::U256;
