//! Core types shared by all `iprot` crates.
//!
//! Contains the error types and utilities used throughout the workspace,
//! as well as the [`telemetry`] re-exports used for structured logging.
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

pub mod error;
pub mod telemetry;
