//! Error types for iprot.
//!
//! The [`BoxError`] type is a type-erased error type that can be used to represent any error that
//! implements the `std::error::Error` trait and is used for cases where it is usually not
//! that important what specific error type is returned, but rather that an error occurred.
//!
//! Errors that a caller is expected to act upon (e.g. a malformed CIDR literal
//! versus an exhausted address pool) are concrete types defined by the crate that produces them,
//! so they can be told apart by kind instead of by message.
//!
//! That said, one can use downcasting or [`ErrorExt`] to try to get the cause of the error.

use std::error::Error as StdError;

/// Alias for a type-erased error type.
pub type BoxError = Box<dyn StdError + Send + Sync>;

mod ext;
#[doc(inline)]
pub use ext::{ErrorContext, ErrorExt, OpaqueError};
