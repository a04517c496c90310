//! hidden iprot macros

#[doc(hidden)]
#[macro_use]
pub mod error;
