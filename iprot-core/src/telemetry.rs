//! Telemetry re-exports, for your convenience.
//!
//! The `iprot` crates emit structured [`tracing`] events,
//! installing a subscriber is left to the application.

pub mod tracing {
    //! Tracing core re-export.

    #[doc(inline)]
    pub use ::tracing::*;
}
