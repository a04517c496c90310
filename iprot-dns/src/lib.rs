//! DNS support for iprot.
//!
//! Host names are resolved through a [`DnsResolver`],
//! scoped to an optional [`AddressFamily`] so that a lookup
//! only yields addresses reachable from the egress pool in use.
//!
//! # iprot
//!
//! Crate used by the end-user `iprot` crate and `iprot` crate authors alike.
//!
//! [`AddressFamily`]: iprot_net::address::AddressFamily

#![cfg_attr(docsrs, feature(doc_cfg))]
#![cfg_attr(
    not(test),
    warn(clippy::print_stdout, clippy::dbg_macro),
    deny(clippy::unwrap_used, clippy::expect_used)
)]

mod entry;
#[doc(inline)]
pub use entry::HostEntry;

mod resolver;
#[doc(inline)]
pub use resolver::DnsResolver;

mod boxed;
#[doc(inline)]
pub use boxed::BoxDnsResolver;

mod native;
#[doc(inline)]
pub use native::{DnsRecordNotFoundError, NativeDns};

mod in_memory;
#[doc(inline)]
pub use in_memory::{DomainNotMappedError, InMemoryDns};

mod deny_all;
#[doc(inline)]
pub use deny_all::{DenyAllDns, DnsDeniedError};

mod global;
#[doc(inline)]
pub use global::{
    GlobalDnsResolver, global_dns_resolver, init_global_dns_resolver,
    try_init_global_dns_resolver,
};
