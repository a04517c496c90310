use crate::{DnsResolver, HostEntry};
use iprot_core::{
    error::{ErrorContext as _, OpaqueError},
    telemetry::tracing,
};
use iprot_net::address::AddressFamily;
use iprot_utils::macros::error::static_str_error;

#[derive(Debug, Clone, Default)]
#[non_exhaustive]
/// [`DnsResolver`] using the resolver of the operating system,
/// as exposed by [`tokio::net::lookup_host`].
///
/// Lookups run on tokio's blocking pool, so a tokio runtime is required.
pub struct NativeDns;

impl NativeDns {
    #[inline]
    /// Create a new [`NativeDns`] resolver.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

static_str_error! {
    #[doc = "no DNS record found for host and address family"]
    pub struct DnsRecordNotFoundError;
}

impl DnsResolver for NativeDns {
    type Error = OpaqueError;

    async fn resolve(
        &self,
        host: String,
        family: Option<AddressFamily>,
    ) -> Result<HostEntry, Self::Error> {
        tracing::trace!(%host, ?family, "resolve host using system resolver");

        let resolved = tokio::net::lookup_host((host.as_str(), 0))
            .await
            .context("system resolver lookup")?;

        let mut addresses = Vec::new();
        for addr in resolved.map(|addr| addr.ip()) {
            if family.is_none_or(|family| family.matches(&addr)) && !addresses.contains(&addr) {
                addresses.push(addr);
            }
        }

        tracing::trace!(%host, ?family, "system resolver found {} address(es)", addresses.len());

        if addresses.is_empty() {
            return Err(OpaqueError::from_std(DnsRecordNotFoundError));
        }
        Ok(HostEntry::new(host, addresses))
    }
}
