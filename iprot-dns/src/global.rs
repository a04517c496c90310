use crate::{BoxDnsResolver, DnsResolver, HostEntry, NativeDns};
use iprot_core::error::BoxError;
use iprot_net::address::AddressFamily;
use std::sync::OnceLock;

static GLOBAL_DNS_RESOLVER: OnceLock<BoxDnsResolver> = OnceLock::new();

#[derive(Debug, Clone, Default)]
#[non_exhaustive]
/// [`DnsResolver`] delegating to the [`global_dns_resolver`].
pub struct GlobalDnsResolver;

impl GlobalDnsResolver {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl DnsResolver for GlobalDnsResolver {
    type Error = BoxError;

    #[inline]
    fn resolve(
        &self,
        host: String,
        family: Option<AddressFamily>,
    ) -> impl Future<Output = Result<HostEntry, Self::Error>> + Send + '_ {
        let resolver = global_dns_resolver();
        async move { resolver.resolve(host, family).await }
    }

    fn boxed(self) -> BoxDnsResolver {
        global_dns_resolver()
    }
}

/// The process wide [`DnsResolver`], used by rotators unless configured otherwise.
///
/// Lazily initialised to [`NativeDns`] on first use. Install another resolver
/// with [`init_global_dns_resolver`] or [`try_init_global_dns_resolver`]
/// before the first lookup, after that the global resolver can no longer change.
pub fn global_dns_resolver() -> BoxDnsResolver {
    GLOBAL_DNS_RESOLVER
        .get_or_init(default_init_global_dns_resolver)
        .clone()
}

#[inline]
fn default_init_global_dns_resolver() -> BoxDnsResolver {
    NativeDns::default().boxed()
}

/// Install the global [`DnsResolver`].
///
/// # Panics
///
/// Panics if the global resolver was already installed or used,
/// see [`try_init_global_dns_resolver`] for the fallible variant.
pub fn init_global_dns_resolver(resolver: impl DnsResolver) {
    if try_init_global_dns_resolver(resolver).is_err() {
        panic!("global DNS resolver already set");
    }
}

/// Install the global [`DnsResolver`], unless one was already installed or used.
///
/// On failure the given resolver is handed back, boxed.
pub fn try_init_global_dns_resolver(resolver: impl DnsResolver) -> Result<(), BoxDnsResolver> {
    GLOBAL_DNS_RESOLVER.set(resolver.boxed())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::InMemoryDns;

    #[tokio::test]
    async fn global_resolver_can_be_initialised_once() {
        let mut dns = InMemoryDns::new();
        dns.insert("pool.internal", vec!["10.1.0.1".parse().unwrap()]);
        try_init_global_dns_resolver(dns).unwrap();
        assert!(try_init_global_dns_resolver(InMemoryDns::new()).is_err());

        let entry = GlobalDnsResolver::new()
            .resolve("pool.internal".to_owned(), Some(AddressFamily::IPv4))
            .await
            .unwrap();
        assert_eq!(entry.addresses().len(), 1);
    }
}
