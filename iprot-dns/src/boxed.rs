use crate::{DnsResolver, HostEntry};
use iprot_core::error::BoxError;
use iprot_net::address::AddressFamily;
use std::{pin::Pin, sync::Arc};

/// Internal trait for dynamic dispatch of the async [`DnsResolver`] trait,
/// following the design published at
/// <https://blog.rust-lang.org/inside-rust/2023/05/03/stabilizing-async-fn-in-trait.html>.
trait DynDnsResolver {
    fn resolve_box(
        &self,
        host: String,
        family: Option<AddressFamily>,
    ) -> Pin<Box<dyn Future<Output = Result<HostEntry, BoxError>> + Send + '_>>;
}

impl<R: DnsResolver> DynDnsResolver for R {
    fn resolve_box(
        &self,
        host: String,
        family: Option<AddressFamily>,
    ) -> Pin<Box<dyn Future<Output = Result<HostEntry, BoxError>> + Send + '_>> {
        Box::pin(async move { self.resolve(host, family).await.map_err(Into::into) })
    }
}

/// A boxed [`DnsResolver`], for where you require dynamic dispatch.
pub struct BoxDnsResolver {
    inner: Arc<dyn DynDnsResolver + Send + Sync + 'static>,
}

impl BoxDnsResolver {
    /// Create a new [`BoxDnsResolver`] from the given dns resolver.
    #[inline]
    pub fn new(resolver: impl DnsResolver) -> Self {
        Self {
            inner: Arc::new(resolver),
        }
    }
}

impl Clone for BoxDnsResolver {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl std::fmt::Debug for BoxDnsResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoxDnsResolver").finish()
    }
}

impl DnsResolver for BoxDnsResolver {
    type Error = BoxError;

    #[inline]
    fn resolve(
        &self,
        host: String,
        family: Option<AddressFamily>,
    ) -> impl Future<Output = Result<HostEntry, Self::Error>> + Send + '_ {
        self.inner.resolve_box(host, family)
    }

    fn boxed(self) -> BoxDnsResolver {
        self
    }
}
