use crate::{BoxDnsResolver, DnsDeniedError, HostEntry};
use iprot_core::error::BoxError;
use iprot_net::address::AddressFamily;
use std::sync::Arc;

/// A resolver of host names into IP addresses.
///
/// Cancellation is cooperative: dropping the returned future
/// aborts the lookup, no other state is kept.
pub trait DnsResolver: Sized + Send + Sync + 'static {
    /// Error returned by the [`DnsResolver`]
    type Error: Into<BoxError> + Send + 'static;

    /// Resolve the given host, restricted to the given [`AddressFamily`]
    /// or any family if `None`.
    fn resolve(
        &self,
        host: String,
        family: Option<AddressFamily>,
    ) -> impl Future<Output = Result<HostEntry, Self::Error>> + Send + '_;

    /// Box this resolver to allow for dynamic dispatch.
    fn boxed(self) -> BoxDnsResolver {
        BoxDnsResolver::new(self)
    }
}

impl<R: DnsResolver> DnsResolver for Arc<R> {
    type Error = R::Error;

    #[inline]
    fn resolve(
        &self,
        host: String,
        family: Option<AddressFamily>,
    ) -> impl Future<Output = Result<HostEntry, Self::Error>> + Send + '_ {
        (**self).resolve(host, family)
    }
}

impl<R: DnsResolver> DnsResolver for Option<R> {
    type Error = BoxError;

    async fn resolve(
        &self,
        host: String,
        family: Option<AddressFamily>,
    ) -> Result<HostEntry, Self::Error> {
        match self {
            Some(resolver) => resolver.resolve(host, family).await.map_err(Into::into),
            None => Err(DnsDeniedError.into()),
        }
    }
}
