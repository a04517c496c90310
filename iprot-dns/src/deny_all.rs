use crate::{DnsResolver, HostEntry};
use iprot_net::address::AddressFamily;
use iprot_utils::macros::error::static_str_error;

#[derive(Debug, Clone, Default)]
#[non_exhaustive]
/// a [`DnsResolver`] implementation which
/// denies all incoming DNS requests with a [`DnsDeniedError`].
pub struct DenyAllDns;

impl DenyAllDns {
    #[inline]
    /// Create a new [`Default`] [`DenyAllDns`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

static_str_error! {
    #[doc = "Dns denied"]
    pub struct DnsDeniedError;
}

impl DnsResolver for DenyAllDns {
    type Error = DnsDeniedError;

    async fn resolve(
        &self,
        _host: String,
        _family: Option<AddressFamily>,
    ) -> Result<HostEntry, Self::Error> {
        Err(DnsDeniedError)
    }
}
