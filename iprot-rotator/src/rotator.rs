use crate::{AddressSelector, FailedAddress, FailedAddresses, SelectContext};
use arc_swap::ArcSwapOption;
use iprot_core::{error::OpaqueError, telemetry::tracing};
use iprot_dns::{DnsResolver, GlobalDnsResolver, HostEntry};
use iprot_net::address::AddressBlock;
use iprot_utils::time::{duration_as_millis_i64, unix_ms_after};
use std::{fmt, net::IpAddr, sync::Arc, time::Duration};
use tokio_util::sync::CancellationToken;

/// Default time an address stays in the failed set: 7 days.
pub const DEFAULT_FAILED_ADDRESS_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Failure-aware rotation over the addresses of an [`AddressBlock`].
///
/// The [`AddressSelector`] `S` decides which address is handed out,
/// the rotator keeps track of failed addresses and of the last address used.
/// All operations take `&self` and can be called from many threads at once.
///
/// # Example
///
/// ```
/// use iprot_net::address::IpBlock;
/// use iprot_rotator::{NoValidAddressError, Rotator, SelectContext};
///
/// let block: IpBlock = "10.0.0.0/30".parse().unwrap();
/// let rotator = Rotator::new(block, |ctx: &SelectContext<'_, IpBlock>| {
///     ctx.block()
///         .iter()
///         .find(|addr| ctx.is_valid(*addr))
///         .ok_or(NoValidAddressError::new())
/// });
///
/// let first = rotator.get_address().unwrap();
/// rotator.add_failed_address(first);
/// assert_ne!(rotator.get_address().unwrap(), first);
/// ```
#[derive(Debug)]
pub struct Rotator<B, S, R = GlobalDnsResolver> {
    block: B,
    selector: S,
    dns: R,
    failed: FailedAddresses,
    failed_address_ttl: Duration,
    last_used: ArcSwapOption<IpAddr>,
}

impl<B, S> Rotator<B, S>
where
    B: AddressBlock,
    S: AddressSelector<B>,
{
    /// Create a new [`Rotator`] using the [`DEFAULT_FAILED_ADDRESS_TTL`]
    /// and the global DNS resolver.
    pub fn new(block: B, selector: S) -> Self {
        Self {
            block,
            selector,
            dns: GlobalDnsResolver::new(),
            failed: FailedAddresses::new(),
            failed_address_ttl: DEFAULT_FAILED_ADDRESS_TTL,
            last_used: ArcSwapOption::empty(),
        }
    }
}

impl<B, S, R> Rotator<B, S, R> {
    /// Set the time an address stays failed after being reported.
    #[must_use]
    pub fn with_failed_address_ttl(mut self, ttl: Duration) -> Self {
        self.failed_address_ttl = ttl;
        self
    }

    /// Set the time an address stays failed after being reported.
    ///
    /// Only affects failures reported from now on.
    pub fn set_failed_address_ttl(&mut self, ttl: Duration) -> &mut Self {
        self.failed_address_ttl = ttl;
        self
    }

    /// Use the given [`DnsResolver`] for [`Rotator::resolve_host`].
    pub fn with_dns_resolver<T>(self, dns: T) -> Rotator<B, S, T> {
        Rotator {
            block: self.block,
            selector: self.selector,
            dns,
            failed: self.failed,
            failed_address_ttl: self.failed_address_ttl,
            last_used: self.last_used,
        }
    }

    /// The address space addresses are selected from.
    pub fn address_block(&self) -> &B {
        &self.block
    }

    pub fn selector(&self) -> &S {
        &self.selector
    }

    /// The time an address stays failed after being reported.
    pub fn failed_address_ttl(&self) -> Duration {
        self.failed_address_ttl
    }

    /// The address returned by the most recent [`Rotator::get_address`] call.
    pub fn last_used_address(&self) -> Option<IpAddr> {
        self.last_used.load().as_deref().copied()
    }

    /// Removes the address from the failed set, a no-op if it is absent.
    pub fn remove_failed_address(&self, address: IpAddr) {
        if self.failed.remove(address) {
            tracing::info!(%address, "failed address removed");
        } else {
            tracing::debug!(%address, "address to remove was not failed");
        }
    }

    /// Removes all addresses from the failed set.
    pub fn clear_failed_addresses(&self) {
        let cleared = self.failed.clear();
        tracing::info!(cleared, "failed addresses cleared");
    }

    /// Returns `true` unless the address is currently marked as failed.
    ///
    /// Evicts the entry of an address whose failure expired.
    pub fn is_valid_address(&self, address: IpAddr) -> bool {
        let valid = self.failed.is_valid(address);
        tracing::debug!(%address, valid, "address validity checked");
        valid
    }

    /// Snapshot of the addresses in the failed set,
    /// expired ones that were not yet evicted included.
    pub fn failed_addresses(&self) -> Vec<IpAddr> {
        self.failed.addresses()
    }

    /// Snapshot of the failed set, with the expiry of each address.
    pub fn failed_address_entries(&self) -> Vec<FailedAddress> {
        self.failed.entries()
    }
}

impl<B, S, R> Rotator<B, S, R>
where
    B: AddressBlock,
    S: AddressSelector<B>,
{
    /// Select the next address using the [`AddressSelector`],
    /// and record it as the last used address.
    pub fn get_address(&self) -> Result<IpAddr, S::Error> {
        let ctx = SelectContext::new(&self.block, &self.failed, self.last_used_address());
        let address = self.selector.select_address(&ctx)?;
        self.last_used.store(Some(Arc::new(address)));
        tracing::debug!(%address, "address selected");
        Ok(address)
    }

    /// Mark the address as failed for the configured ttl.
    ///
    /// Reporting an address that is already failed extends its exclusion.
    pub fn add_failed_address(&self, address: IpAddr) {
        let expires_at_ms = unix_ms_after(self.failed_address_ttl);
        self.failed.insert(address, expires_at_ms);
        tracing::info!(
            %address,
            expires_at_ms,
            ttl_ms = duration_as_millis_i64(self.failed_address_ttl),
            "address marked as failed"
        );
        self.selector.on_address_failure(address);
    }

    /// Resolve the host for the [`AddressFamily`] of the selector,
    /// the family of the address block by default.
    ///
    /// Returns [`ResolveHostError::Cancelled`] as soon as the token is cancelled,
    /// dropping the pending lookup.
    ///
    /// [`AddressFamily`]: iprot_net::address::AddressFamily
    pub async fn resolve_host(
        &self,
        host: impl Into<String>,
        cancel: &CancellationToken,
    ) -> Result<HostEntry, ResolveHostError>
    where
        R: DnsResolver,
    {
        let host = host.into();
        let family = self.selector.dns_address_family(&self.block);
        tracing::trace!(%host, %family, "resolve host");

        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::trace!(%host, "host resolution cancelled");
                Err(ResolveHostError::Cancelled)
            }
            result = self.dns.resolve(host.clone(), Some(family)) => {
                result.map_err(|err| {
                    let err = OpaqueError::from_boxed(err.into());
                    tracing::trace!(%host, "host resolution failed: {err}");
                    ResolveHostError::Lookup(err)
                })
            }
        }
    }
}

/// Error returned by [`Rotator::resolve_host`].
#[derive(Debug)]
pub enum ResolveHostError {
    /// The cancellation token fired before the lookup completed.
    Cancelled,
    /// The DNS resolver failed.
    Lookup(OpaqueError),
}

impl fmt::Display for ResolveHostError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cancelled => f.write_str("host resolution cancelled"),
            Self::Lookup(err) => write!(f, "host resolution failed: {err}"),
        }
    }
}

impl std::error::Error for ResolveHostError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Cancelled => None,
            Self::Lookup(err) => Some(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NoValidAddressError;
    use iprot_dns::{DenyAllDns, DnsDeniedError, InMemoryDns};
    use iprot_net::address::{AddressFamily, IpBlock, MultiIpBlock};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use ::tracing;
    use tracing_test::traced_test;

    fn ip(s: &str) -> IpAddr {
        s.parse().unwrap()
    }

    /// first valid address in index order
    #[derive(Debug, Default)]
    struct FirstValid {
        failures: AtomicUsize,
    }

    impl<B: AddressBlock> AddressSelector<B> for FirstValid {
        type Error = NoValidAddressError;

        fn select_address(&self, ctx: &SelectContext<'_, B>) -> Result<IpAddr, Self::Error> {
            let block = ctx.block();
            let mut index = iprot_utils::U256::zero();
            while index < block.count() {
                let address = block.get(index).map_err(|_| NoValidAddressError)?;
                if ctx.is_valid(address) {
                    return Ok(address);
                }
                index += iprot_utils::U256::one();
            }
            Err(NoValidAddressError)
        }

        fn on_address_failure(&self, _address: IpAddr) {
            self.failures.fetch_add(1, Ordering::SeqCst);
        }
    }

    /// resolves hosts as IPv6, whatever the block
    #[derive(Debug)]
    struct Ipv6Dns;

    impl<B: AddressBlock> AddressSelector<B> for Ipv6Dns {
        type Error = NoValidAddressError;

        fn select_address(&self, _ctx: &SelectContext<'_, B>) -> Result<IpAddr, Self::Error> {
            Err(NoValidAddressError)
        }

        fn dns_address_family(&self, _block: &B) -> AddressFamily {
            AddressFamily::IPv6
        }
    }

    fn rotator(cidr: &str) -> Rotator<IpBlock, FirstValid> {
        Rotator::new(cidr.parse().unwrap(), FirstValid::default())
    }

    fn dns() -> InMemoryDns {
        let mut dns = InMemoryDns::new();
        dns.insert(
            "example.com",
            vec![ip("93.184.215.14"), ip("2606:2800:21f:cb07:6820:80da:af6b:8b2c")],
        );
        dns
    }

    #[test]
    fn defaults() {
        let rotator = rotator("10.0.0.0/24");
        assert_eq!(rotator.failed_address_ttl(), DEFAULT_FAILED_ADDRESS_TTL);
        assert_eq!(DEFAULT_FAILED_ADDRESS_TTL, Duration::from_secs(604_800));
        assert_eq!(rotator.last_used_address(), None);
        assert!(rotator.failed_addresses().is_empty());
        assert_eq!(rotator.address_block().to_string(), "10.0.0.0/24");
    }

    #[test]
    fn get_address_records_last_used() {
        let rotator = rotator("10.0.0.0/24");
        let address = rotator.get_address().unwrap();
        assert_eq!(address, ip("10.0.0.1"));
        assert_eq!(rotator.last_used_address(), Some(address));
    }

    #[test]
    fn selection_error_is_surfaced() {
        let rotator = rotator("10.0.0.1/32");
        rotator.add_failed_address(ip("10.0.0.1"));
        assert_eq!(rotator.get_address().unwrap_err(), NoValidAddressError);
        assert_eq!(rotator.last_used_address(), None);
    }

    #[test]
    fn closure_selector_sees_last_used() {
        let rotator = Rotator::new(
            MultiIpBlock::try_from_cidrs(["10.0.0.1/32", "10.0.0.2/32"]).unwrap(),
            |ctx: &SelectContext<'_, MultiIpBlock>| -> Result<IpAddr, NoValidAddressError> {
                let mut addresses = ctx.block().iter();
                let first = addresses.next().ok_or(NoValidAddressError)?;
                match ctx.last_used_address() {
                    Some(last) if last == first => addresses.next().ok_or(NoValidAddressError),
                    _ => Ok(first),
                }
            },
        );
        assert_eq!(rotator.get_address().unwrap(), ip("10.0.0.1"));
        assert_eq!(rotator.get_address().unwrap(), ip("10.0.0.2"));
        assert_eq!(rotator.get_address().unwrap(), ip("10.0.0.1"));
    }

    #[test]
    fn failed_address_is_skipped_and_hook_called() {
        let rotator = rotator("10.0.0.0/24");
        rotator.add_failed_address(ip("10.0.0.1"));
        assert!(!rotator.is_valid_address(ip("10.0.0.1")));
        assert_eq!(rotator.get_address().unwrap(), ip("10.0.0.2"));
        assert_eq!(rotator.selector().failures.load(Ordering::SeqCst), 1);
        assert_eq!(rotator.failed_addresses(), vec![ip("10.0.0.1")]);
    }

    #[test]
    fn default_ttl_keeps_address_failed_until_cleared() {
        let rotator = rotator("10.0.0.0/24");
        rotator.add_failed_address(ip("10.0.0.1"));
        assert!(!rotator.is_valid_address(ip("10.0.0.1")));
        rotator.clear_failed_addresses();
        assert!(rotator.is_valid_address(ip("10.0.0.1")));
        assert!(rotator.failed_addresses().is_empty());
    }

    #[test]
    fn repeated_failure_extends_expiry() {
        let rotator = rotator("10.0.0.0/24");
        rotator.add_failed_address(ip("10.0.0.1"));
        let first = rotator.failed_address_entries()[0].expires_at_ms();
        std::thread::sleep(Duration::from_millis(5));
        rotator.add_failed_address(ip("10.0.0.1"));
        let entries = rotator.failed_address_entries();
        assert_eq!(entries.len(), 1);
        assert!(entries[0].expires_at_ms() > first);
        assert_eq!(rotator.selector().failures.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn failure_expires_lazily() {
        let rotator = rotator("10.0.0.0/24").with_failed_address_ttl(Duration::from_millis(10));
        rotator.add_failed_address(ip("10.0.0.1"));
        assert!(!rotator.is_valid_address(ip("10.0.0.1")));
        std::thread::sleep(Duration::from_millis(20));
        assert_eq!(rotator.failed_addresses(), vec![ip("10.0.0.1")]);
        assert!(rotator.is_valid_address(ip("10.0.0.1")));
        assert!(rotator.failed_addresses().is_empty());
    }

    #[test]
    fn set_ttl_applies_to_new_failures() {
        let mut rotator = rotator("10.0.0.0/24");
        rotator.add_failed_address(ip("10.0.0.1"));
        rotator.set_failed_address_ttl(Duration::ZERO);
        rotator.add_failed_address(ip("10.0.0.2"));
        assert!(!rotator.is_valid_address(ip("10.0.0.1")));
        assert!(rotator.is_valid_address(ip("10.0.0.2")));
    }

    #[test]
    fn remove_failed_address() {
        let rotator = rotator("10.0.0.0/24");
        rotator.remove_failed_address(ip("10.0.0.9"));
        rotator.add_failed_address(ip("10.0.0.1"));
        rotator.add_failed_address(ip("10.0.0.2"));
        rotator.remove_failed_address(ip("10.0.0.1"));
        assert!(rotator.is_valid_address(ip("10.0.0.1")));
        assert_eq!(rotator.failed_addresses(), vec![ip("10.0.0.2")]);
    }

    #[test]
    fn concurrent_reports_and_selection() {
        let rotator = rotator("10.0.0.0/24");
        std::thread::scope(|s| {
            for t in 0..4u8 {
                let rotator = &rotator;
                s.spawn(move || {
                    for i in 0..50u8 {
                        let address = IpAddr::from([10, 0, 0, 1 + (t * 50 + i) % 254]);
                        rotator.add_failed_address(address);
                        let _ = rotator.is_valid_address(address);
                        let _ = rotator.get_address();
                        if i % 2 == 0 {
                            rotator.remove_failed_address(address);
                        }
                    }
                });
            }
        });
        assert_eq!(rotator.failed_addresses().len(), 100);
        assert_eq!(rotator.selector().failures.load(Ordering::SeqCst), 200);
        rotator.clear_failed_addresses();
        assert!(rotator.failed_addresses().is_empty());
    }

    #[tokio::test]
    async fn resolve_host_uses_block_family() {
        let v4 = rotator("10.0.0.0/24").with_dns_resolver(dns());
        let entry = v4
            .resolve_host("example.com", &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(entry.addresses(), [ip("93.184.215.14")]);

        let v6 = Rotator::new(
            "2001:db8::/64".parse::<IpBlock>().unwrap(),
            FirstValid::default(),
        )
        .with_dns_resolver(dns());
        let entry = v6
            .resolve_host("example.com", &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(entry.addresses(), [ip("2606:2800:21f:cb07:6820:80da:af6b:8b2c")]);
    }

    #[tokio::test]
    async fn resolve_host_uses_selector_family() {
        let rotator = Rotator::new("10.0.0.0/24".parse::<IpBlock>().unwrap(), Ipv6Dns)
            .with_dns_resolver(dns());
        let entry = rotator
            .resolve_host("example.com", &CancellationToken::new())
            .await
            .unwrap();
        assert!(entry.addresses().iter().all(IpAddr::is_ipv6));
    }

    #[tokio::test]
    async fn resolve_host_failure_is_lookup_error() {
        let rotator = rotator("10.0.0.0/24").with_dns_resolver(DenyAllDns::new());
        let err = rotator
            .resolve_host("example.com", &CancellationToken::new())
            .await
            .unwrap_err();
        match err {
            ResolveHostError::Lookup(err) => assert!(err.is::<DnsDeniedError>()),
            ResolveHostError::Cancelled => panic!("unexpected cancellation"),
        }
    }

    #[tokio::test]
    async fn resolve_host_cancelled_before_start() {
        let rotator = rotator("10.0.0.0/24").with_dns_resolver(dns());
        let cancel = CancellationToken::new();
        cancel.cancel();
        let err = rotator.resolve_host("example.com", &cancel).await.unwrap_err();
        assert!(matches!(err, ResolveHostError::Cancelled));
    }

    #[tokio::test]
    async fn resolve_host_cancelled_while_pending() {
        let rotator = rotator("10.0.0.0/24").with_dns_resolver(PendingDns);
        let cancel = CancellationToken::new();
        let canceller = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            canceller.cancel();
        });
        let err = rotator.resolve_host("example.com", &cancel).await.unwrap_err();
        assert!(matches!(err, ResolveHostError::Cancelled));
        assert_eq!(err.to_string(), "host resolution cancelled");
    }

    /// never completes a lookup
    #[derive(Debug)]
    struct PendingDns;

    impl DnsResolver for PendingDns {
        type Error = DnsDeniedError;

        async fn resolve(
            &self,
            _host: String,
            _family: Option<AddressFamily>,
        ) -> Result<HostEntry, Self::Error> {
            std::future::pending().await
        }
    }

    #[test]
    #[traced_test]
    fn failure_reports_are_logged() {
        let rotator = rotator("10.0.0.0/24");
        rotator.add_failed_address(ip("10.0.0.1"));
        rotator.remove_failed_address(ip("10.0.0.1"));
        rotator.clear_failed_addresses();
        assert!(logs_contain("address marked as failed"));
        assert!(logs_contain("failed address removed"));
        assert!(logs_contain("failed addresses cleared"));
    }

    #[test]
    #[traced_test]
    fn selection_is_logged() {
        let rotator = rotator("10.0.0.0/24");
        rotator.get_address().unwrap();
        assert!(logs_contain("address selected"));
        assert!(logs_contain("10.0.0.1"));
    }
}
