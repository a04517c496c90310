use crate::FailedAddresses;
use iprot_core::error::BoxError;
use iprot_net::address::{AddressBlock, AddressFamily};
use iprot_utils::macros::error::static_str_error;
use std::{net::IpAddr, sync::Arc};

/// A policy picking the next address out of an [`AddressBlock`].
///
/// Policies typically draw an index (round-robin, random, ...)
/// and skip addresses that [`SelectContext::is_valid`] rejects.
pub trait AddressSelector<B: AddressBlock>: Send + Sync + 'static {
    /// Error returned when no address can be selected,
    /// e.g. a [`NoValidAddressError`] once every address failed.
    type Error: Into<BoxError> + Send + 'static;

    /// Select the next address.
    fn select_address(&self, ctx: &SelectContext<'_, B>) -> Result<IpAddr, Self::Error>;

    /// Called after an address was marked as failed.
    fn on_address_failure(&self, address: IpAddr) {
        let _ = address;
    }

    /// The [`AddressFamily`] host names are resolved for.
    fn dns_address_family(&self, block: &B) -> AddressFamily {
        block.address_family()
    }
}

impl<B, S> AddressSelector<B> for Arc<S>
where
    B: AddressBlock,
    S: AddressSelector<B>,
{
    type Error = S::Error;

    #[inline]
    fn select_address(&self, ctx: &SelectContext<'_, B>) -> Result<IpAddr, Self::Error> {
        (**self).select_address(ctx)
    }

    #[inline]
    fn on_address_failure(&self, address: IpAddr) {
        (**self).on_address_failure(address)
    }

    #[inline]
    fn dns_address_family(&self, block: &B) -> AddressFamily {
        (**self).dns_address_family(block)
    }
}

impl<B, F, E> AddressSelector<B> for F
where
    B: AddressBlock,
    F: Fn(&SelectContext<'_, B>) -> Result<IpAddr, E> + Send + Sync + 'static,
    E: Into<BoxError> + Send + 'static,
{
    type Error = E;

    #[inline]
    fn select_address(&self, ctx: &SelectContext<'_, B>) -> Result<IpAddr, Self::Error> {
        (self)(ctx)
    }
}

static_str_error! {
    #[doc = "no valid address available"]
    pub struct NoValidAddressError;
}

/// What an [`AddressSelector`] gets to see when selecting an address.
#[derive(Debug)]
pub struct SelectContext<'a, B> {
    block: &'a B,
    failed: &'a FailedAddresses,
    last_used: Option<IpAddr>,
}

impl<'a, B: AddressBlock> SelectContext<'a, B> {
    pub(crate) const fn new(
        block: &'a B,
        failed: &'a FailedAddresses,
        last_used: Option<IpAddr>,
    ) -> Self {
        Self {
            block,
            failed,
            last_used,
        }
    }

    /// The address space to select from.
    #[must_use]
    pub const fn block(&self) -> &'a B {
        self.block
    }

    /// Returns `true` unless the address is currently marked as failed.
    ///
    /// Evicts the entry of an address whose failure expired.
    pub fn is_valid(&self, address: IpAddr) -> bool {
        self.failed.is_valid(address)
    }

    /// The address returned by the previous selection, if any.
    #[must_use]
    pub const fn last_used_address(&self) -> Option<IpAddr> {
        self.last_used
    }
}
