//! Construction of the OS sockets outbound connections are made from.

pub use ::socket2 as core;

use crate::address::AddressFamily;
use socket2::{Protocol, SockAddr, Socket, Type};
use std::{
    io,
    net::{IpAddr, SocketAddr},
    sync::Arc,
};

/// Creates the sockets used for outbound connections.
///
/// Pairs with a rotation policy: the policy picks the local address,
/// the factory creates a socket that can be bound to it.
pub trait SocketFactory: Send + Sync + 'static {
    /// Create an unbound socket for the given [`AddressFamily`].
    fn create_socket(&self, family: AddressFamily) -> io::Result<Socket>;

    /// Create a socket bound to the given local address,
    /// using an OS-assigned port.
    fn create_bound_socket(&self, local: IpAddr) -> io::Result<Socket> {
        let socket = self.create_socket(AddressFamily::of(&local))?;
        let addr: SockAddr = SocketAddr::new(local, 0).into();
        socket.bind(&addr)?;
        Ok(socket)
    }
}

/// The default [`SocketFactory`]: TCP stream sockets with Nagle's algorithm disabled.
#[derive(Debug, Clone, Default)]
#[non_exhaustive]
pub struct NativeSocketFactory;

impl NativeSocketFactory {
    /// Create a new [`NativeSocketFactory`].
    #[inline(always)]
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl SocketFactory for NativeSocketFactory {
    fn create_socket(&self, family: AddressFamily) -> io::Result<Socket> {
        let socket = Socket::new(family.into(), Type::STREAM, Some(Protocol::TCP))?;
        socket.set_tcp_nodelay(true)?;
        Ok(socket)
    }
}

impl<T: SocketFactory> SocketFactory for Arc<T> {
    fn create_socket(&self, family: AddressFamily) -> io::Result<Socket> {
        (**self).create_socket(family)
    }

    fn create_bound_socket(&self, local: IpAddr) -> io::Result<Socket> {
        (**self).create_bound_socket(local)
    }
}

impl<F> SocketFactory for F
where
    F: Fn(AddressFamily) -> io::Result<Socket> + Send + Sync + 'static,
{
    fn create_socket(&self, family: AddressFamily) -> io::Result<Socket> {
        (self)(family)
    }
}
