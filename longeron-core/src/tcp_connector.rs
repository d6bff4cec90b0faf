//! Outbound non-blocking TCP connection attempts.

use std::any::Any;
use std::io;
use std::net::{Ipv4Addr, SocketAddrV4};
use std::time::Duration;

use socket2::{Domain, Protocol, SockAddr, Socket, Type};
use tracing::{debug, error};

use crate::actor::ActorRef;
use crate::error::{LongeronError, Result};
use crate::io_object::{IoObject, IoPoll};
use crate::msg::Msg;
use crate::options::TransportOptions;

/// Drives a single outbound non-blocking connection attempt to a loopback
/// port.
///
/// One attempt per instance: [`connect`] on an instance that already holds
/// a socket fails without disturbing the attempt in flight. A connector
/// closes its socket if and only if it never produced a usable connection;
/// an established socket is moved out through [`take_socket`] and is no
/// longer this component's to close.
///
/// [`connect`]: TcpConnector::connect
/// [`take_socket`]: TcpConnector::take_socket
pub struct TcpConnector {
    socket: Option<Socket>,
    err: Option<io::ErrorKind>,
    owner: ActorRef,
    retry_ivl: Duration,
}

impl TcpConnector {
    /// `owner` is the mailbox notified when the reactor reports a fault on
    /// this connector.
    #[must_use]
    pub fn new(owner: ActorRef, options: &TransportOptions) -> Self {
        Self {
            socket: None,
            err: None,
            owner,
            retry_ivl: options.connect_retry_ivl,
        }
    }

    /// Initiate a connection attempt to `127.0.0.1:port`.
    ///
    /// Numeric loopback only; no name resolution. Socket creation and
    /// immediate refusals are synchronous failures; an in-progress outcome
    /// leaves the attempt to reactor polling.
    pub fn connect(&mut self, port: u16) -> Result<()> {
        if self.socket.is_some() {
            return Err(LongeronError::ConnectInProgress);
        }

        let socket = Socket::new(Domain::IPV4, Type::STREAM, Some(Protocol::TCP))?;
        socket.set_nonblocking(true)?;

        let addr = SockAddr::from(SocketAddrV4::new(Ipv4Addr::LOCALHOST, port));
        match socket.connect(&addr) {
            Ok(()) => {
                debug!(port, "tcp connector: connected immediately");
                self.socket = Some(socket);
                Ok(())
            }
            Err(e) if connect_in_progress(&e) => {
                debug!(port, "tcp connector: attempt in flight");
                self.socket = Some(socket);
                Ok(())
            }
            Err(e) => {
                self.err = Some(e.kind());
                Err(e.into())
            }
        }
    }

    /// Error recorded by a failed attempt, if any.
    #[must_use]
    pub const fn last_error(&self) -> Option<io::ErrorKind> {
        self.err
    }

    /// Move the established socket out to its next owner.
    ///
    /// After this, teardown of the connector no longer touches the
    /// connection.
    pub fn take_socket(&mut self) -> Option<Socket> {
        self.socket.take()
    }
}

impl IoObject for TcpConnector {
    /// Read the socket's pending error status.
    ///
    /// `SO_ERROR` is clear both on success and while the attempt is still
    /// in flight, and this loop polls on a timer rather than on
    /// writability, so a cleared status alone does not prove completion;
    /// an established peer address tells the two apart.
    fn event(&mut self) -> IoPoll {
        let Some(socket) = self.socket.as_ref() else {
            return IoPoll::Done(Err(io::ErrorKind::NotConnected.into()));
        };

        match socket.take_error() {
            Ok(Some(e)) if connect_in_progress(&e) => IoPoll::Pending {
                retry_after: self.retry_ivl,
            },
            Ok(Some(e)) => {
                self.err = Some(e.kind());
                IoPoll::Done(Err(e))
            }
            Ok(None) => match socket.peer_addr() {
                Ok(_) => IoPoll::Done(Ok(())),
                Err(e) if still_connecting(&e) => IoPoll::Pending {
                    retry_after: self.retry_ivl,
                },
                Err(e) => {
                    self.err = Some(e.kind());
                    IoPoll::Done(Err(e))
                }
            },
            Err(e) => {
                self.err = Some(e.kind());
                IoPoll::Done(Err(e))
            }
        }
    }

    /// Diagnostic only; the socket stays open until teardown.
    fn error(&mut self) {
        error!("tcp connector: i/o error");
        let kind = self.err.unwrap_or(io::ErrorKind::Other);
        self.owner.send(Msg::fault(kind.into()));
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any + Send> {
        self
    }
}

/// A non-blocking connect that has not resolved yet.
fn connect_in_progress(e: &io::Error) -> bool {
    #[cfg(unix)]
    if e.raw_os_error() == Some(libc::EINPROGRESS) {
        return true;
    }
    e.kind() == io::ErrorKind::WouldBlock
}

/// Peer-address probe outcomes that mean the attempt is still in flight.
fn still_connecting(e: &io::Error) -> bool {
    e.kind() == io::ErrorKind::NotConnected || connect_in_progress(e)
}
