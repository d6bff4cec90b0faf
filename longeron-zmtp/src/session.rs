//! Outbound ZMTP v2 session.
//!
//! One session is one outbound connection: first a pending attempt the
//! reactor drives to readiness, then a live stream transmitting protocol
//! data units as v2 wire bytes. Ownership moves whole between components
//! during start negotiation; on a failed start the proxy drops the
//! session, which releases the socket.

use std::any::Any;
use std::io::{self, Write};
use std::mem;
use std::net::TcpStream;

use tracing::{debug, warn};

use longeron_core::actor::ActorRef;
use longeron_core::io_object::{IoObject, IoPoll};
use longeron_core::iobuf::IoBuf;
use longeron_core::options::TransportOptions;
use longeron_core::pdu::Pdu;
use longeron_core::tcp_connector::TcpConnector;

use crate::codec::{Result, ZmtpError};
use crate::encoder::FrameEncoder;
use crate::greeting::{Greeting, SocketType, GREETING_SIZE};

enum State {
    Connecting {
        connector: TcpConnector,
    },
    Active {
        stream: TcpStream,
        encoder: FrameEncoder,
        txbuf: IoBuf,
        /// Staged greeting bytes still in `txbuf`; these precede any
        /// encoder output and are not covered by `advance`.
        greeting_left: usize,
    },
    Failed,
}

/// One outbound connection, from pending attempt to live v2 stream.
pub struct Session {
    state: State,
    socket_type: SocketType,
    options: TransportOptions,
}

impl Session {
    /// Begin a non-blocking connect to `127.0.0.1:port`.
    ///
    /// The returned session is handed to the proxy as a `Session` message;
    /// the reactor then polls it to completion. `owner` is the mailbox the
    /// underlying connector notifies on reactor-reported faults.
    pub fn connect(
        port: u16,
        socket_type: SocketType,
        owner: ActorRef,
        options: TransportOptions,
    ) -> Result<Self> {
        let mut connector = TcpConnector::new(owner, &options);
        connector.connect(port)?;
        Ok(Self {
            state: State::Connecting { connector },
            socket_type,
            options,
        })
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        matches!(self.state, State::Active { .. })
    }

    /// Bind the next unit for transmission.
    ///
    /// # Errors
    ///
    /// `NotActive` before the connection is up; encoder errors pass
    /// through (`EncoderBusy` until the previous unit drains).
    pub fn submit(&mut self, pdu: Pdu) -> Result<()> {
        match &mut self.state {
            State::Active { encoder, .. } => encoder.putmsg(pdu),
            _ => Err(ZmtpError::NotActive),
        }
    }

    /// Push staged wire bytes to the socket until it would block or
    /// nothing is left.
    ///
    /// Returns `Ok(true)` once greeting and bound unit are fully on the
    /// wire, `Ok(false)` when the socket stopped accepting bytes first.
    pub fn flush(&mut self) -> Result<bool> {
        let State::Active {
            stream,
            encoder,
            txbuf,
            greeting_left,
        } = &mut self.state
        else {
            return Err(ZmtpError::NotActive);
        };

        loop {
            if encoder.has_output() && txbuf.free() > 0 {
                encoder.read(txbuf)?;
            }
            if txbuf.is_empty() {
                break;
            }
            match stream.write(txbuf.readable()) {
                Ok(0) => return Err(ZmtpError::Io(io::ErrorKind::WriteZero.into())),
                Ok(n) => {
                    // Greeting bytes sit at the front of the buffer and are
                    // outside the encoder's ledger.
                    let from_greeting = n.min(*greeting_left);
                    *greeting_left -= from_greeting;
                    txbuf.consumed(n);
                    encoder.advance(n - from_greeting)?;
                }
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => return Ok(false),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(!encoder.has_output())
    }

    fn activate(
        mut connector: TcpConnector,
        socket_type: SocketType,
        options: &TransportOptions,
    ) -> io::Result<State> {
        let Some(socket) = connector.take_socket() else {
            return Err(io::ErrorKind::NotConnected.into());
        };
        let stream: TcpStream = socket.into();
        if options.tcp_nodelay {
            if let Err(err) = stream.set_nodelay(true) {
                warn!(%err, "session: could not disable nagle");
            }
        }

        let mut txbuf = IoBuf::with_capacity(options.io_buffer_size.max(GREETING_SIZE));
        let greeting = Greeting { socket_type }.encode();
        txbuf.writable()[..GREETING_SIZE].copy_from_slice(&greeting);
        txbuf.produced(GREETING_SIZE);

        debug!(socket_type = socket_type.as_str(), "session: active");
        Ok(State::Active {
            stream,
            encoder: FrameEncoder::new(),
            txbuf,
            greeting_left: GREETING_SIZE,
        })
    }
}

impl IoObject for Session {
    fn event(&mut self) -> IoPoll {
        match mem::replace(&mut self.state, State::Failed) {
            State::Connecting { mut connector } => match connector.event() {
                IoPoll::Done(Ok(())) => {
                    match Self::activate(connector, self.socket_type, &self.options) {
                        Ok(active) => {
                            self.state = active;
                            IoPoll::Done(Ok(()))
                        }
                        Err(e) => IoPoll::Done(Err(e)),
                    }
                }
                IoPoll::Done(Err(e)) => IoPoll::Done(Err(e)),
                pending => {
                    self.state = State::Connecting { connector };
                    pending
                }
            },
            active @ State::Active { .. } => {
                self.state = active;
                IoPoll::Done(Ok(()))
            }
            State::Failed => IoPoll::Done(Err(io::ErrorKind::NotConnected.into())),
        }
    }

    fn error(&mut self) {
        match &mut self.state {
            State::Connecting { connector } => connector.error(),
            _ => tracing::error!("session: i/o error"),
        }
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any + Send> {
        self
    }
}
