//! The tagged message unit moved between actors.
//!
//! A [`Msg`] has exactly one live owner at any time: forwarding transfers
//! ownership, it never copies, and a transformed message is a fresh value
//! built from the old one's payload. Whoever consumes a message terminally
//! drops it.

use std::fmt;
use std::io;

use crate::actor::ActorRef;
use crate::io_object::IoObject;

/// The active variant of a message.
pub enum MsgKind {
    /// A session handed over for start negotiation, or a live session
    /// handed to the socket owner once negotiation succeeded.
    Session { session: Box<dyn IoObject> },

    /// Ask the reactor to drive `io_object` to readiness and acknowledge
    /// the outcome to `reply_to`.
    Start {
        io_object: Box<dyn IoObject>,
        reply_to: ActorRef,
    },

    /// Start negotiation succeeded; `io_object` is live and returned to
    /// the requester.
    StartAck { io_object: Box<dyn IoObject> },

    /// Start negotiation failed; `io_object` is returned for teardown.
    StartNak { io_object: Box<dyn IoObject> },

    /// An I/O handler reported an unrecoverable fault.
    Fault { error: io::Error },

    /// Orderly shutdown request for a loop-owning component.
    Stop,
}

/// One message in flight between actors.
pub struct Msg {
    /// Back-reference to the proxy whose send capability stamped this
    /// message, used to identify the issuing proxy on the reply path
    /// without a registry lookup.
    pub origin: Option<ActorRef>,
    pub kind: MsgKind,
}

impl Msg {
    #[must_use]
    pub fn session(session: Box<dyn IoObject>) -> Self {
        Self {
            origin: None,
            kind: MsgKind::Session { session },
        }
    }

    #[must_use]
    pub fn start(io_object: Box<dyn IoObject>, reply_to: ActorRef) -> Self {
        Self {
            origin: None,
            kind: MsgKind::Start {
                io_object,
                reply_to,
            },
        }
    }

    #[must_use]
    pub fn start_ack(io_object: Box<dyn IoObject>) -> Self {
        Self {
            origin: None,
            kind: MsgKind::StartAck { io_object },
        }
    }

    #[must_use]
    pub fn start_nak(io_object: Box<dyn IoObject>) -> Self {
        Self {
            origin: None,
            kind: MsgKind::StartNak { io_object },
        }
    }

    #[must_use]
    pub fn fault(error: io::Error) -> Self {
        Self {
            origin: None,
            kind: MsgKind::Fault { error },
        }
    }

    #[must_use]
    pub const fn stop() -> Self {
        Self {
            origin: None,
            kind: MsgKind::Stop,
        }
    }

    /// Name of the active variant, for diagnostics.
    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        match self.kind {
            MsgKind::Session { .. } => "session",
            MsgKind::Start { .. } => "start",
            MsgKind::StartAck { .. } => "start_ack",
            MsgKind::StartNak { .. } => "start_nak",
            MsgKind::Fault { .. } => "fault",
            MsgKind::Stop => "stop",
        }
    }
}

impl fmt::Debug for Msg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Msg")
            .field("kind", &self.kind_name())
            .field("stamped", &self.origin.is_some())
            .finish()
    }
}
