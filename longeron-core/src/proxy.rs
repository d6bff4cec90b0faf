//! Bridges session lifecycle messages into reactor start requests.

use std::sync::{Arc, Weak};

use tracing::{debug, trace};

use crate::actor::{Actor, ActorRef};
use crate::dispatcher::{Dispatcher, Mailbox};
use crate::msg::{Msg, MsgKind};

/// Stateless per-message transformer between the socket-side actor and the
/// reactor.
///
/// Holds only fixed capabilities; every session moves through it whole.
/// A `Session` arriving from the socket side becomes a `Start` request to
/// the reactor; the reactor's `StartAck` becomes a `Session` back to the
/// socket side; a `StartNak` releases the session. Anything else is a
/// no-op.
pub struct Proxy {
    socket: ActorRef,
    dispatcher: Dispatcher,
    reactor: ActorRef,
    self_ref: Weak<Proxy>,
}

impl Proxy {
    /// The proxy routes its own inbound traffic through `dispatcher`, so
    /// producers never run proxy code on their own thread.
    #[must_use]
    pub fn new(socket: ActorRef, dispatcher: Dispatcher, reactor: ActorRef) -> Arc<Self> {
        Arc::new_cyclic(|self_ref| Self {
            socket,
            dispatcher,
            reactor,
            self_ref: self_ref.clone(),
        })
    }

    fn capability(&self) -> Option<ActorRef> {
        self.self_ref.upgrade().map(|me| me as ActorRef)
    }
}

impl Actor for Proxy {
    /// Stamp the message with this proxy as origin and route it to our own
    /// mailbox. The stamp lets the reply path identify the issuing proxy
    /// without a registry lookup.
    fn send(&self, mut msg: Msg) {
        msg.origin = self.capability();
        if let Some(me) = self.self_ref.upgrade() {
            let dest: Arc<dyn Mailbox> = me;
            self.dispatcher.dispatch(&dest, msg);
        }
    }
}

impl Mailbox for Proxy {
    fn on_message(&self, msg: Msg) {
        let kind = msg.kind_name();
        match msg.kind {
            MsgKind::Session { session } => {
                let Some(reply_to) = self.capability() else {
                    return;
                };
                debug!("proxy: requesting session start");
                self.reactor.send(Msg::start(session, reply_to));
            }
            MsgKind::StartAck { io_object } => {
                debug!("proxy: session live, handing to socket owner");
                self.socket.send(Msg::session(io_object));
            }
            MsgKind::StartNak { io_object } => {
                debug!("proxy: session start failed, releasing");
                drop(io_object);
            }
            _ => trace!(kind, "proxy: ignoring message"),
        }
    }
}
