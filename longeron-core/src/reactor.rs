//! The event loop turning I/O readiness into protocol messages.
//!
//! The reactor owns a single-threaded cooperative loop. Components hand it
//! `Start` requests through its send capability; it polls each registered
//! I/O object, reschedules pending ones after the interval they hint, and
//! acknowledges terminal outcomes back to the capability supplied at start
//! time. Nothing in the loop blocks on I/O: completion is discovered by
//! polling, never by waiting.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;

use tracing::{debug, error, trace, warn};

use crate::actor::{Actor, ActorRef};
use crate::io_object::IoPoll;
use crate::msg::{Msg, MsgKind};

/// One registered handler.
///
/// Per-handler state machine: `REGISTERED -> (poll) -> PENDING
/// (reschedule) | DONE-OK (ack) | DONE-ERR (nak)`. A terminal poll
/// consumes the registration, so every start is acknowledged exactly once.
struct Registration {
    io_object: Box<dyn crate::io_object::IoObject>,
    reply_to: ActorRef,
    deadline: Instant,
}

/// Send capability of a running reactor.
///
/// Messages enqueue onto the loop's private command channel; once the loop
/// has exited they are dropped.
struct ReactorHandle {
    tx: flume::Sender<Msg>,
}

impl Actor for ReactorHandle {
    fn send(&self, msg: Msg) {
        if self.tx.send(msg).is_err() {
            trace!("reactor loop gone, message dropped");
        }
    }
}

/// The event loop itself. Create with [`Reactor::new`] and drive it with
/// [`Reactor::run`] on a dedicated thread, or use [`Reactor::spawn`].
pub struct Reactor {
    rx: flume::Receiver<Msg>,
    registrations: Vec<Registration>,
}

impl Reactor {
    /// Create a reactor and the capability that feeds it.
    #[must_use]
    pub fn new() -> (ActorRef, Self) {
        let (tx, rx) = flume::unbounded();
        let handle: ActorRef = Arc::new(ReactorHandle { tx });
        (
            handle,
            Self {
                rx,
                registrations: Vec::new(),
            },
        )
    }

    /// Spawn the loop on its own thread.
    #[must_use]
    pub fn spawn() -> (ActorRef, JoinHandle<()>) {
        let (handle, reactor) = Self::new();
        let join = thread::spawn(move || reactor.run());
        (handle, join)
    }

    /// Run the loop until a `Stop` arrives, or until every command sender
    /// is gone and no registration remains. On exit, outstanding
    /// registrations are NAK'd so their sessions are released.
    pub fn run(mut self) {
        loop {
            match self.next_deadline() {
                Some(deadline) => {
                    match self.rx.recv_deadline(deadline) {
                        Ok(msg) => {
                            if !self.handle(msg) {
                                break;
                            }
                        }
                        Err(flume::RecvTimeoutError::Timeout) => {}
                        Err(flume::RecvTimeoutError::Disconnected) => {
                            // No further commands can arrive; keep driving
                            // the outstanding registrations to completion.
                            let now = Instant::now();
                            if deadline > now {
                                thread::sleep(deadline - now);
                            }
                        }
                    }
                    self.poll_due();
                }
                None => match self.rx.recv() {
                    Ok(msg) => {
                        if !self.handle(msg) {
                            break;
                        }
                        self.poll_due();
                    }
                    Err(_) => break,
                },
            }
        }
        self.drain();
    }

    /// Returns false when the loop should exit.
    fn handle(&mut self, msg: Msg) -> bool {
        let kind = msg.kind_name();
        match msg.kind {
            MsgKind::Start {
                io_object,
                reply_to,
            } => {
                debug!("reactor: registering i/o handler");
                self.registrations.push(Registration {
                    io_object,
                    reply_to,
                    deadline: Instant::now(),
                });
                true
            }
            MsgKind::Stop => {
                debug!("reactor: stop requested");
                false
            }
            _ => {
                warn!(kind, "reactor: unsupported message, dropped");
                true
            }
        }
    }

    fn next_deadline(&self) -> Option<Instant> {
        self.registrations.iter().map(|r| r.deadline).min()
    }

    fn poll_due(&mut self) {
        let now = Instant::now();
        let mut i = 0;
        while i < self.registrations.len() {
            if self.registrations[i].deadline > now {
                i += 1;
                continue;
            }
            match self.registrations[i].io_object.event() {
                IoPoll::Pending { retry_after } => {
                    self.registrations[i].deadline = now + retry_after;
                    i += 1;
                }
                IoPoll::Done(Ok(())) => {
                    let reg = self.registrations.swap_remove(i);
                    debug!("reactor: start complete");
                    reg.reply_to.send(Msg::start_ack(reg.io_object));
                }
                IoPoll::Done(Err(err)) => {
                    let mut reg = self.registrations.swap_remove(i);
                    error!(%err, "reactor: i/o handler failed");
                    reg.io_object.error();
                    reg.reply_to.send(Msg::start_nak(reg.io_object));
                }
            }
        }
    }

    fn drain(&mut self) {
        for reg in self.registrations.drain(..) {
            reg.reply_to.send(Msg::start_nak(reg.io_object));
        }
    }
}
