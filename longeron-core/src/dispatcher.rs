//! Message router between actors.
//!
//! The dispatcher has a single fixed routing policy: forward each queued
//! message to its destination. The queue decouples producer and consumer
//! timing. Delivery order equals enqueue order per producer; there is no
//! ordering guarantee across producers and no back-pressure signal.

use std::sync::{Arc, Weak};
use std::thread;

use tracing::trace;

use crate::msg::Msg;

/// Delivery end of an actor: the pump invokes this once a routed message
/// reaches the front of the queue. Components implement [`Mailbox`] next
/// to their send capability; the two entry points are deliberately
/// distinct so delivery never re-enters the routing queue.
pub trait Mailbox: Send + Sync {
    fn on_message(&self, msg: Msg);
}

struct Envelope {
    dest: Weak<dyn Mailbox>,
    msg: Msg,
}

/// Handle to the routing queue.
///
/// Cloneable; the pump thread exits once every handle is gone and the
/// queue has drained.
#[derive(Clone)]
pub struct Dispatcher {
    tx: flume::Sender<Envelope>,
}

impl Dispatcher {
    /// Start the pump thread and return a handle to it.
    #[must_use]
    pub fn start() -> Self {
        let (tx, rx) = flume::unbounded::<Envelope>();
        thread::spawn(move || Self::pump(&rx));
        Self { tx }
    }

    /// Route `msg` to `dest` and return immediately.
    ///
    /// If the destination has been torn down by the time the message
    /// reaches the front of the queue, delivery is silently dropped;
    /// callers must not assume acknowledgment.
    pub fn dispatch(&self, dest: &Arc<dyn Mailbox>, msg: Msg) {
        let envelope = Envelope {
            dest: Arc::downgrade(dest),
            msg,
        };
        if self.tx.send(envelope).is_err() {
            trace!("dispatcher pump gone, message dropped");
        }
    }

    fn pump(rx: &flume::Receiver<Envelope>) {
        while let Ok(Envelope { dest, msg }) = rx.recv() {
            match dest.upgrade() {
                Some(dest) => dest.on_message(msg),
                None => trace!(kind = msg.kind_name(), "destination gone, message dropped"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::msg::MsgKind;
    use std::io;
    use std::time::Duration;

    /// Records the payload string of every `Fault` it receives.
    struct Probe {
        tx: flume::Sender<String>,
    }

    impl Mailbox for Probe {
        fn on_message(&self, msg: Msg) {
            if let MsgKind::Fault { error } = msg.kind {
                self.tx.send(error.to_string()).unwrap();
            }
        }
    }

    /// Blocks the pump until released, to make teardown races deterministic.
    struct Gate {
        release: flume::Receiver<()>,
    }

    impl Mailbox for Gate {
        fn on_message(&self, _msg: Msg) {
            let _ = self.release.recv_timeout(Duration::from_secs(5));
        }
    }

    fn fault(text: &str) -> Msg {
        Msg::fault(io::Error::new(io::ErrorKind::Other, text.to_string()))
    }

    #[test]
    fn delivers_in_enqueue_order_per_producer() {
        let dispatcher = Dispatcher::start();
        let (tx, rx) = flume::unbounded();
        let probe: Arc<dyn Mailbox> = Arc::new(Probe { tx });

        for i in 0..8 {
            dispatcher.dispatch(&probe, fault(&format!("m-{i}")));
        }
        for i in 0..8 {
            let got = rx.recv_timeout(Duration::from_secs(1)).unwrap();
            assert_eq!(got, format!("m-{i}"));
        }
    }

    #[test]
    fn interleaved_producers_each_keep_their_order() {
        let dispatcher = Dispatcher::start();
        let (tx, rx) = flume::unbounded();
        let probe: Arc<dyn Mailbox> = Arc::new(Probe { tx });

        let spawn_producer = |name: &'static str| {
            let dispatcher = dispatcher.clone();
            let probe = Arc::clone(&probe);
            thread::spawn(move || {
                for i in 0..16 {
                    dispatcher.dispatch(&probe, fault(&format!("{name}-{i}")));
                }
            })
        };
        let a = spawn_producer("a");
        let b = spawn_producer("b");
        a.join().unwrap();
        b.join().unwrap();

        let mut seen_a = Vec::new();
        let mut seen_b = Vec::new();
        for _ in 0..32 {
            let got = rx.recv_timeout(Duration::from_secs(1)).unwrap();
            if got.starts_with("a-") {
                seen_a.push(got);
            } else {
                seen_b.push(got);
            }
        }
        let expect = |name: &str| (0..16).map(|i| format!("{name}-{i}")).collect::<Vec<_>>();
        assert_eq!(seen_a, expect("a"));
        assert_eq!(seen_b, expect("b"));
    }

    #[test]
    fn drops_delivery_when_destination_torn_down() {
        let dispatcher = Dispatcher::start();

        let (release_tx, release_rx) = flume::unbounded();
        let gate: Arc<dyn Mailbox> = Arc::new(Gate {
            release: release_rx,
        });
        // Park the pump on the gate so the probe can be dropped while its
        // message is still queued.
        dispatcher.dispatch(&gate, Msg::stop());

        let (tx, rx) = flume::unbounded();
        let probe: Arc<dyn Mailbox> = Arc::new(Probe { tx });
        dispatcher.dispatch(&probe, fault("late"));
        drop(probe);
        release_tx.send(()).unwrap();

        assert!(rx.recv_timeout(Duration::from_millis(300)).is_err());
    }
}
