//! Uniform send capability.
//!
//! Every addressable component exposes itself through [`Actor`]: a single
//! `send` operation that enqueues a message for asynchronous delivery and
//! returns immediately. A capability is a coordinate, not owned data; it is
//! cheaply cloneable and peers never touch the component's state directly.

use std::sync::Arc;

use crate::msg::Msg;

/// The send capability implemented by every addressable component.
///
/// Delivery is asynchronous and unacknowledged: messages routed to a
/// destination that has been torn down are dropped, with no retry and no
/// resurrection. There is no back-pressure at this layer; flow control is
/// the caller's responsibility.
pub trait Actor: Send + Sync {
    /// Enqueue `msg` for asynchronous delivery to this component.
    fn send(&self, msg: Msg);
}

/// A cloneable coordinate naming an [`Actor`].
///
/// The referenced component must outlive every use of the capability.
pub type ActorRef = Arc<dyn Actor>;
