//! Longeron Core
//!
//! Runtime-agnostic transport kernel for the Longeron message-queue engine:
//! - Tagged message unit moved between actors (`msg`)
//! - Uniform send capability (`actor`)
//! - Message router with a forward-to-destination policy (`dispatcher`)
//! - Timer-driven reactor event loop (`reactor`)
//! - Non-blocking outbound TCP connector (`tcp_connector`)
//! - Session start-negotiation bridge (`proxy`)
//! - Multi-frame protocol data unit (`pdu`)
//! - Staging buffer between codec and socket (`iobuf`)
//!
//! The kernel knows nothing about wire protocols; framing lives in the
//! protocol crates layered on top of it.

#![cfg_attr(not(test), deny(unsafe_code))]
// Allow some pedantic lints that are intentional in this crate
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::match_same_arms)]

pub mod actor;
pub mod dispatcher;
pub mod error;
pub mod io_object;
pub mod iobuf;
pub mod msg;
pub mod options;
pub mod pdu;
pub mod proxy;
pub mod reactor;
pub mod tcp_connector;

// Optional: a small prelude to make downstream crates ergonomic.
// Keep it minimal to avoid API lock-in.
pub mod prelude {
    pub use crate::actor::{Actor, ActorRef};
    pub use crate::dispatcher::{Dispatcher, Mailbox};
    pub use crate::error::{LongeronError, Result};
    pub use crate::io_object::{IoObject, IoPoll};
    pub use crate::iobuf::IoBuf;
    pub use crate::msg::{Msg, MsgKind};
    pub use crate::options::TransportOptions;
    pub use crate::pdu::Pdu;
    pub use crate::proxy::Proxy;
    pub use crate::reactor::Reactor;
    pub use crate::tcp_connector::TcpConnector;
}
