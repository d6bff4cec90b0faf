//! # Longeron ZMTP
//!
//! ZMTP v2 wire protocol layer for the Longeron transport kernel.
//!
//! ## Overview
//!
//! This crate turns the kernel's protocol data units into ZMTP v2 wire
//! bytes and back:
//! - **Frame encoder**: resumable, partial-write-tolerant serialization
//! - **Frame decoder**: incremental parsing across arbitrary fragmentation
//! - **Greeting**: the v2 connection preamble
//! - **Session**: one outbound connection, from pending attempt to live
//!   stream
//!
//! ## Quick Start
//!
//! ```no_run
//! use longeron_core::pdu::Pdu;
//! use longeron_core::iobuf::IoBuf;
//! use longeron_zmtp::encoder::FrameEncoder;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut encoder = FrameEncoder::new();
//! encoder.putmsg(Pdu::new().push_str("topic").push_str("payload"))?;
//!
//! let mut buf = IoBuf::with_capacity(4096);
//! while encoder.has_output() {
//!     let status = encoder.read(&mut buf)?;
//!     // hand buf.readable() to the transport, then:
//!     buf.consumed(status.bytes);
//!     encoder.advance(status.bytes)?;
//! }
//! # Ok(())
//! # }
//! ```

// Allow some pedantic lints
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::match_same_arms)]

pub mod codec;
pub mod encoder;
pub mod greeting;
pub mod session;

// Re-export commonly used types
pub use codec::{ZmtpDecoder, ZmtpError, ZmtpFrame};
pub use encoder::{FrameEncoder, ReadStatus};
pub use greeting::{Greeting, SocketType};
pub use session::Session;

/// Prelude module for convenient imports
///
/// ```rust
/// use longeron_zmtp::prelude::*;
/// ```
pub mod prelude {
    pub use super::codec::{ZmtpDecoder, ZmtpError, ZmtpFrame};
    pub use super::encoder::{FrameEncoder, ReadStatus};
    pub use super::greeting::{Greeting, SocketType};
    pub use super::session::Session;
    pub use bytes::Bytes;
}
