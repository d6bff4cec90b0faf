//! ZMTP v2 connection preamble.
//!
//! A v2 peer opens with a fixed-size greeting: the 10-byte signature,
//! the protocol revision, its socket type, and an identity frame. This
//! implementation always announces an anonymous (zero-length) identity
//! and only accepts anonymous peers.

use crate::codec::{Result, ZmtpError};

/// Wire size of a v2 greeting with an anonymous identity.
pub const GREETING_SIZE: usize = 14;

/// Protocol revision byte for ZMTP 2.0.
pub const REVISION: u8 = 0x01;

const SIGNATURE_HEAD: u8 = 0xFF;
const SIGNATURE_TAIL: u8 = 0x7F;

/// Socket types a v2 peer can announce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SocketType {
    Pair,
    Pub,
    Sub,
    Req,
    Rep,
    Dealer,
    Router,
    Pull,
    Push,
}

impl SocketType {
    #[must_use]
    pub const fn code(&self) -> u8 {
        match self {
            Self::Pair => 0x00,
            Self::Pub => 0x01,
            Self::Sub => 0x02,
            Self::Req => 0x03,
            Self::Rep => 0x04,
            Self::Dealer => 0x05,
            Self::Router => 0x06,
            Self::Pull => 0x07,
            Self::Push => 0x08,
        }
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pair => "PAIR",
            Self::Pub => "PUB",
            Self::Sub => "SUB",
            Self::Req => "REQ",
            Self::Rep => "REP",
            Self::Dealer => "DEALER",
            Self::Router => "ROUTER",
            Self::Pull => "PULL",
            Self::Push => "PUSH",
        }
    }

    fn from_code(code: u8) -> Result<Self> {
        Ok(match code {
            0x00 => Self::Pair,
            0x01 => Self::Pub,
            0x02 => Self::Sub,
            0x03 => Self::Req,
            0x04 => Self::Rep,
            0x05 => Self::Dealer,
            0x06 => Self::Router,
            0x07 => Self::Pull,
            0x08 => Self::Push,
            _ => return Err(ZmtpError::Protocol),
        })
    }
}

/// One peer's greeting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Greeting {
    pub socket_type: SocketType,
}

impl Greeting {
    /// Encode the greeting.
    ///
    /// Layout:
    /// ```text
    /// [0]      0xFF
    /// [1..9]   Padding
    /// [9]      0x7F
    /// [10]     Revision (0x01)
    /// [11]     Socket type
    /// [12..14] Anonymous identity frame (final-short, zero length)
    /// ```
    #[must_use]
    pub fn encode(&self) -> [u8; GREETING_SIZE] {
        let mut b = [0u8; GREETING_SIZE];
        b[0] = SIGNATURE_HEAD;
        b[9] = SIGNATURE_TAIL;
        b[10] = REVISION;
        b[11] = self.socket_type.code();
        // b[12..14] stay zero: identity frame with final flags and no body
        b
    }

    /// Parse a peer's greeting.
    ///
    /// # Errors
    ///
    /// `Incomplete` when fewer than [`GREETING_SIZE`] bytes are available;
    /// `Protocol` on a bad signature, a revision other than v2, an unknown
    /// socket type, or a non-anonymous identity.
    pub fn parse(src: &[u8]) -> Result<Self> {
        if src.len() < GREETING_SIZE {
            return Err(ZmtpError::Incomplete);
        }
        if src[0] != SIGNATURE_HEAD || src[9] != SIGNATURE_TAIL {
            return Err(ZmtpError::Protocol);
        }
        if src[10] != REVISION {
            return Err(ZmtpError::Protocol);
        }
        let socket_type = SocketType::from_code(src[11])?;
        if src[12] != 0x00 || src[13] != 0x00 {
            return Err(ZmtpError::Protocol);
        }
        Ok(Self { socket_type })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_the_fixed_layout() {
        let g = Greeting {
            socket_type: SocketType::Push,
        };
        let wire = g.encode();
        assert_eq!(wire[0], 0xFF);
        assert_eq!(wire[9], 0x7F);
        assert_eq!(wire[10], 0x01);
        assert_eq!(wire[11], 0x08);
        assert_eq!(&wire[12..14], &[0x00, 0x00]);
    }

    #[test]
    fn parse_round_trips_every_socket_type() {
        for ty in [
            SocketType::Pair,
            SocketType::Pub,
            SocketType::Sub,
            SocketType::Req,
            SocketType::Rep,
            SocketType::Dealer,
            SocketType::Router,
            SocketType::Pull,
            SocketType::Push,
        ] {
            let parsed = Greeting::parse(&Greeting { socket_type: ty }.encode()).unwrap();
            assert_eq!(parsed.socket_type, ty);
        }
    }

    #[test]
    fn rejects_bad_signature_and_wrong_revision() {
        let mut wire = Greeting {
            socket_type: SocketType::Pair,
        }
        .encode();
        wire[0] = 0x00;
        assert!(matches!(Greeting::parse(&wire), Err(ZmtpError::Protocol)));

        let mut wire = Greeting {
            socket_type: SocketType::Pair,
        }
        .encode();
        wire[10] = 0x03;
        assert!(matches!(Greeting::parse(&wire), Err(ZmtpError::Protocol)));
    }

    #[test]
    fn short_input_is_incomplete() {
        assert!(matches!(
            Greeting::parse(&[0xFF, 0x00]),
            Err(ZmtpError::Incomplete)
        ));
    }
}
