//! Resumable ZMTP v2 frame encoder.
//!
//! Serializes a [`Pdu`] into wire bytes incrementally. The encoder
//! survives partial consumption by the transport: output already produced
//! is never re-derived, and after a short socket write the caller only
//! reports the count actually taken through [`advance`].
//!
//! Wire format per frame: one flags byte (bit 0 = more frames follow,
//! bit 1 = long length), then a 1-byte length for payloads up to 255 bytes
//! or an 8-byte big-endian length above that, then the payload. The codec
//! always picks the minimal length encoding; every frame but the last
//! carries the more bit.
//!
//! [`advance`]: FrameEncoder::advance

use std::collections::VecDeque;

use bytes::Bytes;

use longeron_core::iobuf::IoBuf;
use longeron_core::pdu::Pdu;

use crate::codec::{Result, ZmtpError, FLAG_LONG, FLAG_MORE, SHORT_MAX};

/// Outcome of one [`FrameEncoder::read`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadStatus {
    /// Bytes produced into the buffer by this call.
    pub bytes: usize,
    /// More wire bytes remain for the bound message.
    pub ready: bool,
}

/// Progress through the current frame.
enum Step {
    Header {
        header: [u8; 9],
        len: usize,
        pos: usize,
    },
    Payload {
        pos: usize,
    },
}

/// Incremental encoder for one message at a time.
///
/// Not re-entrant: a bound message must be fully drained — every frame
/// produced and every produced byte advanced — before the next one is
/// accepted.
pub struct FrameEncoder {
    frames: VecDeque<Bytes>,
    step: Step,
    outstanding: usize,
}

impl Default for FrameEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameEncoder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            frames: VecDeque::new(),
            step: Step::Payload { pos: 0 },
            outstanding: 0,
        }
    }

    /// Bind a new message for encoding.
    ///
    /// # Errors
    ///
    /// `EncoderBusy` while the previous message is not fully drained;
    /// `EmptyMessage` for a unit with no frames.
    pub fn putmsg(&mut self, pdu: Pdu) -> Result<()> {
        if !self.frames.is_empty() || self.outstanding != 0 {
            return Err(ZmtpError::EncoderBusy);
        }
        if pdu.is_empty() {
            return Err(ZmtpError::EmptyMessage);
        }
        self.frames = pdu.into_frames().into_iter().collect();
        self.step = header_step(&self.frames[0], self.frames.len() > 1);
        Ok(())
    }

    /// More wire bytes remain for the bound message.
    #[must_use]
    pub fn has_output(&self) -> bool {
        !self.frames.is_empty()
    }

    /// Bytes produced and not yet retired by [`advance`].
    ///
    /// [`advance`]: FrameEncoder::advance
    #[must_use]
    pub const fn outstanding(&self) -> usize {
        self.outstanding
    }

    /// Produce the next chunk of wire bytes into `buf`.
    ///
    /// Fills the buffer's writable space and moves the internal cursor
    /// past the produced bytes; repeated calls yield successive output
    /// without re-deriving anything.
    ///
    /// # Errors
    ///
    /// `NoMessage` when nothing is bound.
    pub fn read(&mut self, buf: &mut IoBuf) -> Result<ReadStatus> {
        if self.frames.is_empty() {
            return Err(ZmtpError::NoMessage);
        }

        let mut produced = 0;
        while !self.frames.is_empty() {
            let space = buf.free();
            if space == 0 {
                break;
            }
            match &mut self.step {
                Step::Header { header, len, pos } => {
                    let n = space.min(*len - *pos);
                    buf.writable()[..n].copy_from_slice(&header[*pos..*pos + n]);
                    buf.produced(n);
                    *pos += n;
                    produced += n;
                    if *pos == *len {
                        self.step = Step::Payload { pos: 0 };
                    }
                }
                Step::Payload { pos } => {
                    let payload_len = self.frames[0].len();
                    let n = space.min(payload_len - *pos);
                    let start = *pos;
                    buf.writable()[..n].copy_from_slice(&self.frames[0][start..start + n]);
                    buf.produced(n);
                    *pos += n;
                    produced += n;
                    if *pos == payload_len {
                        self.frames.pop_front();
                        if !self.frames.is_empty() {
                            self.step = header_step(&self.frames[0], self.frames.len() > 1);
                        }
                    }
                }
            }
        }

        self.outstanding += produced;
        Ok(ReadStatus {
            bytes: produced,
            ready: !self.frames.is_empty(),
        })
    }

    /// Retire `n` produced bytes that the transport has consumed.
    ///
    /// # Errors
    ///
    /// `AdvanceOutOfRange` when `n` exceeds the bytes produced and not yet
    /// advanced; the encoder state is untouched in that case.
    pub fn advance(&mut self, n: usize) -> Result<()> {
        if n > self.outstanding {
            return Err(ZmtpError::AdvanceOutOfRange {
                n,
                outstanding: self.outstanding,
            });
        }
        self.outstanding -= n;
        Ok(())
    }
}

fn header_step(payload: &Bytes, more: bool) -> Step {
    let mut header = [0u8; 9];
    let mut flags = 0;
    if more {
        flags |= FLAG_MORE;
    }
    let len = if payload.len() > SHORT_MAX {
        flags |= FLAG_LONG;
        header[1..9].copy_from_slice(&(payload.len() as u64).to_be_bytes());
        9
    } else {
        header[1] = payload.len() as u8;
        2
    };
    header[0] = flags;
    Step::Header { header, len, pos: 0 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::ZmtpFrame;

    /// Drain a full message through read/advance cycles at a fixed buffer
    /// capacity, concatenating everything produced.
    fn encode_chunked(pdu: Pdu, capacity: usize) -> Vec<u8> {
        let mut encoder = FrameEncoder::new();
        encoder.putmsg(pdu).unwrap();
        let mut buf = IoBuf::with_capacity(capacity);
        let mut out = Vec::new();
        loop {
            let status = encoder.read(&mut buf).unwrap();
            out.extend_from_slice(buf.readable());
            buf.consumed(buf.len());
            encoder.advance(status.bytes).unwrap();
            if !status.ready {
                break;
            }
        }
        assert!(!encoder.has_output());
        assert_eq!(encoder.outstanding(), 0);
        out
    }

    fn one_shot(pdu: &Pdu) -> Vec<u8> {
        let mut out = Vec::new();
        let last = pdu.len() - 1;
        for (i, frame) in pdu.frames().iter().enumerate() {
            out.extend_from_slice(&ZmtpFrame::data(frame.clone(), i < last).encode());
        }
        out
    }

    fn sample_pdu() -> Pdu {
        Pdu::new()
            .push_str("topic")
            .push(vec![0xAB; 300])
            .push_empty()
            .push_str("tail")
    }

    #[test]
    fn any_chunking_matches_the_one_shot_encoding() {
        let expected = one_shot(&sample_pdu());
        for capacity in [1, 2, 3, 7, 16, 64, 4096] {
            assert_eq!(
                encode_chunked(sample_pdu(), capacity),
                expected,
                "capacity {capacity}"
            );
        }
    }

    #[test]
    fn long_form_starts_past_the_short_boundary() {
        let short = encode_chunked(Pdu::new().push(vec![1u8; 255]), 4096);
        assert_eq!(short[0] & FLAG_LONG, 0);
        assert_eq!(short[1], 255);
        assert_eq!(short.len(), 2 + 255);

        let long = encode_chunked(Pdu::new().push(vec![1u8; 256]), 4096);
        assert_ne!(long[0] & FLAG_LONG, 0);
        assert_eq!(&long[1..9], &256u64.to_be_bytes());
        assert_eq!(long.len(), 9 + 256);
    }

    #[test]
    fn more_bit_set_on_every_frame_but_the_last() {
        let wire = encode_chunked(Pdu::new().push_str("a").push_str("b").push_str("c"), 4096);
        // a: [MORE, 1, 'a'], b: [MORE, 1, 'b'], c: [0, 1, 'c']
        assert_eq!(wire[0] & FLAG_MORE, FLAG_MORE);
        assert_eq!(wire[3] & FLAG_MORE, FLAG_MORE);
        assert_eq!(wire[6] & FLAG_MORE, 0);
    }

    #[test]
    fn putmsg_is_rejected_until_the_previous_message_drains() {
        let mut encoder = FrameEncoder::new();
        encoder.putmsg(Pdu::new().push_str("first")).unwrap();
        assert!(matches!(
            encoder.putmsg(Pdu::new().push_str("second")),
            Err(ZmtpError::EncoderBusy)
        ));

        let mut buf = IoBuf::with_capacity(64);
        let status = encoder.read(&mut buf).unwrap();
        assert!(!status.ready);

        // Produced but not yet advanced still counts as in progress.
        assert!(matches!(
            encoder.putmsg(Pdu::new().push_str("second")),
            Err(ZmtpError::EncoderBusy)
        ));

        encoder.advance(status.bytes).unwrap();
        encoder.putmsg(Pdu::new().push_str("second")).unwrap();
    }

    #[test]
    fn advance_beyond_outstanding_is_a_usage_error() {
        let mut encoder = FrameEncoder::new();
        encoder.putmsg(Pdu::new().push_str("data")).unwrap();

        let mut buf = IoBuf::with_capacity(64);
        let status = encoder.read(&mut buf).unwrap();
        assert_eq!(status.bytes, 2 + 4);

        assert!(matches!(
            encoder.advance(status.bytes + 1),
            Err(ZmtpError::AdvanceOutOfRange { .. })
        ));
        // The failed call retired nothing.
        assert_eq!(encoder.outstanding(), status.bytes);
        encoder.advance(status.bytes).unwrap();
        assert_eq!(encoder.outstanding(), 0);
    }

    #[test]
    fn partial_advance_keeps_output_resumable() {
        let mut encoder = FrameEncoder::new();
        encoder.putmsg(Pdu::new().push_str("abcdefgh")).unwrap();

        let mut buf = IoBuf::with_capacity(5);
        let first = encoder.read(&mut buf).unwrap();
        assert_eq!(first.bytes, 5);
        assert!(first.ready);
        let mut wire = buf.readable().to_vec();
        buf.consumed(5);

        // Transport took only part of the produced bytes so far.
        encoder.advance(3).unwrap();
        assert_eq!(encoder.outstanding(), 2);

        let second = encoder.read(&mut buf).unwrap();
        assert_eq!(second.bytes, 5);
        wire.extend_from_slice(buf.readable());
        buf.consumed(5);
        encoder.advance(2 + second.bytes).unwrap();

        assert!(!second.ready);
        assert_eq!(wire, [&[0u8, 8u8][..], b"abcdefgh"].concat());
    }

    #[test]
    fn empty_message_is_rejected() {
        let mut encoder = FrameEncoder::new();
        assert!(matches!(
            encoder.putmsg(Pdu::new()),
            Err(ZmtpError::EmptyMessage)
        ));
    }

    #[test]
    fn read_without_a_bound_message_fails() {
        let mut encoder = FrameEncoder::new();
        let mut buf = IoBuf::with_capacity(8);
        assert!(matches!(
            encoder.read(&mut buf),
            Err(ZmtpError::NoMessage)
        ));
    }

    #[test]
    fn empty_frames_encode_as_bare_headers() {
        let wire = encode_chunked(Pdu::new().push_empty().push_empty(), 4096);
        assert_eq!(wire, vec![FLAG_MORE, 0, 0, 0]);
    }
}
