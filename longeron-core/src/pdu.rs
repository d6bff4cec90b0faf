//! Multi-frame protocol data unit.
//!
//! A [`Pdu`] is the in-memory form of one logical multi-part protocol
//! message: an ordered sequence of byte frames. Frame order is preserved
//! end to end, and the unit is immutable while a codec is draining it.

use bytes::Bytes;
use smallvec::SmallVec;

/// Inline storage for the common small-frame-count case.
pub type Frames = SmallVec<[Bytes; 4]>;

/// An ordered sequence of frames forming one protocol message.
///
/// # Examples
///
/// ```
/// use longeron_core::pdu::Pdu;
///
/// let pdu = Pdu::new()
///     .push_str("topic")
///     .push(&b"data"[..]);
/// assert_eq!(pdu.len(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Pdu {
    frames: Frames,
}

impl Pdu {
    /// Create a new empty unit.
    #[must_use]
    pub fn new() -> Self {
        Self {
            frames: Frames::new(),
        }
    }

    /// Add a frame from any type that can be converted to `Bytes`.
    #[must_use]
    pub fn push(mut self, frame: impl Into<Bytes>) -> Self {
        self.frames.push(frame.into());
        self
    }

    /// Add a string frame (UTF-8 encoded).
    #[must_use]
    pub fn push_str(mut self, s: &str) -> Self {
        self.frames.push(Bytes::copy_from_slice(s.as_bytes()));
        self
    }

    /// Add an empty frame (useful for envelope separation).
    #[must_use]
    pub fn push_empty(mut self) -> Self {
        self.frames.push(Bytes::new());
        self
    }

    /// Get the number of frames.
    #[must_use]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Check if the unit has no frames.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Get a reference to the frames.
    #[must_use]
    pub fn frames(&self) -> &[Bytes] {
        &self.frames
    }

    /// Total payload bytes across all frames.
    #[must_use]
    pub fn payload_len(&self) -> usize {
        self.frames.iter().map(Bytes::len).sum()
    }

    /// Consume the unit and return the frames.
    #[must_use]
    pub fn into_frames(self) -> Frames {
        self.frames
    }
}

impl From<Vec<Bytes>> for Pdu {
    fn from(frames: Vec<Bytes>) -> Self {
        Self {
            frames: frames.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_preserves_frame_order() {
        let pdu = Pdu::new()
            .push(&b"frame1"[..])
            .push_str("frame2")
            .push_empty()
            .push(vec![1, 2, 3]);

        assert_eq!(pdu.len(), 4);
        assert_eq!(pdu.frames()[0], b"frame1"[..]);
        assert_eq!(pdu.frames()[1], b"frame2"[..]);
        assert_eq!(pdu.frames()[2], b""[..]);
        assert_eq!(pdu.frames()[3], &[1, 2, 3][..]);
    }

    #[test]
    fn payload_len_sums_all_frames() {
        let pdu = Pdu::new().push_str("ab").push_empty().push_str("cde");
        assert_eq!(pdu.payload_len(), 5);
    }

    #[test]
    fn into_frames_round_trips() {
        let frames = Pdu::new().push_str("hello").push_str("world").into_frames();
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0], b"hello"[..]);
        assert_eq!(frames[1], b"world"[..]);
    }
}
