//! CAN Frame Definition

use crate::error::InvalidFrame;
use crate::{EXTENDED_ID_MAX, MAX_DLC, STANDARD_ID_MAX};
use serde::de::{self, SeqAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// A validated classic CAN frame.
///
/// Fields are private and only set by [`make_frame`] (or deserialization,
/// which goes through the same check), so `len <= 8` and the identifier
/// always fits the width selected by `extended`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "RawFrame", into = "RawFrame")]
pub struct Frame {
    id: u32,
    data: [u8; MAX_DLC],
    len: u8,
    extended: bool,
}

/// Build a frame from untrusted driver input.
///
/// Exactly `length` bytes are copied from `payload`; bytes past `length` are
/// never read. Fails if `length > 8`, if `payload` is shorter than `length`,
/// or if `identifier` is wider than 11 bits (standard) or 29 bits (extended).
pub fn make_frame(
    identifier: u32,
    payload: &[u8],
    length: usize,
    extended: bool,
) -> Result<Frame, InvalidFrame> {
    if length > MAX_DLC {
        return Err(InvalidFrame::LengthOutOfRange(length));
    }
    if extended {
        if identifier > EXTENDED_ID_MAX {
            return Err(InvalidFrame::ExtendedIdOutOfRange(identifier));
        }
    } else if identifier > STANDARD_ID_MAX {
        return Err(InvalidFrame::StandardIdOutOfRange(identifier));
    }
    let src = payload.get(..length).ok_or(InvalidFrame::ShortPayload {
        length,
        available: payload.len(),
    })?;

    let mut data = [0u8; MAX_DLC];
    data[..length].copy_from_slice(src);

    Ok(Frame {
        id: identifier,
        data,
        // length <= 8 checked above
        len: length as u8,
        extended,
    })
}

impl Frame {
    /// Standard (11-bit) frame carrying all of `payload`
    pub fn standard(id: u32, payload: &[u8]) -> Result<Self, InvalidFrame> {
        make_frame(id, payload, payload.len(), false)
    }

    /// Extended (29-bit) frame carrying all of `payload`
    pub fn extended(id: u32, payload: &[u8]) -> Result<Self, InvalidFrame> {
        make_frame(id, payload, payload.len(), true)
    }

    /// Arbitration identifier
    pub fn id(&self) -> u32 {
        self.id
    }

    /// Whether this frame uses a 29-bit identifier
    pub fn is_extended(&self) -> bool {
        self.extended
    }

    /// Data length code (0..=8)
    pub fn dlc(&self) -> u8 {
        self.len
    }

    /// Payload bytes, exactly `dlc()` long
    pub fn data(&self) -> &[u8] {
        &self.data[..usize::from(self.len)]
    }

    /// Read a 4-byte payload as a little-endian word.
    ///
    /// Returns `None` unless the frame carries exactly 4 bytes.
    pub fn payload_u32_le(&self) -> Option<u32> {
        let word: [u8; 4] = self.data().try_into().ok()?;
        Some(u32::from_le_bytes(word))
    }

    /// Widened byte sum of the payload
    pub fn checksum(&self) -> u32 {
        crate::checksum(self.data())
    }
}

/// Unchecked wire shape; converted into [`Frame`] only through validation
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawFrame {
    id: u32,
    data: RawPayload,
    extended: bool,
}

/// Payload bytes as read off the wire, never more than 8
#[derive(Debug, Clone, Copy)]
struct RawPayload {
    bytes: [u8; MAX_DLC],
    len: usize,
}

impl RawPayload {
    fn as_slice(&self) -> &[u8] {
        &self.bytes[..self.len]
    }
}

impl Serialize for RawPayload {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.as_slice().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for RawPayload {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_seq(RawPayloadVisitor)
    }
}

struct RawPayloadVisitor;

impl<'de> Visitor<'de> for RawPayloadVisitor {
    type Value = RawPayload;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "at most {} payload bytes", MAX_DLC)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
        let mut payload = RawPayload {
            bytes: [0u8; MAX_DLC],
            len: 0,
        };
        while let Some(byte) = seq.next_element::<u8>()? {
            // Refuse on the first extra element instead of buffering the rest
            if payload.len == MAX_DLC {
                return Err(de::Error::invalid_length(MAX_DLC + 1, &self));
            }
            payload.bytes[payload.len] = byte;
            payload.len += 1;
        }
        Ok(payload)
    }

    fn visit_bytes<E: de::Error>(self, v: &[u8]) -> Result<Self::Value, E> {
        if v.len() > MAX_DLC {
            return Err(E::invalid_length(v.len(), &self));
        }
        let mut payload = RawPayload {
            bytes: [0u8; MAX_DLC],
            len: v.len(),
        };
        payload.bytes[..v.len()].copy_from_slice(v);
        Ok(payload)
    }
}

impl TryFrom<RawFrame> for Frame {
    type Error = InvalidFrame;

    fn try_from(raw: RawFrame) -> Result<Self, Self::Error> {
        let data = raw.data.as_slice();
        make_frame(raw.id, data, data.len(), raw.extended)
    }
}

impl From<Frame> for RawFrame {
    fn from(frame: Frame) -> Self {
        Self {
            id: frame.id,
            data: RawPayload {
                bytes: frame.data,
                len: usize::from(frame.len),
            },
            extended: frame.extended,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_valid_standard_frame() {
        let frame = make_frame(0x100, &[1, 2, 3], 3, false).unwrap();
        assert_eq!(frame.id(), 0x100);
        assert_eq!(frame.dlc(), 3);
        assert_eq!(frame.data(), &[1, 2, 3]);
        assert!(!frame.is_extended());
    }

    #[test]
    fn test_length_nine_rejected() {
        let data = [0u8; 10];
        assert_eq!(
            make_frame(0x100, &data, 9, false),
            Err(InvalidFrame::LengthOutOfRange(9))
        );
    }

    #[test]
    fn test_standard_id_bounds() {
        assert!(make_frame(0x7FF, &[], 0, false).is_ok());
        assert_eq!(
            make_frame(0x800, &[], 0, false),
            Err(InvalidFrame::StandardIdOutOfRange(0x800))
        );
        // Same identifier is fine on a 29-bit frame
        assert!(make_frame(0x800, &[], 0, true).is_ok());
    }

    #[test]
    fn test_extended_id_bounds() {
        assert!(make_frame(0x1FFF_FFFF, &[], 0, true).is_ok());
        assert_eq!(
            make_frame(0x2000_0000, &[], 0, true),
            Err(InvalidFrame::ExtendedIdOutOfRange(0x2000_0000))
        );
    }

    #[test]
    fn test_extra_input_bytes_ignored() {
        let data = [0, 1, 2, 3, 4, 5, 6, 7, 8, 9];
        let frame = make_frame(0x200, &data, 4, false).unwrap();
        assert_eq!(frame.data(), &[0, 1, 2, 3]);
    }

    #[test]
    fn test_short_payload_rejected() {
        assert_eq!(
            make_frame(0x200, &[1, 2], 4, false),
            Err(InvalidFrame::ShortPayload {
                length: 4,
                available: 2
            })
        );
    }

    #[test]
    fn test_payload_u32_le() {
        let frame = Frame::standard(0x200, &[0x78, 0x56, 0x34, 0x12]).unwrap();
        assert_eq!(frame.payload_u32_le(), Some(0x1234_5678));

        let frame = Frame::standard(0x200, &[1, 2, 3]).unwrap();
        assert_eq!(frame.payload_u32_le(), None);
    }

    #[test]
    fn test_frame_checksum() {
        let frame = Frame::extended(0x18DA_F110, &[0xFF; 8]).unwrap();
        assert_eq!(frame.checksum(), 8 * 255);
    }

    #[test]
    fn test_serde_roundtrip() {
        let frame = Frame::standard(0x7E8, &[0x41, 0x0C, 0x1A, 0xF8]).unwrap();
        let json = serde_json::to_string(&frame).unwrap();
        let back: Frame = serde_json::from_str(&json).unwrap();
        assert_eq!(frame, back);
    }

    #[test]
    fn test_deserialize_validates() {
        let json = r#"{"id":2048,"data":[1,2],"extended":false}"#;
        assert!(serde_json::from_str::<Frame>(json).is_err());

        let json = r#"{"id":1,"data":[0,0,0,0,0,0,0,0,0],"extended":false}"#;
        assert!(serde_json::from_str::<Frame>(json).is_err());
    }

    #[test]
    fn test_deserialize_long_payload_stops_early() {
        // 10k-element array: refused at the ninth byte, error names the bound
        let data = vec!["7"; 10_000].join(",");
        let json = format!(r#"{{"id":1,"data":[{}],"extended":false}}"#, data);
        let err = serde_json::from_str::<Frame>(&json).unwrap_err();
        assert!(err.to_string().contains("at most 8 payload bytes"));

        let json = r#"{"id":1,"data":[1,2,3,4,5,6,7,8],"extended":true}"#;
        let frame: Frame = serde_json::from_str(json).unwrap();
        assert_eq!(frame.data(), &[1, 2, 3, 4, 5, 6, 7, 8]);
    }

    // Identifier range follows the addressing mode
    fn id_strategy() -> impl Strategy<Value = (bool, u32)> {
        any::<bool>().prop_flat_map(|extended| {
            let max = if extended { EXTENDED_ID_MAX } else { STANDARD_ID_MAX };
            (Just(extended), 0u32..=max)
        })
    }

    proptest! {
        #[test]
        fn prop_valid_inputs_keep_payload(
            (extended, id) in id_strategy(),
            payload in proptest::collection::vec(any::<u8>(), 0..=MAX_DLC),
        ) {
            let frame = make_frame(id, &payload, payload.len(), extended).unwrap();
            prop_assert_eq!(frame.data(), &payload[..]);
            prop_assert_eq!(usize::from(frame.dlc()), payload.len());
            prop_assert_eq!(frame.id(), id);
        }

        #[test]
        fn prop_oversized_length_rejected(length in (MAX_DLC + 1)..1024usize) {
            let payload = vec![0u8; length];
            prop_assert_eq!(
                make_frame(0x10, &payload, length, false),
                Err(InvalidFrame::LengthOutOfRange(length))
            );
        }

        #[test]
        fn prop_wide_standard_id_rejected(id in (STANDARD_ID_MAX + 1)..=u32::MAX) {
            prop_assert_eq!(
                make_frame(id, &[], 0, false),
                Err(InvalidFrame::StandardIdOutOfRange(id))
            );
        }

        #[test]
        fn prop_wide_extended_id_rejected(id in (EXTENDED_ID_MAX + 1)..=u32::MAX) {
            prop_assert_eq!(
                make_frame(id, &[], 0, true),
                Err(InvalidFrame::ExtendedIdOutOfRange(id))
            );
        }
    }
}
