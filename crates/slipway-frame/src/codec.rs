use bytes::{BufMut, Bytes, BytesMut};

/// Frame delimiter.
pub const END: u8 = 0xC0;

/// Escape introducer.
pub const ESC: u8 = 0xDB;

/// Escaped substitute for a payload delimiter byte.
pub const ESC_END: u8 = 0xDC;

/// Escaped substitute for a payload escape byte.
pub const ESC_ESC: u8 = 0xDD;

/// Encode a payload into a delimited frame.
///
/// Wire format:
/// ```text
/// ┌──────┬────────────────────────────────────┬──────┐
/// │ END  │ payload with END → ESC ESC_END and │ END  │
/// │ 0xC0 │              ESC → ESC ESC_ESC     │ 0xC0 │
/// └──────┴────────────────────────────────────┴──────┘
/// ```
///
/// An empty payload encodes to an empty byte sequence, not to a bare
/// delimiter pair.
pub fn encode(payload: &[u8]) -> Bytes {
    if payload.is_empty() {
        return Bytes::new();
    }

    let mut out = BytesMut::with_capacity(payload.len() + 2);
    out.put_u8(END);
    for &byte in payload {
        match byte {
            END => {
                out.put_u8(ESC);
                out.put_u8(ESC_END);
            }
            ESC => {
                out.put_u8(ESC);
                out.put_u8(ESC_ESC);
            }
            _ => out.put_u8(byte),
        }
    }
    out.put_u8(END);
    out.freeze()
}

/// Recover the payload from a complete frame.
///
/// Anything that is not a delimiter-bounded range of at least two bytes
/// yields an empty payload. [`FrameDecoder`](crate::decoder::FrameDecoder)
/// only hands over ranges that already passed its status check, so that
/// path is defensive.
///
/// An escape byte followed by anything other than `ESC_END`/`ESC_ESC` has
/// no defined meaning; the pair is dropped rather than passed through.
pub fn decode(frame: &[u8]) -> Bytes {
    if frame.len() < 2 || frame[0] != END || frame[frame.len() - 1] != END {
        return Bytes::new();
    }

    let body = &frame[1..frame.len() - 1];
    let mut out = BytesMut::with_capacity(body.len());
    let mut bytes = body.iter();
    while let Some(&byte) = bytes.next() {
        if byte != ESC {
            out.put_u8(byte);
            continue;
        }
        match bytes.next() {
            Some(&ESC_END) => out.put_u8(END),
            Some(&ESC_ESC) => out.put_u8(ESC),
            Some(_) | None => {}
        }
    }
    out.freeze()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_empty_payload_is_empty() {
        assert!(encode(&[]).is_empty());
    }

    #[test]
    fn encode_wraps_payload_in_delimiters() {
        assert_eq!(encode(&[0x01, 0x02]).as_ref(), &[END, 0x01, 0x02, END]);
    }

    #[test]
    fn encode_escapes_delimiter_byte() {
        assert_eq!(encode(&[END]).as_ref(), &[END, ESC, ESC_END, END]);
    }

    #[test]
    fn encode_escapes_escape_byte() {
        assert_eq!(encode(&[ESC]).as_ref(), &[END, ESC, ESC_ESC, END]);
    }

    #[test]
    fn decode_inverts_encode() {
        let payloads: &[&[u8]] = &[
            &[0x00],
            &[0x01, 0x02, 0x03],
            &[END],
            &[ESC],
            &[END, ESC, END, ESC],
            &[0xAA, END, 0xBB, ESC, 0xCC],
        ];
        for payload in payloads {
            let frame = encode(payload);
            assert_eq!(decode(&frame).as_ref(), *payload, "payload {payload:02X?}");
        }
    }

    #[test]
    fn decode_rejects_short_input() {
        assert!(decode(&[]).is_empty());
        assert!(decode(&[END]).is_empty());
    }

    #[test]
    fn decode_rejects_unbounded_range() {
        assert!(decode(&[0x01, 0x02, END]).is_empty());
        assert!(decode(&[END, 0x01, 0x02]).is_empty());
    }

    #[test]
    fn decode_empty_frame_is_empty_payload() {
        assert!(decode(&[END, END]).is_empty());
    }

    #[test]
    fn decode_drops_unknown_escape_pair() {
        assert_eq!(decode(&[END, 0x01, ESC, 0x7F, 0x02, END]).as_ref(), &[0x01, 0x02]);
    }

    #[test]
    fn decode_tolerates_trailing_escape() {
        assert_eq!(decode(&[END, 0x01, ESC, END]).as_ref(), &[0x01]);
    }
}
