//! Danmaku segment decoding.
//!
//! A segment reply has the shape:
//!
//! ```text
//! message DmSegMobileReply {
//!   repeated DanmakuElem elems = 1;
//!   int32 state = 2;
//! }
//! ```
//!
//! Decoding is lazy: [`SegmentIter`] pulls one element at a time out of the
//! buffer, and [`parse_segment`] drives it with a handler that can stop the
//! walk early. Nothing past the stop point is touched.

use crate::error::{ProtoError, Result};
use crate::wire::{WireReader, WireType};

/// One danmaku record as carried on the wire.
///
/// The cracker consumes `mid_hash` (the sender's CRC-32 fingerprint, 1-8
/// hex chars with leading zeros dropped by the encoder) and `content`; the
/// remaining fields are decoded for completeness and may be ignored.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DanmakuElem {
    /// Unique danmaku id (field 1).
    pub id: i64,
    /// Playback offset in milliseconds (field 2).
    pub progress: i32,
    /// Display mode (field 3).
    pub mode: i32,
    /// Font size (field 4).
    pub fontsize: i32,
    /// Text color as RGB (field 5).
    pub color: u32,
    /// CRC-32 fingerprint of the sender UID, hex (field 6).
    pub mid_hash: String,
    /// Comment text (field 7).
    pub content: String,
    /// Send time, Unix seconds (field 8).
    pub ctime: i64,
    /// Rendering weight (field 9).
    pub weight: i32,
    /// Action string (field 10).
    pub action: String,
    /// Danmaku pool (field 11).
    pub pool: i32,
    /// Danmaku id as a decimal string (field 12).
    pub id_str: String,
    /// Attribute bits (field 13).
    pub attr: i32,
}

fn read_string(reader: &mut WireReader<'_>) -> Result<String> {
    let bytes = reader.read_bytes()?;
    Ok(String::from_utf8_lossy(bytes).into_owned())
}

fn expect_wire(field: u32, got: WireType, want: WireType) -> Result<()> {
    if got == want {
        Ok(())
    } else {
        Err(ProtoError::wire_type_mismatch(field, got.bits()))
    }
}

/// Parse one `DanmakuElem` out of its length-delimited payload.
fn parse_elem(data: &[u8]) -> Result<DanmakuElem> {
    let mut reader = WireReader::new(data);
    let mut elem = DanmakuElem::default();

    while !reader.is_empty() {
        let (field, wire) = reader.read_tag()?;
        match field {
            1 => {
                expect_wire(field, wire, WireType::Varint)?;
                elem.id = reader.read_varint()? as i64;
            }
            2 => {
                expect_wire(field, wire, WireType::Varint)?;
                elem.progress = reader.read_varint()? as i32;
            }
            3 => {
                expect_wire(field, wire, WireType::Varint)?;
                elem.mode = reader.read_varint()? as i32;
            }
            4 => {
                expect_wire(field, wire, WireType::Varint)?;
                elem.fontsize = reader.read_varint()? as i32;
            }
            5 => {
                expect_wire(field, wire, WireType::Varint)?;
                elem.color = reader.read_varint()? as u32;
            }
            6 => {
                expect_wire(field, wire, WireType::LengthDelimited)?;
                elem.mid_hash = read_string(&mut reader)?;
            }
            7 => {
                expect_wire(field, wire, WireType::LengthDelimited)?;
                elem.content = read_string(&mut reader)?;
            }
            8 => {
                expect_wire(field, wire, WireType::Varint)?;
                elem.ctime = reader.read_varint()? as i64;
            }
            9 => {
                expect_wire(field, wire, WireType::Varint)?;
                elem.weight = reader.read_varint()? as i32;
            }
            10 => {
                expect_wire(field, wire, WireType::LengthDelimited)?;
                elem.action = read_string(&mut reader)?;
            }
            11 => {
                expect_wire(field, wire, WireType::Varint)?;
                elem.pool = reader.read_varint()? as i32;
            }
            12 => {
                expect_wire(field, wire, WireType::LengthDelimited)?;
                elem.id_str = read_string(&mut reader)?;
            }
            13 => {
                expect_wire(field, wire, WireType::Varint)?;
                elem.attr = reader.read_varint()? as i32;
            }
            // Unknown fields are skipped so future protocol additions
            // don't break decoding.
            _ => reader.skip(field, wire)?,
        }
    }
    Ok(elem)
}

/// Lazy iterator over the elements of a segment buffer.
///
/// Yields `Result<DanmakuElem>`; the first error fuses the iterator, since
/// a misread tag or length loses the stream's alignment for good.
#[derive(Debug)]
pub struct SegmentIter<'a> {
    reader: WireReader<'a>,
    done: bool,
}

impl<'a> SegmentIter<'a> {
    /// Create an iterator over a `DmSegMobileReply`-shaped buffer.
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            reader: WireReader::new(data),
            done: false,
        }
    }

    fn fail(&mut self, err: ProtoError) -> Option<Result<DanmakuElem>> {
        self.done = true;
        Some(Err(err))
    }
}

impl Iterator for SegmentIter<'_> {
    type Item = Result<DanmakuElem>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        while !self.reader.is_empty() {
            let (field, wire) = match self.reader.read_tag() {
                Ok(tag) => tag,
                Err(e) => return self.fail(e),
            };

            match field {
                // elems
                1 => {
                    if wire != WireType::LengthDelimited {
                        return self.fail(ProtoError::wire_type_mismatch(field, wire.bits()));
                    }
                    let payload = match self.reader.read_bytes() {
                        Ok(p) => p,
                        Err(e) => return self.fail(e),
                    };
                    return match parse_elem(payload) {
                        Ok(elem) => Some(Ok(elem)),
                        Err(e) => self.fail(e),
                    };
                }
                // state, tolerated and discarded
                2 => {
                    if wire != WireType::Varint {
                        return self.fail(ProtoError::wire_type_mismatch(field, wire.bits()));
                    }
                    if let Err(e) = self.reader.read_varint() {
                        return self.fail(e);
                    }
                }
                _ => {
                    if let Err(e) = self.reader.skip(field, wire) {
                        return self.fail(e);
                    }
                }
            }
        }

        self.done = true;
        None
    }
}

/// Walk a segment buffer, invoking `handler` for each decoded element.
///
/// The handler returns `true` to continue and `false` to stop; stopping
/// returns `Ok(())` without consuming the rest of the buffer. Any decode
/// error aborts the segment.
pub fn parse_segment<F>(data: &[u8], mut handler: F) -> Result<()>
where
    F: FnMut(&DanmakuElem) -> bool,
{
    for elem in SegmentIter::new(data) {
        let elem = elem?;
        if !handler(&elem) {
            return Ok(());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn varint(mut v: u64, out: &mut Vec<u8>) {
        loop {
            let byte = (v & 0x7F) as u8;
            v >>= 7;
            if v == 0 {
                out.push(byte);
                break;
            }
            out.push(byte | 0x80);
        }
    }

    fn field_varint(field: u32, v: u64, out: &mut Vec<u8>) {
        varint(u64::from(field) << 3, out);
        varint(v, out);
    }

    fn field_bytes(field: u32, payload: &[u8], out: &mut Vec<u8>) {
        varint((u64::from(field) << 3) | 2, out);
        varint(payload.len() as u64, out);
        out.extend_from_slice(payload);
    }

    fn sample_elem(id: u64, mid_hash: &str, content: &str) -> Vec<u8> {
        let mut body = Vec::new();
        field_varint(1, id, &mut body);
        field_varint(2, 5000, &mut body);
        field_varint(3, 1, &mut body);
        field_varint(4, 25, &mut body);
        field_varint(5, 0xFFFFFF, &mut body);
        field_bytes(6, mid_hash.as_bytes(), &mut body);
        field_bytes(7, content.as_bytes(), &mut body);
        field_varint(8, 1_600_000_000, &mut body);
        body
    }

    fn segment_of(elems: &[Vec<u8>]) -> Vec<u8> {
        let mut seg = Vec::new();
        for body in elems {
            field_bytes(1, body, &mut seg);
        }
        field_varint(2, 0, &mut seg);
        seg
    }

    #[test]
    fn test_single_element() {
        let seg = segment_of(&[sample_elem(99, "87c8c3d", "hello")]);
        let elems: Vec<_> = SegmentIter::new(&seg).collect::<Result<_>>().unwrap();
        assert_eq!(elems.len(), 1);
        assert_eq!(elems[0].id, 99);
        assert_eq!(elems[0].mid_hash, "87c8c3d");
        assert_eq!(elems[0].content, "hello");
        assert_eq!(elems[0].ctime, 1_600_000_000);
    }

    #[test]
    fn test_multiple_elements_in_order() {
        let seg = segment_of(&[
            sample_elem(1, "aaaaaaaa", "first"),
            sample_elem(2, "bbbbbbbb", "second"),
            sample_elem(3, "cccccccc", "third"),
        ]);
        let ids: Vec<i64> = SegmentIter::new(&seg)
            .map(|e| e.unwrap().id)
            .collect();
        assert_eq!(ids, [1, 2, 3]);
    }

    #[test]
    fn test_handler_stop_signal() {
        let seg = segment_of(&[
            sample_elem(1, "aaaaaaaa", "first"),
            sample_elem(2, "bbbbbbbb", "second"),
        ]);
        let mut seen = Vec::new();
        parse_segment(&seg, |elem| {
            seen.push(elem.id);
            false
        })
        .unwrap();
        assert_eq!(seen, [1]);
    }

    #[test]
    fn test_unknown_fields_skipped() {
        let mut body = sample_elem(7, "deadbeef", "x");
        field_varint(14, 3, &mut body); // future scalar
        field_bytes(99, b"opaque", &mut body); // future message
        let seg = segment_of(&[body]);

        let elems: Vec<_> = SegmentIter::new(&seg).collect::<Result<_>>().unwrap();
        assert_eq!(elems[0].id, 7);
        assert_eq!(elems[0].mid_hash, "deadbeef");
    }

    #[test]
    fn test_attr_field() {
        let mut body = sample_elem(7, "deadbeef", "x");
        field_varint(13, 6, &mut body);
        let seg = segment_of(&[body]);
        let elems: Vec<_> = SegmentIter::new(&seg).collect::<Result<_>>().unwrap();
        assert_eq!(elems[0].attr, 6);
    }

    #[test]
    fn test_wrong_wire_type_for_content() {
        let mut body = Vec::new();
        field_varint(7, 42, &mut body); // content must be length-delimited
        let seg = segment_of(&[body]);

        let result: Result<Vec<_>> = SegmentIter::new(&seg).collect();
        assert_eq!(result, Err(ProtoError::wire_type_mismatch(7, 0)));
    }

    #[test]
    fn test_element_length_overruns_buffer() {
        let mut seg = Vec::new();
        varint((1 << 3) | 2, &mut seg);
        varint(200, &mut seg); // claims 200 bytes
        seg.extend_from_slice(&[0u8; 4]);

        let result: Result<Vec<_>> = SegmentIter::new(&seg).collect();
        assert!(matches!(result, Err(ProtoError::BufferOverflow { .. })));
    }

    #[test]
    fn test_error_fuses_iterator() {
        let mut seg = Vec::new();
        varint((1 << 3) | 2, &mut seg);
        varint(200, &mut seg);

        let mut iter = SegmentIter::new(&seg);
        assert!(matches!(iter.next(), Some(Err(_))));
        assert!(iter.next().is_none());
    }

    #[test]
    fn test_group_wire_type_rejected() {
        let mut seg = Vec::new();
        varint((5 << 3) | 3, &mut seg); // start-group for some unknown field

        let result: Result<Vec<_>> = SegmentIter::new(&seg).collect();
        assert_eq!(result, Err(ProtoError::wire_type_mismatch(5, 3)));
    }

    #[test]
    fn test_empty_segment() {
        assert_eq!(SegmentIter::new(&[]).count(), 0);
        parse_segment(&[], |_| panic!("no elements expected")).unwrap();
    }
}
