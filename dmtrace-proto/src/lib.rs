//! # dmtrace Proto
//!
//! Hand-rolled Protobuf wire decoder for danmaku segment replies.
//!
//! The upstream reply format is a `DmSegMobileReply` message carrying
//! repeated `DanmakuElem` records. Only two of a record's fields matter to
//! the cracker (`mid_hash` and `content`), but all thirteen are decoded so
//! callers can inspect whatever the wire carried.
//!
//! Decoding is zero-copy up to the element boundary and lazy across
//! elements: [`SegmentIter`] pulls records on demand, and
//! [`parse_segment`] lets a handler stop the walk early without touching
//! the rest of the buffer.
//!
//! ## Example
//!
//! ```rust
//! use dmtrace_proto::{SegmentIter, parse_segment};
//!
//! // field 1 (elem), length 9: { field 7 (content), length 5, "hello" } then field 2 (state) = 0
//! let seg = [0x0A, 0x07, 0x3A, 0x05, b'h', b'e', b'l', b'l', b'o', 0x10, 0x00];
//!
//! let mut contents = Vec::new();
//! parse_segment(&seg, |elem| {
//!     contents.push(elem.content.clone());
//!     true
//! }).unwrap();
//! assert_eq!(contents, ["hello"]);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod segment;
pub mod wire;

// Re-exports for convenience
pub use error::{ProtoError, Result};
pub use segment::{DanmakuElem, SegmentIter, parse_segment};
pub use wire::{WireReader, WireType};
