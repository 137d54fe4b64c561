//! # dmtrace Core
//!
//! Core primitives for the dmtrace UID recovery toolkit.
//!
//! This crate provides the building blocks shared by the crackers:
//!
//! - [`crc`]: byte-table CRC-32 and the decimal-ASCII fast paths
//! - [`gf2`]: the GF(2) matrix operator that shifts a CRC state as if zero
//!   bytes were appended
//!
//! ## Architecture
//!
//! dmtrace is a layered stack:
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │ CLI                                          │
//! │     dmtrace binary                           │
//! ├──────────────────────────────────────────────┤
//! │ Engine                                       │
//! │     low-half table, brute force, MITM        │
//! ├──────────────────────────────────────────────┤
//! │ Decoders                                     │
//! │     danmaku segment Protobuf reader          │
//! ├──────────────────────────────────────────────┤
//! │ Core (this crate)                            │
//! │     CRC-32, digit formatting, GF(2) shifts   │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust
//! use dmtrace_core::crc::Crc32;
//! use dmtrace_core::gf2::Gf2Matrix;
//!
//! // A fingerprint is the CRC-32 of a UID's decimal form.
//! assert_eq!(Crc32::compute(b"3546921440381311"), 0x90a567c7);
//!
//! // The shift operator joins the two 8-digit halves.
//! let m8 = Gf2Matrix::shift8();
//! assert_eq!(
//!     m8.apply(Crc32::compute(b"35469214")) ^ Crc32::compute(b"40381311"),
//!     0x90a567c7,
//! );
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod crc;
pub mod gf2;

// Re-exports for convenience
pub use crc::{Crc32, crc32_pad8, crc32_uid, pad8, uid_to_decimal};
pub use gf2::Gf2Matrix;
