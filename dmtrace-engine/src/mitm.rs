//! The meet-in-the-middle cracker for 16-digit UIDs.
//!
//! Brute force over 10^16 decimal strings is out of reach, but CRC-32 is
//! linear over GF(2): splitting a 16-digit UID `U` into 8-digit halves
//! `H` and `L` gives
//!
//! ```text
//! crc(U) == apply(M8, crc(pad8(H))) ^ crc(pad8(L))
//! ```
//!
//! so for each of the 10^8 high halves the CRC its low half *must* have is
//! one XOR away, and the precomputed table answers "which lows have that
//! CRC" with one binary search. That turns O(10^16) time into O(10^8) time
//! against O(10^8) space.
//!
//! Every reassembled candidate is still verified by hashing its full
//! decimal form; the table and the matrix are trusted for navigation, never
//! for the answer.

use crate::filter::UidFilter;
use crate::table::{LowHalfTable, TABLE_ENTRIES};
use dmtrace_core::crc::{Crc32, crc32_uid, pad8};
use dmtrace_core::gf2::Gf2Matrix;
use std::ops::Range;

/// Bound on the candidate list; pathological collision counts stop
/// appending here rather than aborting the scan.
pub const MITM_RESULT_CAP: usize = 2_000_000;

/// The outcome of a meet-in-the-middle scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MitmScan {
    /// Verified candidates in ascending UID order.
    pub candidates: Vec<u64>,
    /// True when the result cap was hit and further candidates were
    /// discarded.
    pub truncated: bool,
}

/// The assembled MITM cracker: low-half table, shift operator, filter.
#[derive(Debug)]
pub struct MitmEngine {
    table: LowHalfTable,
    shift8: Gf2Matrix,
    filter: UidFilter,
}

impl MitmEngine {
    /// Assemble an engine around a table, using the built-in filter.
    pub fn new(table: LowHalfTable) -> Self {
        Self::with_filter(table, UidFilter::builtin())
    }

    /// Assemble an engine with a caller-supplied filter.
    pub fn with_filter(table: LowHalfTable, filter: UidFilter) -> Self {
        Self {
            table,
            shift8: Gf2Matrix::shift8(),
            filter,
        }
    }

    /// Replace the plausibility filter.
    pub fn set_filter(&mut self, filter: UidFilter) {
        self.filter = filter;
    }

    /// The active plausibility filter.
    pub fn filter(&self) -> &UidFilter {
        &self.filter
    }

    /// The low-half table backing this engine.
    pub fn table(&self) -> &LowHalfTable {
        &self.table
    }

    /// Scan every high half and return all verified candidates.
    pub fn scan(&self, target: u32) -> MitmScan {
        self.scan_highs(0..TABLE_ENTRIES as u32, target)
    }

    /// Scan a sub-range of high halves (the full scan uses the whole
    /// span; tests use narrow ones).
    pub(crate) fn scan_highs(&self, highs: Range<u32>, target: u32) -> MitmScan {
        let mut scan = MitmScan::default();
        if self.table.is_empty() {
            return scan;
        }
        let mut hbuf = [0u8; 8];

        for high in highs {
            pad8(high, &mut hbuf);
            let crc_high = Crc32::compute(&hbuf);
            let need = target ^ self.shift8.apply(crc_high);

            for entry in self.table.find_lows(need) {
                let uid = u64::from(high) * 100_000_000 + u64::from(entry.low);
                if !self.filter.is_plausible(uid) {
                    continue;
                }
                // last line of defense against a stale table or a bad shift
                if crc32_uid(uid) != target {
                    continue;
                }
                if scan.candidates.len() == MITM_RESULT_CAP {
                    scan.truncated = true;
                    continue;
                }
                scan.candidates.push(uid);
            }
        }
        scan
    }
}
