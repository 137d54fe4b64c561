//! The precomputed low-half table.
//!
//! For every `i` in `[0, 10^8)` the table holds `(crc32(pad8(i)), i)`,
//! sorted by CRC so the meet-in-the-middle scan can binary-search the CRC
//! its low half must have. At 8 bytes per entry the table weighs in around
//! 763 MiB, so it is built once (in parallel), persisted to a cache file,
//! and memory-loaded on later runs.
//!
//! Cache file layout, all little-endian:
//!
//! ```text
//! magic: u32 = 0x4D49544D ‖ version: u32 = 1 ‖ (crc: u32, low: u32) × N
//! ```
//!
//! Any magic or version mismatch means the file is treated as absent and
//! rebuilt; only genuine I/O failures surface to the caller.

use crate::error::{EngineError, Result};
use dmtrace_core::crc32_pad8;
use rayon::prelude::*;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::ops::Range;
use std::path::Path;

/// Number of entries in a full table: one per 8-digit low half.
pub const TABLE_ENTRIES: usize = 100_000_000;

/// Cache file magic number.
pub const CACHE_MAGIC: u32 = 0x4D49_544D;

/// Cache file format version.
pub const CACHE_VERSION: u32 = 1;

/// Default cache file name.
pub const DEFAULT_CACHE_FILE: &str = "mitm_table.bin";

/// One table entry: the CRC-32 of `pad8(low)` and the low half itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LowEntry {
    /// `crc32(pad8(low))`.
    pub crc: u32,
    /// The 8-digit low half as an integer.
    pub low: u32,
}

/// The sorted low-half lookup table.
///
/// Built or loaded once, then shared read-only; queries never mutate, so
/// concurrent readers need no synchronization.
#[derive(Debug)]
pub struct LowHalfTable {
    entries: Vec<LowEntry>,
}

impl LowHalfTable {
    /// Build the full table in parallel and sort it by `(crc, low)`.
    pub fn build() -> Self {
        Self::build_span(0..TABLE_ENTRIES as u32)
    }

    /// Build a table covering only `lows` (the full build uses the whole
    /// span; tests use narrow ones).
    pub(crate) fn build_span(lows: Range<u32>) -> Self {
        let mut entries: Vec<LowEntry> = lows
            .into_par_iter()
            .map(|low| LowEntry {
                crc: crc32_pad8(low),
                low,
            })
            .collect();
        entries.par_sort_unstable_by_key(|e| (e.crc, e.low));
        Self { entries }
    }

    /// Wrap a prepared entry list, sorting it into table order.
    pub(crate) fn from_entries(mut entries: Vec<LowEntry>) -> Self {
        entries.sort_unstable_by_key(|e| (e.crc, e.low));
        Self { entries }
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when the table holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All low halves whose padded CRC equals `target`, in ascending order.
    ///
    /// CRC-32 collides within the 10^8 span, so the returned slice can hold
    /// several entries; empty is a perfectly normal answer.
    pub fn find_lows(&self, target: u32) -> &[LowEntry] {
        let start = self.entries.partition_point(|e| e.crc < target);
        let end = self.entries.partition_point(|e| e.crc <= target);
        &self.entries[start..end]
    }

    /// Persist the table to `path` with the magic/version header.
    pub fn save(&self, path: &Path) -> Result<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::with_capacity(1 << 20, file);
        writer.write_all(&CACHE_MAGIC.to_le_bytes())?;
        writer.write_all(&CACHE_VERSION.to_le_bytes())?;
        for entry in &self.entries {
            writer.write_all(&entry.crc.to_le_bytes())?;
            writer.write_all(&entry.low.to_le_bytes())?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Load a table from `path`, validating magic, version, and alignment.
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let total = file.metadata()?.len();
        let payload = total
            .checked_sub(8)
            .filter(|p| p % 8 == 0)
            .ok_or(EngineError::MalformedCache {
                size: total.saturating_sub(8),
            })?;

        let mut reader = BufReader::with_capacity(1 << 20, file);
        let magic = read_u32(&mut reader)?;
        if magic != CACHE_MAGIC {
            return Err(EngineError::invalid_magic(CACHE_MAGIC, magic));
        }
        let version = read_u32(&mut reader)?;
        if version != CACHE_VERSION {
            return Err(EngineError::unsupported_version(CACHE_VERSION, version));
        }

        let count = (payload / 8) as usize;
        let mut entries = Vec::with_capacity(count);
        let mut chunk = vec![0u8; 8 * 8192];
        let mut remaining = count;
        while remaining > 0 {
            let take = remaining.min(8192);
            let buf = &mut chunk[..take * 8];
            reader.read_exact(buf)?;
            for pair in buf.chunks_exact(8) {
                entries.push(LowEntry {
                    crc: u32::from_le_bytes([pair[0], pair[1], pair[2], pair[3]]),
                    low: u32::from_le_bytes([pair[4], pair[5], pair[6], pair[7]]),
                });
            }
            remaining -= take;
        }
        Ok(Self { entries })
    }

    /// Load the cache if it is present and usable.
    ///
    /// `Ok(None)` means the file is absent or stale (missing, bad magic,
    /// wrong version, misaligned, or not a full table) and should be
    /// rebuilt; `Err` means a real I/O failure the caller must see.
    pub(crate) fn load_cached(path: &Path) -> Result<Option<Self>> {
        match Self::load(path) {
            Ok(table) if table.len() == TABLE_ENTRIES => Ok(Some(table)),
            Ok(_) => Ok(None),
            Err(EngineError::CacheIo(e)) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(
                EngineError::InvalidMagic { .. }
                | EngineError::UnsupportedVersion { .. }
                | EngineError::MalformedCache { .. },
            ) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Load the cache at `path`, or build the table and write the cache.
    ///
    /// Returns the table and whether it had to be rebuilt. A stale cache is
    /// overwritten with the current format version.
    pub fn load_or_build(path: &Path) -> Result<(Self, bool)> {
        if let Some(table) = Self::load_cached(path)? {
            return Ok((table, false));
        }
        let table = Self::build();
        table.save(path)?;
        Ok((table, true))
    }
}

fn read_u32<R: Read>(reader: &mut R) -> Result<u32> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}
