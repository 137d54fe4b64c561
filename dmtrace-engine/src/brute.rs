//! Exhaustive search over the legacy UID space.
//!
//! The scan covers `[0, 5·10^9)` in contiguous chunks, one per worker.
//! Workers share nothing and never stop early: CRC-32 collides, so the
//! correct "single" answer is the *minimum* matching UID, and a shared stop
//! flag would let a worker deep in the space win the race against the true
//! minimum. Every worker finishes its chunk, then a sequential reduction
//! picks the minimum (or keeps the whole union).

use dmtrace_core::crc::{Crc32, UID_DIGITS_MAX, uid_to_decimal};
use rayon::prelude::*;

/// Exclusive upper bound of the exhaustive scan.
pub const LEGACY_SCAN_END: u64 = 5_000_000_000;

/// Hard ceiling on the worker count.
pub const MAX_WORKERS: usize = 64;

/// Bound on the collision list returned by [`find_all`].
pub const RESULT_CAP: usize = 2_000_000;

/// A worker count derived from the platform, capped at [`MAX_WORKERS`].
pub fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(8)
        .min(MAX_WORKERS)
}

/// Split `[0, end)` into `workers` contiguous chunks.
fn chunk_ranges(end: u64, workers: usize) -> Vec<(u64, u64)> {
    let workers = workers as u64;
    let chunk = end.div_ceil(workers);
    (0..workers)
        .map(|i| (i * chunk, ((i + 1) * chunk).min(end)))
        .filter(|(start, stop)| start < stop)
        .collect()
}

/// Scan `[start, end)` and collect every UID whose decimal CRC-32 equals
/// `target`.
fn scan_range(start: u64, end: u64, target: u32) -> Vec<u64> {
    let mut hits = Vec::new();
    let mut buf = [0u8; UID_DIGITS_MAX];
    for uid in start..end {
        let len = uid_to_decimal(uid, &mut buf);
        if Crc32::compute(&buf[..len]) == target {
            hits.push(uid);
        }
    }
    hits
}

/// All UIDs in `[0, 5·10^9)` matching `target`, in undefined order,
/// bounded by [`RESULT_CAP`].
///
/// The worker count is clamped to `1..=64`. Each chunk's hits live in that
/// worker's own buffer until the post-join flatten, so the scan itself
/// needs no locks.
pub fn find_all(target: u32, workers: usize) -> Vec<u64> {
    let workers = workers.clamp(1, MAX_WORKERS);
    let per_worker: Vec<Vec<u64>> = chunk_ranges(LEGACY_SCAN_END, workers)
        .into_par_iter()
        .map(|(start, end)| scan_range(start, end, target))
        .collect();

    let mut all: Vec<u64> = per_worker.into_iter().flatten().collect();
    all.truncate(RESULT_CAP);
    all
}

/// The minimum UID in `[0, 5·10^9)` matching `target`, or 0 when none
/// does.
pub fn find_min(target: u32, workers: usize) -> u64 {
    find_all(target, workers).into_iter().min().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dmtrace_core::crc32_uid;

    #[test]
    fn test_chunk_ranges_cover_space() {
        for workers in [1, 3, 7, 64] {
            let ranges = chunk_ranges(1000, workers);
            assert_eq!(ranges[0].0, 0);
            assert_eq!(ranges.last().unwrap().1, 1000);
            for pair in ranges.windows(2) {
                assert_eq!(pair[0].1, pair[1].0);
            }
        }
    }

    #[test]
    fn test_chunk_ranges_more_workers_than_space() {
        let ranges = chunk_ranges(3, 64);
        let total: u64 = ranges.iter().map(|(s, e)| e - s).sum();
        assert_eq!(total, 3);
        assert!(ranges.iter().all(|(s, e)| s < e));
    }

    #[test]
    fn test_scan_range_finds_known_uid() {
        // crc("123456789") == 0xCBF43926
        let hits = scan_range(123_456_700, 123_456_800, 0xCBF43926);
        assert_eq!(hits, [123_456_789]);
    }

    #[test]
    fn test_scan_range_verifies_round_trip() {
        let target = crc32_uid(4_999_999_999);
        let hits = scan_range(4_999_999_990, 5_000_000_000, target);
        assert!(hits.contains(&4_999_999_999));
        for uid in hits {
            assert_eq!(crc32_uid(uid), target);
        }
    }

    #[test]
    fn test_scan_range_empty_on_no_match() {
        // a range too short to contain a collision for an arbitrary target
        let target = crc32_uid(999_999_999);
        assert!(scan_range(10, 20, target).is_empty());
    }

    // Full-space scans take minutes; run with `cargo test -- --ignored`.
    #[test]
    #[ignore]
    fn test_find_min_full_space() {
        let target = crc32_uid(123_456_789);
        let min = find_min(target, default_workers());
        assert!(min > 0);
        assert!(min <= 123_456_789);
        assert_eq!(crc32_uid(min), target);
    }
}
