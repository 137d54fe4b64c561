//! The driver: fingerprint normalization, strategy selection, and the
//! process-wide MITM engine lifecycle.
//!
//! The low-half table and the shift operator are naturally process-global
//! (the table alone is ~763 MiB), so they live in one slot behind explicit
//! [`init_mitm`]/[`shutdown_mitm`] calls. Nothing initializes behind the
//! caller's back: test harnesses and embedders control the lifecycle
//! deterministically, and [`install_mitm`] slots a prepared engine value
//! directly.

use crate::brute;
use crate::error::{EngineError, Result};
use crate::filter::UidFilter;
use crate::mitm::{MitmEngine, MitmScan};
use crate::table::{DEFAULT_CACHE_FILE, LowHalfTable};
use std::path::Path;
use std::sync::RwLock;

static ENGINE: RwLock<Option<MitmEngine>> = RwLock::new(None);

/// Which cracking strategy produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Exhaustive scan of the legacy band.
    Legacy,
    /// Meet-in-the-middle scan of the full space.
    Mitm,
}

/// The aggregated outcome of [`crack_auto`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrackOutcome {
    /// Deduplicated candidates in ascending UID order.
    pub candidates: Vec<u64>,
    /// The strategy that settled the answer.
    pub strategy: Strategy,
    /// True when the MITM result cap discarded candidates.
    pub truncated: bool,
}

/// Normalize a fingerprint to exactly 8 lowercase hex characters.
///
/// Trims surrounding whitespace, lowercases, and left-pads with '0': wire
/// encoders drop leading zeros, so `"87c8c3d"` really means `"087c8c3d"`.
/// Inputs longer than 8 characters or containing non-hex characters are
/// rejected. Idempotent.
pub fn normalize_fingerprint(raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(EngineError::invalid_fingerprint(raw, "empty"));
    }
    if trimmed.len() > 8 {
        return Err(EngineError::invalid_fingerprint(
            raw,
            "longer than 8 hex characters",
        ));
    }
    if !trimmed.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(EngineError::invalid_fingerprint(raw, "not hexadecimal"));
    }

    let mut normalized = String::with_capacity(8);
    for _ in trimmed.len()..8 {
        normalized.push('0');
    }
    normalized.extend(trimmed.chars().map(|c| c.to_ascii_lowercase()));
    Ok(normalized)
}

/// Normalize a fingerprint and parse it as a 32-bit target.
pub fn parse_fingerprint(raw: &str) -> Result<u32> {
    let normalized = normalize_fingerprint(raw)?;
    u32::from_str_radix(&normalized, 16)
        .map_err(|_| EngineError::invalid_fingerprint(raw, "not hexadecimal"))
}

/// Initialize the process-wide MITM engine, loading or building the table.
///
/// `cache_path` defaults to [`DEFAULT_CACHE_FILE`] in the working
/// directory. Idempotent: an already-initialized engine is left alone.
/// Returns whether the table had to be (re)built.
pub fn init_mitm(cache_path: Option<&Path>) -> Result<bool> {
    {
        let slot = ENGINE.read().unwrap_or_else(|e| e.into_inner());
        if slot.is_some() {
            return Ok(false);
        }
    }

    let path = cache_path.unwrap_or(Path::new(DEFAULT_CACHE_FILE));
    let (table, rebuilt) = LowHalfTable::load_or_build(path)?;

    let mut slot = ENGINE.write().unwrap_or_else(|e| e.into_inner());
    if slot.is_none() {
        *slot = Some(MitmEngine::new(table));
    }
    Ok(rebuilt)
}

/// Slot a prepared engine value into the process-wide slot, replacing any
/// existing one. Lets embedders and test harnesses supply their own table
/// and filter without touching the filesystem.
pub fn install_mitm(engine: MitmEngine) {
    let mut slot = ENGINE.write().unwrap_or_else(|e| e.into_inner());
    *slot = Some(engine);
}

/// True when the MITM engine is ready for queries.
pub fn mitm_ready() -> bool {
    ENGINE.read().unwrap_or_else(|e| e.into_inner()).is_some()
}

/// Release the table buffer. Queries fail with `NotInitialized` until the
/// next [`init_mitm`].
pub fn shutdown_mitm() {
    let mut slot = ENGINE.write().unwrap_or_else(|e| e.into_inner());
    *slot = None;
}

/// Replace the plausibility filter of the initialized engine.
pub fn set_mitm_filter(filter: UidFilter) -> Result<()> {
    let mut slot = ENGINE.write().unwrap_or_else(|e| e.into_inner());
    match slot.as_mut() {
        Some(engine) => {
            engine.set_filter(filter);
            Ok(())
        }
        None => Err(EngineError::NotInitialized),
    }
}

/// The minimum legacy UID matching `fingerprint`, or 0 when none does.
pub fn crack_legacy(fingerprint: &str, workers: usize) -> Result<u64> {
    let target = parse_fingerprint(fingerprint)?;
    Ok(brute::find_min(target, workers))
}

/// Every legacy UID matching `fingerprint`, deduplicated and ascending.
pub fn crack_legacy_all(fingerprint: &str, workers: usize) -> Result<Vec<u64>> {
    let target = parse_fingerprint(fingerprint)?;
    let mut candidates = brute::find_all(target, workers);
    candidates.sort_unstable();
    candidates.dedup();
    Ok(candidates)
}

/// Run the meet-in-the-middle scan against the initialized engine.
pub fn crack_mitm(fingerprint: &str) -> Result<MitmScan> {
    let target = parse_fingerprint(fingerprint)?;
    let slot = ENGINE.read().unwrap_or_else(|e| e.into_inner());
    match slot.as_ref() {
        Some(engine) => Ok(engine.scan(target)),
        None => Err(EngineError::NotInitialized),
    }
}

/// Crack with automatic strategy selection.
///
/// Runs the legacy scan first and asks `verifier` whether any hit is a
/// real, existing UID (an upstream directory check, typically). When none
/// is, initializes the MITM engine if needed (building the table on first
/// use) and merges its candidates in. The result is always deduplicated
/// and ascending.
pub fn crack_auto<F>(
    fingerprint: &str,
    workers: usize,
    cache_path: Option<&Path>,
    verifier: F,
) -> Result<CrackOutcome>
where
    F: Fn(u64) -> bool,
{
    let target = parse_fingerprint(fingerprint)?;

    let mut legacy = brute::find_all(target, workers);
    legacy.sort_unstable();
    legacy.dedup();

    if legacy.iter().any(|&uid| verifier(uid)) {
        return Ok(CrackOutcome {
            candidates: legacy,
            strategy: Strategy::Legacy,
            truncated: false,
        });
    }

    if !mitm_ready() {
        init_mitm(cache_path)?;
    }
    let scan = {
        let slot = ENGINE.read().unwrap_or_else(|e| e.into_inner());
        match slot.as_ref() {
            Some(engine) => engine.scan(target),
            None => return Err(EngineError::NotInitialized),
        }
    };

    let mut candidates = legacy;
    candidates.extend_from_slice(&scan.candidates);
    candidates.sort_unstable();
    candidates.dedup();

    Ok(CrackOutcome {
        candidates,
        strategy: Strategy::Mitm,
        truncated: scan.truncated,
    })
}
