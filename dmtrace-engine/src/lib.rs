//! # dmtrace Engine
//!
//! The CRC32 inversion engine: given an 8-hex-digit fingerprint produced by
//! hashing a UID's decimal ASCII form, recover every UID that could have
//! produced it.
//!
//! Two strategies cover the two bands UIDs live in:
//!
//! - [`brute`]: a multithreaded exhaustive scan of `[0, 5·10^9)` for legacy
//!   UIDs (at most ~10 digits)
//! - [`mitm`]: a meet-in-the-middle scan for modern 16-digit UIDs, joining
//!   8-digit halves through the precomputed [`table`] and the GF(2) shift
//!   operator, pruned by the [`filter`]
//!
//! The [`engine`] module is the driver: fingerprint normalization, the
//! process-wide engine lifecycle, and strategy selection.
//!
//! Candidates are a *set*: CRC-32 collides, so the engine never promises a
//! unique answer, only that every returned UID hashes back to the
//! fingerprint exactly. Whether a candidate exists upstream is the
//! caller's oracle to consult.
//!
//! ## Example
//!
//! ```rust,no_run
//! use dmtrace_engine::engine;
//!
//! // Legacy scan needs no state.
//! let uid = engine::crack_legacy("bc28c067", 8)?;
//!
//! // The MITM scan wants its table built (or loaded) first.
//! engine::init_mitm(None)?;
//! let scan = engine::crack_mitm("90a567c7")?;
//! assert!(scan.candidates.contains(&3546921440381311));
//! engine::shutdown_mitm();
//! # Ok::<(), dmtrace_engine::EngineError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod brute;
pub mod engine;
pub mod error;
pub mod filter;
pub mod mitm;
pub mod table;

// Re-exports for convenience
pub use engine::{CrackOutcome, Strategy, normalize_fingerprint, parse_fingerprint};
pub use error::{EngineError, Result};
pub use filter::{PrefixRule, UidFilter};
pub use mitm::{MitmEngine, MitmScan};
pub use table::{LowEntry, LowHalfTable};
