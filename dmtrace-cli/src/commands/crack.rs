//! Crack command implementation.

use crate::utils::{create_spinner, load_rules};
use dmtrace_engine::engine;
use serde::Serialize;
use std::error::Error;
use std::path::Path;

/// Cracking strategy selected on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrackStrategy {
    /// Legacy scan first, meet-in-the-middle fallback.
    Auto,
    /// Exhaustive scan of the legacy band only.
    Legacy,
    /// Meet-in-the-middle scan only.
    Mitm,
}

/// The settled result of one fingerprint, ready for reporting.
pub(crate) struct StrategyRun {
    pub candidates: Vec<u64>,
    pub strategy: &'static str,
    pub truncated: bool,
}

/// Make sure the MITM engine is up, loading or building the table and
/// installing a rules file when one was given.
pub(crate) fn ensure_mitm(
    table_path: Option<&Path>,
    rules: Option<&Path>,
    progress: bool,
) -> Result<(), Box<dyn Error>> {
    if !engine::mitm_ready() {
        let spinner = create_spinner("loading low-half table...", progress);
        let rebuilt = engine::init_mitm(table_path)?;
        spinner.finish_with_message(if rebuilt {
            "low-half table built and cached"
        } else {
            "low-half table loaded from cache"
        });
    }
    if let Some(path) = rules {
        engine::set_mitm_filter(load_rules(path)?)?;
    }
    Ok(())
}

/// Run `strategy` against an already-normalized fingerprint.
pub(crate) fn run_strategy(
    normalized: &str,
    strategy: CrackStrategy,
    workers: usize,
    table_path: Option<&Path>,
    rules: Option<&Path>,
    progress: bool,
) -> Result<StrategyRun, Box<dyn Error>> {
    match strategy {
        CrackStrategy::Legacy => {
            let spinner = create_spinner("scanning legacy band...", progress);
            let candidates = engine::crack_legacy_all(normalized, workers)?;
            spinner.finish_and_clear();
            Ok(StrategyRun {
                candidates,
                strategy: "legacy",
                truncated: false,
            })
        }
        CrackStrategy::Mitm => {
            ensure_mitm(table_path, rules, progress)?;
            let spinner = create_spinner("meet-in-the-middle scan...", progress);
            let scan = engine::crack_mitm(normalized)?;
            spinner.finish_and_clear();
            Ok(StrategyRun {
                candidates: scan.candidates,
                strategy: "mitm",
                truncated: scan.truncated,
            })
        }
        CrackStrategy::Auto => {
            // install the rules before the fallback can lazily initialize
            if rules.is_some() {
                ensure_mitm(table_path, rules, progress)?;
            }
            let spinner = create_spinner("cracking...", progress);
            // offline: any legacy hit settles the answer
            let outcome = engine::crack_auto(normalized, workers, table_path, |_| true)?;
            spinner.finish_and_clear();
            Ok(StrategyRun {
                candidates: outcome.candidates,
                strategy: match outcome.strategy {
                    engine::Strategy::Legacy => "legacy",
                    engine::Strategy::Mitm => "mitm",
                },
                truncated: outcome.truncated,
            })
        }
    }
}

#[derive(Serialize)]
struct CrackReport<'a> {
    fingerprint: &'a str,
    strategy: &'a str,
    candidates: &'a [u64],
    truncated: bool,
}

pub fn cmd_crack(
    fingerprint: &str,
    strategy: CrackStrategy,
    workers: usize,
    table_path: Option<&Path>,
    rules: Option<&Path>,
    json: bool,
    progress: bool,
) -> Result<(), Box<dyn Error>> {
    let normalized = engine::normalize_fingerprint(fingerprint)?;
    let run = run_strategy(
        &normalized,
        strategy,
        workers,
        table_path,
        rules,
        progress && !json,
    )?;

    if json {
        let report = CrackReport {
            fingerprint: &normalized,
            strategy: run.strategy,
            candidates: &run.candidates,
            truncated: run.truncated,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    if run.truncated {
        eprintln!("warning: candidate cap reached, list is incomplete");
    }

    println!("Fingerprint: {}", normalized);
    println!("Strategy: {}", run.strategy);
    if run.candidates.is_empty() {
        println!("No matching UID found.");
    } else {
        println!("Candidates: {}", run.candidates.len());
        for (i, uid) in run.candidates.iter().enumerate() {
            println!("  {}. {}", i + 1, uid);
        }
    }

    Ok(())
}
