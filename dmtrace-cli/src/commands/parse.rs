//! Parse command implementation.
//!
//! Decodes a danmaku segment file from disk and optionally cracks each
//! record's fingerprint. This is the offline half of the original tracing
//! flow: fetching segments is someone else's job, everything after the
//! bytes land is handled here.

use crate::commands::crack::{CrackStrategy, run_strategy};
use dmtrace_engine::engine;
use dmtrace_proto::SegmentIter;
use std::collections::HashSet;
use std::error::Error;
use std::path::Path;

pub fn cmd_parse(
    file: &Path,
    search: Option<&str>,
    crack: bool,
    strategy: CrackStrategy,
    workers: usize,
    table_path: Option<&Path>,
    rules: Option<&Path>,
    dedup: bool,
    limit: Option<usize>,
    progress: bool,
) -> Result<(), Box<dyn Error>> {
    let data = std::fs::read(file)?;

    let mut decoded = 0usize;
    let mut shown = 0usize;
    let mut seen_ids = HashSet::new();

    for elem in SegmentIter::new(&data) {
        // a decode error ends the segment: alignment is already lost
        let elem = elem?;
        decoded += 1;

        if dedup && !seen_ids.insert(elem.id) {
            continue;
        }
        if let Some(keyword) = search {
            if !elem.content.contains(keyword) {
                continue;
            }
        }

        println!("#{} ({})", elem.id, elem.ctime);
        println!("  content: {}", elem.content);

        match engine::normalize_fingerprint(&elem.mid_hash) {
            Ok(normalized) => {
                if normalized == elem.mid_hash {
                    println!("  hash: {}", normalized);
                } else {
                    // the wire encoder drops leading zeros
                    println!("  hash: {} -> {}", elem.mid_hash, normalized);
                }

                if crack {
                    let run = run_strategy(
                        &normalized,
                        strategy,
                        workers,
                        table_path,
                        rules,
                        progress,
                    )?;
                    if run.truncated {
                        eprintln!("warning: candidate cap reached, list is incomplete");
                    }
                    if run.candidates.is_empty() {
                        println!("  uid: not found ({})", run.strategy);
                    } else {
                        for uid in &run.candidates {
                            println!("  uid: {} ({})", uid, run.strategy);
                        }
                    }
                }
            }
            Err(e) => {
                println!("  hash: malformed ({})", e);
            }
        }

        shown += 1;
        if let Some(limit) = limit {
            if shown >= limit {
                break;
            }
        }
    }

    println!();
    println!("{} records decoded, {} shown", decoded, shown);
    Ok(())
}
