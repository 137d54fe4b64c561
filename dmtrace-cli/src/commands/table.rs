//! Table cache management commands.

use crate::utils::create_spinner;
use dmtrace_engine::table::{CACHE_MAGIC, CACHE_VERSION, LowHalfTable, TABLE_ENTRIES};
use std::error::Error;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Build the low-half table and write the cache file.
///
/// Without `--force` an existing, valid cache is left alone.
pub fn cmd_table_build(output: &Path, force: bool, progress: bool) -> Result<(), Box<dyn Error>> {
    if force {
        let spinner = create_spinner("building low-half table...", progress);
        let table = LowHalfTable::build();
        table.save(output)?;
        spinner.finish_and_clear();
        println!(
            "Built {} entries -> {} (version {})",
            table.len(),
            output.display(),
            CACHE_VERSION
        );
        return Ok(());
    }

    let spinner = create_spinner("loading or building low-half table...", progress);
    let (table, rebuilt) = LowHalfTable::load_or_build(output)?;
    spinner.finish_and_clear();
    if rebuilt {
        println!(
            "Built {} entries -> {} (version {})",
            table.len(),
            output.display(),
            CACHE_VERSION
        );
    } else {
        println!("Cache is up to date: {} entries", table.len());
    }
    Ok(())
}

/// Print the header and size of a cache file without loading it.
pub fn cmd_table_info(path: &Path) -> Result<(), Box<dyn Error>> {
    let metadata = std::fs::metadata(path)?;
    let mut header = [0u8; 8];
    File::open(path)?.read_exact(&mut header)?;

    let magic = u32::from_le_bytes([header[0], header[1], header[2], header[3]]);
    let version = u32::from_le_bytes([header[4], header[5], header[6], header[7]]);
    let payload = metadata.len().saturating_sub(8);

    println!("Cache file: {}", path.display());
    println!("Size: {} bytes", metadata.len());
    println!(
        "Magic: {:#010x} ({})",
        magic,
        if magic == CACHE_MAGIC { "ok" } else { "WRONG" }
    );
    println!(
        "Version: {} ({})",
        version,
        if version == CACHE_VERSION {
            "ok"
        } else {
            "unsupported"
        }
    );

    if payload % 8 == 0 {
        let entries = payload / 8;
        println!(
            "Entries: {}{}",
            entries,
            if entries == TABLE_ENTRIES as u64 {
                ""
            } else {
                " (partial table)"
            }
        );
    } else {
        println!("Entries: misaligned payload ({} bytes)", payload);
    }

    if magic != CACHE_MAGIC || version != CACHE_VERSION {
        println!("This file will be treated as absent and rebuilt on next use.");
    }

    Ok(())
}
