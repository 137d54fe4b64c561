//! Utility functions for the CLI.

use dmtrace_engine::{PrefixRule, UidFilter};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Deserialize;
use std::error::Error;
use std::path::Path;
use std::time::Duration;

/// Create a spinner with standard styling.
///
/// The scans don't expose per-iteration progress, so a steady-tick spinner
/// with an elapsed clock is the honest display.
pub fn create_spinner(message: &str, enable: bool) -> ProgressBar {
    if !enable {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} [{elapsed_precise}] {msg}")
            .expect("spinner template is valid"),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// One row of a JSON rules file: `{"prefix": 3546, "subs": [[37, 37], [92, 92]]}`.
#[derive(Debug, Deserialize)]
struct RuleEntry {
    prefix: u16,
    subs: Vec<[u8; 2]>,
}

/// Load a plausibility-filter rule set from a JSON file.
///
/// The file is an array of `{prefix, subs}` objects where each sub is an
/// inclusive `[lo, hi]` pair. This replaces the built-in allow-table
/// wholesale, so a rules file must carry every prefix it wants admitted.
pub fn load_rules(path: &Path) -> Result<UidFilter, Box<dyn Error>> {
    let text = std::fs::read_to_string(path)?;
    let entries: Vec<RuleEntry> = serde_json::from_str(&text)?;
    let rules = entries
        .into_iter()
        .map(|entry| PrefixRule {
            prefix: entry.prefix,
            subs: entry.subs.into_iter().map(|[lo, hi]| lo..=hi).collect(),
        })
        .collect();
    Ok(UidFilter::from_rules(rules))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("dmtrace-cli-{}-{}", std::process::id(), name))
    }

    #[test]
    fn test_load_rules() {
        let path = temp_path("rules.json");
        std::fs::write(
            &path,
            r#"[{"prefix": 1234, "subs": [[0, 10], [50, 50]]}]"#,
        )
        .unwrap();

        let filter = load_rules(&path).unwrap();
        assert!(filter.is_plausible(1_234_050_000_000_000));
        assert!(!filter.is_plausible(1_234_490_000_000_000));

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_load_rules_rejects_garbage() {
        let path = temp_path("garbage.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(load_rules(&path).is_err());
        std::fs::remove_file(&path).unwrap();
    }
}
