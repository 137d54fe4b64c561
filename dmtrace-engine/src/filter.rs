//! Plausibility filtering for reassembled UIDs.
//!
//! The meet-in-the-middle join produces every 16-digit integer whose CRC
//! matches, which is far more than the registry ever issued. This filter
//! prunes the join output to UIDs that could actually exist: the legacy
//! band, plus the modern 16-digit band restricted to an allow-table of
//! observed `(prefix, sub)` pairs.
//!
//! The table is data, not policy. It was derived from observed samples and
//! will grow as new prefixes appear, so it lives in a plain rule vector
//! that callers can replace wholesale (e.g. from a rules file) without
//! touching code.

use std::ops::RangeInclusive;

/// Upper bound (inclusive) of the legacy UID band.
pub const LEGACY_UID_MAX: u64 = 2_200_000_000;

/// Lower bound (inclusive) of the modern 16-digit band.
pub const MODERN_UID_MIN: u64 = 1_000_000_000_000_000;

/// Upper bound (exclusive) of the modern 16-digit band.
pub const MODERN_UID_END: u64 = 10_000_000_000_000_000;

/// One allow-table row: a 4-digit prefix and its admitted 2-digit subs.
///
/// For a modern UID, `prefix = U / 10^12` and `sub = (U / 10^10) % 100`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefixRule {
    /// The leading four digits.
    pub prefix: u16,
    /// Admitted values of the following two digits.
    pub subs: Vec<RangeInclusive<u8>>,
}

/// The UID plausibility predicate.
#[derive(Debug, Clone)]
pub struct UidFilter {
    rules: Vec<PrefixRule>,
}

impl UidFilter {
    /// The shipped allow-table of observed modern-band prefixes.
    pub fn builtin() -> Self {
        Self::from_rules(vec![
            PrefixRule {
                prefix: 3461,
                subs: vec![56..=58],
            },
            PrefixRule {
                prefix: 3492,
                subs: vec![97..=97],
            },
            PrefixRule {
                prefix: 3493,
                subs: vec![7..=14, 25..=29],
            },
            PrefixRule {
                prefix: 3494,
                subs: vec![35..=38],
            },
            PrefixRule {
                prefix: 3536,
                subs: vec![99..=99],
            },
            PrefixRule {
                prefix: 3537,
                subs: vec![10..=12],
            },
            PrefixRule {
                prefix: 3546,
                subs: vec![37..=37, 92..=92],
            },
        ])
    }

    /// Build a filter from an arbitrary rule set.
    pub fn from_rules(mut rules: Vec<PrefixRule>) -> Self {
        rules.sort_by_key(|r| r.prefix);
        Self { rules }
    }

    /// The active rule set, sorted by prefix.
    pub fn rules(&self) -> &[PrefixRule] {
        &self.rules
    }

    /// Whether `uid` could plausibly have been issued.
    ///
    /// Accepts the legacy band unconditionally and the modern band only
    /// when its `(prefix, sub)` pair is allowed. Everything else, including
    /// 11-15 digit values, is rejected.
    pub fn is_plausible(&self, uid: u64) -> bool {
        if (1..=LEGACY_UID_MAX).contains(&uid) {
            return true;
        }
        if !(MODERN_UID_MIN..MODERN_UID_END).contains(&uid) {
            return false;
        }

        let prefix = (uid / 1_000_000_000_000) as u16;
        let sub = ((uid / 10_000_000_000) % 100) as u8;
        match self.rules.binary_search_by_key(&prefix, |r| r.prefix) {
            Ok(i) => self.rules[i].subs.iter().any(|range| range.contains(&sub)),
            Err(_) => false,
        }
    }
}

impl Default for UidFilter {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legacy_band_bounds() {
        let filter = UidFilter::builtin();
        assert!(!filter.is_plausible(0));
        assert!(filter.is_plausible(1));
        assert!(filter.is_plausible(2_200_000_000));
        assert!(!filter.is_plausible(2_200_000_001));
    }

    #[test]
    fn test_mid_width_uids_rejected() {
        let filter = UidFilter::builtin();
        // widths 11 through 15
        for uid in [
            10_000_000_000u64,
            100_000_000_000,
            1_000_000_000_000,
            10_000_000_000_000,
            999_999_999_999_999,
        ] {
            assert!(!filter.is_plausible(uid), "uid {}", uid);
        }
    }

    #[test]
    fn test_modern_band_known_uid() {
        let filter = UidFilter::builtin();
        // prefix 3546, sub 92
        assert!(filter.is_plausible(3_546_921_440_381_311));
        // prefix 3546, sub 37
        assert!(filter.is_plausible(3_546_370_000_000_000));
        // prefix 3546, sub 50 is not allowed
        assert!(!filter.is_plausible(3_546_500_000_000_000));
    }

    #[test]
    fn test_modern_band_range_edges() {
        let filter = UidFilter::builtin();
        assert!(filter.is_plausible(3_461_560_000_000_000));
        assert!(filter.is_plausible(3_461_580_000_000_000));
        assert!(!filter.is_plausible(3_461_550_000_000_000));
        assert!(!filter.is_plausible(3_461_590_000_000_000));

        // 3493 has two disjoint sub ranges
        assert!(filter.is_plausible(3_493_070_000_000_000));
        assert!(filter.is_plausible(3_493_270_000_000_000));
        assert!(!filter.is_plausible(3_493_200_000_000_000));
    }

    #[test]
    fn test_unknown_prefix_rejected() {
        let filter = UidFilter::builtin();
        assert!(!filter.is_plausible(1_234_000_000_000_000));
        assert!(!filter.is_plausible(9_999_999_999_999_999));
    }

    #[test]
    fn test_band_end_rejected() {
        let filter = UidFilter::builtin();
        assert!(!filter.is_plausible(10_000_000_000_000_000));
        assert!(!filter.is_plausible(u64::MAX));
    }

    #[test]
    fn test_custom_rules_replace_builtin() {
        let filter = UidFilter::from_rules(vec![PrefixRule {
            prefix: 1234,
            subs: vec![0..=99],
        }]);
        assert!(filter.is_plausible(1_234_000_000_000_000));
        // builtin prefixes no longer apply
        assert!(!filter.is_plausible(3_546_921_440_381_311));
        // legacy band is structural, not rule-driven
        assert!(filter.is_plausible(42));
    }

    #[test]
    fn test_empty_rules_keep_legacy_band() {
        let filter = UidFilter::from_rules(Vec::new());
        assert!(filter.is_plausible(1_000_000));
        assert!(!filter.is_plausible(3_546_921_440_381_311));
    }
}
