/// Admission aggregate range taken from the register's `CUTOFF` column.
///
/// Only the upper bound gates eligibility: BECE aggregates are better when
/// lower, so a student qualifies when their aggregate does not exceed it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CutoffRange {
    pub low: Option<f64>,
    pub high: f64,
}

impl CutoffRange {
    /// Parse `"low-high"`. Text without a dash or with a non-numeric upper
    /// bound yields `None`, which callers treat as unconstrained.
    pub fn parse(raw: &str) -> Option<Self> {
        let mut parts = raw.split('-');
        let low = parts.next()?;
        let high = parse_bound(parts.next()?)?;

        Some(Self {
            low: parse_bound(low),
            high,
        })
    }

    pub fn admits(&self, aggregate: u8) -> bool {
        f64::from(aggregate) <= self.high
    }
}

/// Whether a record's optional cutoff admits `aggregate`.
pub(crate) fn admits(cutoff: Option<&str>, aggregate: u8) -> bool {
    cutoff
        .and_then(CutoffRange::parse)
        .map_or(true, |range| range.admits(aggregate))
}

fn parse_bound(value: &str) -> Option<f64> {
    let parsed = value.trim().parse::<f64>().ok()?;
    parsed.is_finite().then_some(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_low_high() {
        let range = CutoffRange::parse("6-30").expect("range");
        assert_eq!(range.low, Some(6.0));
        assert_eq!(range.high, 30.0);
        assert!(range.admits(30));
        assert!(!range.admits(31));
    }

    #[test]
    fn tolerates_spacing_and_decimals() {
        let range = CutoffRange::parse(" 8 - 14.0 ").expect("range");
        assert!(range.admits(14));
        assert!(!range.admits(15));
    }

    #[test]
    fn malformed_values_are_unconstrained() {
        assert!(CutoffRange::parse("N/A").is_none());
        assert!(CutoffRange::parse("6-").is_none());
        assert!(CutoffRange::parse("6-thirty").is_none());
        assert!(admits(Some("N/A"), 30));
        assert!(admits(Some("six-ten"), 30));
        assert!(admits(None, 30));
    }

    #[test]
    fn only_second_segment_is_the_upper_bound() {
        let range = CutoffRange::parse("6-12-20").expect("range");
        assert_eq!(range.high, 12.0);
        assert!(!admits(Some("6-12-20"), 13));
    }

    #[test]
    fn missing_lower_bound_still_gates() {
        assert!(!admits(Some("-10"), 11));
        assert!(admits(Some("x-10"), 10));
    }
}
