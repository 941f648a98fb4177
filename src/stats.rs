//! Aggregates over the session log.

use serde::Serialize;

use crate::sessions::SessionRecord;

/// Number of bars in the duration chart.
pub const DURATION_BINS: usize = 10;

/// Games played, highest score and mean score.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Summary {
    pub total_games: usize,
    pub highest_score: u32,
    pub average_score: f64,
}

impl Summary {
    /// All zero for an empty slice.
    pub fn from_records(records: &[SessionRecord]) -> Self {
        if records.is_empty() {
            return Self::default();
        }
        let total: u64 = records.iter().map(|r| u64::from(r.score)).sum();
        Self {
            total_games: records.len(),
            highest_score: records.iter().map(|r| r.score).max().unwrap_or(0),
            average_score: total as f64 / records.len() as f64,
        }
    }

    /// Average with two decimals, as shown on screen.
    pub fn average_label(&self) -> String {
        format!("{:.2}", self.average_score)
    }
}

/// Equal-width histogram over `[min, max]`; the last bin is closed.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    pub lo: f64,
    pub hi: f64,
    pub counts: Vec<usize>,
}

impl Histogram {
    /// `None` when `values` is empty or `bins` is zero. Non-finite values are ignored.
    pub fn new(values: &[f64], bins: usize) -> Option<Self> {
        let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        if finite.is_empty() || bins == 0 {
            return None;
        }
        let mut lo = finite.iter().copied().fold(f64::INFINITY, f64::min);
        let mut hi = finite.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        if lo == hi {
            lo -= 0.5;
            hi += 0.5;
        }

        let width = (hi - lo) / bins as f64;
        let mut counts = vec![0; bins];
        for v in finite {
            let idx = (((v - lo) / width) as usize).min(bins - 1);
            counts[idx] += 1;
        }
        Some(Self { lo, hi, counts })
    }

    pub fn bins(&self) -> usize {
        self.counts.len()
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    pub fn max_count(&self) -> usize {
        self.counts.iter().copied().max().unwrap_or(0)
    }

    /// Lower and upper edge of bin `i`.
    pub fn bin_edges(&self, i: usize) -> (f64, f64) {
        let width = (self.hi - self.lo) / self.bins() as f64;
        (self.lo + width * i as f64, self.lo + width * (i + 1) as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::time::Duration;

    fn records(scores: &[u32]) -> Vec<SessionRecord> {
        scores
            .iter()
            .map(|&s| SessionRecord {
                timestamp: None,
                score: s,
                duration_seconds: 1.0 + f64::from(s),
            })
            .collect()
    }

    #[test]
    fn empty_log_summary_is_zero() {
        let summary = Summary::from_records(&[]);
        assert_eq!(summary, Summary::default());
        assert_eq!(summary.average_label(), "0.00");
    }

    #[test]
    fn summary_of_known_scores() {
        let summary = Summary::from_records(&records(&[3, 10, 2]));
        assert_eq!(summary.total_games, 3);
        assert_eq!(summary.highest_score, 10);
        assert_eq!(summary.average_label(), "5.00");
    }

    #[test]
    fn new_record_uses_its_duration() {
        let r = SessionRecord::new(4, Duration::from_secs(3));
        assert_eq!(r.duration_seconds, 3.0);
        assert!(r.timestamp.is_some());
    }

    #[test]
    fn histogram_of_nothing_is_none() {
        assert!(Histogram::new(&[], DURATION_BINS).is_none());
        assert!(Histogram::new(&[1.0], 0).is_none());
    }

    #[test]
    fn histogram_places_max_in_last_bin() {
        let h = Histogram::new(&[0.0, 5.0, 10.0], 10).unwrap();
        assert_eq!(h.lo, 0.0);
        assert_eq!(h.hi, 10.0);
        assert_eq!(h.counts[0], 1);
        assert_eq!(h.counts[5], 1);
        assert_eq!(h.counts[9], 1);
        assert_eq!(h.bin_edges(9), (9.0, 10.0));
    }

    #[test]
    fn histogram_widens_degenerate_range() {
        let h = Histogram::new(&[4.0, 4.0], 10).unwrap();
        assert_eq!((h.lo, h.hi), (3.5, 4.5));
        assert_eq!(h.total(), 2);
        assert_eq!(h.max_count(), 2);
    }

    proptest! {
        #[test]
        fn summary_matches_max_and_mean(
            scores in proptest::collection::vec(0u32..10_000, 1..200)
        ) {
            let summary = Summary::from_records(&records(&scores));
            let max = *scores.iter().max().unwrap();
            let mean = scores.iter().map(|&s| f64::from(s)).sum::<f64>() / scores.len() as f64;
            prop_assert_eq!(summary.total_games, scores.len());
            prop_assert_eq!(summary.highest_score, max);
            prop_assert!((summary.average_score - mean).abs() < 1e-9);
        }

        #[test]
        fn histogram_counts_every_value(
            values in proptest::collection::vec(0.0f64..600.0, 1..300)
        ) {
            let h = Histogram::new(&values, DURATION_BINS).unwrap();
            prop_assert_eq!(h.bins(), DURATION_BINS);
            prop_assert_eq!(h.total(), values.len());
        }
    }
}
