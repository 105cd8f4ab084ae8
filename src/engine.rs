//! Filter and derivation engine
//!
//! `evaluate` is a pure function over the current snapshot, an optional
//! baseline lookup, and the filter parameters. It derives total cost and
//! profit margin per row, annotates price trends against the baseline when
//! one is available, and returns the rows passing every active filter in
//! their original order. Nothing here touches the filesystem or mutates its
//! inputs, so the same arguments always produce the same result.

use std::collections::BTreeSet;
use std::fmt;

use crate::error::{PipelineError, Result};
use crate::history::BaselineLookup;
use crate::snapshot::CardRecord;

/// User-adjustable filter parameters
///
/// Defaults mirror the dashboard's widget defaults. The empty collections and
/// empty query mean "no restriction".
#[derive(Debug, Clone)]
pub struct FilterParams {
    /// Grading service fee added to every raw price
    pub grading_fee: f64,
    /// Maximum raw acquisition price
    pub max_raw_price: f64,
    /// Maximum graded resale price
    pub max_graded_price: f64,
    /// Minimum profit margin
    pub min_profit_margin: f64,
    /// Restrict to these (normalized) set names; empty = all sets
    pub allowed_sets: BTreeSet<String>,
    /// Card name must contain at least one of these, case-insensitive
    pub name_substrings: Vec<String>,
    /// Card name must contain this, case-insensitive
    pub name_query: String,
    /// Prefix stripped from set names before matching, case-insensitive
    pub set_prefix: String,
}

impl Default for FilterParams {
    fn default() -> Self {
        Self {
            grading_fee: crate::constants::DEFAULT_GRADING_FEE,
            max_raw_price: crate::constants::DEFAULT_MAX_RAW_PRICE,
            max_graded_price: crate::constants::DEFAULT_MAX_GRADED_PRICE,
            min_profit_margin: crate::constants::DEFAULT_MIN_PROFIT_MARGIN,
            allowed_sets: BTreeSet::new(),
            name_substrings: Vec::new(),
            name_query: String::new(),
            set_prefix: crate::constants::DEFAULT_SET_PREFIX.to_string(),
        }
    }
}

impl FilterParams {
    /// Check every parameter against its declared domain
    fn validate(&self) -> Result<()> {
        for (label, value) in [
            ("grading_fee", self.grading_fee),
            ("max_raw_price", self.max_raw_price),
            ("max_graded_price", self.max_graded_price),
            ("min_profit_margin", self.min_profit_margin),
        ] {
            if !value.is_finite() {
                return Err(PipelineError::InvalidParameter(format!(
                    "{label} must be a number, got {value}"
                )));
            }
        }
        for (label, value) in [
            ("grading_fee", self.grading_fee),
            ("max_raw_price", self.max_raw_price),
            ("max_graded_price", self.max_graded_price),
        ] {
            if value < 0.0 {
                return Err(PipelineError::InvalidParameter(format!(
                    "{label} must be >= 0, got {value}"
                )));
            }
        }
        Ok(())
    }
}

/// Price direction between baseline and current snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    Up,
    Down,
    Flat,
    Unknown,
}

impl Trend {
    /// Compare a current price against its baseline
    ///
    /// Exact f64 equality for FLAT, no epsilon: both values come from parsed
    /// decimal text, so identical text yields identical floats.
    pub fn compare(current: f64, previous: Option<f64>) -> Trend {
        match previous {
            None => Trend::Unknown,
            Some(prev) if current > prev => Trend::Up,
            Some(prev) if current < prev => Trend::Down,
            _ => Trend::Flat,
        }
    }
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Trend::Up => write!(f, "UP"),
            Trend::Down => write!(f, "DOWN"),
            Trend::Flat => write!(f, "FLAT"),
            Trend::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

/// A card row with derived columns, ready for display or export
#[derive(Debug, Clone)]
pub struct DerivedRecord {
    pub name: String,
    /// Set name after prefix normalization
    pub set_name: Option<String>,
    pub raw_price: f64,
    pub graded_price: f64,
    /// raw_price + grading_fee
    pub total_cost: f64,
    /// graded_price - total_cost
    pub profit_margin: f64,
    /// None when no baseline was available
    pub raw_trend: Option<Trend>,
    pub graded_trend: Option<Trend>,
}

/// Strip a known prefix from a set name, case-insensitively
///
/// Only the exact prefix is removed; the remainder is left untouched.
fn normalize_set_name(set_name: &str, prefix: &str) -> String {
    if prefix.is_empty() {
        return set_name.to_string();
    }
    // get() rather than slicing: prefix.len() may not land on a char
    // boundary in multibyte set names
    match set_name.get(..prefix.len()) {
        Some(head) if head.eq_ignore_ascii_case(prefix) => set_name[prefix.len()..].to_string(),
        _ => set_name.to_string(),
    }
}

/// Case-insensitive substring containment
fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Run the filtering-and-derivation pipeline over the current snapshot
///
/// Rows missing either required price are dropped before derivation. Trends
/// are computed only when a baseline lookup is supplied; a name absent from
/// the baseline gets `Trend::Unknown` rather than failing. The output
/// preserves the input order, and an empty result is not an error.
pub fn evaluate(
    current: &[CardRecord],
    baseline: Option<&BaselineLookup>,
    params: &FilterParams,
) -> Result<Vec<DerivedRecord>> {
    params.validate()?;

    let mut results = Vec::new();

    for row in current {
        // Rows without a usable name or both prices never reach derivation
        if row.name.trim().is_empty() {
            continue;
        }
        let (Some(raw_price), Some(graded_price)) = (row.raw_price, row.graded_price) else {
            continue;
        };

        let set_name = row
            .set_name
            .as_deref()
            .map(|s| normalize_set_name(s, &params.set_prefix));

        let total_cost = raw_price + params.grading_fee;
        let profit_margin = graded_price - total_cost;

        let (raw_trend, graded_trend) = match baseline {
            Some(lookup) => match lookup.get(&row.name) {
                Some(prev) => (
                    Some(Trend::compare(raw_price, prev.raw)),
                    Some(Trend::compare(graded_price, prev.graded)),
                ),
                None => (Some(Trend::Unknown), Some(Trend::Unknown)),
            },
            None => (None, None),
        };

        if raw_price > params.max_raw_price {
            continue;
        }
        if graded_price > params.max_graded_price {
            continue;
        }
        if profit_margin < params.min_profit_margin {
            continue;
        }
        if !params.allowed_sets.is_empty() {
            match &set_name {
                Some(set) if params.allowed_sets.contains(set) => {}
                _ => continue,
            }
        }
        if !params.name_substrings.is_empty()
            && !params
                .name_substrings
                .iter()
                .any(|s| contains_ignore_case(&row.name, s))
        {
            continue;
        }
        if !params.name_query.is_empty() && !contains_ignore_case(&row.name, &params.name_query) {
            continue;
        }

        results.push(DerivedRecord {
            name: row.name.clone(),
            set_name,
            raw_price,
            graded_price,
            total_cost,
            profit_margin,
            raw_trend,
            graded_trend,
        });
    }

    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::BaselinePrice;

    fn card(name: &str, raw: f64, graded: f64) -> CardRecord {
        CardRecord {
            name: name.to_string(),
            set_name: None,
            raw_price: Some(raw),
            graded_price: Some(graded),
            as_of: None,
        }
    }

    fn card_in_set(name: &str, set: &str, raw: f64, graded: f64) -> CardRecord {
        CardRecord {
            set_name: Some(set.to_string()),
            ..card(name, raw, graded)
        }
    }

    fn open_params() -> FilterParams {
        FilterParams {
            grading_fee: 0.0,
            max_raw_price: f64::MAX,
            max_graded_price: f64::MAX,
            min_profit_margin: f64::MIN,
            ..FilterParams::default()
        }
    }

    #[test]
    fn test_margin_arithmetic_includes_row() {
        // raw 10 + fee 20 = cost 30; margin 100 - 30 = 70 >= 50
        let params = FilterParams {
            grading_fee: 20.0,
            max_raw_price: 25.0,
            max_graded_price: 200.0,
            min_profit_margin: 50.0,
            ..FilterParams::default()
        };

        let results = evaluate(&[card("A", 10.0, 100.0)], None, &params).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].total_cost, 30.0);
        assert_eq!(results[0].profit_margin, 70.0);
        assert_eq!(results[0].raw_trend, None);
        assert_eq!(results[0].graded_trend, None);
    }

    #[test]
    fn test_stricter_margin_excludes_without_error() {
        let params = FilterParams {
            grading_fee: 20.0,
            max_raw_price: 25.0,
            max_graded_price: 200.0,
            min_profit_margin: 80.0,
            ..FilterParams::default()
        };

        let results = evaluate(&[card("A", 10.0, 100.0)], None, &params).unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn test_set_filter_overrides_price_filters() {
        let params = FilterParams {
            allowed_sets: BTreeSet::from(["Base Set".to_string()]),
            ..open_params()
        };

        let rows = [
            card_in_set("A", "Jungle", 1.0, 500.0),
            card_in_set("B", "Base Set", 1.0, 500.0),
        ];
        let results = evaluate(&rows, None, &params).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].name, "B");
    }

    #[test]
    fn test_set_filter_excludes_rows_without_a_set() {
        let params = FilterParams {
            allowed_sets: BTreeSet::from(["Base Set".to_string()]),
            ..open_params()
        };

        let results = evaluate(&[card("A", 1.0, 500.0)], None, &params).unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn test_set_prefix_stripped_before_matching() {
        let params = FilterParams {
            allowed_sets: BTreeSet::from(["Base Set".to_string()]),
            ..open_params()
        };

        let rows = [card_in_set("A", "POKEMON Base Set", 1.0, 500.0)];
        let results = evaluate(&rows, None, &params).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].set_name.as_deref(), Some("Base Set"));
    }

    #[test]
    fn test_prefix_strip_is_exact_no_extra_trimming() {
        let rows = [card_in_set("A", "pokemon  Fossil", 1.0, 500.0)];
        let results = evaluate(&rows, None, &open_params()).unwrap();
        // Only the prefix "Pokemon " is removed; the second space stays.
        assert_eq!(results[0].set_name.as_deref(), Some(" Fossil"));
    }

    #[test]
    fn test_missing_prices_never_appear() {
        let mut no_raw = card("A", 0.0, 100.0);
        no_raw.raw_price = None;
        let mut no_graded = card("B", 5.0, 0.0);
        no_graded.graded_price = None;

        let results =
            evaluate(&[no_raw, no_graded, card("C", 5.0, 100.0)], None, &open_params()).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].name, "C");
    }

    #[test]
    fn test_output_preserves_input_order() {
        let rows = [
            card("C", 3.0, 100.0),
            card("A", 1.0, 100.0),
            card("B", 2.0, 100.0),
        ];
        let results = evaluate(&rows, None, &open_params()).unwrap();
        let names: Vec<_> = results.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["C", "A", "B"]);
    }

    #[test]
    fn test_tightening_a_bound_never_grows_the_result() {
        let rows = [
            card("A", 5.0, 100.0),
            card("B", 15.0, 100.0),
            card("C", 25.0, 100.0),
        ];

        let mut prev_len = usize::MAX;
        for max_raw in [30.0, 20.0, 10.0, 1.0] {
            let params = FilterParams {
                max_raw_price: max_raw,
                ..open_params()
            };
            let len = evaluate(&rows, None, &params).unwrap().len();
            assert!(len <= prev_len, "tighter bound {max_raw} grew the result");
            prev_len = len;
        }
    }

    #[test]
    fn test_name_substrings_match_any_case_insensitive() {
        let params = FilterParams {
            name_substrings: vec!["char".to_string(), "MEW".to_string()],
            ..open_params()
        };

        let rows = [
            card("Charizard", 1.0, 100.0),
            card("Mewtwo", 1.0, 100.0),
            card("Pikachu", 1.0, 100.0),
        ];
        let results = evaluate(&rows, None, &params).unwrap();
        let names: Vec<_> = results.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["Charizard", "Mewtwo"]);
    }

    #[test]
    fn test_name_query_case_insensitive() {
        let params = FilterParams {
            name_query: "ZARD".to_string(),
            ..open_params()
        };

        let rows = [card("Charizard", 1.0, 100.0), card("Pikachu", 1.0, 100.0)];
        let results = evaluate(&rows, None, &params).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].name, "Charizard");
    }

    fn baseline(entries: &[(&str, Option<f64>, Option<f64>)]) -> BaselineLookup {
        entries
            .iter()
            .map(|(name, raw, graded)| {
                (
                    name.to_string(),
                    BaselinePrice {
                        raw: *raw,
                        graded: *graded,
                    },
                )
            })
            .collect()
    }

    #[test]
    fn test_trends_against_baseline() {
        let lookup = baseline(&[
            ("Up", Some(1.0), Some(10.0)),
            ("Down", Some(9.0), Some(200.0)),
            ("Flat", Some(5.0), Some(100.0)),
        ]);

        let rows = [
            card("Up", 5.0, 100.0),
            card("Down", 5.0, 100.0),
            card("Flat", 5.0, 100.0),
            card("New", 5.0, 100.0),
        ];
        let results = evaluate(&rows, Some(&lookup), &open_params()).unwrap();

        assert_eq!(results[0].raw_trend, Some(Trend::Up));
        assert_eq!(results[0].graded_trend, Some(Trend::Up));
        assert_eq!(results[1].raw_trend, Some(Trend::Down));
        assert_eq!(results[1].graded_trend, Some(Trend::Down));
        assert_eq!(results[2].raw_trend, Some(Trend::Flat));
        assert_eq!(results[2].graded_trend, Some(Trend::Flat));
        assert_eq!(results[3].raw_trend, Some(Trend::Unknown));
        assert_eq!(results[3].graded_trend, Some(Trend::Unknown));
    }

    #[test]
    fn test_trend_unknown_when_baseline_price_missing() {
        let lookup = baseline(&[("A", None, Some(100.0))]);

        let results = evaluate(&[card("A", 5.0, 100.0)], Some(&lookup), &open_params()).unwrap();
        assert_eq!(results[0].raw_trend, Some(Trend::Unknown));
        assert_eq!(results[0].graded_trend, Some(Trend::Flat));
    }

    #[test]
    fn test_baseline_equal_to_current_yields_only_flat() {
        // A single history file makes the baseline identical to itself; every
        // name found in it must come out FLAT, never UP or DOWN.
        let rows = [card("A", 5.0, 100.0), card("B", 7.25, 80.0)];
        let lookup = baseline(&[
            ("A", Some(5.0), Some(100.0)),
            ("B", Some(7.25), Some(80.0)),
        ]);

        let results = evaluate(&rows, Some(&lookup), &open_params()).unwrap();
        assert_eq!(results.len(), 2);
        for r in &results {
            assert_eq!(r.raw_trend, Some(Trend::Flat));
            assert_eq!(r.graded_trend, Some(Trend::Flat));
        }
    }

    #[test]
    fn test_flat_requires_exact_equality() {
        assert_eq!(Trend::compare(5.0, Some(5.0)), Trend::Flat);
        assert_eq!(Trend::compare(5.0 + 1e-12, Some(5.0)), Trend::Up);
        assert_eq!(Trend::compare(5.0 - 1e-12, Some(5.0)), Trend::Down);
    }

    #[test]
    fn test_negative_fee_rejected() {
        let params = FilterParams {
            grading_fee: -1.0,
            ..FilterParams::default()
        };
        let err = evaluate(&[], None, &params).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidParameter(_)));
    }

    #[test]
    fn test_nan_bound_rejected() {
        let params = FilterParams {
            min_profit_margin: f64::NAN,
            ..FilterParams::default()
        };
        let err = evaluate(&[], None, &params).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidParameter(_)));
    }

    #[test]
    fn test_input_not_mutated_and_rerun_identical() {
        let rows = [card("A", 10.0, 100.0), card("B", 30.0, 100.0)];
        let params = FilterParams::default();

        let first = evaluate(&rows, None, &params).unwrap();
        let second = evaluate(&rows, None, &params).unwrap();
        assert_eq!(first.len(), second.len());
        assert_eq!(rows[0].raw_price, Some(10.0));
        for (a, b) in first.iter().zip(&second) {
            assert_eq!(a.name, b.name);
            assert_eq!(a.profit_margin, b.profit_margin);
        }
    }
}
