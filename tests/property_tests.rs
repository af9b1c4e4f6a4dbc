//! Property-based tests for the pipeline stages.
//!
//! These tests verify invariants that must hold for all inputs.

#![expect(clippy::unwrap_used, clippy::indexing_slicing)]

use polars::prelude::*;
use proptest::prelude::*;
use regression_features::stages::{
    CategoricalEncoder, CategoricalImputer, DropUnnecessaryFeatures, LogTransformer, MISSING_LABEL,
    RARE_LABEL, RareLabelCategoricalEncoder, Stage,
};
use std::collections::{HashMap, HashSet};

// ============================================================================
// Proptest Strategies
// ============================================================================

const LABELS: [&str; 6] = ["RL", "RM", "FV", "RH", "C", "NA"];
const COLUMNS: [&str; 6] = ["Id", "LotArea", "Street", "YrSold", "MoSold", "PoolQC"];

/// A categorical column drawn from a small alphabet.
fn labels(max_len: usize) -> impl Strategy<Value = Vec<&'static str>> {
    prop::collection::vec(prop::sample::select(LABELS.to_vec()), 1..=max_len)
}

/// A categorical column with missing values.
fn labels_with_missing(max_len: usize) -> impl Strategy<Value = Vec<Option<&'static str>>> {
    prop::collection::vec(prop::option::of(prop::sample::select(LABELS.to_vec())), 1..=max_len)
}

/// Strictly positive, finite values.
fn positive_values(max_len: usize) -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(0.001f64..1_000_000.0, 1..=max_len)
}

fn frame_of(series: Series) -> DataFrame {
    DataFrame::new(vec![Column::from(series)]).unwrap()
}

fn frequent_set(labels: &[&str], tol: f64) -> HashSet<String> {
    let df = frame_of(Series::new("MSZoning".into(), labels));
    let mut stage = RareLabelCategoricalEncoder::new(["MSZoning"]).with_tolerance(tol);
    stage.fit(&df, None).unwrap();
    stage
        .frequent_labels("MSZoning")
        .unwrap()
        .iter()
        .cloned()
        .collect()
}

// ============================================================================
// Rare label encoding
// ============================================================================

proptest! {
    #[test]
    fn frequent_set_grows_as_tolerance_shrinks(
        labels in labels(80),
        low in 0.0f64..0.5,
        delta in 0.0f64..0.5,
    ) {
        let high = low + delta;
        let relaxed = frequent_set(&labels, low);
        let strict = frequent_set(&labels, high);

        prop_assert!(strict.is_subset(&relaxed));
    }

    #[test]
    fn rare_output_is_frequent_or_rare(labels in labels(80), tol in 0.0f64..1.0) {
        let df = frame_of(Series::new("MSZoning".into(), &labels));
        let mut stage = RareLabelCategoricalEncoder::new(["MSZoning"]).with_tolerance(tol);

        let out = stage.fit_transform(&df, None).unwrap();
        let frequent: HashSet<&str> = stage
            .frequent_labels("MSZoning")
            .unwrap()
            .iter()
            .map(String::as_str)
            .collect();

        let values = out.column("MSZoning").unwrap().as_materialized_series().clone();
        prop_assert_eq!(values.len(), labels.len());
        for (before, after) in labels.iter().zip(values.str().unwrap().into_iter()) {
            let after = after.unwrap();
            if frequent.contains(before) {
                prop_assert_eq!(after, *before);
            } else {
                prop_assert_eq!(after, RARE_LABEL);
            }
        }
    }
}

// ============================================================================
// Imputation
// ============================================================================

proptest! {
    #[test]
    fn categorical_imputer_only_touches_nulls(labels in labels_with_missing(60)) {
        let df = frame_of(Series::new("BsmtQual".into(), &labels));
        let nulls = labels.iter().filter(|v| v.is_none()).count();
        let mut stage = CategoricalImputer::new(["BsmtQual"]);

        let out = stage.fit_transform(&df, None).unwrap();
        let values = out.column("BsmtQual").unwrap().as_materialized_series().clone();

        for (before, after) in labels.iter().zip(values.str().unwrap().into_iter()) {
            match before {
                Some(v) => prop_assert_eq!(after, Some(*v)),
                None if nulls > 1 => prop_assert_eq!(after, Some(MISSING_LABEL)),
                None => prop_assert_eq!(after, None),
            }
        }
    }
}

// ============================================================================
// Log transform
// ============================================================================

proptest! {
    #[test]
    fn log_is_inverted_by_exp(values in positive_values(50)) {
        let df = frame_of(Series::new("LotArea".into(), &values));

        let out = LogTransformer::new(["LotArea"]).transform(&df).unwrap();
        let logged = out.column("LotArea").unwrap().as_materialized_series().clone();

        for (x, y) in values.iter().zip(logged.f64().unwrap().into_no_null_iter()) {
            prop_assert!(approx::relative_eq!(y.exp(), *x, max_relative = 1e-9));
        }
    }

    #[test]
    fn log_rejects_any_non_positive(mut values in positive_values(50), idx in any::<prop::sample::Index>()) {
        let at = idx.index(values.len());
        values[at] = -values[at];
        let df = frame_of(Series::new("LotArea".into(), &values));

        prop_assert!(LogTransformer::new(["LotArea"]).transform(&df).is_err());
    }
}

// ============================================================================
// Dropping
// ============================================================================

proptest! {
    #[test]
    fn drop_is_ordered_set_difference(mask in prop::collection::vec(any::<bool>(), COLUMNS.len())) {
        let columns: Vec<Column> = COLUMNS
            .iter()
            .map(|name| Column::new((*name).into(), [1i32, 2, 3]))
            .collect();
        let df = DataFrame::new(columns).unwrap();
        let to_drop: Vec<&str> = COLUMNS
            .iter()
            .zip(&mask)
            .filter_map(|(name, dropped)| dropped.then_some(*name))
            .collect();

        let out = DropUnnecessaryFeatures::new(to_drop.iter().copied()).transform(&df).unwrap();

        let expected: Vec<&str> = COLUMNS
            .iter()
            .copied()
            .filter(|name| !to_drop.contains(name))
            .collect();
        let names: Vec<&str> = out.get_column_names().iter().map(|n| n.as_str()).collect();
        prop_assert_eq!(names, expected);
    }
}

// ============================================================================
// Target-ordered encoding
// ============================================================================

proptest! {
    #[test]
    fn ranks_follow_target_means(
        rows in prop::collection::vec(
            (prop::sample::select(LABELS.to_vec()), 1.0f64..1_000.0),
            1..60,
        ),
    ) {
        let (labels, prices): (Vec<&str>, Vec<f64>) = rows.iter().copied().unzip();
        let df = frame_of(Series::new("Neighborhood".into(), &labels));
        let target = Series::new("SalePrice".into(), &prices);
        let mut stage = CategoricalEncoder::new(["Neighborhood"]);

        let out = stage.fit_transform(&df, Some(&target)).unwrap();

        let mut sums: HashMap<&str, (f64, f64)> = HashMap::new();
        for (label, price) in &rows {
            let entry = sums.entry(*label).or_insert((0.0, 0.0));
            entry.0 += price;
            entry.1 += 1.0;
        }

        // Ranks are exactly 0..k over the distinct categories
        let mut seen: Vec<u32> = sums.keys().map(|c| stage.rank("Neighborhood", c).unwrap()).collect();
        seen.sort_unstable();
        let expected: Vec<u32> = (0u32..).take(sums.len()).collect();
        prop_assert_eq!(seen, expected);

        // A higher rank never has a clearly lower mean
        for (a, (sum_a, n_a)) in &sums {
            for (b, (sum_b, n_b)) in &sums {
                if stage.rank("Neighborhood", a) < stage.rank("Neighborhood", b) {
                    prop_assert!(sum_a / n_a <= sum_b / n_b + 1e-6);
                }
            }
        }

        let encoded = out.column("Neighborhood").unwrap().as_materialized_series().clone();
        prop_assert_eq!(encoded.null_count(), 0);
    }
}
