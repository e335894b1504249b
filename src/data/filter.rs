use std::collections::BTreeSet;

use super::model::{DatasetKind, Institution, InstitutionTable, InstitutionType};

/// Upper cap for the earnings-to-price slider so one outlier can't stretch it.
pub const DEFAULT_RATIO_CAP: f64 = 10.0;

/// Used when the table has no earnings-to-price values at all.
pub const PLACEHOLDER_RATIO_RANGE: NumericRange = NumericRange { low: 0.0, high: 2.0 };

// ---------------------------------------------------------------------------
// Numeric ranges
// ---------------------------------------------------------------------------

/// Closed interval `[low, high]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NumericRange {
    pub low: f64,
    pub high: f64,
}

impl NumericRange {
    /// The full range of a rate expressed as a fraction.
    pub const UNIT: NumericRange = NumericRange { low: 0.0, high: 1.0 };

    pub fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }

    /// Inclusive at both ends.
    pub fn contains(self, value: f64) -> bool {
        value >= self.low && value <= self.high
    }
}

/// Selectable range of the earnings-to-price filter, derived from the data.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatioBounds {
    pub range: NumericRange,
    /// `false` when no record has a value; the UI should warn and hide the slider.
    pub enabled: bool,
}

/// `[min observed, min(max observed, cap)]`, or the placeholder when nothing is observed.
pub fn earnings_ratio_bounds(table: &InstitutionTable, cap: f64) -> RatioBounds {
    let mut values = table
        .records
        .iter()
        .filter_map(|r| r.earnings_to_price)
        .peekable();

    if values.peek().is_none() {
        log::warn!("No valid Earnings to Price Ratio data available, filter disabled");
        return RatioBounds {
            range: PLACEHOLDER_RATIO_RANGE,
            enabled: false,
        };
    }

    let (min, max) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    // A cap below the smallest value would invert the range.
    let high = max.min(cap).max(min);
    RatioBounds {
        range: NumericRange::new(min, high),
        enabled: true,
    }
}

// ---------------------------------------------------------------------------
// Constraints
// ---------------------------------------------------------------------------

/// Selected values of a categorical column. `None` stands for a missing value.
pub type CategorySet<T> = BTreeSet<Option<T>>;

/// User-supplied filter configuration. `None` means the filter is inactive.
/// All active filters combine by logical AND.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Constraints {
    /// Missing rates fail the range test.
    pub admission_rate: Option<NumericRange>,
    pub graduation_rate: Option<NumericRange>,
    /// Missing ratios always pass.
    pub earnings_ratio: Option<NumericRange>,
    /// Case-insensitive; empty matches every named record.
    pub name_substring: String,
    pub fit_ratings: Option<CategorySet<String>>,
    pub institution_types: Option<CategorySet<InstitutionType>>,
    /// Empty applies no state restriction.
    pub states: BTreeSet<String>,
}

impl Constraints {
    /// Whether one record satisfies every active constraint.
    pub fn matches(&self, rec: &Institution) -> bool {
        if let Some(range) = self.admission_rate {
            if !rec.admission_rate.is_some_and(|v| range.contains(v)) {
                return false;
            }
        }
        if let Some(range) = self.graduation_rate {
            if !rec.graduation_rate.is_some_and(|v| range.contains(v)) {
                return false;
            }
        }
        if let Some(range) = self.earnings_ratio {
            if !rec.earnings_to_price.map_or(true, |v| range.contains(v)) {
                return false;
            }
        }
        if !name_contains(rec.name.as_deref(), &self.name_substring) {
            return false;
        }
        if let Some(selected) = &self.fit_ratings {
            if !selected.contains(&rec.fit_rating) {
                return false;
            }
        }
        if let Some(selected) = &self.institution_types {
            if !selected.contains(&rec.institution_type) {
                return false;
            }
        }
        if !self.states.is_empty() {
            match &rec.state {
                Some(state) if self.states.contains(state) => {}
                _ => return false,
            }
        }
        true
    }
}

fn name_contains(name: Option<&str>, needle: &str) -> bool {
    match name {
        Some(name) => needle.is_empty() || name.to_lowercase().contains(&needle.to_lowercase()),
        None => false,
    }
}

/// Constraints that let every row of `table` through, for the table's dashboard.
pub fn default_constraints(table: &InstitutionTable, ratio: RatioBounds) -> Constraints {
    match table.kind {
        DatasetKind::HiddenGems => Constraints {
            admission_rate: Some(NumericRange::UNIT),
            graduation_rate: Some(NumericRange::UNIT),
            earnings_ratio: Some(ratio.range),
            ..Constraints::default()
        },
        DatasetKind::AccessibleExcellence => Constraints {
            fit_ratings: Some(table.fit_ratings.clone()),
            institution_types: Some(table.institution_types.clone()),
            ..Constraints::default()
        },
    }
}

// ---------------------------------------------------------------------------
// Filtering
// ---------------------------------------------------------------------------

/// Row indices split into the rows that pass and the rows that don't.
/// Together they partition `0..table.len()`, each in table order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterOutcome {
    pub matched: Vec<usize>,
    pub unmatched: Vec<usize>,
}

impl FilterOutcome {
    pub fn total(&self) -> usize {
        self.matched.len() + self.unmatched.len()
    }
}

/// Evaluate `constraints` against every record. The unmatched side is the
/// index complement of the matched side, not a second predicate pass.
pub fn filter_institutions(table: &InstitutionTable, constraints: &Constraints) -> FilterOutcome {
    let matched: Vec<usize> = table
        .records
        .iter()
        .enumerate()
        .filter(|(_, rec)| constraints.matches(rec))
        .map(|(i, _)| i)
        .collect();

    let mut selected = vec![false; table.len()];
    for &i in &matched {
        selected[i] = true;
    }
    let unmatched = (0..table.len()).filter(|&i| !selected[i]).collect();

    FilterOutcome { matched, unmatched }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gem(name: &str, admission: f64, ratio: Option<f64>) -> Institution {
        Institution {
            name: Some(name.to_string()),
            admission_rate: Some(admission),
            graduation_rate: Some(0.5),
            earnings_to_price: ratio,
            ..Default::default()
        }
    }

    fn gems_table(records: Vec<Institution>) -> InstitutionTable {
        InstitutionTable::from_records(DatasetKind::HiddenGems, records, vec![])
    }

    fn names(table: &InstitutionTable, idx: &[usize]) -> Vec<String> {
        idx.iter()
            .filter_map(|&i| table.records[i].name.clone())
            .collect()
    }

    fn assert_partition(table: &InstitutionTable, outcome: &FilterOutcome) {
        assert_eq!(outcome.total(), table.len());
        let mut all: Vec<usize> = outcome
            .matched
            .iter()
            .chain(outcome.unmatched.iter())
            .copied()
            .collect();
        all.sort_unstable();
        assert_eq!(all, (0..table.len()).collect::<Vec<_>>());
    }

    #[test]
    fn test_three_record_scenario() {
        let table = gems_table(vec![
            gem("A", 0.3, None),
            gem("B", 0.6, Some(1.5)),
            gem("C", 0.9, Some(3.0)),
        ]);
        let constraints = Constraints {
            admission_rate: Some(NumericRange::new(0.0, 0.7)),
            earnings_ratio: Some(NumericRange::new(1.0, 2.0)),
            ..Constraints::default()
        };

        let outcome = filter_institutions(&table, &constraints);
        assert_eq!(names(&table, &outcome.matched), vec!["A", "B"]);
        assert_eq!(names(&table, &outcome.unmatched), vec!["C"]);
        assert_partition(&table, &outcome);
    }

    #[test]
    fn test_range_is_inclusive_at_both_ends() {
        let table = gems_table(vec![gem("Low", 0.2, None), gem("High", 0.8, None), gem("Out", 0.81, None)]);
        let constraints = Constraints {
            admission_rate: Some(NumericRange::new(0.2, 0.8)),
            ..Constraints::default()
        };
        let outcome = filter_institutions(&table, &constraints);
        assert_eq!(names(&table, &outcome.matched), vec!["Low", "High"]);
    }

    #[test]
    fn test_missing_rate_fails_range_but_missing_ratio_passes() {
        let mut no_rate = gem("NoRate", 0.5, Some(1.0));
        no_rate.admission_rate = None;
        let table = gems_table(vec![no_rate, gem("NoRatio", 0.5, None), gem("FarRatio", 0.5, Some(8.0))]);

        let constraints = Constraints {
            admission_rate: Some(NumericRange::UNIT),
            earnings_ratio: Some(NumericRange::new(0.0, 2.0)),
            ..Constraints::default()
        };
        let outcome = filter_institutions(&table, &constraints);
        assert_eq!(names(&table, &outcome.matched), vec!["NoRatio"]);
        assert_eq!(names(&table, &outcome.unmatched), vec!["NoRate", "FarRatio"]);
    }

    #[test]
    fn test_name_search_is_case_insensitive() {
        let mut unnamed = gem("", 0.5, None);
        unnamed.name = None;
        let table = gems_table(vec![
            gem("Penn State University", 0.5, None),
            gem("Quiet College", 0.5, None),
            unnamed,
        ]);

        let all = filter_institutions(&table, &Constraints::default());
        assert_eq!(all.matched, vec![0, 1]);
        assert_eq!(all.unmatched, vec![2]);

        let constraints = Constraints {
            name_substring: "State".into(),
            ..Constraints::default()
        };
        let outcome = filter_institutions(&table, &constraints);
        assert_eq!(outcome.matched, vec![0]);

        let constraints = Constraints {
            name_substring: "penn STATE".into(),
            ..Constraints::default()
        };
        assert_eq!(filter_institutions(&table, &constraints).matched, vec![0]);
    }

    fn place(name: &str, state: &str, ty: Option<InstitutionType>, rating: Option<&str>) -> Institution {
        Institution {
            name: Some(name.to_string()),
            state: Some(state.to_string()),
            institution_type: ty,
            fit_rating: rating.map(str::to_string),
            ..Default::default()
        }
    }

    fn excellence_table() -> InstitutionTable {
        InstitutionTable::from_records(
            DatasetKind::AccessibleExcellence,
            vec![
                place("North", "PA", Some(InstitutionType::Public), Some("★★★")),
                place("South", "TX", Some(InstitutionType::Private), Some("★★☆")),
                place("West", "CA", None, Some("★☆☆")),
                place("East", "NY", Some(InstitutionType::Public), None),
            ],
            vec![],
        )
    }

    #[test]
    fn test_empty_state_selection_applies_no_restriction() {
        let table = excellence_table();
        let constraints = default_constraints(&table, earnings_ratio_bounds(&table, DEFAULT_RATIO_CAP));
        let outcome = filter_institutions(&table, &constraints);
        assert_eq!(outcome.matched, vec![0, 1, 2, 3]);
        assert!(outcome.unmatched.is_empty());

        let constraints = Constraints {
            states: ["TX".to_string(), "NY".to_string()].into_iter().collect(),
            ..constraints
        };
        let outcome = filter_institutions(&table, &constraints);
        assert_eq!(names(&table, &outcome.matched), vec!["South", "East"]);
        assert_partition(&table, &outcome);
    }

    #[test]
    fn test_category_sets_include_missing_only_when_selected() {
        let table = excellence_table();
        let mut constraints = default_constraints(&table, earnings_ratio_bounds(&table, DEFAULT_RATIO_CAP));

        if let Some(types) = constraints.institution_types.as_mut() {
            types.remove(&None);
        }
        let outcome = filter_institutions(&table, &constraints);
        assert_eq!(names(&table, &outcome.matched), vec!["North", "South", "East"]);

        constraints.fit_ratings = Some([Some("★★★".to_string()), None].into_iter().collect());
        let outcome = filter_institutions(&table, &constraints);
        assert_eq!(names(&table, &outcome.matched), vec!["North", "East"]);

        constraints.institution_types = Some(BTreeSet::new());
        let outcome = filter_institutions(&table, &constraints);
        assert!(outcome.matched.is_empty());
        assert_eq!(outcome.unmatched.len(), 4);
    }

    #[test]
    fn test_ratio_bounds_are_capped() {
        let table = gems_table(vec![gem("A", 0.1, Some(0.4)), gem("B", 0.1, Some(37.0)), gem("C", 0.1, None)]);
        let bounds = earnings_ratio_bounds(&table, DEFAULT_RATIO_CAP);
        assert!(bounds.enabled);
        assert_eq!(bounds.range, NumericRange::new(0.4, 10.0));

        let bounds = earnings_ratio_bounds(&table, 100.0);
        assert_eq!(bounds.range, NumericRange::new(0.4, 37.0));
    }

    #[test]
    fn test_ratio_bounds_fall_back_without_data() {
        let table = gems_table(vec![gem("A", 0.1, None)]);
        let bounds = earnings_ratio_bounds(&table, DEFAULT_RATIO_CAP);
        assert!(!bounds.enabled);
        assert_eq!(bounds.range, PLACEHOLDER_RATIO_RANGE);

        // Every ratio is missing, so the placeholder range still lets all rows through.
        let constraints = default_constraints(&table, bounds);
        assert_eq!(filter_institutions(&table, &constraints).matched, vec![0]);
    }

    #[test]
    fn test_default_gems_constraints_pass_complete_rows() {
        let table = gems_table(vec![gem("A", 0.0, Some(0.4)), gem("B", 1.0, Some(3.0))]);
        let constraints = default_constraints(&table, earnings_ratio_bounds(&table, DEFAULT_RATIO_CAP));
        assert_eq!(filter_institutions(&table, &constraints).matched, vec![0, 1]);
    }
}
