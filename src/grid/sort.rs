//! Sorting for grid rows

use std::cmp::Ordering;

use rayon::prelude::*;

use super::record::{Record, Value};

/// Threshold for using parallel processing
const PARALLEL_THRESHOLD: usize = 10_000;

/// Sorting direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn toggled(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }

    /// Header indicator for a sorted column
    pub fn arrow(self) -> &'static str {
        match self {
            SortDirection::Ascending => "↑",
            SortDirection::Descending => "↓",
        }
    }
}

/// Precomputed comparison key for one cell
#[derive(Debug, Clone, PartialEq)]
enum SortKey {
    Number(f64),
    Text { folded: String, raw: String },
}

impl SortKey {
    fn of<H>(value: Option<&Value<H>>) -> Self {
        match value.and_then(Value::as_number) {
            Some(n) => SortKey::Number(n),
            None => {
                let raw = value.map(|v| v.text().into_owned()).unwrap_or_default();
                SortKey::Text { folded: raw.to_lowercase(), raw }
            }
        }
    }

    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (SortKey::Number(a), SortKey::Number(b)) => compare_numbers(*a, *b),
            // Mixed columns: numbers first, keeping the order total
            (SortKey::Number(_), SortKey::Text { .. }) => Ordering::Less,
            (SortKey::Text { .. }, SortKey::Number(_)) => Ordering::Greater,
            (
                SortKey::Text { folded: fa, raw: ra },
                SortKey::Text { folded: fb, raw: rb },
            ) => fa.cmp(fb).then_with(|| case_order(ra, rb)),
        }
    }
}

/// NaN sorts after every real number
fn compare_numbers(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
    }
}

/// Tie-break for strings equal up to case: lowercase before uppercase at the
/// first differing character
fn case_order(a: &str, b: &str) -> Ordering {
    for (x, y) in a.chars().zip(b.chars()) {
        if x != y {
            return match (x.is_lowercase(), y.is_lowercase()) {
                (true, false) => Ordering::Less,
                (false, true) => Ordering::Greater,
                _ => x.cmp(&y),
            };
        }
    }
    a.len().cmp(&b.len())
}

/// Case-insensitive string collation used for text columns
pub fn collate(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| case_order(a, b))
}

/// Compare two optional cell values the way the grid sorts them (ascending)
pub fn compare_values<H>(a: Option<&Value<H>>, b: Option<&Value<H>>) -> Ordering {
    SortKey::of(a).cmp(&SortKey::of(b))
}

/// Order `rows` (indices into `records`) by the `key` field.
/// Equal keys keep their relative order in `rows`.
/// Uses parallel processing for large inputs
pub fn sorted_indices<H>(
    records: &[Record<H>],
    rows: &[usize],
    key: &str,
    direction: SortDirection,
) -> Vec<usize> {
    let keys: Vec<SortKey> = rows
        .iter()
        .map(|&row| SortKey::of(records.get(row).and_then(|r| r.get(key))))
        .collect();

    order(keys, direction)
        .into_iter()
        .map(|pos| rows[pos])
        .collect()
}

/// Sorted copy of `records` by the `key` field; the input is left untouched
pub fn sort<'a, H>(
    records: &[&'a Record<H>],
    key: &str,
    direction: SortDirection,
) -> Vec<&'a Record<H>> {
    let keys: Vec<SortKey> = records.iter().map(|r| SortKey::of(r.get(key))).collect();

    order(keys, direction)
        .into_iter()
        .map(|pos| records[pos])
        .collect()
}

/// Positions of `keys` in sorted order. Ties fall back to position, which
/// makes the unstable sort stable.
fn order(keys: Vec<SortKey>, direction: SortDirection) -> Vec<usize> {
    let mut keyed: Vec<(usize, SortKey)> = keys.into_iter().enumerate().collect();

    let cmp_fn = |(idx_a, a): &(usize, SortKey), (idx_b, b): &(usize, SortKey)| -> Ordering {
        let base = a.cmp(b);
        match direction {
            SortDirection::Ascending => base.then(idx_a.cmp(idx_b)),
            SortDirection::Descending => base.reverse().then(idx_a.cmp(idx_b)),
        }
    };

    if keyed.len() >= PARALLEL_THRESHOLD {
        keyed.par_sort_unstable_by(cmp_fn);
    } else {
        keyed.sort_unstable_by(cmp_fn);
    }

    keyed.into_iter().map(|(pos, _)| pos).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn people() -> Vec<Record> {
        vec![
            Record::new().with("id", 1).with("name", "Bob").with("age", 30),
            Record::new().with("id", 2).with("name", "ann").with("age", 25),
            Record::new().with("id", 3).with("name", "Cid").with("age", 25),
        ]
    }

    fn ids(rows: &[&Record]) -> Vec<i64> {
        rows.iter().filter_map(|r| r.id()).collect()
    }

    #[test]
    fn numeric_ascending_is_stable() {
        let records = people();
        let refs: Vec<&Record> = records.iter().collect();
        assert_eq!(ids(&sort(&refs, "age", SortDirection::Ascending)), vec![2, 3, 1]);
    }

    #[test]
    fn numeric_descending_keeps_tie_order() {
        let records = people();
        let refs: Vec<&Record> = records.iter().collect();
        assert_eq!(ids(&sort(&refs, "age", SortDirection::Descending)), vec![1, 2, 3]);
    }

    #[test]
    fn text_ignores_case() {
        let records = people();
        let refs: Vec<&Record> = records.iter().collect();
        let sorted = sort(&refs, "name", SortDirection::Ascending);
        let names: Vec<String> = sorted.iter().map(|r| r.get("name").unwrap().text().into_owned()).collect();
        assert_eq!(names, vec!["ann", "Bob", "Cid"]);
    }

    #[test]
    fn input_is_not_mutated() {
        let records = people();
        let refs: Vec<&Record> = records.iter().collect();
        let _ = sort(&refs, "age", SortDirection::Ascending);
        assert_eq!(ids(&refs), vec![1, 2, 3]);
    }

    #[test]
    fn numbers_compare_numerically_not_lexically() {
        let records: Vec<Record> = [9, 10, 100, 2]
            .iter()
            .map(|&n| Record::new().with("id", n).with("n", n))
            .collect();
        let order = sorted_indices(&records, &[0, 1, 2, 3], "n", SortDirection::Ascending);
        assert_eq!(order, vec![3, 0, 1, 2]);
    }

    #[test]
    fn sorted_indices_respects_subset() {
        let records = people();
        assert_eq!(sorted_indices(&records, &[2, 0], "age", SortDirection::Ascending), vec![2, 0]);
        assert!(sorted_indices(&records, &[], "age", SortDirection::Ascending).is_empty());
    }

    #[test]
    fn missing_key_keeps_input_order() {
        let records = people();
        assert_eq!(
            sorted_indices(&records, &[0, 1, 2], "nope", SortDirection::Descending),
            vec![0, 1, 2]
        );
    }

    #[test]
    fn mixed_column_puts_numbers_first() {
        let records: Vec<Record> = vec![
            Record::new().with("v", "abc"),
            Record::new().with("v", 5),
            Record::new().with("v", Value::<()>::Null),
            Record::new().with("v", 1.5),
        ];
        assert_eq!(
            sorted_indices(&records, &[0, 1, 2, 3], "v", SortDirection::Ascending),
            vec![3, 1, 2, 0]
        );
    }

    #[test]
    fn nan_sorts_last() {
        assert_eq!(compare_numbers(f64::NAN, 1.0), Ordering::Greater);
        assert_eq!(compare_numbers(1.0, f64::NAN), Ordering::Less);
    }

    #[test]
    fn collate_lowercase_first_on_ties() {
        assert_eq!(collate("ann", "Bob"), Ordering::Less);
        assert_eq!(collate("a", "A"), Ordering::Less);
        assert_eq!(collate("A", "a"), Ordering::Greater);
        assert_eq!(collate("same", "same"), Ordering::Equal);
    }

    #[test]
    fn large_inputs_sort_in_parallel_and_stay_stable() {
        let records: Vec<Record> = (0..PARALLEL_THRESHOLD as i64 + 10)
            .map(|i| Record::new().with("id", i).with("bucket", i % 3))
            .collect();
        let rows: Vec<usize> = (0..records.len()).collect();
        let sorted = sorted_indices(&records, &rows, "bucket", SortDirection::Ascending);

        assert_eq!(sorted.len(), records.len());
        for pair in sorted.windows(2) {
            let (a, b) = (&records[pair[0]], &records[pair[1]]);
            let ord = compare_values(a.get("bucket"), b.get("bucket"));
            assert_ne!(ord, Ordering::Greater);
            if ord == Ordering::Equal {
                assert!(pair[0] < pair[1]);
            }
        }
    }
}
