//! Search filtering over records

use super::record::Record;

/// Whether any field of `record` contains `needle`, ignoring case.
/// `needle` must already be lowercased.
fn matches_lowered<H>(record: &Record<H>, needle: &str) -> bool {
    record
        .values()
        .any(|value| value.text().to_lowercase().contains(needle))
}

/// Case-insensitive substring match against every field of a record
pub fn matches<H>(record: &Record<H>, term: &str) -> bool {
    term.is_empty() || matches_lowered(record, &term.to_lowercase())
}

/// Indices of the records matching `term`, in input order.
/// An empty term keeps every record.
pub fn filter_indices<H>(records: &[Record<H>], term: &str) -> Vec<usize> {
    if term.is_empty() {
        return (0..records.len()).collect();
    }

    let needle = term.to_lowercase();
    records
        .iter()
        .enumerate()
        .filter(|(_, record)| matches_lowered(record, &needle))
        .map(|(i, _)| i)
        .collect()
}

/// Records matching `term`, keeping their relative order
pub fn filter<'a, H>(records: &'a [Record<H>], term: &str) -> Vec<&'a Record<H>> {
    filter_indices(records, term)
        .into_iter()
        .map(|i| &records[i])
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::record::Value;

    fn people() -> Vec<Record> {
        vec![
            Record::new().with("id", 1).with("name", "Bob").with("age", 30),
            Record::new().with("id", 2).with("name", "ann").with("age", 25),
            Record::new().with("id", 3).with("name", "Cid").with("age", 25),
        ]
    }

    #[test]
    fn empty_term_is_identity() {
        let records = people();
        let kept = filter(&records, "");
        assert_eq!(kept.len(), 3);
        assert!(kept.iter().zip(records.iter()).all(|(a, b)| std::ptr::eq(*a, b)));
    }

    #[test]
    fn match_is_case_insensitive() {
        let records = people();
        let kept = filter(&records, "cid");
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].id(), Some(3));

        assert_eq!(filter_indices(&records, "BOB"), vec![0]);
    }

    #[test]
    fn numbers_match_on_their_text() {
        let records = people();
        assert_eq!(filter_indices(&records, "25"), vec![1, 2]);
        assert_eq!(filter_indices(&records, "3"), vec![0, 2]);
    }

    #[test]
    fn rendered_values_never_match() {
        let records: Vec<Record<&str>> = vec![
            Record::new().with("id", 1).with("badge", Value::Rendered("admin")),
            Record::new().with("id", 2).with("role", "admin"),
        ];
        assert_eq!(filter_indices(&records, "admin"), vec![1]);
    }

    #[test]
    fn no_match_is_empty() {
        assert!(filter(&people(), "zzz").is_empty());
    }
}
