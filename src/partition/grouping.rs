//! Grouping rows into keyed buckets, optionally behind the recency filter.

use csv::StringRecord;
use indexmap::IndexMap;
use serde::Serialize;

use crate::dates::{Cutoff, EventTimeColumns};

/// Rows excluded during the partition pass, by reason.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SkipCounts {
    /// No usable `start.dateTime` / `start.date`.
    pub unresolved_time: u64,
    /// Resolved, but earlier than the cutoff.
    pub before_cutoff: u64,
    /// Key column empty.
    pub empty_key: u64,
}

impl SkipCounts {
    pub fn total(&self) -> u64 {
        self.unresolved_time + self.before_cutoff + self.empty_key
    }
}

/// Date predicate applied ahead of grouping.
#[derive(Debug, Clone, Copy)]
pub struct RecencyFilter {
    pub columns: EventTimeColumns,
    pub cutoff: Cutoff,
}

/// Keyed buckets in first-encounter order of their keys.
#[derive(Debug, Clone, Default)]
pub struct Grouped {
    pub buckets: IndexMap<String, Vec<StringRecord>>,
    pub skipped: SkipCounts,
}

/// Groups `records` by the value at `key_index`.
///
/// Rows failing `filter` are dropped silently. Rows with an empty key are
/// dropped with a warning. Within a bucket rows keep their input order.
pub fn group_by_key(
    records: impl IntoIterator<Item = StringRecord>,
    key_index: usize,
    filter: Option<&RecencyFilter>,
) -> Grouped {
    let mut grouped = Grouped::default();

    for record in records {
        if let Some(filter) = filter {
            let time = filter.columns.resolve(&record);
            if time.as_option().is_none() {
                grouped.skipped.unresolved_time += 1;
                continue;
            }
            if !filter.cutoff.accepts(time) {
                grouped.skipped.before_cutoff += 1;
                continue;
            }
        }

        let key = record.get(key_index).unwrap_or_default();
        if key.is_empty() {
            let line = record.position().map(|p| p.line());
            tracing::warn!(?line, "Found a row with an empty key; skipping");
            grouped.skipped.empty_key += 1;
            continue;
        }

        let key = key.to_string();
        grouped.buckets.entry(key).or_default().push(record);
    }

    grouped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dates::{Cutoff, EventTimeColumns};
    use chrono::NaiveDate;

    fn row(fields: &[&str]) -> StringRecord {
        StringRecord::from(fields.to_vec())
    }

    fn filter() -> RecencyFilter {
        RecencyFilter {
            columns: EventTimeColumns { date_time: 1, date: 2 },
            cutoff: Cutoff::new(
                NaiveDate::from_ymd_opt(2024, 1, 10)
                    .and_then(|d| d.and_hms_opt(0, 0, 0))
                    .unwrap(),
            ),
        }
    }

    #[test]
    fn test_groups_in_encounter_order() {
        let records = vec![
            row(&["b@x.com", "1"]),
            row(&["a@x.com", "2"]),
            row(&["b@x.com", "3"]),
        ];
        let grouped = group_by_key(records, 0, None);

        let keys: Vec<&str> = grouped.buckets.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["b@x.com", "a@x.com"]);

        let b: Vec<&str> = grouped.buckets["b@x.com"].iter().map(|r| &r[1]).collect();
        assert_eq!(b, vec!["1", "3"]);
        assert_eq!(grouped.skipped, SkipCounts::default());
    }

    #[test]
    fn test_empty_key_is_skipped_and_counted() {
        let records = vec![row(&["", "1"]), row(&["a@x.com", "2"])];
        let grouped = group_by_key(records, 0, None);

        assert_eq!(grouped.buckets.len(), 1);
        assert_eq!(grouped.skipped.empty_key, 1);
    }

    #[test]
    fn test_row_too_short_for_key_is_skipped() {
        let records = vec![row(&["One", "a@x.com"]), row(&["Two"]), row(&["Three", "a@x.com", "x"])];
        let grouped = group_by_key(records, 1, None);

        assert_eq!(grouped.buckets["a@x.com"].len(), 2);
        assert_eq!(grouped.skipped.empty_key, 1);
    }

    #[test]
    fn test_keys_are_not_normalized() {
        let records = vec![row(&["A@x.com"]), row(&["a@x.com"]), row(&[" a@x.com"])];
        let grouped = group_by_key(records, 0, None);
        assert_eq!(grouped.buckets.len(), 3);
    }

    #[test]
    fn test_recency_filter_applies_before_key_check() {
        let records = vec![
            row(&["a@x.com", "2024-01-10T00:00:00", ""]), // on cutoff
            row(&["a@x.com", "", "2024-01-09"]),          // before
            row(&["b@x.com", "garbage", "2024-02-01"]),   // unresolvable
            row(&["", "2024-03-01T09:00:00Z", ""]),       // empty key
            row(&["c@x.com", "", ""]),                    // no date at all
            row(&["c@x.com", "", "2024-05-01"]),          // all-day, kept
        ];
        let grouped = group_by_key(records, 0, Some(&filter()));

        let sizes: Vec<(&str, usize)> = grouped
            .buckets
            .iter()
            .map(|(k, v)| (k.as_str(), v.len()))
            .collect();
        assert_eq!(sizes, vec![("a@x.com", 1), ("c@x.com", 1)]);
        assert_eq!(
            grouped.skipped,
            SkipCounts {
                unresolved_time: 2,
                before_cutoff: 1,
                empty_key: 1,
            }
        );
        assert_eq!(grouped.skipped.total(), 4);
    }

    #[test]
    fn test_grouping_is_a_partition() {
        let records: Vec<StringRecord> = (0..30)
            .map(|i| row(&[format!("u{}@x.com", i % 4).as_str(), i.to_string().as_str()]))
            .collect();
        let grouped = group_by_key(records.clone(), 0, None);

        let total: usize = grouped.buckets.values().map(Vec::len).sum();
        assert_eq!(total, records.len());
        for (key, rows) in &grouped.buckets {
            assert!(rows.iter().all(|r| &r[0] == key));
        }
    }
}
