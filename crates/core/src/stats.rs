//! Dashboard aggregates over the full, unfiltered record set.

use std::collections::{BTreeSet, HashMap, HashSet};

use serde::Serialize;

use crate::device::DeviceRecord;
use crate::view::{sort_items, SortField, SortOrder};

/// How many manufacturers the dashboard ranks.
pub const TOP_MANUFACTURERS: usize = 5;

/// How many recently received devices the dashboard lists.
pub const RECENT_DEVICES: usize = 5;

/// Per-department breakdown row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DepartmentStat {
    pub department: String,
    /// Distinct `itmCode` values held by the department.
    pub group_count: usize,
    pub total_quantity: i64,
}

/// Per-manufacturer ranking row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ManufacturerStat {
    pub manufacturer: String,
    /// Distinct `itmCode` values made by the manufacturer.
    pub group_count: usize,
    pub total_quantity: i64,
}

/// Everything the dashboard shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InventorySummary {
    pub total_records: usize,
    pub total_quantity: i64,
    pub department_count: usize,
    pub manufacturer_count: usize,
    /// Ordered by `total_quantity` descending; ties keep first-seen order.
    pub departments: Vec<DepartmentStat>,
    /// At most [`TOP_MANUFACTURERS`] rows, by `group_count` descending.
    pub top_manufacturers: Vec<ManufacturerStat>,
    /// Newest `dateReceived` first.
    pub recent_devices: Vec<DeviceRecord>,
}

/// Running totals for one bucket, keyed by first-seen position.
struct Bucket<'a> {
    name: &'a str,
    codes: HashSet<&'a str>,
    quantity: i64,
}

fn bucket_by<'a, F>(records: &'a [DeviceRecord], key: F) -> Vec<Bucket<'a>>
where
    F: Fn(&'a DeviceRecord) -> &'a str,
{
    let mut index: HashMap<&'a str, usize> = HashMap::new();
    let mut buckets: Vec<Bucket<'a>> = Vec::new();

    for record in records {
        let name = key(record);
        let slot = *index.entry(name).or_insert_with(|| {
            buckets.push(Bucket {
                name,
                codes: HashSet::new(),
                quantity: 0,
            });
            buckets.len() - 1
        });
        let bucket = &mut buckets[slot];
        bucket.codes.insert(record.itm_code.as_str());
        bucket.quantity += record.quantity;
    }

    buckets
}

impl InventorySummary {
    /// Aggregate over every record. Empty input gives an all-zero summary.
    pub fn compute(records: &[DeviceRecord]) -> Self {
        let total_quantity = records.iter().map(|r| r.quantity).sum();

        let mut departments: Vec<DepartmentStat> = bucket_by(records, |r| r.department.as_str())
            .into_iter()
            .map(|b| DepartmentStat {
                department: b.name.to_string(),
                group_count: b.codes.len(),
                total_quantity: b.quantity,
            })
            .collect();
        // Stable: equal quantities keep first-seen order.
        departments.sort_by(|a, b| b.total_quantity.cmp(&a.total_quantity));

        let mut manufacturers: Vec<ManufacturerStat> =
            bucket_by(records, |r| r.manufacturer.as_str())
                .into_iter()
                .map(|b| ManufacturerStat {
                    manufacturer: b.name.to_string(),
                    group_count: b.codes.len(),
                    total_quantity: b.quantity,
                })
                .collect();
        let manufacturer_count = manufacturers.len();
        manufacturers.sort_by(|a, b| b.group_count.cmp(&a.group_count));
        manufacturers.truncate(TOP_MANUFACTURERS);

        let mut recent: Vec<DeviceRecord> = records.to_vec();
        sort_items(&mut recent, SortField::DateReceived, SortOrder::Desc);
        recent.truncate(RECENT_DEVICES);

        Self {
            total_records: records.len(),
            total_quantity,
            department_count: departments.len(),
            manufacturer_count,
            departments,
            top_manufacturers: manufacturers,
            recent_devices: recent,
        }
    }
}

/// Distinct non-empty departments in ascending order, for filter dropdowns.
pub fn department_options(records: &[DeviceRecord]) -> Vec<String> {
    records
        .iter()
        .map(|r| r.department.as_str())
        .filter(|d| !d.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(id: i64, itm: &str, dept: &str, maker: &str, qty: i64, date: &str) -> DeviceRecord {
        DeviceRecord {
            id,
            original_id: id,
            itm_code: itm.to_string(),
            department: dept.to_string(),
            manufacturer: maker.to_string(),
            quantity: qty,
            date_received: date.to_string(),
            ..DeviceRecord::default()
        }
    }

    #[test]
    fn empty_set_gives_zero_summary() {
        let summary = InventorySummary::compute(&[]);
        assert_eq!(summary.total_records, 0);
        assert_eq!(summary.total_quantity, 0);
        assert_eq!(summary.department_count, 0);
        assert_eq!(summary.manufacturer_count, 0);
        assert!(summary.departments.is_empty());
        assert!(summary.top_manufacturers.is_empty());
        assert!(summary.recent_devices.is_empty());
    }

    #[test]
    fn totals_and_distinct_counts() {
        let records = vec![
            rec(1, "A", "ICU", "Sony", 2, "2024-01-01"),
            rec(2, "A", "ICU", "Sony", 3, "2024-01-02"),
            rec(3, "B", "ER", "Philips", 5, "2024-01-03"),
        ];
        let summary = InventorySummary::compute(&records);
        assert_eq!(summary.total_records, 3);
        assert_eq!(summary.total_quantity, 10);
        assert_eq!(summary.department_count, 2);
        assert_eq!(summary.manufacturer_count, 2);
    }

    #[test]
    fn department_breakdown_counts_groups_not_records() {
        let records = vec![
            rec(1, "A", "ICU", "Sony", 1, ""),
            rec(2, "A", "ICU", "Sony", 1, ""),
            rec(3, "B", "ICU", "Sony", 1, ""),
            rec(4, "C", "ER", "Sony", 9, ""),
        ];
        let summary = InventorySummary::compute(&records);
        assert_eq!(
            summary.departments,
            vec![
                DepartmentStat {
                    department: "ER".into(),
                    group_count: 1,
                    total_quantity: 9,
                },
                DepartmentStat {
                    department: "ICU".into(),
                    group_count: 2,
                    total_quantity: 3,
                },
            ]
        );
    }

    #[test]
    fn top_manufacturers_capped_and_ranked_by_group_count() {
        let mut records = Vec::new();
        let mut id = 0;
        for (maker, groups) in [("M1", 1), ("M2", 3), ("M3", 2), ("M4", 1), ("M5", 4), ("M6", 1)] {
            for g in 0..groups {
                id += 1;
                records.push(rec(id, &format!("{maker}-{g}"), "ICU", maker, 1, ""));
            }
        }
        let summary = InventorySummary::compute(&records);
        let names: Vec<&str> = summary
            .top_manufacturers
            .iter()
            .map(|m| m.manufacturer.as_str())
            .collect();
        assert_eq!(names, ["M5", "M2", "M3", "M1", "M4"]);
        assert_eq!(summary.manufacturer_count, 6);
    }

    #[test]
    fn recent_devices_newest_first() {
        let records: Vec<DeviceRecord> = (1..=7)
            .map(|d| rec(d, "A", "ICU", "Sony", 1, &format!("2024-01-0{d}")))
            .collect();
        let summary = InventorySummary::compute(&records);
        let ids: Vec<i64> = summary.recent_devices.iter().map(|r| r.id).collect();
        assert_eq!(ids, [7, 6, 5, 4, 3]);
    }

    #[test]
    fn negative_quantities_are_summed_as_is() {
        let records = vec![
            rec(1, "A", "ICU", "Sony", -2, ""),
            rec(2, "B", "ICU", "Sony", 5, ""),
        ];
        assert_eq!(InventorySummary::compute(&records).total_quantity, 3);
    }

    #[test]
    fn department_options_sorted_and_deduplicated() {
        let records = vec![
            rec(1, "A", "Radiology", "", 1, ""),
            rec(2, "B", "", "", 1, ""),
            rec(3, "C", "ICU", "", 1, ""),
            rec(4, "D", "Radiology", "", 1, ""),
        ];
        assert_eq!(department_options(&records), ["ICU", "Radiology"]);
    }
}
