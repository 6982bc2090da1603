//! Derived device groups.
//!
//! A group is every record sharing one `itmCode`. Groups are never stored:
//! they are recomputed from the record set on every read.

use std::collections::HashMap;

use serde::Serialize;

use crate::device::DeviceRecord;

/// All records sharing one `itmCode`, with representative fields copied from
/// the first member encountered.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceGroup {
    pub key: String,
    pub itm_code: String,
    pub device_name: String,
    pub model: String,
    pub manufacturer: String,
    pub department: String,
    pub date_received: String,
    pub warranty_period: Option<String>,
    pub supplier: Option<String>,
    pub country_of_origin: Option<String>,
    pub image_url: Option<String>,
    pub total_quantity: i64,
    pub members: Vec<DeviceRecord>,
}

impl DeviceGroup {
    fn seeded_by(first: &DeviceRecord) -> Self {
        Self {
            key: first.itm_code.clone(),
            itm_code: first.itm_code.clone(),
            device_name: first.device_name.clone(),
            model: first.model.clone(),
            manufacturer: first.manufacturer.clone(),
            department: first.department.clone(),
            date_received: first.date_received.clone(),
            warranty_period: first.warranty_period.clone(),
            supplier: first.supplier.clone(),
            country_of_origin: first.country_of_origin.clone(),
            image_url: first.image_url.clone(),
            total_quantity: 0,
            members: Vec::new(),
        }
    }

    fn push(&mut self, record: DeviceRecord) {
        self.total_quantity += record.quantity;
        self.members.push(record);
    }
}

/// Partition records by `itmCode` in a single pass.
///
/// Group order is the first-seen order of keys; member order within a group
/// is input order.
pub fn group_by_itm_code<'a, I>(records: I) -> Vec<DeviceGroup>
where
    I: IntoIterator<Item = &'a DeviceRecord>,
{
    let mut index: HashMap<&'a str, usize> = HashMap::new();
    let mut groups: Vec<DeviceGroup> = Vec::new();

    for record in records {
        let slot = *index.entry(record.itm_code.as_str()).or_insert_with(|| {
            groups.push(DeviceGroup::seeded_by(record));
            groups.len() - 1
        });
        groups[slot].push(record.clone());
    }

    groups
}

/// Build the group for one `itmCode`, or `None` when no record carries it.
pub fn find_group<'a, I>(records: I, itm_code: &str) -> Option<DeviceGroup>
where
    I: IntoIterator<Item = &'a DeviceRecord>,
{
    group_by_itm_code(records.into_iter().filter(|r| r.itm_code == itm_code)).pop()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(id: i64, itm_code: &str, quantity: i64) -> DeviceRecord {
        DeviceRecord {
            id,
            original_id: id,
            itm_code: itm_code.to_string(),
            device_name: format!("Device {itm_code}"),
            quantity,
            ..DeviceRecord::default()
        }
    }

    #[test]
    fn groups_by_code_and_sums_quantity() {
        let records = vec![rec(1, "A", 2), rec(2, "B", 5), rec(3, "A", 3)];
        let groups = group_by_itm_code(&records);

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].key, "A");
        assert_eq!(groups[0].total_quantity, 5);
        assert_eq!(groups[0].members.len(), 2);
        assert_eq!(groups[1].key, "B");
        assert_eq!(groups[1].total_quantity, 5);
        assert_eq!(groups[1].members.len(), 1);
    }

    #[test]
    fn empty_input_yields_no_groups() {
        let records: Vec<DeviceRecord> = Vec::new();
        assert!(group_by_itm_code(&records).is_empty());
    }

    #[test]
    fn representative_fields_come_from_first_member() {
        let mut first = rec(1, "A", 1);
        first.manufacturer = "Philips".into();
        first.image_url = Some("/uploads/first.png".into());
        let mut second = rec(2, "A", 1);
        second.manufacturer = "Other".into();

        let groups = group_by_itm_code(&[first, second]);
        assert_eq!(groups[0].manufacturer, "Philips");
        assert_eq!(groups[0].image_url.as_deref(), Some("/uploads/first.png"));
    }

    #[test]
    fn grouping_is_a_partition_preserving_member_order() {
        let records = vec![
            rec(1, "C", 1),
            rec(2, "A", 1),
            rec(3, "C", 1),
            rec(4, "B", 1),
            rec(5, "A", 1),
            rec(6, "C", 1),
        ];
        let groups = group_by_itm_code(&records);

        let keys: Vec<&str> = groups.iter().map(|g| g.key.as_str()).collect();
        assert_eq!(keys, ["C", "A", "B"]);

        let ids: Vec<i64> = groups
            .iter()
            .flat_map(|g| g.members.iter().map(|m| m.id))
            .collect();
        assert_eq!(ids, [1, 3, 6, 2, 5, 4]);

        let mut sorted = ids.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, [1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn total_quantity_matches_input_sum() {
        let records = vec![rec(1, "A", 4), rec(2, "B", -1), rec(3, "A", 0), rec(4, "C", 7)];
        let groups = group_by_itm_code(&records);
        let grouped: i64 = groups.iter().map(|g| g.total_quantity).sum();
        let flat: i64 = records.iter().map(|r| r.quantity).sum();
        assert_eq!(grouped, flat);
    }

    #[test]
    fn find_group_returns_matching_members_only() {
        let records = vec![rec(1, "A", 2), rec(2, "B", 5), rec(3, "A", 3)];
        let group = find_group(&records, "A").unwrap();
        assert_eq!(group.total_quantity, 5);
        assert_eq!(group.members.iter().map(|m| m.id).collect::<Vec<_>>(), [1, 3]);
        assert!(find_group(&records, "Z").is_none());
    }
}
