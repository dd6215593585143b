use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use serde::Serialize;
use uuid::Uuid;

use super::model::{ApplicationRecord, CustomerRef};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum GroupingStrategy {
    ByCustomer,
    ByDate,
}

#[derive(Debug, Clone, PartialEq)]
pub enum GroupKey {
    Customer(CustomerRef),
    /// UTC calendar day of the stored timestamp.
    Day(NaiveDate),
}

/// Non-empty run of records sharing a key.
#[derive(Debug, Clone)]
pub struct Group<'a> {
    pub key: GroupKey,
    pub records: Vec<&'a ApplicationRecord>,
}

pub fn group_records(strategy: GroupingStrategy, records: &[ApplicationRecord]) -> Vec<Group<'_>> {
    match strategy {
        GroupingStrategy::ByCustomer => group_by_customer(records),
        GroupingStrategy::ByDate => group_by_date(records),
    }
}

/// Groups in order of each customer's first appearance in `records`.
pub fn group_by_customer(records: &[ApplicationRecord]) -> Vec<Group<'_>> {
    let mut index: HashMap<Uuid, usize> = HashMap::new();
    let mut groups: Vec<Group<'_>> = Vec::new();

    for record in records {
        let slot = *index.entry(record.customer.id).or_insert_with(|| {
            groups.push(Group {
                key: GroupKey::Customer(record.customer.clone()),
                records: Vec::new(),
            });
            groups.len() - 1
        });
        groups[slot].records.push(record);
    }

    groups
}

/// Groups keyed by UTC day, most recent day first. Records keep input order inside a day.
pub fn group_by_date(records: &[ApplicationRecord]) -> Vec<Group<'_>> {
    let mut buckets: BTreeMap<NaiveDate, Vec<&ApplicationRecord>> = BTreeMap::new();
    for record in records {
        buckets.entry(day_key(record)).or_default().push(record);
    }

    buckets
        .into_iter()
        .rev()
        .map(|(day, records)| Group { key: GroupKey::Day(day), records })
        .collect()
}

pub fn day_key(record: &ApplicationRecord) -> NaiveDate {
    record.applied_at.date_naive()
}
